//! Batch runs over real files in a temporary directory

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use sku_core::export::{ALL_DATA_SHEET, SUMMARY_SHEET};
use sku_core::workbook::Workbook;
use sku_core::{
    parse_csv, process_files, scan_inputs, write_batch_outputs, CellValue, MappingTable,
    OutputFormat, RunConfig, ScanOptions,
};
use std::fs;

fn mapping() -> MappingTable {
    MappingTable::from_pairs([("AMZ-RED-01", "RED-TSHIRT"), ("FK-BLUE-02", "BLUE-TSHIRT")])
}

#[test]
fn scan_picks_csv_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b_orders.csv"), "sku\nx\n").unwrap();
    fs::write(dir.path().join("a_orders.csv"), "sku\nx\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::write(dir.path().join("stock.xlsx"), "").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/c_orders.csv"), "sku\nx\n").unwrap();

    let flat = scan_inputs(dir.path(), ScanOptions::default()).unwrap();
    let names: Vec<_> = flat
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_orders.csv", "b_orders.csv"]);

    let deep = scan_inputs(
        dir.path(),
        ScanOptions {
            recursive: true,
            include_spreadsheets: true,
        },
    )
    .unwrap();
    assert_eq!(deep.len(), 4);
}

#[test]
fn batch_writes_per_file_outputs_and_combined_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("exports");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    fs::write(
        input_dir.join("amazon orders.csv"),
        "Order ID,SKU,Qty\n1,amz-red-01,2\n2,FK-BLUE-02,1\n",
    )
    .unwrap();
    fs::write(input_dir.join("broken.csv"), "Date,Quantity\n2024-01-01,3\n").unwrap();

    let config = RunConfig {
        input_dir: Some(input_dir.clone()),
        output_dir: output_dir.clone(),
        format: OutputFormat::Csv,
        ..RunConfig::default()
    };
    let inputs = config.resolve_inputs().unwrap();
    assert_eq!(inputs.len(), 2);

    let mut report = process_files(&mapping(), &inputs);
    assert_eq!(report.overall.files_processed, 1);
    assert_eq!(report.overall.files_failed, 1);
    assert_eq!(report.failures[0].file, "broken.csv");
    assert_eq!(report.overall.rounded_rate(), 100.0);

    let outputs = write_batch_outputs(&mut report, &output_dir, config.format, true).unwrap();
    assert!(outputs.errors.is_empty());
    assert_eq!(outputs.files_written.len(), 1);

    // "Order ID" comes first and contains "id", so order numbers are resolved;
    // "1" is a substring of AMZ-RED-01 and "2" of FK-BLUE-02.
    let written = parse_csv(&outputs.files_written[0]).unwrap();
    assert_eq!(
        written.cell(0, "Mapped_MSKU"),
        Some(&CellValue::from("RED-TSHIRT"))
    );
    assert_eq!(
        written.cell(1, "Mapped_MSKU"),
        Some(&CellValue::from("BLUE-TSHIRT"))
    );
    assert_eq!(written.cell(1, "Mapping_Status"), Some(&CellValue::from("MAPPED")));
    assert_eq!(report.files[0].output.as_ref(), Some(&outputs.files_written[0]));

    let combined = outputs.combined.expect("combined workbook");
    let mut workbook = Workbook::open(&combined).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![ALL_DATA_SHEET, SUMMARY_SHEET, "amazon_orders"]
    );

    let all_data = workbook.sheet(ALL_DATA_SHEET).unwrap();
    assert_eq!(all_data.row_count(), 2);
    assert_eq!(
        all_data.cell(1, "Source_File"),
        Some(&CellValue::from("amazon orders.csv"))
    );

    let summary = workbook.sheet(SUMMARY_SHEET).unwrap();
    assert_eq!(summary.row_count(), 1);
    assert_eq!(summary.cell(0, "file"), Some(&CellValue::from("amazon orders.csv")));
}

#[test]
fn batch_resolves_sku_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flipkart.csv");
    fs::write(&path, "SKU,Qty\namz-red-01,2\nFK-BLUE,1\nmystery,4\n").unwrap();

    let report = process_files(&mapping(), &[&path]);
    let outcome = &report.outcomes[0];

    let mapped: Vec<String> = outcome
        .processed
        .results
        .iter()
        .map(|r| r.mapped_msku.to_string_value())
        .collect();
    assert_eq!(mapped, vec!["RED-TSHIRT", "BLUE-TSHIRT", "UNMAPPED_MYSTERY"]);
    assert_eq!(outcome.processed.stats.rounded_rate(), 66.7);
}

#[test]
fn unreadable_inputs_do_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.csv");
    fs::write(&good, "sku\nAMZ-RED-01\nFK-BLUE-02\n").unwrap();
    let missing = dir.path().join("missing.csv");
    let unsupported = dir.path().join("orders.json");
    fs::write(&unsupported, "{}").unwrap();

    let report = process_files(&mapping(), &[&missing, &good, &unsupported]);

    assert_eq!(report.overall.files_processed, 1);
    assert_eq!(report.overall.files_failed, 2);
    assert_eq!(report.overall.mapped_records, 2);
    assert_eq!(report.combined_table().row_count(), 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overall"]["files_failed"], 2);
    assert!(json.get("outcomes").is_none());
}

#[test]
fn inputs_sharing_a_file_name_get_separate_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("exports");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(input_dir.join("a")).unwrap();
    fs::create_dir_all(input_dir.join("b")).unwrap();
    fs::write(input_dir.join("a/sales.csv"), "sku\nAMZ-RED-01\n").unwrap();
    fs::write(input_dir.join("b/sales.csv"), "sku\nFK-BLUE-02\nmystery\n").unwrap();

    let config = RunConfig {
        input_dir: Some(input_dir.clone()),
        recursive: true,
        output_dir: output_dir.clone(),
        format: OutputFormat::Csv,
        ..RunConfig::default()
    };
    let inputs = config.resolve_inputs().unwrap();
    let mut report = process_files(&mapping(), &inputs);
    assert_ne!(report.files[0].file, report.files[1].file);
    assert_eq!(report.files[0].file, "a/sales.csv");
    assert_eq!(report.files[1].file, "b/sales.csv");

    let outputs = write_batch_outputs(&mut report, &output_dir, config.format, true).unwrap();
    assert!(outputs.errors.is_empty());
    assert_eq!(outputs.files_written.len(), 2);
    assert_ne!(outputs.files_written[0], outputs.files_written[1]);
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 3);

    for (summary, written) in report.files.iter().zip(&outputs.files_written) {
        assert_eq!(summary.output.as_ref(), Some(written));
        assert_eq!(parse_csv(written).unwrap().row_count(), summary.total);
    }
    assert_eq!(report.files[0].total, 1);
    assert_eq!(report.files[1].total, 2);

    let combined = report.combined_table();
    let sources: Vec<String> = combined
        .column_values("Source_File")
        .unwrap()
        .map(CellValue::to_string_value)
        .collect();
    assert_eq!(sources[0], report.files[0].file);
    assert_eq!(sources[1], report.files[1].file);
    assert_ne!(sources[0], sources[1]);
}

#[test]
fn same_stem_in_two_formats_gets_separate_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out");
    let csv = dir.path().join("sales.csv");
    fs::write(&csv, "sku\nAMZ-RED-01\n").unwrap();

    let xlsx = dir.path().join("sales.xlsx");
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "sku").unwrap();
    sheet.write_string(1, 0, "FK-BLUE-02").unwrap();
    sheet.write_string(2, 0, "mystery").unwrap();
    workbook.save(&xlsx).unwrap();

    let mut report = process_files(&mapping(), &[&csv, &xlsx]);
    assert_eq!(report.overall.files_processed, 2);
    let outputs = write_batch_outputs(&mut report, &output_dir, OutputFormat::Csv, false).unwrap();

    assert_eq!(outputs.files_written.len(), 2);
    assert_ne!(outputs.files_written[0], outputs.files_written[1]);
    assert_eq!(parse_csv(&outputs.files_written[0]).unwrap().row_count(), 1);
    assert_eq!(parse_csv(&outputs.files_written[1]).unwrap().row_count(), 2);
    assert_eq!(report.files[1].output.as_ref(), Some(&outputs.files_written[1]));
}
