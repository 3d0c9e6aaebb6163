//! Reference catalog round trip through a real XLSX file

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use sku_core::catalog::{COMBOS_SHEET, INVENTORY_SHEET, MAPPING_SHEET};
use sku_core::{Catalog, CellValue, Error};
use std::path::Path;

fn write_catalog(path: &Path, with_inventory: bool) {
    let mut workbook = XlsxWorkbook::new();

    let mapping = workbook.add_worksheet();
    mapping.set_name(MAPPING_SHEET).unwrap();
    mapping.write_string(0, 0, "sku").unwrap();
    mapping.write_string(0, 1, "msku").unwrap();
    mapping.write_string(1, 0, "amz-red-01").unwrap();
    mapping.write_string(1, 1, "RED-TSHIRT").unwrap();
    mapping.write_number(2, 0, 12345).unwrap();
    mapping.write_string(2, 1, "NUMERIC-1").unwrap();
    // row 3 has a blank msku and must be skipped
    mapping.write_string(3, 0, "FK-BLUE").unwrap();

    let combos = workbook.add_worksheet();
    combos.set_name(COMBOS_SHEET).unwrap();
    combos.write_string(0, 0, "Combo").unwrap();
    combos.write_string(0, 1, "SKU1").unwrap();
    combos.write_string(1, 0, "PACK-2").unwrap();
    combos.write_string(1, 1, "RED-TSHIRT").unwrap();

    if with_inventory {
        let inventory = workbook.add_worksheet();
        inventory.set_name(INVENTORY_SHEET).unwrap();
        inventory.write_string(0, 0, "msku").unwrap();
        inventory.write_string(0, 1, "Opening Stock").unwrap();
        inventory.write_string(1, 0, "RED-TSHIRT").unwrap();
        inventory.write_number(1, 1, 40).unwrap();
    }

    workbook.save(path).unwrap();
}

#[test]
fn load_reads_all_three_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CSTE.xlsx");
    write_catalog(&path, true);

    let catalog = Catalog::load(&path).unwrap();
    let summary = catalog.summary();

    assert_eq!(summary.mappings, 2);
    assert_eq!(summary.combos, 1);
    assert_eq!(summary.inventory_items, 1);

    assert_eq!(catalog.mapping.resolve(" AMZ-RED-01 "), "RED-TSHIRT");
    assert_eq!(catalog.mapping.resolve("12345"), "NUMERIC-1");
    assert_eq!(catalog.mapping.resolve("FK-BLUE"), "UNMAPPED_FK-BLUE");
    assert_eq!(
        catalog.combos[0].get("Combo"),
        Some(&CellValue::String("PACK-2".to_string()))
    );
}

#[test]
fn missing_sheet_is_an_error_but_lenient_load_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CSTE.xlsx");
    write_catalog(&path, false);

    match Catalog::load(&path) {
        Err(Error::MissingSheet { sheet, .. }) => assert_eq!(sheet, INVENTORY_SHEET),
        other => panic!("expected missing sheet, got {:?}", other.map(|c| c.summary())),
    }

    let catalog = Catalog::load_or_empty(&path);
    assert!(catalog.mapping.is_empty());
    assert_eq!(catalog.mapping.resolve("amz-red-01"), "UNMAPPED_AMZ-RED-01");
}

#[test]
fn corrupt_workbook_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CSTE.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    assert!(matches!(Catalog::load(&path), Err(Error::Workbook { .. })));
}
