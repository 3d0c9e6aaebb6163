//! Writers for processed tables, batch workbooks and JSON reports
//!
//! Single tables go to CSV or XLSX depending on the output format. A batch
//! additionally produces one workbook holding every processed row, the
//! per-file summary, and one sheet per source file.

use crate::batch::BatchReport;
use crate::error::{Error, Result};
use crate::parser::SPREADSHEET_EXTENSIONS;
use crate::table::{CellValue, Table};
use chrono::Local;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Excel's limit on worksheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Sheet of the combined workbook with every processed row
pub const ALL_DATA_SHEET: &str = "All_Data";
/// Sheet of the combined workbook with per-file statistics
pub const SUMMARY_SHEET: &str = "Processing_Summary";

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// File format for processed tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown format '{}', expected xlsx or csv", other)),
        }
    }
}

/// Timestamp used in output file names
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Output name for a single processed file
pub fn single_output_name(format: OutputFormat, timestamp: &str) -> String {
    format!("processed_sales_data_{}.{}", timestamp, format.extension())
}

/// Output name for one file of a batch
pub fn batch_output_name(source_file: &str, format: OutputFormat, timestamp: &str) -> String {
    format!(
        "processed_{}_{}.{}",
        clean_stem(source_file).replace(['/', '\\'], "_"),
        timestamp,
        format.extension()
    )
}

/// True for file names this crate writes as batch or single-file output
pub fn is_output_name(file_name: &str) -> bool {
    file_name.starts_with("processed_") || file_name.starts_with("ALL_PROCESSED_SALES_DATA_")
}

/// Suffix `name` with `_2`, `_3`, ... before its extension until it is unused
fn unique_file_name(name: String, used: &mut HashSet<String>) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{}", ext)),
        None => (name.clone(), String::new()),
    };

    let mut candidate = name;
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        candidate = format!("{}_{}{}", stem, n, ext);
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}

/// Output name for the combined batch workbook
pub fn combined_output_name(timestamp: &str) -> String {
    format!("ALL_PROCESSED_SALES_DATA_{}.xlsx", timestamp)
}

/// Drop a CSV or spreadsheet extension and replace spaces with `_`
fn clean_stem(source_file: &str) -> String {
    let stem = match source_file.rsplit_once('.') {
        Some((stem, ext)) if is_table_extension(ext) => stem,
        _ => source_file,
    };
    stem.replace(' ', "_")
}

fn is_table_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    ext == "csv" || SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
}

/// Make a valid, unique worksheet name
///
/// Strips the file extension, replaces spaces and characters Excel rejects
/// with `_`, truncates to 31 characters and de-duplicates case-insensitively
/// against `used`.
pub fn sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = clean_stem(raw)
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let base = trim_quotes(cleaned.chars().take(MAX_SHEET_NAME_LEN).collect());
    let base = if base.is_empty() {
        "Sheet".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!("_{}", n);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        let head = trim_quotes(base.chars().take(keep).collect());
        candidate = head + &suffix;
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}

// Excel rejects names that start or end with an apostrophe
fn trim_quotes(name: String) -> String {
    name.trim_matches('\'').to_string()
}

/// Write a table to `path`, choosing CSV or XLSX from the extension
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_csv(table, path)
    } else {
        write_workbook(&[("Sheet1", table)], path)
    }
}

/// Write a table as CSV
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let csv_err = |e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(csv_err)?;

    for row in &table.rows {
        writer
            .write_record(row.cells.iter().map(CellValue::to_string_value))
            .map_err(csv_err)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write several tables as sheets of one XLSX workbook
///
/// Sheet names are sanitized with [`sheet_name`].
pub fn write_workbook<P: AsRef<Path>>(sheets: &[(&str, &Table)], path: P) -> Result<()> {
    let mut workbook = XlsxWorkbook::new();
    let mut used = HashSet::new();

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(name, &mut used))?;

        for column in &table.columns {
            worksheet.write_string(0, col_num(column.index), column.name.as_str())?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let row_num = u32::try_from(r + 1).unwrap_or(u32::MAX);
            for (c, cell) in row.cells.iter().enumerate() {
                match cell {
                    CellValue::Integer(i) => {
                        worksheet.write_number(row_num, col_num(c), *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        worksheet.write_number(row_num, col_num(c), *f)?;
                    }
                    CellValue::String(s) => {
                        worksheet.write_string(row_num, col_num(c), s.as_str())?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}

fn col_num(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

/// Files written for a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutputs {
    /// One processed file per successful input, in processing order
    pub files_written: Vec<PathBuf>,
    /// The combined workbook, when requested and there was data
    pub combined: Option<PathBuf>,
    /// Outputs that could not be written (target path, error message)
    pub errors: Vec<(PathBuf, String)>,
}

/// Write every processed table and, optionally, the combined workbook
///
/// Records each file's output path in the report's summaries. A failed write
/// is recorded and does not stop the others.
pub fn write_batch_outputs<P: AsRef<Path>>(
    report: &mut BatchReport,
    output_dir: P,
    format: OutputFormat,
    combined: bool,
) -> Result<BatchOutputs> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let ts = timestamp();
    let mut outputs = BatchOutputs::default();
    let mut written: Vec<(usize, PathBuf)> = Vec::new();
    let mut used = HashSet::new();

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let name = unique_file_name(batch_output_name(&outcome.file, format, &ts), &mut used);
        let target = output_dir.join(name);
        match write_table(&outcome.processed.table, &target) {
            Ok(()) => {
                info!(path = %target.display(), "wrote processed file");
                written.push((i, target.clone()));
                outputs.files_written.push(target);
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "failed to write processed file");
                outputs.errors.push((target, e.to_string()));
            }
        }
    }

    for (i, target) in written {
        report.set_output(i, target);
    }

    if combined && report.has_results() {
        let target = output_dir.join(combined_output_name(&ts));
        match write_combined_workbook(report, &target) {
            Ok(()) => {
                info!(path = %target.display(), "wrote combined workbook");
                outputs.combined = Some(target);
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "failed to write combined workbook");
                outputs.errors.push((target, e.to_string()));
            }
        }
    }

    Ok(outputs)
}

/// Write the `All_Data` sheet, the summary sheet, and one sheet per file
pub fn write_combined_workbook<P: AsRef<Path>>(report: &BatchReport, path: P) -> Result<()> {
    let all_data = report.combined_table();
    let summary = report.summary_table();

    let mut sheets: Vec<(&str, &Table)> = vec![(ALL_DATA_SHEET, &all_data), (SUMMARY_SHEET, &summary)];
    for outcome in &report.outcomes {
        sheets.push((outcome.file.as_str(), &outcome.processed.table));
    }

    write_workbook(&sheets, path)
}

/// Save any serializable report as pretty JSON
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
