//! Readers turning CSV files and spreadsheets into tables

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use crate::workbook::Workbook;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

/// File extensions read through the spreadsheet reader
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Input format detected from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    /// Detect the format from the path's extension (case-insensitive)
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if ext == "csv" {
            Some(InputFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(InputFormat::Spreadsheet)
        } else {
            None
        }
    }
}

/// Read an input table, choosing the reader by extension
///
/// Spreadsheets contribute their first worksheet.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    match InputFormat::detect(path) {
        Some(InputFormat::Csv) => parse_csv(path),
        Some(InputFormat::Spreadsheet) => Workbook::open(path)?.first_sheet(),
        None => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a CSV file into a Table
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_csv_reader(BufReader::new(file), path)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    parse_csv_reader(content.as_bytes(), Path::new(source_name))
}

fn parse_csv_reader<R: Read>(reader: R, path: &Path) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    let names: Vec<String> = headers.iter().map(str::to_string).collect();
    if names.is_empty() || names.iter().all(|n| n.trim().is_empty()) {
        return Err(Error::CsvParse {
            path: path.to_path_buf(),
            message: "no columns found in CSV".to_string(),
        });
    }

    let mut table = Table::with_columns(path.display().to_string(), &names);

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();

        if cells.len() > table.column_count() {
            warn!(
                row = row_idx + 1,
                path = %path.display(),
                "row has more cells than columns, truncating"
            );
        }

        table.push_row(cells);
    }

    Ok(table)
}
