//! Spreadsheet access through calamine

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// An opened spreadsheet whose sheets can be read as tables
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Open a workbook (xlsx, xlsm, xlsb, xls or ods)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let sheets = open_workbook_auto(path).map_err(|e| Error::Workbook {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Read a sheet by exact name; the first row is the header
    pub fn sheet(&mut self, name: &str) -> Result<Table> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Err(Error::MissingSheet {
                path: self.path.clone(),
                sheet: name.to_string(),
            });
        }

        let range = self.sheets.worksheet_range(name).map_err(|e| Error::Workbook {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(range_to_table(&range, name))
    }

    /// Read the first sheet of the workbook
    pub fn first_sheet(&mut self) -> Result<Table> {
        let name = self
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingSheet {
                path: self.path.clone(),
                sheet: "<first sheet>".to_string(),
            })?;

        let mut table = self.sheet(&name)?;
        table.source = self.path.display().to_string();
        Ok(table)
    }
}

fn range_to_table(range: &Range<Data>, source: &str) -> Table {
    let mut rows = range.rows();

    let names: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", i),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let mut table = Table::with_columns(source, &names);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }
    table
}

/// Convert a spreadsheet cell into a CellValue
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(trimmed.to_string())
            }
        }
        Data::Empty | Data::Error(_) => CellValue::Empty,
        other => CellValue::parse(&other.to_string()),
    }
}
