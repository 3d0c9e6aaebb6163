//! Core table types for representing sales exports and catalog sheets

use serde::{Deserialize, Serialize};

static EMPTY: CellValue = CellValue::Empty;

/// A tabular dataset with a dynamic set of named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Where the table came from (file path or sheet name)
    pub source: String,
}

impl Table {
    /// Create a new empty table
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source: source.into(),
        }
    }

    /// Create an empty table with the given column names
    pub fn with_columns<S: AsRef<str>>(source: impl Into<String>, names: &[S]) -> Self {
        let mut table = Self::new(source);
        table.columns = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref().to_string(), i))
            .collect();
        table
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by exact name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.find_column(name).map(|c| c.index)
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Cell at a row index and column name, if both exist
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Iterate over the values of one column
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a CellValue>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| r.get(index).unwrap_or(&EMPTY)))
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(Row::new(cells));
    }

    /// Set every value of a column, replacing it if it exists or appending it otherwise
    ///
    /// `values` is aligned with the rows; missing trailing values become empty.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                let index = self.columns.len();
                self.columns.push(Column::new(name.to_string(), index));
                for row in &mut self.rows {
                    row.cells.push(CellValue::Empty);
                }
                index
            }
        };

        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.cells[index] = values.next().unwrap_or(CellValue::Empty);
        }
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appears in the header
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Empty/missing cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type
    ///
    /// Numbers are only detected when rendering them back reproduces the
    /// trimmed text, so identifiers like `0012` or `1.50` stay strings.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            if i.to_string() == trimmed {
                return CellValue::Integer(i);
            }
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() && f.to_string() == trimmed {
                return CellValue::Float(f);
            }
        }

        CellValue::String(trimmed.to_string())
    }

    /// Check if the cell is missing
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Empty => write!(f, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::with_columns("sample.csv", &["sku", "qty"]);
        table.push_row(vec!["A1".into(), CellValue::Integer(3)]);
        table.push_row(vec!["B2".into()]);
        table
    }

    #[test]
    fn test_cell_value_parse_integer() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("-123"), CellValue::Integer(-123));
        assert_eq!(CellValue::parse(" 7 "), CellValue::Integer(7));
    }

    #[test]
    fn test_cell_value_parse_float() {
        assert_eq!(CellValue::parse("3.14"), CellValue::Float(3.14));
        assert_eq!(CellValue::parse("-2.5"), CellValue::Float(-2.5));
    }

    #[test]
    fn test_cell_value_parse_keeps_identifier_text() {
        assert_eq!(CellValue::parse("0012"), CellValue::String("0012".to_string()));
        assert_eq!(CellValue::parse("1.50"), CellValue::String("1.50".to_string()));
        assert_eq!(CellValue::parse("+5"), CellValue::String("+5".to_string()));
        assert_eq!(CellValue::parse("NaN"), CellValue::String("NaN".to_string()));
        assert_eq!(
            CellValue::parse("AB-123"),
            CellValue::String("AB-123".to_string())
        );
    }

    #[test]
    fn test_cell_value_parse_empty() {
        assert_eq!(CellValue::parse(""), CellValue::Empty);
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Integer(0).is_empty());
        assert!(!CellValue::String("".to_string()).is_empty());
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "qty"), Some(&CellValue::Empty));
        assert_eq!(table.cell(0, "missing"), None);
    }

    #[test]
    fn test_set_column_appends_then_replaces() {
        let mut table = sample();
        table.set_column("status", vec!["ok".into(), "bad".into()]);
        assert_eq!(table.column_names(), vec!["sku", "qty", "status"]);
        assert_eq!(table.cell(1, "status"), Some(&CellValue::from("bad")));

        table.set_column("sku", vec!["Z9".into()]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, "sku"), Some(&CellValue::from("Z9")));
        assert_eq!(table.cell(1, "sku"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_column_values() {
        let table = sample();
        let values: Vec<String> = table
            .column_values("sku")
            .unwrap()
            .map(|c| c.to_string_value())
            .collect();
        assert_eq!(values, vec!["A1", "B2"]);
        assert!(table.column_values("nope").is_none());
    }
}
