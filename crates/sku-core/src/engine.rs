//! Table-level SKU resolution and mapping statistics

use crate::error::{Error, Result};
use crate::mapping::{is_unmapped, MappingTable};
use crate::table::{CellValue, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column that, when present, already carries the master SKU
pub const DIRECT_MSKU_COLUMN: &str = "MSKU";
/// Output column with the resolved master SKU
pub const MAPPED_MSKU_COLUMN: &str = "Mapped_MSKU";
/// Output column with the per-row mapping status
pub const MAPPING_STATUS_COLUMN: &str = "Mapping_Status";

/// Substrings that mark a column as carrying product identifiers
pub const SKU_COLUMN_KEYWORDS: &[&str] = &[
    "sku", "product", "item", "asin", "fnsku", "model", "code", "id", "variant",
];

/// How a row's master SKU was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingStatus {
    /// Copied from an existing `MSKU` column
    DirectMsku,
    /// Resolved through the mapping table
    Mapped,
    /// No match; the value is the `UNMAPPED_` sentinel
    Unmapped,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::DirectMsku => "DIRECT_MSKU",
            MappingStatus::Mapped => "MAPPED",
            MappingStatus::Unmapped => "UNMAPPED",
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one input row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingResult {
    pub mapped_msku: CellValue,
    pub status: MappingStatus,
}

/// Which column supplied the identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkuSource {
    /// The table already had an `MSKU` column
    Direct,
    /// Identifiers from this column were resolved
    Resolved(String),
}

impl SkuSource {
    /// Name of the column the identifiers came from
    pub fn column(&self) -> &str {
        match self {
            SkuSource::Direct => DIRECT_MSKU_COLUMN,
            SkuSource::Resolved(name) => name,
        }
    }
}

/// Aggregate mapping statistics for one table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingStats {
    pub total_records: usize,
    pub mapped_records: usize,
    pub unmapped_records: usize,
    /// Percentage in `[0, 100]`
    pub mapping_rate: f64,
}

impl MappingStats {
    /// Build stats from totals; the rate is 0 for an empty table
    pub fn from_counts(total_records: usize, mapped_records: usize) -> Self {
        Self {
            total_records,
            mapped_records,
            unmapped_records: total_records.saturating_sub(mapped_records),
            mapping_rate: rate(mapped_records, total_records),
        }
    }

    /// Mapping rate rounded to one decimal place
    pub fn rounded_rate(&self) -> f64 {
        round1(self.mapping_rate)
    }
}

/// Percentage of `part` in `total`, 0 when `total` is 0
pub fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// An input table annotated with mapping results
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTable {
    /// The input columns followed by `Mapped_MSKU` and `Mapping_Status`
    pub table: Table,
    /// One result per input row, in row order
    pub results: Vec<MappingResult>,
    pub stats: MappingStats,
    pub sku_source: SkuSource,
}

impl ProcessedTable {
    /// Original identifiers of unmapped rows, up to `limit`
    pub fn unmapped_identifiers(&self, limit: usize) -> Vec<String> {
        let column = self.sku_source.column();
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status == MappingStatus::Unmapped)
            .filter_map(|(i, _)| self.table.cell(i, column))
            .map(CellValue::to_string_value)
            .take(limit)
            .collect()
    }
}

/// Pick the first column whose lower-cased name contains an identifier keyword
pub fn find_sku_column(table: &Table) -> Option<&str> {
    table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .find(|name| {
            let lower = name.to_lowercase();
            SKU_COLUMN_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
}

/// Map every row of a table to an MSKU and compute statistics
///
/// A literal `MSKU` column is copied as-is with status `DIRECT_MSKU`; its
/// statistics count only non-missing values as mapped. Otherwise the first
/// identifier-like column is resolved through `mapping`.
pub fn process_table(mapping: &MappingTable, table: &Table) -> Result<ProcessedTable> {
    let total = table.row_count();

    let (sku_source, results, mapped) = match table.column_values(DIRECT_MSKU_COLUMN) {
        Some(values) => {
            let mut mapped = 0;
            let results: Vec<MappingResult> = values
                .map(|value| {
                    if !value.is_empty() {
                        mapped += 1;
                    }
                    MappingResult {
                        mapped_msku: value.clone(),
                        status: MappingStatus::DirectMsku,
                    }
                })
                .collect();
            (SkuSource::Direct, results, mapped)
        }
        None => {
            let column = find_sku_column(table).ok_or_else(|| Error::NoSkuColumn {
                columns: table.column_names(),
            })?;

            let results: Vec<MappingResult> = table
                .column_values(column)
                .into_iter()
                .flatten()
                .map(|value| resolve_cell(mapping, value))
                .collect();
            let mapped = results
                .iter()
                .filter(|r| r.status == MappingStatus::Mapped)
                .count();
            (SkuSource::Resolved(column.to_string()), results, mapped)
        }
    };

    let mut output = table.clone();
    output.set_column(
        MAPPED_MSKU_COLUMN,
        results.iter().map(|r| r.mapped_msku.clone()).collect(),
    );
    output.set_column(
        MAPPING_STATUS_COLUMN,
        results.iter().map(|r| r.status.as_str().into()).collect(),
    );

    Ok(ProcessedTable {
        table: output,
        results,
        stats: MappingStats::from_counts(total, mapped),
        sku_source,
    })
}

fn resolve_cell(mapping: &MappingTable, value: &CellValue) -> MappingResult {
    let resolved = mapping.resolve(&value.to_string_value());
    let status = if is_unmapped(&resolved) {
        MappingStatus::Unmapped
    } else {
        MappingStatus::Mapped
    };
    MappingResult {
        mapped_msku: CellValue::String(resolved),
        status,
    }
}
