//! Batch processing of many input tables with combined results

use crate::engine::{process_table, rate, round1, MappingStats, ProcessedTable};
use crate::error::Result;
use crate::mapping::MappingTable;
use crate::parser::read_table;
use crate::table::{CellValue, Column, Row, Table};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Column tagging every combined row with the file it came from
pub const SOURCE_FILE_COLUMN: &str = "Source_File";

/// One table to process, or the error raised while reading it
#[derive(Debug)]
pub struct BatchInput {
    /// Identifier of the table (usually the file name)
    pub name: String,
    pub table: Result<Table>,
}

impl BatchInput {
    /// Read a file into a batch input; read errors are kept for the report
    pub fn from_path(name: String, path: &Path) -> Self {
        Self {
            name,
            table: read_table(path),
        }
    }
}

/// A successfully processed table
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: String,
    pub processed: ProcessedTable,
}

/// Per-file line of the batch summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub total: usize,
    pub mapped: usize,
    pub rate: f64,
    /// Where the processed table was written, once it has been
    pub output: Option<PathBuf>,
}

/// A table that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub file: String,
    pub error: String,
}

/// Totals across every successfully processed table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OverallStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_records: usize,
    pub mapped_records: usize,
    /// Recomputed from the summed counts, not averaged
    pub overall_rate: f64,
}

impl OverallStats {
    /// Overall rate rounded to one decimal place
    pub fn rounded_rate(&self) -> f64 {
        round1(self.overall_rate)
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    #[serde(skip)]
    pub outcomes: Vec<FileOutcome>,
    pub files: Vec<FileSummary>,
    pub failures: Vec<BatchFailure>,
    pub overall: OverallStats,
}

impl BatchReport {
    /// True when at least one table was processed
    pub fn has_results(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// Record where the processed table of `outcomes[index]` was written
    pub fn set_output(&mut self, index: usize, output: PathBuf) {
        if let Some(summary) = self.files.get_mut(index) {
            summary.output = Some(output);
        }
    }

    /// All processed rows, each tagged with `Source_File`
    ///
    /// Columns are the union across files in order of first appearance.
    pub fn combined_table(&self) -> Table {
        let tagged: Vec<Table> = self
            .outcomes
            .iter()
            .map(|o| {
                let mut table = o.processed.table.clone();
                let tags = vec![CellValue::from(o.file.as_str()); table.row_count()];
                table.set_column(SOURCE_FILE_COLUMN, tags);
                table
            })
            .collect();

        concat_tables("All_Data", &tagged)
    }

    /// The per-file summary as a table
    pub fn summary_table(&self) -> Table {
        let mut table =
            Table::with_columns("Processing_Summary", &["file", "total", "mapped", "rate", "output"]);
        for s in &self.files {
            table.push_row(vec![
                CellValue::from(s.file.as_str()),
                CellValue::Integer(s.total as i64),
                CellValue::Integer(s.mapped as i64),
                CellValue::Float(s.rate),
                s.output
                    .as_ref()
                    .map_or(CellValue::Empty, |p| CellValue::from(p.display().to_string())),
            ]);
        }
        table
    }
}

/// Summary line for one processed table
fn summary_for(file: &str, stats: &MappingStats) -> FileSummary {
    FileSummary {
        file: file.to_string(),
        total: stats.total_records,
        mapped: stats.mapped_records,
        rate: stats.rounded_rate(),
        output: None,
    }
}

/// Process every input independently; failures are recorded and skipped
pub fn process_batch<I>(mapping: &MappingTable, inputs: I) -> BatchReport
where
    I: IntoIterator<Item = BatchInput>,
{
    let mut outcomes = Vec::new();
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for (i, input) in inputs.into_iter().enumerate() {
        info!(index = i + 1, file = %input.name, "processing");

        match input.table.and_then(|table| process_table(mapping, &table)) {
            Ok(processed) => {
                let stats = processed.stats;
                info!(
                    file = %input.name,
                    mapped = stats.mapped_records,
                    total = stats.total_records,
                    "mapped"
                );
                files.push(summary_for(&input.name, &stats));
                outcomes.push(FileOutcome {
                    file: input.name,
                    processed,
                });
            }
            Err(e) => {
                warn!(file = %input.name, error = %e, "skipping file");
                failures.push(BatchFailure {
                    file: input.name,
                    error: e.to_string(),
                });
            }
        }
    }

    let total_records: usize = files.iter().map(|f| f.total).sum();
    let mapped_records: usize = files.iter().map(|f| f.mapped).sum();

    let overall = OverallStats {
        files_processed: files.len(),
        files_failed: failures.len(),
        total_records,
        mapped_records,
        overall_rate: rate(mapped_records, total_records),
    };

    BatchReport {
        outcomes,
        files,
        failures,
        overall,
    }
}

/// Read and process every file in order
///
/// Files are identified by name, with parent directories added when several
/// inputs share a file name.
pub fn process_files<P: AsRef<Path>>(mapping: &MappingTable, paths: &[P]) -> BatchReport {
    let names = input_names(paths);
    process_batch(
        mapping,
        paths
            .iter()
            .zip(names)
            .map(|(p, name)| BatchInput::from_path(name, p.as_ref())),
    )
}

/// Identifier for each path
///
/// The file name where it is unique; otherwise enough trailing directories
/// to tell the paths apart, joined with `/`.
fn input_names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let parts: Vec<Vec<String>> = paths.iter().map(|p| name_parts(p.as_ref())).collect();
    let mut depth = vec![1; parts.len()];

    loop {
        let names: Vec<String> = parts
            .iter()
            .zip(&depth)
            .map(|(p, &d)| p[p.len().saturating_sub(d)..].join("/"))
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in &names {
            *counts.entry(name.clone()).or_default() += 1;
        }

        let mut deepened = false;
        for (i, name) in names.iter().enumerate() {
            if counts[name] > 1 && depth[i] < parts[i].len() {
                depth[i] += 1;
                deepened = true;
            }
        }

        if !deepened {
            return names;
        }
    }
}

/// Normal components of a path, or its display form when it has none
fn name_parts(path: &Path) -> Vec<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        vec![path.display().to_string()]
    } else {
        parts
    }
}

/// Concatenate tables row-wise over the union of their columns
pub fn concat_tables(name: &str, tables: &[Table]) -> Table {
    // Build unified column list (union of all columns)
    let mut column_names: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<&str> = HashSet::new();

    for table in tables {
        for col in &table.columns {
            if seen_columns.insert(col.name.as_str()) {
                column_names.push(col.name.clone());
            }
        }
    }

    let mut combined = Table::new(name);
    combined.columns = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let col_index: BTreeMap<&str, usize> = combined
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.index))
        .collect();

    for table in tables {
        // Position of each source column in the unified layout
        let positions: Vec<usize> = table
            .columns
            .iter()
            .map(|c| col_index[c.name.as_str()])
            .collect();

        for row in &table.rows {
            let mut cells = vec![CellValue::Empty; combined.columns.len()];
            for (src_idx, cell) in row.cells.iter().enumerate() {
                if let Some(&dst_idx) = positions.get(src_idx) {
                    cells[dst_idx] = cell.clone();
                }
            }
            combined.rows.push(Row::new(cells));
        }
    }

    combined
}
