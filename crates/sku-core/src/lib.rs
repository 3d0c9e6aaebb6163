//! sku-core: Core library for mapping seller SKUs to master SKUs
//!
//! This library provides functionality to:
//! - Load a reference catalog (SKU → MSKU mapping, combos, inventory)
//! - Read sales exports from CSV files and spreadsheets
//! - Resolve each record's identifier to an MSKU with mapping statistics
//! - Process many exports in one batch with combined results
//! - Write processed tables, multi-sheet workbooks and JSON reports

pub mod batch;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod mapping;
pub mod parser;
pub mod scanner;
pub mod table;
pub mod workbook;

pub use batch::{
    process_batch, process_files, BatchFailure, BatchInput, BatchReport, FileOutcome, FileSummary,
    OverallStats,
};
pub use catalog::{Catalog, CatalogSummary, ComboRecord};
pub use config::RunConfig;
pub use engine::{
    process_table, MappingResult, MappingStats, MappingStatus, ProcessedTable, SkuSource,
};
pub use error::{Error, Result};
pub use export::{write_batch_outputs, write_json, write_table, BatchOutputs, OutputFormat};
pub use mapping::{normalize_sku, MappingTable};
pub use parser::{parse_csv, read_table};
pub use scanner::{scan_inputs, ScanOptions};
pub use table::{CellValue, Column, Row, Table};
