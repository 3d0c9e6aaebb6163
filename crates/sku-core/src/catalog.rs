//! Reference catalog loading
//!
//! The reference workbook carries three sheets: the SKU → MSKU mapping, the
//! combo products, and a current inventory snapshot. Only the mapping feeds
//! resolution; combos and inventory are kept for display.

use crate::error::{Error, Result};
use crate::mapping::MappingTable;
use crate::table::{CellValue, Table};
use crate::workbook::Workbook;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Sheet holding the SKU → MSKU pairs
pub const MAPPING_SHEET: &str = "Msku With Skus";
/// Sheet holding combo (bundle) products
pub const COMBOS_SHEET: &str = "Combos skus";
/// Sheet holding the inventory snapshot; the trailing space is part of the name
pub const INVENTORY_SHEET: &str = "Current Inventory ";

/// Column of the mapping sheet with the seller SKU
pub const SKU_FIELD: &str = "sku";
/// Column of the mapping sheet with the master SKU
pub const MSKU_FIELD: &str = "msku";

/// Reference catalog file looked up when none is configured
pub const DEFAULT_CATALOG_FILE: &str = "CSTE.xlsx";

const SAMPLE_LOG_LIMIT: usize = 5;

/// One row of the combos sheet, fields in column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboRecord {
    pub fields: Vec<(String, CellValue)>,
}

impl ComboRecord {
    /// Look up a field by column name
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// The loaded reference data; immutable once built
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub mapping: MappingTable,
    pub combos: Vec<ComboRecord>,
    pub inventory: Option<Table>,
}

/// Counts describing a loaded catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub mappings: usize,
    pub combos: usize,
    pub inventory_items: usize,
}

impl Catalog {
    /// Load all three sheets from a reference workbook
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = Workbook::open(path)?;

        let mapping_sheet = workbook.sheet(MAPPING_SHEET)?;
        let combos_sheet = workbook.sheet(COMBOS_SHEET)?;
        let inventory_sheet = workbook.sheet(INVENTORY_SHEET)?;

        let catalog = Self::from_tables(&mapping_sheet, &combos_sheet, inventory_sheet)?;
        let summary = catalog.summary();
        info!(
            path = %path.display(),
            mappings = summary.mappings,
            combos = summary.combos,
            inventory = summary.inventory_items,
            "loaded reference catalog"
        );
        Ok(catalog)
    }

    /// Load a catalog, falling back to an empty one when loading fails
    ///
    /// With an empty catalog every identifier resolves as unmapped.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load reference catalog");
                Self::default()
            }
        }
    }

    /// Assemble a catalog from already-read sheets
    pub fn from_tables(mapping_sheet: &Table, combos_sheet: &Table, inventory: Table) -> Result<Self> {
        Ok(Self {
            mapping: mapping_from_sheet(mapping_sheet)?,
            combos: combos_from_sheet(combos_sheet),
            inventory: Some(inventory),
        })
    }

    /// Counts of mappings, combos and inventory rows
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            mappings: self.mapping.len(),
            combos: self.combos.len(),
            inventory_items: self.inventory.as_ref().map_or(0, Table::row_count),
        }
    }
}

/// Build the mapping table from the mapping sheet
///
/// Rows with a blank `sku` or `msku` are skipped; duplicate SKUs keep the last MSKU.
pub fn mapping_from_sheet(sheet: &Table) -> Result<MappingTable> {
    let sku_idx = required_column(sheet, SKU_FIELD)?;
    let msku_idx = required_column(sheet, MSKU_FIELD)?;

    let mut mapping = MappingTable::new();
    let mut skipped = 0usize;

    for row in &sheet.rows {
        let sku = row.get(sku_idx).map(CellValue::to_string_value).unwrap_or_default();
        let msku = row.get(msku_idx).map(CellValue::to_string_value).unwrap_or_default();

        if mapping.insert(&sku, &msku) {
            if mapping.len() <= SAMPLE_LOG_LIMIT {
                debug!(sku = sku.trim(), msku = msku.trim(), "mapped");
            }
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!(sheet = %sheet.source, skipped, "skipped mapping rows with blank sku or msku");
    }

    Ok(mapping)
}

fn required_column(sheet: &Table, name: &str) -> Result<usize> {
    sheet.column_index(name).ok_or_else(|| Error::MissingColumn {
        sheet: sheet.source.clone(),
        column: name.to_string(),
    })
}

fn combos_from_sheet(sheet: &Table) -> Vec<ComboRecord> {
    sheet
        .rows
        .iter()
        .map(|row| ComboRecord {
            fields: sheet
                .columns
                .iter()
                .map(|c| {
                    let value = row.get(c.index).cloned().unwrap_or(CellValue::Empty);
                    (c.name.clone(), value)
                })
                .collect(),
        })
        .collect()
}
