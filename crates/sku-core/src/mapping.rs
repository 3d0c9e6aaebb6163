//! SKU → MSKU mapping table and single-identifier resolution

use std::collections::HashMap;

/// Prefix carried by identifiers that could not be resolved
pub const UNMAPPED_PREFIX: &str = "UNMAPPED_";

/// Normalize a raw identifier for lookup: trimmed and upper-cased
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Insertion-ordered mapping from normalized SKU to MSKU
///
/// Re-inserting an existing SKU replaces its MSKU but keeps its original
/// position, so the substring fallback always scans in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl MappingTable {
    /// Create an empty mapping table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(sku, msku)` pairs, applying the same trimming and
    /// skipping rules as the catalog loader
    pub fn from_pairs<I, S, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, M)>,
        S: AsRef<str>,
        M: AsRef<str>,
    {
        let mut table = Self::new();
        for (sku, msku) in pairs {
            table.insert(sku.as_ref(), msku.as_ref());
        }
        table
    }

    /// Insert a mapping; returns false when either side is blank after trimming
    pub fn insert(&mut self, sku: &str, msku: &str) -> bool {
        let key = normalize_sku(sku);
        let msku = msku.trim();
        if key.is_empty() || msku.is_empty() {
            return false;
        }

        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = msku.to_string(),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, msku.to_string()));
            }
        }
        true
    }

    /// Number of distinct SKUs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no SKU is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup of an already-normalized SKU
    pub fn get(&self, normalized_sku: &str) -> Option<&str> {
        self.index
            .get(normalized_sku)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Iterate `(sku, msku)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolve a raw identifier to an MSKU
    ///
    /// Exact match first, then the first entry (insertion order) where either
    /// string contains the other, else `UNMAPPED_<normalized>`. A blank
    /// identifier is contained in every key and so takes the first entry.
    pub fn resolve(&self, raw: &str) -> String {
        let sku = normalize_sku(raw);

        if let Some(msku) = self.get(&sku) {
            return msku.to_string();
        }

        for (mapped_sku, msku) in self.iter() {
            if mapped_sku.contains(sku.as_str()) || sku.contains(mapped_sku) {
                return msku.to_string();
            }
        }

        format!("{}{}", UNMAPPED_PREFIX, sku)
    }
}

/// True when a resolved value is the unmapped sentinel
pub fn is_unmapped(resolved: &str) -> bool {
    resolved.starts_with(UNMAPPED_PREFIX)
}
