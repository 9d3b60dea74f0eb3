//! The persisted element inventory
//!
//! - [`ElementRecord`]: one tracked element, keyed by its structural XPath
//! - [`Inventory`]: all records ever discovered, in discovery order
//! - [`InventoryStore`]: loading and atomic full-replace saving
//! - [`diff`]: merging a fresh observation into the inventory
//! - [`catalog`]: page-object entries derived from the inventory

pub mod catalog;
pub mod diff;
pub mod record;
pub mod store;

pub use catalog::{PageObjectEntry, build_catalog};
pub use diff::{Classification, DiffReport, ElementOutcome, diff_and_merge, retire_unobserved};
pub use record::{Category, ElementRecord, Referenceable};
pub use store::{InventoryStore, LoadOutcome};

use indexmap::IndexMap;

/// Ordered collection of records with unique XPaths
///
/// Uses IndexMap so that insertion order (discovery order) survives a
/// load/save cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    records: IndexMap<String, ElementRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from records in persisted order
    ///
    /// Returns the offending XPath if two records share one.
    pub fn from_records(records: Vec<ElementRecord>) -> std::result::Result<Self, String> {
        let mut inventory = Self::new();
        for record in records {
            if inventory.records.contains_key(&record.xpath) {
                return Err(record.xpath);
            }
            inventory.records.insert(record.xpath.clone(), record);
        }
        Ok(inventory)
    }

    /// Next free sequence number: one past the highest assigned, or 1
    pub fn next_number(&self) -> u64 {
        self.records.values().map(|r| r.number).max().unwrap_or(0) + 1
    }

    /// Append a record under its XPath
    ///
    /// Returns `false` and leaves the inventory untouched when the XPath is
    /// already present.
    pub fn insert(&mut self, record: ElementRecord) -> bool {
        if self.records.contains_key(&record.xpath) {
            return false;
        }
        self.records.insert(record.xpath.clone(), record);
        true
    }

    pub fn get(&self, xpath: &str) -> Option<&ElementRecord> {
        self.records.get(xpath)
    }

    pub fn get_mut(&mut self, xpath: &str) -> Option<&mut ElementRecord> {
        self.records.get_mut(xpath)
    }

    pub fn contains(&self, xpath: &str) -> bool {
        self.records.contains_key(xpath)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &ElementRecord> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ElementRecord> {
        self.records.values_mut()
    }
}
