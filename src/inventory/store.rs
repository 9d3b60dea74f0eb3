use crate::error::{InventoryError, Result};
use crate::inventory::{ElementRecord, Inventory};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Result of reading the inventory file
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Inventory),
    /// No inventory has been written yet
    NotFound,
}

/// JSON file holding the inventory as an array of records
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the inventory file
    ///
    /// A missing file is [`LoadOutcome::NotFound`]; unreadable or malformed
    /// content (including duplicate XPaths) is a [`InventoryError::StoreRead`].
    pub fn load(&self) -> Result<LoadOutcome> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::NotFound),
            Err(e) => return Err(self.read_error(e.to_string())),
        };

        let records: Vec<ElementRecord> =
            serde_json::from_str(&contents).map_err(|e| self.read_error(e.to_string()))?;

        let inventory = Inventory::from_records(records)
            .map_err(|xpath| self.read_error(format!("duplicate XPath {}", xpath)))?;

        Ok(LoadOutcome::Loaded(inventory))
    }

    /// Read the inventory, starting from an empty one when no file exists yet
    pub fn load_or_empty(&self) -> Result<Inventory> {
        match self.load()? {
            LoadOutcome::Loaded(inventory) => {
                log::info!(
                    "Loaded {} previous elements from {}",
                    inventory.len(),
                    self.path.display()
                );
                Ok(inventory)
            }
            LoadOutcome::NotFound => {
                log::info!(
                    "Inventory {} not found, a new one will be created",
                    self.path.display()
                );
                Ok(Inventory::new())
            }
        }
    }

    /// Replace the inventory file with the full contents of `inventory`
    ///
    /// The JSON is written to a temporary file next to the target, synced and
    /// renamed over it, so a reader sees either the old or the new inventory.
    /// On any failure the temporary file is removed and the old file is kept.
    pub fn save(&self, inventory: &Inventory) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        self.write_records(temp.as_file_mut(), inventory)
            .map_err(|e| self.write_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        temp.persist(&self.path).map_err(|e| self.write_error(e.error))?;

        log::debug!("Wrote {} elements to {}", inventory.len(), self.path.display());
        Ok(())
    }

    fn write_records(&self, file: &mut fs::File, inventory: &Inventory) -> io::Result<()> {
        let mut writer = BufWriter::new(file);
        let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        let records: Vec<&ElementRecord> = inventory.iter().collect();
        records.serialize(&mut serializer)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    fn read_error(&self, reason: String) -> InventoryError {
        InventoryError::StoreRead {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_error(&self, source: io::Error) -> InventoryError {
        InventoryError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Category, Referenceable};
    use tempfile::TempDir;

    fn record(number: u64, xpath: &str) -> ElementRecord {
        ElementRecord {
            number,
            category: Category::Button,
            name: "submit".to_string(),
            xpath: xpath.to_string(),
            id: Some("go".to_string()),
            class: None,
            label: "Go".to_string(),
            referenceable: Referenceable::Yes,
            timestamp: "2026-10-16 08:00:00.000000".to_string(),
        }
    }

    fn sample_inventory() -> Inventory {
        Inventory::from_records(vec![
            record(1, "/html/body[2]/button[1]"),
            record(2, "/html/body[2]/button[2]"),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = InventoryStore::new(dir.path().join("elements.json"));

        assert!(matches!(store.load().unwrap(), LoadOutcome::NotFound));
        assert!(store.load_or_empty().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = InventoryStore::new(dir.path().join("elements.json"));
        let inventory = sample_inventory();

        store.save(&inventory).unwrap();
        match store.load().unwrap() {
            LoadOutcome::Loaded(loaded) => assert_eq!(loaded, inventory),
            LoadOutcome::NotFound => panic!("inventory should exist after save"),
        }
    }

    #[test]
    fn test_save_format_and_no_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elements.json");
        InventoryStore::new(&path).save(&sample_inventory()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"Number\": 1,"));
        assert!(text.ends_with("]\n"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = InventoryStore::new(dir.path().join("runs").join("home").join("elements.json"));
        store.save(&sample_inventory()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_malformed_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elements.json");
        fs::write(&path, "[{\"Number\": 1,").unwrap();

        let err = InventoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, InventoryError::StoreRead { .. }));
    }

    #[test]
    fn test_duplicate_xpath_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elements.json");
        let records = vec![record(1, "/html/body[1]/a[1]"), record(2, "/html/body[1]/a[1]")];
        fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let err = InventoryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("duplicate XPath /html/body[1]/a[1]"));
    }

    #[test]
    fn test_failed_write_keeps_directory_clean() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by a file
        let target = dir.path().join("elements.json");
        fs::create_dir(&target).unwrap();

        let err = InventoryStore::new(&target).save(&sample_inventory()).unwrap_err();
        assert!(matches!(err, InventoryError::StoreWrite { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(target.is_dir());
    }
}
