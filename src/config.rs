//! Run configuration and the context object handed to every component

use crate::error::{InventoryError, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Format of every persisted timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Options for an inspection run, optionally read from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InventoryOptions {
    pub log_level: LevelFilter,

    /// Inventory file
    pub store_path: PathBuf,

    /// Annotated screenshot, overwritten on every run
    pub screenshot_path: PathBuf,

    /// Mark records whose element was not observed as not referenceable
    pub mark_vanished: bool,

    /// Outline every visible element rather than only tracked ones
    pub highlight_all: bool,
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            store_path: PathBuf::from("elements.json"),
            screenshot_path: PathBuf::from("screenshot.png"),
            mark_vanished: true,
            highlight_all: true,
        }
    }
}

impl InventoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| InventoryError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| InventoryError::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Builder method: set the inventory file
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Builder method: set the screenshot file
    pub fn screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = path.into();
        self
    }

    pub fn log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn mark_vanished(mut self, enabled: bool) -> Self {
        self.mark_vanished = enabled;
        self
    }

    pub fn highlight_all(mut self, enabled: bool) -> Self {
        self.highlight_all = enabled;
        self
    }
}

/// Source of record timestamps
#[derive(Debug, Clone, PartialEq)]
pub enum Clock {
    /// Local wall-clock time
    System,
    /// Always the given value
    Fixed(String),
}

/// Everything a run needs, built once at startup
#[derive(Debug, Clone)]
pub struct RunContext {
    pub options: InventoryOptions,
    clock: Clock,
}

impl RunContext {
    pub fn new(options: InventoryOptions) -> Self {
        Self {
            options,
            clock: Clock::System,
        }
    }

    /// Replace the clock, e.g. to make timestamps reproducible
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current timestamp in [`TIMESTAMP_FORMAT`]
    pub fn timestamp(&self) -> String {
        match &self.clock {
            Clock::System => chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            Clock::Fixed(value) => value.clone(),
        }
    }
}
