//! A single inspection run
//!
//! Collection, resolution, diff, persistence and annotation happen strictly
//! in that order. Element-level failures are isolated in collection; store
//! and navigation failures end the run.

pub mod collect;

pub use collect::{Observation, ObservedElement, ResolutionFailure, observe};

use crate::annotate;
use crate::browser::BrowserSession;
use crate::config::RunContext;
use crate::dom::{BoundingBox, SnapshotProvider};
use crate::error::Result;
use crate::inventory::{DiffReport, InventoryStore, diff_and_merge, retire_unobserved};
use std::path::PathBuf;

/// Summary of one run
#[derive(Debug)]
pub struct ScanReport {
    pub diff: DiffReport,
    /// Matched elements skipped for not being visible
    pub hidden: usize,
    /// Elements skipped because they could not be resolved
    pub failures: usize,
    /// Records in the inventory after the run
    pub total_records: usize,
    /// Whether the inventory file was rewritten
    pub persisted: bool,
    /// Geometry of the tracked elements observed in this run
    pub observed_boxes: Vec<BoundingBox>,
    /// Annotated screenshot, when one was written
    pub screenshot: Option<PathBuf>,
}

/// Runs inspections against the inventory configured in a [`RunContext`]
pub struct Scanner<'a> {
    context: &'a RunContext,
    store: InventoryStore,
}

impl<'a> Scanner<'a> {
    pub fn new(context: &'a RunContext) -> Self {
        Self {
            context,
            store: InventoryStore::new(&context.options.store_path),
        }
    }

    /// Observe the page, merge it into the stored inventory and persist the
    /// result if anything changed
    pub fn scan<P: SnapshotProvider>(&self, provider: &P) -> Result<ScanReport> {
        let observation = observe(provider)?;
        let mut inventory = self.store.load_or_empty()?;
        let timestamp = self.context.timestamp();

        let mut diff = diff_and_merge(&observation.elements, &mut inventory, &timestamp);

        if self.context.options.mark_vanished {
            if observation.failures.is_empty() {
                let vanished = retire_unobserved(&observation.elements, &mut inventory, &timestamp);
                diff.record_vanished(vanished);
            } else {
                log::warn!(
                    "{} elements could not be resolved, missing elements are not marked as vanished",
                    observation.failures.len()
                );
            }
        }

        let persisted = if diff.has_changes() {
            self.store.save(&inventory)?;
            log::info!("Updates occurred during this run");
            true
        } else {
            log::info!("No changes detected, {} left untouched", self.store.path().display());
            false
        };

        Ok(ScanReport {
            hidden: observation.hidden,
            failures: observation.failures.len(),
            total_records: inventory.len(),
            persisted,
            observed_boxes: observation.boxes(),
            screenshot: None,
            diff,
        })
    }

    /// Open a page, scan it and write the annotated screenshot
    ///
    /// A screenshot failure is logged and leaves the already persisted
    /// inventory as it is.
    pub fn inspect(&self, session: &BrowserSession, url: &str) -> Result<ScanReport> {
        session.navigate(url)?;
        let tree = session.snapshot()?;
        let mut report = self.scan(&tree)?;

        let boxes = if self.context.options.highlight_all {
            tree.visible_boxes()
        } else {
            report.observed_boxes.clone()
        };

        let output = &self.context.options.screenshot_path;
        match session
            .screenshot()
            .and_then(|png| annotate::annotate_screenshot(&png, &boxes, output))
        {
            Ok(drawn) => {
                log::info!("Highlighted {} elements in {}", drawn, output.display());
                report.screenshot = Some(output.clone());
            }
            Err(e) => log::warn!("Annotated screenshot not written: {}", e),
        }

        log::info!("Inspection of {} finished", url);
        Ok(report)
    }
}
