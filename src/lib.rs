//! # element-inventory
//!
//! Keeps a durable inventory of the interactive elements of a web page across
//! repeated inspection runs, so that UI drift (new controls, renamed labels,
//! relocated elements) shows up as a diff instead of a broken selector.
//!
//! Every run:
//! 1. collects buttons, links, text boxes, images, checkboxes, radio buttons
//!    and dropdowns from a page snapshot,
//! 2. resolves a structural XPath and a descriptive label for each visible one,
//! 3. merges them into the stored inventory (new / changed / unchanged /
//!    reactivated), assigning sequence numbers to new elements,
//! 4. rewrites the inventory file only if something changed,
//! 5. writes a screenshot with every visible element outlined.
//!
//! ## Inspecting a live page
//!
//! ```rust,no_run
//! use element_inventory::{BrowserSession, InventoryOptions, LaunchOptions, RunContext, Scanner};
//!
//! # fn main() -> element_inventory::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let context = RunContext::new(InventoryOptions::default().store_path("elements.json"));
//!
//! let report = Scanner::new(&context).inspect(&session, "https://example.com")?;
//! println!("{} new elements", report.diff.new_records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Diffing a saved snapshot
//!
//! Any [`SnapshotProvider`] can be scanned; [`DomTree`] snapshots can be
//! captured once and replayed without a browser:
//!
//! ```rust,no_run
//! use element_inventory::{DomTree, InventoryOptions, RunContext, Scanner};
//!
//! # fn main() -> element_inventory::Result<()> {
//! let tree = DomTree::from_file("home.dom.json")?;
//! let context = RunContext::new(InventoryOptions::default());
//! let report = Scanner::new(&context).scan(&tree)?;
//! for outcome in report.diff.modified() {
//!     println!("#{} {}: {}", outcome.number, outcome.xpath, outcome.changes.join(", "));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: element handles, snapshot providers and the in-memory [`DomTree`]
//! - [`resolve`]: structural identity and label resolution
//! - [`inventory`]: records, the file store, the diff engine and the page-object catalog
//! - [`scan`]: collection and the run driver
//! - [`annotate`]: screenshot highlighting
//! - [`browser`]: headless_chrome session management
//! - [`config`]: run options and context
//! - [`error`]: Error types and result aliases

pub mod annotate;
pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod inventory;
pub mod resolve;
pub mod scan;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use config::{Clock, InventoryOptions, RunContext};
pub use dom::{BoundingBox, DomTree, ElementHandle, ElementNode, SnapshotProvider};
pub use error::{InventoryError, Result};
pub use inventory::{
    Category, Classification, DiffReport, ElementRecord, Inventory, InventoryStore, LoadOutcome, Referenceable,
};
pub use scan::{ObservedElement, ScanReport, Scanner};
