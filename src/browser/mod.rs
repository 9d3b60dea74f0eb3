//! Browser driver: launching Chrome, opening pages, DOM snapshots and screenshots

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
