use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while collecting, resolving, diffing or persisting elements
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The browser process could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Connecting to an already running browser failed
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// The page could not be opened; aborts the run before collection
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The DOM snapshot returned by the page (or read from disk) is unusable
    #[error("Failed to parse DOM snapshot: {0}")]
    DomParseFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The element could not be placed in its parent's children, or its
    /// ancestor chain does not reach the document root
    #[error("Cannot resolve identity of <{tag}>: {reason}")]
    IdentityResolution { tag: String, reason: String },

    /// The inventory file exists but could not be read or parsed
    #[error("Failed to read inventory {}: {reason}", path.display())]
    StoreRead { path: PathBuf, reason: String },

    /// The inventory could not be written; detected changes are lost
    #[error("Failed to write inventory {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render annotated screenshot: {0}")]
    RenderFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InventoryError {
    /// Whether the error only concerns a single element and the run may continue
    pub fn is_element_level(&self) -> bool {
        matches!(self, InventoryError::IdentityResolution { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InventoryError>;
