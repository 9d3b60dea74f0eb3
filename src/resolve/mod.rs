//! Per-element resolution: structural identity and descriptive label

pub mod identity;
pub mod label;

pub use identity::resolve_identity;
pub use label::resolve_label;
