//! DOM snapshot access
//!
//! This module is the boundary to whatever drives the browser. The core only
//! sees elements through two traits:
//! - [`ElementHandle`]: tag, attributes, text, visibility, geometry and tree navigation
//! - [`SnapshotProvider`]: selector-based collection and id lookup
//!
//! [`DomTree`] implements both over a fully materialized page snapshot,
//! captured from a headless_chrome tab or loaded from a JSON fixture.

pub mod element;
pub mod selector;
pub mod tree;

pub use element::{BoundingBox, ElementNode};
pub use selector::Selector;
pub use tree::{DomTree, NodeRef};

use crate::error::Result;

/// A handle to one element of a page
///
/// Every accessor is fallible: a live driver may lose the node between calls.
pub trait ElementHandle: Clone {
    /// Lowercase tag name
    fn tag_name(&self) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent
    fn get_attribute(&self, name: &str) -> Result<Option<String>>;

    /// Rendered text (what the user sees)
    fn text(&self) -> Result<String>;

    /// Raw text content, including text that is not rendered
    fn text_content(&self) -> Result<String>;

    fn is_visible(&self) -> Result<bool>;

    /// Location and size, when the driver reports them
    fn bounding_box(&self) -> Result<Option<BoundingBox>>;

    /// Parent element, `None` at the top of the tree
    fn parent(&self) -> Result<Option<Self>>;

    /// Direct element children in DOM order
    fn children(&self) -> Result<Vec<Self>>;

    /// Whether both handles point at the same DOM node
    fn same_node(&self, other: &Self) -> bool;
}

/// Supplies element handles for the page currently loaded
pub trait SnapshotProvider {
    type Element<'a>: ElementHandle
    where
        Self: 'a;

    /// Collect every element matching a selector group, in document order
    fn collect(&self, selector: &str) -> Result<Vec<Self::Element<'_>>>;

    /// Look up an element by its `id` attribute
    fn element_by_id(&self, id: &str) -> Result<Option<Self::Element<'_>>>;
}
