use crate::dom::element::{BoundingBox, ElementNode};
use crate::dom::selector::Selector;
use crate::dom::{ElementHandle, SnapshotProvider};
use crate::error::{InventoryError, Result};
use headless_chrome::Tab;
use std::path::Path;
use std::sync::Arc;

/// A fully materialized snapshot of a page's element tree
///
/// The nested [`ElementNode`] tree is kept for serialization; lookups go
/// through a flat, document-ordered index of the same nodes.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Root element of the DOM tree (normally `html`)
    pub root: ElementNode,

    /// Nodes in document order; detached fragments follow the document
    nodes: Vec<NodeData>,
}

#[derive(Debug, Clone)]
struct NodeData {
    /// The element without its children
    element: ElementNode,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Borrowed handle to one node of a [`DomTree`]
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    index: usize,
}

impl DomTree {
    /// Create a DomTree from a root element
    pub fn new(root: ElementNode) -> Self {
        let mut nodes = Vec::new();
        index_subtree(&mut nodes, &root, None);
        Self { root, nodes }
    }

    /// Capture the element tree of the page loaded in a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        // The script serializes the whole tree in a single evaluation so that
        // every index and label comes from the same DOM state.
        let js_code = include_str!("snapshot_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| InventoryError::EvaluationFailed(format!("DOM snapshot script failed: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| InventoryError::DomParseFailed("No value returned from DOM snapshot".to_string()))?;

        // The script returns a JSON string rather than an object
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| InventoryError::DomParseFailed(format!("Expected a JSON string: {}", e)))?;

        Self::from_json_str(&json_str)
    }

    /// Parse a snapshot previously produced by [`DomTree::to_json`]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: ElementNode = serde_json::from_str(json)
            .map_err(|e| InventoryError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;
        Ok(Self::new(root))
    }

    /// Load a snapshot file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InventoryError::DomParseFailed(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| InventoryError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }

    /// Add a subtree that is not connected to the document root, as a driver
    /// can hand back for nodes removed while a page was being collected.
    pub fn push_fragment(&mut self, fragment: &ElementNode) {
        index_subtree(&mut self.nodes, fragment, None);
    }

    /// Count all element nodes, fragments included
    pub fn count_elements(&self) -> usize {
        self.nodes.len()
    }

    /// Handle to the root element
    pub fn root_ref(&self) -> NodeRef<'_> {
        NodeRef { tree: self, index: 0 }
    }

    /// Geometry of every visible, non-empty element in document order
    pub fn visible_boxes(&self) -> Vec<BoundingBox> {
        self.nodes
            .iter()
            .filter(|n| n.element.is_visible)
            .filter_map(|n| n.element.bounding_box)
            .filter(BoundingBox::is_visible)
            .collect()
    }

    fn data(&self, index: usize) -> &NodeData {
        &self.nodes[index]
    }
}

fn index_subtree(nodes: &mut Vec<NodeData>, node: &ElementNode, parent: Option<usize>) -> usize {
    let index = nodes.len();
    nodes.push(NodeData {
        element: ElementNode {
            tag_name: node.tag_name.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            text_content: node.text_content.clone(),
            children: Vec::new(),
            is_visible: node.is_visible,
            bounding_box: node.bounding_box,
        },
        parent,
        children: Vec::new(),
    });

    for child in &node.children {
        let child_index = index_subtree(nodes, child, Some(index));
        nodes[index].children.push(child_index);
    }

    index
}

impl<'a> NodeRef<'a> {
    /// The captured element, without children
    pub fn element(&self) -> &'a ElementNode {
        &self.tree.data(self.index).element
    }
}

impl ElementHandle for NodeRef<'_> {
    fn tag_name(&self) -> Result<String> {
        Ok(self.element().tag_name.to_ascii_lowercase())
    }

    fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.element().get_attribute(name).cloned())
    }

    fn text(&self) -> Result<String> {
        Ok(self.element().text.clone().unwrap_or_default())
    }

    fn text_content(&self) -> Result<String> {
        Ok(self.element().text_content.clone().unwrap_or_default())
    }

    fn is_visible(&self) -> Result<bool> {
        Ok(self.element().is_visible)
    }

    fn bounding_box(&self) -> Result<Option<BoundingBox>> {
        Ok(self.element().bounding_box)
    }

    fn parent(&self) -> Result<Option<Self>> {
        Ok(self
            .tree
            .data(self.index)
            .parent
            .map(|index| NodeRef { tree: self.tree, index }))
    }

    fn children(&self) -> Result<Vec<Self>> {
        Ok(self
            .tree
            .data(self.index)
            .children
            .iter()
            .map(|&index| NodeRef { tree: self.tree, index })
            .collect())
    }

    fn same_node(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl SnapshotProvider for DomTree {
    type Element<'a> = NodeRef<'a>;

    fn collect(&self, selector: &str) -> Result<Vec<NodeRef<'_>>> {
        let selector = Selector::parse(selector)?;
        Ok((0..self.nodes.len())
            .filter(|&index| selector.matches(&self.nodes[index].element))
            .map(|index| NodeRef { tree: self, index })
            .collect())
    }

    fn element_by_id(&self, id: &str) -> Result<Option<NodeRef<'_>>> {
        Ok(self
            .nodes
            .iter()
            .position(|n| n.element.id().is_some_and(|v| v == id))
            .map(|index| NodeRef { tree: self, index }))
    }
}
