use crate::dom::ElementHandle;
use crate::error::{InventoryError, Result};

/// Tag at which the walk up the ancestor chain stops
pub const ROOT_TAG: &str = "html";

/// Compute the structural XPath of an element
///
/// Each segment is `/tag[n]`, where `n` is the 1-based position of the
/// element among *all* element children of its parent. The path is only
/// stable while the subtree is not mutated, so it must be resolved in the
/// same pass that collected the element.
pub fn resolve_identity<H: ElementHandle>(element: &H) -> Result<String> {
    let mut path = String::new();
    let mut current = element.clone();
    let mut tag = current.tag_name()?;

    while tag != ROOT_TAG {
        let parent = current
            .parent()?
            .ok_or_else(|| unresolved(&tag, "element is detached from the document"))?;

        let position = parent
            .children()?
            .iter()
            .position(|sibling| sibling.same_node(&current))
            .ok_or_else(|| unresolved(&tag, "element is not among its parent's children"))?;

        path.insert_str(0, &format!("/{}[{}]", tag, position + 1));
        current = parent;
        tag = current.tag_name()?;
    }

    Ok(format!("/{}{}", ROOT_TAG, path))
}

fn unresolved(tag: &str, reason: &str) -> InventoryError {
    InventoryError::IdentityResolution {
        tag: tag.to_string(),
        reason: reason.to_string(),
    }
}
