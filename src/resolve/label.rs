use crate::dom::{ElementHandle, SnapshotProvider};
use crate::error::Result;

/// Attributes consulted, in order, before any referenced or rendered text
const LABEL_ATTRIBUTES: [&str; 2] = ["aria-label", "title"];

/// Resolve a human-readable label for an element
///
/// The first non-empty source wins:
/// 1. `aria-label`
/// 2. `title`
/// 3. text of the elements listed in `aria-labelledby`, joined by a space
/// 4. rendered text
/// 5. raw text content
///
/// An empty string is a valid result.
pub fn resolve_label<P: SnapshotProvider>(provider: &P, element: &P::Element<'_>) -> Result<String> {
    for attribute in LABEL_ATTRIBUTES {
        if let Some(value) = element.get_attribute(attribute)? {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }

    if let Some(ids) = element.get_attribute("aria-labelledby")? {
        let referenced = labelled_by_text(provider, &ids)?;
        if !referenced.is_empty() {
            return Ok(referenced);
        }
    }

    let text = element.text()?;
    if !text.trim().is_empty() {
        return Ok(text.trim().to_string());
    }

    Ok(element.text_content()?.trim().to_string())
}

fn labelled_by_text<P: SnapshotProvider>(provider: &P, ids: &str) -> Result<String> {
    let mut parts = Vec::new();

    for id in ids.split_whitespace() {
        let Some(target) = provider.element_by_id(id)? else {
            log::debug!("aria-labelledby references unknown id '{}'", id);
            continue;
        };

        // Label elements are often visually hidden
        let mut text = target.text()?.trim().to_string();
        if text.is_empty() {
            text = target.text_content()?.trim().to_string();
        }
        if !text.is_empty() {
            parts.push(text);
        }
    }

    Ok(parts.join(" "))
}
