use crate::dom::element::ElementNode;
use crate::error::{InventoryError, Result};

/// A comma-separated selector group such as `input[type=text], textarea`
///
/// Only the subset needed for element categories is supported: a tag name
/// (or `*`) followed by any number of `[attr]` / `[attr=value]` filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<CompoundSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct CompoundSelector {
    /// `None` matches any tag
    tag: Option<String>,
    attributes: Vec<AttributeFilter>,
}

/// HTML attributes whose values match regardless of ASCII case
const CASE_INSENSITIVE_ATTRIBUTES: &[&str] = &["type", "method", "dir", "checked", "disabled", "multiple"];

#[derive(Debug, Clone, PartialEq)]
struct AttributeFilter {
    name: String,
    value: Option<String>,
}

impl AttributeFilter {
    fn accepts(&self, actual: &str) -> bool {
        match &self.value {
            None => true,
            Some(expected) if CASE_INSENSITIVE_ATTRIBUTES.contains(&self.name.as_str()) => {
                expected.eq_ignore_ascii_case(actual)
            }
            Some(expected) => expected == actual,
        }
    }
}

impl Selector {
    /// Parse a selector group
    pub fn parse(source: &str) -> Result<Self> {
        let alternatives = source
            .split(',')
            .map(|part| parse_compound(part, source))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// Check whether any alternative of the group matches the element
    pub fn matches(&self, element: &ElementNode) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(element))
    }
}

impl CompoundSelector {
    fn matches(&self, element: &ElementNode) -> bool {
        if let Some(tag) = &self.tag {
            if !element.is_tag(tag) {
                return false;
            }
        }

        self.attributes
            .iter()
            .all(|filter| element.get_attribute(&filter.name).is_some_and(|actual| filter.accepts(actual)))
    }
}

fn invalid(selector: &str, reason: &str) -> InventoryError {
    InventoryError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_compound(part: &str, full: &str) -> Result<CompoundSelector> {
    let part = part.trim();
    if part.is_empty() {
        return Err(invalid(full, "empty selector"));
    }

    let tag_end = part.find('[').unwrap_or(part.len());
    let tag = match &part[..tag_end] {
        "" | "*" => None,
        name if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            Some(name.to_ascii_lowercase())
        }
        _ => return Err(invalid(full, "only tag names and attribute filters are supported")),
    };

    let mut attributes = Vec::new();
    let mut rest = &part[tag_end..];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(invalid(full, "only tag names and attribute filters are supported"));
        }
        let close = rest
            .find(']')
            .ok_or_else(|| invalid(full, "unterminated attribute filter"))?;
        attributes.push(parse_attribute(&rest[1..close], full)?);
        rest = &rest[close + 1..];
    }

    Ok(CompoundSelector { tag, attributes })
}

fn parse_attribute(body: &str, full: &str) -> Result<AttributeFilter> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
        None => (body.trim(), None),
    };

    if name.is_empty() {
        return Err(invalid(full, "attribute filter without a name"));
    }

    Ok(AttributeFilter {
        name: name.to_ascii_lowercase(),
        value: value.map(str::to_string),
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}
