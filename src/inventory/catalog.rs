use crate::inventory::{Category, ElementRecord, Inventory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One addressable element of a page object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageObjectEntry {
    /// Unique snake_case identifier, e.g. `button_submit`
    pub identifier: String,
    pub category: Category,
    pub xpath: String,
    pub css_selector: String,
    pub label: String,
}

/// Build page-object entries for every currently referenceable record
pub fn build_catalog(inventory: &Inventory) -> Vec<PageObjectEntry> {
    let mut taken = HashSet::new();

    inventory
        .iter()
        .filter(|record| record.is_referenceable())
        .map(|record| {
            let identifier = unique_identifier(&mut taken, base_identifier(record), record.number);

            PageObjectEntry {
                identifier,
                category: record.category,
                xpath: record.xpath.clone(),
                css_selector: css_selector(record),
                label: record.label.clone(),
            }
        })
        .collect()
}

/// Claim `base`, else `base_{number}`, else `base_{number}_{k}` for the first free `k`
fn unique_identifier(taken: &mut HashSet<String>, base: String, number: u64) -> String {
    if taken.insert(base.clone()) {
        return base;
    }

    let mut candidate = format!("{}_{}", base, number);
    let mut k = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}_{}_{}", base, number, k);
        k += 1;
    }
    candidate
}

fn base_identifier(record: &ElementRecord) -> String {
    let source = if !record.name.trim().is_empty() {
        &record.name
    } else {
        &record.label
    };

    let slug = slugify(source);
    if slug.is_empty() {
        format!("{}_{}", record.category, record.number)
    } else {
        format!("{}_{}", record.category, slug)
    }
}

/// Lowercase ASCII words joined by underscores
fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .take(6)
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// `#id`, else the class list as `.a.b`, else the tag name
///
/// Ids and class names are escaped so that values such as `user:name` or
/// `1st` still form a valid selector.
pub fn css_selector(record: &ElementRecord) -> String {
    if let Some(id) = record.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("#{}", css_escape(id));
    }

    if let Some(class) = &record.class {
        let classes: Vec<String> = class.split_whitespace().map(css_escape).collect();
        if !classes.is_empty() {
            return format!(".{}", classes.join("."));
        }
    }

    record.tag().to_string()
}

/// Escape an identifier the way `CSS.escape` does
pub fn css_escape(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut escaped = String::with_capacity(ident.len());

    for (i, &c) in chars.iter().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        match c {
            '\0' => escaped.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => escaped.push_str(&format!("\\{:x} ", c as u32)),
            _ if leading_digit => escaped.push_str(&format!("\\{:x} ", c as u32)),
            '-' if chars.len() == 1 => escaped.push_str("\\-"),
            _ if !c.is_ascii() || c == '-' || c == '_' || c.is_ascii_alphanumeric() => escaped.push(c),
            _ => {
                escaped.push('\\');
                escaped.push(c);
            }
        }
    }

    escaped
}
