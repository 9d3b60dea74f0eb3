use serde::{Deserialize, Serialize};
use std::fmt;

/// Element categories tracked in the inventory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Button,
    Link,
    TextBox,
    Image,
    Checkbox,
    RadioButton,
    Dropdown,
}

impl Category {
    /// All categories in collection order
    pub const ALL: [Category; 7] = [
        Category::Button,
        Category::Link,
        Category::TextBox,
        Category::Image,
        Category::Checkbox,
        Category::RadioButton,
        Category::Dropdown,
    ];

    /// Selector groups for this category; results are concatenated in this order
    pub fn selectors(&self) -> &'static [&'static str] {
        match self {
            Category::Button => &[
                "button",
                "input[type=button], input[type=submit], input[type=reset]",
            ],
            Category::Link => &["a"],
            Category::TextBox => &["input[type=text], textarea"],
            Category::Image => &["img"],
            Category::Checkbox => &["input[type=checkbox]"],
            Category::RadioButton => &["input[type=radio]"],
            Category::Dropdown => &["select"],
        }
    }

    /// Name as persisted in the `Type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Button => "button",
            Category::Link => "link",
            Category::TextBox => "text_box",
            Category::Image => "image",
            Category::Checkbox => "checkbox",
            Category::RadioButton => "radio_button",
            Category::Dropdown => "dropdown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an element was observed and resolved in the most recent run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Referenceable {
    #[default]
    Yes,
    No,
}

impl fmt::Display for Referenceable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Referenceable::Yes => f.write_str("Yes"),
            Referenceable::No => f.write_str("No"),
        }
    }
}

/// One persisted inventory entry; `xpath` is the primary key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementRecord {
    /// Sequence number assigned at first observation
    #[serde(rename = "Number")]
    pub number: u64,

    #[serde(rename = "Type")]
    pub category: Category,

    /// `name` attribute, or the label when the attribute is absent
    #[serde(rename = "Name", default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(rename = "XPath")]
    pub xpath: String,

    #[serde(rename = "ID", default)]
    pub id: Option<String>,

    #[serde(rename = "Class", default)]
    pub class: Option<String>,

    /// Older inventories stored the label under `Text`
    #[serde(rename = "Label", alias = "Text", default, deserialize_with = "null_as_empty")]
    pub label: String,

    #[serde(rename = "Referenceable", default)]
    pub referenceable: Referenceable,

    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ElementRecord {
    /// The tag named by the last XPath segment, e.g. `button` for `/html/body[1]/button[2]`
    pub fn tag(&self) -> &str {
        let segment = self.xpath.rsplit('/').next().unwrap_or_default();
        segment.split('[').next().unwrap_or(segment)
    }

    pub fn is_referenceable(&self) -> bool {
        self.referenceable == Referenceable::Yes
    }
}
