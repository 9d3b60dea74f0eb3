use crate::dom::{BoundingBox, ElementHandle, SnapshotProvider};
use crate::error::{InventoryError, Result};
use crate::inventory::{Category, ElementRecord, Referenceable};
use crate::resolve::{resolve_identity, resolve_label};

/// A visible element with everything resolved during collection
///
/// The label lives here rather than on the driver's handle, keyed by the
/// element's XPath.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedElement {
    pub category: Category,
    pub xpath: String,
    pub label: String,
    /// `name` attribute, or the label when absent
    pub name: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub bounds: Option<BoundingBox>,
}

impl ObservedElement {
    /// Build a fresh, referenceable record for this element
    pub fn to_record(&self, number: u64, timestamp: &str) -> ElementRecord {
        ElementRecord {
            number,
            category: self.category,
            name: self.name.clone(),
            xpath: self.xpath.clone(),
            id: self.id.clone(),
            class: self.class.clone(),
            label: self.label.clone(),
            referenceable: Referenceable::Yes,
            timestamp: timestamp.to_string(),
        }
    }
}

/// An element that was skipped because it could not be resolved
#[derive(Debug)]
pub struct ResolutionFailure {
    pub category: Category,
    pub error: InventoryError,
}

/// Everything collected from one page
#[derive(Debug, Default)]
pub struct Observation {
    /// Visible, resolved elements in category-then-collection order
    pub elements: Vec<ObservedElement>,
    /// Number of matched elements skipped for not being visible
    pub hidden: usize,
    pub failures: Vec<ResolutionFailure>,
}

impl Observation {
    /// Geometry of the observed elements
    pub fn boxes(&self) -> Vec<BoundingBox> {
        self.elements.iter().filter_map(|e| e.bounds).collect()
    }
}

/// Collect and resolve every tracked element on the page
///
/// A failure on one element is logged and recorded, and collection carries
/// on. Failures of the collection query, and any error that is not tied to a
/// single element, are returned.
pub fn observe<P: SnapshotProvider>(provider: &P) -> Result<Observation> {
    let mut observation = Observation::default();

    for category in Category::ALL {
        for selector in category.selectors() {
            for element in provider.collect(selector)? {
                match observe_element(provider, &element, category) {
                    Ok(Some(observed)) => {
                        log::debug!("Testing element: {} named '{}' at {}", category, observed.label, observed.xpath);
                        observation.elements.push(observed);
                    }
                    Ok(None) => observation.hidden += 1,
                    Err(error) if error.is_element_level() => {
                        log::warn!("Skipping {} element: {}", category, error);
                        observation.failures.push(ResolutionFailure { category, error });
                    }
                    Err(error) => return Err(error),
                }
            }
        }
    }

    Ok(observation)
}

fn observe_element<P: SnapshotProvider>(
    provider: &P,
    element: &P::Element<'_>,
    category: Category,
) -> Result<Option<ObservedElement>> {
    if !element.is_visible()? {
        return Ok(None);
    }

    let xpath = resolve_identity(element)?;
    let label = resolve_label(provider, element)?;
    let name = non_empty(element.get_attribute("name")?).unwrap_or_else(|| label.clone());

    Ok(Some(ObservedElement {
        category,
        xpath,
        label,
        name,
        id: non_empty(element.get_attribute("id")?),
        class: non_empty(element.get_attribute("class")?),
        bounds: element.bounding_box()?,
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, ElementNode};

    fn visible(tag: &str) -> ElementNode {
        ElementNode::new(tag).with_visibility(true)
    }

    fn input(kind: &str) -> ElementNode {
        visible("input").with_attribute("type", kind)
    }

    fn signup_page() -> DomTree {
        let form = ElementNode::new("form").with_children(vec![
            input("text").with_attribute("name", "email").with_attribute("aria-label", "Email"),
            input("submit").with_attribute("value", "Join").with_attribute("title", "Join now"),
            visible("button").with_text("Cancel").with_attribute("class", "btn  secondary"),
            input("checkbox").with_attribute("id", "terms"),
            ElementNode::new("button").with_text("Hidden"),
            visible("select").with_attribute("name", "plan"),
            input("radio").with_attribute("id", ""),
        ]);
        let body = visible("body").with_children(vec![
            visible("a").with_text("Home").with_bounding_box(0.0, 0.0, 40.0, 12.0),
            form,
            visible("img").with_attribute("alt", "logo"),
        ]);
        DomTree::new(ElementNode::new("html").with_children(vec![body]))
    }

    #[test]
    fn test_category_then_collection_order() {
        let observation = observe(&signup_page()).unwrap();
        let summary: Vec<_> = observation
            .elements
            .iter()
            .map(|e| (e.category, e.xpath.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (Category::Button, "/html/body[1]/form[2]/button[3]"),
                (Category::Button, "/html/body[1]/form[2]/input[2]"),
                (Category::Link, "/html/body[1]/a[1]"),
                (Category::TextBox, "/html/body[1]/form[2]/input[1]"),
                (Category::Image, "/html/body[1]/img[3]"),
                (Category::Checkbox, "/html/body[1]/form[2]/input[4]"),
                (Category::RadioButton, "/html/body[1]/form[2]/input[7]"),
                (Category::Dropdown, "/html/body[1]/form[2]/select[6]"),
            ]
        );
        assert_eq!(observation.hidden, 1);
        assert!(observation.failures.is_empty());
    }

    #[test]
    fn test_name_falls_back_to_label() {
        let observation = observe(&signup_page()).unwrap();

        let email = &observation.elements[3];
        assert_eq!(email.label, "Email");
        assert_eq!(email.name, "email");

        let join = &observation.elements[1];
        assert_eq!(join.label, "Join now");
        assert_eq!(join.name, "Join now");
    }

    #[test]
    fn test_blank_attributes_are_absent() {
        let observation = observe(&signup_page()).unwrap();

        let cancel = &observation.elements[0];
        assert_eq!(cancel.class.as_deref(), Some("btn  secondary"));
        assert_eq!(cancel.id, None);

        let radio = &observation.elements[6];
        assert_eq!(radio.id, None);
        let checkbox = &observation.elements[5];
        assert_eq!(checkbox.id.as_deref(), Some("terms"));
        assert_eq!(checkbox.label, "");
    }

    #[test]
    fn test_detached_element_is_isolated() {
        let mut tree = signup_page();
        tree.push_fragment(&ElementNode::new("div").with_children(vec![visible("button").with_text("Ghost")]));

        let observation = observe(&tree).unwrap();
        assert_eq!(observation.elements.len(), 8);
        assert_eq!(observation.failures.len(), 1);
        assert_eq!(observation.failures[0].category, Category::Button);
        assert!(observation.failures[0].error.is_element_level());
    }

    #[test]
    fn test_boxes_only_for_known_geometry() {
        let observation = observe(&signup_page()).unwrap();
        assert_eq!(observation.boxes(), vec![BoundingBox::new(0.0, 0.0, 40.0, 12.0)]);
    }

    #[test]
    fn test_type_attribute_case_is_ignored() {
        let body = visible("body").with_children(vec![
            input("Submit").with_attribute("value", "Send"),
            input("TEXT").with_attribute("name", "q"),
        ]);
        let tree = DomTree::new(ElementNode::new("html").with_children(vec![body]));

        let observation = observe(&tree).unwrap();
        let summary: Vec<_> = observation.elements.iter().map(|e| (e.category, e.xpath.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Category::Button, "/html/body[1]/input[1]"),
                (Category::TextBox, "/html/body[1]/input[2]"),
            ]
        );
    }

    /// A single page whose only element breaks the driver connection when probed
    struct BrokenDriver;

    #[derive(Clone)]
    struct BrokenHandle;

    impl ElementHandle for BrokenHandle {
        fn tag_name(&self) -> Result<String> {
            Ok("button".to_string())
        }
        fn get_attribute(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn text(&self) -> Result<String> {
            Ok(String::new())
        }
        fn text_content(&self) -> Result<String> {
            Ok(String::new())
        }
        fn is_visible(&self) -> Result<bool> {
            Err(InventoryError::TabOperationFailed("connection closed".to_string()))
        }
        fn bounding_box(&self) -> Result<Option<BoundingBox>> {
            Ok(None)
        }
        fn parent(&self) -> Result<Option<Self>> {
            Ok(None)
        }
        fn children(&self) -> Result<Vec<Self>> {
            Ok(Vec::new())
        }
        fn same_node(&self, _other: &Self) -> bool {
            true
        }
    }

    impl SnapshotProvider for BrokenDriver {
        type Element<'a> = BrokenHandle;

        fn collect(&self, selector: &str) -> Result<Vec<BrokenHandle>> {
            Ok(if selector == "button" { vec![BrokenHandle] } else { Vec::new() })
        }

        fn element_by_id(&self, _id: &str) -> Result<Option<BrokenHandle>> {
            Ok(None)
        }
    }

    #[test]
    fn test_driver_failure_aborts_collection() {
        let err = observe(&BrokenDriver).unwrap_err();
        assert!(matches!(err, InventoryError::TabOperationFailed(_)));
    }
}
