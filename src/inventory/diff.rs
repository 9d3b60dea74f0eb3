use crate::inventory::{Category, ElementRecord, Inventory, Referenceable};
use crate::scan::ObservedElement;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;

/// How an element of the current run relates to the stored inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// First observation of this XPath
    New,
    /// At least one tracked field other than `Referenceable` differed
    Changed,
    /// Only `Referenceable` flipped back from `No` to `Yes`
    Reactivated,
    Unchanged,
    /// Recorded earlier but not observed in this run
    Vanished,
}

/// Result of comparing one element against its record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementOutcome {
    pub number: u64,
    pub category: Category,
    pub xpath: String,
    pub label: String,
    pub classification: Classification,
    /// `Old X: <old>, New X: <new>` for every field that changed
    pub changes: Vec<String>,
}

/// Everything a merge did to the inventory
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    /// Records appended in this run, in discovery order
    pub new_records: Vec<ElementRecord>,

    /// One outcome per distinct XPath processed, in first-seen order
    pub outcomes: Vec<ElementOutcome>,

    /// Whether any existing record was modified
    pub updates_occurred: bool,
}

impl DiffReport {
    /// Whether the inventory must be written back
    pub fn has_changes(&self) -> bool {
        !self.new_records.is_empty() || self.updates_occurred
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.classification == classification)
            .count()
    }

    /// Outcomes that modified an existing record
    pub fn modified(&self) -> impl Iterator<Item = &ElementOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(
                o.classification,
                Classification::Changed | Classification::Reactivated | Classification::Vanished
            )
        })
    }

    /// Fold the result of [`retire_unobserved`] into this report
    pub fn record_vanished(&mut self, vanished: Vec<ElementOutcome>) {
        if !vanished.is_empty() {
            self.updates_occurred = true;
        }
        self.outcomes.extend(vanished);
    }
}

/// Merge the elements observed in a run into the inventory
///
/// Unknown XPaths become new records numbered after the highest number in
/// use. Known XPaths have their tracked fields compared and overwritten; the
/// timestamp only moves when something actually changed. If an XPath shows
/// up twice in one run, the later observation wins, and no second record is
/// ever created.
pub fn diff_and_merge(observed: &[ObservedElement], inventory: &mut Inventory, timestamp: &str) -> DiffReport {
    let mut outcomes: IndexMap<String, ElementOutcome> = IndexMap::new();
    let mut added: Vec<String> = Vec::new();
    let mut added_set: HashSet<String> = HashSet::new();
    let mut updates_occurred = false;

    for element in observed {
        let outcome = if !inventory.contains(&element.xpath) {
            let record = element.to_record(inventory.next_number(), timestamp);
            log::info!(
                "Element {} named '{}' at {} added as #{}",
                element.category,
                element.label,
                element.xpath,
                record.number
            );
            let outcome = outcome_for(&record, Classification::New, Vec::new());
            inventory.insert(record);
            added.push(element.xpath.clone());
            added_set.insert(element.xpath.clone());
            outcome
        } else {
            let is_new = added_set.contains(&element.xpath);
            let Some(record) = inventory.get_mut(&element.xpath) else {
                continue;
            };
            let was_retired = !record.is_referenceable();
            let changes = apply_observation(record, element);

            if is_new {
                if !changes.is_empty() {
                    log::debug!("Element at {} observed twice in one run: {}", element.xpath, changes.join(", "));
                }
                outcome_for(record, Classification::New, Vec::new())
            } else if changes.is_empty() {
                log::info!("Element {} named '{}' at {} exists", element.category, element.label, element.xpath);
                outcome_for(record, Classification::Unchanged, changes)
            } else {
                record.timestamp = timestamp.to_string();
                updates_occurred = true;

                let classification = if was_retired && changes.len() == 1 {
                    log::info!("Element {} named '{}' at {} is back", element.category, element.label, element.xpath);
                    Classification::Reactivated
                } else {
                    log::info!(
                        "Element {} named '{}' at {} changed: {}",
                        element.category,
                        element.label,
                        element.xpath,
                        changes.join(", ")
                    );
                    Classification::Changed
                };
                outcome_for(record, classification, changes)
            }
        };

        outcomes.insert(element.xpath.clone(), outcome);
    }

    let new_records = added
        .iter()
        .filter_map(|xpath| inventory.get(xpath).cloned())
        .collect();

    DiffReport {
        new_records,
        outcomes: outcomes.into_values().collect(),
        updates_occurred,
    }
}

/// Mark every referenceable record that was not observed as `Referenceable = No`
pub fn retire_unobserved(
    observed: &[ObservedElement],
    inventory: &mut Inventory,
    timestamp: &str,
) -> Vec<ElementOutcome> {
    let seen: HashSet<&str> = observed.iter().map(|o| o.xpath.as_str()).collect();
    let mut vanished = Vec::new();

    for record in inventory.iter_mut() {
        if !record.is_referenceable() || seen.contains(record.xpath.as_str()) {
            continue;
        }

        record.referenceable = Referenceable::No;
        record.timestamp = timestamp.to_string();
        log::info!(
            "Element {} named '{}' at {} vanished",
            record.category,
            record.label,
            record.xpath
        );
        vanished.push(outcome_for(
            record,
            Classification::Vanished,
            vec![change_note("Referenceable", Referenceable::Yes, Referenceable::No)],
        ));
    }

    vanished
}

fn outcome_for(record: &ElementRecord, classification: Classification, changes: Vec<String>) -> ElementOutcome {
    ElementOutcome {
        number: record.number,
        category: record.category,
        xpath: record.xpath.clone(),
        label: record.label.clone(),
        classification,
        changes,
    }
}

/// Overwrite every tracked field that differs and describe each change
fn apply_observation(record: &mut ElementRecord, element: &ObservedElement) -> Vec<String> {
    let mut changes = Vec::new();

    track(&mut changes, "Label", &mut record.label, &element.label, |v| v.clone());
    track(&mut changes, "Class", &mut record.class, &element.class, show_optional);
    track(&mut changes, "XPath", &mut record.xpath, &element.xpath, |v| v.clone());
    track(&mut changes, "ID", &mut record.id, &element.id, show_optional);
    track(&mut changes, "Name", &mut record.name, &element.name, |v| v.clone());
    track(&mut changes, "Type", &mut record.category, &element.category, |v| v.to_string());
    track(
        &mut changes,
        "Referenceable",
        &mut record.referenceable,
        &Referenceable::Yes,
        |v| v.to_string(),
    );

    changes
}

fn track<T, F>(changes: &mut Vec<String>, field: &str, stored: &mut T, observed: &T, show: F)
where
    T: PartialEq + Clone,
    F: Fn(&T) -> String,
{
    if stored != observed {
        changes.push(change_note(field, show(stored), show(observed)));
        *stored = observed.clone();
    }
}

fn change_note(field: &str, old: impl Display, new: impl Display) -> String {
    format!("Old {field}: {old}, New {field}: {new}")
}

fn show_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(category: Category, xpath: &str, label: &str) -> ObservedElement {
        ObservedElement {
            category,
            xpath: xpath.to_string(),
            label: label.to_string(),
            name: label.to_string(),
            id: None,
            class: None,
            bounds: None,
        }
    }

    fn button(index: usize, label: &str) -> ObservedElement {
        observed(Category::Button, &format!("/html/body[1]/button[{}]", index), label)
    }

    #[test]
    fn test_new_elements_on_empty_inventory() {
        let mut inventory = Inventory::new();
        let report = diff_and_merge(&[button(1, "Save"), button(2, "Cancel")], &mut inventory, "t1");

        assert!(!report.updates_occurred);
        assert!(report.has_changes());
        assert_eq!(report.new_records.len(), 2);
        assert_eq!(report.new_records[0].number, 1);
        assert_eq!(report.new_records[1].number, 2);
        assert_eq!(report.new_records[1].referenceable, Referenceable::Yes);
        assert_eq!(report.new_records[1].timestamp, "t1");
        assert_eq!(report.count(Classification::New), 2);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_second_identical_run_is_noop() {
        let mut inventory = Inventory::new();
        let elements = [button(1, "Save"), button(2, "Cancel")];
        diff_and_merge(&elements, &mut inventory, "t1");
        let before = inventory.clone();

        let report = diff_and_merge(&elements, &mut inventory, "t2");
        assert!(!report.updates_occurred);
        assert!(report.new_records.is_empty());
        assert!(!report.has_changes());
        assert_eq!(report.count(Classification::Unchanged), 2);
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_changed_fields_are_overwritten_with_notes() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Submit")], &mut inventory, "t1");

        let mut renamed = button(1, "Submit Now");
        renamed.class = Some("btn".to_string());
        let report = diff_and_merge(&[renamed], &mut inventory, "t2");

        assert!(report.updates_occurred);
        let outcome = &report.outcomes[0];
        assert_eq!(outcome.classification, Classification::Changed);
        assert_eq!(
            outcome.changes,
            vec![
                "Old Label: Submit, New Label: Submit Now",
                "Old Class: null, New Class: btn",
                "Old Name: Submit, New Name: Submit Now",
            ]
        );

        let record = inventory.get("/html/body[1]/button[1]").unwrap();
        assert_eq!(record.label, "Submit Now");
        assert_eq!(record.class.as_deref(), Some("btn"));
        assert_eq!(record.timestamp, "t2");
        assert_eq!(record.number, 1);
    }

    #[test]
    fn test_type_change_is_tracked() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Go")], &mut inventory, "t1");

        let link = observed(Category::Link, "/html/body[1]/button[1]", "Go");
        let report = diff_and_merge(&[link], &mut inventory, "t2");
        assert_eq!(report.outcomes[0].changes, vec!["Old Type: button, New Type: link"]);
    }

    #[test]
    fn test_reactivation() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Save")], &mut inventory, "t1");
        inventory.get_mut("/html/body[1]/button[1]").unwrap().referenceable = Referenceable::No;

        let report = diff_and_merge(&[button(1, "Save")], &mut inventory, "t2");
        assert!(report.updates_occurred);
        assert_eq!(report.outcomes[0].classification, Classification::Reactivated);
        assert_eq!(report.outcomes[0].changes, vec!["Old Referenceable: No, New Referenceable: Yes"]);

        let record = inventory.get("/html/body[1]/button[1]").unwrap();
        assert!(record.is_referenceable());
        assert_eq!(record.timestamp, "t2");
    }

    #[test]
    fn test_reactivated_with_other_changes_is_changed() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Save")], &mut inventory, "t1");
        inventory.get_mut("/html/body[1]/button[1]").unwrap().referenceable = Referenceable::No;

        let report = diff_and_merge(&[button(1, "Save draft")], &mut inventory, "t2");
        assert_eq!(report.outcomes[0].classification, Classification::Changed);
        assert_eq!(report.outcomes[0].changes.len(), 3);
    }

    #[test]
    fn test_monotonic_numbering_across_runs() {
        let mut inventory = Inventory::new();
        let mut seen = Vec::new();

        for run in 1..=5 {
            seen.push(button(run, &format!("Button {}", run)));
            let report = diff_and_merge(&seen, &mut inventory, &format!("t{}", run));
            assert_eq!(report.new_records.len(), 1);
            assert_eq!(report.new_records[0].number, run as u64);
            assert!(!report.updates_occurred);
        }

        let numbers: Vec<_> = inventory.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_numbering_continues_after_highest() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "A")], &mut inventory, "t1");
        inventory.get_mut("/html/body[1]/button[1]").unwrap().number = 41;

        let report = diff_and_merge(&[button(1, "A"), button(2, "B"), button(3, "C")], &mut inventory, "t2");
        let numbers: Vec<_> = report.new_records.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![42, 43]);
    }

    #[test]
    fn test_duplicate_xpath_in_one_run_keeps_single_record() {
        let mut inventory = Inventory::new();
        let first = button(1, "Menu");
        let second = observed(Category::Link, "/html/body[1]/button[1]", "Open menu");

        let report = diff_and_merge(&[first, second], &mut inventory, "t1");
        assert_eq!(inventory.len(), 1);
        assert_eq!(report.new_records.len(), 1);
        assert_eq!(report.new_records[0].label, "Open menu");
        assert_eq!(report.new_records[0].category, Category::Link);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].classification, Classification::New);
        assert!(!report.updates_occurred);
    }

    #[test]
    fn test_duplicate_xpath_change_is_sticky() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Menu")], &mut inventory, "t1");

        // The first sighting changes the record, the second matches the new value
        let report = diff_and_merge(&[button(1, "Close"), button(1, "Close")], &mut inventory, "t2");
        assert!(report.updates_occurred);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].classification, Classification::Unchanged);
        assert_eq!(inventory.get("/html/body[1]/button[1]").unwrap().label, "Close");
    }

    #[test]
    fn test_retire_unobserved() {
        let mut inventory = Inventory::new();
        diff_and_merge(&[button(1, "Save"), button(2, "Cancel")], &mut inventory, "t1");

        let still_there = [button(1, "Save")];
        let vanished = retire_unobserved(&still_there, &mut inventory, "t2");
        assert_eq!(vanished.len(), 1);
        assert_eq!(vanished[0].number, 2);
        assert_eq!(vanished[0].classification, Classification::Vanished);

        let record = inventory.get("/html/body[1]/button[2]").unwrap();
        assert_eq!(record.referenceable, Referenceable::No);
        assert_eq!(record.timestamp, "t2");
        assert_eq!(inventory.get("/html/body[1]/button[1]").unwrap().timestamp, "t1");

        // Already retired records are left alone
        assert!(retire_unobserved(&still_there, &mut inventory, "t3").is_empty());
    }

    #[test]
    fn test_record_vanished_sets_updates() {
        let mut report = DiffReport::default();
        report.record_vanished(Vec::new());
        assert!(!report.has_changes());

        let record = button(1, "Old").to_record(1, "t1");
        report.record_vanished(vec![outcome_for(&record, Classification::Vanished, Vec::new())]);
        assert!(report.has_changes());
        assert_eq!(report.modified().count(), 1);
    }
}
