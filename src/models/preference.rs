use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book identifier the user entered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceItem {
    /// Unique within the working set, so duplicate values stay removable
    pub id: Uuid,
    /// Digits only, never empty
    pub value: String,
    pub added_at: DateTime<Utc>,
}

/// Ordered working set of book identifiers for one strategy
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PreferenceCollector {
    items: Vec<PreferenceItem>,
}

impl PreferenceCollector {
    /// Creates an empty working set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds an identifier from raw user input
    ///
    /// Identifiers are numeric (ISBN-like), so everything but ASCII digits is
    /// dropped. Input that leaves nothing behind is ignored and `None` is
    /// returned; this is not an error.
    pub fn add(&mut self, raw: &str) -> Option<PreferenceItem> {
        let value = normalize(raw)?;

        let item = PreferenceItem {
            id: Uuid::new_v4(),
            value,
            added_at: Utc::now(),
        };
        self.items.push(item.clone());

        tracing::debug!(item_id = %item.id, value = %item.value, "Preference added");

        Some(item)
    }

    /// Removes the item with the given id; unknown ids are ignored
    pub fn remove(&mut self, id: Uuid) -> Option<PreferenceItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Removes every item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in insertion order
    pub fn list(&self) -> &[PreferenceItem] {
        &self.items
    }

    /// Item values in insertion order
    pub fn values(&self) -> Vec<String> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// TODO: ISBN-10 check digits ('X') are lost here; report them as a validation
// error instead of dropping them once the presentation layer can show one.
fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}
