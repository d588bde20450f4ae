//! Core data models for QuickClip
//!
//! `Item` is the in-memory record the store works on. `ItemRecord` is its wire
//! shape, shared by the cache snapshot, the remote document and export files.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interface::QuickClipError;

/// Category assigned when an item has none (or a blank one)
pub const DEFAULT_CATEGORY: &str = "Uncategorised";

/// Sentinel category that selects every item
pub const ALL_CATEGORY: &str = "All";

/// Stable synthetic identity, assigned when an item is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Serialized item shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ItemRecord {
    pub fn new(label: impl Into<String>, value: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            category: category.map(str::to_string),
        }
    }
}

/// A clipboard-able snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub label: String,
    /// Copied verbatim; whitespace is part of the payload
    pub value: String,
    /// Always normalized (trimmed, never blank)
    pub category: String,
}

impl Item {
    /// Create an item with a fresh id. Fields are taken as given apart from
    /// category normalization; callers validate first.
    pub fn new(label: impl Into<String>, value: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            id: ItemId::new(),
            label: label.into(),
            value: value.into(),
            category: normalize_category(category),
        }
    }

    /// Build an item from a wire record, rejecting a blank label
    pub fn from_record(record: ItemRecord) -> Result<Self, QuickClipError> {
        if record.label.trim().is_empty() {
            return Err(QuickClipError::Validation("label is empty".into()));
        }
        Ok(Self::new(record.label, record.value, record.category.as_deref()))
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            label: self.label.clone(),
            value: self.value.clone(),
            category: Some(self.category.clone()),
        }
    }

    /// De-duplication key: exact, case-sensitive (label, value)
    pub fn key(&self) -> (&str, &str) {
        (&self.label, &self.value)
    }

    /// Case-insensitive substring match on label or value.
    /// `query_lower` must already be lowercased.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        query_lower.is_empty()
            || self.label.to_lowercase().contains(query_lower)
            || self.value.to_lowercase().contains(query_lower)
    }
}

/// Trimmed category, or `DEFAULT_CATEGORY` when absent or blank
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_category_defaults() {
        assert_eq!(Item::new("a", "1", None).category, DEFAULT_CATEGORY);
        assert_eq!(Item::new("a", "1", Some("   ")).category, DEFAULT_CATEGORY);
        assert_eq!(Item::new("a", "1", Some(" Work ")).category, "Work");
    }

    #[test]
    fn test_ids_are_unique_for_identical_items() {
        let a = Item::new("same", "same", None);
        let b = Item::new("same", "same", None);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_record_rejects_blank_label() {
        let err = Item::from_record(ItemRecord::new("  ", "x", None)).unwrap_err();
        assert!(matches!(err, QuickClipError::Validation(_)));
    }

    #[test]
    fn test_from_record_allows_empty_value() {
        let item = Item::from_record(ItemRecord::new("label", "", Some("Z"))).unwrap();
        assert_eq!(item.value, "");
        assert_eq!(item.category, "Z");
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let item = Item::new("Next Week", "Awaiting RESPONSE.", None);
        assert!(item.matches_query("next"));
        assert!(item.matches_query("response"));
        assert!(item.matches_query(""));
        assert!(!item.matches_query("tomorrow"));
    }

    #[test]
    fn test_record_serialization_omits_missing_category() {
        let json = serde_json::to_string(&ItemRecord::new("p", "q", None)).unwrap();
        assert_eq!(json, r#"{"label":"p","value":"q"}"#);

        let record: ItemRecord = serde_json::from_str(r#"{"label":"p","value":"q","category":"Z"}"#).unwrap();
        assert_eq!(record.category.as_deref(), Some("Z"));
    }
}
