//! Export/import documents
//!
//! Export writes `{ format, exportedAt, items }`. Import (and the remote
//! document) accepts either a bare item array or an object with an `items`
//! array; entries without string `label` and `value` are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::interface::QuickClipError;
use crate::models::{Item, ItemRecord};

/// Format tag written into every export
pub const EXPORT_FORMAT: &str = "quick-clipboard/v1";

/// Export file envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub format: String,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<ItemRecord>,
}

impl ExportDocument {
    pub fn new(items: &[Item], exported_at: DateTime<Utc>) -> Self {
        Self {
            format: EXPORT_FORMAT.to_string(),
            exported_at,
            items: items.iter().map(Item::to_record).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, QuickClipError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Download file name for an export taken at `now`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("quick-clipboard-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Schema-checked entries of an item document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDocument {
    pub records: Vec<ItemRecord>,
    pub rejected: usize,
}

/// Parse and validate a whole document before anything touches the store
pub fn parse_item_document(text: &str) -> Result<ParsedDocument, QuickClipError> {
    let root: Value = serde_json::from_str(text)?;

    let entries = match root {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(QuickClipError::Parse(
                    "expected an object with an \"items\" array".into(),
                ))
            }
        },
        _ => {
            return Err(QuickClipError::Parse(
                "expected an item array or an object with an \"items\" array".into(),
            ))
        }
    };

    let mut parsed = ParsedDocument::default();
    for entry in entries {
        match record_from_value(&entry) {
            Some(record) => parsed.records.push(record),
            None => parsed.rejected += 1,
        }
    }
    Ok(parsed)
}

fn record_from_value(entry: &Value) -> Option<ItemRecord> {
    let obj = entry.as_object()?;
    let label = obj.get("label")?.as_str()?;
    let value = obj.get("value")?.as_str()?;
    if label.trim().is_empty() {
        return None;
    }
    // A non-string category is treated as absent
    let category = obj.get("category").and_then(Value::as_str);
    Some(ItemRecord::new(label, value, category))
}
