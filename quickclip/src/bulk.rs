//! Bulk-add line parser
//!
//! One entry per non-blank line. `label = value` splits on the first `=`;
//! a line without `=` is used as both label and value.

/// A parsed bulk line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEntry {
    pub label: String,
    pub value: String,
}

/// Parse bulk text, top to bottom. `\n`, `\r\n` and a bare `\r` all end a line. Lines whose `=` split leaves an empty side
/// are skipped.
pub fn parse_bulk(text: &str) -> Vec<BulkEntry> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<BulkEntry> {
    match line.split_once('=') {
        Some((label, value)) => {
            let (label, value) = (label.trim(), value.trim());
            if label.is_empty() || value.is_empty() {
                return None;
            }
            Some(BulkEntry {
                label: label.to_string(),
                value: value.to_string(),
            })
        }
        None => Some(BulkEntry {
            label: line.to_string(),
            value: line.to_string(),
        }),
    }
}
