//! Seed snippets for a fresh install, demos and tests.

use once_cell::sync::Lazy;
use serde::Deserialize;

const DEMO_ITEMS_CSV: &str = include_str!("demo_items.csv");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoItem {
    pub label: String,
    pub value: String,
    pub category: String,
}

/// Parsed once; rows that fail to parse are skipped.
pub static DEMO_ITEMS: Lazy<Vec<DemoItem>> = Lazy::new(|| {
    csv::Reader::from_reader(DEMO_ITEMS_CSV.as_bytes())
        .deserialize()
        .filter_map(Result::ok)
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_row_parses() {
        let rows = DEMO_ITEMS_CSV.lines().skip(1).filter(|l| !l.trim().is_empty()).count();
        assert_eq!(DEMO_ITEMS.len(), rows);
    }

    #[test]
    fn quoted_commas_and_backslashes_survive() {
        let thanks = DEMO_ITEMS
            .iter()
            .find(|i| i.label.starts_with("Thanks"))
            .unwrap();
        assert_eq!(thanks.value, "Thanks for getting back to me, I will take a look today.");

        let upn = DEMO_ITEMS.iter().find(|i| i.category == "UPNs").unwrap();
        assert!(upn.value.starts_with("azuread\\admin@"));
    }
}
