//! View filtering: category list, filtered view and list previews
//!
//! Everything here is a pure function of the item slice and the filter, so it
//! is safe to call on every keystroke.

use std::collections::BTreeSet;

use crate::models::{Item, ALL_CATEGORY};

/// Active category + search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub category: String,
    pub query: String,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORY.to_string(),
            query: String::new(),
        }
    }
}

impl ViewFilter {
    pub fn new(category: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
        }
    }

    /// Query as matched: surrounding whitespace ignored, lowercased
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    pub fn is_all(&self) -> bool {
        self.category == ALL_CATEGORY
    }

    fn matches_with(&self, item: &Item, query_lower: &str) -> bool {
        (self.is_all() || item.category == self.category) && item.matches_query(query_lower)
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.matches_with(item, &self.normalized_query())
    }
}

/// Distinct categories, `"All"` first, the rest in case-sensitive lexical order
pub fn compute_categories(items: &[Item]) -> Vec<String> {
    let distinct: BTreeSet<&str> = items
        .iter()
        .map(|item| item.category.as_str())
        .filter(|category| *category != ALL_CATEGORY)
        .collect();

    std::iter::once(ALL_CATEGORY)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

/// Items matching the filter, in store order
pub fn filter_items<'a>(items: &'a [Item], filter: &ViewFilter) -> Vec<&'a Item> {
    let query_lower = filter.normalized_query();
    items
        .iter()
        .filter(|item| filter.matches_with(item, &query_lower))
        .collect()
}

/// Footer counter text: "1 item", "3 items"
pub fn count_label(count: usize) -> String {
    format!("{} item{}", count, if count == 1 { "" } else { "s" })
}

/// Single-line preview: whitespace runs collapsed, truncated to `max_chars`
/// (an ellipsis is appended when truncated).
pub fn generate_preview(content: &str, max_chars: usize) -> String {
    let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max_chars {
        return normalized;
    }
    let mut preview: String = normalized.chars().take(max_chars.saturating_sub(1)).collect();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_CATEGORY;

    fn sample() -> Vec<Item> {
        vec![
            Item::new("Alpha", "first value", Some("Phrases")),
            Item::new("beta", "SECOND value", Some("UPNs")),
            Item::new("Gamma", "third", None),
            Item::new("delta", "fourth", Some("Phrases")),
        ]
    }

    #[test]
    fn test_categories_empty_store() {
        assert_eq!(compute_categories(&[]), vec!["All".to_string()]);
    }

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let cats = compute_categories(&sample());
        assert_eq!(cats, vec!["All", "Phrases", "UPNs", DEFAULT_CATEGORY]);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let items = vec![
            Item::new("a", "1", Some("work")),
            Item::new("b", "2", Some("Work")),
        ];
        // Uppercase sorts before lowercase in byte order
        assert_eq!(compute_categories(&items), vec!["All", "Work", "work"]);
    }

    #[test]
    fn test_literal_all_category_not_duplicated() {
        let items = vec![Item::new("a", "1", Some("All")), Item::new("b", "2", Some("B"))];
        assert_eq!(compute_categories(&items), vec!["All", "B"]);
    }

    #[test]
    fn test_filter_by_category_preserves_order() {
        let items = sample();
        let view = filter_items(&items, &ViewFilter::new("Phrases", ""));
        let labels: Vec<&str> = view.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "delta"]);
    }

    #[test]
    fn test_filter_query_matches_label_or_value() {
        let items = sample();
        let view = filter_items(&items, &ViewFilter::new("All", "second"));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].label, "beta");

        let view = filter_items(&items, &ViewFilter::new("All", "GAMMA"));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].label, "Gamma");
    }

    #[test]
    fn test_filter_query_is_trimmed() {
        let items = sample();
        let view = filter_items(&items, &ViewFilter::new("All", "  value  "));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_filter_combines_category_and_query() {
        let items = sample();
        assert!(filter_items(&items, &ViewFilter::new("UPNs", "alpha")).is_empty());
        assert_eq!(filter_items(&items, &ViewFilter::new("Phrases", "four")).len(), 1);
    }

    #[test]
    fn test_filtered_view_is_subsequence() {
        let items = sample();
        for filter in [
            ViewFilter::default(),
            ViewFilter::new("Phrases", ""),
            ViewFilter::new("All", "e"),
            ViewFilter::new(DEFAULT_CATEGORY, "th"),
        ] {
            let view = filter_items(&items, &filter);
            let mut positions = view
                .iter()
                .map(|v| items.iter().position(|i| i.id == v.id).unwrap());
            let mut last = None;
            for pos in &mut positions {
                assert!(last.map_or(true, |l| pos > l));
                last = Some(pos);
            }
        }
    }

    #[test]
    fn test_filter_empty_store() {
        assert!(filter_items(&[], &ViewFilter::default()).is_empty());
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(0), "0 items");
        assert_eq!(count_label(1), "1 item");
        assert_eq!(count_label(7), "7 items");
    }

    #[test]
    fn test_preview_whitespace_normalization() {
        assert_eq!(generate_preview("  hello\n\nworld  ", 200), "hello world");
    }

    #[test]
    fn test_preview_truncation() {
        let preview = generate_preview(&"a".repeat(300), 20);
        assert_eq!(preview.chars().count(), 20);
        assert!(preview.ends_with('…'));
    }
}
