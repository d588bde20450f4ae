//! ItemStore - the working set of snippets plus view and selection state
//!
//! Single writer, run-to-completion: every command executes fully on the
//! calling thread. Remote refresh and file import are async but never overlap
//! with another mutation because they take `&mut self`.
//!
//! Selection invariant: positions index the *current* filtered view. Anything
//! that changes the filter or the item list clears the selection.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::bulk::parse_bulk;
use crate::clipboard::join_values;
use crate::interface::{
    ClipboardSink, ImportSummary, ItemCache, QuickClipError, RefreshOutcome, RemoteSource,
    StoreEvent,
};
use crate::models::{Item, ItemId, ItemRecord, ALL_CATEGORY};
use crate::search::{compute_categories, filter_items, ViewFilter};
use crate::transfer::{export_file_name, parse_item_document, ExportDocument};

/// Buffered notifications per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 64;

/// Union of two item sets keyed on exact `(label, value)`.
///
/// Every existing item is kept in place. Incoming items with a key not seen
/// yet are appended in input order; the rest (including their category) are
/// discarded.
pub fn merge(existing: Vec<Item>, incoming: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(String, String)> = existing
        .iter()
        .map(|item| (item.label.clone(), item.value.clone()))
        .collect();

    let mut merged = existing;
    for item in incoming {
        if seen.insert((item.label.clone(), item.value.clone())) {
            merged.push(item);
        }
    }
    merged
}

pub struct ItemStore {
    /// Most recent first
    items: Vec<Item>,
    filter: ViewFilter,
    selection: BTreeSet<usize>,
    cache: Box<dyn ItemCache>,
    source: Option<Box<dyn RemoteSource>>,
    events: broadcast::Sender<StoreEvent>,
}

impl ItemStore {
    /// Empty store persisting to `cache`
    pub fn new(cache: impl ItemCache + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items: Vec::new(),
            filter: ViewFilter::default(),
            selection: BTreeSet::new(),
            cache: Box::new(cache),
            source: None,
            events,
        }
    }

    pub fn with_remote_source(mut self, source: impl RemoteSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn has_remote_source(&self) -> bool {
        self.source.is_some()
    }

    /// Receive store-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// `"All"` followed by every distinct category
    pub fn categories(&self) -> Vec<String> {
        compute_categories(&self.items)
    }

    pub fn active_category(&self) -> &str {
        &self.filter.category
    }

    pub fn query(&self) -> &str {
        &self.filter.query
    }

    /// Items matching the active category and query, in store order
    pub fn filtered_view(&self) -> Vec<&Item> {
        filter_items(&self.items, &self.filter)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // View & Selection
    // ─────────────────────────────────────────────────────────────────────────────

    /// Switch the active category. Must be `"All"` or a category in use.
    pub fn set_category(&mut self, category: &str) -> Result<(), QuickClipError> {
        if category != ALL_CATEGORY && !self.items.iter().any(|item| item.category == category) {
            return Err(QuickClipError::UnknownCategory(category.to_string()));
        }
        self.filter.category = category.to_string();
        self.view_changed();
        Ok(())
    }

    pub fn set_query(&mut self, query: &str) {
        self.filter.query = query.to_string();
        self.view_changed();
    }

    /// Select exactly one position
    pub fn select(&mut self, position: usize) -> Result<(), QuickClipError> {
        self.check_position(position)?;
        self.selection.clear();
        self.selection.insert(position);
        self.emit(StoreEvent::SelectionChanged { selected: 1 });
        Ok(())
    }

    /// Add or remove one position from the selection
    pub fn toggle(&mut self, position: usize) -> Result<(), QuickClipError> {
        self.check_position(position)?;
        if !self.selection.remove(&position) {
            self.selection.insert(position);
        }
        self.emit(StoreEvent::SelectionChanged { selected: self.selection.len() });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit(StoreEvent::SelectionChanged { selected: 0 });
        }
    }

    /// Selected positions, ascending
    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    /// Selected items in filtered-view order
    pub fn selected_items(&self) -> Vec<&Item> {
        let view = self.filtered_view();
        self.selection
            .iter()
            .filter_map(|&position| view.get(position).copied())
            .collect()
    }

    fn check_position(&self, position: usize) -> Result<(), QuickClipError> {
        let len = self.filtered_view().len();
        if position >= len {
            return Err(QuickClipError::SelectionOutOfRange { position, len });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Prepend a single item. The label is trimmed; the value is kept verbatim
    /// and only rejected when it is empty.
    pub fn add(&mut self, label: &str, value: &str, category: &str) -> Result<ItemId, QuickClipError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(QuickClipError::Validation("label is required".into()));
        }
        if value.is_empty() {
            return Err(QuickClipError::Validation("value is required".into()));
        }

        let item = Item::new(label, value, Some(category));
        let id = item.id;
        self.items.insert(0, item);
        self.items_changed();
        self.status(format!("Added \"{}\".", label));
        Ok(id)
    }

    /// Prepend one item per accepted line, top to bottom, so the last line
    /// ends up first. Returns how many were added.
    pub fn bulk_add(&mut self, text: &str, default_category: &str) -> usize {
        let entries = parse_bulk(text);
        if entries.is_empty() {
            return 0;
        }

        let count = entries.len();
        for entry in entries {
            self.items
                .insert(0, Item::new(entry.label, entry.value, Some(default_category)));
        }
        self.items_changed();
        self.status(format!("Added {} item(s).", count));
        count
    }

    /// Rewrite the single selected item in place (its id is kept)
    pub fn edit(&mut self, label: &str, value: &str, category: &str) -> Result<ItemId, QuickClipError> {
        let selected = self.selected_items();
        if selected.len() != 1 {
            return Err(QuickClipError::SelectionRequired { selected: selected.len() });
        }
        let id = selected[0].id;

        let label = label.trim();
        if label.is_empty() {
            return Err(QuickClipError::Validation("label is required".into()));
        }
        if value.is_empty() {
            return Err(QuickClipError::Validation("value is required".into()));
        }

        let replacement = Item {
            id,
            ..Item::new(label, value, Some(category))
        };
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            *item = replacement;
        }
        self.items_changed();
        self.status(format!("Updated \"{}\".", label));
        Ok(id)
    }

    /// Remove the selected items (by id, so identical twins are told apart)
    pub fn remove_selected(&mut self) -> usize {
        let doomed: HashSet<ItemId> = self.selected_items().iter().map(|item| item.id).collect();
        if doomed.is_empty() {
            self.clear_selection();
            return 0;
        }

        self.items.retain(|item| !doomed.contains(&item.id));
        self.items_changed();
        self.status(format!("Removed {} item(s).", doomed.len()));
        doomed.len()
    }

    /// Merge `incoming` into the store (see [`merge`]). Returns how many were added.
    pub fn merge_items(&mut self, incoming: Vec<Item>) -> usize {
        let before = self.items.len();
        self.items = merge(std::mem::take(&mut self.items), incoming);
        let added = self.items.len() - before;
        if added > 0 {
            self.items_changed();
        }
        added
    }

    /// Overwrite the whole working set
    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.items = items;
        self.items_changed();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cache & Remote
    // ─────────────────────────────────────────────────────────────────────────────

    /// Load the local snapshot. `Ok(None)` when nothing was ever cached, in
    /// which case the in-memory items are left alone.
    pub fn load_from_cache(&mut self) -> Result<Option<usize>, QuickClipError> {
        let Some(records) = self.cache.load_items()? else {
            log::debug!("No local snapshot");
            return Ok(None);
        };

        self.items = items_from_records(records);
        self.reset_missing_category();
        self.emit(StoreEvent::ItemsChanged { count: self.items.len() });
        self.view_changed();
        log::info!("Loaded {} items from local cache", self.items.len());
        Ok(Some(self.items.len()))
    }

    /// Fetch the remote document; on success it replaces the working set and
    /// the cache, on any failure the local snapshot is used instead.
    pub async fn refresh_from_remote(&mut self) -> RefreshOutcome {
        let result = match &self.source {
            Some(source) => source.fetch_items().await,
            None => Err(QuickClipError::NoRemoteSource),
        };

        match result {
            Ok(records) => {
                let items = items_from_records(records);
                let count = items.len();
                self.replace_all(items);
                self.status(format!("Loaded {} item(s) from remote.", count));
                RefreshOutcome::Remote { count }
            }
            Err(reason) => {
                log::warn!("Remote refresh failed: {}", reason);
                if let Err(e) = self.load_from_cache() {
                    log::warn!("Local cache unavailable, keeping current items: {}", e);
                }
                self.status(format!("{}; using local items.", reason));
                RefreshOutcome::Cached {
                    count: self.items.len(),
                    reason,
                }
            }
        }
    }

    /// Empty the working set and drop the local snapshot, so the next start
    /// behaves like a fresh install. Returns whether a snapshot existed.
    pub fn reset(&mut self) -> Result<bool, QuickClipError> {
        let existed = self.cache.clear_items()?;
        self.items.clear();
        self.reset_missing_category();
        self.emit(StoreEvent::ItemsChanged { count: 0 });
        self.view_changed();
        self.status("Cleared all items.".to_string());
        Ok(existed)
    }

    /// Persist the current items
    fn persist(&self) {
        let records: Vec<ItemRecord> = self.items.iter().map(Item::to_record).collect();
        if let Err(e) = self.cache.save_items(&records) {
            log::warn!("Failed to save local cache: {}", e);
            self.emit(StoreEvent::Status(format!("Could not save local cache: {}", e)));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Import / Export
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validate a whole import document, then merge the accepted entries
    pub fn import_json(&mut self, text: &str) -> Result<ImportSummary, QuickClipError> {
        let parsed = parse_item_document(text)?;
        if parsed.records.is_empty() && parsed.rejected > 0 {
            return Err(QuickClipError::Validation(format!(
                "no importable items ({} rejected)",
                parsed.rejected
            )));
        }

        let accepted = parsed.records.len();
        let added = self.merge_items(items_from_records(parsed.records));
        self.status(format!(
            "Imported {} new item(s) ({} duplicate, {} rejected).",
            added,
            accepted - added,
            parsed.rejected
        ));
        Ok(ImportSummary {
            accepted,
            rejected: parsed.rejected,
            added,
        })
    }

    /// Read an import file fully, then import it. A read failure leaves the
    /// store untouched.
    pub async fn import_file(&mut self, path: &Path) -> Result<ImportSummary, QuickClipError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| QuickClipError::FileRead(format!("{}: {}", path.display(), e)))?;
        self.import_json(&text)
    }

    pub fn export_document(&self, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument::new(&self.items, now)
    }

    /// Write an export file into `dir`; returns its path
    pub fn export_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, QuickClipError> {
        let json = self.export_document(now).to_json_pretty()?;
        let path = dir.join(export_file_name(now));
        std::fs::write(&path, json)
            .map_err(|e| QuickClipError::FileWrite(format!("{}: {}", path.display(), e)))?;
        self.status(format!("Exported {} item(s) to {}.", self.items.len(), path.display()));
        Ok(path)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Clipboard
    // ─────────────────────────────────────────────────────────────────────────────

    /// Copy the selected values, newline-joined in view order. Returns how many
    /// were copied (0 with nothing selected).
    pub fn copy_selected(&self, sink: &mut dyn ClipboardSink) -> Result<usize, QuickClipError> {
        let selected = self.selected_items();
        if selected.is_empty() {
            return Ok(0);
        }

        let text = join_values(selected.iter().copied());
        match sink.write_text(&text) {
            Ok(()) => {
                self.status(format!("Copied {} item(s) to clipboard.", selected.len()));
                Ok(selected.len())
            }
            Err(e) => {
                self.status(format!("Copy failed: {}", e));
                Err(e)
            }
        }
    }

    /// Select one position and copy it
    pub fn activate(&mut self, position: usize, sink: &mut dyn ClipboardSink) -> Result<usize, QuickClipError> {
        self.select(position)?;
        self.copy_selected(sink)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────────

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn status(&self, message: String) {
        log::info!("{}", message);
        self.emit(StoreEvent::Status(message));
    }

    /// Filter inputs changed: selection positions are stale
    fn view_changed(&mut self) {
        self.selection.clear();
        self.emit(StoreEvent::ViewChanged { visible: self.filtered_view().len() });
        self.emit(StoreEvent::SelectionChanged { selected: 0 });
    }

    /// Item content changed: persist, then refresh view state
    fn items_changed(&mut self) {
        self.reset_missing_category();
        self.persist();
        self.emit(StoreEvent::ItemsChanged { count: self.items.len() });
        self.view_changed();
    }

    /// Fall back to "All" once the active category has no items left
    fn reset_missing_category(&mut self) {
        if !self.filter.is_all()
            && !self.items.iter().any(|item| item.category == self.filter.category)
        {
            log::debug!("Category {:?} is empty, showing all", self.filter.category);
            self.filter.category = ALL_CATEGORY.to_string();
        }
    }
}

/// Convert wire records, dropping any with a blank label
fn items_from_records(records: Vec<ItemRecord>) -> Vec<Item> {
    records
        .into_iter()
        .filter_map(|record| match Item::from_record(record) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping item: {}", e);
                None
            }
        })
        .collect()
}
