//! QuickClip Interface Definition
//!
//! Shared types, the error enum, and the collaborator traits the store is
//! built on. Presentation layers only need what is exported from here.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ItemRecord;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS & OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Store-change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Item content changed (add, edit, remove, merge, reload)
    ItemsChanged { count: usize },
    /// Category or query changed; the filtered view was recomputed
    ViewChanged { visible: usize },
    /// Selection positions changed
    SelectionChanged { selected: usize },
    /// Human-readable status line for the user
    Status(String),
}

/// Where the working set came from after a refresh attempt
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Remote document loaded and cached
    Remote { count: usize },
    /// Remote failed (or is not configured); the local snapshot was used instead
    Cached {
        count: usize,
        reason: QuickClipError,
    },
}

impl RefreshOutcome {
    pub fn count(&self) -> usize {
        match self {
            RefreshOutcome::Remote { count } | RefreshOutcome::Cached { count, .. } => *count,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RefreshOutcome::Remote { .. })
    }
}

/// Result of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Entries that passed schema validation
    pub accepted: usize,
    /// Entries dropped for missing or non-string label/value
    pub rejected: usize,
    /// Accepted entries with a novel (label, value) key that were appended
    pub added: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for QuickClip operations
///
/// None of these are fatal: every failure leaves the previous store state in
/// place and is reported to the user.
#[derive(Debug, Error)]
pub enum QuickClipError {
    #[error("Invalid item: {0}")]
    Validation(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Malformed document: {0}")]
    Parse(String),
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
    #[error("Could not read file: {0}")]
    FileRead(String),
    #[error("Could not write file: {0}")]
    FileWrite(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Exactly one item must be selected ({selected} selected)")]
    SelectionRequired { selected: usize },
    #[error("Position {position} is outside the current view ({len} items)")]
    SelectionOutOfRange { position: usize, len: usize },
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("No remote source configured")]
    NoRemoteSource,
}

impl From<crate::database::DatabaseError> for QuickClipError {
    fn from(e: crate::database::DatabaseError) -> Self {
        QuickClipError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for QuickClipError {
    fn from(e: serde_json::Error) -> Self {
        QuickClipError::Parse(e.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistent last-good snapshot of the item sequence
pub trait ItemCache: Send + Sync {
    /// Read the snapshot. `Ok(None)` means nothing has been cached yet.
    fn load_items(&self) -> Result<Option<Vec<ItemRecord>>, QuickClipError>;

    /// Overwrite the snapshot with the given sequence
    fn save_items(&self, items: &[ItemRecord]) -> Result<(), QuickClipError>;

    /// Drop the snapshot so the next load sees an empty cache. Returns whether
    /// one existed.
    fn clear_items(&self) -> Result<bool, QuickClipError>;
}

impl<T: ItemCache + ?Sized> ItemCache for Arc<T> {
    fn load_items(&self) -> Result<Option<Vec<ItemRecord>>, QuickClipError> {
        (**self).load_items()
    }

    fn save_items(&self, items: &[ItemRecord]) -> Result<(), QuickClipError> {
        (**self).save_items(items)
    }

    fn clear_items(&self) -> Result<bool, QuickClipError> {
        (**self).clear_items()
    }
}

/// Remote JSON item document
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the current item list, bypassing any HTTP caches
    async fn fetch_items(&self) -> Result<Vec<ItemRecord>, QuickClipError>;
}

/// Plain-text clipboard writer
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), QuickClipError>;
}
