//! QuickClip Core - snippet store for a quick-copy clipboard helper
//!
//! Keeps a most-recent-first list of labelled text snippets, derives the
//! category list and the filtered view, and copies selections to the system
//! clipboard. The working set is snapshotted to a local SQLite cache and can
//! be refreshed from a remote JSON document or imported from a file.

pub mod bulk;
pub mod clipboard;
pub mod config;
pub mod database;
pub mod interface;
pub mod models;
pub mod remote;
pub mod search;
mod store;
pub mod transfer;

pub use interface::*;
pub use models::{Item, ItemId, ItemRecord, ALL_CATEGORY, DEFAULT_CATEGORY};
pub use store::{merge, ItemStore};
