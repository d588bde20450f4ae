//! QuickClip command-line front end
//!
//! Each invocation loads the cached working set, applies the view filter from
//! the top-level flags, runs one command, and prints the store's status lines.
//! Positions passed to `edit`, `remove` and `copy` index that filtered view,
//! exactly as `list` prints it.
//!
//! Run with: cargo run -p quickclip-cli -- list

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use demo_data::DEMO_ITEMS;
use quickclip::clipboard::SystemClipboard;
use quickclip::config::Config;
use quickclip::database::Database;
use quickclip::remote::HttpItemSource;
use quickclip::search::{count_label, generate_preview};
use quickclip::{Item, ItemStore, RefreshOutcome, StoreEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Width of the value preview in `list`
const PREVIEW_CHARS: usize = 60;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only show items in this category ("All" for everything)
    #[arg(short, long)]
    category: Option<String>,

    /// Case-insensitive filter on label and value
    #[arg(short, long)]
    query: Option<String>,

    /// SQLite cache location (overrides config)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Remote item document URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filtered view with positions
    List {
        /// Print the view as a JSON item array
        #[arg(long)]
        json: bool,
    },
    /// Print the category list ("*" marks the active one)
    Categories,
    /// Add one item to the front of the list
    Add {
        label: String,
        value: String,
        #[arg(short, long, default_value = "")]
        category: String,
    },
    /// Add one item per line ("label = value" or plain text) from a file or stdin
    BulkAdd {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Edit the item at a position; omitted fields keep their current value
    Edit {
        position: usize,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove the items at the given positions
    Remove {
        #[arg(required = true)]
        positions: Vec<usize>,
    },
    /// Copy the values at the given positions to the clipboard (newline-joined)
    Copy {
        #[arg(required = true)]
        positions: Vec<usize>,
    },
    /// Write every item to quick-clipboard-<timestamp>.json
    Export {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Merge items from an export file or a bare item array
    Import { file: PathBuf },
    /// Reload the working set from the remote document (falls back to the cache)
    Refresh,
    /// Merge the built-in demo snippets
    Seed,
    /// Delete every item and the local cache (the next run starts fresh)
    Reset,
}

/// Merge the bundled demo snippets; returns how many were new
fn insert_demo_items(store: &mut ItemStore) -> usize {
    let items: Vec<Item> = DEMO_ITEMS
        .iter()
        .map(|demo| Item::new(&demo.label, &demo.value, Some(demo.category.as_str())))
        .collect();
    store.merge_items(items)
}

/// Select every position in the current view (positions are deduplicated)
fn select_positions(store: &mut ItemStore, positions: &[usize]) -> Result<()> {
    store.clear_selection();
    for &position in positions {
        if !store.selection().contains(&position) {
            store.toggle(position)?;
        }
    }
    Ok(())
}

fn print_view(store: &ItemStore) {
    let view = store.filtered_view();
    for (position, item) in view.iter().enumerate() {
        let preview = generate_preview(&item.value, PREVIEW_CHARS);
        if preview == item.label {
            println!("{:>4}  [{}] {}", position, item.category, item.label);
        } else {
            println!("{:>4}  [{}] {}  |  {}", position, item.category, item.label, preview);
        }
    }
    println!("{}", count_label(view.len()));
}

/// Pending status lines; events dropped by a lagging receiver are skipped
fn collect_status(events: &mut broadcast::Receiver<StoreEvent>) -> Vec<String> {
    let mut messages = Vec::new();
    loop {
        match events.try_recv() {
            Ok(StoreEvent::Status(message)) => messages.push(message),
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                log::debug!("Missed {} store events", skipped);
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    messages
}

fn open_store(config: &Config) -> Result<ItemStore> {
    let cache_path = config.cache_path();
    log::debug!("Opening cache at {}", cache_path.display());
    let db = Database::open(&cache_path)
        .with_context(|| format!("Failed to open cache at {}", cache_path.display()))?;

    let mut store = ItemStore::new(db);
    if let Some(url) = config.remote_url() {
        let source = HttpItemSource::new(url, config.fetch_timeout())
            .context("Invalid remote URL")?;
        log::debug!("Remote item document at {}", source.url());
        store = store.with_remote_source(source);
    }
    Ok(store)
}

/// Load the cached working set, seeding the demo snippets into an empty cache
fn load_working_set(store: &mut ItemStore, config: &Config) {
    match store.load_from_cache() {
        Ok(Some(count)) => log::debug!("Loaded {} cached items", count),
        Ok(None) if config.seed_demo() => {
            let seeded = insert_demo_items(store);
            log::info!("Seeded {} demo items into empty cache", seeded);
        }
        Ok(None) => {}
        Err(e) => log::warn!("Local cache unreadable, starting empty: {}", e),
    }
}

async fn run(args: Args, store: &mut ItemStore, config: &Config) -> Result<()> {
    match args.command {
        Command::List { json } => {
            if json {
                let records: Vec<_> = store.filtered_view().iter().map(|i| i.to_record()).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_view(store);
            }
        }
        Command::Categories => {
            for category in store.categories() {
                let marker = if category == store.active_category() { "*" } else { " " };
                println!("{} {}", marker, category);
            }
        }
        Command::Add { label, value, category } => {
            store.add(&label, &value, &category)?;
        }
        Command::BulkAdd { category, file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read stdin")?;
                    text
                }
            };
            let category = category.unwrap_or_else(|| config.default_category().to_string());
            if store.bulk_add(&text, &category) == 0 {
                bail!("No items found in input");
            }
        }
        Command::Edit { position, label, value, category } => {
            store.select(position)?;
            let current = store
                .selected_items()
                .first()
                .map(|item| (*item).clone())
                .context("Nothing selected")?;
            store.edit(
                label.as_deref().unwrap_or(&current.label),
                value.as_deref().unwrap_or(&current.value),
                category.as_deref().unwrap_or(&current.category),
            )?;
        }
        Command::Remove { positions } => {
            select_positions(store, &positions)?;
            store.remove_selected();
        }
        Command::Copy { positions } => {
            select_positions(store, &positions)?;
            let mut clipboard = SystemClipboard::holding();
            if cfg!(target_os = "linux") {
                eprintln!("Keeping the copied text available until it is pasted or replaced...");
            }
            store.copy_selected(&mut clipboard)?;
        }
        Command::Export { dir } => {
            store.export_to_dir(&dir, Utc::now())?;
        }
        Command::Import { file } => {
            store.import_file(&file).await?;
        }
        Command::Refresh => {
            if !store.has_remote_source() {
                log::warn!("No remote URL configured (set remote.url or pass --url)");
            }
            if let RefreshOutcome::Cached { reason, .. } = store.refresh_from_remote().await {
                log::warn!("Refresh fell back to local cache: {}", reason);
            }
        }
        Command::Seed => {
            let added = insert_demo_items(store);
            eprintln!("Added {} demo item(s).", added);
        }
        Command::Reset => {
            if !store.reset()? {
                log::info!("No local cache to remove");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::load();
    if let Some(path) = &args.db_path {
        config.set_cache_path(path);
    }
    if let Some(url) = &args.url {
        config.set_remote_url(url.clone());
    }

    let mut store = open_store(&config)?;
    let mut events = store.subscribe();
    load_working_set(&mut store, &config);
    if let Some(category) = &args.category {
        store.set_category(category)?;
    }
    if let Some(query) = &args.query {
        store.set_query(query);
    }

    let result = run(args, &mut store, &config).await;
    for message in collect_status(&mut events) {
        eprintln!("{}", message);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn memory_store() -> ItemStore {
        ItemStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn filter_flags_precede_subcommand() {
        let args = Args::try_parse_from(["quickclip", "-c", "Phrases", "-q", "week", "copy", "0", "2"]).unwrap();
        assert_eq!(args.category.as_deref(), Some("Phrases"));
        assert_eq!(args.query.as_deref(), Some("week"));
        assert!(matches!(args.command, Command::Copy { ref positions } if positions == &[0, 2]));
    }

    #[test]
    fn remove_requires_positions() {
        assert!(Args::try_parse_from(["quickclip", "remove"]).is_err());
    }

    #[test]
    fn demo_seed_is_idempotent() {
        let mut store = memory_store();
        let first = insert_demo_items(&mut store);
        assert_eq!(first, DEMO_ITEMS.len());
        assert_eq!(insert_demo_items(&mut store), 0);
        assert!(store.categories().contains(&"Phrases".to_string()));
    }

    #[test]
    fn status_collection_skips_past_lag() {
        let (tx, mut rx) = broadcast::channel(2);
        for n in 0..4 {
            tx.send(StoreEvent::Status(format!("s{n}"))).unwrap();
        }
        tx.send(StoreEvent::ItemsChanged { count: 1 }).unwrap();
        assert_eq!(collect_status(&mut rx), vec!["s3"]);
    }

    #[test]
    fn seeding_events_reach_early_subscriber() {
        let config = Config::defaults();
        let mut store = memory_store();
        let mut events = store.subscribe();
        load_working_set(&mut store, &config);
        assert_eq!(store.len(), DEMO_ITEMS.len());
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::ItemsChanged { count: DEMO_ITEMS.len() }
        );
    }

    #[test]
    fn select_positions_deduplicates() {
        let mut store = memory_store();
        store.bulk_add("a\nb\nc", "");
        select_positions(&mut store, &[2, 0, 2]).unwrap();
        assert_eq!(store.selection(), vec![0, 2]);
        assert!(select_positions(&mut store, &[9]).is_err());
    }
}
