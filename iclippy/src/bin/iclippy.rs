//! iClippy command-line front end
//!
//! Run: cargo run --bin iclippy -- watch
//!
//! `watch` records clipboard text until interrupted; `list`, `search`, `copy`
//! and `path` query the same history file.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use iclippy::{
    copy_to_clipboard, paths, ChangeDetector, ClipboardEntry, DetectorConfig, HistoryStore, Store,
    SystemClipboard, DEFAULT_FETCH_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Characters of each entry shown by `list` and `search`
const PREVIEW_CHARS: usize = 100;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the history database (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record clipboard text until Ctrl-C
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Show the most recent entries
    List {
        #[arg(short, long, default_value_t = DEFAULT_FETCH_LIMIT)]
        limit: usize,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entries containing QUERY (case-insensitive)
    Search {
        query: String,

        #[arg(short, long, default_value_t = DEFAULT_FETCH_LIMIT)]
        limit: usize,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Put text back on the clipboard
    Copy {
        /// Text to copy
        #[arg(required_unless_present = "nth", conflicts_with = "nth")]
        text: Option<String>,

        /// Copy the Nth most recent entry instead (1 = newest)
        #[arg(long)]
        nth: Option<usize>,
    },
    /// Print the database location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Path => {
            let path = args.db.unwrap_or_else(paths::default_database_path);
            println!("{}", path.display());
            Ok(())
        }
        Command::Watch { interval_ms } => watch(open_store(args.db)?, interval_ms).await,
        Command::List { limit, json } => {
            let store = open_store(args.db)?;
            print_entries(&store.fetch_all(limit), json, "No clipboard history yet")
        }
        Command::Search { query, limit, json } => {
            let store = open_store(args.db)?;
            print_entries(&store.search(&query, limit), json, "No matches found")
        }
        Command::Copy { text, nth } => {
            let text = match (text, nth) {
                (Some(text), _) => text,
                (None, Some(n)) => {
                    let store = open_store(args.db)?;
                    nth_entry(&store, n)?.text
                }
                (None, None) => bail!("Nothing to copy"),
            };
            copy_to_clipboard(&SystemClipboard::new(), &text).context("Failed to copy")?;
            Ok(())
        }
    }
}

fn open_store(db: Option<PathBuf>) -> Result<Arc<Store>> {
    let store = match db {
        Some(path) => Store::open(path),
        None => Store::open_default(),
    }
    .context("Failed to open clipboard history")?;
    Ok(Arc::new(store))
}

async fn watch(store: Arc<Store>, interval_ms: u64) -> Result<()> {
    if interval_ms == 0 {
        bail!("--interval-ms must be positive");
    }

    let config = DetectorConfig {
        poll_interval: Duration::from_millis(interval_ms),
    };
    info!(path = %store.database_path().display(), entries = store.count()?, "iClippy started");

    let detector = ChangeDetector::with_config(Arc::new(SystemClipboard::new()), store, config);
    detector.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    detector.stop();
    Ok(())
}

fn nth_entry(store: &Store, n: usize) -> Result<ClipboardEntry> {
    if n == 0 {
        bail!("--nth starts at 1");
    }
    store
        .fetch_all(n)
        .into_iter()
        .nth(n - 1)
        .with_context(|| format!("History has fewer than {} entries", n))
}

fn print_entries(entries: &[ClipboardEntry], json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", empty_message);
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        let when = entry.created_at_utc().with_timezone(&Local);
        println!(
            "{:>4}  {}  {}",
            i + 1,
            when.format("%Y-%m-%d %H:%M"),
            entry.preview(PREVIEW_CHARS)
        );
    }
    Ok(())
}
