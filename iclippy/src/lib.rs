//! iClippy Core - clipboard history engine
//!
//! Watches the system clipboard and keeps a deduplicated, most-recent-first
//! history of copied text in a local SQLite file.
//!
//! # Architecture
//! - `monitor`: `ChangeDetector`, polls the clipboard change token and forwards new text
//! - `store`: `Store`, dedup insert, recency-ordered fetch and substring search
//! - `database`: SQLite schema and statements behind the store
//! - `clipboard`: `ClipboardProvider` trait and the arboard-backed system clipboard
//! - `paths`: default data directory and database location

pub mod clipboard;
pub mod database;
pub mod interface;
pub mod models;
pub mod monitor;
pub mod paths;
mod store;

pub use clipboard::{copy_to_clipboard, ClipboardProvider, SystemClipboard};
pub use interface::*;
pub use models::ClipboardEntry;
pub use monitor::{ChangeDetector, DetectorConfig, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use store::Store;
