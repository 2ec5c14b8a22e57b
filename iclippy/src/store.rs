//! Store - clipboard history persistence and queries
//!
//! Wraps the SQLite layer with the public error model: open failures are
//! classified and surfaced, while query failures on an open store are logged
//! and degrade to "no history" through the `HistoryStore` implementation.

use crate::database::{Database, DatabaseError};
use crate::interface::{HistoryStore, IClippyError};
use crate::models::ClipboardEntry;
use crate::paths;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Thread-safe clipboard history store backed by one SQLite file.
///
/// Share a single instance (behind an `Arc`) between the change detector and
/// query consumers. The underlying connections are released exactly once,
/// when the store is dropped.
pub struct Store {
    db: Database,
    path: PathBuf,
}

impl Store {
    /// Open or create a store at `path`, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IClippyError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                IClippyError::StorageUnavailable(format!("{}: {}", parent.display(), e))
            })?;
        }

        let db = Database::open(&path).map_err(|e| open_error(&path, e))?;
        info!(path = %path.display(), "opened clipboard history");

        Ok(Self { db, path })
    }

    /// Open the store at the platform default location
    /// (`<app-data-dir>/iClippy/iclippy.sqlite3`).
    pub fn open_default() -> Result<Self, IClippyError> {
        Self::open(paths::default_database_path())
    }

    /// Create a store with an in-memory database
    pub fn open_in_memory() -> Result<Self, IClippyError> {
        let db = Database::open_in_memory().map_err(|e| open_error(Path::new(":memory:"), e))?;
        Ok(Self {
            db,
            path: PathBuf::from(":memory:"),
        })
    }

    /// The database file in use
    pub fn database_path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries
    pub fn count(&self) -> Result<u64, IClippyError> {
        self.db.count().map_err(query_error)
    }

    /// Insert `text` (trimmed) unless it is empty or already stored.
    ///
    /// Returns the new entry's ID, or `None` when nothing was inserted.
    /// An existing entry keeps its original ID and timestamp.
    pub fn try_add(&self, text: &str) -> Result<Option<i64>, IClippyError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let id = self
            .db
            .insert_entry(trimmed, Utc::now().timestamp())
            .map_err(query_error)?;

        match id {
            Some(id) => debug!(id, len = trimmed.len(), "stored clipboard entry"),
            None => debug!(len = trimmed.len(), "clipboard entry already stored"),
        }
        Ok(id)
    }

    /// Up to `limit` entries, most recent first
    pub fn try_fetch_all(&self, limit: usize) -> Result<Vec<ClipboardEntry>, IClippyError> {
        self.db.fetch_recent(limit).map_err(query_error)
    }

    /// Entries containing `query` (case-insensitive), most recent first
    pub fn try_search(&self, query: &str, limit: usize) -> Result<Vec<ClipboardEntry>, IClippyError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.try_fetch_all(limit);
        }
        self.db.search_substring(trimmed, limit).map_err(query_error)
    }
}

impl HistoryStore for Store {
    fn add(&self, text: &str) {
        if let Err(e) = self.try_add(text) {
            warn!(error = %e, "dropping clipboard entry");
        }
    }

    fn fetch_all(&self, limit: usize) -> Vec<ClipboardEntry> {
        self.try_fetch_all(limit).unwrap_or_else(|e| {
            warn!(error = %e, "failed to fetch clipboard history");
            Vec::new()
        })
    }

    fn search(&self, query: &str, limit: usize) -> Vec<ClipboardEntry> {
        self.try_search(query, limit).unwrap_or_else(|e| {
            warn!(error = %e, "failed to search clipboard history");
            Vec::new()
        })
    }
}

fn open_error(path: &Path, e: DatabaseError) -> IClippyError {
    match e {
        DatabaseError::Schema(e) => {
            IClippyError::SchemaInitFailure(format!("{}: {}", path.display(), e))
        }
        other => IClippyError::StorageUnavailable(format!("{}: {}", path.display(), other)),
    }
}

fn query_error(e: DatabaseError) -> IClippyError {
    IClippyError::QueryFailure(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::DEFAULT_FETCH_LIMIT;

    fn texts(entries: &[ClipboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_add_entry() {
        let store = Store::open_in_memory().unwrap();
        store.add("Hello, World!");

        let entries = store.fetch_all(DEFAULT_FETCH_LIMIT);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Hello, World!");
    }

    #[test]
    fn test_add_empty_text_ignored() {
        let store = Store::open_in_memory().unwrap();
        store.add("");
        store.add("   ");
        store.add("\n\t");

        assert_eq!(store.count().unwrap(), 0);
        assert!(store.fetch_all(DEFAULT_FETCH_LIMIT).is_empty());
    }

    #[test]
    fn test_duplicate_keeps_first_insert() {
        let store = Store::open_in_memory().unwrap();

        let id = store.try_add("Duplicate text").unwrap();
        assert!(id.is_some());
        let original = store.fetch_all(DEFAULT_FETCH_LIMIT)[0].clone();

        store.add("Other");
        assert_eq!(store.try_add("Duplicate text").unwrap(), None);
        assert_eq!(store.try_add("  Duplicate text\n").unwrap(), None);

        let entries = store.fetch_all(DEFAULT_FETCH_LIMIT);
        assert_eq!(entries.len(), 2);
        let kept = entries.iter().find(|e| e.text == "Duplicate text").unwrap();
        assert_eq!(kept, &original);
        // Re-adding does not bump recency
        assert_eq!(entries[0].text, "Other");
    }

    #[test]
    fn test_trims_whitespace() {
        let store = Store::open_in_memory().unwrap();
        store.add("  Trimmed text  ");

        let entries = store.fetch_all(DEFAULT_FETCH_LIMIT);
        assert_eq!(texts(&entries), vec!["Trimmed text"]);
    }

    #[test]
    fn test_recency_ordering() {
        let store = Store::open_in_memory().unwrap();
        store.add("A");
        store.add("B");
        store.add("C");

        assert_eq!(texts(&store.fetch_all(DEFAULT_FETCH_LIMIT)), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_fetch_all_limit() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..10 {
            store.add(&format!("Entry {}", i));
        }

        let entries = store.fetch_all(5);
        assert_eq!(
            texts(&entries),
            vec!["Entry 9", "Entry 8", "Entry 7", "Entry 6", "Entry 5"]
        );
    }

    #[test]
    fn test_search_query() {
        let store = Store::open_in_memory().unwrap();
        store.add("Hello World");
        store.add("Goodbye World");
        store.add("Hello Swift");
        store.add("Testing");

        assert_eq!(
            texts(&store.search("Hello", DEFAULT_FETCH_LIMIT)),
            vec!["Hello Swift", "Hello World"]
        );
        assert_eq!(
            texts(&store.search("World", DEFAULT_FETCH_LIMIT)),
            vec!["Goodbye World", "Hello World"]
        );
        assert_eq!(
            texts(&store.search("swift", DEFAULT_FETCH_LIMIT)),
            vec!["Hello Swift"]
        );
    }

    #[test]
    fn test_search_trims_query() {
        let store = Store::open_in_memory().unwrap();
        store.add("Hello Swift");
        store.add("Hello World");

        assert_eq!(
            texts(&store.search("  swift \n", DEFAULT_FETCH_LIMIT)),
            vec!["Hello Swift"]
        );
    }

    #[test]
    fn test_search_empty_query_matches_fetch_all() {
        let store = Store::open_in_memory().unwrap();
        store.add("Entry 1");
        store.add("Entry 2");
        store.add("Entry 3");

        let all = store.fetch_all(DEFAULT_FETCH_LIMIT);
        assert_eq!(store.search("", DEFAULT_FETCH_LIMIT), all);
        assert_eq!(store.search("   ", DEFAULT_FETCH_LIMIT), all);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_search_respects_limit() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..10 {
            store.add(&format!("match {}", i));
        }
        store.add("other");

        let results = store.search("match", 3);
        assert_eq!(texts(&results), vec!["match 9", "match 8", "match 7"]);
    }

    #[test]
    fn test_search_no_matches() {
        let store = Store::open_in_memory().unwrap();
        store.add("Entry 1");
        store.add("Entry 2");

        assert!(store.search("NonExistent", DEFAULT_FETCH_LIMIT).is_empty());
    }

    #[test]
    fn test_results_are_owned_snapshots() {
        let store = Store::open_in_memory().unwrap();
        store.add("first");
        let snapshot = store.fetch_all(DEFAULT_FETCH_LIMIT);

        store.add("second");
        assert_eq!(texts(&snapshot), vec!["first"]);
    }

    #[test]
    fn test_in_memory_path() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.database_path(), Path::new(":memory:"));
    }
}
