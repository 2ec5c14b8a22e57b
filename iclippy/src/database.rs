//! SQLite database layer for clipboard history
//!
//! Single `entries` table with a UNIQUE constraint on `text`.
//! Uses r2d2 connection pooling to allow concurrent reads without mutex blocking;
//! writes are single statements serialized by SQLite's writer lock.

use crate::models::ClipboardEntry;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for a pooled connection
const POOL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema setup failed: {0}")]
    Schema(rusqlite::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Thread-safe database wrapper using connection pooling
///
/// WAL mode lets readers proceed against a consistent snapshot while a write
/// is in flight. Connections are closed when the pool is dropped.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create a database at the given path with connection pooling
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        let path = path.as_ref();

        // Fail fast on an unopenable or non-SQLite file. The pool would otherwise
        // retry until its connection timeout before reporting the error.
        let probe = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        probe.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
        drop(probe);

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(
                "
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;
                ",
            )?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(POOL_TIMEOUT)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let manager = SqliteConnectionManager::memory();

        // In-memory needs single connection to maintain state, and it must never be recycled
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .connection_timeout(POOL_TIMEOUT)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Get a connection from the pool
    fn get_conn(&self) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Set up the database schema. Safe to run against an initialized file.
    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_created_at ON entries(created_at DESC);
            "#,
        )
        .map_err(DatabaseError::Schema)?;

        Ok(())
    }

    /// Insert `text` unless an identical entry exists.
    ///
    /// The uniqueness check and the insert are one statement, so concurrent
    /// callers cannot race into duplicate rows. Returns the new row ID, or
    /// `None` when the text was already present.
    pub fn insert_entry(&self, text: &str, created_at: i64) -> DatabaseResult<Option<i64>> {
        let conn = self.get_conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO entries (text, created_at) VALUES (?1, ?2)",
            params![text, created_at],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Fetch up to `limit` entries, most recent first
    pub fn fetch_recent(&self, limit: usize) -> DatabaseResult<Vec<ClipboardEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare_cached(
            r#"SELECT id, text, created_at FROM entries
               ORDER BY created_at DESC, id DESC
               LIMIT ?1"#,
        )?;
        let entries = stmt
            .query_map(params![sql_limit(limit)], ClipboardEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Fetch up to `limit` entries whose text contains `query`, most recent first.
    ///
    /// Matching uses LIKE, which folds ASCII case only. Wildcards in `query`
    /// match literally.
    pub fn search_substring(&self, query: &str, limit: usize) -> DatabaseResult<Vec<ClipboardEntry>> {
        let conn = self.get_conn()?;
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = conn.prepare_cached(
            r#"SELECT id, text, created_at FROM entries
               WHERE text LIKE ?1 ESCAPE '\'
               ORDER BY created_at DESC, id DESC
               LIMIT ?2"#,
        )?;
        let entries = stmt
            .query_map(params![pattern, sql_limit(limit)], ClipboardEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Number of stored entries
    pub fn count(&self) -> DatabaseResult<u64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escape LIKE metacharacters using `\` as the escape character
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
