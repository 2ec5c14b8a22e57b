//! iClippy public interface
//!
//! Shared error type and the narrow store capability consumed by the change
//! detector and by query consumers.

use crate::models::ClipboardEntry;
use thiserror::Error;

/// Default cap for `fetch_all` / `search` results
pub const DEFAULT_FETCH_LIMIT: usize = 500;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for iClippy operations
#[derive(Debug, Error)]
pub enum IClippyError {
    /// The database directory or file could not be created or opened
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Table or index creation failed against an opened file
    #[error("Schema initialization failed: {0}")]
    SchemaInitFailure(String),
    /// A read or write failed against an otherwise open store
    #[error("Query failed: {0}")]
    QueryFailure(String),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Clipboard history storage.
///
/// These operations never fail from the caller's point of view: a failed read
/// yields an empty result and a failed write is dropped. Implementations log
/// the underlying error. History loss is recoverable (the next clipboard change
/// is persisted again), a crashed monitoring session is not.
pub trait HistoryStore: Send + Sync {
    /// Persist `text` (trimmed). Empty text and already-present text are no-ops.
    fn add(&self, text: &str);

    /// Up to `limit` entries, most recent first.
    fn fetch_all(&self, limit: usize) -> Vec<ClipboardEntry>;

    /// Entries containing `query` (case-insensitive), most recent first.
    /// A blank query behaves like `fetch_all`.
    fn search(&self, query: &str, limit: usize) -> Vec<ClipboardEntry>;
}
