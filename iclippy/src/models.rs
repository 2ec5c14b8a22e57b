//! Core data models for iClippy

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One persisted clipboard text snapshot.
///
/// Entries are immutable once stored; query results hand out owned copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub id: i64,
    pub text: String,
    /// Unix timestamp (seconds) assigned by the store at insert time
    pub created_at: i64,
}

impl ClipboardEntry {
    pub(crate) fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            text: row.get("text")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert time as a UTC date
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.created_at, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Single-line preview for list display
    pub fn preview(&self, max_chars: usize) -> String {
        normalize_preview(&self.text, max_chars)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TEXT NORMALIZATION
// ─────────────────────────────────────────────────────────────────────────────

/// Collapse whitespace runs (including newlines and tabs) to single spaces and
/// truncate to `max_chars`, appending `…` when truncated.
pub fn normalize_preview(text: &str, max_chars: usize) -> String {
    let mut result = String::with_capacity(max_chars.min(text.len()) + 1);
    let mut last_was_space = false;
    let mut count = 0;

    for ch in text.trim_start().chars() {
        let ch = if ch.is_whitespace() { ' ' } else { ch };

        if ch == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }

        if count >= max_chars {
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('…');
            return result;
        }

        result.push(ch);
        count += 1;
    }

    while result.ends_with(' ') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> ClipboardEntry {
        ClipboardEntry {
            id: 1,
            text: text.to_string(),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_preview_truncation() {
        let display = entry(&"a".repeat(300)).preview(200);
        assert_eq!(display.chars().count(), 201); // 200 chars + ellipsis
        assert!(display.ends_with('…'));
    }

    #[test]
    fn test_preview_whitespace_normalization() {
        assert_eq!(entry("  hello\n\n\tworld  ").preview(200), "hello world");
    }

    #[test]
    fn test_preview_exact_length_not_truncated() {
        assert_eq!(entry("abcde").preview(5), "abcde");
    }

    #[test]
    fn test_preview_no_space_before_ellipsis() {
        assert_eq!(entry("abc def").preview(4), "abc…");
    }

    #[test]
    fn test_created_at_utc() {
        let date = entry("x").created_at_utc();
        assert_eq!(date.timestamp(), 1_700_000_000);
    }
}
