//! Clipboard provider abstraction and the system implementation.

use crate::interface::IClippyError;
#[cfg(not(target_os = "macos"))]
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Access to a shared clipboard.
///
/// Reads are synchronous, non-blocking and side-effect free from the
/// caller's point of view.
pub trait ClipboardProvider: Send + Sync {
    /// Opaque token that increases whenever the clipboard content changes
    fn change_token(&self) -> u64;

    /// Plain-text content, or `None` if the clipboard holds no text
    fn read_text(&self) -> Option<String>;

    /// Replace the clipboard contents with `text`
    fn write_text(&self, text: &str) -> Result<(), IClippyError>;
}

/// Write `text` back to the clipboard (the consumer's "copy" action).
///
/// This does not touch the history store. A running detector will observe
/// the change and its add is a no-op for text already in history.
pub fn copy_to_clipboard(provider: &dyn ClipboardProvider, text: &str) -> Result<(), IClippyError> {
    provider.write_text(text)
}

/// The OS clipboard, accessed through arboard.
///
/// On macOS the change token is the pasteboard's own `changeCount`, so an
/// unchanged clipboard costs one message send per poll. arboard exposes no
/// counter on other platforms; there the token is synthesized by hashing the
/// current text on every call, which reads the full clipboard each poll.
#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(not(target_os = "macos"))]
    hashed: Mutex<HashedToken>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_raw() -> Option<String> {
        arboard::Clipboard::new()
            .ok()
            .and_then(|mut cb| cb.get_text().ok())
    }
}

impl ClipboardProvider for SystemClipboard {
    #[cfg(target_os = "macos")]
    fn change_token(&self) -> u64 {
        use objc2_app_kit::NSPasteboard;

        let count = unsafe { NSPasteboard::generalPasteboard().changeCount() };
        count as u64
    }

    #[cfg(not(target_os = "macos"))]
    fn change_token(&self) -> u64 {
        let text = Self::read_raw();
        self.hashed.lock().observe(text.as_deref())
    }

    fn read_text(&self) -> Option<String> {
        Self::read_raw()
    }

    fn write_text(&self, text: &str) -> Result<(), IClippyError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| IClippyError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| IClippyError::Clipboard(e.to_string()))?;
        debug!(len = text.len(), "wrote text to clipboard");
        Ok(())
    }
}

/// Change counter derived from content hashes, for clipboards without one.
///
/// The token increments each time an observation differs from the previous
/// one, including text appearing or disappearing.
#[derive(Debug, Default)]
#[cfg_attr(target_os = "macos", allow(dead_code))]
struct HashedToken {
    last_hash: Option<u64>,
    token: u64,
}

#[cfg_attr(target_os = "macos", allow(dead_code))]
impl HashedToken {
    fn observe(&mut self, text: Option<&str>) -> u64 {
        let hash = text.map(hash_text);
        if self.last_hash != hash {
            self.last_hash = hash;
            self.token += 1;
        }
        self.token
    }
}

#[cfg_attr(target_os = "macos", allow(dead_code))]
fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        written: Mutex<Vec<String>>,
    }

    impl ClipboardProvider for RecordingClipboard {
        fn change_token(&self) -> u64 {
            self.written.lock().len() as u64
        }

        fn read_text(&self) -> Option<String> {
            self.written.lock().last().cloned()
        }

        fn write_text(&self, text: &str) -> Result<(), IClippyError> {
            self.written.lock().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_to_clipboard_replaces_contents() {
        let clipboard = RecordingClipboard::default();
        copy_to_clipboard(&clipboard, "first").unwrap();
        copy_to_clipboard(&clipboard, "second").unwrap();

        assert_eq!(clipboard.read_text().as_deref(), Some("second"));
        assert_eq!(clipboard.change_token(), 2);
    }

    #[test]
    fn test_hash_text_distinguishes_content() {
        assert_eq!(hash_text("abc"), hash_text("abc"));
        assert_ne!(hash_text("abc"), hash_text("abd"));
    }

    #[test]
    fn test_hashed_token_only_moves_on_change() {
        let mut token = HashedToken::default();
        assert_eq!(token.observe(None), 0);

        let first = token.observe(Some("alpha"));
        assert_eq!(first, 1);
        assert_eq!(token.observe(Some("alpha")), first);

        assert_eq!(token.observe(Some("beta")), 2);
        assert_eq!(token.observe(None), 3);
        assert_eq!(token.observe(None), 3);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_pasteboard_token_is_stable_without_writes() {
        let clipboard = SystemClipboard::new();
        let first = clipboard.change_token();
        assert_eq!(clipboard.change_token(), first);
    }
}
