//! Clipboard change detector
//!
//! Polls a [`ClipboardProvider`] on a fixed interval and forwards each newly
//! copied, non-blank text to a [`HistoryStore`]. The provider's change token
//! gates all work: an unchanged token costs one integer comparison per tick.
//!
//! Ticks run serially inside a single tokio task, so a check always completes
//! before the next one starts.

use crate::clipboard::ClipboardProvider;
use crate::interface::{HistoryStore, IClippyError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Shorter configured intervals are raised to this
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    pub poll_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The state a tick needs, cloned into the polling task.
#[derive(Clone)]
struct Poller {
    provider: Arc<dyn ClipboardProvider>,
    store: Arc<dyn HistoryStore>,
    last_token: Arc<AtomicU64>,
}

impl Poller {
    /// One check cycle. Returns true if text was forwarded to the store.
    fn check_once(&self) -> bool {
        let token = self.provider.change_token();
        if token == self.last_token.load(Ordering::Acquire) {
            return false;
        }
        // Record the token before reading, so a failed read is not retried next tick
        self.last_token.store(token, Ordering::Release);

        let Some(text) = self.provider.read_text() else {
            debug!(token, "clipboard changed without text");
            return false;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.store.add(trimmed);
        true
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Watches the clipboard and feeds the history store.
///
/// Construct once at startup and share by reference; `start`/`stop` may be
/// called any number of times.
pub struct ChangeDetector {
    poller: Poller,
    config: DetectorConfig,
    task: Mutex<Option<PollTask>>,
}

impl ChangeDetector {
    pub fn new(
        provider: Arc<dyn ClipboardProvider>,
        store: Arc<dyn HistoryStore>,
        poll_interval: Duration,
    ) -> Self {
        Self::with_config(provider, store, DetectorConfig { poll_interval })
    }

    /// The last-observed token is seeded from the provider, so whatever is on
    /// the clipboard at construction time is not recorded.
    pub fn with_config(
        provider: Arc<dyn ClipboardProvider>,
        store: Arc<dyn HistoryStore>,
        config: DetectorConfig,
    ) -> Self {
        let initial = provider.change_token();
        Self {
            poller: Poller {
                provider,
                store,
                last_token: Arc::new(AtomicU64::new(initial)),
            },
            config,
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Begin polling on the current tokio runtime.
    ///
    /// Does nothing if already running. Fails only when called outside a
    /// tokio runtime.
    pub fn start(&self) -> Result<(), IClippyError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            debug!("clipboard detector already running");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| IClippyError::Runtime(e.to_string()))?;

        let cancel = CancellationToken::new();
        let stopped = cancel.clone();
        let poller = self.poller.clone();
        let interval = self.config.poll_interval.max(MIN_POLL_INTERVAL);

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; polling starts one interval in
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = stopped.cancelled() => break,
                    _ = ticker.tick() => {
                        // Local clipboard read plus one SQLite statement at most
                        poller.check_once();
                    }
                }
            }
            debug!("clipboard polling loop exited");
        });

        *task = Some(PollTask { cancel, handle });
        info!(interval_ms = interval.as_millis() as u64, "clipboard detector started");
        Ok(())
    }

    /// Stop polling. No-op if not running.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel.cancel();
            info!("clipboard detector stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }

    #[cfg(test)]
    pub(crate) fn check_once(&self) -> bool {
        self.poller.check_once()
    }
}

impl Drop for ChangeDetector {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.cancel.cancel();
        }
    }
}
