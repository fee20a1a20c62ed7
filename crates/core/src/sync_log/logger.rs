use std::sync::Arc;

use crate::config::ConfigProvider;

use super::{LogEntry, LogStore, LogStoreError, LOG_CAPACITY};

/// Operator-facing log with a verbosity filter.
///
/// Verbose lines are dropped unless `verbose_logging` is on in the settings
/// current at the time of the call. Cheap to clone.
#[derive(Clone)]
pub struct SyncLogger {
    store: Arc<dyn LogStore>,
    config: Arc<dyn ConfigProvider>,
}

impl SyncLogger {
    pub fn new(store: Arc<dyn LogStore>, config: Arc<dyn ConfigProvider>) -> Self {
        Self { store, config }
    }

    /// Record a line. Storage failures are reported through `tracing` only.
    pub fn log(&self, message: impl Into<String>, verbose: bool) {
        if verbose && !self.config.sync_config().verbose_logging {
            return;
        }

        let entry = LogEntry::now(message);
        if verbose {
            tracing::debug!(target: "listsync::sync_log", "{}", entry.message);
        } else {
            tracing::info!(target: "listsync::sync_log", "{}", entry.message);
        }

        if let Err(e) = self.store.append(&entry, LOG_CAPACITY) {
            tracing::error!("Failed to store sync log entry: {}", e);
        }
    }

    /// Shorthand for a line that is always kept.
    pub fn info(&self, message: impl Into<String>) {
        self.log(message, false);
    }

    /// Shorthand for a trace line kept only with verbose logging on.
    pub fn verbose(&self, message: impl Into<String>) {
        self.log(message, true);
    }

    /// Retained entries, newest first.
    pub fn recent_logs(&self) -> Result<Vec<LogEntry>, LogStoreError> {
        self.store.recent()
    }
}
