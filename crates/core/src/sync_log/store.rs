use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Storage for the capped log.
pub trait LogStore: Send + Sync {
    /// Prepend an entry, then drop the oldest entries beyond `capacity`.
    fn append(&self, entry: &LogEntry, capacity: usize) -> Result<(), LogStoreError>;

    /// All retained entries, newest first.
    fn recent(&self) -> Result<Vec<LogEntry>, LogStoreError>;
}

/// Process-local log store.
#[derive(Default)]
pub struct MemoryLogStore {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, entry: &LogEntry, capacity: usize) -> Result<(), LogStoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry.clone());
        entries.truncate(capacity);
        Ok(())
    }

    fn recent(&self) -> Result<Vec<LogEntry>, LogStoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_keeps_newest_first() {
        let store = MemoryLogStore::new();
        store.append(&LogEntry::now("first"), 10).unwrap();
        store.append(&LogEntry::now("second"), 10).unwrap();

        let entries = store.recent().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn test_memory_store_truncates_to_capacity() {
        let store = MemoryLogStore::new();
        for i in 0..5 {
            store.append(&LogEntry::now(format!("line {}", i)), 3).unwrap();
        }

        let messages: Vec<_> = store
            .recent()
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["line 4", "line 3", "line 2"]);
    }
}
