use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{LogEntry, LogStore, LogStoreError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS sync_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        message TEXT NOT NULL
    );
"#;

/// SQLite-backed log store; survives restarts.
pub struct SqliteLogStore {
    conn: Mutex<Connection>,
}

impl SqliteLogStore {
    pub fn new(path: &Path) -> Result<Self, LogStoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::init(conn)
    }

    /// In-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, LogStoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, LogStoreError> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn db_err(e: rusqlite::Error) -> LogStoreError {
    LogStoreError::Database(e.to_string())
}

impl LogStore for SqliteLogStore {
    fn append(&self, entry: &LogEntry, capacity: usize) -> Result<(), LogStoreError> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction().map_err(db_err)?;

        tx.execute(
            "INSERT INTO sync_log (timestamp, message) VALUES (?1, ?2)",
            params![entry.timestamp.to_rfc3339(), entry.message],
        )
        .map_err(db_err)?;

        // Keep only the newest `capacity` rows.
        let capacity = i64::try_from(capacity).unwrap_or(i64::MAX);
        tx.execute(
            "DELETE FROM sync_log WHERE id NOT IN (SELECT id FROM sync_log ORDER BY id DESC LIMIT ?1)",
            params![capacity],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)
    }

    fn recent(&self) -> Result<Vec<LogEntry>, LogStoreError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare("SELECT timestamp, message FROM sync_log ORDER BY id DESC")
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (timestamp, message) = row.map_err(db_err)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| LogStoreError::InvalidTimestamp(e.to_string()))?
                .with_timezone(&Utc);
            entries.push(LogEntry { timestamp, message });
        }
        Ok(entries)
    }
}
