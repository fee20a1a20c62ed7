use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{OrderContactData, OrderError, OrderRecord, OrderSource, OrderStatus, SyncMarkerStore};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        order_id INTEGER PRIMARY KEY,
        email TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        status TEXT NOT NULL,
        sync_processed INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    );
"#;

/// SQLite-backed order store; the marker lives in the order row.
pub struct SqliteOrderStore {
    conn: Mutex<Connection>,
}

impl SqliteOrderStore {
    /// Open (or create) the database file and its tables
    pub fn new(path: &Path) -> Result<Self, OrderError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::init(conn)
    }

    /// In-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, OrderError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, OrderError> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, OrderError> {
        self.conn
            .lock()
            .map_err(|_| OrderError::Database("connection lock poisoned".to_string()))
    }

    /// Insert or refresh an order's billing fields and status.
    ///
    /// The sync marker is left untouched on existing rows.
    pub fn upsert_order(
        &self,
        order_id: u64,
        status: &OrderStatus,
        contact: &OrderContactData,
    ) -> Result<(), OrderError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO orders (order_id, email, first_name, last_name, status, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(order_id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
            params![
                to_sql_id(order_id)?,
                contact.email,
                contact.first_name,
                contact.last_name,
                status.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    pub fn get_order(&self, order_id: u64) -> Result<Option<OrderRecord>, OrderError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT email, first_name, last_name, status, sync_processed FROM orders WHERE order_id = ?1",
            params![to_sql_id(order_id)?],
            |row| {
                let status: String = row.get(3)?;
                Ok(OrderRecord {
                    order_id,
                    status: OrderStatus::from(status.as_str()),
                    contact: OrderContactData {
                        email: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                    },
                    sync_processed: row.get::<_, i64>(4)? != 0,
                })
            },
        )
        .optional()
        .map_err(db_err)
    }
}

fn db_err(e: rusqlite::Error) -> OrderError {
    OrderError::Database(e.to_string())
}

fn to_sql_id(order_id: u64) -> Result<i64, OrderError> {
    i64::try_from(order_id)
        .map_err(|_| OrderError::Database(format!("order id out of range: {}", order_id)))
}

impl OrderSource for SqliteOrderStore {
    fn contact_data(&self, order_id: u64) -> Result<OrderContactData, OrderError> {
        let order = self
            .get_order(order_id)?
            .ok_or(OrderError::NotFound(order_id))?;
        if order.contact.email.trim().is_empty() {
            return Err(OrderError::MissingEmail(order_id));
        }
        Ok(order.contact)
    }
}

impl SyncMarkerStore for SqliteOrderStore {
    fn is_processed(&self, order_id: u64) -> Result<bool, OrderError> {
        let conn = self.conn()?;
        let processed: Option<i64> = conn
            .query_row(
                "SELECT sync_processed FROM orders WHERE order_id = ?1",
                params![to_sql_id(order_id)?],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(processed.unwrap_or(0) != 0)
    }

    fn mark_processed(&self, order_id: u64) -> Result<(), OrderError> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE orders SET sync_processed = 1, updated_at = ?2 WHERE order_id = ?1",
                params![to_sql_id(order_id)?, Utc::now().to_rfc3339()],
            )
            .map_err(db_err)?;
        if updated == 0 {
            return Err(OrderError::NotFound(order_id));
        }
        Ok(())
    }
}
