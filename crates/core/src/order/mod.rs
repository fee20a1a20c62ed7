//! Orders as seen by the sync pipeline: billing contact fields and the
//! per-order "already synced" marker.

mod sqlite;
mod types;

pub use sqlite::SqliteOrderStore;
pub use types::{OrderContactData, OrderRecord, OrderStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(u64),

    #[error("order has no billing email: {0}")]
    MissingEmail(u64),

    #[error("database error: {0}")]
    Database(String),
}

/// Read access to order billing data.
pub trait OrderSource: Send + Sync {
    fn contact_data(&self, order_id: u64) -> Result<OrderContactData, OrderError>;
}

/// Durable per-order idempotency marker.
///
/// No locking: two status changes racing before the marker is written can
/// both schedule a sync.
pub trait SyncMarkerStore: Send + Sync {
    fn is_processed(&self, order_id: u64) -> Result<bool, OrderError>;

    /// Set the marker. It is never cleared by the pipeline.
    fn mark_processed(&self, order_id: u64) -> Result<(), OrderError>;
}
