//! Capped operator log for the sync pipeline.
//!
//! Lines are kept newest first and trimmed to [`LOG_CAPACITY`]. Every accepted
//! line is also mirrored to `tracing`.

mod logger;
mod sqlite;
mod store;

pub use logger::*;
pub use sqlite::*;
pub use store::*;

/// Maximum number of entries retained by a log store.
pub const LOG_CAPACITY: usize = 100;
