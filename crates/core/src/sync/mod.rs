//! Order-to-contact sync pipeline.
//!
//! - [`SyncTrigger`] decides on each status change whether to schedule a run
//! - [`SyncQueue`] / [`SyncWorker`] carry scheduled runs off the request path
//! - [`SyncOrchestrator`] performs one run end to end

mod orchestrator;
mod queue;
mod trigger;
mod types;

pub use orchestrator::SyncOrchestrator;
pub use queue::{create_sync_queue, QueueError, SyncJob, SyncQueue, SyncWorker};
pub use trigger::SyncTrigger;
pub use types::{SyncError, SyncOutcome};
