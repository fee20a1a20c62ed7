use std::sync::Arc;

use crate::order::{OrderStatus, SyncMarkerStore};
use crate::sync_log::SyncLogger;

use super::{SyncJob, SyncQueue};

/// Reacts to order status changes by scheduling at most one sync.
#[derive(Clone)]
pub struct SyncTrigger {
    markers: Arc<dyn SyncMarkerStore>,
    queue: SyncQueue,
    logger: SyncLogger,
}

impl SyncTrigger {
    pub fn new(markers: Arc<dyn SyncMarkerStore>, queue: SyncQueue, logger: SyncLogger) -> Self {
        Self {
            markers,
            queue,
            logger,
        }
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    /// Schedule a sync when an unprocessed order becomes paid.
    ///
    /// Returns whether a job was queued. The sync itself runs later on the
    /// worker; nothing about its result is reported here.
    pub async fn on_order_status_changed(
        &self,
        order_id: u64,
        old_status: &OrderStatus,
        new_status: &OrderStatus,
    ) -> bool {
        if !new_status.is_syncable() {
            self.logger.verbose(format!(
                "Order {} status changed from {} to {}, no sync needed",
                order_id, old_status, new_status
            ));
            return false;
        }

        match self.markers.is_processed(order_id) {
            Ok(true) => {
                self.logger
                    .verbose(format!("Order {} already processed", order_id));
                return false;
            }
            Ok(false) => {}
            Err(e) => {
                self.logger.info(format!(
                    "Could not check sync status for order {}: {}",
                    order_id, e
                ));
                return false;
            }
        }

        self.logger
            .verbose(format!("Scheduling sync for order {}", order_id));
        match self.queue.enqueue(SyncJob { order_id }).await {
            Ok(()) => true,
            Err(e) => {
                self.logger.info(format!(
                    "Failed to schedule sync for order {}: {}",
                    order_id, e
                ));
                false
            }
        }
    }
}
