//! In-memory order store for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::order::{OrderContactData, OrderError, OrderSource, SyncMarkerStore};

/// Order source and marker store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<u64, OrderContactData>>,
    processed: Mutex<HashSet<u64>>,
    fail_marker_reads: AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order_id: u64, contact: OrderContactData) {
        self.orders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(order_id, contact);
    }

    /// Set the marker directly, as an earlier run would have.
    pub fn set_processed(&self, order_id: u64) {
        self.processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(order_id);
    }

    /// Make `is_processed` fail until switched back.
    pub fn fail_marker_reads(&self, fail: bool) {
        self.fail_marker_reads.store(fail, Ordering::SeqCst);
    }
}

impl OrderSource for MemoryOrderStore {
    fn contact_data(&self, order_id: u64) -> Result<OrderContactData, OrderError> {
        let orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        let contact = orders
            .get(&order_id)
            .cloned()
            .ok_or(OrderError::NotFound(order_id))?;
        if contact.email.trim().is_empty() {
            return Err(OrderError::MissingEmail(order_id));
        }
        Ok(contact)
    }
}

impl SyncMarkerStore for MemoryOrderStore {
    fn is_processed(&self, order_id: u64) -> Result<bool, OrderError> {
        if self.fail_marker_reads.load(Ordering::SeqCst) {
            return Err(OrderError::Database("marker store unavailable".to_string()));
        }
        Ok(self
            .processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&order_id))
    }

    fn mark_processed(&self, order_id: u64) -> Result<(), OrderError> {
        if !self
            .orders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&order_id)
        {
            return Err(OrderError::NotFound(order_id));
        }
        self.set_processed(order_id);
        Ok(())
    }
}
