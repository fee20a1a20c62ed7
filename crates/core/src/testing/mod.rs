//! Testing utilities and mock implementations.
//!
//! Lets the sync pipeline run end to end without a real contact service or
//! database.
//!
//! # Example
//!
//! ```rust,ignore
//! use listsync_core::testing::{fixtures, MemoryOrderStore, MockContactService};
//!
//! let contacts = MockContactService::new();
//! contacts.add_contact("a@b.com", "9").await;
//!
//! let orders = MemoryOrderStore::new();
//! orders.insert_order(42, fixtures::order_contact("a@b.com"));
//! ```

mod memory_order_store;
mod mock_contact_service;

pub use memory_order_store::MemoryOrderStore;
pub use mock_contact_service::{MockContactService, RecordedContactCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::SyncConfig;
    use crate::order::OrderContactData;

    /// Complete settings pointing at `base_url`, verbose logging on.
    pub fn sync_config(base_url: &str) -> SyncConfig {
        SyncConfig {
            api_base_url: base_url.to_string(),
            api_key: "k".to_string(),
            list_id: "7".to_string(),
            verbose_logging: true,
            create_missing_contacts: false,
        }
    }

    /// Billing fields for a test order.
    pub fn order_contact(email: &str) -> OrderContactData {
        OrderContactData {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }
}
