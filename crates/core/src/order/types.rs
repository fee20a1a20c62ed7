use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::contact_service::ContactData;

/// Order lifecycle status as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    /// Statuses meaning the order has been paid.
    pub fn is_syncable(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Completed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
            OrderStatus::Other(s) => s,
        }
    }
}

impl From<&str> for OrderStatus {
    /// Accepts both bare ("completed") and prefixed ("wc-completed") slugs.
    fn from(s: &str) -> Self {
        let normalized = s.trim().trim_start_matches("wc-").to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "on-hold" => OrderStatus::OnHold,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            "refunded" => OrderStatus::Refunded,
            "failed" => OrderStatus::Failed,
            _ => OrderStatus::Other(normalized),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OrderStatus::from(s))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing contact fields derived from an order at sync time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContactData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl OrderContactData {
    pub fn to_contact(&self) -> ContactData {
        ContactData {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// An order row as kept by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: u64,
    pub status: OrderStatus,
    pub contact: OrderContactData,
    pub sync_processed: bool,
}
