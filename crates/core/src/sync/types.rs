//! Types for the sync pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::contact_service::ContactServiceError;
use crate::order::OrderError;

/// Reasons a sync run stops early.
///
/// None of these escape [`super::SyncOrchestrator::run`]; they end up in the
/// sync log and as a [`SyncOutcome`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required setting is empty.
    #[error("missing required settings: {}", .0.join(", "))]
    ConfigInvalid(Vec<&'static str>),

    /// Billing data for the order could not be read.
    #[error("{0}")]
    OrderLoadFailed(#[source] OrderError),

    /// The contact search failed.
    #[error("{0}")]
    ContactLookup(#[source] ContactServiceError),

    /// Creating a missing contact failed.
    #[error("{0}")]
    ContactCreate(#[source] ContactServiceError),

    /// The list subscription call failed or was rejected.
    #[error("{0}")]
    Subscription(#[source] ContactServiceError),

    /// The sync marker could not be read or written.
    #[error("{0}")]
    Marker(#[source] OrderError),
}

/// How a sync run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Contact subscribed and the order marked processed.
    Synced { contact_id: String, created: bool },
    /// No contact matches the order email; nothing was changed.
    NoContactFound { email: String },
    /// The order was already marked processed; no calls were made.
    AlreadyProcessed,
    /// Required settings are missing; no calls were made.
    InvalidConfig { missing: Vec<&'static str> },
    /// The run stopped at a failing step; the order is not marked.
    Failed { reason: String },
}

impl SyncOutcome {
    /// Label used for the `outcome` metric dimension.
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Synced { .. } => "synced",
            SyncOutcome::NoContactFound { .. } => "no_contact",
            SyncOutcome::AlreadyProcessed => "already_processed",
            SyncOutcome::InvalidConfig { .. } => "invalid_config",
            SyncOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced { .. })
    }
}
