use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ConfigProvider;
use crate::contact_service::{ApiCredentials, ContactData, ContactService, ContactServiceError};
use crate::metrics::SYNC_RUNS;
use crate::order::{OrderSource, SyncMarkerStore};
use crate::sync_log::SyncLogger;

use super::{SyncError, SyncJob, SyncOutcome};

/// Runs one order through validate, resolve, subscribe and mark.
///
/// Settings are read from the provider at the start of every run. Failures
/// never escape [`run`](Self::run): they are written to the sync log and
/// reported as a [`SyncOutcome`].
pub struct SyncOrchestrator {
    config: Arc<dyn ConfigProvider>,
    contacts: Arc<dyn ContactService>,
    orders: Arc<dyn OrderSource>,
    markers: Arc<dyn SyncMarkerStore>,
    logger: SyncLogger,
}

impl SyncOrchestrator {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        contacts: Arc<dyn ContactService>,
        orders: Arc<dyn OrderSource>,
        markers: Arc<dyn SyncMarkerStore>,
        logger: SyncLogger,
    ) -> Self {
        Self {
            config,
            contacts,
            orders,
            markers,
            logger,
        }
    }

    /// Entry point for a dequeued job.
    pub async fn on_scheduled_sync(&self, job: SyncJob) -> SyncOutcome {
        self.run(job.order_id).await
    }

    /// Sync one order.
    ///
    /// An order that is already processed is left alone: no outbound calls
    /// and no sync log lines.
    pub async fn run(&self, order_id: u64) -> SyncOutcome {
        // A job can be queued twice when status changes race; only the first
        // one to finish may talk to the service.
        let outcome = match self.markers.is_processed(order_id) {
            Ok(true) => {
                debug!("Order {} already processed, skipping", order_id);
                SyncOutcome::AlreadyProcessed
            }
            Ok(false) => {
                self.logger.verbose(format!("Processing order: {}", order_id));
                match self.try_run(order_id).await {
                    Ok(outcome) => outcome,
                    Err(e) => self.absorb(order_id, e),
                }
            }
            Err(e) => self.absorb(order_id, SyncError::Marker(e)),
        };

        SYNC_RUNS.with_label_values(&[outcome.label()]).inc();
        debug!("Sync run for order {} ended: {}", order_id, outcome.label());
        outcome
    }

    async fn try_run(&self, order_id: u64) -> Result<SyncOutcome, SyncError> {
        let config = self.config.sync_config();

        self.logger.verbose("Validating settings");
        let missing = config.missing_fields();
        if !missing.is_empty() {
            self.logger.info("Missing required settings");
            return Err(SyncError::ConfigInvalid(missing));
        }

        let order = self
            .orders
            .contact_data(order_id)
            .map_err(SyncError::OrderLoadFailed)?;
        let contact = order.to_contact();
        let credentials = ApiCredentials::from(&config);

        let found = self
            .contacts
            .find_contact_by_email(&credentials, &contact.email)
            .await
            .map_err(SyncError::ContactLookup)?;

        let (contact_id, created) = match found {
            Some(contact_id) => {
                self.logger
                    .verbose(format!("Found contact ID: {}", contact_id));
                self.refresh_contact(&credentials, &contact_id, &contact)
                    .await;
                (contact_id, false)
            }
            None if config.create_missing_contacts => {
                let contact_id = self
                    .contacts
                    .create_contact(&credentials, &contact)
                    .await
                    .and_then(|id| id.ok_or(ContactServiceError::MissingField("contact.id")))
                    .map_err(SyncError::ContactCreate)?;
                self.logger
                    .info(format!("Created new contact with ID: {}", contact_id));
                (contact_id, true)
            }
            None => {
                self.logger
                    .verbose(format!("No contact found for email: {}", contact.email));
                return Ok(SyncOutcome::NoContactFound {
                    email: contact.email,
                });
            }
        };

        self.contacts
            .add_contact_to_list(&credentials, &contact_id, &config.list_id)
            .await
            .map_err(SyncError::Subscription)?;
        self.logger.info(format!(
            "Added {} to list {} successfully",
            contact.email, config.list_id
        ));

        self.markers
            .mark_processed(order_id)
            .map_err(SyncError::Marker)?;
        self.logger
            .verbose(format!("Order {} synced successfully", order_id));

        Ok(SyncOutcome::Synced {
            contact_id,
            created,
        })
    }

    /// Push current name fields to an existing contact. Never fails the run.
    async fn refresh_contact(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        contact: &ContactData,
    ) {
        match self
            .contacts
            .update_contact(credentials, contact_id, contact)
            .await
        {
            Ok(update) => {
                self.logger
                    .verbose(format!("Update response code: {}", update.status));
                self.logger
                    .verbose(format!("Update response body: {}", update.body));
            }
            Err(e) => {
                self.logger
                    .verbose(format!("Failed to update contact: {}", e));
            }
        }
    }

    fn absorb(&self, order_id: u64, error: SyncError) -> SyncOutcome {
        warn!("Sync for order {} failed: {}", order_id, error);

        if let SyncError::ConfigInvalid(missing) = error {
            self.logger.info("Settings validation failed - sync aborted");
            return SyncOutcome::InvalidConfig { missing };
        }

        let line = match &error {
            SyncError::Subscription(ContactServiceError::UnexpectedStatus { status, .. }) => {
                format!("Failed to add contact - response code: {}", status)
            }
            SyncError::Subscription(e) => format!("Failed to add contact to list: {}", e),
            SyncError::ContactCreate(e) => format!("Failed to create contact: {}", e),
            e => format!("Error processing order: {}", e),
        };
        self.logger.info(line);

        SyncOutcome::Failed {
            reason: error_reason(order_id, &error),
        }
    }
}

fn error_reason(order_id: u64, error: &SyncError) -> String {
    match error {
        SyncError::OrderLoadFailed(e) => format!("order {}: {}", order_id, e),
        SyncError::ContactLookup(e) => format!("contact lookup: {}", e),
        SyncError::ContactCreate(e) => format!("contact creation: {}", e),
        SyncError::Subscription(e) => format!("list subscription: {}", e),
        SyncError::Marker(e) => format!("sync marker: {}", e),
        SyncError::ConfigInvalid(_) => error.to_string(),
    }
}
