//! Client side of the marketing-contact service.
//!
//! Every call takes the account credentials explicitly so that settings edits
//! apply to the very next request; the client keeps no session.

mod activecampaign;
mod types;

pub use activecampaign::ActiveCampaignClient;
pub use types::*;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the contact service.
#[derive(Debug, Error)]
pub enum ContactServiceError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a status the operation does not accept.
    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response parsed but lacked a required field.
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    /// Credentials are missing.
    #[error("contact service not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ContactServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ContactServiceError::Timeout
        } else if e.is_decode() {
            ContactServiceError::Parse(e.to_string())
        } else {
            ContactServiceError::Transport(e.to_string())
        }
    }
}

/// Operations the sync pipeline needs from the contact service.
#[async_trait]
pub trait ContactService: Send + Sync {
    /// All mailing lists, keyed by list id.
    async fn list_lists(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<BTreeMap<String, String>, ContactServiceError>;

    /// Succeeds iff the lists endpoint answers with a body holding `lists`.
    async fn test_connection(&self, credentials: &ApiCredentials)
        -> Result<(), ContactServiceError>;

    /// Id of the first contact whose email matches exactly, in the service's
    /// own result order.
    async fn find_contact_by_email(
        &self,
        credentials: &ApiCredentials,
        email: &str,
    ) -> Result<Option<String>, ContactServiceError>;

    /// Create a contact; returns the new id when the response carries one.
    async fn create_contact(
        &self,
        credentials: &ApiCredentials,
        contact: &ContactData,
    ) -> Result<Option<String>, ContactServiceError>;

    /// Overwrite name fields of an existing contact.
    ///
    /// The status code is reported but not judged: only a transport failure
    /// is an error.
    async fn update_contact(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        contact: &ContactData,
    ) -> Result<ContactUpdate, ContactServiceError>;

    /// Subscribe a contact to a list. Only 200 and 201 count as success.
    async fn add_contact_to_list(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        list_id: &str,
    ) -> Result<(), ContactServiceError>;
}
