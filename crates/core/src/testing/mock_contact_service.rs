//! Mock contact service for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::contact_service::{
    ApiCredentials, ContactData, ContactService, ContactServiceError, ContactUpdate,
};

/// A recorded call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedContactCall {
    ListLists,
    TestConnection,
    FindContact { email: String },
    CreateContact { contact: ContactData },
    UpdateContact { contact_id: String, contact: ContactData },
    AddToList { contact_id: String, list_id: String },
}

impl RecordedContactCall {
    /// Whether the call would change data on the service (POST or PUT).
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RecordedContactCall::CreateContact { .. }
                | RecordedContactCall::UpdateContact { .. }
                | RecordedContactCall::AddToList { .. }
        )
    }
}

/// Mock implementation of the ContactService trait.
///
/// Contacts are keyed by email; an email may map to several ids to mimic a
/// search returning multiple matches. Each operation can be scripted to fail
/// once.
#[derive(Debug)]
pub struct MockContactService {
    lists: Arc<RwLock<BTreeMap<String, String>>>,
    /// Contact ids by email, in "service" order.
    contacts: Arc<RwLock<HashMap<String, Vec<String>>>>,
    next_contact_id: Arc<RwLock<u64>>,
    /// When false, create succeeds but the response carries no id.
    create_returns_id: Arc<RwLock<bool>>,
    /// Status code the update call answers with.
    update_status: Arc<RwLock<u16>>,
    /// Status code the list subscription answers with.
    subscribe_status: Arc<RwLock<u16>>,
    lookup_error: Arc<RwLock<Option<ContactServiceError>>>,
    create_error: Arc<RwLock<Option<ContactServiceError>>>,
    update_error: Arc<RwLock<Option<ContactServiceError>>>,
    subscribe_error: Arc<RwLock<Option<ContactServiceError>>>,
    lists_error: Arc<RwLock<Option<ContactServiceError>>>,
    calls: Arc<RwLock<Vec<RecordedContactCall>>>,
    credentials: Arc<RwLock<Vec<ApiCredentials>>>,
}

impl Default for MockContactService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContactService {
    pub fn new() -> Self {
        Self {
            lists: Arc::new(RwLock::new(BTreeMap::new())),
            contacts: Arc::new(RwLock::new(HashMap::new())),
            next_contact_id: Arc::new(RwLock::new(1000)),
            create_returns_id: Arc::new(RwLock::new(true)),
            update_status: Arc::new(RwLock::new(200)),
            subscribe_status: Arc::new(RwLock::new(201)),
            lookup_error: Arc::new(RwLock::new(None)),
            create_error: Arc::new(RwLock::new(None)),
            update_error: Arc::new(RwLock::new(None)),
            subscribe_error: Arc::new(RwLock::new(None)),
            lists_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            credentials: Arc::new(RwLock::new(Vec::new())),
        }
    }

    // =========================================================================
    // Data Configuration
    // =========================================================================

    pub async fn add_list(&self, id: &str, name: &str) {
        self.lists
            .write()
            .await
            .insert(id.to_string(), name.to_string());
    }

    /// Register a contact id for an email. Repeated calls add further matches.
    pub async fn add_contact(&self, email: &str, contact_id: &str) {
        self.contacts
            .write()
            .await
            .entry(email.to_string())
            .or_default()
            .push(contact_id.to_string());
    }

    pub async fn set_create_returns_id(&self, returns_id: bool) {
        *self.create_returns_id.write().await = returns_id;
    }

    pub async fn set_update_status(&self, status: u16) {
        *self.update_status.write().await = status;
    }

    pub async fn set_subscribe_status(&self, status: u16) {
        *self.subscribe_status.write().await = status;
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    pub async fn fail_lookup_with(&self, error: ContactServiceError) {
        *self.lookup_error.write().await = Some(error);
    }

    pub async fn fail_create_with(&self, error: ContactServiceError) {
        *self.create_error.write().await = Some(error);
    }

    pub async fn fail_update_with(&self, error: ContactServiceError) {
        *self.update_error.write().await = Some(error);
    }

    pub async fn fail_subscribe_with(&self, error: ContactServiceError) {
        *self.subscribe_error.write().await = Some(error);
    }

    /// Fail the next `list_lists` or `test_connection` call.
    pub async fn fail_lists_with(&self, error: ContactServiceError) {
        *self.lists_error.write().await = Some(error);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedContactCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of create, update and subscribe calls.
    pub async fn write_count(&self) -> usize {
        self.calls.read().await.iter().filter(|c| c.is_write()).count()
    }

    /// Credentials passed to each call, in order.
    pub async fn recorded_credentials(&self) -> Vec<ApiCredentials> {
        self.credentials.read().await.clone()
    }

    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
        self.credentials.write().await.clear();
    }

    async fn record(&self, credentials: &ApiCredentials, call: RecordedContactCall) {
        self.calls.write().await.push(call);
        self.credentials.write().await.push(credentials.clone());
    }

    async fn lists_result(&self) -> Result<BTreeMap<String, String>, ContactServiceError> {
        if let Some(err) = self.lists_error.write().await.take() {
            return Err(err);
        }
        Ok(self.lists.read().await.clone())
    }
}

#[async_trait]
impl ContactService for MockContactService {
    async fn list_lists(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<BTreeMap<String, String>, ContactServiceError> {
        self.record(credentials, RecordedContactCall::ListLists).await;
        self.lists_result().await
    }

    async fn test_connection(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<(), ContactServiceError> {
        self.record(credentials, RecordedContactCall::TestConnection)
            .await;
        self.lists_result().await.map(|_| ())
    }

    async fn find_contact_by_email(
        &self,
        credentials: &ApiCredentials,
        email: &str,
    ) -> Result<Option<String>, ContactServiceError> {
        self.record(
            credentials,
            RecordedContactCall::FindContact {
                email: email.to_string(),
            },
        )
        .await;

        if let Some(err) = self.lookup_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .contacts
            .read()
            .await
            .get(email)
            .and_then(|ids| ids.first().cloned()))
    }

    async fn create_contact(
        &self,
        credentials: &ApiCredentials,
        contact: &ContactData,
    ) -> Result<Option<String>, ContactServiceError> {
        self.record(
            credentials,
            RecordedContactCall::CreateContact {
                contact: contact.clone(),
            },
        )
        .await;

        if let Some(err) = self.create_error.write().await.take() {
            return Err(err);
        }
        if !*self.create_returns_id.read().await {
            return Ok(None);
        }

        let id = {
            let mut next = self.next_contact_id.write().await;
            *next += 1;
            next.to_string()
        };
        self.add_contact(&contact.email, &id).await;
        Ok(Some(id))
    }

    async fn update_contact(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        contact: &ContactData,
    ) -> Result<ContactUpdate, ContactServiceError> {
        self.record(
            credentials,
            RecordedContactCall::UpdateContact {
                contact_id: contact_id.to_string(),
                contact: contact.clone(),
            },
        )
        .await;

        if let Some(err) = self.update_error.write().await.take() {
            return Err(err);
        }

        let status = *self.update_status.read().await;
        Ok(ContactUpdate {
            contact_id: contact_id.to_string(),
            status,
            body: format!(r#"{{"contact":{{"id":"{}"}}}}"#, contact_id),
        })
    }

    async fn add_contact_to_list(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        list_id: &str,
    ) -> Result<(), ContactServiceError> {
        self.record(
            credentials,
            RecordedContactCall::AddToList {
                contact_id: contact_id.to_string(),
                list_id: list_id.to_string(),
            },
        )
        .await;

        if let Some(err) = self.subscribe_error.write().await.take() {
            return Err(err);
        }

        match *self.subscribe_status.read().await {
            200 | 201 => Ok(()),
            status => Err(ContactServiceError::UnexpectedStatus {
                status,
                body: r#"{"errors":[{"title":"mock failure"}]}"#.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> ApiCredentials {
        ApiCredentials::new("https://x.test", "k")
    }

    #[tokio::test]
    async fn test_first_registered_contact_wins() {
        let service = MockContactService::new();
        service.add_contact("a@b.com", "9").await;
        service.add_contact("a@b.com", "12").await;

        let found = service
            .find_contact_by_email(&creds(), "a@b.com")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let service = MockContactService::new();
        service.fail_lookup_with(ContactServiceError::Timeout).await;

        assert!(service
            .find_contact_by_email(&creds(), "a@b.com")
            .await
            .is_err());
        assert!(service
            .find_contact_by_email(&creds(), "a@b.com")
            .await
            .is_ok());
        assert_eq!(service.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_subscribe_status_is_judged() {
        let service = MockContactService::new();
        assert!(service
            .add_contact_to_list(&creds(), "9", "7")
            .await
            .is_ok());

        service.set_subscribe_status(500).await;
        let err = service
            .add_contact_to_list(&creds(), "9", "7")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContactServiceError::UnexpectedStatus { status: 500, .. }
        ));
        assert_eq!(service.write_count().await, 2);
    }
}
