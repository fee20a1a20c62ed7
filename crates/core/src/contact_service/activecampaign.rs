//! ActiveCampaign v3 REST client.
//!
//! One attempt per call, no retries. Authentication is the `Api-Token` header.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ContactServiceConfig;
use crate::metrics::{CONTACT_API_DURATION, CONTACT_API_REQUESTS};

use super::types::{
    ContactCreateResponse, ContactEnvelope, ContactListEnvelope, ContactListMembership,
    ContactSearchResponse, ListsResponse, STATUS_SUBSCRIBED,
};
use super::{ApiCredentials, ContactData, ContactService, ContactServiceError, ContactUpdate};

const API_TOKEN_HEADER: &str = "Api-Token";

/// HTTP client for the ActiveCampaign API.
pub struct ActiveCampaignClient {
    client: Client,
    subscribe_timeout: Duration,
}

impl ActiveCampaignClient {
    pub fn new(config: &ContactServiceConfig) -> Result<Self, ContactServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            subscribe_timeout: Duration::from_secs(config.subscribe_timeout_secs),
        })
    }

    fn request(
        &self,
        method: Method,
        credentials: &ApiCredentials,
        path: &str,
    ) -> Result<RequestBuilder, ContactServiceError> {
        if credentials.base_url.trim().is_empty() || credentials.api_key.trim().is_empty() {
            return Err(ContactServiceError::NotConfigured(
                "API URL and Key are required".to_string(),
            ));
        }

        Ok(self
            .client
            .request(method, credentials.endpoint(path))
            .header(API_TOKEN_HEADER, &credentials.api_key))
    }

    /// Send and return status plus raw body.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String), ContactServiceError> {
        let start = Instant::now();
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, ContactServiceError>((status, body))
        }
        .await;

        CONTACT_API_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        let label = match &result {
            Ok((status, _)) if status.is_success() => "success",
            Ok(_) => "http_error",
            Err(ContactServiceError::Timeout) => "timeout",
            Err(_) => "transport_error",
        };
        CONTACT_API_REQUESTS
            .with_label_values(&[operation, label])
            .inc();

        if let Ok((status, _)) = &result {
            debug!("{} -> HTTP {}", operation, status.as_u16());
        }
        result
    }

    async fn fetch_lists(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<Vec<super::types::ListResult>, ContactServiceError> {
        let request = self.request(Method::GET, credentials, "lists")?;
        let (status, body) = self.send("list_lists", request).await?;

        let parsed: ListsResponse = match parse_json(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(e),
            Err(_) => return Err(unexpected(status, body)),
        };

        match parsed.lists {
            Some(lists) => Ok(lists),
            None if status.is_success() => Err(ContactServiceError::MissingField("lists")),
            None => Err(unexpected(status, body)),
        }
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ContactServiceError> {
    serde_json::from_str(body).map_err(|e| ContactServiceError::Parse(e.to_string()))
}

fn unexpected(status: StatusCode, body: String) -> ContactServiceError {
    ContactServiceError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ContactService for ActiveCampaignClient {
    async fn list_lists(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<BTreeMap<String, String>, ContactServiceError> {
        let lists = self.fetch_lists(credentials).await?;
        Ok(lists.into_iter().map(|l| (l.id, l.name)).collect())
    }

    async fn test_connection(
        &self,
        credentials: &ApiCredentials,
    ) -> Result<(), ContactServiceError> {
        self.fetch_lists(credentials).await.map(|_| ())
    }

    async fn find_contact_by_email(
        &self,
        credentials: &ApiCredentials,
        email: &str,
    ) -> Result<Option<String>, ContactServiceError> {
        let request = self
            .request(Method::GET, credentials, "contacts")?
            .query(&[("email", email)]);
        let (status, body) = self.send("find_contact", request).await?;

        if !status.is_success() {
            return Err(unexpected(status, body));
        }

        let parsed: ContactSearchResponse = parse_json(&body)?;
        Ok(parsed.contacts.into_iter().next().and_then(|c| c.id))
    }

    async fn create_contact(
        &self,
        credentials: &ApiCredentials,
        contact: &ContactData,
    ) -> Result<Option<String>, ContactServiceError> {
        let request = self
            .request(Method::POST, credentials, "contacts")?
            .json(&ContactEnvelope { contact });
        let (status, body) = self.send("create_contact", request).await?;

        if !status.is_success() {
            return Err(unexpected(status, body));
        }

        let parsed: ContactCreateResponse = parse_json(&body)?;
        Ok(parsed.contact.and_then(|c| c.id))
    }

    async fn update_contact(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        contact: &ContactData,
    ) -> Result<ContactUpdate, ContactServiceError> {
        let path = format!("contacts/{}", urlencoding::encode(contact_id));
        let request = self
            .request(Method::PUT, credentials, &path)?
            .json(&ContactEnvelope { contact });
        let (status, body) = self.send("update_contact", request).await?;

        Ok(ContactUpdate {
            contact_id: contact_id.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn add_contact_to_list(
        &self,
        credentials: &ApiCredentials,
        contact_id: &str,
        list_id: &str,
    ) -> Result<(), ContactServiceError> {
        let request = self
            .request(Method::POST, credentials, "contactLists")?
            .timeout(self.subscribe_timeout)
            .json(&ContactListEnvelope {
                contact_list: ContactListMembership {
                    list: list_id,
                    contact: contact_id,
                    status: STATUS_SUBSCRIBED,
                },
            });
        let (status, body) = self.send("add_contact_to_list", request).await?;

        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => Err(unexpected(status, body)),
        }
    }
}
