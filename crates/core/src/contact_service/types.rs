use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::SyncConfig;

/// Base URL and token for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub base_url: String,
    pub api_key: String,
}

impl ApiCredentials {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// `{base}/api/3/{path}` without doubled slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/3/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl From<&SyncConfig> for ApiCredentials {
    fn from(config: &SyncConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_key.clone())
    }
}

/// Contact fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// What the service said about an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUpdate {
    pub contact_id: String,
    pub status: u16,
    pub body: String,
}

// Wire formats

#[derive(Debug, Serialize)]
pub(crate) struct ContactEnvelope<'a> {
    pub contact: &'a ContactData,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactListEnvelope<'a> {
    #[serde(rename = "contactList")]
    pub contact_list: ContactListMembership<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactListMembership<'a> {
    pub list: &'a str,
    pub contact: &'a str,
    /// 1 = subscribed
    pub status: u8,
}

pub(crate) const STATUS_SUBSCRIBED: u8 = 1;

#[derive(Debug, Deserialize)]
pub(crate) struct ListsResponse {
    pub lists: Option<Vec<ListResult>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResult {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactSearchResponse {
    #[serde(default)]
    pub contacts: Vec<ContactResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactResult {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactCreateResponse {
    pub contact: Option<ContactResult>,
}

/// Ids arrive as strings ("9") but some endpoints send numbers.
fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_id(value).ok_or_else(|| serde::de::Error::custom("id must be a string or number"))
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_id))
}
