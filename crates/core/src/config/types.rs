use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub contact_service: ContactServiceConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication for the admin/event API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("listsync.db")
}

/// Settings the sync pipeline reads on every run.
///
/// Empty `api_base_url`, `api_key` or `list_id` make the settings unusable for
/// syncing; `verbose_logging` and `create_missing_contacts` never affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Account API root, e.g. "https://myaccount.api-us1.com"
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Mailing list that paying customers are subscribed to
    #[serde(default)]
    pub list_id: String,
    #[serde(default)]
    pub verbose_logging: bool,
    /// Create the contact when no contact matches the order email.
    #[serde(default)]
    pub create_missing_contacts: bool,
}

impl SyncConfig {
    /// Names of required settings that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_base_url.trim().is_empty() {
            missing.push("api_base_url");
        }
        if self.api_key.trim().is_empty() {
            missing.push("api_key");
        }
        if self.list_id.trim().is_empty() {
            missing.push("list_id");
        }
        missing
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Whether the API can be reached at all (list id not needed).
    pub fn has_credentials(&self) -> bool {
        !self.api_base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// HTTP settings for the contact service client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactServiceConfig {
    /// Timeout for lookups, creates and updates (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for the list subscription call (seconds)
    #[serde(default = "default_subscribe_timeout")]
    pub subscribe_timeout_secs: u64,
}

impl Default for ContactServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            subscribe_timeout_secs: default_subscribe_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    5
}

fn default_subscribe_timeout() -> u64 {
    30
}

/// Deferred sync queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    1000
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SanitizedSyncConfig,
    pub contact_service: ContactServiceConfig,
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
}

/// Sync settings with the API key hidden
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedSyncConfig {
    pub api_base_url: String,
    pub api_key_configured: bool,
    pub list_id: String,
    pub verbose_logging: bool,
    pub create_missing_contacts: bool,
}

impl From<&SyncConfig> for SanitizedSyncConfig {
    fn from(sync: &SyncConfig) -> Self {
        Self {
            api_base_url: sync.api_base_url.clone(),
            api_key_configured: !sync.api_key.is_empty(),
            list_id: sync.list_id.clone(),
            verbose_logging: sync.verbose_logging,
            create_missing_contacts: sync.create_missing_contacts,
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            sync: SanitizedSyncConfig::from(&config.sync),
            contact_service: config.contact_service.clone(),
            queue: config.queue.clone(),
        }
    }
}
