//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock contact service and real SQLite stores in a temp directory,
//! with the sync worker running in the background.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use listsync_core::{
    create_sync_queue, testing::MockContactService, AuthConfig, AuthMethod, ConfigProvider,
    LogStore, OrderSource, SharedSyncConfig, SqliteLogStore, SqliteOrderStore, SyncConfig,
    SyncLogger, SyncMarkerStore, SyncOrchestrator, SyncTrigger,
};

/// Re-export fixtures for test convenience
pub use listsync_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_settings() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.get("/api/v1/settings").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock contact service - configure contacts and failures
    pub contacts: Arc<MockContactService>,
    /// Order store shared with the server (for marker checks)
    pub orders: Arc<SqliteOrderStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let contacts = Arc::new(MockContactService::new());

        let mut config = listsync_core::load_config_from_str("[auth]\nmethod = \"none\"\n")
            .expect("Failed to parse base config");
        config.auth = match test_config.api_key {
            Some(key) => AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some(key),
            },
            None => AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
        };
        config.database.path = db_path.clone();
        config.sync = test_config.sync;

        // Create stores
        let orders =
            Arc::new(SqliteOrderStore::new(&db_path).expect("Failed to create order store"));
        let log_store: Arc<dyn LogStore> =
            Arc::new(SqliteLogStore::new(&db_path).expect("Failed to create log store"));

        let sync_config = SharedSyncConfig::new(config.sync.clone());
        let logger = SyncLogger::new(
            log_store,
            Arc::new(sync_config.clone()) as Arc<dyn ConfigProvider>,
        );

        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::new(sync_config.clone()),
            Arc::clone(&contacts) as Arc<dyn listsync_core::ContactService>,
            Arc::clone(&orders) as Arc<dyn OrderSource>,
            Arc::clone(&orders) as Arc<dyn SyncMarkerStore>,
            logger.clone(),
        ));
        let (queue, worker) = create_sync_queue(orchestrator, 16);

        // Spawn sync worker
        tokio::spawn(worker.run());

        let trigger = SyncTrigger::new(
            Arc::clone(&orders) as Arc<dyn SyncMarkerStore>,
            queue,
            logger.clone(),
        );

        let state = Arc::new(listsync_server::state::AppState::new(
            config,
            sync_config,
            Arc::clone(&contacts) as Arc<dyn listsync_core::ContactService>,
            Arc::clone(&orders),
            logger,
            trigger,
        ));

        let router = listsync_server::api::create_router(state);

        Self {
            router,
            contacts,
            orders,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), &[]).await
    }

    /// Send a GET request with extra headers (for auth tests).
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Post a status change for an order with the given billing email.
    pub async fn change_status(
        &self,
        order_id: u64,
        old_status: &str,
        new_status: &str,
        email: &str,
    ) -> TestResponse {
        self.post(
            &format!("/api/v1/orders/{}/status", order_id),
            serde_json::json!({
                "old_status": old_status,
                "new_status": new_status,
                "order": {
                    "email": email,
                    "first_name": "Ada",
                    "last_name": "Lovelace"
                }
            }),
        )
        .await
    }

    /// Wait until the worker has marked the order, or give up.
    pub async fn wait_for_processed(&self, order_id: u64) -> bool {
        for _ in 0..100 {
            if self.orders.is_processed(order_id).unwrap_or(false) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Wait until the sync log contains a line with `needle`.
    pub async fn wait_for_log(&self, needle: &str) -> bool {
        for _ in 0..100 {
            let response = self.get("/api/v1/logs").await;
            let found = response.body["entries"]
                .as_array()
                .map(|entries| {
                    entries
                        .iter()
                        .any(|e| e["message"].as_str().is_some_and(|m| m.contains(needle)))
                })
                .unwrap_or(false);
            if found {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Require this API key on protected routes
    pub api_key: Option<String>,
    /// Initial sync settings
    pub sync: SyncConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sync: fixtures::sync_config("https://acct.test"),
        }
    }
}

impl TestConfig {
    /// Create config with API key auth enabled.
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    /// Create config with empty sync settings.
    pub fn unconfigured() -> Self {
        Self {
            api_key: None,
            sync: SyncConfig::default(),
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
