//! Integration tests for the admin/event API.
//!
//! These run the full router in-process against the mock contact service,
//! with the sync worker consuming jobs in the background.

mod common;

use axum::http::StatusCode;
use common::{TestConfig, TestFixture};
use listsync_core::testing::RecordedContactCall;
use listsync_core::ContactServiceError;
use serde_json::json;

// =============================================================================
// Health / config
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
}

#[tokio::test]
async fn test_config_hides_api_key() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["auth"]["method"], "none");
    assert_eq!(response.body["sync"]["api_key_configured"], true);
    assert_eq!(response.body["sync"]["list_id"], "7");
    assert!(response.body["sync"].get("api_key").is_none());
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_round_trip() {
    let fixture = TestFixture::with_config(TestConfig::unconfigured()).await;

    let before = fixture.get("/api/v1/settings").await;
    assert_status!(before, StatusCode::OK);
    assert_eq!(before.body["api_key_configured"], false);

    let response = fixture
        .put(
            "/api/v1/settings",
            json!({
                "api_base_url": " https://acct.test ",
                "api_key": "secret",
                "list_id": "12",
                "verbose_logging": true
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "api_base_url", json!("https://acct.test"));
    assert_json_path!(response.body, "api_key_configured", json!(true));
    assert_json_path!(response.body, "list_id", json!("12"));
    assert_json_path!(response.body, "create_missing_contacts", json!(false));
    assert!(!response.body.to_string().contains("secret"));

    let after = fixture.get("/api/v1/settings").await;
    assert_eq!(after.body, response.body);
}

#[tokio::test]
async fn test_settings_edit_applies_to_next_sync() {
    let fixture = TestFixture::with_config(TestConfig::unconfigured()).await;
    fixture.contacts.add_contact("a@b.com", "55").await;

    fixture
        .put(
            "/api/v1/settings",
            json!({
                "api_base_url": "https://acct.test",
                "api_key": "fresh-key",
                "list_id": "9"
            }),
        )
        .await;

    let response = fixture.change_status(42, "pending", "completed", "a@b.com").await;
    assert_json_path!(response.body, "dispatched", json!(true));
    assert!(fixture.wait_for_processed(42).await);

    let credentials = fixture.contacts.recorded_credentials().await;
    assert!(credentials.iter().all(|c| c.api_key == "fresh-key"));
    assert!(fixture
        .contacts
        .recorded_calls()
        .await
        .contains(&RecordedContactCall::AddToList {
            contact_id: "55".to_string(),
            list_id: "9".to_string(),
        }));
}

// =============================================================================
// Order events
// =============================================================================

#[tokio::test]
async fn test_completed_order_is_synced() {
    let fixture = TestFixture::new().await;
    fixture.contacts.add_contact("a@b.com", "55").await;

    let response = fixture.change_status(42, "pending", "completed", "a@b.com").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "order_id", json!(42));
    assert_json_path!(response.body, "dispatched", json!(true));

    assert!(fixture.wait_for_processed(42).await);

    let sync = fixture.get("/api/v1/orders/42/sync").await;
    assert_status!(sync, StatusCode::OK);
    assert_json_path!(sync.body, "processed", json!(true));

    assert!(fixture.wait_for_log("Added a@b.com to list 7 successfully").await);
}

#[tokio::test]
async fn test_non_paid_status_is_not_dispatched() {
    let fixture = TestFixture::new().await;

    let response = fixture.change_status(42, "pending", "on-hold", "a@b.com").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "dispatched", json!(false));
    assert!(
        fixture
            .wait_for_log("Order 42 status changed from pending to on-hold, no sync needed")
            .await
    );
    assert_eq!(fixture.contacts.call_count().await, 0);
}

#[tokio::test]
async fn test_second_paid_transition_is_not_dispatched() {
    let fixture = TestFixture::new().await;
    fixture.contacts.add_contact("a@b.com", "55").await;

    fixture.change_status(42, "pending", "processing", "a@b.com").await;
    assert!(fixture.wait_for_processed(42).await);

    let response = fixture
        .change_status(42, "processing", "completed", "a@b.com")
        .await;

    assert_json_path!(response.body, "dispatched", json!(false));
    assert!(fixture.wait_for_log("Order 42 already processed").await);

    let subscriptions = fixture
        .contacts
        .recorded_calls()
        .await
        .into_iter()
        .filter(|c| matches!(c, RecordedContactCall::AddToList { .. }))
        .count();
    assert_eq!(subscriptions, 1);
}

#[tokio::test]
async fn test_unknown_contact_leaves_order_unmarked() {
    let fixture = TestFixture::new().await;

    let response = fixture.change_status(7, "pending", "completed", "nobody@b.com").await;
    assert_json_path!(response.body, "dispatched", json!(true));

    assert!(fixture.wait_for_log("No contact found for email: nobody@b.com").await);

    let sync = fixture.get("/api/v1/orders/7/sync").await;
    assert_json_path!(sync.body, "processed", json!(false));
    assert_eq!(fixture.contacts.write_count().await, 0);
}

#[tokio::test]
async fn test_subscription_failure_is_logged_and_retryable() {
    let fixture = TestFixture::new().await;
    fixture.contacts.add_contact("a@b.com", "55").await;
    fixture.contacts.set_subscribe_status(500).await;

    fixture.change_status(42, "pending", "processing", "a@b.com").await;
    assert!(fixture.wait_for_log("Failed to add contact - response code: 500").await);
    let sync = fixture.get("/api/v1/orders/42/sync").await;
    assert_json_path!(sync.body, "processed", json!(false));

    // A later paid transition dispatches again because the marker was never set
    fixture.contacts.set_subscribe_status(201).await;
    let response = fixture
        .change_status(42, "processing", "completed", "a@b.com")
        .await;
    assert_json_path!(response.body, "dispatched", json!(true));
    assert!(fixture.wait_for_processed(42).await);
}

#[tokio::test]
async fn test_sync_status_of_unknown_order() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/orders/999/sync").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "processed", json!(false));
}

#[tokio::test]
async fn test_status_change_rejects_malformed_body() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/orders/42/status", json!({ "new_status": "completed" }))
        .await;

    assert!(response.status.is_client_error());
}

// =============================================================================
// Logs
// =============================================================================

#[tokio::test]
async fn test_logs_are_newest_first() {
    let fixture = TestFixture::new().await;

    fixture.change_status(1, "pending", "on-hold", "a@b.com").await;
    fixture.change_status(2, "pending", "cancelled", "a@b.com").await;

    let response = fixture.get("/api/v1/logs").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "capacity", json!(100));
    let entries = response.body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Order 2 status changed"));
    assert!(entries[1]["message"]
        .as_str()
        .unwrap()
        .starts_with("Order 1 status changed"));
}

#[tokio::test]
async fn test_quiet_settings_hide_trace_lines() {
    let mut config = TestConfig::default();
    config.sync.verbose_logging = false;
    let fixture = TestFixture::with_config(config).await;

    fixture.change_status(1, "pending", "on-hold", "a@b.com").await;

    let response = fixture.get("/api/v1/logs").await;
    assert_eq!(response.body["entries"], json!([]));
}

// =============================================================================
// Contact service helpers
// =============================================================================

#[tokio::test]
async fn test_lists_returns_mapping() {
    let fixture = TestFixture::new().await;
    fixture.contacts.add_list("1", "Customers").await;
    fixture.contacts.add_list("7", "Newsletter").await;

    let response = fixture.get("/api/v1/contact-service/lists").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "1": "Customers", "7": "Newsletter" })
    );
}

#[tokio::test]
async fn test_lists_empty_on_failure() {
    let fixture = TestFixture::new().await;
    fixture.contacts.add_list("1", "Customers").await;
    fixture
        .contacts
        .fail_lists_with(ContactServiceError::Timeout)
        .await;

    let response = fixture.get("/api/v1/contact-service/lists").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body, json!({}));
}

#[tokio::test]
async fn test_lists_empty_without_credentials() {
    let fixture = TestFixture::with_config(TestConfig::unconfigured()).await;

    let response = fixture.get("/api/v1/contact-service/lists").await;

    assert_eq!(response.body, json!({}));
    assert_eq!(fixture.contacts.call_count().await, 0);
}

#[tokio::test]
async fn test_connection_success() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/contact-service/test", json!({})).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
}

#[tokio::test]
async fn test_connection_requires_credentials() {
    let fixture = TestFixture::with_config(TestConfig::unconfigured()).await;

    let response = fixture.post("/api/v1/contact-service/test", json!({})).await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "success", json!(false));
    assert_json_path!(
        response.body,
        "message",
        json!("API URL and Key are required")
    );
    assert_eq!(fixture.contacts.call_count().await, 0);
}

#[tokio::test]
async fn test_connection_invalid_response() {
    let fixture = TestFixture::new().await;
    fixture
        .contacts
        .fail_lists_with(ContactServiceError::MissingField("lists"))
        .await;

    let response = fixture.post("/api/v1/contact-service/test", json!({})).await;

    assert_json_path!(response.body, "success", json!(false));
    assert_json_path!(
        response.body,
        "message",
        json!("Invalid response from ActiveCampaign")
    );
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_key() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("admin-key")).await;

    let response = fixture.get("/api/v1/settings").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .get_with_headers("/api/v1/settings", &[("Authorization", "Bearer wrong")])
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .get_with_headers("/api/v1/settings", &[("Authorization", "Bearer admin-key")])
        .await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("admin-key")).await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("listsync_http_requests_total"));
    assert!(body.contains("listsync_sync_queue_depth"));
    assert!(body.contains("listsync_sync_log_entries"));
}
