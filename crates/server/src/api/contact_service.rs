//! Contact service admin helpers: list picker and connection test.

use axum::{extract::State, Json};
use listsync_core::{ApiCredentials, ContactServiceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

const CREDENTIALS_REQUIRED: &str = "API URL and Key are required";

#[derive(Debug, Serialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Mailing lists keyed by id. Empty when the call cannot be made or fails.
///
/// GET /api/v1/contact-service/lists
pub async fn list_lists(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    let settings = state.sync_settings();
    if !settings.has_credentials() {
        return Json(BTreeMap::new());
    }

    let credentials = ApiCredentials::from(&settings);
    match state.contact_service().list_lists(&credentials).await {
        Ok(lists) => Json(lists),
        Err(e) => {
            warn!(error = %e, "Failed to fetch mailing lists");
            Json(BTreeMap::new())
        }
    }
}

/// POST /api/v1/contact-service/test
pub async fn test_connection(State(state): State<Arc<AppState>>) -> Json<TestConnectionResponse> {
    let settings = state.sync_settings();
    if !settings.has_credentials() {
        return Json(TestConnectionResponse {
            success: false,
            message: Some(CREDENTIALS_REQUIRED.to_string()),
        });
    }

    let credentials = ApiCredentials::from(&settings);
    match state.contact_service().test_connection(&credentials).await {
        Ok(()) => Json(TestConnectionResponse {
            success: true,
            message: None,
        }),
        Err(e) => Json(TestConnectionResponse {
            success: false,
            message: Some(failure_message(&e)),
        }),
    }
}

fn failure_message(error: &ContactServiceError) -> String {
    match error {
        ContactServiceError::MissingField(_) | ContactServiceError::Parse(_) => {
            "Invalid response from ActiveCampaign".to_string()
        }
        ContactServiceError::NotConfigured(_) => CREDENTIALS_REQUIRED.to_string(),
        other => other.to_string(),
    }
}
