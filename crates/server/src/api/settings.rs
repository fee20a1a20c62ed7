//! Live sync settings (the admin settings page).

use axum::{extract::State, Json};
use listsync_core::{config::SanitizedSyncConfig, SyncConfig};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SanitizedSyncConfig> {
    Json(SanitizedSyncConfig::from(&state.sync_settings()))
}

/// Replace the sync settings. The next sync run reads the new values.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SyncConfig>,
) -> Json<SanitizedSyncConfig> {
    let settings = SyncConfig {
        api_base_url: body.api_base_url.trim().to_string(),
        api_key: body.api_key.trim().to_string(),
        list_id: body.list_id.trim().to_string(),
        verbose_logging: body.verbose_logging,
        create_missing_contacts: body.create_missing_contacts,
    };

    info!(
        api_base_url = %settings.api_base_url,
        list_id = %settings.list_id,
        verbose_logging = settings.verbose_logging,
        "Sync settings updated"
    );
    state.update_sync_settings(settings);

    Json(SanitizedSyncConfig::from(&state.sync_settings()))
}
