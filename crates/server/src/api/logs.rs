use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use listsync_core::{LogEntry, LOG_CAPACITY};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct LogsResponse {
    /// Newest first.
    pub entries: Vec<LogEntry>,
    pub capacity: usize,
}

#[derive(Serialize)]
pub struct LogsErrorResponse {
    pub error: String,
}

/// GET /api/v1/logs
pub async fn recent_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LogsResponse>, impl IntoResponse> {
    match state.logger().recent_logs() {
        Ok(entries) => Ok(Json(LogsResponse {
            entries,
            capacity: LOG_CAPACITY,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(LogsErrorResponse {
                error: format!("Failed to read sync log: {}", e),
            }),
        )),
    }
}
