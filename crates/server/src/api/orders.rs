//! Order events from the store host.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use listsync_core::{OrderContactData, OrderStatus, SyncMarkerStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

/// Billing fields of the order at the time of the status change.
#[derive(Debug, Deserialize)]
pub struct OrderBillingBody {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub old_status: String,
    pub new_status: String,
    pub order: OrderBillingBody,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub order_id: u64,
    pub dispatched: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub order_id: u64,
    pub processed: bool,
}

#[derive(Debug, Serialize)]
pub struct OrderErrorResponse {
    pub error: String,
}

/// Record the order and run the status-change trigger.
///
/// POST /api/v1/orders/{id}/status
pub async fn order_status_changed(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<u64>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>, impl IntoResponse> {
    let old_status = OrderStatus::from(body.old_status.as_str());
    let new_status = OrderStatus::from(body.new_status.as_str());
    let contact = OrderContactData {
        email: body.order.email.trim().to_string(),
        first_name: body.order.first_name,
        last_name: body.order.last_name,
    };

    if let Err(e) = state.orders().upsert_order(order_id, &new_status, &contact) {
        error!(order_id, error = %e, "Failed to record order");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OrderErrorResponse {
                error: format!("Failed to record order: {}", e),
            }),
        ));
    }

    let dispatched = state
        .trigger()
        .on_order_status_changed(order_id, &old_status, &new_status)
        .await;

    Ok(Json(StatusChangeResponse {
        order_id,
        dispatched,
    }))
}

/// Whether the order has already been synced.
///
/// GET /api/v1/orders/{id}/sync
pub async fn get_sync_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<u64>,
) -> Result<Json<SyncStatusResponse>, impl IntoResponse> {
    match state.orders().is_processed(order_id) {
        Ok(processed) => Ok(Json(SyncStatusResponse {
            order_id,
            processed,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OrderErrorResponse {
                error: format!("Failed to read sync status: {}", e),
            }),
        )),
    }
}
