use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{contact_service, handlers, logs, orders, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes; everything but /health sits behind auth
    let api_routes = Router::new()
        // Config and settings
        .route("/config", get(handlers::get_config))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        // Order events
        .route("/orders/{id}/status", post(orders::order_status_changed))
        .route("/orders/{id}/sync", get(orders::get_sync_status))
        // Sync log
        .route("/logs", get(logs::recent_logs))
        // Contact service helpers
        .route("/contact-service/lists", get(contact_service::list_lists))
        .route("/contact-service/test", post(contact_service::test_connection))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
