//! API route handlers

pub mod health;
pub mod locker;
pub mod node;
pub mod notifications;
pub mod token;
pub mod wallet;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use lockyard_core::ProtocolError;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dto::ApiError;
use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/node", node::router())
        .nest("/wallet", wallet::router())
        .nest("/locker", locker::router())
        .nest("/token", token::router())
        .nest("/notifications", notifications::router())
        .with_state(state)
}

/// Current wall-clock time in Unix seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Map a protocol error onto an HTTP response
pub(crate) fn protocol_error(e: ProtocolError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ApiError::new(e.error_code(), e.to_string())),
    )
}

/// 503 response used when the node is unreachable
pub(crate) fn node_unavailable() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::new("node_unavailable", "Node not connected")),
    )
}

/// 503 response used when no locker contract is configured
pub(crate) fn locker_unconfigured() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::new(
            "locker_unconfigured",
            "Locker contract not configured",
        )),
    )
}
