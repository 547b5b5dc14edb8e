//! HTTP handlers for the wallet bridge

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::server::ServerState;
use crate::types::{CallbackPayload, RequestType};

/// The payload the frontend hands to the wallet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub request_id: String,
    /// "connect" or "sign"
    pub kind: String,
    /// Unsigned call (sign requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<serde_json::Value>,
    /// Display message (sign requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /request/:id - fetch the pending request payload
pub async fn handle_request(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<RequestView>, StatusCode> {
    let requests = state.pending_requests.read().await;
    let request = requests.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    if request.is_expired() {
        return Err(StatusCode::GONE);
    }

    let view = match &request.request_type {
        RequestType::Connect => RequestView {
            request_id: id,
            kind: "connect".to_string(),
            call: None,
            message: None,
        },
        RequestType::SignTransaction { call, message } => RequestView {
            request_id: id,
            kind: "sign".to_string(),
            call: Some(call.clone()),
            message: Some(message.clone()),
        },
    };

    Ok(Json(view))
}

/// POST /callback/:id - wallet outcome (address, tx hash, or error)
pub async fn handle_callback(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(payload): Json<CallbackPayload>,
) -> StatusCode {
    let mut requests = state.pending_requests.write().await;

    let request = match requests.get_mut(&id) {
        Some(r) => r,
        None => return StatusCode::NOT_FOUND,
    };

    if request.is_expired() {
        return StatusCode::GONE;
    }

    if request.apply_callback(&payload) {
        tracing::debug!(request_id = %id, "Wallet callback applied");
        StatusCode::OK
    } else {
        tracing::warn!(request_id = %id, "Wallet callback did not match request type");
        StatusCode::BAD_REQUEST
    }
}
