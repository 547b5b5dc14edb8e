//! Wallet connection endpoints

use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use wallet_bridge::RequestStatus;

use crate::dto::{
    wallet_status, ApiError, ConnectionStatusResponse, WalletConnectResponse, WalletStatusResponse,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", post(start_connect))
        .route("/connection/:request_id", get(get_connection_status))
        .route("/status", get(get_status))
        .route("/disconnect", post(disconnect))
}

/// POST /wallet/connect - start the wallet connection flow
pub async fn start_connect(
    State(state): State<AppState>,
) -> Result<Json<WalletConnectResponse>, (StatusCode, Json<ApiError>)> {
    let bridge = state.bridge().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(e.to_string())),
        )
    })?;

    let request_id = bridge.create_connect_request().await;
    let request_url = bridge.request_url(&request_id);

    Ok(Json(WalletConnectResponse {
        request_id,
        request_url,
    }))
}

/// GET /wallet/connection/:request_id - poll a connection request
pub async fn get_connection_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<ConnectionStatusResponse>, (StatusCode, Json<ApiError>)> {
    let bridge = state.bridge().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(e.to_string())),
        )
    })?;

    match bridge.get_request_status(&request_id).await {
        Some(RequestStatus::Pending) => Ok(Json(ConnectionStatusResponse {
            status: wallet_status::PENDING.to_string(),
            address: None,
        })),
        Some(RequestStatus::AddressReceived(address)) => {
            // Update the wallet state
            state.set_wallet(address.clone()).await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiError::bad_request(e.to_string())),
                )
            })?;

            Ok(Json(ConnectionStatusResponse {
                status: wallet_status::CONNECTED.to_string(),
                address: Some(address),
            }))
        }
        Some(RequestStatus::Expired) => Ok(Json(ConnectionStatusResponse {
            status: wallet_status::EXPIRED.to_string(),
            address: None,
        })),
        Some(RequestStatus::Failed(msg)) => Ok(Json(ConnectionStatusResponse {
            // Failed status includes error message as "failed: <reason>"
            status: format!("{}: {}", wallet_status::FAILED, msg),
            address: None,
        })),
        _ => Ok(Json(ConnectionStatusResponse {
            // Unknown status - request not found
            status: "unknown".to_string(),
            address: None,
        })),
    }
}

/// GET /wallet/status - current connection state
pub async fn get_status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    let wallet = state.wallet().await;

    Json(WalletStatusResponse {
        connected: wallet.is_some(),
        address: wallet.map(|w| w.address.to_string()),
    })
}

/// POST /wallet/disconnect
pub async fn disconnect(State(state): State<AppState>) -> StatusCode {
    state.disconnect_wallet().await;
    StatusCode::NO_CONTENT
}
