//! Node status and configuration endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use lockyard_core::RpcConfig;

use crate::dto::{NodeConfigRequest, NodeStatusResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/config", post(configure))
}

/// GET /node/status - node reachability plus chain/locker settings
pub async fn get_status(State(state): State<AppState>) -> Json<NodeStatusResponse> {
    let config = state.config().await;
    let client = state.rpc_client().await;

    let (connected, chain_id, chain_height) = match client {
        Some(client) => {
            let chain_id = client.chain_id().await.ok();
            let height = client.block_number().await.ok();
            (true, chain_id, height)
        }
        None => (false, None, None),
    };

    let locker_address = config.locker().map(|a| a.to_string());
    Json(NodeStatusResponse {
        connected,
        url: config.rpc.url,
        chain_id,
        chain_height,
        locker_address,
        explorer_url: config.chain.explorer_url,
    })
}

/// POST /node/config - point the app at a different node / locker contract
pub async fn configure(
    State(state): State<AppState>,
    Json(request): Json<NodeConfigRequest>,
) -> Json<NodeStatusResponse> {
    state
        .set_rpc_config(RpcConfig { url: request.url }, request.locker_address)
        .await;

    get_status(State(state)).await
}
