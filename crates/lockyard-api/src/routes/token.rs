//! Token read endpoints: metadata, balance, allowance

use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use lockyard_core::Address;

use evm_node_client::erc20;
use timelock::calculator::format_units;
use timelock::DEFAULT_TOKEN_DECIMALS;

use crate::dto::{AllowanceResponse, ApiError, BalanceResponse, TokenInfoResponse};
use crate::routes::{locker_unconfigured, node_unavailable};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:address/info", get(get_info))
        .route("/:address/balance", get(get_balance))
        .route("/:address/allowance", get(get_allowance))
}

fn parse_token(address: &str) -> Result<Address, (StatusCode, Json<ApiError>)> {
    let token = Address::new(address.to_string());
    if !token.is_well_formed() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(format!(
                "Invalid token address: {}",
                address
            ))),
        ));
    }
    Ok(token)
}

/// GET /token/:address/info - symbol and decimals, degrading to defaults
pub async fn get_info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TokenInfoResponse>, (StatusCode, Json<ApiError>)> {
    let token = parse_token(&address)?;
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;

    let info = erc20::token_info(&client, &token).await;

    Ok(Json(TokenInfoResponse {
        address: token.to_string(),
        symbol: info.symbol,
        decimals: info.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS),
    }))
}

/// GET /token/:address/balance - connected wallet's balance, formatted with
/// the token's live decimals
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, (StatusCode, Json<ApiError>)> {
    let token = parse_token(&address)?;
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let wallet = state.wallet().await.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("No wallet connected")),
        )
    })?;

    let raw = erc20::balance_of(&client, &token, &wallet.address)
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new("balance_unavailable", e.to_string())),
            )
        })?;

    let info = erc20::token_info(&client, &token).await;
    let decimals = info.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS);

    Ok(Json(BalanceResponse {
        raw: raw.to_string(),
        formatted: format_units(raw, decimals),
        symbol: info.symbol,
    }))
}

/// GET /token/:address/allowance - connected wallet's allowance toward the
/// locker contract
pub async fn get_allowance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AllowanceResponse>, (StatusCode, Json<ApiError>)> {
    let token = parse_token(&address)?;
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let locker = state.locker().await.ok_or_else(locker_unconfigured)?;
    let wallet = state.wallet().await.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("No wallet connected")),
        )
    })?;

    let raw = erc20::allowance(&client, &token, &wallet.address, &locker)
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new("allowance_unavailable", e.to_string())),
            )
        })?;

    let decimals = erc20::decimals(&client, &token)
        .await
        .unwrap_or(DEFAULT_TOKEN_DECIMALS);

    Ok(Json(AllowanceResponse {
        raw: raw.to_string(),
        formatted: format_units(raw, decimals),
    }))
}
