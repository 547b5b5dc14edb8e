//! Locker protocol endpoints: browsing, previews, and the three write flows

use std::time::Instant;

use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use evm_node_client::erc20;
use lockyard_core::{Address, TxHash};
use timelock::calculator::{format_utc, humanize_seconds, to_seconds, approval_needed, parse_units};
use timelock::tx_builder::TimelockTxError;
use timelock::view::{tab_counts, LockFilter, SortOrder, StatusFilter};
use timelock::{
    build_approve, build_lock, build_unlock, fetch_locks_by_owner, fetch_total_count, refine,
    DurationUnit, DEFAULT_TOKEN_DECIMALS,
};
use wallet_bridge::RequestStatus;

use crate::dto::{
    ApiError, ApproveSubmitRequest, DurationUnitDto, LockDto, LockPreviewRequest,
    LockPreviewResponse, LockSubmitRequest, LocksResponse, MyLocksResponse, SummaryResponse,
    TxStatusResponse, TxSubmitResponse, UnlockSubmitRequest,
};
use crate::routes::{locker_unconfigured, node_unavailable, protocol_error, unix_now};
use crate::txflow::{validate_approve, validate_lock, validate_unlock, Operation};
use crate::watcher::watch_tx;
use crate::{locks, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locks", get(get_locks))
        .route("/locks/load", post(load_locks))
        .route("/locks/load-more", post(load_more_locks))
        .route("/locks/:id", get(get_lock_by_id))
        .route("/my-locks", get(get_my_locks))
        .route("/summary", get(get_summary))
        .route("/durations", get(get_durations))
        .route("/preview", post(preview_lock))
        .route("/approve", post(submit_approve))
        .route("/lock", post(submit_lock))
        .route("/unlock", post(submit_unlock))
        .route("/tx-status", get(get_tx_status))
        .route("/watched", get(get_watched))
}

/// Refinement query parameters, all optional
#[derive(Debug, Deserialize, Default)]
pub struct RefineParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl RefineParams {
    fn to_filter(&self) -> LockFilter {
        LockFilter {
            text: self.query.clone().unwrap_or_default(),
            status: StatusFilter::parse(self.status.as_deref().unwrap_or("all")),
            sort: SortOrder::parse(self.sort.as_deref().unwrap_or("unlock-asc")),
        }
    }
}

/// Build the Browse Locks response from the current controller state,
/// refined by the given filter. The refinement is pure; the accumulated
/// list is untouched.
async fn locks_view(state: &AppState, filter: &LockFilter) -> LocksResponse {
    let now = unix_now();
    let list = state.lock_list().read().await;

    let visible = refine(&list.displayed, filter, now);

    LocksResponse {
        phase: list.phase,
        locks: visible.iter().map(|l| LockDto::from_lock(l, now)).collect(),
        next_index: list.next_index,
        total: list.total,
        counts: tab_counts(&list.displayed, now),
    }
}

/// GET /locker/locks - the displayed set with client-side refinement
pub async fn get_locks(
    State(state): State<AppState>,
    Query(params): Query<RefineParams>,
) -> Json<LocksResponse> {
    Json(locks_view(&state, &params.to_filter()).await)
}

/// POST /locker/locks/load - reset and fetch the newest page
pub async fn load_locks(
    State(state): State<AppState>,
) -> Result<Json<LocksResponse>, (StatusCode, Json<ApiError>)> {
    locks::load_recent(&state).await.map_err(protocol_error)?;
    Ok(Json(locks_view(&state, &LockFilter::default()).await))
}

/// POST /locker/locks/load-more - fetch the next page from the cursor
pub async fn load_more_locks(
    State(state): State<AppState>,
) -> Result<Json<LocksResponse>, (StatusCode, Json<ApiError>)> {
    locks::load_more(&state).await.map_err(protocol_error)?;
    Ok(Json(locks_view(&state, &LockFilter::default()).await))
}

/// GET /locker/locks/:id - single-record lookup; replaces the displayed set
pub async fn get_lock_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<LocksResponse>, (StatusCode, Json<ApiError>)> {
    locks::load_by_id(&state, id).await.map_err(protocol_error)?;
    Ok(Json(locks_view(&state, &LockFilter::default()).await))
}

/// GET /locker/my-locks - every lock owned by the connected wallet
pub async fn get_my_locks(
    State(state): State<AppState>,
    Query(params): Query<RefineParams>,
) -> Result<Json<MyLocksResponse>, (StatusCode, Json<ApiError>)> {
    let wallet = state.wallet().await.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Please connect your wallet")),
        )
    })?;
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let locker = state.locker().await.ok_or_else(locker_unconfigured)?;

    let total = fetch_total_count(&client, &locker)
        .await
        .map_err(protocol_error)?;

    let owned = fetch_locks_by_owner(&client, &locker, &wallet.address, total).await;

    let now = unix_now();
    let visible = refine(&owned, &params.to_filter(), now);

    Ok(Json(MyLocksResponse {
        locks: visible.iter().map(|l| LockDto::from_lock(l, now)).collect(),
        counts: tab_counts(&owned, now),
    }))
}

/// GET /locker/summary - total locks vs. currently displayed
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let list = state.lock_list().read().await;
    Json(SummaryResponse {
        total_locks: list.total,
        showing: list.displayed.len(),
    })
}

/// GET /locker/durations - the lock form's duration unit options
pub async fn get_durations() -> Json<Vec<DurationUnitDto>> {
    let units = DurationUnit::ALL
        .iter()
        .map(|u| DurationUnitDto {
            label: u.label().to_string(),
            seconds: u.factor(),
        })
        .collect();
    Json(units)
}

/// POST /locker/preview - what a lock submission would put on chain
pub async fn preview_lock(
    State(state): State<AppState>,
    Json(request): Json<LockPreviewRequest>,
) -> Result<Json<LockPreviewResponse>, (StatusCode, Json<ApiError>)> {
    let token = Address::new(request.token.clone());
    if !token.is_well_formed() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Invalid token address")),
        ));
    }

    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let decimals = erc20::decimals(&client, &token)
        .await
        .unwrap_or(DEFAULT_TOKEN_DECIMALS);

    let amount_raw = parse_units(&request.amount, decimals).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Invalid amount")),
        )
    })?;

    let duration_seconds = to_seconds(&request.duration_value, &request.duration_unit);

    // Allowance is only knowable with a wallet and a configured locker;
    // anything short of a successful read means "approval needed"
    let allowance = match (state.wallet().await, state.locker().await) {
        (Some(wallet), Some(locker)) => {
            erc20::allowance(&client, &token, &wallet.address, &locker)
                .await
                .ok()
        }
        _ => None,
    };

    let estimated_unlock = unix_now().saturating_add(duration_seconds);

    Ok(Json(LockPreviewResponse {
        amount_raw: amount_raw.to_string(),
        duration_seconds,
        duration_display: humanize_seconds(i64::try_from(duration_seconds).unwrap_or(i64::MAX)),
        estimated_unlock_utc: format_utc(i64::try_from(estimated_unlock).unwrap_or(0)),
        approval_needed: approval_needed(allowance, amount_raw),
    }))
}

/// POST /locker/approve - park an approve sign request at the bridge
pub async fn submit_approve(
    State(state): State<AppState>,
    Json(request): Json<ApproveSubmitRequest>,
) -> Result<Json<TxSubmitResponse>, (StatusCode, Json<ApiError>)> {
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let locker = state.locker().await.ok_or_else(locker_unconfigured)?;

    let token_addr = Address::new(request.token.clone());
    let decimals = if token_addr.is_well_formed() {
        erc20::decimals(&client, &token_addr)
            .await
            .unwrap_or(DEFAULT_TOKEN_DECIMALS)
    } else {
        DEFAULT_TOKEN_DECIMALS
    };

    let (token, amount) = validate_approve(
        &crate::txflow::ApproveInput {
            token: request.token,
            amount: request.amount.clone(),
        },
        decimals,
    )
    .map_err(protocol_error)?;

    let call = build_approve(&token, &locker, amount).map_err(tx_build_error)?;
    let message = format!("Approve {} for locking", request.amount);

    start_sign_flow(&state, Operation::Approve, call, message).await
}

/// POST /locker/lock - park a lock sign request at the bridge
pub async fn submit_lock(
    State(state): State<AppState>,
    Json(request): Json<LockSubmitRequest>,
) -> Result<Json<TxSubmitResponse>, (StatusCode, Json<ApiError>)> {
    let client = state.rpc_client().await.ok_or_else(node_unavailable)?;
    let locker = state.locker().await.ok_or_else(locker_unconfigured)?;
    let wallet = state.wallet().await;

    let token_addr = Address::new(request.token.clone());
    let decimals = if token_addr.is_well_formed() {
        erc20::decimals(&client, &token_addr)
            .await
            .unwrap_or(DEFAULT_TOKEN_DECIMALS)
    } else {
        DEFAULT_TOKEN_DECIMALS
    };

    let lock_request = validate_lock(
        wallet.as_ref().map(|w| &w.address),
        &crate::txflow::LockInput {
            token: request.token,
            amount: request.amount,
            duration_value: request.duration_value,
            duration_unit: request.duration_unit,
            name: request.name.clone(),
            description: request.description,
        },
        decimals,
    )
    .map_err(protocol_error)?;

    let call = build_lock(&locker, &lock_request).map_err(tx_build_error)?;
    let message = format!("Lock tokens: {}", request.name);

    start_sign_flow(&state, Operation::Lock, call, message).await
}

/// POST /locker/unlock - park an unlock sign request at the bridge
pub async fn submit_unlock(
    State(state): State<AppState>,
    Json(request): Json<UnlockSubmitRequest>,
) -> Result<Json<TxSubmitResponse>, (StatusCode, Json<ApiError>)> {
    let locker = state.locker().await.ok_or_else(locker_unconfigured)?;
    let wallet = state.wallet().await;

    validate_unlock(wallet.as_ref().map(|w| &w.address)).map_err(protocol_error)?;

    let call = build_unlock(&locker, request.lock_id).map_err(tx_build_error)?;
    let message = format!("Unlock lock #{}", request.lock_id);

    start_sign_flow(&state, Operation::Unlock, call, message).await
}

/// GET /locker/tx-status - drive and report the transaction flow.
///
/// While awaiting a signature this also polls the wallet bridge, advancing
/// the flow when the wallet resolves the request.
pub async fn get_tx_status(
    State(state): State<AppState>,
) -> Result<Json<TxStatusResponse>, (StatusCode, Json<ApiError>)> {
    let (awaiting_request, operation) = {
        let mut flow = state.tx_flow().write().await;
        flow.tick(Instant::now());
        match flow.phase {
            crate::txflow::TxPhase::AwaitingSignature => {
                (flow.request_id.clone(), flow.operation)
            }
            _ => (None, flow.operation),
        }
    };

    if let (Some(request_id), Some(operation)) = (awaiting_request, operation) {
        let bridge = state.bridge().await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal(e.to_string())),
            )
        })?;

        match bridge.get_request_status(&request_id).await {
            Some(RequestStatus::TxSubmitted { tx_hash }) => {
                let tx_hash = TxHash::new(tx_hash);
                {
                    let mut flow = state.tx_flow().write().await;
                    flow.wallet_submitted(tx_hash.clone());
                }
                state
                    .notifications()
                    .pending("Transaction pending...", Some(tx_hash.to_string()));
                watch_tx(
                    &state,
                    tx_hash,
                    operation,
                    format!("{} transaction", operation.as_str()),
                )
                .await;
            }
            Some(RequestStatus::Failed(raw)) => {
                let message = {
                    let mut flow = state.tx_flow().write().await;
                    flow.wallet_failed(&raw)
                };
                state.notifications().error(message);
            }
            Some(RequestStatus::Expired) => {
                let message = {
                    let mut flow = state.tx_flow().write().await;
                    flow.wallet_failed("request expired")
                };
                state.notifications().error(message);
            }
            _ => {}
        }
    }

    let flow = state.tx_flow().read().await;
    Ok(Json(TxStatusResponse {
        phase: flow.phase,
        operation: flow.operation.map(|o| o.as_str().to_string()),
        tx_hash: flow.tx_hash.as_ref().map(|h| h.to_string()),
        message: flow.message.clone(),
        navigate_to: flow.navigate_due(Instant::now()).map(|s| s.to_string()),
    }))
}

/// Park a sign request at the bridge and move the flow to AwaitingSignature.
async fn start_sign_flow(
    state: &AppState,
    operation: Operation,
    call: timelock::CallRequest,
    message: String,
) -> Result<Json<TxSubmitResponse>, (StatusCode, Json<ApiError>)> {
    let bridge = state.bridge().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(e.to_string())),
        )
    })?;

    let call_json = serde_json::to_value(&call).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(format!("Failed to serialize call: {}", e))),
        )
    })?;

    let request_id = bridge.create_sign_request(call_json, message).await;
    let request_url = bridge.request_url(&request_id);

    state.tx_flow().write().await.begin(operation, request_id.clone());

    Ok(Json(TxSubmitResponse {
        request_id,
        request_url,
    }))
}

/// GET /locker/watched - transactions the receipt watcher is tracking
pub async fn get_watched(
    State(state): State<AppState>,
) -> Json<Vec<crate::watcher::WatchedItemInfo>> {
    Json(crate::watcher::watched_items(&state).await)
}

fn tx_build_error(e: TimelockTxError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::bad_request(e.to_string())),
    )
}
