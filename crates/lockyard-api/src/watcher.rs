//! Background transaction watcher
//!
//! Polls the node for receipts of submitted transactions and drives the
//! transaction flow and notification state when they resolve. The poll
//! loop starts with the first watched item and stops once the list drains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use lockyard_core::TxHash;
use serde::Serialize;

use crate::locks;
use crate::state::AppState;
use crate::txflow::Operation;

/// How often the background task polls the node (seconds).
const POLL_INTERVAL_SECS: u64 = 5;

/// Items older than this are timed out and removed (seconds).
const TIMEOUT_SECS: u64 = 10 * 60;

// ─── Types ───────────────────────────────────────────────────────────────────

struct WatchItem {
    id: String,
    tx_hash: TxHash,
    operation: Operation,
    description: String,
    submitted_at: Instant,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItemInfo {
    pub id: String,
    pub tx_hash: String,
    pub operation: &'static str,
    pub description: String,
    pub elapsed_secs: u64,
}

// ─── TxWatcher ───────────────────────────────────────────────────────────────

struct TxWatcher {
    items: Vec<WatchItem>,
}

impl TxWatcher {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn add(&mut self, tx_hash: TxHash, operation: Operation, description: String) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.items.push(WatchItem {
            id: id.clone(),
            tx_hash,
            operation,
            description,
            submitted_at: Instant::now(),
        });
        id
    }

    fn watched_items(&self) -> Vec<WatchedItemInfo> {
        self.items
            .iter()
            .map(|item| WatchedItemInfo {
                id: item.id.clone(),
                tx_hash: item.tx_hash.to_string(),
                operation: item.operation.as_str(),
                description: item.description.clone(),
                elapsed_secs: item.submitted_at.elapsed().as_secs(),
            })
            .collect()
    }

    async fn poll(&mut self, state: &AppState) {
        let client = match state.rpc_client().await {
            Some(c) => c,
            None => return,
        };

        let mut resolved_ids: Vec<String> = Vec::new();

        for item in &self.items {
            // Check timeout first
            if item.submitted_at.elapsed().as_secs() > TIMEOUT_SECS {
                tracing::warn!(tx_hash = %item.tx_hash, "Transaction watch timed out");
                resolve_failed(state, item).await;
                resolved_ids.push(item.id.clone());
                continue;
            }

            match client.transaction_receipt(&item.tx_hash).await {
                Ok(Some(receipt)) if receipt.succeeded => {
                    resolve_confirmed(state, item).await;
                    resolved_ids.push(item.id.clone());
                }
                Ok(Some(_)) => {
                    resolve_failed(state, item).await;
                    resolved_ids.push(item.id.clone());
                }
                Ok(None) => {
                    // No receipt yet - dropped if the node no longer knows
                    // the hash at all
                    if let Ok(None) = client.transaction_by_hash(&item.tx_hash).await {
                        tracing::warn!(tx_hash = %item.tx_hash, "Transaction dropped");
                        resolve_failed(state, item).await;
                        resolved_ids.push(item.id.clone());
                    }
                }
                Err(e) => {
                    tracing::debug!(tx_hash = %item.tx_hash, error = %e, "Receipt poll failed");
                }
            }
        }

        self.items.retain(|item| !resolved_ids.contains(&item.id));
    }
}

async fn resolve_confirmed(state: &AppState, item: &WatchItem) {
    tracing::info!(tx_hash = %item.tx_hash, operation = item.operation.as_str(), "Transaction confirmed");

    {
        // A newer submission may have superseded this flow while the
        // receipt was pending; never let a stale outcome overwrite it
        let mut flow = state.tx_flow().write().await;
        if flow.tx_hash.as_ref() == Some(&item.tx_hash) {
            flow.receipt_success(Instant::now());
        }
    }

    state.notifications().clear_pending();
    state.notifications().success(item.operation.success_message());

    // Contract state changed: refresh the displayed list and total count.
    // Balance and allowance reads are per-request, so the frontend just
    // refetches those.
    if let Err(e) = locks::load_recent(state).await {
        tracing::warn!(error = %e, "Post-transaction refresh failed");
    }
}

async fn resolve_failed(state: &AppState, item: &WatchItem) {
    let message = {
        let mut flow = state.tx_flow().write().await;
        if flow.tx_hash.as_ref() == Some(&item.tx_hash) {
            flow.receipt_failed()
        } else {
            crate::txflow::FAILED_MESSAGE
        }
    };

    state.notifications().clear_pending();
    state.notifications().error(message);
}

// ─── Managed state ───────────────────────────────────────────────────────────

pub struct TxWatcherState {
    watcher: tokio::sync::Mutex<TxWatcher>,
    polling: Arc<AtomicBool>,
}

impl Default for TxWatcherState {
    fn default() -> Self {
        Self {
            watcher: tokio::sync::Mutex::new(TxWatcher::new()),
            polling: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl TxWatcherState {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_poll_loop(state: &AppState) {
    let watcher_state = state.tx_watcher();
    if watcher_state.polling.swap(true, Ordering::SeqCst) {
        return; // Already running
    }

    let polling = watcher_state.polling.clone();
    let state = state.clone();

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(POLL_INTERVAL_SECS)).await;

            let mut watcher = state.tx_watcher().watcher.lock().await;
            if watcher.items.is_empty() {
                drop(watcher);
                polling.store(false, Ordering::SeqCst);
                break;
            }
            watcher.poll(&state).await;
        }

        tracing::debug!("TxWatcher poll loop stopped (no items)");
    });
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Start watching a submitted transaction for its receipt.
pub async fn watch_tx(
    state: &AppState,
    tx_hash: TxHash,
    operation: Operation,
    description: String,
) -> String {
    let id = {
        let mut watcher = state.tx_watcher().watcher.lock().await;
        watcher.add(tx_hash, operation, description)
    };
    ensure_poll_loop(state);
    id
}

/// Currently watched transactions (for diagnostics)
pub async fn watched_items(state: &AppState) -> Vec<WatchedItemInfo> {
    let watcher = state.tx_watcher().watcher.lock().await;
    watcher.watched_items()
}
