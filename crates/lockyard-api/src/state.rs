//! Application state shared across API handlers

use std::sync::Arc;
use std::time::Instant;

use evm_node_client::RpcClient;
use lockyard_core::{Address, AppConfig, RpcConfig};
use thiserror::Error;
use tokio::sync::RwLock;
use wallet_bridge::WalletBridge;

use crate::locks::LockListState;
use crate::notify::NotificationCenter;
use crate::txflow::TxFlowState;
use crate::watcher::TxWatcherState;

/// Errors that can occur in the API layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid wallet address format
    #[error("Invalid wallet address: {reason}")]
    InvalidAddress { reason: String },

    /// Wallet bridge error
    #[error("Wallet bridge error: {0}")]
    WalletBridge(#[from] std::io::Error),
}

/// State representing a connected wallet.
///
/// The address is stored as a 0x-prefixed hex account address, exactly as
/// the wallet reported it (checksummed casing preserved).
#[derive(Clone, Debug)]
pub struct WalletState {
    pub address: Address,
    /// When the wallet was connected
    pub connected_at: Instant,
}

impl WalletState {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            connected_at: Instant::now(),
        }
    }
}

/// Validate that an address is a well-formed EVM account address:
/// 0x prefix followed by exactly 40 hex characters.
///
/// Checksum casing is not verified; the wallet is the authority on its own
/// address.
fn validate_account_address(address: &str) -> Result<(), ApiError> {
    if address.len() != 42 {
        return Err(ApiError::InvalidAddress {
            reason: format!("Expected 42 characters, got {}", address.len()),
        });
    }

    if !address.starts_with("0x") {
        return Err(ApiError::InvalidAddress {
            reason: "Address must start with 0x".to_string(),
        });
    }

    for c in address[2..].chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ApiError::InvalidAddress {
                reason: format!("Invalid hex character '{}' in address", c),
            });
        }
    }

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    rpc_client: RwLock<Option<RpcClient>>,
    wallet: RwLock<Option<WalletState>>,
    bridge: RwLock<Option<Arc<WalletBridge>>>,
    lock_list: RwLock<LockListState>,
    tx_flow: RwLock<TxFlowState>,
    notifications: NotificationCenter,
    tx_watcher: TxWatcherState,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                rpc_client: RwLock::new(None),
                wallet: RwLock::new(None),
                bridge: RwLock::new(None),
                lock_list: RwLock::new(LockListState::default()),
                tx_flow: RwLock::new(TxFlowState::default()),
                notifications: NotificationCenter::new(),
                tx_watcher: TxWatcherState::new(),
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Update node configuration and clear the cached RPC client
    pub async fn set_rpc_config(&self, rpc: RpcConfig, locker_address: Option<String>) {
        let mut config = self.inner.config.write().await;
        config.rpc = rpc;
        if let Some(locker) = locker_address {
            config.locker_address = locker;
        }

        let mut client = self.inner.rpc_client.write().await;
        *client = None;
    }

    /// Get or create the RPC client. Returns None when the node is
    /// unreachable; the next call retries.
    pub async fn rpc_client(&self) -> Option<RpcClient> {
        {
            let client = self.inner.rpc_client.read().await;
            if client.is_some() {
                return client.clone();
            }
        }

        let config = self.inner.config.read().await;
        tracing::info!("Creating RPC client for URL: {}", config.rpc.url);
        let client = RpcClient::new(config.rpc.clone());
        drop(config);

        if !client.is_online().await {
            tracing::warn!("Node not reachable at {}", client.config().url);
            return None;
        }

        let mut cached = self.inner.rpc_client.write().await;
        *cached = Some(client.clone());
        Some(client)
    }

    /// The configured locker contract address, if any
    pub async fn locker(&self) -> Option<Address> {
        self.inner.config.read().await.locker()
    }

    /// Get current wallet state
    pub async fn wallet(&self) -> Option<WalletState> {
        self.inner.wallet.read().await.clone()
    }

    /// Set connected wallet with address validation.
    pub async fn set_wallet(&self, address: String) -> Result<(), ApiError> {
        validate_account_address(&address)?;
        let mut wallet = self.inner.wallet.write().await;
        *wallet = Some(WalletState::new(Address::new(address)));
        Ok(())
    }

    /// Disconnect wallet (clear wallet state)
    pub async fn disconnect_wallet(&self) {
        let mut wallet = self.inner.wallet.write().await;
        *wallet = None;
    }

    /// Get or start the wallet bridge.
    pub async fn bridge(&self) -> Result<Arc<WalletBridge>, ApiError> {
        {
            let bridge = self.inner.bridge.read().await;
            if let Some(ref b) = *bridge {
                return Ok(b.clone());
            }
        }

        let mut bridge_lock = self.inner.bridge.write().await;

        // Double-check after acquiring write lock
        if let Some(ref b) = *bridge_lock {
            return Ok(b.clone());
        }

        let bridge = WalletBridge::start().await.map_err(|e| {
            tracing::error!("Failed to start wallet bridge: {}", e);
            e
        })?;

        tracing::info!("Wallet bridge started on port {}", bridge.port());
        let bridge = Arc::new(bridge);
        *bridge_lock = Some(bridge.clone());
        Ok(bridge)
    }

    /// The lock list controller state
    pub fn lock_list(&self) -> &RwLock<LockListState> {
        &self.inner.lock_list
    }

    /// The transaction flow controller state
    pub fn tx_flow(&self) -> &RwLock<TxFlowState> {
        &self.inner.tx_flow
    }

    /// The notification center
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    /// The background receipt watcher
    pub fn tx_watcher(&self) -> &TxWatcherState {
        &self.inner.tx_watcher
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_address() {
        assert!(validate_account_address("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F").is_ok());

        assert!(validate_account_address("0x123").is_err());
        assert!(validate_account_address("8D3815197b07A24D8Df7f50E28cD47Fe2165d65F00").is_err());
        assert!(validate_account_address("0xZZ3815197b07A24D8Df7f50E28cD47Fe2165d65F").is_err());
    }

    #[tokio::test]
    async fn test_wallet_connect_disconnect() {
        let state = AppState::new();
        assert!(state.wallet().await.is_none());

        state
            .set_wallet("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F".to_string())
            .await
            .unwrap();
        assert!(state.wallet().await.is_some());

        state.disconnect_wallet().await;
        assert!(state.wallet().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_wallet_rejected() {
        let state = AppState::new();
        assert!(state.set_wallet("bogus".to_string()).await.is_err());
        assert!(state.wallet().await.is_none());
    }
}
