//! evm-node-client: JSON-RPC client for EVM nodes
//!
//! This crate provides a high-level client for the read side of the locker
//! dApp: `eth_call` plumbing with a minimal ABI codec, ERC-20 metadata reads
//! with graceful degradation, and transaction/receipt lookups for the
//! confirmation watcher.

pub mod abi;
pub mod erc20;

use lockyard_core::{RpcConfig, RpcError, TxHash};
use serde::{Deserialize, Serialize};

pub use erc20::TokenInfo;

/// Default timeout for node API calls (30 seconds).
/// Long enough for slow endpoints, short enough to avoid perpetual spinners.
const NODE_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Result type for node client operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// High-level EVM JSON-RPC client
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    config: RpcConfig,
}

/// A mined transaction receipt, reduced to what the watcher needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// true when the transaction succeeded (status 0x1)
    pub succeeded: bool,
    pub block_number: u64,
}

impl RpcClient {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Get the current node configuration
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call_rpc(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let request = self.http.post(&self.config.url).json(&body).send();

        let response = tokio::time::timeout(NODE_REQUEST_TIMEOUT, request)
            .await
            .map_err(|_| RpcError::Timeout {
                secs: NODE_REQUEST_TIMEOUT.as_secs(),
            })?
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", self.config.url, e),
            })?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RpcError::ParseError(e.to_string()))?;

        if let Some(err) = json.get("error") {
            let message = err["message"].as_str().unwrap_or("unknown RPC error");
            // Reverted eth_call responses come back as an RPC-level error
            if message.to_lowercase().contains("revert") {
                return Err(RpcError::Reverted {
                    message: message.to_string(),
                });
            }
            return Err(RpcError::ApiError {
                message: message.to_string(),
            });
        }

        Ok(json["result"].clone())
    }

    /// Check if the node is reachable
    pub async fn is_online(&self) -> bool {
        self.block_number().await.is_ok()
    }

    /// Current head block number
    pub async fn block_number(&self) -> Result<u64> {
        let result = self.call_rpc("eth_blockNumber", serde_json::json!([])).await?;
        parse_quantity_u64(&result)
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let result = self.call_rpc("eth_chainId", serde_json::json!([])).await?;
        parse_quantity_u64(&result)
    }

    /// Execute a read-only contract call. `data` is 0x-prefixed calldata;
    /// returns the 0x-prefixed hex return payload.
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<String> {
        let result = self
            .call_rpc(
                "eth_call",
                serde_json::json!([{"to": to, "data": data}, "latest"]),
            )
            .await?;

        result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RpcError::ParseError("expected hex string from eth_call".to_string()))
    }

    /// Get the receipt for a transaction, or None while still pending.
    pub async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<TxReceipt>> {
        let result = self
            .call_rpc(
                "eth_getTransactionReceipt",
                serde_json::json!([tx_hash.as_str()]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let succeeded = result["status"]
            .as_str()
            .map(|s| s == "0x1")
            .unwrap_or(false);
        let block_number = result["blockNumber"]
            .as_str()
            .map(parse_hex_u64)
            .transpose()?
            .unwrap_or(0);

        Ok(Some(TxReceipt {
            tx_hash: tx_hash.clone(),
            succeeded,
            block_number,
        }))
    }

    /// Check whether the node still knows a transaction (mined or queued).
    /// A None here after submission means the transaction was dropped.
    pub async fn transaction_by_hash(&self, tx_hash: &TxHash) -> Result<Option<serde_json::Value>> {
        let result = self
            .call_rpc(
                "eth_getTransactionByHash",
                serde_json::json!([tx_hash.as_str()]),
            )
            .await?;

        Ok((!result.is_null()).then_some(result))
    }
}

/// Parse a JSON-RPC quantity value ("0x1a") into u64
fn parse_quantity_u64(value: &serde_json::Value) -> Result<u64> {
    let s = value
        .as_str()
        .ok_or_else(|| RpcError::ParseError(format!("expected quantity, got {value}")))?;
    parse_hex_u64(s)
}

fn parse_hex_u64(s: &str) -> Result<u64> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(stripped, 16)
        .map_err(|_| RpcError::ParseError(format!("invalid hex quantity: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u64("0x1a").unwrap(), 26);
        assert_eq!(parse_hex_u64("ff").unwrap(), 255);
        assert!(parse_hex_u64("0xzz").is_err());
    }

    #[test]
    fn test_parse_quantity_value() {
        let v = serde_json::json!("0x10");
        assert_eq!(parse_quantity_u64(&v).unwrap(), 16);

        let not_a_string = serde_json::json!(16);
        assert!(parse_quantity_u64(&not_a_string).is_err());
    }

    #[test]
    fn test_client_is_cheap_to_clone() {
        let client = RpcClient::new(RpcConfig::default());
        let clone = client.clone();
        assert_eq!(clone.config().url, client.config().url);
    }
}
