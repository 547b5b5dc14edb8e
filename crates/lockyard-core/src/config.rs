//! Configuration types for Lockyard

use serde::{Deserialize, Serialize};

use crate::Address;

/// EVM node connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL (e.g., "http://127.0.0.1:8545")
    pub url: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
        }
    }
}

/// Chain-level settings: id and block explorer base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,

    /// Block explorer base URL, without trailing slash
    pub explorer_url: String,
}

impl ChainConfig {
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            explorer_url: "https://etherscan.io".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Node connection settings
    pub rpc: RpcConfig,

    /// Chain settings
    pub chain: ChainConfig,

    /// Locker contract address (empty until configured)
    #[serde(default)]
    pub locker_address: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    18545
}

impl AppConfig {
    /// The locker contract address, if a well-formed one is configured.
    pub fn locker(&self) -> Option<Address> {
        let addr = Address::new(self.locker_address.clone());
        addr.is_well_formed().then_some(addr)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            chain: ChainConfig::default(),
            locker_address: String::new(),
            api_port: default_api_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8545");
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.api_port, 18545);
        assert!(config.locker().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rpc.url, config.rpc.url);
    }

    #[test]
    fn test_explorer_urls() {
        let chain = ChainConfig::default();
        assert_eq!(
            chain.tx_url("0xabc"),
            "https://etherscan.io/tx/0xabc"
        );
        assert_eq!(
            chain.address_url("0xdef"),
            "https://etherscan.io/address/0xdef"
        );
    }

    #[test]
    fn test_locker_requires_well_formed_address() {
        let mut config = AppConfig::default();
        config.locker_address = "not-an-address".to_string();
        assert!(config.locker().is_none());

        config.locker_address = "0x81861EEbC43795fe2c259c15836Bb5d709966fe6".to_string();
        assert!(config.locker().is_some());
    }
}
