//! Error types for Lockyard

use thiserror::Error;

/// Core errors that can occur in Lockyard
#[derive(Debug, Error)]
pub enum Error {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Node connection and query errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Node unreachable at {url}")]
    Unreachable { url: String },

    #[error("Node returned error: {message}")]
    ApiError { message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Call reverted: {message}")]
    Reverted { message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Protocol-specific errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Protocol state unavailable: {reason}")]
    StateUnavailable { reason: String },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Lock not found: {id}")]
    LockNotFound { id: u64 },

    #[error("Action not allowed: {reason}")]
    ActionNotAllowed { reason: String },
}

/// Transaction building and submission errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Failed to build calldata: {message}")]
    BuildFailed { message: String },

    #[error("Wallet rejected the request: {message}")]
    WalletRejected { message: String },

    #[error("Transaction failed on chain: {message}")]
    OnChainFailure { message: String },
}

/// Result type alias for Lockyard operations
pub type Result<T> = std::result::Result<T, Error>;

impl ProtocolError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StateUnavailable { .. } => "state_unavailable",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::MissingField { .. } => "missing_field",
            Self::LockNotFound { .. } => "lock_not_found",
            Self::ActionNotAllowed { .. } => "action_not_allowed",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidAddress { .. } | Self::MissingField { .. } => {
                400
            }
            Self::LockNotFound { .. } => 404,
            Self::ActionNotAllowed { .. } => 422,
            Self::StateUnavailable { .. } => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_codes() {
        let err = ProtocolError::InvalidAmount {
            message: "test".into(),
        };
        assert_eq!(err.error_code(), "invalid_amount");
        assert_eq!(err.status_code(), 400);

        let err = ProtocolError::LockNotFound { id: 7 };
        assert_eq!(err.error_code(), "lock_not_found");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_error_conversion() {
        let rpc = RpcError::ApiError {
            message: "boom".into(),
        };
        let err: Error = rpc.into();
        assert!(matches!(err, Error::Rpc(_)));
    }
}
