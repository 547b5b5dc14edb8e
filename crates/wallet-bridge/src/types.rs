//! Wallet bridge request types

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Requests expire after 5 minutes
const REQUEST_TTL_SECS: u64 = 300;

/// Type of pending request
#[derive(Debug, Clone)]
pub enum RequestType {
    /// Wallet connection request - just captures the account address
    Connect,
    /// Transaction signing request
    SignTransaction {
        /// The unsigned contract call, serialized for the wallet
        call: serde_json::Value,
        /// Message to display alongside the signing prompt
        message: String,
    },
}

/// Status of a pending request
#[derive(Debug, Clone)]
pub enum RequestStatus {
    /// Waiting for the wallet to respond
    Pending,
    /// Address received (for connect requests)
    AddressReceived(String),
    /// Transaction signed and broadcast by the wallet
    TxSubmitted { tx_hash: String },
    /// Request expired before the wallet responded
    Expired,
    /// Wallet reported a failure (including user rejection)
    Failed(String),
}

/// Callback body posted by the frontend once the wallet resolves a request.
/// Exactly one of the fields is expected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    /// Connected account address (connect requests)
    pub address: Option<String>,
    /// Broadcast transaction hash (sign requests)
    pub tx_hash: Option<String>,
    /// Error message from the wallet (either kind)
    pub error: Option<String>,
}

/// A pending wallet request
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: String,
    pub request_type: RequestType,
    pub created_at: Instant,
    pub status: RequestStatus,
}

impl PendingRequest {
    pub fn new_connect(id: String) -> Self {
        Self {
            id,
            request_type: RequestType::Connect,
            created_at: Instant::now(),
            status: RequestStatus::Pending,
        }
    }

    pub fn new_sign(id: String, call: serde_json::Value, message: String) -> Self {
        Self {
            id,
            request_type: RequestType::SignTransaction { call, message },
            created_at: Instant::now(),
            status: RequestStatus::Pending,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() > REQUEST_TTL_SECS
    }

    /// Apply a wallet callback to this request, returning false when the
    /// payload does not fit the request type.
    pub fn apply_callback(&mut self, payload: &CallbackPayload) -> bool {
        if let Some(error) = &payload.error {
            self.status = RequestStatus::Failed(error.clone());
            return true;
        }

        match (&self.request_type, payload) {
            (
                RequestType::Connect,
                CallbackPayload {
                    address: Some(address),
                    ..
                },
            ) => {
                self.status = RequestStatus::AddressReceived(address.clone());
                true
            }
            (
                RequestType::SignTransaction { .. },
                CallbackPayload {
                    tx_hash: Some(tx_hash),
                    ..
                },
            ) => {
                self.status = RequestStatus::TxSubmitted {
                    tx_hash: tx_hash.clone(),
                };
                true
            }
            _ => false,
        }
    }
}
