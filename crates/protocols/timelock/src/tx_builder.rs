//! Locker call builders
//!
//! Three write operations reach the chain, all signed and submitted by the
//! user's wallet:
//! 1. Approve - ERC-20 allowance for the locker
//! 2. Lock    - deposit tokens for a duration
//! 3. Unlock  - claim a matured lock
//!
//! Builders validate inputs first and only then produce calldata; an
//! invalid request never results in a wallet prompt.

use lockyard_core::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use evm_node_client::abi::{encode_call, Token};

/// An unsigned contract call, ready to hand to the wallet for signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub to: Address,
    /// 0x-prefixed calldata
    pub data: String,
    /// ETH value; always zero for locker operations
    pub value: String,
}

impl CallRequest {
    fn new(to: Address, data: String) -> Self {
        Self {
            to,
            data,
            value: "0x0".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TimelockTxError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Lock name must not be empty")]
    MissingName,

    #[error("Failed to encode calldata: {0}")]
    Encode(String),
}

/// Inputs for a lock transaction, already converted to raw units/seconds.
pub struct LockRequest {
    /// Connected wallet address; becomes the lock owner
    pub owner: Address,
    /// Token to lock
    pub token: Address,
    /// Amount in the token's smallest unit
    pub amount: u128,
    /// Lock duration in seconds
    pub duration_seconds: u64,
    /// Lock name (required)
    pub name: String,
    /// Lock description (optional; empty string goes on chain)
    pub description: String,
}

/// Build the ERC-20 `approve(spender, amount)` call against `token`.
pub fn build_approve(
    token: &Address,
    spender: &Address,
    amount: u128,
) -> Result<CallRequest, TimelockTxError> {
    require_address(token)?;
    require_address(spender)?;
    if amount == 0 {
        return Err(TimelockTxError::InvalidAmount(
            "Approval amount must be positive".to_string(),
        ));
    }

    let data = encode_call(
        "approve(address,uint256)",
        &[
            Token::Address(spender.as_str().to_string()),
            Token::Uint(amount),
        ],
    )
    .map_err(|e| TimelockTxError::Encode(e.to_string()))?;

    Ok(CallRequest::new(token.clone(), data))
}

/// Build the `lock(owner, token, amount, durationSeconds, name, description)`
/// call against the locker contract.
pub fn build_lock(locker: &Address, req: &LockRequest) -> Result<CallRequest, TimelockTxError> {
    require_address(locker)?;
    require_address(&req.owner)?;
    require_address(&req.token)?;
    if req.amount == 0 {
        return Err(TimelockTxError::InvalidAmount(
            "Lock amount must be positive".to_string(),
        ));
    }
    if req.duration_seconds == 0 {
        return Err(TimelockTxError::InvalidDuration(
            "Lock duration must be positive".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(TimelockTxError::MissingName);
    }

    let data = encode_call(
        "lock(address,address,uint256,uint256,string,string)",
        &[
            Token::Address(req.owner.as_str().to_string()),
            Token::Address(req.token.as_str().to_string()),
            Token::Uint(req.amount),
            Token::Uint(req.duration_seconds as u128),
            Token::Str(req.name.clone()),
            Token::Str(req.description.clone()),
        ],
    )
    .map_err(|e| TimelockTxError::Encode(e.to_string()))?;

    Ok(CallRequest::new(locker.clone(), data))
}

/// Build the `unlock(lockId)` call against the locker contract.
pub fn build_unlock(locker: &Address, lock_id: u64) -> Result<CallRequest, TimelockTxError> {
    require_address(locker)?;

    let data = encode_call("unlock(uint256)", &[Token::Uint(lock_id as u128)])
        .map_err(|e| TimelockTxError::Encode(e.to_string()))?;

    Ok(CallRequest::new(locker.clone(), data))
}

fn require_address(address: &Address) -> Result<(), TimelockTxError> {
    if !address.is_well_formed() {
        return Err(TimelockTxError::InvalidAddress(address.to_string()));
    }
    Ok(())
}
