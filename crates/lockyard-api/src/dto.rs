//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};

use timelock::calculator::{format_utc, progress_pct, time_remaining};
use timelock::view::TabCounts;
use timelock::{Lock, LockStatus};

use crate::locks::ListPhase;
use crate::txflow::TxPhase;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Node status response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusResponse {
    pub connected: bool,
    pub url: String,
    pub chain_id: Option<u64>,
    pub chain_height: Option<u64>,
    pub locker_address: Option<String>,
    pub explorer_url: String,
}

/// Node configuration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfigRequest {
    pub url: String,
    #[serde(default)]
    pub locker_address: Option<String>,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Wallet status string constants
pub mod wallet_status {
    pub const PENDING: &str = "pending";
    pub const CONNECTED: &str = "connected";
    pub const EXPIRED: &str = "expired";
    pub const FAILED: &str = "failed";
}

/// Start-connect response: the frontend hands `request_url` to the wallet
/// and polls the connection status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectResponse {
    pub request_id: String,
    pub request_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusResponse {
    pub status: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatusResponse {
    pub connected: bool,
    pub address: Option<String>,
}

/// A lock with its derived display fields. Amounts travel as strings; they
/// can exceed what a JSON number holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDto {
    pub id: u64,
    pub token: String,
    pub owner: String,
    pub amount: String,
    pub lock_date: u64,
    pub unlock_date: u64,
    pub unlocked_amount: String,
    pub name: String,
    pub description: String,

    pub display_name: String,
    /// Shortened addresses for list rows (`0x1234…abcd`)
    pub owner_short: String,
    pub token_short: String,
    pub status: LockStatus,
    pub progress_pct: f64,
    pub lock_date_utc: String,
    pub unlock_date_utc: String,
    pub time_remaining: String,
}

impl LockDto {
    pub fn from_lock(lock: &Lock, now: u64) -> Self {
        Self {
            id: lock.id,
            token: lock.token.to_string(),
            owner: lock.owner.to_string(),
            amount: lock.amount.to_string(),
            lock_date: lock.lock_date,
            unlock_date: lock.unlock_date,
            unlocked_amount: lock.unlocked_amount.to_string(),
            name: lock.name.clone(),
            description: lock.description.clone(),
            display_name: lock.display_name(),
            owner_short: lock.owner.short(),
            token_short: lock.token.short(),
            status: lock.status(now),
            progress_pct: progress_pct(lock, now),
            lock_date_utc: format_utc(lock.lock_date as i64),
            unlock_date_utc: format_utc(lock.unlock_date as i64),
            time_remaining: time_remaining(lock.unlock_date, now),
        }
    }
}

/// Browse Locks view payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocksResponse {
    pub phase: ListPhase,
    pub locks: Vec<LockDto>,
    pub next_index: Option<u64>,
    pub total: u64,
    pub counts: TabCounts,
}

/// My Locks view payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyLocksResponse {
    pub locks: Vec<LockDto>,
    pub counts: TabCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_locks: u64,
    pub showing: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfoResponse {
    pub address: String,
    pub symbol: Option<String>,
    /// On-chain decimals, or the 18 fallback when the read failed
    pub decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub raw: String,
    pub formatted: String,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceResponse {
    pub raw: String,
    pub formatted: String,
}

/// Lock form preview request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPreviewRequest {
    pub token: String,
    pub amount: String,
    pub duration_value: String,
    pub duration_unit: String,
}

/// Lock form preview: what would go on chain, plus whether an approve step
/// is required first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPreviewResponse {
    pub amount_raw: String,
    pub duration_seconds: u64,
    pub duration_display: String,
    pub estimated_unlock_utc: String,
    pub approval_needed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveSubmitRequest {
    pub token: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockSubmitRequest {
    pub token: String,
    pub amount: String,
    pub duration_value: String,
    pub duration_unit: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockSubmitRequest {
    pub lock_id: u64,
}

/// Returned by approve/lock/unlock submission: the sign request parked at
/// the wallet bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSubmitResponse {
    pub request_id: String,
    pub request_url: String,
}

/// Transaction flow status, polled by the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatusResponse {
    pub phase: TxPhase,
    pub operation: Option<String>,
    pub tx_hash: Option<String>,
    pub message: Option<String>,
    /// Set once the post-success navigation delay has elapsed
    pub navigate_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub tx_hash: Option<String>,
}

/// Duration unit option for the lock form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationUnitDto {
    pub label: String,
    pub seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockyard_core::Address;

    #[test]
    fn test_lock_dto_derived_fields() {
        let now = 1_700_000_000u64;
        let lock = Lock {
            id: 9,
            token: Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F"),
            owner: Address::new("0x81861EEbC43795fe2c259c15836Bb5d709966fe6"),
            amount: 5_000,
            lock_date: now - 100,
            unlock_date: now + 100,
            unlocked_amount: 0,
            name: String::new(),
            description: String::new(),
        };

        let dto = LockDto::from_lock(&lock, now);
        assert_eq!(dto.display_name, "Lock #9");
        assert_eq!(dto.owner_short, "0x8186…6fe6");
        assert_eq!(dto.status, LockStatus::Active);
        assert_eq!(dto.amount, "5000");
        assert!((dto.progress_pct - 50.0).abs() < 1e-9);
        assert!(dto.unlock_date_utc.ends_with(" (UTC)"));
        assert!(dto.time_remaining.ends_with("remaining"));
    }

    #[test]
    fn test_camel_case_wire_format() {
        let response = SummaryResponse {
            total_locks: 3,
            showing: 1,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("totalLocks"));
        assert!(json.contains("showing"));
    }
}
