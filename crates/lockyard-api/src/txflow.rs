//! Transaction flow controller
//!
//! One write operation is in flight at a time:
//! Idle → AwaitingSignature → Pending → Success | Failed → Idle.
//! A new submission supersedes whatever came before it. Wallet rejections
//! are distinguished from real failures by message pattern and surfaced as
//! a soft "cancelled" notice; everything else gets a generic retry prompt.

use std::time::{Duration, Instant};

use lockyard_core::{Address, ProtocolError, TxHash};
use serde::{Deserialize, Serialize};
use timelock::calculator::{parse_units, to_seconds};
use timelock::LockRequest;

/// Message shown when the user declined in the wallet
pub const CANCELLED_MESSAGE: &str = "Transaction cancelled";
/// Generic failure message for everything else
pub const FAILED_MESSAGE: &str = "Transaction failed. Please try again.";

/// Delay before the frontend is told to navigate to My Locks after a
/// successful lock, so the success banner is seen first.
pub const NAVIGATE_DELAY: Duration = Duration::from_millis(1_400);

/// A settled flow (Success or Failed) returns to Idle after the banner's
/// dismissal delay, unless a new action supersedes it first.
pub const SETTLE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxPhase {
    #[default]
    Idle,
    #[serde(rename = "awaiting-signature")]
    AwaitingSignature,
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Approve,
    Lock,
    Unlock,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }

    /// Success banner text per operation
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Approve => "Token approval successful! You can now lock your tokens.",
            Self::Lock => "Lock created successfully! Your tokens are now secured.",
            Self::Unlock => "Success! Tokens unlocked and returned to your wallet.",
        }
    }
}

/// Current transaction flow state
#[derive(Debug, Clone, Default)]
pub struct TxFlowState {
    pub phase: TxPhase,
    pub operation: Option<Operation>,
    /// Wallet bridge request id for the in-flight signature
    pub request_id: Option<String>,
    pub tx_hash: Option<TxHash>,
    /// User-facing outcome message (set on Failed)
    pub message: Option<String>,
    /// View to navigate to, with the instant it becomes due
    navigate: Option<(String, Instant)>,
    /// When the flow reached Success or Failed
    settled_at: Option<Instant>,
}

impl TxFlowState {
    /// Start a new flow. Supersedes any previous flow unconditionally.
    pub fn begin(&mut self, operation: Operation, request_id: String) {
        *self = TxFlowState {
            phase: TxPhase::AwaitingSignature,
            operation: Some(operation),
            request_id: Some(request_id),
            ..Default::default()
        };
    }

    /// Wallet signed and broadcast: AwaitingSignature → Pending
    pub fn wallet_submitted(&mut self, tx_hash: TxHash) {
        self.phase = TxPhase::Pending;
        self.tx_hash = Some(tx_hash);
    }

    /// Wallet or contract call rejected before broadcast. Returns the
    /// user-facing message.
    pub fn wallet_failed(&mut self, raw_message: &str) -> &'static str {
        self.phase = TxPhase::Failed;
        self.settled_at = Some(Instant::now());
        let message = failure_message(raw_message);
        self.message = Some(message.to_string());
        message
    }

    /// Receipt confirmed the transaction
    pub fn receipt_success(&mut self, now: Instant) {
        self.phase = TxPhase::Success;
        self.settled_at = Some(now);
        if self.operation == Some(Operation::Lock) {
            self.navigate = Some(("my-locks".to_string(), now + NAVIGATE_DELAY));
        }
    }

    /// Receipt reported failure, or the transaction was dropped. Treated
    /// the same as a pre-broadcast failure for display.
    pub fn receipt_failed(&mut self) -> &'static str {
        self.phase = TxPhase::Failed;
        self.settled_at = Some(Instant::now());
        self.message = Some(FAILED_MESSAGE.to_string());
        FAILED_MESSAGE
    }

    /// Advance time-based transitions: a settled flow drops back to Idle
    /// once its dismissal delay elapses.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.phase, TxPhase::Success | TxPhase::Failed) {
            if let Some(settled) = self.settled_at {
                if now >= settled + SETTLE_DELAY {
                    self.reset();
                }
            }
        }
    }

    /// Back to Idle (banner dismissed or flow superseded)
    pub fn reset(&mut self) {
        *self = TxFlowState::default();
    }

    /// The pending navigation target, once its delay has elapsed
    pub fn navigate_due(&self, now: Instant) -> Option<&str> {
        match &self.navigate {
            Some((target, due)) if now >= *due => Some(target),
            _ => None,
        }
    }
}

/// Whether an error message is a user rejection rather than a failure
pub fn is_user_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("user rejected") || lower.contains("user denied")
}

/// Map a raw wallet/contract error onto the user-facing message
pub fn failure_message(raw: &str) -> &'static str {
    if is_user_rejection(raw) {
        CANCELLED_MESSAGE
    } else {
        FAILED_MESSAGE
    }
}

/// Raw inputs for an approve submission
pub struct ApproveInput {
    pub token: String,
    pub amount: String,
}

/// Raw inputs for a lock submission, as typed by the user
pub struct LockInput {
    pub token: String,
    pub amount: String,
    pub duration_value: String,
    pub duration_unit: String,
    pub name: String,
    pub description: String,
}

/// Validate an approve request: well-formed token, positive parsed amount.
pub fn validate_approve(input: &ApproveInput, decimals: u32) -> Result<(Address, u128), ProtocolError> {
    let token = Address::new(input.token.clone());
    if !token.is_well_formed() {
        return Err(ProtocolError::InvalidAddress {
            address: input.token.clone(),
        });
    }

    let amount = parse_units(&input.amount, decimals)
        .filter(|a| *a > 0)
        .ok_or_else(|| ProtocolError::InvalidAmount {
            message: "Please enter token address and amount".to_string(),
        })?;

    Ok((token, amount))
}

/// Validate a lock request: connected wallet, well-formed token, positive
/// amount and duration, non-empty name. Description may be empty.
pub fn validate_lock(
    wallet: Option<&Address>,
    input: &LockInput,
    decimals: u32,
) -> Result<LockRequest, ProtocolError> {
    let owner = wallet
        .ok_or(ProtocolError::MissingField { field: "wallet" })?
        .clone();

    let token = Address::new(input.token.clone());
    if !token.is_well_formed() {
        return Err(ProtocolError::InvalidAddress {
            address: input.token.clone(),
        });
    }

    let amount = parse_units(&input.amount, decimals)
        .filter(|a| *a > 0)
        .ok_or_else(|| ProtocolError::InvalidAmount {
            message: "Lock amount must be positive".to_string(),
        })?;

    let duration_seconds = to_seconds(&input.duration_value, &input.duration_unit);
    if duration_seconds == 0 {
        return Err(ProtocolError::InvalidAmount {
            message: "Lock duration must be positive".to_string(),
        });
    }

    if input.name.trim().is_empty() {
        return Err(ProtocolError::MissingField { field: "name" });
    }

    Ok(LockRequest {
        owner,
        token,
        amount,
        duration_seconds,
        name: input.name.clone(),
        description: input.description.clone(),
    })
}

/// Validate an unlock request: a connected wallet is all that is required.
pub fn validate_unlock(wallet: Option<&Address>) -> Result<Address, ProtocolError> {
    wallet
        .cloned()
        .ok_or(ProtocolError::MissingField { field: "wallet" })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F";
    const WALLET: &str = "0x81861EEbC43795fe2c259c15836Bb5d709966fe6";

    fn lock_input() -> LockInput {
        LockInput {
            token: TOKEN.to_string(),
            amount: "1.5".to_string(),
            duration_value: "30".to_string(),
            duration_unit: "days".to_string(),
            name: "Team vesting".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_rejection_classification() {
        assert!(is_user_rejection("User rejected the request."));
        assert!(is_user_rejection("USER DENIED transaction signature"));
        assert!(is_user_rejection("MetaMask Tx Signature: User denied"));
        assert!(!is_user_rejection("execution reverted: lock not matured"));
        assert!(!is_user_rejection("nonce too low"));

        assert_eq!(failure_message("user rejected"), CANCELLED_MESSAGE);
        assert_eq!(failure_message("out of gas"), FAILED_MESSAGE);
    }

    #[test]
    fn test_flow_happy_path() {
        let mut flow = TxFlowState::default();
        assert_eq!(flow.phase, TxPhase::Idle);

        flow.begin(Operation::Approve, "req-1".into());
        assert_eq!(flow.phase, TxPhase::AwaitingSignature);

        flow.wallet_submitted(TxHash::new("0xabc"));
        assert_eq!(flow.phase, TxPhase::Pending);

        let now = Instant::now();
        flow.receipt_success(now);
        assert_eq!(flow.phase, TxPhase::Success);
        // Approvals do not navigate
        assert!(flow.navigate_due(now + NAVIGATE_DELAY).is_none());

        flow.reset();
        assert_eq!(flow.phase, TxPhase::Idle);
    }

    #[test]
    fn test_lock_success_navigates_after_delay() {
        let mut flow = TxFlowState::default();
        flow.begin(Operation::Lock, "req-2".into());
        flow.wallet_submitted(TxHash::new("0xabc"));

        let now = Instant::now();
        flow.receipt_success(now);

        // Not yet due immediately after the receipt
        assert!(flow.navigate_due(now).is_none());
        assert_eq!(flow.navigate_due(now + NAVIGATE_DELAY), Some("my-locks"));
    }

    #[test]
    fn test_settled_flow_returns_to_idle() {
        let mut flow = TxFlowState::default();
        flow.begin(Operation::Unlock, "req-1".into());
        flow.wallet_submitted(TxHash::new("0xabc"));

        let now = Instant::now();
        flow.receipt_success(now);

        flow.tick(now + Duration::from_secs(1));
        assert_eq!(flow.phase, TxPhase::Success);

        flow.tick(now + SETTLE_DELAY);
        assert_eq!(flow.phase, TxPhase::Idle);
        assert!(flow.operation.is_none());
    }

    #[test]
    fn test_new_flow_supersedes_old() {
        let mut flow = TxFlowState::default();
        flow.begin(Operation::Lock, "req-1".into());
        flow.wallet_failed("user rejected");
        assert_eq!(flow.phase, TxPhase::Failed);

        flow.begin(Operation::Lock, "req-2".into());
        assert_eq!(flow.phase, TxPhase::AwaitingSignature);
        assert!(flow.message.is_none());
        assert_eq!(flow.request_id.as_deref(), Some("req-2"));
    }

    #[test]
    fn test_validate_approve() {
        let (token, amount) = validate_approve(
            &ApproveInput {
                token: TOKEN.to_string(),
                amount: "2".to_string(),
            },
            18,
        )
        .unwrap();
        assert_eq!(token.as_str(), TOKEN);
        assert_eq!(amount, 2_000_000_000_000_000_000);

        assert!(validate_approve(
            &ApproveInput {
                token: "".to_string(),
                amount: "2".to_string(),
            },
            18,
        )
        .is_err());

        assert!(validate_approve(
            &ApproveInput {
                token: TOKEN.to_string(),
                amount: "0".to_string(),
            },
            18,
        )
        .is_err());
    }

    #[test]
    fn test_validate_lock() {
        let wallet = Address::new(WALLET);
        let req = validate_lock(Some(&wallet), &lock_input(), 18).unwrap();
        assert_eq!(req.owner.as_str(), WALLET);
        assert_eq!(req.amount, 1_500_000_000_000_000_000);
        assert_eq!(req.duration_seconds, 30 * 86_400);

        // No wallet connected
        assert!(matches!(
            validate_lock(None, &lock_input(), 18),
            Err(ProtocolError::MissingField { field: "wallet" })
        ));

        // Missing name
        let mut input = lock_input();
        input.name = " ".to_string();
        assert!(matches!(
            validate_lock(Some(&wallet), &input, 18),
            Err(ProtocolError::MissingField { field: "name" })
        ));

        // Zero duration
        let mut input = lock_input();
        input.duration_value = "0".to_string();
        assert!(validate_lock(Some(&wallet), &input, 18).is_err());

        // Unparseable amount
        let mut input = lock_input();
        input.amount = "abc".to_string();
        assert!(validate_lock(Some(&wallet), &input, 18).is_err());
    }

    #[test]
    fn test_validate_unlock() {
        let wallet = Address::new(WALLET);
        assert!(validate_unlock(Some(&wallet)).is_ok());
        assert!(validate_unlock(None).is_err());
    }
}
