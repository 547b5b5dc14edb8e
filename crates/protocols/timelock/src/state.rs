//! Locker protocol state types

use lockyard_core::{Address, LockId, RawAmount, UnixSeconds};
use serde::{Deserialize, Serialize};

/// A single lock record read from the locker contract.
///
/// Immutable once mined, except `unlocked_amount`, which the contract sets
/// to a positive value exactly once when the owner claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub id: LockId,
    /// Address of the locked token contract
    pub token: Address,
    /// Address that created the lock and may unlock it
    pub owner: Address,
    /// Quantity locked, in the token's smallest unit
    pub amount: RawAmount,
    /// Unix seconds when the lock was created
    pub lock_date: UnixSeconds,
    /// Unix seconds at/after which the lock becomes claimable
    pub unlock_date: UnixSeconds,
    /// 0 while unclaimed; positive once claimed
    pub unlocked_amount: RawAmount,
    /// Free-text label (may be empty)
    pub name: String,
    /// Optional free-text description
    pub description: String,
}

/// Derived lock status. Never stored; computed fresh on every read since it
/// depends on the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    /// Unclaimed, timer still running
    Active,
    /// Unclaimed, timer elapsed - ready for the owner to claim
    Unlockable,
    /// Tokens withdrawn; terminal
    Claimed,
}

impl LockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unlockable => "unlockable",
            Self::Claimed => "claimed",
        }
    }
}

impl Lock {
    /// Classify this lock at the given instant. Exactly one of the three
    /// statuses holds for every reachable lock state.
    pub fn status(&self, now: UnixSeconds) -> LockStatus {
        if self.unlocked_amount > 0 {
            LockStatus::Claimed
        } else if now < self.unlock_date {
            LockStatus::Active
        } else {
            LockStatus::Unlockable
        }
    }

    /// Display label, falling back to `Lock #<id>` when the name is empty
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Lock #{}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Whether this lock belongs to the given wallet (case-insensitive)
    pub fn is_owned_by(&self, address: &Address) -> bool {
        self.owner.matches(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_lock(unlock_date: u64, unlocked_amount: u128) -> Lock {
        Lock {
            id: 1,
            token: Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F"),
            owner: Address::new("0x81861EEbC43795fe2c259c15836Bb5d709966fe6"),
            amount: 1_000,
            lock_date: 1_700_000_000,
            unlock_date,
            unlocked_amount,
            name: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_status_boundaries() {
        let now = 1_700_100_000;
        assert_eq!(sample_lock(now + 100, 0).status(now), LockStatus::Active);
        assert_eq!(sample_lock(now - 1, 0).status(now), LockStatus::Unlockable);
        // now == unlock_date counts as unlockable
        assert_eq!(sample_lock(now, 0).status(now), LockStatus::Unlockable);
        assert_eq!(sample_lock(now + 100, 5).status(now), LockStatus::Claimed);
    }

    #[test]
    fn test_status_exhaustive_and_exclusive() {
        let now = 1_700_100_000u64;
        for unlock_date in [now - 10, now, now + 10] {
            for unlocked in [0u128, 7] {
                let lock = sample_lock(unlock_date, unlocked);
                let status = lock.status(now);
                let matches = [
                    status == LockStatus::Active,
                    status == LockStatus::Unlockable,
                    status == LockStatus::Claimed,
                ];
                assert_eq!(matches.iter().filter(|m| **m).count(), 1);
            }
        }
    }

    #[test]
    fn test_claimed_wins_over_timer() {
        // A claimed lock never goes back to active or unlockable
        let now = 1_700_100_000;
        let lock = sample_lock(now + 1_000_000, 42);
        assert_eq!(lock.status(now), LockStatus::Claimed);
    }

    #[test]
    fn test_display_name_fallback() {
        let mut lock = sample_lock(0, 0);
        assert_eq!(lock.display_name(), "Lock #1");
        lock.name = "Team vesting".to_string();
        assert_eq!(lock.display_name(), "Team vesting");
    }

    #[test]
    fn test_is_owned_by_ignores_case() {
        let lock = sample_lock(0, 0);
        let lower = Address::new("0x81861eebc43795fe2c259c15836bb5d709966fe6");
        assert!(lock.is_owned_by(&lower));
    }
}
