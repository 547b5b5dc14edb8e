//! Core type definitions for Lockyard

use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM account or contract address (0x + 40 hex chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check basic address well-formedness: 0x prefix, 40 hex characters.
    pub fn is_well_formed(&self) -> bool {
        let s = &self.0;
        s.len() == 42
            && s.starts_with("0x")
            && s[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Case-insensitive equality (addresses may carry mixed-case checksums)
    pub fn matches(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Shortened display form: `0x1234…abcd`
    pub fn short(&self) -> String {
        match (self.0.get(..6), self.0.get(self.0.len().saturating_sub(4)..)) {
            (Some(head), Some(tail)) if self.0.len() >= 10 => format!("{}…{}", head, tail),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction hash (0x + 64 hex chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        let s = &self.0;
        s.len() == 66
            && s.starts_with("0x")
            && s[2..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lock id assigned sequentially by the locker contract
pub type LockId = u64;

/// Unix timestamp in seconds
pub type UnixSeconds = u64;

/// Raw token amount in the token's smallest unit
pub type RawAmount = u128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_well_formed() {
        let good = Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F");
        assert!(good.is_well_formed());

        assert!(!Address::new("0x123").is_well_formed());
        assert!(!Address::new("8D3815197b07A24D8Df7f50E28cD47Fe2165d65F00").is_well_formed());
        assert!(!Address::new("0xZZ3815197b07A24D8Df7f50E28cD47Fe2165d65F").is_well_formed());
    }

    #[test]
    fn test_address_matches_ignores_case() {
        let a = Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F");
        let b = Address::new("0x8d3815197b07a24d8df7f50e28cd47fe2165d65f");
        assert!(a.matches(&b));
    }

    #[test]
    fn test_address_short() {
        let a = Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F");
        assert_eq!(a.short(), "0x8D38…d65F");
    }

    #[test]
    fn test_tx_hash_well_formed() {
        let good = TxHash::new(format!("0x{}", "ab".repeat(32)));
        assert!(good.is_well_formed());
        assert!(!TxHash::new("0xabcd").is_well_formed());
    }
}
