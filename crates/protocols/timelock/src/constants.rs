//! Locker protocol constants and duration units

/// Decimals assumed for a token whose `decimals()` read fails
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Locks fetched per page when browsing, newest first
pub const PAGE_SIZE: usize = 10;

/// Duration unit for user-entered lock periods.
///
/// `Months` is a fixed 30-day approximation, not calendar-accurate. This is
/// deliberate: the converted second count is what goes on chain, so the
/// approximation is part of the protocol's observable behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    pub const ALL: &'static [DurationUnit] = &[
        Self::Seconds,
        Self::Minutes,
        Self::Hours,
        Self::Days,
        Self::Weeks,
        Self::Months,
    ];

    /// Parse a unit name. Unknown names fall back to days.
    pub fn parse(s: &str) -> Self {
        match s {
            "seconds" => Self::Seconds,
            "minutes" => Self::Minutes,
            "hours" => Self::Hours,
            "days" => Self::Days,
            "weeks" => Self::Weeks,
            "months" => Self::Months,
            _ => Self::Days,
        }
    }

    /// Multiplier to convert this unit to seconds
    pub fn factor(&self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
            Self::Weeks => 604_800,
            Self::Months => 2_592_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_factors() {
        assert_eq!(DurationUnit::Seconds.factor(), 1);
        assert_eq!(DurationUnit::Days.factor(), 86_400);
        assert_eq!(DurationUnit::Weeks.factor(), 604_800);
        // 30-day month, by design
        assert_eq!(DurationUnit::Months.factor(), 30 * 86_400);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_days() {
        assert_eq!(DurationUnit::parse("fortnights"), DurationUnit::Days);
        assert_eq!(DurationUnit::parse(""), DurationUnit::Days);
        assert_eq!(DurationUnit::parse("hours"), DurationUnit::Hours);
    }

    #[test]
    fn test_labels_roundtrip() {
        for unit in DurationUnit::ALL {
            assert_eq!(DurationUnit::parse(unit.label()), *unit);
        }
    }
}
