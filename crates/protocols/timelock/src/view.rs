//! Client-side refinement over the displayed lock set
//!
//! Free-text filter, status filter, and unlock-date sort compose over
//! whatever is currently displayed. All of this is pure: the fetched list
//! is never mutated and nothing here re-fetches.

use serde::{Deserialize, Serialize};

use crate::state::{Lock, LockStatus};

/// Status tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    /// Matured but unclaimed
    Ready,
    Claimed,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "ready" => Self::Ready,
            "claimed" => Self::Claimed,
            _ => Self::All,
        }
    }

    fn admits(&self, status: LockStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == LockStatus::Active,
            Self::Ready => status == LockStatus::Unlockable,
            Self::Claimed => status == LockStatus::Claimed,
        }
    }
}

/// Sort direction over `unlock_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "unlock-asc")]
    UnlockAsc,
    #[serde(rename = "unlock-desc")]
    UnlockDesc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Self {
        match s {
            "unlock-desc" => Self::UnlockDesc,
            _ => Self::UnlockAsc,
        }
    }
}

/// The composed refinement applied to a displayed set
#[derive(Debug, Clone, Default)]
pub struct LockFilter {
    /// Case-insensitive substring over name, description, owner, token, id
    pub text: String,
    pub status: StatusFilter,
    pub sort: SortOrder,
}

/// Per-status counts for the tab headers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabCounts {
    pub all: usize,
    pub active: usize,
    pub ready: usize,
    pub claimed: usize,
}

/// Count locks per status at the given instant.
pub fn tab_counts(locks: &[Lock], now: u64) -> TabCounts {
    let mut counts = TabCounts {
        all: locks.len(),
        active: 0,
        ready: 0,
        claimed: 0,
    };
    for lock in locks {
        match lock.status(now) {
            LockStatus::Active => counts.active += 1,
            LockStatus::Unlockable => counts.ready += 1,
            LockStatus::Claimed => counts.claimed += 1,
        }
    }
    counts
}

/// Apply status filter, text filter, then sort. Returns a fresh Vec; the
/// input slice is untouched.
pub fn refine(locks: &[Lock], filter: &LockFilter, now: u64) -> Vec<Lock> {
    let mut visible: Vec<Lock> = locks
        .iter()
        .filter(|lock| filter.status.admits(lock.status(now)))
        .filter(|lock| matches_text(lock, &filter.text))
        .cloned()
        .collect();

    match filter.sort {
        SortOrder::UnlockAsc => visible.sort_by_key(|l| l.unlock_date),
        SortOrder::UnlockDesc => visible.sort_by_key(|l| std::cmp::Reverse(l.unlock_date)),
    }

    visible
}

/// Case-insensitive substring match against name, description, owner
/// address, token address, or id. An empty query matches everything.
fn matches_text(lock: &Lock, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }

    lock.name.to_lowercase().contains(&q)
        || lock.description.to_lowercase().contains(&q)
        || lock.owner.as_str().to_lowercase().contains(&q)
        || lock.token.as_str().to_lowercase().contains(&q)
        || lock.id.to_string().contains(&q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockyard_core::Address;

    fn lock(id: u64, name: &str, unlock_date: u64, unlocked_amount: u128) -> Lock {
        Lock {
            id,
            token: Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F"),
            owner: Address::new("0x81861EEbC43795fe2c259c15836Bb5d709966fe6"),
            amount: 100,
            lock_date: 1_000,
            unlock_date,
            unlocked_amount,
            name: name.to_string(),
            description: String::new(),
        }
    }

    const NOW: u64 = 10_000;

    fn sample() -> Vec<Lock> {
        vec![
            lock(0, "alpha", NOW + 500, 0),  // active
            lock(1, "beta", NOW - 500, 0),   // ready
            lock(2, "gamma", NOW - 900, 50), // claimed
            lock(3, "delta", NOW + 900, 0),  // active
            lock(4, "epsilon", NOW - 100, 9), // claimed
        ]
    }

    #[test]
    fn test_status_filter_excludes_non_matching() {
        let locks = sample();
        let filter = LockFilter {
            status: StatusFilter::Claimed,
            sort: SortOrder::UnlockDesc,
            ..Default::default()
        };
        let visible = refine(&locks, &filter, NOW);

        assert_eq!(visible.len(), 2);
        assert!(visible
            .iter()
            .all(|l| l.status(NOW) == crate::state::LockStatus::Claimed));
    }

    #[test]
    fn test_sort_desc_monotonic() {
        let locks = sample();
        let filter = LockFilter {
            sort: SortOrder::UnlockDesc,
            ..Default::default()
        };
        let visible = refine(&locks, &filter, NOW);

        for pair in visible.windows(2) {
            assert!(pair[0].unlock_date >= pair[1].unlock_date);
        }
    }

    #[test]
    fn test_sort_asc() {
        let locks = sample();
        let visible = refine(&locks, &LockFilter::default(), NOW);
        for pair in visible.windows(2) {
            assert!(pair[0].unlock_date <= pair[1].unlock_date);
        }
    }

    #[test]
    fn test_text_filter_fields() {
        let locks = sample();

        let by_name = refine(
            &locks,
            &LockFilter {
                text: "ALPHA".into(),
                ..Default::default()
            },
            NOW,
        );
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 0);

        // Token address substring matches every sample lock
        let by_token = refine(
            &locks,
            &LockFilter {
                text: "0x8d3815".into(),
                ..Default::default()
            },
            NOW,
        );
        assert_eq!(by_token.len(), locks.len());

        let by_owner = refine(
            &locks,
            &LockFilter {
                text: "81861eebc".into(),
                ..Default::default()
            },
            NOW,
        );
        assert_eq!(by_owner.len(), locks.len());

        let by_id = refine(
            &locks,
            &LockFilter {
                text: "3".into(),
                ..Default::default()
            },
            NOW,
        );
        assert!(by_id.iter().any(|l| l.id == 3));
    }

    #[test]
    fn test_filters_compose() {
        let locks = sample();
        let filter = LockFilter {
            text: "ta".into(), // beta, delta
            status: StatusFilter::Active,
            sort: SortOrder::UnlockAsc,
        };
        let visible = refine(&locks, &filter, NOW);

        // "beta" matches the text but is ready, not active
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "delta");
    }

    #[test]
    fn test_refine_does_not_mutate_input() {
        let locks = sample();
        let before: Vec<u64> = locks.iter().map(|l| l.id).collect();
        let _ = refine(
            &locks,
            &LockFilter {
                sort: SortOrder::UnlockDesc,
                ..Default::default()
            },
            NOW,
        );
        let after: Vec<u64> = locks.iter().map(|l| l.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_tab_counts() {
        let counts = tab_counts(&sample(), NOW);
        assert_eq!(counts.all, 5);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.ready, 1);
        assert_eq!(counts.claimed, 2);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(StatusFilter::parse("claimed"), StatusFilter::Claimed);
        assert_eq!(StatusFilter::parse("bogus"), StatusFilter::All);
        assert_eq!(SortOrder::parse("unlock-desc"), SortOrder::UnlockDesc);
        assert_eq!(SortOrder::parse(""), SortOrder::UnlockAsc);
    }
}
