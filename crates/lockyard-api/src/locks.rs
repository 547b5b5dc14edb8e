//! Lock list controller
//!
//! Holds the Browse Locks view's accumulated state: the displayed records,
//! the pagination cursor, and the load phase. Every load carries a
//! generation stamp; a load that was superseded before its reads finished
//! fails the stamp check on arrival and is discarded without touching the
//! displayed set.

use lockyard_core::ProtocolError;
use serde::{Deserialize, Serialize};
use timelock::{fetch_lock_by_id, fetch_lock_page, fetch_total_count, Lock, LockPage};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListPhase {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Loaded,
}

/// Accumulated Browse Locks state
#[derive(Debug, Default)]
pub struct LockListState {
    pub phase: ListPhase,
    pub displayed: Vec<Lock>,
    pub next_index: Option<u64>,
    pub total: u64,
    generation: u64,
}

impl LockListState {
    /// Begin a fresh load, clearing accumulated results. Returns the
    /// generation stamp the load must present when applying its results.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.phase = ListPhase::Loading;
        self.displayed.clear();
        self.next_index = None;
        self.generation
    }

    /// Begin a "load more" continuation. Keeps accumulated results.
    pub fn begin_load_more(&mut self) -> u64 {
        self.generation += 1;
        self.phase = ListPhase::LoadingMore;
        self.generation
    }

    /// Apply a fresh page. Returns false (and changes nothing) when the
    /// load was superseded.
    pub fn apply_loaded(&mut self, generation: u64, total: u64, page: LockPage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.total = total;
        self.displayed = page.locks;
        self.next_index = page.next_index;
        self.phase = ListPhase::Loaded;
        true
    }

    /// Append a continuation page. Older records always land after the
    /// newer ones already displayed.
    pub fn apply_more(&mut self, generation: u64, page: LockPage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.displayed.extend(page.locks);
        self.next_index = page.next_index;
        self.phase = ListPhase::Loaded;
        true
    }

    /// Replace the displayed set with a single looked-up record.
    pub fn apply_single(&mut self, generation: u64, lock: Lock) -> bool {
        if generation != self.generation {
            return false;
        }
        self.displayed = vec![lock];
        self.next_index = None;
        self.phase = ListPhase::Loaded;
        true
    }

    /// Mark a load that found nothing to fetch as complete.
    pub fn apply_empty(&mut self, generation: u64, total: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.total = total;
        self.displayed.clear();
        self.next_index = None;
        self.phase = ListPhase::Loaded;
        true
    }
}

/// Reset and load the newest page. Used on activation, "show all", and the
/// post-transaction refresh.
pub async fn load_recent(state: &AppState) -> Result<(), ProtocolError> {
    let client = state.rpc_client().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Node not connected".to_string(),
    })?;
    let locker = state.locker().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Locker contract not configured".to_string(),
    })?;

    let generation = state.lock_list().write().await.begin_load();

    let total = match fetch_total_count(&client, &locker).await {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, "Total lock count unavailable");
            state.lock_list().write().await.apply_empty(generation, 0);
            return Ok(());
        }
    };

    if total == 0 {
        state.lock_list().write().await.apply_empty(generation, 0);
        return Ok(());
    }

    let page = fetch_lock_page(&client, &locker, total - 1).await;
    state
        .lock_list()
        .write()
        .await
        .apply_loaded(generation, total, page);
    Ok(())
}

/// Fetch the next page from the stored cursor and append it.
pub async fn load_more(state: &AppState) -> Result<(), ProtocolError> {
    let client = state.rpc_client().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Node not connected".to_string(),
    })?;
    let locker = state.locker().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Locker contract not configured".to_string(),
    })?;

    let (generation, start_index) = {
        let mut list = state.lock_list().write().await;
        let next = list.next_index;
        match next {
            Some(index) => (list.begin_load_more(), index),
            // Oldest record already fetched
            None => return Ok(()),
        }
    };

    let page = fetch_lock_page(&client, &locker, start_index).await;
    state.lock_list().write().await.apply_more(generation, page);
    Ok(())
}

/// Look up a single lock by id and make it the displayed set.
pub async fn load_by_id(state: &AppState, id: u64) -> Result<(), ProtocolError> {
    let client = state.rpc_client().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Node not connected".to_string(),
    })?;
    let locker = state.locker().await.ok_or(ProtocolError::StateUnavailable {
        reason: "Locker contract not configured".to_string(),
    })?;

    let generation = state.lock_list().write().await.begin_load();
    let lock = fetch_lock_by_id(&client, &locker, id).await?;
    state.lock_list().write().await.apply_single(generation, lock);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockyard_core::Address;

    fn lock(id: u64) -> Lock {
        Lock {
            id,
            token: Address::new("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F"),
            owner: Address::new("0x81861EEbC43795fe2c259c15836Bb5d709966fe6"),
            amount: 1,
            lock_date: 0,
            unlock_date: 0,
            unlocked_amount: 0,
            name: String::new(),
            description: String::new(),
        }
    }

    fn page(ids: &[u64], next_index: Option<u64>) -> LockPage {
        LockPage {
            locks: ids.iter().map(|&id| lock(id)).collect(),
            next_index,
        }
    }

    #[test]
    fn test_load_then_load_more_appends() {
        let mut list = LockListState::default();

        let gen1 = list.begin_load();
        assert_eq!(list.phase, ListPhase::Loading);
        assert!(list.apply_loaded(gen1, 25, page(&[24, 23, 22], Some(14))));
        assert_eq!(list.phase, ListPhase::Loaded);
        assert_eq!(list.next_index, Some(14));

        let gen2 = list.begin_load_more();
        assert_eq!(list.phase, ListPhase::LoadingMore);
        assert!(list.apply_more(gen2, page(&[14, 13], Some(4))));

        // Older records follow newer ones
        let ids: Vec<u64> = list.displayed.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![24, 23, 22, 14, 13]);
        assert_eq!(list.next_index, Some(4));
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut list = LockListState::default();

        let stale = list.begin_load();
        // A newer load supersedes before the first one's reads return
        let fresh = list.begin_load();

        assert!(!list.apply_loaded(stale, 10, page(&[9, 8], Some(7))));
        assert!(list.displayed.is_empty());
        assert_eq!(list.phase, ListPhase::Loading);

        assert!(list.apply_loaded(fresh, 10, page(&[9], Some(8))));
        assert_eq!(list.displayed.len(), 1);
    }

    #[test]
    fn test_reset_clears_accumulated() {
        let mut list = LockListState::default();
        let gen = list.begin_load();
        list.apply_loaded(gen, 5, page(&[4, 3], Some(2)));

        list.begin_load();
        assert!(list.displayed.is_empty());
        assert_eq!(list.next_index, None);
    }

    #[test]
    fn test_single_lookup_replaces_displayed() {
        let mut list = LockListState::default();
        let gen = list.begin_load();
        list.apply_loaded(gen, 5, page(&[4, 3, 2], Some(1)));

        let gen = list.begin_load();
        assert!(list.apply_single(gen, lock(7)));
        assert_eq!(list.displayed.len(), 1);
        assert_eq!(list.displayed[0].id, 7);
        assert_eq!(list.next_index, None);
    }

    #[test]
    fn test_empty_count_is_loaded_empty() {
        let mut list = LockListState::default();
        let gen = list.begin_load();
        assert!(list.apply_empty(gen, 0));
        assert_eq!(list.phase, ListPhase::Loaded);
        assert!(list.displayed.is_empty());
    }
}
