//! User-facing notification state
//!
//! Three banner kinds with fixed auto-dismiss delays: errors and success 5 s,
//! pending-transaction 8 s. Each entry owns its dismissal deadline; posting
//! a new notification of the same kind replaces the old entry outright, so a
//! superseded deadline can never dismiss the newer message. An error banner
//! suppresses the pending banner in the rendered view.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Error and success banners dismiss after 5 seconds
const ERROR_DISMISS: Duration = Duration::from_secs(5);
const SUCCESS_DISMISS: Duration = Duration::from_secs(5);
/// The pending-transaction banner lingers a little longer
const PENDING_DISMISS: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Pending,
}

impl NotificationKind {
    fn dismiss_after(&self) -> Duration {
        match self {
            Self::Error => ERROR_DISMISS,
            Self::Success => SUCCESS_DISMISS,
            Self::Pending => PENDING_DISMISS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    /// Transaction hash for the pending banner's explorer link
    pub tx_hash: Option<String>,
    expires_at: Instant,
}

/// Notification state shared across handlers and the watcher
pub struct NotificationCenter {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(NotificationKind::Error, message.into(), None, Instant::now());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.post(NotificationKind::Success, message.into(), None, Instant::now());
    }

    pub fn pending(&self, message: impl Into<String>, tx_hash: Option<String>) {
        self.post(NotificationKind::Pending, message.into(), tx_hash, Instant::now());
    }

    /// Drop the pending banner immediately (e.g. once the receipt resolves)
    pub fn clear_pending(&self) {
        let mut entries = self.entries.lock().expect("notification lock poisoned");
        entries.retain(|n| n.kind != NotificationKind::Pending);
    }

    /// Live notifications in display order, errors first. An active error
    /// suppresses the pending banner.
    pub fn current(&self) -> Vec<Notification> {
        self.current_at(Instant::now())
    }

    fn post(&self, kind: NotificationKind, message: String, tx_hash: Option<String>, now: Instant) {
        let mut entries = self.entries.lock().expect("notification lock poisoned");

        // Supersede: one banner per kind, newest wins
        entries.retain(|n| n.kind != kind);
        entries.push(Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message,
            tx_hash,
            expires_at: now + kind.dismiss_after(),
        });
    }

    fn current_at(&self, now: Instant) -> Vec<Notification> {
        let mut entries = self.entries.lock().expect("notification lock poisoned");
        entries.retain(|n| n.expires_at > now);

        let has_error = entries.iter().any(|n| n.kind == NotificationKind::Error);

        let mut visible: Vec<Notification> = entries
            .iter()
            .filter(|n| !(has_error && n.kind == NotificationKind::Pending))
            .cloned()
            .collect();

        visible.sort_by_key(|n| match n.kind {
            NotificationKind::Error => 0,
            NotificationKind::Success => 1,
            NotificationKind::Pending => 2,
        });
        visible
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
