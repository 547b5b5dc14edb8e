//! Lockyard-api: HTTP API layer for Lockyard
//!
//! Provides the RESTful surface the frontend drives: the three views
//! (Create Lock, Browse Locks, My Locks), wallet connection, transaction
//! submission and tracking, and notifications.

pub mod dto;
pub mod locks;
pub mod notify;
pub mod routes;
pub mod server;
pub mod state;
pub mod txflow;
pub mod watcher;

pub use server::*;
pub use state::{ApiError, AppState, WalletState};
