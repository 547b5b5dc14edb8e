//! Wallet Bridge
//!
//! The wallet-signing collaborator surface. The backend never holds keys:
//! it parks a connect or sign request here, the frontend hands the payload
//! to the user's wallet, and the wallet's outcome (address, transaction
//! hash, or rejection) comes back through a callback. The rest of the app
//! only ever polls `RequestStatus`.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::WalletBridge;
pub use types::{CallbackPayload, PendingRequest, RequestStatus, RequestType};
