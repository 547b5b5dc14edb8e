//! Token Locker Protocol Implementation
//!
//! The locker contract holds ERC-20 deposits until a chosen unlock time.
//! A lock is created with `lock`, matures by wall-clock passage, and is
//! claimed exactly once with `unlock`. This crate covers the read model
//! (paginated fetch, classification, refinement) and the calldata builders
//! for the three write operations.

pub mod calculator;
pub mod constants;
pub mod fetch;
pub mod state;
pub mod tx_builder;
pub mod view;

pub use constants::{DurationUnit, DEFAULT_TOKEN_DECIMALS, PAGE_SIZE};
pub use fetch::{fetch_lock_by_id, fetch_lock_page, fetch_locks_by_owner, fetch_total_count, LockPage};
pub use state::{Lock, LockStatus};
pub use tx_builder::{build_approve, build_lock, build_unlock, CallRequest, LockRequest};
pub use view::{refine, LockFilter, SortOrder, StatusFilter};
