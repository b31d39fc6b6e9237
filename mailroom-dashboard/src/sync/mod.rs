//! Sync engine - keeps a local mirror of the backend's email dataset
//!
//! Handles:
//! - Paired list + stats fetches issued concurrently
//! - Generation tokens so an older response never overwrites a newer one
//! - A recurring poll timer plus out-of-band refreshes on query changes

pub mod engine;
pub mod poller;
pub mod state;

// Re-exports
pub use engine::{SyncEngine, WeakSyncEngine};
pub use poller::PollHandle;
pub use state::{RefreshOutcome, SliceHealth, SyncState};
