//! mailroom-dashboard: live monitoring view over processed support email
//!
//! Polls the mailroom read API on a fixed interval and on every filter
//! change, keeps the latest list and per-status counts, and serves a
//! projected table view as JSON.
//!
//! - [`sync`] owns the local snapshot and the refresh cycle
//! - [`projection`] turns a snapshot into rows and badges
//! - [`dashboard`] exposes both over HTTP

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod projection;
pub mod query;
pub mod sync;

pub use config::Config;
pub use error::{DashboardError, Result};
pub use projection::{project, DashboardView, ViewBody, ViewOptions};
pub use query::{QueryParams, ValidationError};
pub use sync::{RefreshOutcome, SyncEngine, SyncState};
