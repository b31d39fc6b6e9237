//! Rust client for the mailroom email read API
//!
//! Typed access to the read-only endpoints the dashboard polls:
//! record listing, per-status statistics, single-record lookup and the
//! CSV export link.
//!
//! # Example
//!
//! ```rust,no_run
//! use mailroom_client::{ClientConfig, MailroomClient, StatusFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MailroomClient::new(ClientConfig::default())?;
//!
//! let stats = client.fetch_aggregate().await?;
//! println!("{} emails total", stats.total);
//!
//! let link = client.export_reference(StatusFilter::All, "refund");
//! println!("export: {}", link);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

// Re-export main types
pub use client::{build_export_reference, MailroomClient};
pub use error::{ClientError, Result};
pub use gateway::RecordGateway;
pub use types::*;
