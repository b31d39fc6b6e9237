//! Gateway trait - the read boundary the sync engine depends on.
//!
//! `MailroomClient` is the production implementation; tests substitute
//! in-memory gateways with controllable latency and failures.

use async_trait::async_trait;

use crate::client::MailroomClient;
use crate::error::Result;
use crate::types::{AggregateSnapshot, ListSnapshot, Record, RecordListOptions, StatusFilter};

/// Read-only access to the remote email dataset.
///
/// Implementations hold no local state and perform no retries.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// List one page of records matching `options`.
    async fn list_records(&self, options: &RecordListOptions) -> Result<ListSnapshot>;

    /// Fetch the per-status counts.
    async fn fetch_aggregate(&self) -> Result<AggregateSnapshot>;

    /// Fetch a single record by ID.
    async fn get_record(&self, id: &str) -> Result<Record>;

    /// Build the CSV export link for a filter. Pure, never fails.
    fn export_reference(&self, status: StatusFilter, search: &str) -> String;
}

#[async_trait]
impl RecordGateway for MailroomClient {
    async fn list_records(&self, options: &RecordListOptions) -> Result<ListSnapshot> {
        MailroomClient::list_records(self, options).await
    }

    async fn fetch_aggregate(&self) -> Result<AggregateSnapshot> {
        MailroomClient::fetch_aggregate(self).await
    }

    async fn get_record(&self, id: &str) -> Result<Record> {
        MailroomClient::get_record(self, id).await
    }

    fn export_reference(&self, status: StatusFilter, search: &str) -> String {
        MailroomClient::export_reference(self, status, search)
    }
}
