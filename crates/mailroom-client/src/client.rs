//! HTTP client for the mailroom read API

use crate::error::{ClientError, Result};
use crate::types::*;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const EMAILS_PATH: &str = "/api/v1/emails";

/// HTTP client for the mailroom read API
///
/// # Example
///
/// ```rust,no_run
/// use mailroom_client::{ClientConfig, MailroomClient, RecordListOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MailroomClient::new(ClientConfig {
///     base_url: "http://localhost:8000".into(),
///     ..Default::default()
/// })?;
///
/// let page = client.list_records(&RecordListOptions::default()).await?;
/// let stats = client.fetch_aggregate().await?;
/// println!("{} of {} emails, {} escalated", page.len(), page.total, stats.escalated);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MailroomClient {
    config: ClientConfig,
    client: Client,
}

impl MailroomClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    // ==================== Email API ====================

    /// List records matching a filter, one page at a time
    pub async fn list_records(&self, options: &RecordListOptions) -> Result<ListSnapshot> {
        let url = with_query(
            format!("{}{}", self.base_url(), EMAILS_PATH),
            &options.query_pairs(),
        );

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Per-status counts over the whole dataset
    pub async fn fetch_aggregate(&self) -> Result<AggregateSnapshot> {
        let url = format!("{}{}/stats", self.base_url(), EMAILS_PATH);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Get a single record by ID
    pub async fn get_record(&self, id: &str) -> Result<Record> {
        let url = format!(
            "{}{}/{}",
            self.base_url(),
            EMAILS_PATH,
            urlencoding::encode(id)
        );

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id.to_string()));
        }
        self.handle_response(response).await
    }

    /// Link to the CSV export of every record matching the filter.
    /// Never performs I/O.
    pub fn export_reference(&self, status: StatusFilter, search: &str) -> String {
        build_export_reference(self.base_url(), status, search)
    }

    /// Probe the backend health endpoint
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url());

        let response = self.client.get(&url).send().await?;
        let health: HealthResponse = self.handle_response(response).await?;
        Ok(health.status.eq_ignore_ascii_case("ok"))
    }

    // ==================== Helper Methods ====================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status,
                message: body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Export link for `base_url`. Status and search are omitted at their
/// defaults so the link stays canonical.
pub fn build_export_reference(base_url: &str, status: StatusFilter, search: &str) -> String {
    with_query(
        format!("{}{}/export/csv", base_url.trim_end_matches('/'), EMAILS_PATH),
        &filter_pairs(status, search),
    )
}

fn with_query(mut url: String, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return url;
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    url.push('?');
    url.push_str(&query.join("&"));
    url
}
