//! Types for the mailroom read API

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

// ============================================================================
// Status vocabulary
// ============================================================================

/// Processing status assigned to an email by the ingestion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailStatus {
    New,
    Processed,
    NeedsOperator,
    Escalated,
    Closed,
}

impl EmailStatus {
    /// Every status, in badge order
    pub const ALL: [EmailStatus; 5] = [
        EmailStatus::New,
        EmailStatus::Processed,
        EmailStatus::NeedsOperator,
        EmailStatus::Escalated,
        EmailStatus::Closed,
    ];

    /// Wire value used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::New => "NEW",
            EmailStatus::Processed => "PROCESSED",
            EmailStatus::NeedsOperator => "NEEDS_OPERATOR",
            EmailStatus::Escalated => "ESCALATED",
            EmailStatus::Closed => "CLOSED",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EmailStatus::New => "New",
            EmailStatus::Processed => "Processed",
            EmailStatus::NeedsOperator => "Needs Operator",
            EmailStatus::Escalated => "Escalated",
            EmailStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that is not part of the backend vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for EmailStatus {
    type Err = ParseStatusError;

    /// Matches case-insensitively, as the backend upper-cases the value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        EmailStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Status filter for list and export requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    /// No status restriction
    #[default]
    All,
    /// Only records with the given status
    Only(EmailStatus),
}

impl StatusFilter {
    /// Every filter, in badge order
    pub const ALL: [StatusFilter; 6] = [
        StatusFilter::All,
        StatusFilter::Only(EmailStatus::New),
        StatusFilter::Only(EmailStatus::Processed),
        StatusFilter::Only(EmailStatus::NeedsOperator),
        StatusFilter::Only(EmailStatus::Escalated),
        StatusFilter::Only(EmailStatus::Closed),
    ];

    /// Value for the `status` query parameter; `None` means "omit it"
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status.as_str()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.query_value().unwrap_or("ALL")
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.as_str().to_string()
    }
}

// ============================================================================
// Classifier outputs
// ============================================================================

/// Sentiment assigned by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    /// Any label this client does not know about
    Other(String),
}

impl Sentiment {
    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Other(label) => label,
        }
    }
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "neutral" => Sentiment::Neutral,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Other(value),
        }
    }
}

impl From<Sentiment> for String {
    fn from(value: Sentiment) -> Self {
        value.as_str().to_string()
    }
}

/// Complexity assigned by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Complexity {
    Low,
    High,
    Other(String),
}

impl Complexity {
    pub fn as_str(&self) -> &str {
        match self {
            Complexity::Low => "low",
            Complexity::High => "high",
            Complexity::Other(label) => label,
        }
    }
}

impl From<String> for Complexity {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "low" => Complexity::Low,
            "high" => Complexity::High,
            _ => Complexity::Other(value),
        }
    }
}

impl From<Complexity> for String {
    fn from(value: Complexity) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// Records and snapshots
// ============================================================================

/// One processed email as exposed by the read API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    pub status: EmailStatus,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One page of records plus the server-side total for the same filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSnapshot {
    #[serde(rename = "emails")]
    pub records: Vec<Record>,
    /// Total matching records (may exceed `records.len()`)
    pub total: u64,
}

impl ListSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-status counts plus grand total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub total: u64,
    pub new: u64,
    pub processed: u64,
    pub needs_operator: u64,
    pub escalated: u64,
    pub closed: u64,
}

impl AggregateSnapshot {
    /// Count shown on the badge for `filter` (`All` maps to the grand total)
    pub fn count(&self, filter: StatusFilter) -> u64 {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Only(EmailStatus::New) => self.new,
            StatusFilter::Only(EmailStatus::Processed) => self.processed,
            StatusFilter::Only(EmailStatus::NeedsOperator) => self.needs_operator,
            StatusFilter::Only(EmailStatus::Escalated) => self.escalated,
            StatusFilter::Only(EmailStatus::Closed) => self.closed,
        }
    }
}

/// Options for list requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListOptions {
    pub status: StatusFilter,
    /// Free text matched against sender and subject; empty means unfiltered
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for RecordListOptions {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            search: String::new(),
            limit: 100,
            offset: 0,
        }
    }
}

impl RecordListOptions {
    /// Query parameters in request order. Status and search are omitted at
    /// their defaults; paging is always sent.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = filter_pairs(self.status, &self.search);
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// Backend health probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

/// `status`/`search` pairs shared by list and export requests
pub(crate) fn filter_pairs(status: StatusFilter, search: &str) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(value) = status.query_value() {
        pairs.push(("status", value.to_string()));
    }
    if !search.is_empty() {
        pairs.push(("search", search.to_string()));
    }
    pairs
}

/// Parse a backend timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
