//! Query parameters - what the next fetch asks the backend for.
//!
//! `QueryParams` is a value type. Every change produces a new instance, and
//! the sync engine treats a changed value as the signal to re-fetch.

use serde::Serialize;
use thiserror::Error;

use mailroom_client::{RecordListOptions, StatusFilter};

/// Page size the backend accepts
pub const MAX_LIMIT: u32 = 1000;
pub const DEFAULT_LIMIT: u32 = 100;

/// Malformed query parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown status filter: {0}")]
    UnknownStatus(String),

    #[error("limit must be between 1 and 1000, got {0}")]
    LimitOutOfRange(u32),
}

/// Snapshot of the user's filter and search input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryParams {
    status_filter: StatusFilter,
    search_text: String,
    limit: u32,
    offset: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            status_filter: StatusFilter::All,
            search_text: String::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl QueryParams {
    /// Build from raw user input
    pub fn parse(status: &str, search: impl Into<String>) -> Result<Self, ValidationError> {
        let status_filter = status
            .parse()
            .map_err(|_| ValidationError::UnknownStatus(status.to_string()))?;
        Ok(Self {
            status_filter,
            search_text: search.into(),
            ..Self::default()
        })
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn with_status_filter(&self, status_filter: StatusFilter) -> Self {
        Self {
            status_filter,
            ..self.clone()
        }
    }

    pub fn with_search_text(&self, search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            ..self.clone()
        }
    }

    pub fn with_page(&self, limit: u32, offset: u32) -> Result<Self, ValidationError> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::LimitOutOfRange(limit));
        }
        Ok(Self {
            limit,
            offset,
            ..self.clone()
        })
    }

    pub fn to_list_options(&self) -> RecordListOptions {
        RecordListOptions {
            status: self.status_filter,
            search: self.search_text.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}
