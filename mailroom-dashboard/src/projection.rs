//! View projection - pure derivation of what the dashboard shows
//!
//! Nothing here touches the network or mutates state. Given the same
//! snapshot, query and options, `project` always returns the same view.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::Serialize;

use mailroom_client::{EmailStatus, Record, StatusFilter};

use crate::query::QueryParams;
use crate::sync::SyncState;

/// Placeholder for absent optional fields
pub const MISSING: &str = "—";
const ELLIPSIS: char = '…';

/// Formatting knobs for the projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Characters kept before subject/response text is cut
    pub truncate_at: usize,
    /// chrono format string for timestamps
    pub date_format: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            truncate_at: 60,
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: String,
    pub status: EmailStatus,
    pub status_label: &'static str,
    pub sender: String,
    pub subject: String,
    /// Untruncated subject, for tooltips
    pub subject_full: String,
    pub sentiment: String,
    pub complexity: String,
    pub confidence: String,
    pub ai_response: String,
    pub received: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ViewBody {
    /// First fetch still outstanding
    Loading,
    Empty,
    Rows(Vec<RowView>),
}

/// Status filter tab with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub filter: StatusFilter,
    pub label: &'static str,
    /// Absent until stats have been fetched once
    pub count: Option<u64>,
    pub active: bool,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{}: {}", self.label, count),
            None => f.write_str(self.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub body: ViewBody,
    /// Server-side total for the current filter
    pub total_count: u64,
    pub shown_count: usize,
    pub badges: Vec<Badge>,
    pub is_loading: bool,
    pub last_updated: Option<String>,
    pub status_filter: StatusFilter,
    pub search_text: String,
}

impl DashboardView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            ViewBody::Rows(rows) => rows,
            ViewBody::Loading | ViewBody::Empty => &[],
        }
    }

    pub fn badge(&self, filter: StatusFilter) -> Option<&Badge> {
        self.badges.iter().find(|badge| badge.filter == filter)
    }

    /// "Showing N of M emails"
    pub fn summary(&self) -> String {
        format!("Showing {} of {} emails", self.shown_count, self.total_count)
    }
}

/// Derive the renderable view
pub fn project(state: &SyncState, params: &QueryParams, options: &ViewOptions) -> DashboardView {
    let (body, total_count, shown_count) = match state.list() {
        None if state.is_loading() && !state.first_load_settled() => (ViewBody::Loading, 0, 0),
        None => (ViewBody::Empty, 0, 0),
        Some(list) if list.is_empty() => (ViewBody::Empty, list.total, 0),
        Some(list) => {
            let rows: Vec<RowView> = list
                .records
                .iter()
                .map(|record| project_row(record, options))
                .collect();
            let shown = rows.len();
            (ViewBody::Rows(rows), list.total, shown)
        }
    };

    let aggregate = state.aggregate();
    let badges = StatusFilter::ALL
        .iter()
        .map(|&filter| Badge {
            filter,
            label: filter.label(),
            count: aggregate.map(|stats| stats.count(filter)),
            active: filter == params.status_filter(),
        })
        .collect();

    DashboardView {
        body,
        total_count,
        shown_count,
        badges,
        is_loading: state.is_loading(),
        last_updated: state
            .last_refreshed()
            .map(|at| format_timestamp(&at, &options.date_format)),
        status_filter: params.status_filter(),
        search_text: params.search_text().to_string(),
    }
}

fn project_row(record: &Record, options: &ViewOptions) -> RowView {
    RowView {
        id: record.id.clone(),
        status: record.status,
        status_label: record.status.label(),
        sender: record.sender.clone(),
        subject: truncate(&record.subject, options.truncate_at),
        subject_full: record.subject.clone(),
        sentiment: record
            .sentiment
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |s| s.as_str().to_string()),
        complexity: record
            .complexity
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |c| c.as_str().to_string()),
        confidence: format_confidence(record.confidence),
        ai_response: record
            .ai_response
            .as_deref()
            .map_or_else(|| MISSING.to_string(), |text| truncate(text, options.truncate_at)),
        received: format_timestamp(&record.created_at, &options.date_format),
    }
}

/// Cut `text` to `max` characters, appending an ellipsis when cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => {
            let mut cut = text[..end].to_string();
            cut.push(ELLIPSIS);
            cut
        }
        None => text.to_string(),
    }
}

/// 0.873 -> "87%"
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(value) if value.is_finite() => format!("{}%", (value * 100.0).round() as i64),
        _ => MISSING.to_string(),
    }
}

/// Format in UTC; an unusable format string falls back to RFC 3339
pub fn format_timestamp(at: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        return at.to_rfc3339();
    }
    out
}
