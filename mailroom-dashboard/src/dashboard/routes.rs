//! Dashboard HTTP routes
//!
//! Handlers for the JSON API. Every read goes through the engine's current
//! snapshot; only `GET /api/records/:id` reaches the backend directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use mailroom_client::{ClientError, Record};

use super::SharedState;
use crate::error::DashboardError;
use crate::projection::{project, DashboardView};
use crate::query::{QueryParams, ValidationError};
use crate::sync::SliceHealth;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// Map an error onto the status code the API reports it with
pub fn error_response(err: DashboardError) -> (StatusCode, String) {
    let status = match &err {
        DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
        DashboardError::Gateway(ClientError::NotFound(_)) => StatusCode::NOT_FOUND,
        DashboardError::Gateway(_) => StatusCode::BAD_GATEWAY,
        DashboardError::Config(_) | DashboardError::Io(_) | DashboardError::Unavailable(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

// === API Endpoints ===

#[derive(Serialize)]
pub struct ViewResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    pub summary: String,
    pub export_url: String,
}

/// GET /api/view
pub async fn api_view(State(state): State<SharedState>) -> Json<ViewResponse> {
    let query = state.engine.query().await;
    let snapshot = state.engine.state().await;
    let view = project(&snapshot, &query, &state.view);
    let export_url = state
        .engine
        .gateway()
        .export_reference(query.status_filter(), query.search_text());

    Json(ViewResponse {
        summary: view.summary(),
        view,
        export_url,
    })
}

/// GET /api/query
pub async fn api_query(State(state): State<SharedState>) -> Json<QueryParams> {
    Json(state.engine.query().await)
}

/// POST /api/query body; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct QueryUpdate {
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl QueryUpdate {
    pub fn apply(&self, current: &QueryParams) -> Result<QueryParams, ValidationError> {
        let mut next = current.clone();
        if let Some(status) = &self.status {
            let filter = status
                .parse()
                .map_err(|_| ValidationError::UnknownStatus(status.clone()))?;
            next = next.with_status_filter(filter);
        }
        if let Some(search) = &self.search {
            next = next.with_search_text(search.clone());
        }
        if self.limit.is_some() || self.offset.is_some() {
            next = next.with_page(
                self.limit.unwrap_or(current.limit()),
                self.offset.unwrap_or(current.offset()),
            )?;
        }
        Ok(next)
    }
}

#[derive(Serialize)]
pub struct QueryChangeResponse {
    pub query: QueryParams,
    /// False when the update matched the current query
    pub refresh_triggered: bool,
}

/// POST /api/query
pub async fn api_set_query(
    State(state): State<SharedState>,
    Json(update): Json<QueryUpdate>,
) -> Result<Json<QueryChangeResponse>, (StatusCode, String)> {
    let (query, handle) = state
        .engine
        .update_query(|current| update.apply(current))
        .await
        .map_err(|e| error_response(e.into()))?;

    Ok(Json(QueryChangeResponse {
        query,
        refresh_triggered: handle.is_some(),
    }))
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub url: String,
}

/// GET /api/export
pub async fn api_export(State(state): State<SharedState>) -> Json<ExportResponse> {
    Json(ExportResponse {
        url: state.engine.export_reference().await,
    })
}

#[derive(Serialize)]
pub struct SyncStatusResponse {
    pub generation: u64,
    pub is_loading: bool,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub list: SliceHealth,
    pub aggregate: SliceHealth,
    pub polling: bool,
    pub poll_interval_ms: u64,
    pub query: QueryParams,
}

/// GET /api/sync
pub async fn api_sync(State(state): State<SharedState>) -> Json<SyncStatusResponse> {
    let query = state.engine.query().await;
    let snapshot = state.engine.state().await;

    Json(SyncStatusResponse {
        generation: snapshot.generation(),
        is_loading: snapshot.is_loading(),
        last_refreshed: snapshot.last_refreshed(),
        list: snapshot.list_health().clone(),
        aggregate: snapshot.aggregate_health().clone(),
        polling: state.engine.is_polling(),
        poll_interval_ms: state.engine.poll_interval().as_millis() as u64,
        query,
    })
}

/// GET /api/records/:id
pub async fn api_record(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, (StatusCode, String)> {
    match state.engine.gateway().get_record(&id).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            if !matches!(e, ClientError::NotFound(_)) {
                warn!(id = %id, kind = e.kind(), error = %e, "Record lookup failed");
            }
            Err(error_response(e.into()))
        }
    }
}
