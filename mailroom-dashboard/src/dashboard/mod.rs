//! Dashboard - JSON API over the sync engine
//!
//! Provides:
//! - The projected table view and status badges
//! - Reading and changing the active filter/search
//! - Export link, sync status and single-record lookup

pub mod routes;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::projection::ViewOptions;
use crate::sync::SyncEngine;

/// Dashboard state shared across handlers
pub struct DashboardState {
    pub engine: SyncEngine,
    pub view: ViewOptions,
}

pub type SharedState = Arc<DashboardState>;

/// Create the dashboard router
pub fn create_router(state: SharedState) -> Router {
    // Read-only API; any origin may poll it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    Router::new()
        // API endpoints
        .route("/api/view", get(routes::api_view))
        .route("/api/query", get(routes::api_query).post(routes::api_set_query))
        .route("/api/export", get(routes::api_export))
        .route("/api/sync", get(routes::api_sync))
        .route("/api/records/:id", get(routes::api_record))
        // Health check
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

impl DashboardState {
    pub fn new(engine: SyncEngine, view: ViewOptions) -> Self {
        Self { engine, view }
    }
}
