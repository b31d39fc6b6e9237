//! Refresh orchestration
//!
//! Every refresh takes a generation token from [`SyncState`] before issuing
//! its fetch pair. When both calls resolve, the results are written only if
//! no newer generation has been issued in the meantime. Requests may resolve
//! in any order; the most recently issued one always wins.
//!
//! Lock order is `query` then `state`. Taking a generation while holding the
//! query lock ties the generation order to the order in which query values
//! were observed, so a timer tick can never land a result for parameters the
//! user already replaced.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use mailroom_client::RecordGateway;

use super::poller::{self, PollHandle};
use super::state::{RefreshOutcome, SyncState};
use crate::query::QueryParams;

struct EngineInner {
    gateway: Arc<dyn RecordGateway>,
    query: RwLock<QueryParams>,
    state: RwLock<SyncState>,
    revision: watch::Sender<u64>,
    poll_interval: Duration,
    poller: Mutex<Option<PollHandle>>,
}

/// Owns the local snapshot and keeps it in step with the backend.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

/// Non-owning handle used by the poll task
#[derive(Clone)]
pub struct WeakSyncEngine {
    inner: Weak<EngineInner>,
}

impl WeakSyncEngine {
    pub fn upgrade(&self) -> Option<SyncEngine> {
        self.inner.upgrade().map(|inner| SyncEngine { inner })
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("poll_interval", &self.inner.poll_interval)
            .field("revision", &*self.inner.revision.borrow())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(gateway: Arc<dyn RecordGateway>, initial: QueryParams, poll_interval: Duration) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(EngineInner {
                gateway,
                query: RwLock::new(initial),
                state: RwLock::new(SyncState::default()),
                revision,
                poll_interval,
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakSyncEngine {
        WeakSyncEngine {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn RecordGateway> {
        &self.inner.gateway
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Clone of the current snapshot
    pub async fn state(&self) -> SyncState {
        self.inner.state.read().await.clone()
    }

    /// Parameters the next timer refresh will use
    pub async fn query(&self) -> QueryParams {
        self.inner.query.read().await.clone()
    }

    /// Receiver that changes every time a refresh is applied
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Export link for the current parameters
    pub async fn export_reference(&self) -> String {
        let query = self.query().await;
        self.inner
            .gateway
            .export_reference(query.status_filter(), query.search_text())
    }

    /// Fetch list and stats for `params` and apply them unless superseded.
    ///
    /// Does not change the stored query; the next timer tick still uses it.
    pub async fn trigger_refresh(&self, params: QueryParams) -> RefreshOutcome {
        let generation = self.begin_cycle().await;
        self.complete_cycle(generation, params).await
    }

    /// Refresh with the stored query
    pub async fn refresh_current(&self) -> RefreshOutcome {
        let (generation, params) = {
            let query = self.inner.query.read().await;
            (self.begin_cycle().await, query.clone())
        };
        self.complete_cycle(generation, params).await
    }

    /// Replace the stored query and start an immediate refresh.
    ///
    /// Returns `None` when `params` equals the stored query. The poll timer
    /// keeps its schedule.
    pub async fn set_query(&self, params: QueryParams) -> Option<JoinHandle<RefreshOutcome>> {
        match self.update_query(|_| Ok::<_, Infallible>(params)).await {
            Ok((_, handle)) => handle,
            Err(never) => match never {},
        }
    }

    /// Derive the next query from the stored one and start a refresh if it
    /// changed.
    ///
    /// `update` runs under the query write lock, so concurrent partial
    /// updates compose instead of overwriting each other. An error from
    /// `update` leaves the stored query untouched.
    pub async fn update_query<E>(
        &self,
        update: impl FnOnce(&QueryParams) -> Result<QueryParams, E>,
    ) -> Result<(QueryParams, Option<JoinHandle<RefreshOutcome>>), E> {
        let (params, generation) = {
            let mut query = self.inner.query.write().await;
            let params = update(&query)?;
            if *query == params {
                debug!("Query unchanged, skipping refresh");
                return Ok((params, None));
            }
            *query = params.clone();
            (params, self.begin_cycle().await)
        };

        info!(
            generation,
            status = %params.status_filter(),
            search = %params.search_text(),
            "Query changed, refreshing"
        );

        let engine = self.clone();
        let cycle_params = params.clone();
        let handle = tokio::spawn(async move { engine.complete_cycle(generation, cycle_params).await });
        Ok((params, Some(handle)))
    }

    /// Start the recurring refresh timer.
    ///
    /// Returns false if it is already running.
    pub fn start_polling(&self) -> bool {
        let mut poller = self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        *poller = Some(poller::spawn(self.downgrade(), self.inner.poll_interval));
        info!(interval_ms = self.inner.poll_interval.as_millis() as u64, "Polling started");
        true
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the timer. Refreshes already in flight run to completion.
    pub async fn shutdown(&self) {
        let handle = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
            info!("Polling stopped");
        }
    }

    async fn begin_cycle(&self) -> u64 {
        self.inner.state.write().await.begin_cycle()
    }

    async fn complete_cycle(&self, generation: u64, params: QueryParams) -> RefreshOutcome {
        let options = params.to_list_options();
        let gateway = &self.inner.gateway;
        let (list, aggregate) = tokio::join!(gateway.list_records(&options), gateway.fetch_aggregate());

        let list = list.map_err(|e| {
            warn!(generation, kind = e.kind(), error = %e, "List fetch failed");
            e.to_string()
        });
        let aggregate = aggregate.map_err(|e| {
            warn!(generation, kind = e.kind(), error = %e, "Stats fetch failed");
            e.to_string()
        });

        let outcome = self
            .inner
            .state
            .write()
            .await
            .settle(generation, &params, list, aggregate, Utc::now());

        match &outcome {
            RefreshOutcome::Applied { list_ok, aggregate_ok, .. } => {
                self.inner.revision.send_modify(|revision| *revision += 1);
                debug!(generation, list_ok, aggregate_ok, "Refresh applied");
            }
            RefreshOutcome::Stale { current, .. } => {
                debug!(generation, current, "Discarding stale refresh");
            }
        }
        outcome
    }
}
