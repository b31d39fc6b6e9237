//! Local snapshot state owned by the sync engine

use chrono::{DateTime, Utc};
use serde::Serialize;

use mailroom_client::{AggregateSnapshot, ListSnapshot};

use crate::query::QueryParams;

/// Outcome of the most recent applied fetch for one half of the state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SliceHealth {
    /// Nothing has settled yet
    #[default]
    Pending,
    Fresh {
        at: DateTime<Utc>,
    },
    /// Last fetch failed; the previous snapshot (if any) is still shown
    Failed {
        error: String,
        at: DateTime<Utc>,
    },
}

impl SliceHealth {
    pub fn is_failed(&self) -> bool {
        matches!(self, SliceHealth::Failed { .. })
    }
}

/// Result of settling one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Results were written into the state
    Applied {
        generation: u64,
        list_ok: bool,
        aggregate_ok: bool,
    },
    /// A newer cycle was issued while this one was in flight
    Stale { generation: u64, current: u64 },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }

    pub fn generation(&self) -> u64 {
        match self {
            RefreshOutcome::Applied { generation, .. } | RefreshOutcome::Stale { generation, .. } => {
                *generation
            }
        }
    }
}

/// Authoritative local mirror of the remote dataset.
///
/// Only the engine mutates this. Readers get clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    list: Option<ListSnapshot>,
    list_query: Option<QueryParams>,
    aggregate: Option<AggregateSnapshot>,
    last_refreshed: Option<DateTime<Utc>>,
    is_loading: bool,
    first_load_settled: bool,
    generation: u64,
    list_health: SliceHealth,
    aggregate_health: SliceHealth,
}

impl SyncState {
    pub fn list(&self) -> Option<&ListSnapshot> {
        self.list.as_ref()
    }

    /// Parameters the current list snapshot was fetched under
    pub fn list_query(&self) -> Option<&QueryParams> {
        self.list_query.as_ref()
    }

    pub fn aggregate(&self) -> Option<&AggregateSnapshot> {
        self.aggregate.as_ref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether any cycle has been applied yet, successful or not
    pub fn first_load_settled(&self) -> bool {
        self.first_load_settled
    }

    /// Latest generation issued (not necessarily applied)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn list_health(&self) -> &SliceHealth {
        &self.list_health
    }

    pub fn aggregate_health(&self) -> &SliceHealth {
        &self.aggregate_health
    }

    /// Issue a new generation and mark a fetch outstanding
    pub(crate) fn begin_cycle(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    /// Write a cycle's results if it is still the latest one issued.
    ///
    /// Each half is replaced only on success. A stale cycle leaves every
    /// field untouched, including `is_loading`, since the newer cycle still
    /// owns it.
    pub(crate) fn settle(
        &mut self,
        generation: u64,
        params: &QueryParams,
        list: Result<ListSnapshot, String>,
        aggregate: Result<AggregateSnapshot, String>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if generation != self.generation {
            return RefreshOutcome::Stale {
                generation,
                current: self.generation,
            };
        }

        let list_ok = match list {
            Ok(snapshot) => {
                self.list = Some(snapshot);
                self.list_query = Some(params.clone());
                self.list_health = SliceHealth::Fresh { at: now };
                true
            }
            Err(error) => {
                self.list_health = SliceHealth::Failed { error, at: now };
                false
            }
        };

        let aggregate_ok = match aggregate {
            Ok(snapshot) => {
                self.aggregate = Some(snapshot);
                self.aggregate_health = SliceHealth::Fresh { at: now };
                true
            }
            Err(error) => {
                self.aggregate_health = SliceHealth::Failed { error, at: now };
                false
            }
        };

        if list_ok || aggregate_ok {
            self.last_refreshed = Some(now);
        }
        self.is_loading = false;
        self.first_load_settled = true;

        RefreshOutcome::Applied {
            generation,
            list_ok,
            aggregate_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mailroom_client::StatusFilter;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_714_640_000 + secs, 0).unwrap()
    }

    fn list(total: u64) -> ListSnapshot {
        ListSnapshot {
            records: Vec::new(),
            total,
        }
    }

    fn stats(total: u64) -> AggregateSnapshot {
        AggregateSnapshot {
            total,
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_cycle_increments_and_marks_loading() {
        let mut state = SyncState::default();
        assert_eq!(state.begin_cycle(), 1);
        assert_eq!(state.begin_cycle(), 2);
        assert!(state.is_loading());
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn test_settle_current_applies_both_halves() {
        let mut state = SyncState::default();
        let params = QueryParams::default().with_search_text("invoice");
        let g = state.begin_cycle();

        let outcome = state.settle(g, &params, Ok(list(3)), Ok(stats(5)), at(0));

        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                generation: 1,
                list_ok: true,
                aggregate_ok: true
            }
        );
        assert_eq!(state.list().map(|l| l.total), Some(3));
        assert_eq!(state.aggregate().map(|a| a.total), Some(5));
        assert_eq!(state.list_query(), Some(&params));
        assert_eq!(state.last_refreshed(), Some(at(0)));
        assert!(!state.is_loading());
        assert_eq!(state.list_health(), &SliceHealth::Fresh { at: at(0) });
    }

    #[test]
    fn test_settle_stale_leaves_state_untouched() {
        let mut state = SyncState::default();
        let old = state.begin_cycle();
        let new = state.begin_cycle();
        let before = state.clone();

        let outcome = state.settle(old, &QueryParams::default(), Ok(list(9)), Ok(stats(9)), at(0));

        assert_eq!(outcome, RefreshOutcome::Stale { generation: old, current: new });
        assert_eq!(state, before);
        assert!(state.is_loading());
    }

    #[test]
    fn test_partial_failure_keeps_last_good_half() {
        let mut state = SyncState::default();
        let params = QueryParams::default();
        let g = state.begin_cycle();
        state.settle(g, &params, Ok(list(2)), Ok(stats(2)), at(0));

        let escalated = params.with_status_filter(StatusFilter::Only(
            mailroom_client::EmailStatus::Escalated,
        ));
        let g = state.begin_cycle();
        let outcome = state.settle(
            g,
            &escalated,
            Err("connection refused".into()),
            Ok(stats(4)),
            at(5),
        );

        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                generation: 2,
                list_ok: false,
                aggregate_ok: true
            }
        );
        // List half still reflects the earlier query
        assert_eq!(state.list().map(|l| l.total), Some(2));
        assert_eq!(state.list_query(), Some(&params));
        assert_eq!(state.aggregate().map(|a| a.total), Some(4));
        assert!(state.list_health().is_failed());
        assert_eq!(state.last_refreshed(), Some(at(5)));
    }

    #[test]
    fn test_total_failure_keeps_timestamp_and_clears_loading() {
        let mut state = SyncState::default();
        let params = QueryParams::default();
        let g = state.begin_cycle();
        state.settle(g, &params, Ok(list(1)), Ok(stats(1)), at(0));

        let g = state.begin_cycle();
        state.settle(g, &params, Err("down".into()), Err("down".into()), at(5));

        assert_eq!(state.last_refreshed(), Some(at(0)));
        assert!(!state.is_loading());
        assert!(state.first_load_settled());
        assert_eq!(state.list().map(|l| l.total), Some(1));
        assert_eq!(
            state.aggregate_health(),
            &SliceHealth::Failed {
                error: "down".into(),
                at: at(5)
            }
        );
    }

    #[test]
    fn test_failed_first_cycle_still_settles_first_load() {
        let mut state = SyncState::default();
        assert!(!state.first_load_settled());

        let g = state.begin_cycle();
        state.settle(g, &QueryParams::default(), Err("down".into()), Err("down".into()), at(0));
        assert!(state.first_load_settled());
        assert!(state.list().is_none());

        // Stale cycles do not count
        let mut state = SyncState::default();
        let old = state.begin_cycle();
        state.begin_cycle();
        state.settle(old, &QueryParams::default(), Ok(list(1)), Ok(stats(1)), at(0));
        assert!(!state.first_load_settled());
    }
}
