//! Recurring refresh timer

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::engine::WeakSyncEngine;
use super::state::RefreshOutcome;

/// Handle to a running poll task.
///
/// Dropping the handle also stops the task.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the task and wait for the loop to exit
    pub async fn stop(self) {
        let PollHandle { shutdown, task } = self;
        let _ = shutdown.send(());
        let _ = task.await;
    }
}

/// Spawn the poll loop.
///
/// The first tick fires immediately. A tick that arrives while the previous
/// timer refresh is unfinished is skipped. The loop exits on stop, when the
/// handle is dropped, or once the engine itself is gone.
pub(crate) fn spawn(engine: WeakSyncEngine, period: Duration) -> PollHandle {
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Option<JoinHandle<RefreshOutcome>> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if in_flight.as_ref().is_some_and(|refresh| !refresh.is_finished()) {
                        debug!("Previous poll still in flight, skipping tick");
                        continue;
                    }
                    let Some(engine) = engine.upgrade() else {
                        debug!("Engine dropped, poller exiting");
                        break;
                    };
                    in_flight = Some(tokio::spawn(async move { engine.refresh_current().await }));
                }
                _ = &mut shutdown_rx => {
                    debug!("Poller received shutdown");
                    break;
                }
            }
        }
    });

    PollHandle { shutdown, task }
}
