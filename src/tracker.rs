// src/tracker.rs - Work tracker reconciling local belief with remote state
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::remote::status::{Phase, StatusSnapshot};
use crate::remote::PrintServer;
use crate::stats::JobStatsSink;

/// Local belief about the remote job, owned by the bridge task.
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// True once an active, unpaused print has been observed; cleared when
    /// completion, pause, or cancellation is observed.
    pub tracking: bool,
    /// Most recent snapshot, answering status queries between polls.
    pub last: StatusSnapshot,
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            tracking: false,
            last: StatusSnapshot::communication_error(),
        }
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic reconciliation over the remote server's status. Each tick
/// fetches a snapshot, applies edge-triggered lifecycle transitions, and
/// returns the delay until the next poll: fast while a print is believed
/// active, slow while idle.
pub struct WorkTracker {
    server: Arc<dyn PrintServer>,
    stats: Arc<dyn JobStatsSink>,
    state: Arc<Mutex<TrackerState>>,
    active_interval: Duration,
    idle_interval: Duration,
}

impl WorkTracker {
    pub fn new(
        server: Arc<dyn PrintServer>,
        stats: Arc<dyn JobStatsSink>,
        state: Arc<Mutex<TrackerState>>,
        active_interval: Duration,
        idle_interval: Duration,
    ) -> Self {
        Self {
            server,
            stats,
            state,
            active_interval,
            idle_interval,
        }
    }

    /// One reconciliation pass. Never fails: the fetch substitutes sentinel
    /// snapshots on failure, so a delay is always produced and the loop
    /// always reschedules. CommunicationError snapshots drive no
    /// transition; only Idle and Printing do.
    pub async fn tick(&self) -> Duration {
        let snapshot = self.server.fetch_status().await;
        let mut state = self.state.lock().await;

        if state.tracking {
            match snapshot.phase {
                Phase::Idle => {
                    tracing::info!("print complete");
                    self.stats.note_complete();
                    state.tracking = false;
                }
                Phase::Printing if snapshot.is_paused() => {
                    // Paused out-of-band, e.g. from the remote UI.
                    tracing::info!("print paused remotely");
                    self.stats.note_pause();
                    state.tracking = false;
                }
                _ => {}
            }
            state.last = snapshot;
            self.active_interval
        } else if snapshot.is_active() {
            tracing::info!(
                "print started: {}",
                snapshot.file_path().unwrap_or_default()
            );
            state.tracking = true;
            state.last = snapshot;
            self.active_interval
        } else {
            state.last = snapshot;
            self.idle_interval
        }
    }
}
