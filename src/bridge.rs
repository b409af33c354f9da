// src/bridge.rs - Single task owning the poll loop and command serialization
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex, Notify};
use tokio::time::{self, Instant};

use crate::config::Config;
use crate::gateway::{CommandGateway, GatewayError};
use crate::remote::PrintServer;
use crate::stats::PrintStats;
use crate::tracker::{TrackerState, WorkTracker};
use crate::web::models::StatusResponse;

/// Request sent from a web handler to the bridge task.
#[derive(Debug)]
pub enum BridgeRequest {
    /// Get the normalized status plus tracker and statistics view.
    GetStatus {
        respond_to: oneshot::Sender<StatusResponse>,
    },
    /// Get the raw remote payload without normalization.
    GetRawStatus {
        respond_to: oneshot::Sender<Result<serde_json::Value, String>>,
    },
    Start {
        location: Option<String>,
        file: String,
        respond_to: oneshot::Sender<Result<(), GatewayError>>,
    },
    Cancel {
        respond_to: oneshot::Sender<Result<(), GatewayError>>,
    },
    Pause {
        respond_to: oneshot::Sender<Result<(), GatewayError>>,
    },
    Resume {
        respond_to: oneshot::Sender<Result<(), GatewayError>>,
    },
}

/// Owns the tracker and gateway and runs them on one task, so commands and
/// ticks never overlap: requests are handled one at a time, and the
/// adaptive poll deadline is re-armed after every tick.
pub struct Bridge {
    server: Arc<dyn PrintServer>,
    state: Arc<Mutex<TrackerState>>,
    stats: Arc<PrintStats>,
    wake: Arc<Notify>,
    tracker: WorkTracker,
    gateway: CommandGateway,
}

impl Bridge {
    pub fn new(server: Arc<dyn PrintServer>, config: &Config) -> Self {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let stats = Arc::new(PrintStats::new());
        let wake = Arc::new(Notify::new());

        let tracker = WorkTracker::new(
            server.clone(),
            stats.clone(),
            state.clone(),
            config.polling.active_interval(),
            config.polling.idle_interval(),
        );
        let gateway = CommandGateway::new(
            server.clone(),
            stats.clone(),
            state.clone(),
            wake.clone(),
            config.odyssey.default_location.clone(),
            config.odyssey.strip_leading_slash,
        );

        Self {
            server,
            state,
            stats,
            wake,
            tracker,
            gateway,
        }
    }

    /// Run until the shutdown signal arrives or the request channel closes,
    /// then send the one best-effort shutdown notification.
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<BridgeRequest>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut next_tick = Instant::now();
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("bridge shutting down");
                    break;
                }
                request = rx.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => break,
                },
                _ = self.wake.notified() => {
                    // Immediate-trigger from start/resume.
                    next_tick = Instant::now();
                }
                _ = time::sleep_until(next_tick) => {
                    let delay = self.tracker.tick().await;
                    next_tick = Instant::now() + delay;
                }
            }
        }
        self.server.notify_shutdown().await;
    }

    async fn handle(&self, request: BridgeRequest) {
        match request {
            BridgeRequest::GetStatus { respond_to } => {
                let _ = respond_to.send(self.status_response().await);
            }
            BridgeRequest::GetRawStatus { respond_to } => {
                let result = self
                    .server
                    .fetch_raw_status()
                    .await
                    .map_err(|e| e.to_string());
                let _ = respond_to.send(result);
            }
            BridgeRequest::Start {
                location,
                file,
                respond_to,
            } => {
                let result = self.gateway.start(location.as_deref(), &file).await;
                let _ = respond_to.send(result);
            }
            BridgeRequest::Cancel { respond_to } => {
                let _ = respond_to.send(self.gateway.cancel().await);
            }
            BridgeRequest::Pause { respond_to } => {
                let _ = respond_to.send(self.gateway.pause().await);
            }
            BridgeRequest::Resume { respond_to } => {
                let _ = respond_to.send(self.gateway.resume().await);
            }
        }
    }

    async fn status_response(&self) -> StatusResponse {
        let state = self.state.lock().await;
        StatusResponse {
            odyssey_status: state.last.phase.label().to_string(),
            file_path: state.last.file_path(),
            is_active: state.last.is_active(),
            file_position: state.last.file_position(),
            progress: state.last.progress(),
            tracking: state.tracking,
            stats: self.stats.report(),
        }
    }
}
