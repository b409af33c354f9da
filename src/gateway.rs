// src/gateway.rs - Lifecycle command dispatch, serialized against tracked state
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};

use crate::remote::{CommandOutcome, JobCommand, PrintServer, TransportError};
use crate::stats::JobStatsSink;
use crate::tracker::TrackerState;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("odyssey busy: a print is already active")]
    Busy,
    #[error("odyssey could not find the requested file")]
    FileNotFound,
    #[error("odyssey error encountered: {status}: {reason}")]
    Server { status: u16, reason: String },
    #[error("{0}")]
    Unreachable(#[from] TransportError),
}

/// Translates user-issued lifecycle commands into HTTP calls and keeps the
/// local bookkeeping in step with their outcome. All failures surface
/// synchronously to the caller; nothing is retried.
pub struct CommandGateway {
    server: Arc<dyn PrintServer>,
    stats: Arc<dyn JobStatsSink>,
    state: Arc<Mutex<TrackerState>>,
    /// Wakes the poll loop for an immediate tick after start/resume.
    wake: Arc<Notify>,
    default_location: String,
    strip_leading_slash: bool,
}

impl CommandGateway {
    pub fn new(
        server: Arc<dyn PrintServer>,
        stats: Arc<dyn JobStatsSink>,
        state: Arc<Mutex<TrackerState>>,
        wake: Arc<Notify>,
        default_location: String,
        strip_leading_slash: bool,
    ) -> Self {
        Self {
            server,
            stats,
            state,
            wake,
            default_location,
            strip_leading_slash,
        }
    }

    /// Start a print. Rejected with Busy before any network call while a
    /// print is already believed active; a 404 from the server reports the
    /// file as missing.
    pub async fn start(&self, location: Option<&str>, file: &str) -> Result<(), GatewayError> {
        if self.state.lock().await.tracking {
            return Err(GatewayError::Busy);
        }

        let location = location.unwrap_or(&self.default_location).to_string();
        let file_path = self.normalize_file(file);
        tracing::info!("starting print {}/{}", location, file_path);

        let outcome = self
            .server
            .send_command(&JobCommand::Start {
                location,
                file_path: file_path.clone(),
            })
            .await?;
        if outcome.status == 404 {
            return Err(GatewayError::FileNotFound);
        }
        check_ok(&outcome)?;

        self.stats.set_current_file(&file_path);
        self.stats.note_start();
        self.wake.notify_one();
        Ok(())
    }

    /// Cancel the active print. No busy pre-check: cancellation is always
    /// allowed, and on success the tracking flag is cleared immediately
    /// instead of waiting for the next poll to confirm.
    pub async fn cancel(&self) -> Result<(), GatewayError> {
        let outcome = self.server.send_command(&JobCommand::Cancel).await?;
        check_ok(&outcome)?;

        tracing::info!("print cancelled");
        self.stats.note_cancel();
        self.state.lock().await.tracking = false;
        Ok(())
    }

    /// Pause the active print. Local state is untouched; the tracker's next
    /// tick observes the paused flag and reacts.
    pub async fn pause(&self) -> Result<(), GatewayError> {
        let outcome = self.server.send_command(&JobCommand::Pause).await?;
        check_ok(&outcome)?;
        tracing::info!("pause requested");
        Ok(())
    }

    /// Resume a paused print. Mirrors start: notes a (re-)start and wakes
    /// the poll loop immediately.
    pub async fn resume(&self) -> Result<(), GatewayError> {
        let outcome = self.server.send_command(&JobCommand::Resume).await?;
        check_ok(&outcome)?;

        tracing::info!("print resumed");
        self.stats.note_start();
        self.wake.notify_one();
        Ok(())
    }

    fn normalize_file(&self, file: &str) -> String {
        let file = if self.strip_leading_slash {
            file.strip_prefix('/').unwrap_or(file)
        } else {
            file
        };
        // An extension on the identifier is dropped; the server addresses
        // files by stem.
        match file.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => file.to_string(),
        }
    }
}

fn check_ok(outcome: &CommandOutcome) -> Result<(), GatewayError> {
    if outcome.is_ok() {
        Ok(())
    } else {
        Err(GatewayError::Server {
            status: outcome.status,
            reason: outcome.reason.clone(),
        })
    }
}
