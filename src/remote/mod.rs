// src/remote/mod.rs - HTTP client for the Odyssey print engine
pub mod status;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::remote::status::StatusSnapshot;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not reach odyssey: {0}")]
    Http(#[from] reqwest::Error),
}

/// Lifecycle commands accepted by the remote job engine.
#[derive(Debug, Clone, PartialEq)]
pub enum JobCommand {
    Start { location: String, file_path: String },
    Cancel,
    Pause,
    Resume,
}

impl JobCommand {
    pub fn endpoint(&self) -> &'static str {
        match self {
            JobCommand::Start { .. } => "/print/start",
            JobCommand::Cancel => "/print/cancel",
            JobCommand::Pause => "/print/pause",
            JobCommand::Resume => "/print/resume",
        }
    }
}

/// Result of a delivered command POST. The caller interprets the status
/// code; non-2xx is not an error at this layer.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub status: u16,
    pub reason: String,
}

impl CommandOutcome {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The job-source capability: everything the tracker, gateway, and status
/// queries need from the remote print engine.
#[async_trait]
pub trait PrintServer: Send + Sync {
    /// Fetch and normalize the current status. Never fails: transport and
    /// parse problems come back as sentinel snapshots, to be retried by
    /// the next poll cycle.
    async fn fetch_status(&self) -> StatusSnapshot;

    /// Fetch the raw status payload without normalization.
    async fn fetch_raw_status(&self) -> Result<Value, TransportError>;

    /// Deliver one lifecycle command. A single POST, no retries.
    async fn send_command(&self, command: &JobCommand) -> Result<CommandOutcome, TransportError>;

    /// Best-effort shutdown notification. Failures are swallowed.
    async fn notify_shutdown(&self);
}

/// Production [`PrintServer`] backed by reqwest.
pub struct HttpStatusClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpStatusClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PrintServer for HttpStatusClient {
    async fn fetch_status(&self) -> StatusSnapshot {
        let response = match self.http.get(self.url("/status")).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("status fetch failed: {}", e);
                return StatusSnapshot::communication_error();
            }
        };
        let status = response.status().as_u16();
        match response.json::<Value>().await {
            Ok(payload) => StatusSnapshot::from_payload(&payload),
            Err(e) => {
                tracing::debug!("status body was not JSON (HTTP {}): {}", status, e);
                StatusSnapshot::http_error(status)
            }
        }
    }

    async fn fetch_raw_status(&self) -> Result<Value, TransportError> {
        let response = self.http.get(self.url("/status")).send().await?;
        Ok(response.json::<Value>().await?)
    }

    async fn send_command(&self, command: &JobCommand) -> Result<CommandOutcome, TransportError> {
        let mut request = self.http.post(self.url(command.endpoint()));
        if let JobCommand::Start {
            location,
            file_path,
        } = command
        {
            request = request.query(&[("location", location), ("file_path", file_path)]);
        }
        let response = request.send().await?;
        let status = response.status();
        Ok(CommandOutcome {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        })
    }

    async fn notify_shutdown(&self) {
        if let Err(e) = self.http.post(self.url("/shutdown")).send().await {
            tracing::debug!("shutdown notification not delivered: {}", e);
        }
    }
}
