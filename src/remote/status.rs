//! Normalization of the Odyssey `/status` payload.
//!
//! The server reports its state as a single-key JSON object whose key names
//! the phase, e.g. `{"Printing": {...}}` or `{"Idle": {}}`. The key is
//! treated as a tagged-union discriminant and folded into [`Phase`]
//! immediately, so nothing downstream inspects raw JSON.

use serde::Serialize;
use serde_json::Value;

/// Top-level job phase reported by the server, plus the client-side
/// sentinel for transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Printing,
    Error,
    CommunicationError,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Printing => "Printing",
            Phase::Error => "Error",
            Phase::CommunicationError => "Communication Error",
        }
    }
}

/// Details of the active job. Only present while the phase is `Printing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInfo {
    pub paused: bool,
    pub location_category: String,
    pub file_name: String,
    /// Current layer index, 0-based.
    pub layer: u64,
    /// Total layers. Always >= 1 so progress is always expressible.
    pub layer_count: u64,
}

/// One normalized observation of the remote server. Produced fresh on every
/// poll and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub phase: Phase,
    /// HTTP status code, carried when a response arrived but its body was
    /// not valid JSON.
    pub http_status: Option<u16>,
    pub job: Option<JobInfo>,
}

impl StatusSnapshot {
    /// Sentinel for a failed transport attempt (refused, timeout, DNS).
    pub fn communication_error() -> Self {
        Self {
            phase: Phase::CommunicationError,
            http_status: None,
            job: None,
        }
    }

    /// Sentinel for a response whose body failed to parse as JSON.
    pub fn http_error(status: u16) -> Self {
        Self {
            phase: Phase::Error,
            http_status: Some(status),
            job: None,
        }
    }

    /// Normalize a raw payload. Never fails: an empty or unrecognized
    /// payload reads as Idle, and malformed nested structures degrade to
    /// per-field defaults rather than erroring.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(map) = payload.as_object() else {
            return Self {
                phase: Phase::Idle,
                http_status: None,
                job: None,
            };
        };

        for (key, body) in map {
            if key == "Idle" {
                return Self {
                    phase: Phase::Idle,
                    http_status: None,
                    job: None,
                };
            }
            if key == "Printing" {
                return Self {
                    phase: Phase::Printing,
                    http_status: None,
                    job: Some(JobInfo::from_payload(body)),
                };
            }
            if key.starts_with("Error") {
                // The server (and older client builds) tag errors as
                // "Error" or "Error <code>".
                let code = key
                    .strip_prefix("Error")
                    .and_then(|rest| rest.trim().parse::<u16>().ok());
                return Self {
                    phase: Phase::Error,
                    http_status: code,
                    job: None,
                };
            }
        }

        Self {
            phase: Phase::Idle,
            http_status: None,
            job: None,
        }
    }

    /// True iff an unpaused print is underway.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Printing && !self.is_paused()
    }

    pub fn is_paused(&self) -> bool {
        self.job.as_ref().map(|j| j.paused).unwrap_or(false)
    }

    /// `location_category/file_name` of the active job.
    pub fn file_path(&self) -> Option<String> {
        self.job
            .as_ref()
            .map(|j| format!("{}/{}", j.location_category, j.file_name))
    }

    /// Current layer index, also used as the job's file position.
    pub fn file_position(&self) -> Option<u64> {
        self.job.as_ref().map(|j| j.layer)
    }

    /// Fraction of layers completed. Defined only while printing; the
    /// layer_count floor of 1 guarantees the division is always valid.
    pub fn progress(&self) -> Option<f64> {
        self.job
            .as_ref()
            .map(|j| j.layer as f64 / j.layer_count as f64)
    }
}

impl JobInfo {
    fn from_payload(body: &Value) -> Self {
        let print_data = &body["print_data"];
        let file_data = &print_data["file_data"];
        Self {
            paused: body["paused"].as_bool().unwrap_or(false),
            location_category: file_data["location_category"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            file_name: file_data["name"].as_str().unwrap_or_default().to_string(),
            layer: body["layer"].as_u64().unwrap_or(0),
            layer_count: print_data["layer_count"].as_u64().unwrap_or(1).max(1),
        }
    }
}
