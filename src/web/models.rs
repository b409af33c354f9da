//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::stats::StatsReport;

/// Normalized view of the remote job plus local tracking and statistics.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub odyssey_status: String,
    pub file_path: Option<String>,
    pub is_active: bool,
    pub file_position: Option<u64>,
    pub progress: Option<f64>,
    pub tracking: bool,
    pub stats: StatsReport,
}

/// Represents a request to start a print.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub file: String,
    /// Storage location; the configured default applies when omitted.
    #[serde(default)]
    pub location: Option<String>,
}

/// Error body returned for failed commands.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
