//! Shared test doubles: a scripted print server and a recording stats sink.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use odyssey_link::remote::status::StatusSnapshot;
use odyssey_link::remote::{CommandOutcome, JobCommand, PrintServer, TransportError};
use odyssey_link::stats::JobStatsSink;

/// A `PrintServer` that replays scripted snapshots and command outcomes
/// while recording everything sent to it.
pub struct ScriptedServer {
    snapshots: Mutex<VecDeque<StatusSnapshot>>,
    fallback: StatusSnapshot,
    outcomes: Mutex<VecDeque<Result<CommandOutcome, TransportError>>>,
    sent: Mutex<Vec<JobCommand>>,
    fetches: AtomicUsize,
    shutdown_notified: AtomicBool,
}

impl ScriptedServer {
    /// Repeats an Idle snapshot once the script runs out.
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(VecDeque::new()),
            fallback: idle_snapshot(),
            outcomes: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            shutdown_notified: AtomicBool::new(false),
        }
    }

    pub fn push_snapshot(&self, snapshot: StatusSnapshot) {
        self.snapshots.lock().unwrap().push_back(snapshot);
    }

    pub fn push_outcome(&self, status: u16, reason: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(CommandOutcome {
            status,
            reason: reason.to_string(),
        }));
    }

    pub fn push_transport_failure(&self, error: TransportError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn sent_commands(&self) -> Vec<JobCommand> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn was_shutdown_notified(&self) -> bool {
        self.shutdown_notified.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrintServer for ScriptedServer {
    async fn fetch_status(&self) -> StatusSnapshot {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn fetch_raw_status(&self) -> Result<Value, TransportError> {
        Ok(json!({ "Idle": {} }))
    }

    async fn send_command(&self, command: &JobCommand) -> Result<CommandOutcome, TransportError> {
        self.sent.lock().unwrap().push(command.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CommandOutcome {
                    status: 200,
                    reason: "OK".to_string(),
                })
            })
    }

    async fn notify_shutdown(&self) {
        self.shutdown_notified.store(true, Ordering::SeqCst);
    }
}

/// A `JobStatsSink` that records the transition calls it receives, in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl JobStatsSink for RecordingSink {
    fn set_current_file(&self, file: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("set_current_file:{}", file));
    }

    fn note_start(&self) {
        self.events.lock().unwrap().push("start".to_string());
    }

    fn note_pause(&self) {
        self.events.lock().unwrap().push("pause".to_string());
    }

    fn note_cancel(&self) {
        self.events.lock().unwrap().push("cancel".to_string());
    }

    fn note_complete(&self) {
        self.events.lock().unwrap().push("complete".to_string());
    }
}

pub fn idle_snapshot() -> StatusSnapshot {
    StatusSnapshot::from_payload(&json!({ "Idle": {} }))
}

pub fn printing_snapshot(paused: bool, layer: u64, layer_count: u64) -> StatusSnapshot {
    StatusSnapshot::from_payload(&json!({
        "Printing": {
            "paused": paused,
            "layer": layer,
            "print_data": {
                "layer_count": layer_count,
                "file_data": {
                    "location_category": "Local",
                    "name": "cube"
                }
            }
        }
    }))
}

/// Produce a genuine transport error without touching the network: an
/// invalid URL fails inside reqwest at send time.
pub async fn transport_error() -> TransportError {
    let error = reqwest::Client::new()
        .get("http://")
        .send()
        .await
        .expect_err("invalid url must fail");
    TransportError::Http(error)
}
