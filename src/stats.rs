// src/stats.rs - Print statistics collaborator
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

/// Sink for job-lifecycle notifications. The tracker and gateway call these
/// exactly once per observed transition.
pub trait JobStatsSink: Send + Sync {
    fn set_current_file(&self, file: &str);
    fn note_start(&self);
    fn note_pause(&self);
    fn note_cancel(&self);
    fn note_complete(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Standby,
    Printing,
    Paused,
    Complete,
    Cancelled,
}

/// Point-in-time view of the statistics, for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub job_id: Option<String>,
    pub filename: Option<String>,
    pub state: JobState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Accumulated printing time in seconds, across pauses and resumes.
    pub print_duration: f64,
}

#[derive(Debug)]
struct StatsInner {
    job_id: Option<String>,
    filename: Option<String>,
    state: JobState,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_start: Option<DateTime<Utc>>,
    print_duration: f64,
}

/// Concrete recorder behind [`JobStatsSink`]. Tracks the current job's
/// identity, state, and accumulated print duration.
pub struct PrintStats {
    inner: Mutex<StatsInner>,
}

impl PrintStats {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatsInner {
                job_id: None,
                filename: None,
                state: JobState::Standby,
                started_at: None,
                finished_at: None,
                last_start: None,
                print_duration: 0.0,
            }),
        }
    }

    pub fn report(&self) -> StatsReport {
        let inner = self.inner.lock().expect("stats lock poisoned");
        StatsReport {
            job_id: inner.job_id.clone(),
            filename: inner.filename.clone(),
            state: inner.state,
            started_at: inner.started_at,
            finished_at: inner.finished_at,
            print_duration: inner.print_duration,
        }
    }
}

impl Default for PrintStats {
    fn default() -> Self {
        Self::new()
    }
}

fn accumulate(inner: &mut StatsInner, now: DateTime<Utc>) {
    if let Some(last_start) = inner.last_start.take() {
        inner.print_duration += (now - last_start).num_milliseconds() as f64 / 1000.0;
    }
}

impl JobStatsSink for PrintStats {
    fn set_current_file(&self, file: &str) {
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        inner.job_id = Some(uuid::Uuid::new_v4().to_string());
        inner.filename = Some(file.to_string());
        inner.state = JobState::Standby;
        inner.started_at = None;
        inner.finished_at = None;
        inner.last_start = None;
        inner.print_duration = 0.0;
    }

    fn note_start(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        if inner.started_at.is_none() {
            inner.started_at = Some(now);
        }
        inner.last_start = Some(now);
        inner.finished_at = None;
        inner.state = JobState::Printing;
        tracing::info!("print stats: job started");
    }

    fn note_pause(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        accumulate(&mut inner, now);
        inner.state = JobState::Paused;
        tracing::info!("print stats: job paused");
    }

    fn note_cancel(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        accumulate(&mut inner, now);
        inner.finished_at = Some(now);
        inner.state = JobState::Cancelled;
        tracing::info!("print stats: job cancelled");
    }

    fn note_complete(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        accumulate(&mut inner, now);
        inner.finished_at = Some(now);
        inner.state = JobState::Complete;
        tracing::info!("print stats: job complete");
    }
}
