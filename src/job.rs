//! Streaming map-generation job.
//!
//! The server emits `log`, `progress`, `error` and `complete` events for one
//! advisory. A [`GenerationJob`] tracks them in a [`JobMonitor`] and can be
//! cancelled at any time; once cancelled, nothing that still arrives on the
//! stream is applied or reported.

use std::time::Duration;

use anyhow::Result;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::DashboardApi;
use crate::error::JobError;
use crate::types::Advisory;

/// Event stream returned by the generation endpoint.
pub type JobStream = BoxStream<'static, Result<JobEvent>>;

/// Severity tag of a log line emitted by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogSeverity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl LogSeverity {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogSeverity::Info => "info",
            LogSeverity::Success => "success",
            LogSeverity::Warning => "warning",
            LogSeverity::Error => "error",
        }
    }
}

impl From<String> for LogSeverity {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => LogSeverity::Success,
            "warning" | "warn" => LogSeverity::Warning,
            "error" => LogSeverity::Error,
            _ => LogSeverity::Info,
        }
    }
}

impl From<LogSeverity> for String {
    fn from(s: LogSeverity) -> Self { s.to_str().to_string() }
}

/// One frame of the generation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobEvent {
    Log {
        #[serde(default)]
        message: String,
        #[serde(default)]
        severity: LogSeverity,
    },
    Progress {
        current: u64,
        total: u64,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Complete {
        #[serde(default)]
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Latest progress report and when the job started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobProgress {
    pub current: u64,
    pub total: u64,
    pub started: Instant,
}

impl JobProgress {
    /// Completed share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { return 0.0 }
        (self.current as f64 / self.total as f64).min(1.0)
    }

    /// Remaining time, extrapolated linearly from the elapsed time.
    /// `None` before the first step, or when the estimate is not representable.
    pub fn eta(&self, now: Instant) -> Option<Duration> {
        if self.current == 0 { return None }
        let remaining = self.total.saturating_sub(self.current);
        let elapsed = now.saturating_duration_since(self.started);
        let secs = elapsed.as_secs_f64() / self.current as f64 * remaining as f64;
        Duration::try_from_secs_f64(secs).ok()
    }
}

/// State of one generation run.
#[derive(Debug, Default)]
pub struct JobMonitor {
    status: JobStatus,
    started: Option<Instant>,
    progress: Option<JobProgress>,
    last_message: Option<String>,
}

impl JobMonitor {
    #[inline] pub fn status(&self) -> JobStatus { self.status }
    #[inline] pub fn progress(&self) -> Option<JobProgress> { self.progress }
    #[inline] pub fn last_message(&self) -> Option<&str> { self.last_message.as_deref() }

    /// While running, the dashboard disables other generation requests.
    #[inline]
    pub fn is_locked(&self) -> bool { self.status == JobStatus::Running }

    pub fn start(&mut self, now: Instant) {
        *self = Self { status: JobStatus::Running, started: Some(now), ..Self::default() };
    }

    /// Apply an event. Returns false when the job is no longer running and
    /// the event was discarded.
    pub fn apply(&mut self, event: &JobEvent) -> bool {
        if self.status != JobStatus::Running { return false }
        match event {
            JobEvent::Log { message, .. } => self.last_message = Some(message.clone()),
            JobEvent::Progress { current, total } => {
                let started = self.started.unwrap_or_else(Instant::now);
                self.progress = Some(JobProgress { current: *current, total: *total, started });
            }
            JobEvent::Error { message } => {
                self.status = JobStatus::Failed;
                self.last_message = Some(message.clone());
            }
            JobEvent::Complete { message } => {
                self.status = JobStatus::Completed;
                self.last_message = Some(message.clone());
            }
        }
        true
    }

    pub fn fail(&mut self, message: String) {
        if self.status == JobStatus::Running {
            self.status = JobStatus::Failed;
            self.last_message = Some(message);
        }
    }

    /// Leave the running state. Returns whether a run was in progress.
    pub fn cancel(&mut self) -> bool {
        if self.status != JobStatus::Running { return false }
        self.status = JobStatus::Cancelled;
        true
    }
}

/// Cancellable map generation for one advisory.
pub struct GenerationJob {
    advisory: Advisory,
    monitor: Mutex<JobMonitor>,
    cancel: watch::Sender<bool>,
}

impl GenerationJob {
    /// Only red and orange advisories are eligible.
    pub fn new(advisory: Advisory) -> Result<Self, JobError> {
        if !advisory.color.allows_map_generation() {
            return Err(JobError::NotEligible { advisory: advisory.id, color: advisory.color });
        }
        let (cancel, _) = watch::channel(false);
        Ok(Self { advisory, monitor: Mutex::new(JobMonitor::default()), cancel })
    }

    #[inline] pub fn advisory(&self) -> &Advisory { &self.advisory }
    pub fn status(&self) -> JobStatus { self.monitor.lock().status() }
    pub fn progress(&self) -> Option<JobProgress> { self.monitor.lock().progress() }
    pub fn last_message(&self) -> Option<String> { self.monitor.lock().last_message().map(str::to_string) }

    /// Stream the job to completion, passing every applied event to
    /// `on_event`. Returns the final status.
    pub async fn run<A, F>(&self, api: &A, mut on_event: F) -> Result<JobStatus>
    where
        A: DashboardApi + ?Sized,
        F: FnMut(&JobEvent),
    {
        {
            let mut monitor = self.monitor.lock();
            if monitor.is_locked() {
                return Err(JobError::AlreadyRunning.into());
            }
            monitor.start(Instant::now());
        }
        self.cancel.send_replace(false);
        let mut cancelled = self.cancel.subscribe();
        info!(advisory = self.advisory.id, "map generation started");

        let mut stream = match api.start_generation(self.advisory.id).await {
            Ok(stream) => stream,
            Err(e) => {
                self.monitor.lock().fail(e.to_string());
                return Err(e.context(format!("Failed to start map generation for advisory {}", self.advisory.id)));
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancelled.wait_for(|c| *c) => break,
                next = stream.next() => next,
            };
            match next {
                Some(Ok(event)) => {
                    let applied = self.monitor.lock().apply(&event);
                    if !applied {
                        debug!(advisory = self.advisory.id, ?event, "discarding event after job ended");
                        break;
                    }
                    on_event(&event);
                    if self.status().is_terminal() { break }
                }
                Some(Err(e)) => {
                    warn!(advisory = self.advisory.id, error = %e, "map generation stream failed");
                    self.monitor.lock().fail(e.to_string());
                    break;
                }
                None => {
                    self.monitor.lock().fail("stream closed before completion".to_string());
                    break;
                }
            }
        }

        let status = self.status();
        info!(advisory = self.advisory.id, ?status, "map generation finished");
        Ok(status)
    }

    /// Leave the running state immediately and ask the server to stop.
    /// Events still in flight are discarded.
    pub async fn cancel<A: DashboardApi + ?Sized>(&self, api: &A) -> Result<()> {
        if !self.monitor.lock().cancel() {
            debug!(advisory = self.advisory.id, "cancel requested with no job running");
            return Ok(());
        }
        self.cancel.send_replace(true);
        info!(advisory = self.advisory.id, "map generation cancelled");
        api.cancel_generation(self.advisory.id).await
    }
}
