//! Simulated quote submission: a fixed sequence of status messages followed by
//! a finalising pause, published on a watch channel.

use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

pub const STANDARD_MESSAGES: [&str; 4] = [
    "Getting your rates",
    "Preparing your quote",
    "Sending confirmation",
    "Almost there...",
];

pub const STEP_DURATION: Duration = Duration::from_millis(800);
pub const FINALIZE_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTimeline {
    pub messages: Vec<String>,
    pub step_duration: Duration,
    pub finalize_duration: Duration,
}

impl SubmissionTimeline {
    pub fn standard() -> Self {
        Self::with_durations(STEP_DURATION, FINALIZE_DURATION)
    }

    /// Standard messages with custom pacing.
    pub fn with_durations(step_duration: Duration, finalize_duration: Duration) -> Self {
        Self {
            messages: STANDARD_MESSAGES.iter().map(|m| m.to_string()).collect(),
            step_duration,
            finalize_duration,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.step_duration * self.messages.len() as u32 + self.finalize_duration
    }
}

impl Default for SubmissionTimeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    /// `step` is one-based.
    Running {
        step: usize,
        total: usize,
        message: String,
    },
    Finalizing,
    Complete,
    Cancelled,
}

impl SubmissionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, SubmissionStatus::Complete | SubmissionStatus::Cancelled)
    }
}

/// A running submission. Dropping the handle stops the timeline.
pub struct SubmissionHandle {
    status: Arc<watch::Sender<SubmissionStatus>>,
    task: JoinHandle<()>,
}

impl SubmissionHandle {
    /// Start `timeline` on the current tokio runtime.
    pub fn spawn(timeline: SubmissionTimeline) -> Self {
        let (tx, _rx) = watch::channel(SubmissionStatus::Pending);
        let status = Arc::new(tx);
        let task = tokio::spawn(run(timeline, status.clone()));
        Self { status, task }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Stop the timeline. A submission that already finished keeps its status.
    pub fn cancel(&self) {
        self.task.abort();
        let cancelled = self.status.send_if_modified(|status| {
            if status.is_finished() {
                false
            } else {
                *status = SubmissionStatus::Cancelled;
                true
            }
        });
        if cancelled {
            info!("submission cancelled");
        }
    }

    /// Wait until the submission completes or is cancelled.
    pub async fn finished(&self) -> SubmissionStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(SubmissionStatus::is_finished).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }
}

impl Drop for SubmissionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(timeline: SubmissionTimeline, status: Arc<watch::Sender<SubmissionStatus>>) {
    let total = timeline.messages.len();
    for (index, message) in timeline.messages.into_iter().enumerate() {
        debug!(step = index + 1, %message, "submission progress");
        status.send_replace(SubmissionStatus::Running {
            step: index + 1,
            total,
            message,
        });
        tokio::time::sleep(timeline.step_duration).await;
    }

    status.send_replace(SubmissionStatus::Finalizing);
    tokio::time::sleep(timeline.finalize_duration).await;
    status.send_replace(SubmissionStatus::Complete);
    info!("submission complete");
}
