//! Hand-off of finished series to an external record keeper.
//!
//! The action path only enqueues a [`MatchSummary`]. A background task drains
//! the queue and calls the configured [`MatchExporter`], retrying transient
//! failures with capped exponential backoff.

mod webhook;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::random;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::domain::summary::MatchSummary;
pub use webhook::WebhookExporter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("export endpoint answered {0}")]
    Status(reqwest::StatusCode),
}

impl ExportError {
    pub fn is_transient(&self) -> bool {
        match self {
            ExportError::Transport(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            ExportError::Status(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

#[async_trait]
pub trait MatchExporter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn export(&self, summary: &MatchSummary) -> Result<(), ExportError>;
}

/// Writes the summary to the log. Used when no webhook is configured.
pub struct LogExporter;

#[async_trait]
impl MatchExporter for LogExporter {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn export(&self, summary: &MatchSummary) -> Result<(), ExportError> {
        let payload = serde_json::to_string(summary).unwrap_or_default();
        info!(
            match_id = %summary.match_id,
            winner = summary.winner_name.as_deref().unwrap_or("-"),
            summary = %payload,
            "Match summary"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay added or removed at random.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64()
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let jitter_range = capped * self.jitter;
        let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
        Duration::from_secs_f64((capped + jitter).max(0.0))
    }
}

/// Sending half of the export queue. Cheap to clone.
#[derive(Clone)]
pub struct ExportQueue {
    tx: mpsc::UnboundedSender<MatchSummary>,
}

impl ExportQueue {
    /// Queue plus its receiving end, for callers that drive the worker themselves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MatchSummary>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue drained by a worker on the current tokio runtime.
    pub fn spawn(exporter: Arc<dyn MatchExporter>, policy: RetryPolicy) -> Self {
        let (queue, rx) = Self::channel();
        tokio::spawn(run_export_worker(rx, exporter, policy));
        queue
    }

    pub fn enqueue(&self, summary: MatchSummary) {
        let match_id = summary.match_id.clone();
        if self.tx.send(summary).is_err() {
            warn!(match_id = %match_id, "Export worker is gone, summary dropped");
        }
    }
}

pub async fn run_export_worker(
    mut rx: mpsc::UnboundedReceiver<MatchSummary>,
    exporter: Arc<dyn MatchExporter>,
    policy: RetryPolicy,
) {
    info!(exporter = exporter.name(), "Export worker started");
    while let Some(summary) = rx.recv().await {
        export_with_retry(exporter.as_ref(), &summary, &policy).await;
    }
    info!("Export queue closed");
}

/// Returns whether the summary was delivered.
pub async fn export_with_retry(
    exporter: &dyn MatchExporter,
    summary: &MatchSummary,
    policy: &RetryPolicy,
) -> bool {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match exporter.export(summary).await {
            Ok(()) => {
                info!(
                    match_id = %summary.match_id,
                    exporter = exporter.name(),
                    attempt,
                    "Match exported"
                );
                return true;
            }
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay(attempt);
                warn!(
                    match_id = %summary.match_id,
                    error = %err,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Export failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                error!(
                    match_id = %summary.match_id,
                    error = %err,
                    attempt,
                    "Export failed, giving up"
                );
                return false;
            }
        }
    }
}
