//! Polling driver
//!
//! Drives one remote execution to its terminal state: submit the job, then
//! on a fixed interval check completion and stream any new log entries to a
//! caller-provided sink, and finally classify the execution state. One
//! execution per invocation; there is no concurrent multi-job polling.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use joblink_core::domain::execution::{ExecutionHandle, ExecutionOutcome};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ClientError;
use crate::RundeckClient;

/// Receiver for streamed log lines
///
/// `priority` is the numeric sink priority (lower values denote higher
/// urgency). Emission is best effort: implementations swallow their own
/// write failures so a broken sink never aborts the polling session.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn emit(&self, priority: u8, line: &str);
}

/// Configuration for one polling session
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Identifier of the remote job to run
    pub job_id: String,
    /// Optional argument string passed to the remote job
    pub arg_string: Option<String>,
    /// Wait between poll cycles
    pub poll_interval: Duration,
}

impl PollConfig {
    /// Creates a session configuration with the default 30s poll interval
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            arg_string: None,
            poll_interval: Duration::from_secs(30),
        }
    }

    pub fn with_arg_string(mut self, arg_string: impl Into<String>) -> Self {
        self.arg_string = Some(arg_string.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Errors a polling session can end with
///
/// `JobFailed` is deliberately distinct from `Client`: the host can report
/// "the referenced job failed" versus "could not reach the remote system".
#[derive(Debug, Error)]
pub enum PollError {
    /// The remote execution reached a failure state (failed or aborted)
    #[error("job {job_id} on {base_url} finished as \"{state}\" (execution {execution})")]
    JobFailed {
        job_id: String,
        base_url: String,
        execution: ExecutionHandle,
        state: String,
    },

    /// Transport or protocol failure; the session aborts immediately
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The polling wait was cancelled
    #[error("polling was cancelled")]
    Cancelled,
}

/// Caller-facing polling loop over a single execution
pub struct PollDriver {
    client: RundeckClient,
    config: PollConfig,
}

impl PollDriver {
    pub fn new(client: RundeckClient, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Runs the referenced job to completion, streaming logs to `sink`
    ///
    /// Every poll cycle checks the completion flag and fetches log entries
    /// past the current watermark, so logs stream incrementally rather than
    /// arriving only at the end. The watermark starts at the epoch and only
    /// ever advances, which is the sole duplicate-suppression mechanism.
    ///
    /// The output endpoint can lag the state endpoint's completed flag, so
    /// one extra poll interval passes before the final state is read. That
    /// narrows the race, it does not eliminate it.
    ///
    /// Returns the terminal outcome on success; a `failed` or `aborted`
    /// execution state (case-insensitive) is an `Err(PollError::JobFailed)`.
    /// Cancelling the token aborts the session at the next wait.
    pub async fn run(
        &self,
        sink: &dyn LogSink,
        cancel: CancellationToken,
    ) -> Result<ExecutionOutcome, PollError> {
        let execution = self
            .client
            .run_job(&self.config.job_id, self.config.arg_string.as_deref())
            .await?;
        info!(
            "job {} submitted as execution {}",
            self.config.job_id, execution
        );

        let mut watermark = DateTime::<Utc>::UNIX_EPOCH;
        loop {
            self.wait(&cancel).await?;

            let completed = self.client.is_complete(execution).await?;
            let (entries, next_watermark) =
                self.client.fetch_new_entries(execution, watermark).await?;
            debug!(
                "execution {}: completed={}, {} new entrie(s)",
                execution,
                completed,
                entries.len()
            );
            watermark = next_watermark;

            for entry in &entries {
                sink.emit(entry.severity().priority(), &entry.log).await;
            }

            if completed {
                break;
            }
        }

        // The output endpoint may still report a stale execution state right
        // after the completed flag flips; give it one more interval.
        self.wait(&cancel).await?;

        let outcome = ExecutionOutcome::new(self.client.final_state(execution).await?);
        if outcome.is_failure() {
            return Err(PollError::JobFailed {
                job_id: self.config.job_id.clone(),
                base_url: self.client.base_url().to_string(),
                execution,
                state: outcome.state().to_string(),
            });
        }

        info!(
            "execution {} finished as \"{}\"",
            execution,
            outcome.state()
        );
        Ok(outcome)
    }

    /// One cancellable poll-interval wait
    async fn wait(&self, cancel: &CancellationToken) -> Result<(), PollError> {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(PollError::Cancelled),
            _ = tokio::time::sleep(self.config.poll_interval) => Ok(()),
        }
    }
}
