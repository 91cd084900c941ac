//! Execution API endpoints
//!
//! The three endpoints the job-reference step consumes: job submission,
//! completion state, and log output (which also carries the execution state
//! string). The state and output endpoints are independent on the remote
//! side and are only eventually consistent with each other.

use chrono::{DateTime, Utc};
use joblink_core::domain::execution::ExecutionHandle;
use joblink_core::domain::log::ExecutionLogEntry;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::{API_VERSION, RundeckClient};

#[derive(Debug, Deserialize)]
struct SubmittedExecution {
    id: ExecutionHandle,
}

#[derive(Debug, Deserialize)]
struct ExecutionState {
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct ExecutionOutput {
    entries: Vec<ExecutionLogEntry>,
}

#[derive(Debug, Deserialize)]
struct ExecutionOutputState {
    #[serde(rename = "execState")]
    exec_state: String,
}

impl RundeckClient {
    /// Submits one run of the referenced job
    ///
    /// POSTs a form-urlencoded body to the executions endpoint. `argString`
    /// is included only when the argument string is non-empty after trimming,
    /// and `asUser` only when the configured run-as user is non-empty after
    /// trimming.
    ///
    /// # Returns
    /// The execution handle the remote system assigned to this run
    pub async fn run_job(
        &self,
        job_id: &str,
        arg_string: Option<&str>,
    ) -> Result<ExecutionHandle> {
        let url = format!(
            "{}/api/{}/job/{}/executions",
            self.base_url, API_VERSION, job_id
        );

        let mut form: Vec<(&str, &str)> = Vec::new();
        if let Some(args) = arg_string
            && !args.trim().is_empty()
        {
            form.push(("argString", args));
        }
        if let Some(user) = self.run_as_user.as_deref()
            && !user.trim().is_empty()
        {
            form.push(("asUser", user));
        }

        debug!("submitting job {} with {} form field(s)", job_id, form.len());
        let response = self.client.post(&url).form(&form).send().await?;
        let submitted: SubmittedExecution = self.handle_response(response).await?;

        Ok(submitted.id)
    }

    /// Whether the execution has completed
    ///
    /// Reflects the state endpoint at the moment of the call; it is not
    /// guaranteed to agree with the output endpoint queried moments later.
    pub async fn is_complete(&self, execution: ExecutionHandle) -> Result<bool> {
        let url = format!(
            "{}/api/{}/execution/{}/state",
            self.base_url, API_VERSION, execution
        );
        let response = self.client.get(&url).send().await?;
        let state: ExecutionState = self.handle_response(response).await?;

        Ok(state.completed)
    }

    /// Fetches log entries newer than the given watermark
    ///
    /// Parses the output endpoint's `entries` array in the order the remote
    /// system returned it (no re-sorting; the API is trusted to keep entries
    /// in non-decreasing time order within one response) and keeps entries
    /// whose absolute time is strictly greater than `watermark`.
    ///
    /// # Returns
    /// The kept entries plus the watermark to use for the next call: the
    /// absolute time of the last kept entry, or the input watermark unchanged
    /// when nothing was newer.
    pub async fn fetch_new_entries(
        &self,
        execution: ExecutionHandle,
        watermark: DateTime<Utc>,
    ) -> Result<(Vec<ExecutionLogEntry>, DateTime<Utc>)> {
        let url = format!(
            "{}/api/{}/execution/{}/output",
            self.base_url, API_VERSION, execution
        );
        let response = self.client.get(&url).send().await?;
        let output: ExecutionOutput = self.handle_response(response).await?;

        let entries: Vec<ExecutionLogEntry> = output
            .entries
            .into_iter()
            .filter(|entry| entry.absolute_time > watermark)
            .collect();

        let next_watermark = entries
            .last()
            .map(|entry| entry.absolute_time)
            .unwrap_or(watermark);

        debug!(
            "execution {}: {} entrie(s) past watermark",
            execution,
            entries.len()
        );

        Ok((entries, next_watermark))
    }

    /// Reads the execution state string from the output endpoint
    ///
    /// The vocabulary is remote-defined ("succeeded", "failed", "aborted",
    /// and possibly more); the value is passed through verbatim, never
    /// rejected.
    pub async fn final_state(&self, execution: ExecutionHandle) -> Result<String> {
        let url = format!(
            "{}/api/{}/execution/{}/output",
            self.base_url, API_VERSION, execution
        );
        let response = self.client.get(&url).send().await?;
        let output: ExecutionOutputState = self.handle_response(response).await?;

        Ok(output.exec_state)
    }
}
