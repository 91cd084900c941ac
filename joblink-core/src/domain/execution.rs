//! Execution domain types
//!
//! Handles and terminal-state classification for remote executions.

use serde::{Deserialize, Serialize};

/// Identifier the remote system assigns to one execution of a job
///
/// Returned by the submit endpoint and used as the key for all subsequent
/// polling calls. Carries no client-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionHandle(pub i64);

impl ExecutionHandle {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns true when a remote execution state counts as a failure
///
/// The failure allowlist is exactly "failed" and "aborted", compared
/// case-insensitively. Every other value, including vocabulary this client
/// has never seen, counts as success.
pub fn is_failure_state(state: &str) -> bool {
    state.eq_ignore_ascii_case("failed") || state.eq_ignore_ascii_case("aborted")
}

/// Terminal state of a remote execution, as reported by the output endpoint
///
/// The state string is remote-defined vocabulary and is passed through
/// verbatim; only the failure classification is interpreted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    state: String,
}

impl ExecutionOutcome {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
        }
    }

    /// The verbatim remote state string
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn is_failure(&self) -> bool {
        is_failure_state(&self.state)
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }
}
