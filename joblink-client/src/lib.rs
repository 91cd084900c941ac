//! Joblink Rundeck client
//!
//! A type-safe HTTP client for running jobs on a remote Rundeck server and
//! polling them to completion.
//!
//! The client covers the three API endpoints the job-reference step needs
//! (submit, completion state, log output) and the [`PollDriver`] ties them
//! together into a cancellable polling loop that streams log entries to a
//! caller-provided sink.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use joblink_client::{ClientConfig, LogSink, PollConfig, PollDriver, RundeckClient};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Stdout;
//!
//! #[async_trait::async_trait]
//! impl LogSink for Stdout {
//!     async fn emit(&self, priority: u8, line: &str) {
//!         println!("[{priority}] {line}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://rundeck.example.com", "aTokenWithRunPermission");
//!     let client = RundeckClient::new(config)?;
//!
//!     let poll = PollConfig::new("3f9a2c1e-5a84-4b2f-9c41-1d2e3f4a5b6c")
//!         .with_poll_interval(Duration::from_secs(10));
//!
//!     let outcome = PollDriver::new(client, poll)
//!         .run(&Stdout, CancellationToken::new())
//!         .await?;
//!     println!("final state: {}", outcome.state());
//!     Ok(())
//! }
//! ```

pub mod error;
mod executions;
pub mod poll;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use joblink_core::domain::execution::{ExecutionHandle, ExecutionOutcome};
pub use joblink_core::domain::log::ExecutionLogEntry;
pub use poll::{LogSink, PollConfig, PollDriver, PollError};

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

/// Remote API version this client is built against
pub const API_VERSION: u32 = 20;

/// Header carrying the auth token on every request
const AUTH_TOKEN_HEADER: &str = "x-rundeck-auth-token";

/// Configuration for [`RundeckClient`]
///
/// One struct with defaulted fields instead of a constructor per variation.
/// TLS verification is strict unless `danger_accept_invalid_certs` is set;
/// accepting arbitrary certificates is an explicit opt-in for lab setups
/// talking to self-signed servers.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote Rundeck server (e.g. "https://rundeck.example.com")
    pub base_url: String,
    /// Auth token with permission to run the referenced job
    pub token: String,
    /// Optional user the remote execution runs as
    pub run_as_user: Option<String>,
    /// Bound on connect, request, and socket waits alike
    pub timeout: Duration,
    /// Accept any server certificate and skip hostname verification
    pub danger_accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Creates a configuration with default timeout (30s) and strict TLS
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            run_as_user: None,
            timeout: Duration::from_secs(30),
            danger_accept_invalid_certs: false,
        }
    }

    pub fn with_run_as_user(mut self, user: impl Into<String>) -> Self {
        self.run_as_user = Some(user.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base_url cannot be empty".into()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "base_url must start with http:// or https://".into(),
            ));
        }

        if self.token.is_empty() {
            return Err(ClientError::InvalidConfig("token cannot be empty".into()));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

/// HTTP client for the remote Rundeck API
///
/// Every request carries `Accept: application/json` and the auth token
/// header. Responses are fully buffered and parsed as one JSON document.
/// There are no automatic retries: a failed request surfaces immediately and
/// the caller decides whether to resubmit the whole job.
#[derive(Debug, Clone)]
pub struct RundeckClient {
    /// Base URL of the remote server, without trailing slash
    base_url: String,
    /// User the remote execution runs as, if configured
    run_as_user: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl RundeckClient {
    /// Builds a client from a validated configuration
    ///
    /// Connect and request timeouts are both bound to the configured value
    /// and TCP keep-alive is enabled on pooled connections.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(&config.token).map_err(|_| {
            ClientError::InvalidConfig("token contains characters not allowed in a header".into())
        })?;
        headers.insert(AUTH_TOKEN_HEADER, token);

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .tcp_keepalive(Some(Duration::from_secs(60)));

        if config.danger_accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for {}", config.base_url);
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            run_as_user: config.run_as_user,
            client: builder.build()?,
        })
    }

    /// Get the base URL of the remote server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an [`ClientError::Api`] for non-2xx
    /// answers; a body that does not match the expected shape (missing field,
    /// wrong type, not JSON at all) is a [`ClientError::Protocol`].
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("failed to parse JSON response: {e}")))
    }
}
