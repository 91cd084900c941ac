//! Joblink CLI
//!
//! Runs a job on a remote Rundeck server, polls it to completion, and
//! streams its log output to stdout. Mirrors what a host orchestration
//! runtime would do with the library: build the client, run the polling
//! driver, and map the outcome to an exit status.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use joblink_client::{ClientConfig, LogSink, PollConfig, PollDriver, RundeckClient};
use joblink_core::descriptor::step_descriptor;

#[derive(Parser)]
#[command(name = "joblink")]
#[command(about = "Run a job on a remote Rundeck server and stream its logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a remote job and poll it to completion
    Run(RunArgs),
    /// Print the step descriptor consumed by a host runtime
    Describe,
}

#[derive(Args)]
struct RunArgs {
    /// Base URL of the remote Rundeck server
    #[arg(long, env = "JOBLINK_RUNDECK_URL")]
    url: String,

    /// Auth token with permission to run the job
    #[arg(long, env = "JOBLINK_AUTH_TOKEN")]
    token: String,

    /// Identifier of the remote job to run
    #[arg(long)]
    job_id: String,

    /// User the remote execution runs as
    #[arg(long)]
    as_user: Option<String>,

    /// Argument string passed to the remote job
    #[arg(long)]
    args: Option<String>,

    /// Seconds between completion checks
    #[arg(long, default_value_t = 30)]
    interval: u64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Accept any TLS certificate (self-signed lab servers)
    #[arg(long)]
    insecure: bool,
}

/// Prints streamed log lines, colored by sink priority
struct StdoutSink;

#[async_trait]
impl LogSink for StdoutSink {
    async fn emit(&self, priority: u8, line: &str) {
        match priority {
            0 => println!("{}", line.red()),
            1 => println!("{}", line.yellow()),
            _ => println!("{line}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "joblink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Describe => {
            println!("{}", serde_json::to_string_pretty(&step_descriptor())?);
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = ClientConfig::new(args.url, args.token)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_danger_accept_invalid_certs(args.insecure);
    config.run_as_user = args.as_user;

    let client = RundeckClient::new(config)?;

    let mut poll = PollConfig::new(args.job_id).with_poll_interval(Duration::from_secs(args.interval));
    poll.arg_string = args.args;

    // Ctrl-C aborts the session at the next wait
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match PollDriver::new(client, poll).run(&StdoutSink, cancel).await {
        Ok(outcome) => {
            println!("{}", format!("Final state: {}", outcome.state()).green().bold());
            Ok(())
        }
        Err(e) => {
            tracing::error!("{e}");
            Err(e.into())
        }
    }
}
