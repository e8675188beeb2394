//! `statwatch-agent` -- periodic health monitor for a remote host.
//!
//! Polls the host's `_stats` endpoint, prints a warning line for every
//! exceeded threshold, and exits after too many consecutive failed polls.
//! Configuration comes from the environment (see
//! [`AgentConfig::from_env`](statwatch_agent::config::AgentConfig::from_env));
//! a `.env` file is loaded first when present.
//!
//! Alert lines go to stdout; diagnostics go to stderr, filtered by
//! `RUST_LOG` (default `statwatch_agent=info`).
//!
//! # Exit codes
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | `0`  | Stopped by Ctrl-C                         |
//! | `1`  | Gave up after too many failed polls       |
//! | `2`  | Invalid configuration or HTTP client setup |

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use statwatch_agent::config::AgentConfig;
use statwatch_agent::fetcher::HttpStatsFetcher;
use statwatch_agent::poller::{PollOutcome, Poller};
use statwatch_agent::report::ConsoleReporter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statwatch_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        url = %config.stats_url,
        interval_secs = config.poll_interval.as_secs(),
        max_failures = config.max_consecutive_failures,
        "Starting statwatch-agent",
    );

    let fetcher = match HttpStatsFetcher::new(config.stats_url.clone(), config.request_timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::from(2);
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_ctrl_c(cancel.clone()));

    let mut poller = Poller::new(
        fetcher,
        ConsoleReporter::stdout(),
        config.thresholds.clone(),
        config.poll_config(),
    );

    match poller.run(&cancel).await {
        PollOutcome::Aborted { .. } => ExitCode::FAILURE,
        PollOutcome::Cancelled => ExitCode::SUCCESS,
    }
}

/// Cancel `token` on the first Ctrl-C.
async fn shutdown_on_ctrl_c(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl-C, shutting down");
            token.cancel();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    }
}
