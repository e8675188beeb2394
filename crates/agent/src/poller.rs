//! Fetch -> parse -> evaluate -> report loop.
//!
//! [`Poller::run`] polls a [`StatsSource`] on a fixed interval, prints
//! alerts through a [`Reporter`], and gives up once the
//! [`FailureBudget`] of consecutive failed cycles is spent.  A successful
//! cycle resets the budget.  The loop is the error boundary: fetch and
//! parse errors are logged and counted, never propagated.

use std::time::Duration;

use serde::Serialize;
use statwatch_core::{evaluate, stats, Alert, CoreError, Thresholds};
use tokio_util::sync::CancellationToken;

use crate::fetcher::{FetchError, StatsSource};
use crate::report::Reporter;

/// Timing and failure-tolerance parameters for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between cycles.
    pub interval: Duration,
    /// Consecutive failed cycles that end the loop.
    pub max_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_failures: 3,
        }
    }
}

/// Why a single cycle produced no stats.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed stats payload: {0}")]
    Parse(#[from] CoreError),
}

/// How [`Poller::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The failure budget was exhausted.
    Aborted { failures: u32 },
    /// The cancellation token fired.
    Cancelled,
}

/// Counts consecutive failed cycles against a fixed limit.
#[derive(Debug, Clone)]
pub struct FailureBudget {
    limit: u32,
    consecutive: u32,
}

impl FailureBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            consecutive: 0,
        }
    }

    /// Record one failure. Returns `true` once the budget is exhausted.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.is_exhausted()
    }

    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive >= self.limit
    }
}

/// Drives the poll loop for one stats source.
pub struct Poller<S, R> {
    source: S,
    reporter: R,
    thresholds: Thresholds,
    config: PollConfig,
    budget: FailureBudget,
}

impl<S: StatsSource, R: Reporter> Poller<S, R> {
    pub fn new(source: S, reporter: R, thresholds: Thresholds, config: PollConfig) -> Self {
        Self {
            source,
            reporter,
            thresholds,
            budget: FailureBudget::new(config.max_failures),
            config,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current consecutive failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.budget.consecutive()
    }

    /// Run one fetch + parse + evaluate cycle without touching the budget.
    pub async fn poll_once(&self) -> Result<Vec<Alert>, CycleError> {
        let body = self.source.fetch().await?;
        let stats = stats::parse(&body)?;
        tracing::debug!(stats = %to_json(&stats), "Fetched server stats");
        Ok(evaluate(&stats, &self.thresholds))
    }

    /// Poll until the failure budget is exhausted or `cancel` fires.
    pub async fn run(&mut self, cancel: &CancellationToken) -> PollOutcome {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            max_failures = self.budget.limit(),
            "Poll loop started",
        );

        loop {
            let cycle = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(),
                cycle = self.poll_once() => cycle,
            };

            match cycle {
                Ok(alerts) => {
                    self.budget.reset();
                    for alert in &alerts {
                        tracing::warn!(
                            metric = alert.metric_name(),
                            alert = %to_json(alert),
                            "{alert}",
                        );
                        self.reporter.alert(alert);
                    }
                }
                Err(e) => {
                    let exhausted = self.budget.record_failure();
                    tracing::warn!(
                        error = %e,
                        consecutive_failures = self.budget.consecutive(),
                        max_failures = self.budget.limit(),
                        "Poll cycle failed",
                    );
                    if exhausted {
                        tracing::error!(
                            failures = self.budget.consecutive(),
                            "Failure budget exhausted, stopping",
                        );
                        self.reporter.unable_to_fetch();
                        return PollOutcome::Aborted {
                            failures: self.budget.consecutive(),
                        };
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    fn cancelled(&self) -> PollOutcome {
        tracing::info!("Poll loop cancelled");
        PollOutcome::Cancelled
    }
}

/// JSON form of a log payload; a serialization error becomes a placeholder.
fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
