//! Integration tests for the poll loop's failure budget and reporting.
//!
//! Drives [`Poller`] with a scripted [`StatsSource`] and captures the
//! console output in memory.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use statwatch_agent::fetcher::{FetchError, StatsSource};
use statwatch_agent::poller::{CycleError, PollConfig, PollOutcome, Poller};
use statwatch_agent::report::ConsoleReporter;
use statwatch_core::{Alert, CoreError, Thresholds};
use tokio_util::sync::CancellationToken;

const QUIET_BODY: &str = "1,1000,100,1000,100,1000,100";
const LOUD_BODY: &str = "45,100,95,100,95,100,95";
const SAMPLE_BODY: &str =
    "12,4819661917,2328437675,469781716496,97858919593,1315809605,1245267076";

/// Replays a fixed script of responses, then fails forever with a 503.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<Result<String, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(unavailable()))
    }
}

fn ok(body: &str) -> Result<String, FetchError> {
    Ok(body.to_string())
}

fn unavailable() -> FetchError {
    FetchError::UnexpectedStatus { status: 503 }
}

fn fail() -> Result<String, FetchError> {
    Err(unavailable())
}

fn fast_config() -> PollConfig {
    PollConfig {
        interval: Duration::ZERO,
        max_failures: 3,
    }
}

type TestPoller = Poller<ScriptedSource, ConsoleReporter<Vec<u8>>>;

fn scripted_poller(script: Vec<Result<String, FetchError>>) -> TestPoller {
    Poller::new(
        ScriptedSource::new(script),
        ConsoleReporter::new(Vec::new()),
        Thresholds::default(),
        fast_config(),
    )
}

fn output(poller: &TestPoller) -> String {
    String::from_utf8(poller.reporter().get_ref().clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Test: three consecutive failures abort the loop
// ---------------------------------------------------------------------------

/// A permanently broken endpoint yields exactly one abort line and no
/// alert lines.
#[tokio::test]
async fn three_failures_abort_with_single_message() {
    let mut poller = scripted_poller(vec![]);
    let outcome = poller.run(&CancellationToken::new()).await;

    assert_eq!(outcome, PollOutcome::Aborted { failures: 3 });
    assert_eq!(poller.source().calls(), 3);
    assert_eq!(output(&poller), "Unable to fetch server statistic.\n");
}

/// Malformed payloads count against the same budget as transport errors.
#[tokio::test]
async fn parse_failures_count_against_budget() {
    let mut poller = scripted_poller(vec![ok("1,2,3"), ok("a,b,c,d,e,f,g"), fail()]);
    let outcome = poller.run(&CancellationToken::new()).await;

    assert_eq!(outcome, PollOutcome::Aborted { failures: 3 });
    assert_eq!(poller.source().calls(), 3);
    assert_eq!(output(&poller), "Unable to fetch server statistic.\n");
}

// ---------------------------------------------------------------------------
// Test: a success resets the failure counter
// ---------------------------------------------------------------------------

/// fail, success, then the loop must survive exactly three more failures.
#[tokio::test]
async fn success_resets_failure_budget() {
    let mut poller = scripted_poller(vec![fail(), ok(QUIET_BODY)]);
    let outcome = poller.run(&CancellationToken::new()).await;

    assert_eq!(outcome, PollOutcome::Aborted { failures: 3 });
    // 1 failure + 1 success + 3 failures.
    assert_eq!(poller.source().calls(), 5);
    assert_eq!(output(&poller), "Unable to fetch server statistic.\n");
}

/// Two failures followed by a success must not carry over to the next run
/// of failures.
#[tokio::test]
async fn near_exhausted_budget_is_reset_by_success() {
    let mut poller = scripted_poller(vec![fail(), fail(), ok(QUIET_BODY), fail(), fail()]);
    let outcome = poller.run(&CancellationToken::new()).await;

    assert_eq!(outcome, PollOutcome::Aborted { failures: 3 });
    assert_eq!(poller.source().calls(), 6);
}

// ---------------------------------------------------------------------------
// Test: alerts are printed in rule order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn alerts_are_reported_in_rule_order() {
    let mut poller = scripted_poller(vec![ok(LOUD_BODY), ok(SAMPLE_BODY)]);
    poller.run(&CancellationToken::new()).await;

    assert_eq!(
        output(&poller),
        "Load Average is too high: 45\n\
         Memory usage too high: 95%\n\
         Free disk space is too low: 0 Mb left\n\
         Network bandwidth usage high: 0 Mbit/s available\n\
         Network bandwidth usage high: 538 Mbit/s available\n\
         Unable to fetch server statistic.\n"
    );
}

// ---------------------------------------------------------------------------
// Test: single cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_once_returns_alerts_without_touching_budget() {
    let poller = scripted_poller(vec![ok(SAMPLE_BODY), fail(), ok("1,2")]);

    let alerts = poller.poll_once().await.unwrap();
    assert_eq!(alerts, vec![Alert::NetworkBandwidth { free_mbit: 538 }]);

    assert_matches!(
        poller.poll_once().await,
        Err(CycleError::Fetch(FetchError::UnexpectedStatus { status: 503 }))
    );
    assert_matches!(
        poller.poll_once().await,
        Err(CycleError::Parse(CoreError::FieldCount { actual: 2, .. }))
    );

    assert_eq!(poller.consecutive_failures(), 0);
    assert_eq!(output(&poller), "");
}

// ---------------------------------------------------------------------------
// Test: cancellation and timing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_token_stops_without_abort_message() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut poller = scripted_poller(vec![]);
    let outcome = poller.run(&cancel).await;

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(output(&poller), "");
}

/// The loop sleeps between cycles but not after the final failure.
#[tokio::test(start_paused = true)]
async fn sleeps_interval_between_failed_cycles() {
    let mut poller = Poller::new(
        ScriptedSource::new(vec![]),
        ConsoleReporter::new(Vec::new()),
        Thresholds::default(),
        PollConfig {
            interval: Duration::from_secs(5),
            max_failures: 3,
        },
    );

    let start = tokio::time::Instant::now();
    let outcome = poller.run(&CancellationToken::new()).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, PollOutcome::Aborted { failures: 3 });
    assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(15), "elapsed {elapsed:?}");
}

/// A healthy endpoint keeps the loop alive until it is cancelled mid-sleep.
#[tokio::test(start_paused = true)]
async fn cancel_during_sleep_ends_healthy_loop() {
    let script = (0..100).map(|_| ok(QUIET_BODY)).collect();
    let mut poller = Poller::new(
        ScriptedSource::new(script),
        ConsoleReporter::new(Vec::new()),
        Thresholds::default(),
        PollConfig {
            interval: Duration::from_secs(5),
            max_failures: 3,
        },
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.cancel();
    });

    let outcome = poller.run(&cancel).await;

    assert_eq!(outcome, PollOutcome::Cancelled);
    // Polls at t = 0s, 5s and 10s.
    assert_eq!(poller.source().calls(), 3);
    assert_eq!(poller.reporter().get_ref().len(), 0);
}
