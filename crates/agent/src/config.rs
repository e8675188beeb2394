//! Agent configuration.
//!
//! Loaded from environment variables with defaults matching the agent's
//! historical constants. See [`AgentConfig::from_env`] for the table.

use std::time::Duration;

use statwatch_core::{CoreError, Thresholds};

use crate::poller::PollConfig;

pub const DEFAULT_STATS_URL: &str = "http://srv.msk01.gigacorp.local/_stats";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading [`AgentConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid thresholds: {0}")]
    Thresholds(#[from] CoreError),
}

/// Agent configuration loaded from environment variables.
///
/// Every field has a default matching the agent's historical constants.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Stats endpoint polled every cycle.
    pub stats_url: String,
    /// Pause between poll cycles.
    pub poll_interval: Duration,
    /// Consecutive failed cycles tolerated before giving up.
    pub max_consecutive_failures: u32,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    pub thresholds: Thresholds,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            stats_url: DEFAULT_STATS_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            thresholds: Thresholds::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                                  |
    /// |----------------------------|------------------------------------------|
    /// | `STATS_URL`                | `http://srv.msk01.gigacorp.local/_stats` |
    /// | `POLL_INTERVAL_SECS`       | `5`                                      |
    /// | `MAX_CONSECUTIVE_FAILURES` | `3`                                      |
    /// | `REQUEST_TIMEOUT_SECS`     | `10`                                     |
    /// | `LOAD_AVERAGE_THRESHOLD`   | `30`                                     |
    /// | `MEMORY_USAGE_THRESHOLD`   | `80`                                     |
    /// | `DISK_USAGE_THRESHOLD`     | `90`                                     |
    /// | `NETWORK_USAGE_THRESHOLD`  | `90`                                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let stats_url = lookup("STATS_URL").unwrap_or(defaults.stats_url);
        validate_url(&stats_url)?;

        let poll_interval_secs: u64 =
            parse_var(&lookup, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "POLL_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1",
            });
        }

        let max_consecutive_failures: u32 = parse_var(
            &lookup,
            "MAX_CONSECUTIVE_FAILURES",
            DEFAULT_MAX_CONSECUTIVE_FAILURES,
        )?;
        if max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONSECUTIVE_FAILURES",
                value: "0".into(),
                reason: "must be at least 1",
            });
        }

        let request_timeout_secs: u64 =
            parse_var(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "REQUEST_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1",
            });
        }

        let thresholds = Thresholds {
            load_average: parse_var(
                &lookup,
                "LOAD_AVERAGE_THRESHOLD",
                defaults.thresholds.load_average,
            )?,
            memory_used_percent: parse_var(
                &lookup,
                "MEMORY_USAGE_THRESHOLD",
                defaults.thresholds.memory_used_percent,
            )?,
            disk_used_percent: parse_var(
                &lookup,
                "DISK_USAGE_THRESHOLD",
                defaults.thresholds.disk_used_percent,
            )?,
            network_used_percent: parse_var(
                &lookup,
                "NETWORK_USAGE_THRESHOLD",
                defaults.thresholds.network_used_percent,
            )?,
        };
        thresholds.validate()?;

        Ok(Self {
            stats_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_consecutive_failures,
            request_timeout: Duration::from_secs(request_timeout_secs),
            thresholds,
        })
    }

    /// The slice of configuration the poll loop needs.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            max_failures: self.max_consecutive_failures,
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            reason: "not a valid number",
        }),
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &'static str| ConfigError::Invalid {
        key: "STATS_URL",
        value: url.to_string(),
        reason,
    };

    let parsed = reqwest::Url::parse(url).map_err(|_| invalid("not an absolute URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid("scheme must be http or https")),
    }
}
