//! Threshold evaluation engine for server stats.
//!
//! Pure logic -- no I/O. The caller fetches and parses the payload, passes
//! the snapshot in, and decides what to do with the returned alerts.
//!
//! Every rule is independent. A rule whose inputs are inconsistent (zero
//! denominator, used > total) is skipped for that poll: it produces no
//! alert and is not an error.

use crate::alert::Alert;
use crate::error::CoreError;
use crate::stats::ServerStats;
use crate::units::{bytes_per_sec_to_mbit, bytes_to_mb, used_percent};

/// Threshold values the evaluator compares against.
///
/// Percent thresholds are strict: an alert fires only when usage is
/// above the value, never when it is equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub load_average: u64,
    pub memory_used_percent: f64,
    pub disk_used_percent: f64,
    pub network_used_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            load_average: 30,
            memory_used_percent: 80.0,
            disk_used_percent: 90.0,
            network_used_percent: 90.0,
        }
    }
}

impl Thresholds {
    /// Check that every percent threshold lies within `[0, 100]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_percent(self.memory_used_percent, "memory_used_percent")?;
        validate_percent(self.disk_used_percent, "disk_used_percent")?;
        validate_percent(self.network_used_percent, "network_used_percent")?;
        Ok(())
    }
}

/// Validate that a value falls within `[0.0, 100.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range.
pub fn validate_percent(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Evaluate one snapshot and return its violations in rule order:
/// load average, memory, disk, network.
pub fn evaluate(stats: &ServerStats, thresholds: &Thresholds) -> Vec<Alert> {
    [
        check_load_average(stats, thresholds),
        check_memory(stats, thresholds),
        check_disk(stats, thresholds),
        check_network(stats, thresholds),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn check_load_average(stats: &ServerStats, thresholds: &Thresholds) -> Option<Alert> {
    (stats.load_average > thresholds.load_average).then_some(Alert::LoadAverage {
        value: stats.load_average,
    })
}

fn check_memory(stats: &ServerStats, thresholds: &Thresholds) -> Option<Alert> {
    if stats.memory_used > stats.memory_total {
        return None;
    }
    let percent = used_percent(stats.memory_used, stats.memory_total)?;
    (percent > thresholds.memory_used_percent).then(|| Alert::MemoryUsage {
        used_percent: percent.floor() as u64,
    })
}

fn check_disk(stats: &ServerStats, thresholds: &Thresholds) -> Option<Alert> {
    // Also covers disk_total == 0.
    if stats.disk_used >= stats.disk_total {
        return None;
    }
    let percent = used_percent(stats.disk_used, stats.disk_total)?;
    (percent > thresholds.disk_used_percent).then(|| Alert::DiskSpace {
        free_mb: bytes_to_mb(stats.disk_total - stats.disk_used),
    })
}

fn check_network(stats: &ServerStats, thresholds: &Thresholds) -> Option<Alert> {
    if stats.network_used > stats.network_total {
        return None;
    }
    let percent = used_percent(stats.network_used, stats.network_total)?;
    (percent > thresholds.network_used_percent).then(|| Alert::NetworkBandwidth {
        free_mbit: bytes_per_sec_to_mbit(stats.network_total - stats.network_used),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
