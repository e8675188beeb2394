//! Threshold violation alerts.
//!
//! Each variant carries the already-converted figure that appears in the
//! console line, so formatting never redoes any arithmetic.

use std::fmt;

use serde::Serialize;

use crate::metric_names::{
    METRIC_DISK_USED_PERCENT, METRIC_LOAD_AVERAGE, METRIC_MEMORY_USED_PERCENT,
    METRIC_NETWORK_USED_PERCENT,
};

/// A single threshold violation for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "metric")]
pub enum Alert {
    /// Load average above the threshold.
    #[serde(rename = "load_average")]
    LoadAverage { value: u64 },
    /// Memory usage above the threshold, floored to a whole percent.
    #[serde(rename = "memory_used_percent")]
    MemoryUsage { used_percent: u64 },
    /// Disk usage above the threshold; free space in whole megabytes.
    #[serde(rename = "disk_used_percent")]
    DiskSpace { free_mb: u64 },
    /// Network usage above the threshold; spare bandwidth in whole Mbit/s.
    #[serde(rename = "network_used_percent")]
    NetworkBandwidth { free_mbit: u64 },
}

impl Alert {
    /// Canonical metric name (see [`crate::metric_names`]).
    pub fn metric_name(&self) -> &'static str {
        match self {
            Self::LoadAverage { .. } => METRIC_LOAD_AVERAGE,
            Self::MemoryUsage { .. } => METRIC_MEMORY_USED_PERCENT,
            Self::DiskSpace { .. } => METRIC_DISK_USED_PERCENT,
            Self::NetworkBandwidth { .. } => METRIC_NETWORK_USED_PERCENT,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadAverage { value } => write!(f, "Load Average is too high: {value}"),
            Self::MemoryUsage { used_percent } => {
                write!(f, "Memory usage too high: {used_percent}%")
            }
            Self::DiskSpace { free_mb } => {
                write!(f, "Free disk space is too low: {free_mb} Mb left")
            }
            Self::NetworkBandwidth { free_mbit } => {
                write!(f, "Network bandwidth usage high: {free_mbit} Mbit/s available")
            }
        }
    }
}
