//! Canonical metric names.
//!
//! Used as the `metric` tag when alerts are serialized and as the
//! `metric` field on agent log events.

/// Remote host load average (dimensionless).
pub const METRIC_LOAD_AVERAGE: &str = "load_average";

/// Memory usage as a percentage (computed from used / total).
pub const METRIC_MEMORY_USED_PERCENT: &str = "memory_used_percent";

/// Disk usage as a percentage (computed from used / total).
pub const METRIC_DISK_USED_PERCENT: &str = "disk_used_percent";

/// Network bandwidth usage as a percentage (computed from used / total).
pub const METRIC_NETWORK_USED_PERCENT: &str = "network_used_percent";
