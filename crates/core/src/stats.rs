//! The `_stats` payload model and parser.
//!
//! The remote host answers with seven comma-separated unsigned integers,
//! e.g. `12,4819661917,2328437675,469781716496,97858919593,1315809605,1245267076`.
//! Parsing is all-or-nothing: either every field converts or the whole
//! payload is rejected.

use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Number of fields in a well-formed payload.
pub const FIELD_COUNT: usize = 7;

/// Positional field names, in payload order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "load_average",
    "memory_total",
    "memory_used",
    "disk_total",
    "disk_used",
    "network_total",
    "network_used",
];

/// One snapshot of the remote host's counters.
///
/// `*_used <= *_total` is not enforced here. Inconsistent counters are
/// handled by the guards in [`crate::thresholds::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub load_average: u64,
    /// Bytes.
    pub memory_total: u64,
    /// Bytes.
    pub memory_used: u64,
    /// Bytes.
    pub disk_total: u64,
    /// Bytes.
    pub disk_used: u64,
    /// Bytes per second.
    pub network_total: u64,
    /// Bytes per second.
    pub network_used: u64,
}

/// Parse a raw `_stats` body into a [`ServerStats`].
///
/// Fields are not trimmed; surrounding whitespace, signs, decimals and
/// empty fields are all rejected.
pub fn parse(raw: &str) -> Result<ServerStats, CoreError> {
    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(CoreError::FieldCount {
            expected: FIELD_COUNT,
            actual: fields.len(),
        });
    }

    let mut values = [0u64; FIELD_COUNT];
    for (idx, field) in fields.iter().enumerate() {
        values[idx] = parse_field(field, FIELD_NAMES[idx])?;
    }

    let [load_average, memory_total, memory_used, disk_total, disk_used, network_total, network_used] =
        values;

    Ok(ServerStats {
        load_average,
        memory_total,
        memory_used,
        disk_total,
        disk_used,
        network_total,
        network_used,
    })
}

/// Strict base-10 conversion. `u64::from_str` alone would accept a
/// leading `+`, so digits are checked first.
fn parse_field(value: &str, field: &'static str) -> Result<u64, CoreError> {
    let invalid = || CoreError::InvalidField {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse::<u64>().map_err(|_| invalid())
}

impl FromStr for ServerStats {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
