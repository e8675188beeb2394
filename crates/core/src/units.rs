//! Unit conversions for human-readable alert figures.
//!
//! Binary convention throughout: 1 Mb = 1 MiB = 1024 * 1024 bytes.

pub const BYTES_PER_MB: u64 = 1024 * 1024;

const BITS_PER_BYTE: u128 = 8;

/// Whole megabytes in `bytes`, rounded down.
pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// Whole megabits per second in a bytes-per-second rate, rounded down.
///
/// The multiplication runs in 128 bits so it cannot overflow.
pub fn bytes_per_sec_to_mbit(bytes_per_sec: u64) -> u64 {
    let mbit = u128::from(bytes_per_sec) * BITS_PER_BYTE / u128::from(BYTES_PER_MB);
    // u64::MAX * 8 / 2^20 always fits back into a u64.
    u64::try_from(mbit).unwrap_or(u64::MAX)
}

/// `used / total * 100`, or `None` when `total` is zero.
pub fn used_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}
