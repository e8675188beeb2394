//! `statwatch-core` -- pure domain logic for the stats agent.
//!
//! Holds the [`ServerStats`] model and its parser, the unit conversions
//! and the threshold evaluation engine. Nothing in this crate performs
//! I/O; the agent crate fetches the payload and prints the alerts.

pub mod alert;
pub mod error;
pub mod metric_names;
pub mod stats;
pub mod thresholds;
pub mod units;

pub use alert::Alert;
pub use error::CoreError;
pub use stats::ServerStats;
pub use thresholds::{evaluate, Thresholds};
