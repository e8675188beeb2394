//! Console output for alerts and the final abort line.
//!
//! Only the contract lines go to the writer; diagnostics go through
//! `tracing` instead.

use std::io::{self, Write};

use statwatch_core::Alert;

/// Printed once when the failure budget is exhausted.
pub const UNABLE_TO_FETCH: &str = "Unable to fetch server statistic.";

/// Receives the poll loop's user-facing output.
pub trait Reporter {
    /// One triggered alert.
    fn alert(&mut self, alert: &Alert);

    /// The failure budget ran out and the loop is stopping.
    fn unable_to_fetch(&mut self);
}

/// Writes one line per call to `W` (stdout by default).
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        let result = writeln!(self.out, "{line}").and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::error!(error = %e, line, "Failed to write report line");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn alert(&mut self, alert: &Alert) {
        self.write_line(&alert.to_string());
    }

    fn unable_to_fetch(&mut self) {
        self.write_line(UNABLE_TO_FETCH);
    }
}
