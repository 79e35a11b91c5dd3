//! Background operation support: progress reporting and cancellation.
//!
//! Long-running operations (layout, hierarchy-driven bottom-up compiles)
//! accept a [`ProgressMonitor`] to report progress and check for
//! cancellation.
//!
//! ## Platform Implementations
//!
//! | Target   | Implementation                                          |
//! |----------|---------------------------------------------------------|
//! | **CLI**  | Wrap `indicatif::ProgressBar` and a Ctrl-C flag         |
//! | **Test** | Use [`NoopMonitor`] (zero overhead)                      |
//!

use std::fmt;

// ---------------------------------------------------------------------------
// CancelledError
// ---------------------------------------------------------------------------

/// Error indicating that an operation was cancelled by the user or caller.
///
/// Returned when an operation is cancelled by the caller.
/// It is intentionally small and `Copy` so it can be cheaply returned
/// from tight inner loops.
#[derive(Debug, Clone, Copy)]
pub struct CancelledError;

impl fmt::Display for CancelledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation cancelled")
    }
}

impl std::error::Error for CancelledError {}

// ---------------------------------------------------------------------------
// ProgressMonitor trait
// ---------------------------------------------------------------------------

/// Trait for reporting progress and checking cancellation.
///
/// Operations periodically call [`update`](ProgressMonitor::update) or
/// [`keep_going`](ProgressMonitor::keep_going). When the monitor returns
/// `false`, the operation should stop promptly and return
/// [`CancelledError`] (or [`LayoutError::Cancelled`](crate::layout::LayoutError::Cancelled)).
///
/// ## Thread Safety
///
/// Monitors are `Send + Sync` so a caller can share one across the
/// hierarchy driver's otherwise single-threaded, strictly sequential
/// child compiles.
pub trait ProgressMonitor: Send + Sync {
    /// Set the total number of work units (for percentage calculation).
    fn set_total(&self, total: u64);

    /// Report that `done` work units are complete.
    ///
    /// Returns `true` to continue, `false` to request cancellation.
    fn update(&self, done: u64) -> bool;

    /// Report progress with a human-readable phase description.
    ///
    /// Returns `true` to continue, `false` to request cancellation.
    fn update_with_phase(&self, done: u64, phase: &str) -> bool;

    /// Check whether the operation should continue (not cancelled).
    fn keep_going(&self) -> bool;
}

// ---------------------------------------------------------------------------
// NoopMonitor
// ---------------------------------------------------------------------------

/// No-op monitor: never cancels, discards all progress reports.
///
/// Use in tests or batch mode where progress reporting is unnecessary.
///
/// ## Example
///
/// ```rust
/// use gridsynth_core::worker::{NoopMonitor, ProgressMonitor};
///
/// let monitor: &dyn ProgressMonitor = &NoopMonitor;
/// assert!(monitor.keep_going());
/// assert!(monitor.update(42));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl ProgressMonitor for NoopMonitor {
    fn set_total(&self, _total: u64) {}

    fn update(&self, _done: u64) -> bool {
        true
    }

    fn update_with_phase(&self, _done: u64, _phase: &str) -> bool {
        true
    }

    fn keep_going(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// LoopReporter
// ---------------------------------------------------------------------------

/// Throttled progress reporter for tight inner loops.
///
/// Only reports progress every `total / bins` iterations to avoid flooding
/// the monitor with updates. Checks for cancellation at each report point.
///
/// ## Usage
///
/// Call `LoopReporter::new(total, bins, monitor, lo, hi, phase)` before a
/// tight loop, then `lr.tick()?` each iteration (returns
/// `Err(CancelledError)` if cancelled) and `lr.finish()` when done.
///
/// The `start_frac` / `end_frac` parameters let you divide a larger
/// operation into phases that each report a sub-range of the overall
/// progress bar (e.g., phase 1 covers 0.0–0.5, phase 2 covers 0.5–1.0).
pub struct LoopReporter<'a> {
    monitor: &'a dyn ProgressMonitor,
    total: u64,
    count: u64,
    skip: u64,
    next_report: u64,
    start_frac: f64,
    end_frac: f64,
    phase: String,
}

impl<'a> LoopReporter<'a> {
    /// Create a new loop reporter.
    ///
    /// # Arguments
    ///
    /// * `total` — Total number of iterations expected.
    /// * `bins` — Number of progress reports to emit (evenly spaced).
    ///   e.g., `bins = 20` reports roughly every 5% of progress.
    /// * `monitor` — The progress monitor to report to.
    /// * `start_frac` — Progress fraction at the start of this phase (0.0–1.0).
    /// * `end_frac` — Progress fraction at the end of this phase (0.0–1.0).
    /// * `phase` — Human-readable description of the current phase.
    pub fn new(
        total: u64,
        bins: u64,
        monitor: &'a dyn ProgressMonitor,
        start_frac: f64,
        end_frac: f64,
        phase: impl Into<String>,
    ) -> Self {
        let skip = if bins == 0 || total == 0 {
            total.max(1)
        } else {
            (total / bins).max(1)
        };
        Self {
            monitor,
            total,
            count: 0,
            skip,
            next_report: skip,
            start_frac,
            end_frac,
            phase: phase.into(),
        }
    }

    /// Advance by one iteration.
    ///
    /// Returns `Err(CancelledError)` if the monitor signals cancellation.
    pub fn tick(&mut self) -> Result<(), CancelledError> {
        self.count += 1;
        if self.count >= self.next_report {
            let frac = if self.total == 0 {
                self.end_frac
            } else {
                self.start_frac
                    + (self.end_frac - self.start_frac)
                        * (self.count as f64 / self.total as f64)
            };
            let percent = (frac * 100.0) as u64;
            if !self.monitor.update_with_phase(percent, &self.phase) {
                return Err(CancelledError);
            }
            self.next_report += self.skip;
        }
        Ok(())
    }

    /// Signal completion of this phase.
    pub fn finish(&self) {
        let percent = (self.end_frac * 100.0) as u64;
        let _ = self.monitor.update_with_phase(percent, &self.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
}
