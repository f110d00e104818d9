//! Progress feedback for export runs
//!
//! A text progress bar drawn on stderr, created once the total match count
//! is known from the first batch and updated once per batch to bound
//! overhead.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a single export run.
///
/// The bar is created lazily by [`ProgressTracker::begin`] and must be
/// cleared via [`ProgressTracker::finish`] on every exit path so the
/// terminal is not left in a modified rendering state.
pub struct ProgressTracker {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a tracker. When `enabled` is false all calls are no-ops,
    /// which keeps test runs quiet.
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Start the bar with the total reported by the first batch.
    ///
    /// The total is an estimate used for the ETA display only; it never
    /// decides when the traversal stops. Calling `begin` again is a no-op.
    pub fn begin(&mut self, total: u64) {
        if !self.enabled || self.bar.is_some() {
            return;
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        self.bar = Some(bar);
    }

    /// Update position and throughput after a batch.
    pub fn update(&self, offset: u64, rate: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(offset);
            bar.set_message(format!("{rate} logs/s"));
        }
    }

    /// Clear the bar. Safe to call when it was never started, and safe to
    /// call more than once.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_before_begin_is_harmless() {
        let tracker = ProgressTracker::new(false);
        tracker.update(500, 100);
        tracker.finish();
    }

    #[test]
    fn test_begin_update_finish() {
        let mut tracker = ProgressTracker::new(false);
        tracker.begin(1000);
        tracker.update(500, 250);
        tracker.finish();
        tracker.finish();
    }
}
