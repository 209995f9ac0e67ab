//! Asset load progress.

/// Counts of registered and settled asset loads.
///
/// A failed load still settles: the game carries on without that asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    total: usize,
    completed: usize,
    failed: usize,
}

impl LoadProgress {
    /// Register `count` more loads.
    pub fn register(&mut self, count: usize) {
        self.total += count;
    }

    /// One load finished successfully.
    pub fn complete(&mut self) {
        self.completed = (self.completed + 1).min(self.total);
    }

    /// One load failed.
    pub fn fail(&mut self) {
        self.failed += 1;
        self.complete();
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Loads settled so far, failures included.
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// `round(100 * completed / total)`; 100 when nothing was registered.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (100.0 * self.completed as f64 / self.total as f64).round() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}
