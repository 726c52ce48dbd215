use crate::rollup::RollupOutcome;

///
/// RefreshMetrics
///
/// Refresh-side counters. Monotonic within one coordinator lifetime; the
/// snapshot is the struct itself (plain `Copy` counters, no interior state).
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RefreshMetrics {
    ranges_rebuilt: u64,
    batches_skipped: u64,
    rows_deleted: u64,
    rows_inserted: u64,
    markers_cleared: u64,
}

impl RefreshMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ranges_rebuilt: 0,
            batches_skipped: 0,
            rows_deleted: 0,
            rows_inserted: 0,
            markers_cleared: 0,
        }
    }

    pub fn record_outcome(&mut self, outcome: &RollupOutcome) {
        self.ranges_rebuilt = self.ranges_rebuilt.saturating_add(1);
        self.rows_deleted = self.rows_deleted.saturating_add(outcome.rows_deleted);
        self.rows_inserted = self.rows_inserted.saturating_add(outcome.rows_inserted);
        self.markers_cleared = self.markers_cleared.saturating_add(outcome.markers_cleared);
    }

    pub fn record_batches_skipped(&mut self, count: u64) {
        self.batches_skipped = self.batches_skipped.saturating_add(count);
    }

    #[must_use]
    pub const fn ranges_rebuilt(&self) -> u64 {
        self.ranges_rebuilt
    }

    #[must_use]
    pub const fn batches_skipped(&self) -> u64 {
        self.batches_skipped
    }

    #[must_use]
    pub const fn rows_deleted(&self) -> u64 {
        self.rows_deleted
    }

    #[must_use]
    pub const fn rows_inserted(&self) -> u64 {
        self.rows_inserted
    }

    #[must_use]
    pub const fn markers_cleared(&self) -> u64 {
        self.markers_cleared
    }

    /// Copy out the current counter values.
    #[must_use]
    pub const fn snapshot(&self) -> Self {
        *self
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_accumulate_across_ranges() {
        let mut metrics = RefreshMetrics::new();
        metrics.record_outcome(&RollupOutcome {
            rows_deleted: 2,
            rows_inserted: 8,
            markers_cleared: 1,
        });
        metrics.record_outcome(&RollupOutcome {
            rows_deleted: 0,
            rows_inserted: 3,
            markers_cleared: 0,
        });

        assert_eq!(metrics.ranges_rebuilt(), 2);
        assert_eq!(metrics.rows_deleted(), 2);
        assert_eq!(metrics.rows_inserted(), 11);
        assert_eq!(metrics.markers_cleared(), 1);
    }
}
