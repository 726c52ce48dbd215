use crate::{
    error::Error,
    obs::RefreshMetrics,
    partition::{PartitionRange, PartitionScheme},
    store::{MarkerFilter, StatusStore, SummaryStore},
};
use std::fmt;

///
/// RollupStrategy
///
/// Closed aggregation-strategy selector, dispatched by `match`.
/// `GroupingSets` computes every subtotal/grand-total combination in one
/// pass; `GroupAll` forces every dimension to its full value.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RollupStrategy {
    GroupingSets,
    GroupAll,
}

impl fmt::Display for RollupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::GroupingSets => "grouping_sets",
            Self::GroupAll => "group_all",
        };
        write!(f, "{label}")
    }
}

///
/// RollupOutcome
///
/// Row accounting for one rebuilt range.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RollupOutcome {
    pub rows_deleted: u64,
    pub rows_inserted: u64,
    pub markers_cleared: u64,
}

///
/// RollupExecutor
///
/// Rebuilds one partition range by delete-then-reinsert inside a single
/// transaction. Nothing partial is ever visible outside the transaction,
/// which makes every range retryable in full.
///

pub struct RollupExecutor<'a, P: PartitionScheme> {
    scheme: &'a P,
    target: &'a str,
    strategy: RollupStrategy,
}

impl<'a, P: PartitionScheme> RollupExecutor<'a, P> {
    #[must_use]
    pub const fn new(scheme: &'a P, target: &'a str, strategy: RollupStrategy) -> Self {
        Self {
            scheme,
            target,
            strategy,
        }
    }

    /// Rebuild one range: delete the window, clear its dirty markers, then
    /// re-derive the rows from source (lowest level) or from the next finer
    /// summary level.
    pub fn execute<S>(&self, store: &mut S, range: &PartitionRange) -> Result<RollupOutcome, Error>
    where
        S: SummaryStore + StatusStore,
    {
        let level = range.level();
        let window = range.key_window();
        let lowest = self.scheme.lowest_level();
        let target = self.target;
        let strategy = self.strategy;

        let outcome = store.with_transaction(|s| {
            let rows_deleted = s.delete_summary(level, window.clone())?;
            let markers_cleared =
                s.clear_dirty_markers(target, &MarkerFilter::window(level, window.clone()))?;
            let rows_inserted = if level == lowest {
                s.rollup_from_source(level, window.clone(), strategy)?
            } else {
                s.rollup_from_summary(level, level - 1, window.clone(), strategy)?
            };
            Ok(RollupOutcome {
                rows_deleted,
                rows_inserted,
                markers_cleared,
            })
        })?;

        Ok(outcome)
    }

    /// Rebuild one range and fold its accounting into the metrics set.
    pub fn execute_tracked<S>(
        &self,
        store: &mut S,
        range: &PartitionRange,
        metrics: &mut RefreshMetrics,
    ) -> Result<RollupOutcome, Error>
    where
        S: SummaryStore + StatusStore,
    {
        let outcome = self.execute(store, range)?;
        metrics.record_outcome(&outcome);
        Ok(outcome)
    }
}

///
/// TESTS
///
