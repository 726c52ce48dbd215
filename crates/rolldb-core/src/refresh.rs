use crate::{
    error::Error,
    obs::RefreshMetrics,
    partition::{Partition, PartitionRange, PartitionScheme},
    rollup::{RollupExecutor, RollupOutcome, RollupStrategy},
    scheduler::RangeScheduler,
    store::{DirtyMarker, StatusStore, SummaryStore},
    value::KeyValue,
};

///
/// RefreshRequest
///
/// One end-to-end refresh invocation. Omitted bounds resolve against the
/// persisted high-water mark and the live source key bounds.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefreshRequest {
    pub start: Option<KeyValue>,
    pub end: Option<KeyValue>,
    pub batch_size: usize,
    pub resume_checkpoint: Option<String>,
}

impl RefreshRequest {
    /// Full catch-up with the given batch size and no checkpoint.
    #[must_use]
    pub const fn catch_up(batch_size: usize) -> Self {
        Self {
            start: None,
            end: None,
            batch_size,
            resume_checkpoint: None,
        }
    }

    /// Explicit window refresh.
    #[must_use]
    pub const fn window(start: KeyValue, end: KeyValue, batch_size: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            batch_size,
            resume_checkpoint: None,
        }
    }
}

///
/// RefreshReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RefreshReport {
    /// Signatures of the batches actually rebuilt, in execution order.
    pub executed: Vec<String>,
    pub batches_skipped: usize,
    pub rows_deleted: u64,
    pub rows_inserted: u64,
    pub markers_cleared: u64,
    /// True when an inverted request window was clamped to zero width.
    pub clamped: bool,
    pub high_water_mark: Option<KeyValue>,
}

impl RefreshReport {
    fn fold(&mut self, signature: String, outcome: &RollupOutcome) {
        self.executed.push(signature);
        self.rows_deleted += outcome.rows_deleted;
        self.rows_inserted += outcome.rows_inserted;
        self.markers_cleared += outcome.markers_cleared;
    }
}

///
/// RefreshCoordinator
///
/// Orchestrates end-to-end refreshes for one summary target: resolves the
/// key window, schedules ranges, executes them batch by batch and maintains
/// the monotonic high-water mark. Concurrent refreshes of the same target
/// must be serialized externally (e.g. an advisory lock); this coordinator
/// is single-writer.
///

pub struct RefreshCoordinator<P: PartitionScheme, S: SummaryStore + StatusStore> {
    scheme: P,
    store: S,
    target: String,
    strategy: RollupStrategy,
    metrics: RefreshMetrics,
}

impl<P: PartitionScheme, S: SummaryStore + StatusStore> RefreshCoordinator<P, S> {
    pub fn new(scheme: P, store: S, target: impl Into<String>, strategy: RollupStrategy) -> Self {
        Self {
            scheme,
            store,
            target: target.into(),
            strategy,
            metrics: RefreshMetrics::new(),
        }
    }

    #[must_use]
    pub const fn metrics(&self) -> &RefreshMetrics {
        &self.metrics
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Refresh a key window, resuming from an optional checkpoint, and
    /// advance the high-water mark. With no source data this is a silent
    /// no-op.
    pub fn refresh(&mut self, request: &RefreshRequest) -> Result<RefreshReport, Error> {
        let Some((source_min, source_max)) = self.store.source_key_bounds()? else {
            return Ok(RefreshReport::default());
        };
        let mark = self.store.high_water_mark(&self.target)?;

        let start = request.start.clone().unwrap_or_else(|| match &mark {
            Some(mark) if mark > &source_min => mark.clone(),
            _ => source_min,
        });
        let end = request.end.clone().unwrap_or(source_max);

        // An inverted window clamps to zero width instead of raising; the
        // request degrades to a no-op. Deliberate source-behavior quirk.
        if start > end {
            return Ok(RefreshReport {
                clamped: true,
                high_water_mark: mark,
                ..RefreshReport::default()
            });
        }

        let mut report = self.rebuild_window(&start, &end, request)?;
        report.high_water_mark = self.advance_mark(mark, end)?;
        Ok(report)
    }

    /// Rebuild exactly one partition.
    pub fn refresh_partition(&mut self, partition: Partition) -> Result<RollupOutcome, Error> {
        let executor = RollupExecutor::new(&self.scheme, &self.target, self.strategy);
        executor.execute_tracked(
            &mut self.store,
            &PartitionRange::single(partition),
            &mut self.metrics,
        )
    }

    /// Catch up from the high-water mark to the newest source key, then
    /// flag the next-coarser partition dirty when the rebuilt window lands
    /// exactly on its boundary. Calling again with no new source data is a
    /// no-op.
    pub fn refresh_new(&mut self, batch_size: usize) -> Result<RefreshReport, Error> {
        let Some((source_min, source_max)) = self.store.source_key_bounds()? else {
            return Ok(RefreshReport::default());
        };
        let mark = self.store.high_water_mark(&self.target)?;
        if let Some(mark) = &mark {
            if mark >= &source_max {
                return Ok(RefreshReport {
                    high_water_mark: Some(mark.clone()),
                    ..RefreshReport::default()
                });
            }
        }

        let start = mark.clone().unwrap_or(source_min);
        let request = RefreshRequest {
            start: Some(start.clone()),
            end: Some(source_max.clone()),
            batch_size,
            resume_checkpoint: None,
        };
        let mut report = self.rebuild_window(&start, &source_max, &request)?;
        report.high_water_mark = self.advance_mark(mark, source_max.clone())?;

        // Coarser levels only become recomputable when the window ends on
        // their boundary; otherwise a dirty flag now would trigger a rebuild
        // over partial trailing data.
        let leaf = self
            .scheme
            .partition_for_key(&source_max, self.scheme.lowest_level())?;
        if let Some(parent) = self.scheme.containing(&leaf)? {
            if parent.upper() == leaf.upper() {
                self.store.raise_dirty_marker(
                    &self.target,
                    DirtyMarker::partition(parent.level(), parent.key().clone()),
                )?;
            }
        }
        Ok(report)
    }

    fn rebuild_window(
        &mut self,
        start: &KeyValue,
        end: &KeyValue,
        request: &RefreshRequest,
    ) -> Result<RefreshReport, Error> {
        let walk = RangeScheduler::compute_ranges(&self.scheme, start, end)?;
        let batches = RangeScheduler::batched(&self.scheme, walk, request.batch_size)?;
        let (batches, skipped) =
            RangeScheduler::resume(batches, request.resume_checkpoint.as_deref());
        self.metrics.record_batches_skipped(skipped as u64);

        let mut report = RefreshReport {
            batches_skipped: skipped,
            ..RefreshReport::default()
        };
        let executor = RollupExecutor::new(&self.scheme, &self.target, self.strategy);
        for batch in &batches {
            let outcome = executor.execute_tracked(&mut self.store, batch, &mut self.metrics)?;
            report.fold(batch.signature(), &outcome);
        }
        Ok(report)
    }

    fn advance_mark(
        &mut self,
        stored: Option<KeyValue>,
        end: KeyValue,
    ) -> Result<Option<KeyValue>, Error> {
        match stored {
            Some(stored) if stored >= end => Ok(Some(stored)),
            _ => {
                self.store.set_high_water_mark(&self.target, end.clone())?;
                Ok(Some(end))
            }
        }
    }
}

///
/// TESTS
///
