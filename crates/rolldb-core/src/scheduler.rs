//! Decides which partition ranges must be rebuilt for a source-key window,
//! finest level first, walking upward one level at a time.
//!
//! A coarser partition may only be recomputed once all of its finer children
//! inside the requested window have been recomputed. The walk enforces that:
//! the next level's end is the parent of the current end only when the
//! current end lands exactly on the parent's upper bound; otherwise the
//! parent's trailing portion is still waiting for source data and the walk
//! ends at the parent's predecessor instead.

use crate::{
    error::Error,
    partition::{PartitionRange, PartitionScheme},
    value::KeyValue,
};

///
/// RangeWalk
///
/// Lazy, finite iterator over the per-level ranges to rebuild. Levels
/// strictly increase across yielded items.
///

pub struct RangeWalk<'a, S: PartitionScheme> {
    scheme: &'a S,
    current: Option<PartitionRange>,
    failed: bool,
}

impl<'a, S: PartitionScheme> RangeWalk<'a, S> {
    fn promote(&self, range: &PartitionRange) -> Result<Option<PartitionRange>, Error> {
        let Some(parent_end) = self.scheme.containing(range.end())? else {
            return Ok(None);
        };

        let next_end = if parent_end.upper() == range.end().upper() {
            parent_end
        } else {
            // The window stops partway through the parent; the parent itself
            // must wait until its remaining children arrive.
            match self.scheme.previous(&parent_end)? {
                Some(previous) => previous,
                None => return Ok(None),
            }
        };

        let Some(next_start) = self.scheme.containing(range.start())? else {
            return Ok(None);
        };

        // No complete parent inside the window.
        if next_end.key() < next_start.key() {
            return Ok(None);
        }

        PartitionRange::new(next_start, next_end)
            .map(Some)
            .map_err(Error::from)
    }
}

impl<'a, S: PartitionScheme> Iterator for RangeWalk<'a, S> {
    type Item = Result<PartitionRange, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let range = self.current.take()?;
        match self.promote(&range) {
            Ok(next) => {
                self.current = next;
                Some(Ok(range))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

///
/// RangeScheduler
///

pub struct RangeScheduler;

impl RangeScheduler {
    /// Compute the ordered per-level ranges covering `[start_key, end_key]`.
    pub fn compute_ranges<'a, S: PartitionScheme>(
        scheme: &'a S,
        start_key: &KeyValue,
        end_key: &KeyValue,
    ) -> Result<RangeWalk<'a, S>, Error> {
        let level = scheme.lowest_level();
        let start = scheme.partition_for_key(start_key, level)?;
        let end = scheme.partition_for_key(end_key, level)?;
        let first = PartitionRange::new(start, end)?;

        Ok(RangeWalk {
            scheme,
            current: Some(first),
            failed: false,
        })
    }

    /// Flatten a range walk into bounded batches.
    pub fn batched<S: PartitionScheme>(
        scheme: &S,
        walk: RangeWalk<'_, S>,
        size: usize,
    ) -> Result<Vec<PartitionRange>, Error> {
        let mut batches = Vec::new();
        for range in walk {
            let range = range?;
            batches.extend(range.batch(scheme, size)?);
        }
        Ok(batches)
    }

    /// Replay `batches`, skipping everything before the checkpoint batch.
    ///
    /// The matching batch itself is replayed: delete-then-reinsert is
    /// idempotent per range, and a checkpoint taken before a failed batch
    /// must re-run that batch. With no checkpoint nothing is skipped.
    #[must_use]
    pub fn resume(
        batches: Vec<PartitionRange>,
        checkpoint: Option<&str>,
    ) -> (Vec<PartitionRange>, usize) {
        let Some(checkpoint) = checkpoint else {
            return (batches, 0);
        };
        let skipped = batches
            .iter()
            .position(|batch| batch.signature() == checkpoint)
            .unwrap_or(batches.len());
        (batches[skipped..].to_vec(), skipped)
    }
}

///
/// TESTS
///
