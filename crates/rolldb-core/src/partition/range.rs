use crate::{
    partition::{Partition, PartitionScheme, SchemeError},
    value::KeyValue,
};
use std::{fmt, ops::Range};
use thiserror::Error as ThisError;

///
/// RangeError
///
/// Invariant violations on range construction. A backwards or cross-level
/// range indicates a scheduling bug, never a transient condition.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RangeError {
    #[error("range endpoints are on different levels: {start} vs {end}")]
    LevelMismatch { start: u32, end: u32 },

    #[error("range start {start} is after range end {end}")]
    Inverted { start: KeyValue, end: KeyValue },

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error(transparent)]
    Scheme(#[from] SchemeError),
}

///
/// PartitionRange
///
/// Inclusive `(start, end)` partition pair at one level. The unit of rollup
/// work: one range is rebuilt inside one transaction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartitionRange {
    start: Partition,
    end: Partition,
}

impl PartitionRange {
    /// Build one range, validating level and ordering invariants.
    pub fn new(start: Partition, end: Partition) -> Result<Self, RangeError> {
        if start.level() != end.level() {
            return Err(RangeError::LevelMismatch {
                start: start.level(),
                end: end.level(),
            });
        }
        if start.key() > end.key() {
            return Err(RangeError::Inverted {
                start: start.key().clone(),
                end: end.key().clone(),
            });
        }
        Ok(Self { start, end })
    }

    /// Build the single-partition range `(p, p)`.
    #[must_use]
    pub fn single(partition: Partition) -> Self {
        Self {
            start: partition.clone(),
            end: partition,
        }
    }

    #[must_use]
    pub const fn start(&self) -> &Partition {
        &self.start
    }

    #[must_use]
    pub const fn end(&self) -> &Partition {
        &self.end
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.start.level()
    }

    /// Half-open source-key window covered by this range.
    #[must_use]
    pub fn key_window(&self) -> Range<KeyValue> {
        self.start.lower().clone()..self.end.upper().clone()
    }

    /// Stable checkpoint token for resume bookkeeping.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("L{}:{}..{}", self.level(), self.start.key(), self.end.key())
    }

    /// Split into contiguous sub-ranges of at most `size` partitions.
    pub fn batch<S: PartitionScheme>(
        &self,
        scheme: &S,
        size: usize,
    ) -> Result<Vec<Self>, RangeError> {
        if size == 0 {
            return Err(RangeError::ZeroBatchSize);
        }

        let mut batches = Vec::new();
        let mut chunk_start = self.start.clone();
        let mut cursor = self.start.clone();
        let mut in_chunk = 1usize;

        while cursor.key() < self.end.key() {
            let successor = scheme.next(&cursor)?;
            if successor.key() <= cursor.key() {
                return Err(RangeError::Scheme(SchemeError::InvalidLevelSet {
                    message: format!("scheme successor does not advance past {cursor}"),
                }));
            }
            if in_chunk == size {
                batches.push(Self {
                    start: chunk_start,
                    end: cursor,
                });
                chunk_start = successor.clone();
                in_chunk = 0;
            }
            cursor = successor;
            in_chunk += 1;
        }

        batches.push(Self {
            start: chunk_start,
            end: cursor,
        });
        Ok(batches)
    }
}

impl fmt::Display for PartitionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

///
/// TESTS
///
