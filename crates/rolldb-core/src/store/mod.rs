mod memory;

pub use memory::{MeasureAggregate, MeasureSpec, MemoryStore, SourceRecord, SummaryRecord};

use crate::{
    error::ErrorClass,
    rollup::RollupStrategy,
    value::{KeyValue, Value},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, ops::Range};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Reserved flat-query column carrying the per-row grouping bitmask.
pub const GROUPING_COLUMN: &str = "__grouping";

/// Reserved pseudo-dimension selecting which measure a row reports.
pub const MEASURES_DIMENSION: &str = "@values";

///
/// StoreError
///
/// Failures crossing the persistence boundary. Backend failures abort and
/// roll back the enclosing transaction; the failed range is retryable in
/// full. Row-limit breaches are capacity conditions, never truncation.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("backend failure: {message}")]
    Backend { message: String },

    #[error("flat query exceeded the configured row limit of {limit}")]
    RowLimitExceeded { limit: usize },

    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("column {name} holds incompatible value types for aggregation")]
    TypeMismatch { name: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Backend { .. } => ErrorClass::Resource,
            Self::RowLimitExceeded { .. } => ErrorClass::Capacity,
            Self::UnknownColumn { .. } | Self::TypeMismatch { .. } => ErrorClass::Config,
        }
    }
}

///
/// FlatRow
///
/// One row of a flat cube query: dimension columns, measure columns and the
/// reserved grouping bitmask column.
///

pub type FlatRow = BTreeMap<String, Value>;

///
/// FlatQuery
///
/// Declarative flat result-set request fed to the cube model.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlatQuery {
    pub level: u32,
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub filters: Vec<(String, Value)>,
    pub order: Vec<String>,
    pub row_limit: Option<usize>,
}

impl FlatQuery {
    /// Build an unfiltered, unordered, unlimited query.
    #[must_use]
    pub const fn new(level: u32, dimensions: Vec<String>, measures: Vec<String>) -> Self {
        Self {
            level,
            dimensions,
            measures,
            filters: Vec::new(),
            order: Vec::new(),
            row_limit: None,
        }
    }
}

///
/// DirtyMarker
///
/// Persisted "needs recomputation" record. Absent level/key means the whole
/// summary is dirty. Raised by source mutation hooks and by `refresh_new`;
/// consumed once the covering range has been rebuilt.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DirtyMarker {
    pub level: Option<u32>,
    pub key: Option<KeyValue>,
}

impl DirtyMarker {
    /// Marker for one specific partition.
    #[must_use]
    pub const fn partition(level: u32, key: KeyValue) -> Self {
        Self {
            level: Some(level),
            key: Some(key),
        }
    }

    /// Marker for the whole summary.
    #[must_use]
    pub const fn whole_summary() -> Self {
        Self {
            level: None,
            key: None,
        }
    }

    /// True when this marker falls inside `filter`. A whole-summary marker
    /// only matches an unconstrained filter; rebuilding one window never
    /// clears a global marker.
    #[must_use]
    pub fn matches(&self, filter: &MarkerFilter) -> bool {
        let level_ok = match (filter.level, self.level) {
            (None, _) => true,
            (Some(want), Some(have)) => want == have,
            (Some(_), None) => false,
        };
        let key_ok = match (&filter.window, &self.key) {
            (None, _) => true,
            (Some(window), Some(key)) => window.contains(key),
            (Some(_), None) => false,
        };
        level_ok && key_ok
    }
}

///
/// MarkerFilter
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarkerFilter {
    pub level: Option<u32>,
    pub window: Option<Range<KeyValue>>,
}

impl MarkerFilter {
    /// Match every marker.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            level: None,
            window: None,
        }
    }

    /// Match partition markers at `level` whose key lies in `window`.
    #[must_use]
    pub const fn window(level: u32, window: Range<KeyValue>) -> Self {
        Self {
            level: Some(level),
            window: Some(window),
        }
    }
}

///
/// SummaryStore
///
/// Persistence port for summary rows and source aggregation. Implemented by
/// the SQL emitter in production deployments and by `MemoryStore` here.
///

pub trait SummaryStore {
    /// Delete summary rows at `level` whose partition key lies in `window`.
    fn delete_summary(&mut self, level: u32, window: Range<KeyValue>)
    -> Result<u64, StoreError>;

    /// Aggregate source rows into summary rows at the lowest level.
    fn rollup_from_source(
        &mut self,
        level: u32,
        window: Range<KeyValue>,
        strategy: RollupStrategy,
    ) -> Result<u64, StoreError>;

    /// Aggregate summary rows at `source_level` into coarser rows at `level`.
    fn rollup_from_summary(
        &mut self,
        level: u32,
        source_level: u32,
        window: Range<KeyValue>,
        strategy: RollupStrategy,
    ) -> Result<u64, StoreError>;

    /// Materialize the flat result set that feeds the cube model.
    fn run_flat_query(&self, query: &FlatQuery) -> Result<Vec<FlatRow>, StoreError>;

    /// Smallest and largest source key, or `None` when no source data exists.
    fn source_key_bounds(&self) -> Result<Option<(KeyValue, KeyValue)>, StoreError>;

    /// Run `f` inside one transaction; any error rolls everything back.
    fn with_transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, StoreError>,
        Self: Sized;
}

///
/// StatusStore
///
/// Persistence port for refresh bookkeeping: the high-water mark and dirty
/// markers.
///

pub trait StatusStore {
    fn high_water_mark(&self, target: &str) -> Result<Option<KeyValue>, StoreError>;

    fn set_high_water_mark(&mut self, target: &str, mark: KeyValue) -> Result<(), StoreError>;

    fn list_dirty_markers(
        &self,
        target: &str,
        filter: &MarkerFilter,
    ) -> Result<Vec<DirtyMarker>, StoreError>;

    fn raise_dirty_marker(&mut self, target: &str, marker: DirtyMarker)
    -> Result<(), StoreError>;

    /// Delete matching markers, returning how many were cleared.
    fn clear_dirty_markers(
        &mut self,
        target: &str,
        filter: &MarkerFilter,
    ) -> Result<u64, StoreError>;
}

///
/// TESTS
///
