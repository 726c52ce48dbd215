//! Cube navigation model: turns one flat, grouping-tagged result set into an
//! addressable cube of cells with roll-up, drill-down, slice and tree
//! iteration. Read-only after construction; every lazy field is a
//! populate-once cache owned by one `CellRepository` per result set.

mod cell;
mod coordinates;
mod dimension;
mod repository;
mod table;
mod tree;

pub use cell::{Cell, Cells};
pub use coordinates::Coordinates;
pub use dimension::{CubeDescriptor, Dimension, DimensionDescriptor};
pub use repository::CellRepository;
pub use table::{Table, TableRow};
pub use tree::{DimensionSelector, Dimensionality, Tree, TreeNodes};

use crate::{
    error::{Error, ErrorClass},
    store::{FlatQuery, FlatRow, SummaryStore},
};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default ceiling on synthesized gap-fill cells per repository lifetime.
///
/// Keeps a high-cardinality sparse dimension from ballooning a drill-down
/// into millions of null placeholder cells.
pub const DEFAULT_FILLING_NODES_LIMIT: usize = 10_000;

///
/// CubeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CubeError {
    #[error("dimension not found in coordinates: {name}")]
    DimensionNotFound { name: String },

    #[error("dimension {name} is already fixed by these coordinates")]
    DimensionAlreadyFixed { name: String },

    #[error("dimension {name} is not declared by the cube descriptor")]
    UnknownDimension { name: String },

    #[error("cube descriptor declares no dimensions")]
    EmptyDimensionList,

    #[error("corrupt result set: {message}")]
    CorruptResultSet { message: String },

    #[error("gap filling exceeded the limit of {limit} synthetic cells")]
    TooManyFillingNodes { limit: usize },

    #[error("ordinal {ordinal} is out of range for {remaining} remaining dimensions")]
    OrdinalOutOfRange { ordinal: i64, remaining: usize },

    #[error(transparent)]
    Dimensionality(#[from] DimensionalityError),
}

impl CubeError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptResultSet {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::DimensionNotFound { .. }
            | Self::DimensionAlreadyFixed { .. }
            | Self::UnknownDimension { .. }
            | Self::EmptyDimensionList
            | Self::OrdinalOutOfRange { .. } => ErrorClass::Config,
            Self::CorruptResultSet { .. } | Self::Dimensionality(_) => {
                ErrorClass::InvariantViolation
            }
            Self::TooManyFillingNodes { .. } => ErrorClass::Capacity,
        }
    }
}

///
/// DimensionalityError
///
/// Illegal tree-cursor transition: descending into a dimension that is not
/// among the remaining (not-yet-descended) dimensions.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DimensionalityError {
    #[error("dimension {name} is not a descendant of the current cursor")]
    NotADescendant { name: String },
}

///
/// Cube
///
/// Entry point over one materialized flat result set.
///

pub struct Cube {
    repository: CellRepository,
}

impl Cube {
    /// Build a cube from an already-materialized flat result set.
    pub fn from_rows(descriptor: CubeDescriptor, rows: Vec<FlatRow>) -> Result<Self, Error> {
        Ok(Self {
            repository: CellRepository::from_rows(descriptor, rows)?,
        })
    }

    /// Run the flat query against a summary store and build the cube from
    /// its result set.
    pub fn load<S: SummaryStore>(
        store: &S,
        descriptor: CubeDescriptor,
        query: &FlatQuery,
    ) -> Result<Self, Error> {
        let rows = store.run_flat_query(query)?;
        Self::from_rows(descriptor, rows)
    }

    /// The apex cell: every dimension rolled up to the grand total.
    #[must_use]
    pub fn cube(&self) -> Cell {
        self.repository.apex()
    }

    /// Hierarchical drill-down view over the declared dimension order.
    #[must_use]
    pub fn tree(&self) -> Tree {
        Tree::new(self.repository.apex(), self.repository.ordered_names())
    }

    /// Flattened view over the non-subtotal rows only.
    #[must_use]
    pub fn table(&self) -> Table {
        self.repository.table()
    }

    #[must_use]
    pub const fn repository(&self) -> &CellRepository {
        &self.repository
    }
}

///
/// TESTS
///
