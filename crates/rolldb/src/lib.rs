//! ## Crate layout
//! - `core`: partition schemes, range scheduler, rollup execution, refresh
//!   coordination and the cube navigation model.
//!
//! The `prelude` module mirrors the surface used by embedding code.

pub use rolldb_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use rolldb_core::{Error, ErrorClass, ErrorOrigin};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        cube::{Cell, Cells, Cube, CubeDescriptor, Dimension, DimensionDescriptor, Tree},
        partition::{CalendarScheme, PartitionRange, PartitionScheme as _, SpanScheme, calendar},
        refresh::{RefreshCoordinator, RefreshReport, RefreshRequest},
        rollup::RollupStrategy,
        store::{MemoryStore, StatusStore as _, SummaryStore as _},
        value::{KeyValue, Value},
    };
}

///
/// TESTS
///
