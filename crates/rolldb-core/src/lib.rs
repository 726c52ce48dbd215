//! Core runtime for RollDB: partition schemes, the range scheduler, rollup
//! execution against the store ports, refresh bookkeeping and the cube
//! navigation model over flat grouping-tagged result sets.

pub mod cube;
pub mod error;
pub mod grouping;
pub mod obs;
pub mod partition;
pub mod refresh;
pub mod rollup;
pub mod scheduler;
pub mod store;
pub mod value;

pub use error::{Error, ErrorClass, ErrorOrigin};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or internal helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cube::{Cube, CubeDescriptor, DimensionDescriptor},
        partition::{CalendarScheme, PartitionRange, PartitionScheme, SpanScheme},
        refresh::{RefreshCoordinator, RefreshRequest},
        rollup::RollupStrategy,
        value::{KeyValue, Value},
    };
}
