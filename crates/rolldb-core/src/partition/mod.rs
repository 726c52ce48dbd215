mod range;
mod scheme;

pub use range::{PartitionRange, RangeError};
pub use scheme::{CalendarScheme, Partition, PartitionScheme, SchemeError, SpanScheme, calendar};
