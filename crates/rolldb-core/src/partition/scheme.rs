use crate::value::KeyValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;
use time::{Date, Month};

///
/// SchemeError
///
/// Configuration-class failures raised by partition schemes.
/// Never retried; a bad level set or an unclassifiable key is a caller bug.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemeError {
    #[error("level {level} is outside the configured set of {count} levels")]
    InvalidLevel { level: u32, count: u32 },

    #[error("invalid level set: {message}")]
    InvalidLevelSet { message: String },

    #[error("key {key} cannot be classified by this scheme")]
    UnsupportedKey { key: KeyValue },

    #[error("key {key} lies outside the scheme's key bounds")]
    KeyOutOfRange { key: KeyValue },

    #[error("partition bounds inverted: [{lower}, {upper})")]
    InvalidBounds { lower: KeyValue, upper: KeyValue },
}

///
/// Partition
///
/// One aggregation bucket: a half-open interval `[lower, upper)` of source
/// keys at one level. Value object; created by a scheme, never mutated.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Partition {
    level: u32,
    key: KeyValue,
    lower: KeyValue,
    upper: KeyValue,
}

impl Partition {
    /// Build one partition, validating the interval invariant.
    pub fn new(
        level: u32,
        key: KeyValue,
        lower: KeyValue,
        upper: KeyValue,
    ) -> Result<Self, SchemeError> {
        if lower >= upper {
            return Err(SchemeError::InvalidBounds { lower, upper });
        }
        Ok(Self {
            level,
            key,
            lower,
            upper,
        })
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn key(&self) -> &KeyValue {
        &self.key
    }

    #[must_use]
    pub const fn lower(&self) -> &KeyValue {
        &self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> &KeyValue {
        &self.upper
    }

    /// True when this partition's interval contains `key`.
    #[must_use]
    pub fn contains(&self, key: &KeyValue) -> bool {
        &self.lower <= key && key < &self.upper
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:{}", self.level, self.key)
    }
}

///
/// PartitionScheme
///
/// Defines the ordered aggregation levels (0 = finest) and classifies raw
/// source keys into partitions. Implementations must keep `containing()`
/// intervals supersets of their children and `next()` contiguous.
///

pub trait PartitionScheme {
    /// Number of configured levels; levels are `0..count`.
    fn level_count(&self) -> u32;

    /// The finest configured level.
    fn lowest_level(&self) -> u32 {
        0
    }

    /// Classify one raw source key into its partition at `level`.
    fn partition_for_key(&self, key: &KeyValue, level: u32) -> Result<Partition, SchemeError>;

    /// The next-higher-level partition whose interval contains `partition`,
    /// or `None` at the coarsest level.
    fn containing(&self, partition: &Partition) -> Result<Option<Partition>, SchemeError> {
        let level = partition.level() + 1;
        if level >= self.level_count() {
            return Ok(None);
        }
        self.partition_for_key(partition.key(), level).map(Some)
    }

    /// The same-level predecessor, or `None` at the scheme's lower key bound.
    fn previous(&self, partition: &Partition) -> Result<Option<Partition>, SchemeError>;

    /// The same-level successor. Half-open intervals make the successor the
    /// partition classified at this partition's upper bound.
    fn next(&self, partition: &Partition) -> Result<Partition, SchemeError> {
        self.partition_for_key(partition.upper(), partition.level())
    }

    fn ensure_level(&self, level: u32) -> Result<(), SchemeError> {
        if level >= self.level_count() {
            return Err(SchemeError::InvalidLevel {
                level,
                count: self.level_count(),
            });
        }
        Ok(())
    }
}

///
/// SpanScheme
///
/// Integer-keyed scheme where every level is a fixed span of raw keys,
/// aligned at `min_key`. Each width must be a multiple of the width below it
/// so parent intervals are exact supersets.
///

#[derive(Clone, Debug)]
pub struct SpanScheme {
    widths: Vec<i64>,
    min_key: i64,
}

impl SpanScheme {
    /// Build one span scheme from per-level widths in raw-key units.
    pub fn new(widths: Vec<i64>, min_key: i64) -> Result<Self, SchemeError> {
        if widths.is_empty() {
            return Err(SchemeError::InvalidLevelSet {
                message: "at least one level width is required".to_string(),
            });
        }
        for (index, width) in widths.iter().enumerate() {
            if *width < 1 {
                return Err(SchemeError::InvalidLevelSet {
                    message: format!("width at level {index} must be positive, got {width}"),
                });
            }
            if index > 0 {
                let below = widths[index - 1];
                if *width <= below || width % below != 0 {
                    return Err(SchemeError::InvalidLevelSet {
                        message: format!(
                            "width {width} at level {index} must be a strict multiple of {below}"
                        ),
                    });
                }
            }
        }
        Ok(Self { widths, min_key })
    }

    fn int_key(key: &KeyValue) -> Result<i64, SchemeError> {
        key.as_int()
            .ok_or_else(|| SchemeError::UnsupportedKey { key: key.clone() })
    }
}

impl PartitionScheme for SpanScheme {
    fn level_count(&self) -> u32 {
        self.widths.len() as u32
    }

    fn partition_for_key(&self, key: &KeyValue, level: u32) -> Result<Partition, SchemeError> {
        self.ensure_level(level)?;
        let raw = Self::int_key(key)?;
        if raw < self.min_key {
            return Err(SchemeError::KeyOutOfRange { key: key.clone() });
        }
        let width = self.widths[level as usize];
        let lower = self.min_key + (raw - self.min_key) / width * width;
        Partition::new(
            level,
            KeyValue::Int(lower),
            KeyValue::Int(lower),
            KeyValue::Int(lower + width),
        )
    }

    fn previous(&self, partition: &Partition) -> Result<Option<Partition>, SchemeError> {
        self.ensure_level(partition.level())?;
        let lower = Self::int_key(partition.lower())?;
        let width = self.widths[partition.level() as usize];
        if lower - width < self.min_key {
            return Ok(None);
        }
        self.partition_for_key(&KeyValue::Int(lower - width), partition.level())
            .map(Some)
    }
}

///
/// CalendarScheme
///
/// Calendar scheme over julian-day-number keys with day < month < year
/// levels. Unbounded below within the supported date range, so `previous()`
/// always yields a partition.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarScheme;

/// Calendar level ordinals.
pub mod calendar {
    pub const DAY: u32 = 0;
    pub const MONTH: u32 = 1;
    pub const YEAR: u32 = 2;
}

impl CalendarScheme {
    fn date_for_key(key: &KeyValue) -> Result<Date, SchemeError> {
        let raw = key
            .as_int()
            .ok_or_else(|| SchemeError::UnsupportedKey { key: key.clone() })?;
        let julian = i32::try_from(raw).map_err(|_| SchemeError::KeyOutOfRange {
            key: key.clone(),
        })?;
        Date::from_julian_day(julian).map_err(|_| SchemeError::KeyOutOfRange { key: key.clone() })
    }

    fn first_of_month(year: i32, month: Month) -> Result<Date, SchemeError> {
        Date::from_calendar_date(year, month, 1).map_err(|_| SchemeError::KeyOutOfRange {
            key: KeyValue::Int(i64::from(year)),
        })
    }

    fn key_of(date: Date) -> KeyValue {
        KeyValue::Int(i64::from(date.to_julian_day()))
    }
}

impl PartitionScheme for CalendarScheme {
    fn level_count(&self) -> u32 {
        3
    }

    fn partition_for_key(&self, key: &KeyValue, level: u32) -> Result<Partition, SchemeError> {
        self.ensure_level(level)?;
        let date = Self::date_for_key(key)?;
        let (lower, upper) = match level {
            calendar::DAY => (date, date.next_day().ok_or(SchemeError::KeyOutOfRange {
                key: key.clone(),
            })?),
            calendar::MONTH => {
                let lower = Self::first_of_month(date.year(), date.month())?;
                let upper = if date.month() == Month::December {
                    Self::first_of_month(date.year() + 1, Month::January)?
                } else {
                    Self::first_of_month(date.year(), date.month().next())?
                };
                (lower, upper)
            }
            _ => {
                let lower = Self::first_of_month(date.year(), Month::January)?;
                let upper = Self::first_of_month(date.year() + 1, Month::January)?;
                (lower, upper)
            }
        };
        Partition::new(
            level,
            Self::key_of(lower),
            Self::key_of(lower),
            Self::key_of(upper),
        )
    }

    fn previous(&self, partition: &Partition) -> Result<Option<Partition>, SchemeError> {
        self.ensure_level(partition.level())?;
        let lower = Self::date_for_key(partition.lower())?;
        let before = lower
            .previous_day()
            .ok_or_else(|| SchemeError::KeyOutOfRange {
                key: partition.lower().clone(),
            })?;
        self.partition_for_key(&Self::key_of(before), partition.level())
            .map(Some)
    }
}

///
/// TESTS
///
