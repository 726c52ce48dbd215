use crate::{
    cube::{CubeError, DimensionalityError},
    grouping::GroupingError,
    partition::{RangeError, SchemeError},
    store::StoreError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level runtime error. Wraps the module taxonomies and carries a stable
/// internal classification so callers can route on retryability without
/// matching every variant.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Scheme(#[from] SchemeError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Grouping(#[from] GroupingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cube(#[from] CubeError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Scheme(_) | Self::Grouping(_) => ErrorClass::Config,
            Self::Range(_) => ErrorClass::InvariantViolation,
            Self::Store(err) => err.class(),
            Self::Cube(err) => err.class(),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Scheme(_) => ErrorOrigin::Scheme,
            Self::Range(_) => ErrorOrigin::Scheduler,
            Self::Grouping(_) => ErrorOrigin::Grouping,
            Self::Store(_) => ErrorOrigin::Store,
            Self::Cube(_) => ErrorOrigin::Cube,
        }
    }

    /// True when retrying the same unit of work can succeed (the enclosing
    /// transaction rolled back, nothing partial is visible).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Resource)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin(), self.class(), self)
    }
}

impl From<DimensionalityError> for Error {
    fn from(err: DimensionalityError) -> Self {
        Self::Cube(CubeError::Dimensionality(err))
    }
}

///
/// ErrorClass
///
/// Internal error taxonomy for runtime classification.
/// Config and InvariantViolation are never retried; Resource failures roll
/// back the enclosing transaction and are retryable in full; Capacity means
/// the result is too large and is surfaced, never truncated.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Config,
    InvariantViolation,
    Resource,
    Capacity,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::InvariantViolation => "invariant_violation",
            Self::Resource => "resource",
            Self::Capacity => "capacity",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Scheme,
    Scheduler,
    Grouping,
    Cube,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scheme => "scheme",
            Self::Scheduler => "scheduler",
            Self::Grouping => "grouping",
            Self::Cube => "cube",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
