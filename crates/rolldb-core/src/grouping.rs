use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// GroupingError
///
/// Malformed grouping bitmask taxonomy. Configuration-class when the caller
/// supplies the mask; the cube layer reclassifies parse failures on persisted
/// rows as result-set corruption.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum GroupingError {
    #[error("grouping field has {found} bits, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("grouping field contains '{found}' at position {index}, expected '0' or '1'")]
    InvalidBit { found: char, index: usize },
}

///
/// GroupingField
///
/// Fixed-length bitmask, one bit per non-measure dimension in canonical
/// order: `1` means the dimension is rolled up to a subtotal in this row.
/// Wire form is a `{0,1}` string (the reserved `__grouping` column).
///

#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct GroupingField {
    bits: Vec<bool>,
}

impl GroupingField {
    #[must_use]
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// The all-detail mask (no subtotals) of the given width.
    #[must_use]
    pub fn all_detail(width: usize) -> Self {
        Self {
            bits: vec![false; width],
        }
    }

    /// The grand-total mask (every dimension rolled up) of the given width.
    #[must_use]
    pub fn grand_total(width: usize) -> Self {
        Self {
            bits: vec![true; width],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// A row is a subtotal/grand-total row iff any bit is set.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.bits.iter().any(|bit| *bit)
    }

    #[must_use]
    pub fn zero_count(&self) -> usize {
        self.bits.iter().filter(|bit| !**bit).count()
    }

    #[must_use]
    pub fn one_count(&self) -> usize {
        self.bits.len() - self.zero_count()
    }

    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl FromStr for GroupingField {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for (index, ch) in s.chars().enumerate() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                found => return Err(GroupingError::InvalidBit { found, index }),
            }
        }
        Ok(Self { bits })
    }
}

impl fmt::Display for GroupingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

///
/// GroupingSplit
///
/// Decoded classification of one row's dimensions.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupingSplit<'a> {
    pub detail: Vec<&'a str>,
    pub grouping: Vec<&'a str>,
}

///
/// GroupingCodec
///

pub struct GroupingCodec;

impl GroupingCodec {
    /// Encode the subtotaled dimension set against the canonical order, one
    /// bit per position.
    #[must_use]
    pub fn encode(subtotal_dims: &BTreeSet<String>, ordered_dims: &[String]) -> GroupingField {
        GroupingField::new(
            ordered_dims
                .iter()
                .map(|name| subtotal_dims.contains(name))
                .collect(),
        )
    }

    /// Decode a grouping field against the canonical order.
    ///
    /// The split is position-based, not per-bit: detail dimensions are the
    /// leading `zero_count` names and grouping dimensions are the trailing
    /// `one_count` names. This mirrors exactly how grouping-set output rows
    /// are laid out (detail columns lead, rolled-up columns trail).
    pub fn decode<'a>(
        field: &GroupingField,
        ordered_dims: &'a [String],
    ) -> Result<GroupingSplit<'a>, GroupingError> {
        if field.len() != ordered_dims.len() {
            return Err(GroupingError::LengthMismatch {
                expected: ordered_dims.len(),
                found: field.len(),
            });
        }
        let detail_count = field.zero_count();
        Ok(GroupingSplit {
            detail: ordered_dims[..detail_count]
                .iter()
                .map(String::as_str)
                .collect(),
            grouping: ordered_dims[detail_count..]
                .iter()
                .map(String::as_str)
                .collect(),
        })
    }
}

///
/// TESTS
///
