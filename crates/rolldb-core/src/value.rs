use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use xxhash_rust::xxh3::Xxh3;

///
/// CONSTANTS
///

/// Stable XXH3 seed used by canonical value hashing across releases.
pub(crate) const VALUE_HASH_SEED: u64 = 0;

///
/// KeyValue
///
/// Totally ordered source/partition key. A well-configured scheme only ever
/// produces one variant; the cross-variant ordering (integers before text)
/// exists so `Ord` stays total.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum KeyValue {
    Int(i64),
    Text(String),
}

impl KeyValue {
    /// Return the integer payload, if this key is an integer key.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Int(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Int(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

///
/// Value
///
/// Dimension member / measure scalar. Ordering is total; floats compare via
/// `total_cmp` so `Value` can key deterministic containers.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Return true when this value is the null member.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Borrow the text payload, if this value is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Canonical variant tag fed into the stable value hash.
    const fn tag(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Uint(_) => 3,
            Self::Float(_) => 4,
            Self::Text(_) => 5,
        }
    }

    /// Feed this value's canonical byte form into a hasher state.
    pub(crate) fn feed(&self, hasher: &mut Xxh3) {
        hasher.update(&[self.tag()]);
        match self {
            Self::None => {}
            Self::Bool(value) => hasher.update(&[u8::from(*value)]),
            Self::Int(value) => hasher.update(&value.to_be_bytes()),
            Self::Uint(value) => hasher.update(&value.to_be_bytes()),
            Self::Float(value) => hasher.update(&value.to_bits().to_be_bytes()),
            Self::Text(value) => {
                hasher.update(&(value.len() as u64).to_be_bytes());
                hasher.update(value.as_bytes());
            }
        }
    }

    /// Stable 64-bit content hash, identical across processes and releases.
    #[must_use]
    pub fn stable_hash(&self) -> u64 {
        let mut hasher = Xxh3::with_seed(VALUE_HASH_SEED);
        self.feed(&mut hasher);
        hasher.digest()
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::None, Self::None) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Uint(a), Self::Uint(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, ""),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

///
/// Measures
///
/// Canonical measure container; BTreeMap keeps iteration deterministic.
///

pub type Measures = std::collections::BTreeMap<String, Value>;

///
/// TESTS
///
