use crate::{
    cube::{CubeError, Dimension},
    value::VALUE_HASH_SEED,
};
use std::collections::BTreeMap;
use xxhash_rust::xxh3::Xxh3;

///
/// Coordinates
///
/// Order-independent mapping from dimension name to member. Immutable and
/// copy-on-append: tuples grow one dimension at a time while cube rows are
/// decoded and never change once a cell is published.
///
/// Two tuples are equal iff they hold the same name/member pairs, whatever
/// the append order; the signature hashes the sorted pairs, so it shares
/// that property and serves as the repository map key.
///

#[derive(Clone, Debug, Default)]
pub struct Coordinates {
    dimensions: BTreeMap<String, Dimension>,
}

impl Coordinates {
    /// The empty tuple (the apex coordinate).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            dimensions: BTreeMap::new(),
        }
    }

    /// Copy-on-append; re-appending an existing name replaces its member.
    #[must_use]
    pub fn append(&self, dimension: Dimension) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.insert(dimension.name().to_string(), dimension);
        Self { dimensions }
    }

    /// Copy without one dimension.
    pub fn without(&self, name: &str) -> Result<Self, CubeError> {
        if !self.dimensions.contains_key(name) {
            return Err(CubeError::DimensionNotFound {
                name: name.to_string(),
            });
        }
        let mut dimensions = self.dimensions.clone();
        dimensions.remove(name);
        Ok(Self { dimensions })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.values()
    }

    /// Content signature over the sorted (name, member-hash) pairs.
    #[must_use]
    pub fn signature(&self) -> u64 {
        let mut hasher = Xxh3::with_seed(VALUE_HASH_SEED);
        for (name, dimension) in &self.dimensions {
            hasher.update(&(name.len() as u64).to_be_bytes());
            hasher.update(name.as_bytes());
            hasher.update(&dimension.member().stable_hash().to_be_bytes());
        }
        hasher.digest()
    }

    /// True when every pair of `other` also appears here.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.iter().all(|dimension| {
            self.get(dimension.name())
                .is_some_and(|own| own.member() == dimension.member())
        })
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions.len() == other.dimensions.len() && self.covers(other)
    }
}

impl Eq for Coordinates {}

///
/// TESTS
///
