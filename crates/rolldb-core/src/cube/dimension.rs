use crate::{cube::DEFAULT_FILLING_NODES_LIMIT, value::Value};

///
/// Dimension
///
/// One named dimension member inside a coordinate tuple: the typed member
/// used for equality and hashing, the raw member as the backend produced it
/// and a display form for presentation-side matching.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dimension {
    name: String,
    label: String,
    member: Value,
    raw_member: Value,
    display_member: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, label: impl Into<String>, member: Value) -> Self {
        let display_member = member.to_string();
        Self {
            name: name.into(),
            label: label.into(),
            raw_member: member.clone(),
            member,
            display_member,
        }
    }

    #[must_use]
    pub fn with_raw_member(mut self, raw_member: Value) -> Self {
        self.raw_member = raw_member;
        self
    }

    #[must_use]
    pub fn with_display_member(mut self, display_member: impl Into<String>) -> Self {
        self.display_member = display_member.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn member(&self) -> &Value {
        &self.member
    }

    #[must_use]
    pub const fn raw_member(&self) -> &Value {
        &self.raw_member
    }

    #[must_use]
    pub fn display_member(&self) -> &str {
        &self.display_member
    }
}

///
/// DimensionDescriptor
///
/// Declared dimension: name plus presentation label. Declaration order is
/// the canonical dimension order used by the grouping mask and the tree.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DimensionDescriptor {
    pub name: String,
    pub label: String,
}

impl DimensionDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Descriptor whose label is its name.
    pub fn bare(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
        }
    }
}

///
/// CubeDescriptor
///
/// Everything the repository needs to decode one flat result set: ordered
/// dimensions, measure names and the gap-fill ceiling.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CubeDescriptor {
    pub dimensions: Vec<DimensionDescriptor>,
    pub measures: Vec<String>,
    pub filling_nodes_limit: usize,
}

impl CubeDescriptor {
    #[must_use]
    pub fn new(dimensions: Vec<DimensionDescriptor>, measures: Vec<String>) -> Self {
        Self {
            dimensions,
            measures,
            filling_nodes_limit: DEFAULT_FILLING_NODES_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_filling_nodes_limit(mut self, limit: usize) -> Self {
        self.filling_nodes_limit = limit;
        self
    }

    #[must_use]
    pub fn ordered_names(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }

    /// Declared label for `name`, or `name` itself when undeclared.
    #[must_use]
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.dimensions
            .iter()
            .find(|descriptor| descriptor.name == name)
            .map_or(name, |descriptor| descriptor.label.as_str())
    }
}

///
/// TESTS
///
