use crate::{
    cube::{Cell, CubeError, DimensionalityError},
    error::Error,
    value::Value,
};
use derive_more::{Deref, IntoIterator};

///
/// Dimensionality
///
/// Tree cursor: which dimensions have been descended (in order), which one
/// the cursor sits on and which remain below it. Immutable; every descent
/// yields a new cursor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dimensionality {
    ancestors: Vec<String>,
    current: Option<String>,
    descendants: Vec<String>,
}

impl Dimensionality {
    /// Cursor at the apex: nothing descended, everything below.
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self {
            ancestors: Vec::new(),
            current: None,
            descendants: names,
        }
    }

    /// Descend into one remaining dimension.
    pub fn descend(&self, name: &str) -> Result<Self, DimensionalityError> {
        let Some(position) = self.descendants.iter().position(|n| n == name) else {
            return Err(DimensionalityError::NotADescendant {
                name: name.to_string(),
            });
        };
        let mut ancestors = self.ancestors.clone();
        if let Some(current) = &self.current {
            ancestors.push(current.clone());
        }
        let mut descendants = self.descendants.clone();
        descendants.remove(position);
        Ok(Self {
            ancestors,
            current: Some(name.to_string()),
            descendants,
        })
    }

    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[must_use]
    pub fn descendants(&self) -> &[String] {
        &self.descendants
    }

    /// How many dimensions have been descended so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors.len() + usize::from(self.current.is_some())
    }
}

///
/// DimensionSelector
///
/// Addresses one remaining dimension either by name or by 1-based ordinal;
/// negative ordinals count from the last remaining dimension.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DimensionSelector {
    Name(String),
    Ordinal(i64),
}

impl From<&str> for DimensionSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for DimensionSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for DimensionSelector {
    fn from(ordinal: i64) -> Self {
        Self::Ordinal(ordinal)
    }
}

impl From<i32> for DimensionSelector {
    fn from(ordinal: i32) -> Self {
        Self::Ordinal(i64::from(ordinal))
    }
}

///
/// Tree
///
/// Hierarchical drill-down view: one node per cell, children enumerated by
/// descending the remaining dimensions with gaps filled.
///

#[derive(Clone, Debug)]
pub struct Tree {
    cell: Cell,
    cursor: Dimensionality,
}

impl Tree {
    #[must_use]
    pub const fn new(cell: Cell, names: Vec<String>) -> Self {
        Self {
            cell,
            cursor: Dimensionality::new(names),
        }
    }

    #[must_use]
    pub const fn cell(&self) -> &Cell {
        &self.cell
    }

    #[must_use]
    pub const fn cursor(&self) -> &Dimensionality {
        &self.cursor
    }

    fn resolve(&self, selector: &DimensionSelector) -> Result<String, CubeError> {
        match selector {
            DimensionSelector::Name(name) => {
                if self.cursor.descendants().iter().any(|n| n == name) {
                    Ok(name.clone())
                } else {
                    Err(DimensionalityError::NotADescendant { name: name.clone() }.into())
                }
            }
            DimensionSelector::Ordinal(ordinal) => {
                let remaining = self.cursor.descendants().len();
                let index = if *ordinal > 0 {
                    usize::try_from(*ordinal - 1).ok()
                } else {
                    ordinal
                        .checked_neg()
                        .and_then(|back| usize::try_from(back).ok())
                        .filter(|back| *back > 0)
                        .and_then(|back| remaining.checked_sub(back))
                };
                index
                    .filter(|index| *index < remaining)
                    .map(|index| self.cursor.descendants()[index].clone())
                    .ok_or(CubeError::OrdinalOutOfRange {
                        ordinal: *ordinal,
                        remaining,
                    })
            }
        }
    }

    /// Child nodes along one remaining dimension, gaps filled.
    pub fn children(&self, selector: impl Into<DimensionSelector>) -> Result<TreeNodes, Error> {
        let name = self.resolve(&selector.into())?;
        let cursor = self.cursor.descend(&name)?;
        let cells = self.cell.drill_down(&name, true)?;
        let items = cells
            .into_iter()
            .map(|cell| Self {
                cell,
                cursor: cursor.clone(),
            })
            .collect();
        Ok(TreeNodes { items })
    }

    /// Follow one member per remaining dimension, in canonical order.
    ///
    /// Members match either by typed equality or by display string. `None`
    /// when some step has no matching child.
    pub fn traverse(&self, members: &[Value]) -> Result<Option<Self>, Error> {
        let mut node = self.clone();
        for member in members {
            if node.cursor.descendants().is_empty() {
                return Ok(None);
            }
            let children = node.children(1)?;
            let Some(next) = children.iter().find(|child| {
                child.cursor.current().is_some_and(|dimension| {
                    child.cell.coordinates().get(dimension).is_some_and(|d| {
                        d.member() == member || d.display_member() == member.to_string()
                    })
                })
            }) else {
                return Ok(None);
            };
            node = next.clone();
        }
        Ok(Some(node))
    }
}

///
/// TreeNodes
///

#[derive(Clone, Debug, Deref, IntoIterator)]
pub struct TreeNodes {
    #[deref]
    #[into_iterator(owned, ref)]
    items: Vec<Tree>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cube::{Cube, CubeDescriptor, DimensionDescriptor},
        store::{FlatRow, GROUPING_COLUMN},
    };

    fn row(pairs: &[(&str, Value)]) -> FlatRow {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    fn sales_cube() -> Cube {
        let descriptor = CubeDescriptor::new(
            vec![
                DimensionDescriptor::bare("region"),
                DimensionDescriptor::bare("product"),
            ],
            vec!["amount".to_string()],
        );
        let rows = vec![
            row(&[
                ("region", Value::from("east")),
                ("product", Value::from("widget")),
                ("amount", Value::from(5_i64)),
                (GROUPING_COLUMN, Value::from("00")),
            ]),
            row(&[
                ("region", Value::from("west")),
                ("product", Value::from("widget")),
                ("amount", Value::from(6_i64)),
                (GROUPING_COLUMN, Value::from("00")),
            ]),
            row(&[
                ("region", Value::from("east")),
                ("amount", Value::from(5_i64)),
                (GROUPING_COLUMN, Value::from("01")),
            ]),
            row(&[
                ("region", Value::from("west")),
                ("amount", Value::from(6_i64)),
                (GROUPING_COLUMN, Value::from("01")),
            ]),
            row(&[
                ("amount", Value::from(11_i64)),
                (GROUPING_COLUMN, Value::from("11")),
            ]),
        ];
        Cube::from_rows(descriptor, rows).expect("cube")
    }

    #[test]
    fn descend_tracks_ancestors_and_descendants() {
        let cursor = Dimensionality::new(vec!["region".to_string(), "product".to_string()]);
        assert_eq!(cursor.depth(), 0);

        let region = cursor.descend("region").expect("region remains");
        assert_eq!(region.current(), Some("region"));
        assert_eq!(region.descendants(), ["product".to_string()]);
        assert_eq!(region.depth(), 1);

        let product = region.descend("product").expect("product remains");
        assert_eq!(product.ancestors(), ["region".to_string()]);
        assert!(product.descendants().is_empty());
        assert_eq!(product.depth(), 2);

        let err = product.descend("region").expect_err("already descended");
        assert!(matches!(err, DimensionalityError::NotADescendant { .. }));
    }

    #[test]
    fn children_by_ordinal_follow_canonical_order() {
        let tree = sales_cube().tree();
        let regions = tree.children(1).expect("first remaining dimension");
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].cursor().current(), Some("region"));

        let by_name = tree.children("region").expect("by name");
        assert_eq!(by_name.len(), 2);

        let last = tree.children(-1).expect("last remaining dimension");
        assert_eq!(last[0].cursor().current(), Some("product"));
    }

    #[test]
    fn out_of_range_ordinals_are_rejected() {
        let tree = sales_cube().tree();
        for ordinal in [0_i64, 3, -3] {
            let err = tree.children(ordinal).expect_err("out of range");
            assert!(matches!(
                err,
                Error::Cube(CubeError::OrdinalOutOfRange { remaining: 2, .. })
            ));
        }
    }

    #[test]
    fn traverse_follows_members_in_canonical_order() {
        let tree = sales_cube().tree();
        let east_widget = tree
            .traverse(&[Value::from("east"), Value::from("widget")])
            .expect("traverse")
            .expect("path exists");
        assert_eq!(
            east_widget.cell().measure("amount"),
            Some(&Value::from(5_i64))
        );
        assert_eq!(east_widget.cursor().depth(), 2);
    }

    #[test]
    fn traverse_misses_return_none() {
        let tree = sales_cube().tree();
        let missing = tree
            .traverse(&[Value::from("south")])
            .expect("traverse runs");
        assert!(missing.is_none());

        let too_deep = tree
            .traverse(&[
                Value::from("east"),
                Value::from("widget"),
                Value::from("extra"),
            ])
            .expect("traverse runs");
        assert!(too_deep.is_none());
    }
}
