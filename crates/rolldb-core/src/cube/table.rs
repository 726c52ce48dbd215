use crate::{cube::Coordinates, value::{Measures, Value}};
use derive_more::{Deref, IntoIterator};

///
/// Table
///
/// Flat tabular view over the detail rows only: subtotal and grand-total
/// rows never appear, so summing a column does not double-count.
///

#[derive(Clone, Debug, Deref, IntoIterator)]
pub struct Table {
    #[deref]
    #[into_iterator(owned, ref)]
    rows: Vec<TableRow>,
}

impl Table {
    pub(crate) const fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

///
/// TableRow
///

#[derive(Clone, Debug)]
pub struct TableRow {
    coordinates: Coordinates,
    measures: Measures,
}

impl TableRow {
    pub(crate) const fn new(coordinates: Coordinates, measures: Measures) -> Self {
        Self {
            coordinates,
            measures,
        }
    }

    #[must_use]
    pub const fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    #[must_use]
    pub const fn measures(&self) -> &Measures {
        &self.measures
    }

    #[must_use]
    pub fn measure(&self, name: &str) -> Option<&Value> {
        self.measures.get(name)
    }
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

    #[test]
    fn table_holds_detail_rows_only() {
        let descriptor = CubeDescriptor::new(
            vec![DimensionDescriptor::bare("region")],
            vec!["amount".to_string()],
        );
        let rows = vec![
            row(&[
                ("region", Value::from("east")),
                ("amount", Value::from(5_i64)),
                (GROUPING_COLUMN, Value::from("0")),
            ]),
            row(&[
                ("region", Value::from("west")),
                ("amount", Value::from(6_i64)),
                (GROUPING_COLUMN, Value::from("0")),
            ]),
            row(&[
                ("amount", Value::from(11_i64)),
                (GROUPING_COLUMN, Value::from("1")),
            ]),
        ];
        let cube = Cube::from_rows(descriptor, rows).expect("cube");

        let table = cube.table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].measure("amount"), Some(&Value::from(5_i64)));
        assert_eq!(
            table[1]
                .coordinates()
                .get("region")
                .expect("region member")
                .display_member(),
            "west"
        );

        let total: i64 = table
            .iter()
            .filter_map(|r| match r.measure("amount") {
                Some(Value::Int(v)) => Some(*v),
                _ => None,
            })
            .sum();
        assert_eq!(total, 11);
    }
}
