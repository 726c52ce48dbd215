use crate::{
    cube::{
        Cell, Cells, Coordinates, CubeDescriptor, CubeError, Dimension, Table, TableRow,
    },
    error::Error,
    grouping::{GroupingCodec, GroupingField},
    store::{FlatRow, GROUPING_COLUMN, MEASURES_DIMENSION},
    value::{Measures, Value},
};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

///
/// CellEntry
///
/// Immutable payload of one cell. Shared by reference between the repository
/// maps, the drill cache and every `Cell` handle pointing at it.
///

#[derive(Debug)]
pub(crate) struct CellEntry {
    pub(crate) coordinates: Coordinates,
    pub(crate) measures: Measures,
    pub(crate) is_null: bool,
}

impl CellEntry {
    fn null(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            measures: Measures::new(),
            is_null: true,
        }
    }
}

///
/// CubeData
///
/// The decoded result set. Write-once during `from_rows`, read-only after.
///

#[derive(Debug)]
struct CubeData {
    descriptor: CubeDescriptor,
    ordered_names: Vec<String>,
    cells: BTreeMap<u64, Rc<CellEntry>>,
    members: BTreeMap<String, Vec<Value>>,
    detail_rows: Vec<u64>,
}

///
/// CubeState
///
/// Populate-once caches behind the read-only surface: synthesized gap cells,
/// memoized drill-downs and the running gap-fill count the limit is enforced
/// against.
///

#[derive(Debug, Default)]
struct CubeState {
    synthesized: BTreeMap<u64, Rc<CellEntry>>,
    drill: BTreeMap<(u64, String, bool), Vec<u64>>,
    filled_count: usize,
}

///
/// CubeCore
///

#[derive(Debug)]
pub(crate) struct CubeCore {
    data: CubeData,
    state: RefCell<CubeState>,
}

impl CubeCore {
    fn entry_at(&self, signature: u64) -> Option<Rc<CellEntry>> {
        if let Some(entry) = self.data.cells.get(&signature) {
            return Some(Rc::clone(entry));
        }
        self.state
            .borrow()
            .synthesized
            .get(&signature)
            .map(Rc::clone)
    }

    pub(crate) fn lookup(&self, coordinates: &Coordinates) -> Option<Rc<CellEntry>> {
        self.entry_at(coordinates.signature())
    }

    /// The apex entry. Synthesized as a null cell when the result set carries
    /// no grand-total row; the synthetic apex never counts against the
    /// gap-fill limit.
    pub(crate) fn apex(&self) -> Rc<CellEntry> {
        let root = Coordinates::root();
        let signature = root.signature();
        if let Some(entry) = self.data.cells.get(&signature) {
            return Rc::clone(entry);
        }
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.synthesized.get(&signature) {
            return Rc::clone(entry);
        }
        let entry = Rc::new(CellEntry::null(root));
        state.synthesized.insert(signature, Rc::clone(&entry));
        entry
    }

    /// Synthesize one gap-fill cell, counted against the descriptor limit.
    /// Re-requesting an already-synthesized coordinate is free.
    fn synthesize(&self, coordinates: Coordinates) -> Result<Rc<CellEntry>, CubeError> {
        let signature = coordinates.signature();
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.synthesized.get(&signature) {
            return Ok(Rc::clone(entry));
        }
        let limit = self.data.descriptor.filling_nodes_limit;
        if state.filled_count >= limit {
            return Err(CubeError::TooManyFillingNodes { limit });
        }
        let entry = Rc::new(CellEntry::null(coordinates));
        state.synthesized.insert(signature, Rc::clone(&entry));
        state.filled_count += 1;
        Ok(entry)
    }

    /// Children of `base` along one dimension, in global first-seen member
    /// order. With `fill_gaps` every global member yields a cell, synthesized
    /// as null where no row materialized it; without, only real cells appear.
    pub(crate) fn drill(
        &self,
        base: &Coordinates,
        name: &str,
        fill_gaps: bool,
    ) -> Result<Vec<Rc<CellEntry>>, CubeError> {
        if !self.data.ordered_names.iter().any(|n| n == name) {
            return Err(CubeError::UnknownDimension {
                name: name.to_string(),
            });
        }
        if base.contains(name) {
            return Err(CubeError::DimensionAlreadyFixed {
                name: name.to_string(),
            });
        }

        let cache_key = (base.signature(), name.to_string(), fill_gaps);
        if let Some(signatures) = self.state.borrow().drill.get(&cache_key) {
            return Ok(signatures
                .iter()
                .filter_map(|signature| self.entry_at(*signature))
                .collect());
        }

        let members = self.data.members.get(name).cloned().unwrap_or_default();
        let label = self.data.descriptor.label_for(name).to_string();
        let mut entries = Vec::with_capacity(members.len());
        for member in members {
            let coordinates = base.append(Dimension::new(name, label.clone(), member));
            if let Some(entry) = self.data.cells.get(&coordinates.signature()) {
                entries.push(Rc::clone(entry));
            } else if fill_gaps {
                entries.push(self.synthesize(coordinates)?);
            }
        }

        let signatures = entries
            .iter()
            .map(|entry| entry.coordinates.signature())
            .collect();
        self.state.borrow_mut().drill.insert(cache_key, signatures);

        Ok(entries)
    }

    pub(crate) fn ordered_names(&self) -> &[String] {
        &self.data.ordered_names
    }
}

///
/// CellRepository
///
/// Decodes one flat, grouping-tagged result set into addressable cells and
/// serves every navigation request against them. One repository per result
/// set; the gap-fill limit spans its whole lifetime.
///

#[derive(Debug)]
pub struct CellRepository {
    core: Rc<CubeCore>,
}

impl CellRepository {
    /// Decode a materialized flat result set.
    ///
    /// Every row must carry the reserved grouping column; its mask width must
    /// match the non-measure dimension count, and no two rows may land on the
    /// same coordinates. Violations surface as result-set corruption.
    pub fn from_rows(descriptor: CubeDescriptor, rows: Vec<FlatRow>) -> Result<Self, CubeError> {
        if descriptor.dimensions.is_empty() {
            return Err(CubeError::EmptyDimensionList);
        }

        let ordered_names = descriptor.ordered_names();
        let mask_order: Vec<String> = ordered_names
            .iter()
            .filter(|name| *name != MEASURES_DIMENSION)
            .cloned()
            .collect();
        let uses_measure_dimension = ordered_names.iter().any(|n| n == MEASURES_DIMENSION);

        let mut cells: BTreeMap<u64, Rc<CellEntry>> = BTreeMap::new();
        let mut members: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        let mut detail_rows = Vec::new();

        for row in rows {
            let raw = row.get(GROUPING_COLUMN).ok_or_else(|| {
                CubeError::corrupt(format!("row is missing the {GROUPING_COLUMN} column"))
            })?;
            let Value::Text(mask) = raw else {
                return Err(CubeError::corrupt(format!(
                    "the {GROUPING_COLUMN} column must be text"
                )));
            };
            let field: GroupingField = mask
                .parse()
                .map_err(|err| CubeError::corrupt(format!("bad grouping mask: {err}")))?;
            let split = GroupingCodec::decode(&field, &mask_order)
                .map_err(|err| CubeError::corrupt(format!("bad grouping mask: {err}")))?;

            let mut coordinates = Coordinates::root();
            for name in split.detail {
                let member = row.get(name).cloned().ok_or_else(|| {
                    CubeError::corrupt(format!("row is missing dimension column {name}"))
                })?;
                register_member(&mut members, name, &member);
                coordinates =
                    coordinates.append(Dimension::new(name, descriptor.label_for(name), member));
            }

            let mut measures = Measures::new();
            if uses_measure_dimension {
                let member = row.get(MEASURES_DIMENSION).cloned().ok_or_else(|| {
                    CubeError::corrupt(format!(
                        "row is missing the {MEASURES_DIMENSION} column"
                    ))
                })?;
                let measure_name = member
                    .as_text()
                    .ok_or_else(|| {
                        CubeError::corrupt(format!(
                            "the {MEASURES_DIMENSION} member must name a measure"
                        ))
                    })?
                    .to_string();
                if !descriptor.measures.iter().any(|m| *m == measure_name) {
                    return Err(CubeError::corrupt(format!(
                        "row reports undeclared measure {measure_name}"
                    )));
                }
                let value = row.get(&measure_name).cloned().ok_or_else(|| {
                    CubeError::corrupt(format!("row is missing measure column {measure_name}"))
                })?;
                register_member(&mut members, MEASURES_DIMENSION, &member);
                coordinates = coordinates.append(Dimension::new(
                    MEASURES_DIMENSION,
                    descriptor.label_for(MEASURES_DIMENSION),
                    member,
                ));
                measures.insert(measure_name, value);
            } else {
                for measure in &descriptor.measures {
                    let value = row.get(measure).cloned().ok_or_else(|| {
                        CubeError::corrupt(format!("row is missing measure column {measure}"))
                    })?;
                    measures.insert(measure.clone(), value);
                }
            }

            let is_total = field.is_total();
            let signature = coordinates.signature();
            let entry = Rc::new(CellEntry {
                coordinates,
                measures,
                is_null: false,
            });
            if cells.insert(signature, entry).is_some() {
                return Err(CubeError::corrupt(
                    "two rows decode to the same coordinates",
                ));
            }
            if !is_total {
                detail_rows.push(signature);
            }
        }

        Ok(Self {
            core: Rc::new(CubeCore {
                data: CubeData {
                    descriptor,
                    ordered_names,
                    cells,
                    members,
                    detail_rows,
                },
                state: RefCell::new(CubeState::default()),
            }),
        })
    }

    /// The apex cell: every dimension rolled up.
    #[must_use]
    pub fn apex(&self) -> Cell {
        Cell::from_parts(Rc::clone(&self.core), self.core.apex())
    }

    /// Cell at exactly these coordinates, if one is materialized (or was
    /// previously synthesized by a gap-filled drill-down).
    #[must_use]
    pub fn get_by_coordinates(&self, coordinates: &Coordinates) -> Option<Cell> {
        self.core
            .lookup(coordinates)
            .map(|entry| Cell::from_parts(Rc::clone(&self.core), entry))
    }

    /// Children of `base` along one dimension.
    pub fn cells_by_base_and_dimension(
        &self,
        base: &Coordinates,
        name: &str,
        fill_gaps: bool,
    ) -> Result<Cells, Error> {
        let entries = self.core.drill(base, name, fill_gaps)?;
        let items = entries
            .into_iter()
            .map(|entry| Cell::from_parts(Rc::clone(&self.core), entry))
            .collect();
        Ok(Cells::new(name, items))
    }

    /// Declared dimension names in canonical order.
    #[must_use]
    pub fn ordered_names(&self) -> Vec<String> {
        self.core.ordered_names().to_vec()
    }

    /// Flattened view over the non-subtotal rows, in result-set order.
    #[must_use]
    pub fn table(&self) -> Table {
        let rows = self
            .core
            .data
            .detail_rows
            .iter()
            .filter_map(|signature| self.core.data.cells.get(signature))
            .map(|entry| TableRow::new(entry.coordinates.clone(), entry.measures.clone()))
            .collect();
        Table::new(rows)
    }

    /// Number of cells materialized from rows (synthesized cells excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.data.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.data.cells.is_empty()
    }

    /// Number of gap-fill cells synthesized so far.
    #[must_use]
    pub fn synthesized_count(&self) -> usize {
        self.core.state.borrow().filled_count
    }
}

fn register_member(members: &mut BTreeMap<String, Vec<Value>>, name: &str, member: &Value) {
    let list = members.entry(name.to_string()).or_default();
    if !list.contains(member) {
        list.push(member.clone());
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::DimensionDescriptor;

    fn row(pairs: &[(&str, Value)]) -> FlatRow {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    fn sales_descriptor() -> CubeDescriptor {
        CubeDescriptor::new(
            vec![
                DimensionDescriptor::bare("region"),
                DimensionDescriptor::bare("product"),
            ],
            vec!["amount".to_string()],
        )
    }

    fn sales_rows() -> Vec<FlatRow> {
        vec![
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
        ]
    }

    /// Like `sales_rows` but with a `north` region that only ever occurs
    /// with the `gadget` product, leaving a gap under `widget`.
    fn sparse_rows() -> Vec<FlatRow> {
        let mut rows = sales_rows();
        rows.retain(|r| r.get(GROUPING_COLUMN) != Some(&Value::from("11")));
        rows.push(row(&[
            ("region", Value::from("north")),
            ("product", Value::from("gadget")),
            ("amount", Value::from(7_i64)),
            (GROUPING_COLUMN, Value::from("00")),
        ]));
        rows.push(row(&[
            ("region", Value::from("north")),
            ("amount", Value::from(7_i64)),
            (GROUPING_COLUMN, Value::from("01")),
        ]));
        rows.push(row(&[
            ("amount", Value::from(18_i64)),
            (GROUPING_COLUMN, Value::from("11")),
        ]));
        rows
    }

    #[test]
    fn from_rows_rejects_an_empty_dimension_list() {
        let descriptor = CubeDescriptor::new(Vec::new(), vec!["amount".to_string()]);
        let err = CellRepository::from_rows(descriptor, Vec::new()).expect_err("no dimensions");
        assert_eq!(err, CubeError::EmptyDimensionList);
    }

    #[test]
    fn from_rows_rejects_a_missing_grouping_column() {
        let rows = vec![row(&[
            ("region", Value::from("east")),
            ("product", Value::from("widget")),
            ("amount", Value::from(5_i64)),
        ])];
        let err = CellRepository::from_rows(sales_descriptor(), rows).expect_err("no mask");
        assert!(matches!(err, CubeError::CorruptResultSet { .. }));
    }

    #[test]
    fn from_rows_rejects_a_mask_of_the_wrong_width() {
        let rows = vec![row(&[
            ("region", Value::from("east")),
            ("product", Value::from("widget")),
            ("amount", Value::from(5_i64)),
            (GROUPING_COLUMN, Value::from("0")),
        ])];
        let err = CellRepository::from_rows(sales_descriptor(), rows).expect_err("short mask");
        assert!(matches!(err, CubeError::CorruptResultSet { .. }));
    }

    #[test]
    fn from_rows_rejects_duplicate_coordinates() {
        let mut rows = sales_rows();
        rows.push(row(&[
            ("amount", Value::from(99_i64)),
            (GROUPING_COLUMN, Value::from("11")),
        ]));
        let err = CellRepository::from_rows(sales_descriptor(), rows).expect_err("duplicate");
        assert!(matches!(err, CubeError::CorruptResultSet { .. }));
    }

    #[test]
    fn apex_resolves_to_the_grand_total_row() {
        let repo = CellRepository::from_rows(sales_descriptor(), sales_rows()).expect("repo");
        let apex = repo.apex();
        assert!(!apex.is_null());
        assert_eq!(apex.measure("amount"), Some(&Value::from(11_i64)));
        assert!(apex.coordinates().is_empty());
    }

    #[test]
    fn apex_is_a_null_cell_when_no_grand_total_row_exists() {
        let rows: Vec<FlatRow> = sales_rows()
            .into_iter()
            .filter(|r| r.get(GROUPING_COLUMN) != Some(&Value::from("11")))
            .collect();
        let repo = CellRepository::from_rows(sales_descriptor(), rows).expect("repo");
        let apex = repo.apex();
        assert!(apex.is_null());
        assert_eq!(apex.measure("amount"), None);
        // The synthetic apex never counts against the gap-fill limit.
        assert_eq!(repo.synthesized_count(), 0);
    }

    #[test]
    fn get_by_coordinates_finds_materialized_cells() {
        let repo = CellRepository::from_rows(sales_descriptor(), sales_rows()).expect("repo");
        let coords = Coordinates::root().append(Dimension::new(
            "region",
            "region",
            Value::from("east"),
        ));
        let cell = repo.get_by_coordinates(&coords).expect("east subtotal");
        assert_eq!(cell.measure("amount"), Some(&Value::from(5_i64)));

        let missing = coords.append(Dimension::new("product", "product", Value::from("gizmo")));
        assert!(repo.get_by_coordinates(&missing).is_none());
    }

    #[test]
    fn gap_filling_stops_at_the_configured_limit() {
        let descriptor = sales_descriptor().with_filling_nodes_limit(0);
        let repo = CellRepository::from_rows(descriptor, sparse_rows()).expect("repo");
        // (widget, north) was never materialized; a zero limit rejects the
        // first synthesized node.
        let base = Coordinates::root().append(Dimension::new(
            "product",
            "product",
            Value::from("widget"),
        ));
        let err = repo
            .cells_by_base_and_dimension(&base, "region", true)
            .expect_err("limit is zero");
        assert!(matches!(
            err,
            Error::Cube(CubeError::TooManyFillingNodes { limit: 0 })
        ));
    }

    #[test]
    fn synthesized_cells_are_reused_without_recounting() {
        let descriptor = sales_descriptor().with_filling_nodes_limit(1);
        let repo = CellRepository::from_rows(descriptor, sparse_rows()).expect("repo");
        let base = Coordinates::root().append(Dimension::new(
            "product",
            "product",
            Value::from("widget"),
        ));
        repo.cells_by_base_and_dimension(&base, "region", true)
            .expect("first drill synthesizes the north gap");
        repo.cells_by_base_and_dimension(&base, "region", true)
            .expect("second drill hits the cache");
        assert_eq!(repo.synthesized_count(), 1);
    }

    #[test]
    fn drill_rejects_undeclared_and_already_fixed_dimensions() {
        let repo = CellRepository::from_rows(sales_descriptor(), sales_rows()).expect("repo");
        let base = Coordinates::root().append(Dimension::new(
            "region",
            "region",
            Value::from("east"),
        ));

        let err = repo
            .cells_by_base_and_dimension(&base, "color", false)
            .expect_err("color is not declared");
        assert!(matches!(
            err,
            Error::Cube(CubeError::UnknownDimension { .. })
        ));

        let err = repo
            .cells_by_base_and_dimension(&base, "region", false)
            .expect_err("region is already fixed");
        assert!(matches!(
            err,
            Error::Cube(CubeError::DimensionAlreadyFixed { .. })
        ));
    }

    #[test]
    fn members_keep_first_seen_order_across_the_result_set() {
        let repo = CellRepository::from_rows(sales_descriptor(), sales_rows()).expect("repo");
        let cells = repo
            .cells_by_base_and_dimension(&Coordinates::root(), "region", false)
            .expect("region subtotals");
        let members: Vec<String> = cells
            .iter()
            .map(|cell| {
                cell.coordinates()
                    .get("region")
                    .expect("region member")
                    .display_member()
                    .to_string()
            })
            .collect();
        assert_eq!(members, vec!["east".to_string(), "west".to_string()]);
    }
}
