use crate::{
    cube::{
        Coordinates, CubeError,
        repository::{CellEntry, CubeCore},
    },
    error::Error,
    value::{Measures, Value},
};
use derive_more::{Deref, IntoIterator};
use std::rc::Rc;

///
/// Cell
///
/// Handle to one cell of the cube: its coordinates plus the measures
/// aggregated there. Cheap to clone; navigation goes back through the shared
/// repository core, so every handle sees the same caches.
///

#[derive(Clone, Debug)]
pub struct Cell {
    core: Rc<CubeCore>,
    entry: Rc<CellEntry>,
}

impl Cell {
    pub(crate) fn from_parts(core: Rc<CubeCore>, entry: Rc<CellEntry>) -> Self {
        Self { core, entry }
    }

    #[must_use]
    pub fn coordinates(&self) -> &Coordinates {
        &self.entry.coordinates
    }

    #[must_use]
    pub fn measures(&self) -> &Measures {
        &self.entry.measures
    }

    #[must_use]
    pub fn measure(&self, name: &str) -> Option<&Value> {
        self.entry.measures.get(name)
    }

    /// True for synthesized gap cells: no row materialized these
    /// coordinates, so the cell carries no measures.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.entry.is_null
    }

    /// Navigate one dimension up.
    ///
    /// A dimension absent from the coordinates is already rolled up, so the
    /// cell is returned unchanged; rolling every dimension up always lands on
    /// the apex. A dimension that is present must have a materialized parent
    /// row, otherwise the result set is corrupt.
    pub fn roll_up(&self, name: &str) -> Result<Self, Error> {
        if !self.entry.coordinates.contains(name) {
            return Ok(self.clone());
        }
        let parent = self.entry.coordinates.without(name)?;
        let entry = self.core.lookup(&parent).ok_or_else(|| {
            CubeError::corrupt(format!("no cell materialized above dimension {name}"))
        })?;
        Ok(Self::from_parts(Rc::clone(&self.core), entry))
    }

    /// Navigate one dimension down, yielding one child per global member.
    pub fn drill_down(&self, name: &str, fill_gaps: bool) -> Result<Cells, Error> {
        let entries = self.core.drill(&self.entry.coordinates, name, fill_gaps)?;
        let items = entries
            .into_iter()
            .map(|entry| Self::from_parts(Rc::clone(&self.core), entry))
            .collect();
        Ok(Cells::new(name, items))
    }

    /// Fix one dimension at a member. `None` when the member is not a global
    /// member of that dimension.
    pub fn slice(&self, name: &str, member: &Value) -> Result<Option<Self>, Error> {
        let cells = self.drill_down(name, true)?;
        Ok(cells.get_by_member(member).cloned())
    }
}

///
/// Cells
///
/// Children of one drill-down, in global first-seen member order.
///

#[derive(Clone, Debug, Deref, IntoIterator)]
pub struct Cells {
    dimension: String,
    #[deref]
    #[into_iterator(owned, ref)]
    items: Vec<Cell>,
}

impl Cells {
    pub(crate) fn new(dimension: impl Into<String>, items: Vec<Cell>) -> Self {
        Self {
            dimension: dimension.into(),
            items,
        }
    }

    /// The dimension these cells were drilled along.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    #[must_use]
    pub fn get_by_member(&self, member: &Value) -> Option<&Cell> {
        self.items.iter().find(|cell| {
            cell.coordinates()
                .get(&self.dimension)
                .is_some_and(|dimension| dimension.member() == member)
        })
    }
}

///
/// TESTS
///
