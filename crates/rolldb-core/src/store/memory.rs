use crate::{
    grouping::GroupingField,
    partition::PartitionScheme,
    rollup::RollupStrategy,
    store::{
        DirtyMarker, FlatQuery, FlatRow, GROUPING_COLUMN, MarkerFilter, StatusStore, StoreError,
        SummaryStore,
    },
    value::{KeyValue, Measures, Value},
};
use std::{cmp::Ordering, collections::BTreeMap, ops::Range};

///
/// CONSTANTS
///

/// Grouping-set enumeration guard; 2^16 combinations is already far beyond
/// any summary definition this store is meant to back.
const MAX_CUBE_DIMENSIONS: usize = 16;

///
/// MeasureAggregate
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MeasureAggregate {
    Sum,
    Count,
    Min,
    Max,
}

impl MeasureAggregate {
    /// Fold one raw source value into the accumulator.
    fn apply_source(
        self,
        measures: &mut Measures,
        name: &str,
        value: &Value,
    ) -> Result<(), StoreError> {
        let next = match (measures.get(name), self) {
            (None, Self::Count) => Value::Uint(1),
            (None, _) => value.clone(),
            (Some(acc), Self::Sum) => add_values(name, acc, value)?,
            (Some(acc), Self::Count) => add_values(name, acc, &Value::Uint(1))?,
            (Some(acc), Self::Min) => acc.clone().min(value.clone()),
            (Some(acc), Self::Max) => acc.clone().max(value.clone()),
        };
        measures.insert(name.to_string(), next);
        Ok(())
    }

    /// Fold one already-aggregated value into the accumulator. Counts add;
    /// extrema stay extrema.
    fn merge(self, measures: &mut Measures, name: &str, value: &Value) -> Result<(), StoreError> {
        let next = match (measures.get(name), self) {
            (None, _) => value.clone(),
            (Some(acc), Self::Sum | Self::Count) => add_values(name, acc, value)?,
            (Some(acc), Self::Min) => acc.clone().min(value.clone()),
            (Some(acc), Self::Max) => acc.clone().max(value.clone()),
        };
        measures.insert(name.to_string(), next);
        Ok(())
    }
}

fn add_values(name: &str, acc: &Value, value: &Value) -> Result<Value, StoreError> {
    match (acc, value) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        (Value::Uint(a), Value::Uint(b)) => Ok(Value::Uint(a + b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::None, other) | (other, Value::None) => Ok(other.clone()),
        _ => Err(StoreError::TypeMismatch {
            name: name.to_string(),
        }),
    }
}

///
/// MeasureSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MeasureSpec {
    pub name: String,
    pub aggregate: MeasureAggregate,
}

impl MeasureSpec {
    pub fn new(name: impl Into<String>, aggregate: MeasureAggregate) -> Self {
        Self {
            name: name.into(),
            aggregate,
        }
    }
}

///
/// SourceRecord
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceRecord {
    pub key: KeyValue,
    pub dimensions: BTreeMap<String, Value>,
    pub measures: BTreeMap<String, Value>,
}

///
/// SummaryRecord
///
/// One materialized summary row: partition stamp, grouping mask and the
/// detail dimension members the mask leaves concrete.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SummaryRecord {
    pub level: u32,
    pub partition_key: KeyValue,
    pub grouping: GroupingField,
    pub dimensions: BTreeMap<String, Value>,
    pub measures: Measures,
}

///
/// MemoryStore
///
/// In-memory reference implementation of both persistence ports: real
/// grouping-set and group-all aggregation over a vector of source records,
/// with snapshot rollback standing in for database transactions. Production
/// deployments put the SQL emitter behind the same traits.
///

#[derive(Clone, Debug)]
pub struct MemoryStore<P: PartitionScheme> {
    scheme: P,
    dimensions: Vec<String>,
    measures: Vec<MeasureSpec>,
    source: Vec<SourceRecord>,
    summary: Vec<SummaryRecord>,
    marks: BTreeMap<String, KeyValue>,
    markers: Vec<(String, DirtyMarker)>,
    fail_next_rollup: Option<String>,
}

impl<P: PartitionScheme> MemoryStore<P> {
    #[must_use]
    pub const fn new(scheme: P, dimensions: Vec<String>, measures: Vec<MeasureSpec>) -> Self {
        Self {
            scheme,
            dimensions,
            measures,
            source: Vec::new(),
            summary: Vec::new(),
            marks: BTreeMap::new(),
            markers: Vec::new(),
            fail_next_rollup: None,
        }
    }

    pub fn insert_source(&mut self, record: SourceRecord) {
        self.source.push(record);
    }

    #[must_use]
    pub fn summary_rows(&self) -> &[SummaryRecord] {
        &self.summary
    }

    #[must_use]
    pub fn dirty_markers(&self) -> &[(String, DirtyMarker)] {
        &self.markers
    }

    /// Arrange for the next rollup statement to fail, exercising rollback.
    pub fn fail_next_rollup(&mut self, message: impl Into<String>) {
        self.fail_next_rollup = Some(message.into());
    }

    fn consume_rollup_failure(&mut self) -> Result<(), StoreError> {
        match self.fail_next_rollup.take() {
            Some(message) => Err(StoreError::Backend { message }),
            None => Ok(()),
        }
    }

    fn masks_for(&self, strategy: RollupStrategy) -> Result<Vec<GroupingField>, StoreError> {
        let width = self.dimensions.len();
        if width > MAX_CUBE_DIMENSIONS {
            return Err(StoreError::backend(format!(
                "grouping-set enumeration over {width} dimensions is not supported"
            )));
        }
        match strategy {
            RollupStrategy::GroupAll => Ok(vec![GroupingField::all_detail(width)]),
            RollupStrategy::GroupingSets => Ok((0u32..1 << width)
                .map(|mask| {
                    GroupingField::new((0..width).map(|bit| mask & (1 << bit) != 0).collect())
                })
                .collect()),
        }
    }

    fn classify(&self, key: &KeyValue, level: u32) -> Result<KeyValue, StoreError> {
        self.scheme
            .partition_for_key(key, level)
            .map(|partition| partition.key().clone())
            .map_err(|err| StoreError::backend(err.to_string()))
    }

    fn detail_values(&self, mask: &GroupingField, lookup: impl Fn(&str) -> Value) -> Vec<Value> {
        self.dimensions
            .iter()
            .zip(mask.bits())
            .filter(|(_, rolled)| !**rolled)
            .map(|(name, _)| lookup(name))
            .collect()
    }

    fn detail_map(&self, mask: &GroupingField, values: Vec<Value>) -> BTreeMap<String, Value> {
        self.dimensions
            .iter()
            .zip(mask.bits())
            .filter(|(_, rolled)| !**rolled)
            .map(|(name, _)| name.clone())
            .zip(values)
            .collect()
    }

    fn measure_spec(&self, name: &str) -> Result<&MeasureSpec, StoreError> {
        self.measures
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| StoreError::UnknownColumn {
                name: name.to_string(),
            })
    }
}

impl<P: PartitionScheme> SummaryStore for MemoryStore<P> {
    fn delete_summary(
        &mut self,
        level: u32,
        window: Range<KeyValue>,
    ) -> Result<u64, StoreError> {
        let before = self.summary.len();
        self.summary
            .retain(|record| record.level != level || !window.contains(&record.partition_key));
        Ok((before - self.summary.len()) as u64)
    }

    fn rollup_from_source(
        &mut self,
        level: u32,
        window: Range<KeyValue>,
        strategy: RollupStrategy,
    ) -> Result<u64, StoreError> {
        self.consume_rollup_failure()?;
        let masks = self.masks_for(strategy)?;

        let mut groups: BTreeMap<(KeyValue, GroupingField, Vec<Value>), Measures> =
            BTreeMap::new();
        for record in &self.source {
            if !window.contains(&record.key) {
                continue;
            }
            let partition_key = self.classify(&record.key, level)?;
            for mask in &masks {
                let detail = self.detail_values(mask, |name| {
                    record.dimensions.get(name).cloned().unwrap_or(Value::None)
                });
                let entry = groups
                    .entry((partition_key.clone(), mask.clone(), detail))
                    .or_default();
                for spec in &self.measures {
                    let value = record.measures.get(&spec.name).cloned().unwrap_or(Value::None);
                    spec.aggregate.apply_source(entry, &spec.name, &value)?;
                }
            }
        }

        let inserted = groups.len() as u64;
        for ((partition_key, grouping, detail), measures) in groups {
            let dimensions = self.detail_map(&grouping, detail);
            self.summary.push(SummaryRecord {
                level,
                partition_key,
                grouping,
                dimensions,
                measures,
            });
        }
        Ok(inserted)
    }

    fn rollup_from_summary(
        &mut self,
        level: u32,
        source_level: u32,
        window: Range<KeyValue>,
        strategy: RollupStrategy,
    ) -> Result<u64, StoreError> {
        self.consume_rollup_failure()?;

        let finer: Vec<SummaryRecord> = self
            .summary
            .iter()
            .filter(|record| {
                record.level == source_level && window.contains(&record.partition_key)
            })
            .cloned()
            .collect();

        let mut groups: BTreeMap<(KeyValue, GroupingField, Vec<Value>), Measures> =
            BTreeMap::new();
        for record in finer {
            if strategy == RollupStrategy::GroupAll && record.grouping.is_total() {
                continue;
            }
            let partition_key = self.classify(&record.partition_key, level)?;
            let detail = self.detail_values(&record.grouping, |name| {
                record.dimensions.get(name).cloned().unwrap_or(Value::None)
            });
            let entry = groups
                .entry((partition_key, record.grouping.clone(), detail))
                .or_default();
            for spec in &self.measures {
                let value = record.measures.get(&spec.name).cloned().unwrap_or(Value::None);
                spec.aggregate.merge(entry, &spec.name, &value)?;
            }
        }

        let inserted = groups.len() as u64;
        for ((partition_key, grouping, detail), measures) in groups {
            let dimensions = self.detail_map(&grouping, detail);
            self.summary.push(SummaryRecord {
                level,
                partition_key,
                grouping,
                dimensions,
                measures,
            });
        }
        Ok(inserted)
    }

    fn run_flat_query(&self, query: &FlatQuery) -> Result<Vec<FlatRow>, StoreError> {
        for name in &query.dimensions {
            if !self.dimensions.contains(name) {
                return Err(StoreError::UnknownColumn { name: name.clone() });
            }
        }

        let base: Vec<&SummaryRecord> = self
            .summary
            .iter()
            .filter(|record| record.level == query.level && !record.grouping.is_total())
            .filter(|record| {
                query.filters.iter().all(|(name, value)| {
                    record.dimensions.get(name).unwrap_or(&Value::None) == value
                })
            })
            .collect();

        // Rollup-shaped combinations only: detail columns lead, rolled-up
        // columns trail, matching the positional grouping-mask layout.
        let mut rows: Vec<FlatRow> = Vec::new();
        let width = query.dimensions.len();
        for detail_count in (0..=width).rev() {
            let detail_dims = &query.dimensions[..detail_count];
            let mask: String =
                "0".repeat(detail_count) + &"1".repeat(width - detail_count);

            let mut groups: BTreeMap<Vec<Value>, Measures> = BTreeMap::new();
            for record in &base {
                let key: Vec<Value> = detail_dims
                    .iter()
                    .map(|name| record.dimensions.get(name).cloned().unwrap_or(Value::None))
                    .collect();
                let entry = groups.entry(key).or_default();
                for name in &query.measures {
                    let spec = self.measure_spec(name)?;
                    let value = record.measures.get(name).cloned().unwrap_or(Value::None);
                    spec.aggregate.merge(entry, name, &value)?;
                }
            }

            for (key, measures) in groups {
                let mut row: FlatRow = detail_dims
                    .iter()
                    .cloned()
                    .zip(key)
                    .collect();
                row.extend(measures);
                row.insert(GROUPING_COLUMN.to_string(), Value::Text(mask.clone()));
                rows.push(row);
            }
        }

        rows.sort_by(|left, right| {
            for column in &query.order {
                let ordering = left
                    .get(column)
                    .unwrap_or(&Value::None)
                    .cmp(right.get(column).unwrap_or(&Value::None));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            left.cmp(right)
        });

        if let Some(limit) = query.row_limit {
            if rows.len() > limit {
                return Err(StoreError::RowLimitExceeded { limit });
            }
        }
        Ok(rows)
    }

    fn source_key_bounds(&self) -> Result<Option<(KeyValue, KeyValue)>, StoreError> {
        let min = self.source.iter().map(|record| &record.key).min();
        let max = self.source.iter().map(|record| &record.key).max();
        Ok(match (min, max) {
            (Some(min), Some(max)) => Some((min.clone(), max.clone())),
            _ => None,
        })
    }

    fn with_transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, StoreError>,
    {
        let summary = self.summary.clone();
        let marks = self.marks.clone();
        let markers = self.markers.clone();

        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.summary = summary;
                self.marks = marks;
                self.markers = markers;
                Err(err)
            }
        }
    }
}

impl<P: PartitionScheme> StatusStore for MemoryStore<P> {
    fn high_water_mark(&self, target: &str) -> Result<Option<KeyValue>, StoreError> {
        Ok(self.marks.get(target).cloned())
    }

    fn set_high_water_mark(&mut self, target: &str, mark: KeyValue) -> Result<(), StoreError> {
        self.marks.insert(target.to_string(), mark);
        Ok(())
    }

    fn list_dirty_markers(
        &self,
        target: &str,
        filter: &MarkerFilter,
    ) -> Result<Vec<DirtyMarker>, StoreError> {
        Ok(self
            .markers
            .iter()
            .filter(|(owner, marker)| owner == target && marker.matches(filter))
            .map(|(_, marker)| marker.clone())
            .collect())
    }

    fn raise_dirty_marker(
        &mut self,
        target: &str,
        marker: DirtyMarker,
    ) -> Result<(), StoreError> {
        let exists = self
            .markers
            .iter()
            .any(|(owner, existing)| owner == target && existing == &marker);
        if !exists {
            self.markers.push((target.to_string(), marker));
        }
        Ok(())
    }

    fn clear_dirty_markers(
        &mut self,
        target: &str,
        filter: &MarkerFilter,
    ) -> Result<u64, StoreError> {
        let before = self.markers.len();
        self.markers
            .retain(|(owner, marker)| owner != target || !marker.matches(filter));
        Ok((before - self.markers.len()) as u64)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::SpanScheme;

    fn scheme() -> SpanScheme {
        SpanScheme::new(vec![1, 31], 1).expect("scheme should build")
    }

    fn sales_store() -> MemoryStore<SpanScheme> {
        let mut store = MemoryStore::new(
            scheme(),
            vec!["region".to_string(), "product".to_string()],
            vec![MeasureSpec::new("sales", MeasureAggregate::Sum)],
        );
        let rows = [
            (1, "east", "widget", 10),
            (1, "east", "gadget", 5),
            (2, "west", "widget", 7),
        ];
        for (key, region, product, sales) in rows {
            store.insert_source(SourceRecord {
                key: KeyValue::Int(key),
                dimensions: BTreeMap::from([
                    ("region".to_string(), Value::from(region)),
                    ("product".to_string(), Value::from(product)),
                ]),
                measures: BTreeMap::from([("sales".to_string(), Value::Int(sales))]),
            });
        }
        store
    }

    #[test]
    fn grouping_sets_rollup_materializes_every_combination() {
        let mut store = sales_store();
        let inserted = store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("rollup");

        // Day 1: 2 detail rows + 2 region subtotals... every mask gets its
        // own group per partition, so both partitions contribute.
        assert!(inserted > 0);
        let grand_totals: Vec<&SummaryRecord> = store
            .summary_rows()
            .iter()
            .filter(|record| record.grouping.to_string() == "11")
            .collect();
        // One grand-total row per day partition.
        assert_eq!(grand_totals.len(), 2);
        let day1 = grand_totals
            .iter()
            .find(|record| record.partition_key == KeyValue::Int(1))
            .expect("day 1 grand total");
        assert_eq!(day1.measures.get("sales"), Some(&Value::Int(15)));
    }

    #[test]
    fn group_all_rollup_materializes_only_detail_rows() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupAll,
            )
            .expect("rollup");
        assert!(
            store
                .summary_rows()
                .iter()
                .all(|record| !record.grouping.is_total())
        );
    }

    #[test]
    fn summary_to_summary_rollup_reaggregates_per_mask() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("day rollup");
        store
            .rollup_from_summary(
                1,
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("month rollup");

        let month_total = store
            .summary_rows()
            .iter()
            .find(|record| record.level == 1 && record.grouping.to_string() == "11")
            .expect("month grand total");
        assert_eq!(month_total.partition_key, KeyValue::Int(1));
        assert_eq!(month_total.measures.get("sales"), Some(&Value::Int(22)));
    }

    #[test]
    fn delete_summary_only_touches_the_window() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupAll,
            )
            .expect("rollup");
        let before = store.summary_rows().len();
        let deleted = store
            .delete_summary(0, KeyValue::Int(1)..KeyValue::Int(2))
            .expect("delete");
        assert!(deleted > 0);
        assert_eq!(store.summary_rows().len(), before - deleted as usize);
        assert!(
            store
                .summary_rows()
                .iter()
                .all(|record| record.partition_key >= KeyValue::Int(2))
        );
    }

    #[test]
    fn transaction_rolls_back_summary_writes_on_failure() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupAll,
            )
            .expect("rollup");
        let before = store.summary_rows().to_vec();

        store.fail_next_rollup("disk on fire");
        let err = store
            .with_transaction(|s| {
                s.delete_summary(0, KeyValue::Int(1)..KeyValue::Int(32))?;
                s.rollup_from_source(
                    0,
                    KeyValue::Int(1)..KeyValue::Int(32),
                    RollupStrategy::GroupAll,
                )?;
                Ok(())
            })
            .expect_err("forced failure");
        assert!(matches!(err, StoreError::Backend { .. }));
        assert_eq!(store.summary_rows(), before.as_slice());
    }

    #[test]
    fn flat_query_emits_rollup_shaped_masks() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("rollup");

        let query = FlatQuery::new(
            0,
            vec!["region".to_string(), "product".to_string()],
            vec!["sales".to_string()],
        );
        let rows = store.run_flat_query(&query).expect("rows");

        let masks: Vec<String> = rows
            .iter()
            .map(|row| {
                row.get(GROUPING_COLUMN)
                    .and_then(Value::as_text)
                    .expect("grouping column")
                    .to_string()
            })
            .collect();
        assert!(masks.iter().all(|mask| {
            matches!(mask.as_str(), "00" | "01" | "11")
        }));

        let grand_total = rows
            .iter()
            .find(|row| row.get(GROUPING_COLUMN) == Some(&Value::from("11")))
            .expect("grand total row");
        assert_eq!(grand_total.get("sales"), Some(&Value::Int(22)));
    }

    #[test]
    fn flat_query_row_limit_is_a_capacity_error() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("rollup");

        let mut query = FlatQuery::new(
            0,
            vec!["region".to_string(), "product".to_string()],
            vec!["sales".to_string()],
        );
        query.row_limit = Some(1);
        let err = store.run_flat_query(&query).expect_err("limit exceeded");
        assert!(matches!(err, StoreError::RowLimitExceeded { limit: 1 }));
    }

    #[test]
    fn flat_query_filters_restrict_rows_to_matching_members() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("rollup");

        let mut query = FlatQuery::new(
            0,
            vec!["region".to_string(), "product".to_string()],
            vec!["sales".to_string()],
        );
        query.filters = vec![("region".to_string(), Value::from("east"))];
        let rows = store.run_flat_query(&query).expect("rows");

        // Detail rows keep eastern members only, and the derived totals
        // re-aggregate over the filtered base.
        assert!(
            rows.iter()
                .filter(|row| row.get(GROUPING_COLUMN) == Some(&Value::from("00")))
                .all(|row| row.get("region") == Some(&Value::from("east")))
        );
        let grand_total = rows
            .iter()
            .find(|row| row.get(GROUPING_COLUMN) == Some(&Value::from("11")))
            .expect("grand total row");
        assert_eq!(grand_total.get("sales"), Some(&Value::Int(15)));
    }

    #[test]
    fn flat_query_orders_rows_by_the_requested_columns() {
        let mut store = sales_store();
        store
            .rollup_from_source(
                0,
                KeyValue::Int(1)..KeyValue::Int(32),
                RollupStrategy::GroupingSets,
            )
            .expect("rollup");

        let mut query = FlatQuery::new(
            0,
            vec!["region".to_string(), "product".to_string()],
            vec!["sales".to_string()],
        );
        query.order = vec!["sales".to_string()];
        let rows = store.run_flat_query(&query).expect("rows");

        let sales: Vec<&Value> = rows
            .iter()
            .map(|row| row.get("sales").expect("sales column"))
            .collect();
        assert_eq!(
            sales,
            vec![
                &Value::Int(5),
                &Value::Int(7),
                &Value::Int(7),
                &Value::Int(10),
                &Value::Int(15),
                &Value::Int(22)
            ]
        );
    }

    #[test]
    fn dirty_marker_listing_honors_the_window_filter() {
        let mut store = sales_store();
        store
            .raise_dirty_marker("sales_summary", DirtyMarker::partition(0, KeyValue::Int(3)))
            .expect("raise");
        store
            .raise_dirty_marker("sales_summary", DirtyMarker::partition(0, KeyValue::Int(40)))
            .expect("raise");
        store
            .raise_dirty_marker("sales_summary", DirtyMarker::whole_summary())
            .expect("raise");

        let windowed = store
            .list_dirty_markers(
                "sales_summary",
                &MarkerFilter::window(0, KeyValue::Int(1)..KeyValue::Int(32)),
            )
            .expect("windowed listing");
        assert_eq!(windowed, vec![DirtyMarker::partition(0, KeyValue::Int(3))]);

        // The unconstrained filter sees everything, including the
        // whole-summary marker a window never matches.
        let all = store
            .list_dirty_markers("sales_summary", &MarkerFilter::all())
            .expect("full listing");
        assert_eq!(all.len(), 3);

        // Other targets' markers stay invisible.
        let other = store
            .list_dirty_markers("other_summary", &MarkerFilter::all())
            .expect("other listing");
        assert!(other.is_empty());
    }

    #[test]
    fn flat_query_rejects_unknown_dimensions() {
        let store = sales_store();
        let query = FlatQuery::new(0, vec!["tenant".to_string()], vec!["sales".to_string()]);
        let err = store.run_flat_query(&query).expect_err("unknown dimension");
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }
}
