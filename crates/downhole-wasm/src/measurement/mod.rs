//! Measurement tables recorded along holes.
//!
//! Source tables come in two shapes: distance tables carry one position per
//! row, interval tables a top/base pair. [`MeasurementTable`] is the sum of the
//! two; [`MeasurementTableAdapter`] is the query surface they share.

pub mod distance;
pub mod factory;
pub mod interval;

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::error::DownholeError;
use crate::export::{AttributeFactory, ContinuousAttribute, ObjectDataClient};
use crate::mapping::{ColumnMapping, Field};
use crate::table::{Column, RawTable};

pub use distance::DistanceTable;
pub use factory::MeasurementTableFactory;
pub use interval::IntervalTable;

/// Variant tag of a measurement table, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Single depth column.
    Distance,
    /// Top/base column pair.
    Interval,
}

impl TableKind {
    /// Lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Interval => "interval",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TableKind {
    type Err = DownholeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "interval" => Ok(Self::Interval),
            other => Err(DownholeError::Configuration(format!(
                "unknown table kind `{other}`"
            ))),
        }
    }
}

/// Column positions resolved from the mapping on first use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Hole index column.
    pub hole_index: Option<usize>,
    /// Depth column.
    pub depth: Option<usize>,
    /// Interval top column.
    pub top: Option<usize>,
    /// Interval base column.
    pub base: Option<usize>,
    /// Dip column.
    pub dip: Option<usize>,
    /// Azimuth column.
    pub azimuth: Option<usize>,
}

impl ResolvedColumns {
    const fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::HoleIndex => self.hole_index,
            Field::Depth => self.depth,
            Field::Top => self.top,
            Field::Base => self.base,
            Field::Dip => self.dip,
            Field::Azimuth => self.azimuth,
            Field::HoleId | Field::X | Field::Y | Field::Z => None,
        }
    }
}

/// A raw table, the mapping that interprets it and the lazily resolved
/// column positions.
///
/// The source table is never mutated; queries return fresh vectors.
#[derive(Debug, Clone)]
pub struct MeasurementData {
    table: RawTable,
    mapping: ColumnMapping,
    resolved: OnceLock<ResolvedColumns>,
}

impl MeasurementData {
    /// Wraps a table without resolving any column.
    pub const fn new(table: RawTable, mapping: ColumnMapping) -> Self {
        Self {
            table,
            mapping,
            resolved: OnceLock::new(),
        }
    }

    /// The underlying table.
    pub const fn table(&self) -> &RawTable {
        &self.table
    }

    /// The mapping used to interpret the table.
    pub const fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Resolves and caches mapped column positions. Idempotent.
    pub fn prepare(&self) -> &ResolvedColumns {
        self.resolved.get_or_init(|| {
            let resolve = |field| self.mapping.resolve(field, &self.table);
            ResolvedColumns {
                hole_index: resolve(Field::HoleIndex),
                depth: resolve(Field::Depth),
                top: resolve(Field::Top),
                base: resolve(Field::Base),
                dip: resolve(Field::Dip),
                azimuth: resolve(Field::Azimuth),
            }
        })
    }

    /// Checks that every row has a hole index when the table carries a hole
    /// index column. Tables without one fail later, on first query.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] naming the first row whose
    /// hole index is void or not a whole number.
    pub fn validate_hole_index(&self) -> Result<(), DownholeError> {
        let Some(column) = self.prepare().hole_index.and_then(|i| self.table.column_at(i)) else {
            return Ok(());
        };
        let void = (0..self.table.row_count()).find(|&row| column.i64_at(row).is_none());
        if let Some(row) = void {
            return Err(DownholeError::Configuration(format!(
                "measurement row {row} has no hole index in column `{}`",
                column.name
            )));
        }
        Ok(())
    }

    /// Column backing a semantic field.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the field does not resolve.
    pub fn field_column(&self, field: Field) -> Result<&Column, DownholeError> {
        self.prepare()
            .get(field)
            .and_then(|i| self.table.column_at(i))
            .ok_or_else(|| DownholeError::SchemaMismatch {
                field: field.to_string(),
                candidates: self.mapping.candidates(field).to_vec(),
            })
    }

    /// Row positions belonging to a hole, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the table has no hole
    /// index column.
    pub fn hole_rows(&self, hole_index: i64) -> Result<Vec<usize>, DownholeError> {
        let column = self.field_column(Field::HoleIndex)?;
        Ok((0..self.table.row_count())
            .filter(|&row| column.i64_at(row) == Some(hole_index))
            .collect())
    }

    /// Values of a semantic field for one hole, missing cells kept as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the field or the hole
    /// index does not resolve.
    pub fn field_values(
        &self,
        field: Field,
        hole_index: i64,
    ) -> Result<Vec<Option<f64>>, DownholeError> {
        let column = self.field_column(field)?;
        Ok(self
            .hole_rows(hole_index)?
            .into_iter()
            .map(|row| column.f64_at(row))
            .collect())
    }

    /// Values of a named column for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the column or the hole
    /// index does not resolve.
    pub fn column_values(
        &self,
        name: &str,
        hole_index: i64,
    ) -> Result<Vec<Option<f64>>, DownholeError> {
        let column = self
            .table
            .column(name)
            .ok_or_else(|| DownholeError::SchemaMismatch {
                field: name.to_string(),
                candidates: vec![name.to_string()],
            })?;
        Ok(self
            .hole_rows(hole_index)?
            .into_iter()
            .map(|row| column.f64_at(row))
            .collect())
    }

    /// Distinct hole indices in order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the table has no hole
    /// index column.
    pub fn hole_indices(&self) -> Result<Vec<i64>, DownholeError> {
        let column = self.field_column(Field::HoleIndex)?;
        let mut seen = Vec::new();
        for index in (0..self.table.row_count()).filter_map(|row| column.i64_at(row)) {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
        Ok(seen)
    }
}

/// Query surface shared by distance and interval tables.
pub trait MeasurementTableAdapter {
    /// The wrapped table and mapping.
    fn data(&self) -> &MeasurementData;

    /// Which shape this table has.
    fn kind(&self) -> TableKind;

    /// Representative depth per row for one hole, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if a needed column does not
    /// resolve.
    fn get_depth_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError>;

    /// Dip values in degrees for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the dip column does not
    /// resolve.
    fn get_dip_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data().field_values(Field::Dip, hole_index)
    }

    /// Azimuth values in degrees for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the azimuth column does
    /// not resolve.
    fn get_azimuth_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data().field_values(Field::Azimuth, hole_index)
    }

    /// Values of any numeric column for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if the column does not exist.
    fn get_column_values(
        &self,
        name: &str,
        hole_index: i64,
    ) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data().column_values(name, hole_index)
    }

    /// The underlying table.
    fn table(&self) -> &RawTable {
        self.data().table()
    }

    /// The mapping used to interpret the table.
    fn mapping(&self) -> &ColumnMapping {
        self.data().mapping()
    }

    /// Resolves mapped columns ahead of the first query.
    fn prepare(&self) -> &ResolvedColumns {
        self.data().prepare()
    }

    /// Number of rows in the underlying table.
    fn row_count(&self) -> usize {
        self.data().table().row_count()
    }

    /// Distinct hole indices present in the table.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] without a hole index column.
    fn hole_indices(&self) -> Result<Vec<i64>, DownholeError> {
        self.data().hole_indices()
    }

    /// Whether both dip and azimuth columns resolve.
    fn has_trajectory_columns(&self) -> bool {
        let resolved = self.prepare();
        resolved.dip.is_some() && resolved.azimuth.is_some()
    }

    /// Persists every float column that is not a mapped key column.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from `client`.
    fn attributes<C>(&self, client: &mut C) -> Result<Vec<ContinuousAttribute>, DownholeError>
    where
        C: ObjectDataClient + ?Sized,
        Self: Sized,
    {
        let data = self.data();
        let keys = data.mapping().key_columns(data.table());
        AttributeFactory::create_all(
            data.table()
                .columns()
                .iter()
                .enumerate()
                .filter(|(i, _)| !keys.contains(i))
                .map(|(_, c)| c),
            client,
        )
    }
}

/// A measurement table of either shape.
#[derive(Debug, Clone)]
pub enum MeasurementTable {
    /// Distance-indexed table.
    Distance(DistanceTable),
    /// Interval-indexed table.
    Interval(IntervalTable),
}

impl MeasurementTable {
    /// Returns the distance table, if this is one.
    pub const fn as_distance(&self) -> Option<&DistanceTable> {
        match self {
            Self::Distance(t) => Some(t),
            Self::Interval(_) => None,
        }
    }

    /// Returns the interval table, if this is one.
    pub const fn as_interval(&self) -> Option<&IntervalTable> {
        match self {
            Self::Interval(t) => Some(t),
            Self::Distance(_) => None,
        }
    }
}

impl MeasurementTableAdapter for MeasurementTable {
    fn data(&self) -> &MeasurementData {
        match self {
            Self::Distance(t) => t.data(),
            Self::Interval(t) => t.data(),
        }
    }

    fn kind(&self) -> TableKind {
        match self {
            Self::Distance(t) => t.kind(),
            Self::Interval(t) => t.kind(),
        }
    }

    fn get_depth_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        match self {
            Self::Distance(t) => t.get_depth_values(hole_index),
            Self::Interval(t) => t.get_depth_values(hole_index),
        }
    }
}

impl From<DistanceTable> for MeasurementTable {
    fn from(table: DistanceTable) -> Self {
        Self::Distance(table)
    }
}

impl From<IntervalTable> for MeasurementTable {
    fn from(table: IntervalTable) -> Self {
        Self::Interval(table)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::export::MemoryDataClient;

    fn survey() -> RawTable {
        RawTable::from_columns(vec![
            Column::integer("hole_index", vec![Some(1), Some(2), Some(1), Some(1)]),
            Column::float("depth", vec![Some(5.0), Some(1.0), Some(15.0), Some(25.0)]),
            Column::float("dip", vec![Some(0.0), Some(10.0), None, Some(3.0)]),
            Column::float("cone", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::text("soil", vec![None, None, None, None]),
        ])
        .expect("uniform columns")
    }

    fn distance() -> DistanceTable {
        DistanceTable::new(survey(), ColumnMapping::default()).expect("depth column present")
    }

    #[test]
    fn values_are_filtered_by_hole_in_row_order() {
        let t = distance();
        assert_eq!(
            t.get_depth_values(1).expect("depth"),
            vec![Some(5.0), Some(15.0), Some(25.0)]
        );
        assert_eq!(t.get_depth_values(2).expect("depth"), vec![Some(1.0)]);
        assert!(t.get_depth_values(99).expect("depth").is_empty());
    }

    #[test]
    fn missing_values_pass_through() {
        let t = distance();
        assert_eq!(
            t.get_dip_values(1).expect("dip"),
            vec![Some(0.0), None, Some(3.0)]
        );
    }

    #[test]
    fn absent_mapped_column_fails_lazily() {
        let t = distance();
        let err = t.get_azimuth_values(1).expect_err("no azimuth column");
        assert!(matches!(err, DownholeError::SchemaMismatch { ref field, .. } if field == "azimuth"));
        assert!(!t.has_trajectory_columns());
    }

    #[test]
    fn prepare_is_idempotent() {
        let t = distance();
        let first = *t.prepare();
        let second = *t.prepare();
        assert_eq!(first, second);
        assert_eq!(first.depth, Some(1));
        assert_eq!(first.azimuth, None);
    }

    #[test]
    fn hole_indices_in_first_appearance_order() {
        assert_eq!(distance().hole_indices().expect("hole index"), vec![1, 2]);
    }

    #[test]
    fn named_column_lookup() {
        let t = distance();
        assert_eq!(
            t.get_column_values("cone", 2).expect("cone"),
            vec![Some(2.0)]
        );
        assert!(t.get_column_values("nope", 2).is_err());
    }

    #[test]
    fn attributes_skip_key_and_text_columns() {
        let mut client = MemoryDataClient::new();
        let attributes = distance().attributes(&mut client).expect("memory client");
        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["cone"]);
    }

    #[test]
    fn enum_dispatch_matches_variant() {
        let table = MeasurementTable::from(distance());
        assert_eq!(table.kind(), TableKind::Distance);
        assert!(table.as_distance().is_some());
        assert!(table.as_interval().is_none());
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.table().column_count(), 5);
        assert_eq!(table.mapping(), &ColumnMapping::default());
    }

    #[test]
    fn table_kind_parses_case_insensitively() {
        assert_eq!("Interval".parse::<TableKind>(), Ok(TableKind::Interval));
        assert!("survey".parse::<TableKind>().is_err());
    }
}
