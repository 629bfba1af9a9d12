//! Interval-indexed measurement tables.
//!
//! Each row covers a depth range. For trajectory purposes the top edge is the
//! representative depth of a row.

use crate::error::DownholeError;
use crate::mapping::{ColumnMapping, Field};
use crate::table::RawTable;

use super::{MeasurementData, MeasurementTableAdapter, TableKind};

/// A table with a top/base depth pair per row.
#[derive(Debug, Clone)]
pub struct IntervalTable {
    data: MeasurementData,
}

impl IntervalTable {
    /// Wraps a table that has top and base columns under `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] if top or base does not
    /// resolve or a row has a void hole index, and [`DownholeError::InvalidInterval`] for a row whose top
    /// lies below its base.
    pub fn new(table: RawTable, mapping: ColumnMapping) -> Result<Self, DownholeError> {
        let missing: Vec<&str> = [Field::Top, Field::Base]
            .into_iter()
            .filter(|&f| mapping.resolve(f, &table).is_none())
            .map(Field::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DownholeError::Configuration(format!(
                "interval table needs columns: {}",
                missing.join(", ")
            )));
        }

        let data = MeasurementData::new(table, mapping);
        data.validate_hole_index()?;
        let top = data.field_column(Field::Top)?;
        let base = data.field_column(Field::Base)?;
        for row in 0..data.table().row_count() {
            if let (Some(t), Some(b)) = (top.f64_at(row), base.f64_at(row)) {
                if t > b {
                    return Err(DownholeError::InvalidInterval {
                        row,
                        top: t,
                        base: b,
                    });
                }
            }
        }

        Ok(Self { data })
    }

    /// Interval tops for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] without a hole index column.
    pub fn get_top_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data.field_values(Field::Top, hole_index)
    }

    /// Interval bases for one hole.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] without a hole index column.
    pub fn get_base_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data.field_values(Field::Base, hole_index)
    }
}

impl MeasurementTableAdapter for IntervalTable {
    fn data(&self) -> &MeasurementData {
        &self.data
    }

    fn kind(&self) -> TableKind {
        TableKind::Interval
    }

    fn get_depth_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.get_top_values(hole_index)
    }
}
