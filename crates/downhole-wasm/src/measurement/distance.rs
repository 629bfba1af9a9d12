//! Distance-indexed measurement tables.

use crate::error::DownholeError;
use crate::mapping::{ColumnMapping, Field};
use crate::table::RawTable;

use super::{MeasurementData, MeasurementTableAdapter, TableKind};

/// A table with one depth value per row.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    data: MeasurementData,
}

impl DistanceTable {
    /// Wraps a table that has a depth column under `mapping`.
    ///
    /// Other mapped columns are resolved lazily on first query.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] if no depth column resolves
    /// or a row has a void hole index.
    pub fn new(table: RawTable, mapping: ColumnMapping) -> Result<Self, DownholeError> {
        if mapping.resolve(Field::Depth, &table).is_none() {
            return Err(DownholeError::Configuration(format!(
                "distance table needs a depth column (looked for {:?})",
                mapping.candidates(Field::Depth)
            )));
        }
        let data = MeasurementData::new(table, mapping);
        data.validate_hole_index()?;
        Ok(Self { data })
    }
}

impl MeasurementTableAdapter for DistanceTable {
    fn data(&self) -> &MeasurementData {
        &self.data
    }

    fn kind(&self) -> TableKind {
        TableKind::Distance
    }

    fn get_depth_values(&self, hole_index: i64) -> Result<Vec<Option<f64>>, DownholeError> {
        self.data.field_values(Field::Depth, hole_index)
    }
}
