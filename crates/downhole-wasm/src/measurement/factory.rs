//! Chooses the measurement table variant from the columns a table carries.

use crate::error::DownholeError;
use crate::mapping::{ColumnMapping, Field};
use crate::table::RawTable;

use super::{DistanceTable, IntervalTable, MeasurementTable};

/// Builds [`MeasurementTable`]s from raw tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementTableFactory;

impl MeasurementTableFactory {
    /// Wraps `table` in the variant its columns support.
    ///
    /// A resolvable top/base pair makes an interval table; otherwise a depth
    /// column makes a distance table.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] naming the missing columns when
    /// neither shape resolves, or the variant's own construction error.
    pub fn create(
        table: RawTable,
        mapping: &ColumnMapping,
    ) -> Result<MeasurementTable, DownholeError> {
        let has = |field| mapping.resolve(field, &table).is_some();
        let (top, base, depth) = (has(Field::Top), has(Field::Base), has(Field::Depth));

        if top && base {
            log::debug!("building interval table from {} rows", table.row_count());
            return IntervalTable::new(table, mapping.clone()).map(MeasurementTable::Interval);
        }
        if depth {
            log::debug!("building distance table from {} rows", table.row_count());
            return DistanceTable::new(table, mapping.clone()).map(MeasurementTable::Distance);
        }

        let mut missing = vec![Field::Depth.as_str()];
        if !top {
            missing.push(Field::Top.as_str());
        }
        if !base {
            missing.push(Field::Base.as_str());
        }
        Err(DownholeError::Configuration(format!(
            "no measurement table shape resolves; missing columns: {} (table has: {})",
            missing.join(", "),
            table.column_names().collect::<Vec<_>>().join(", ")
        )))
    }
}
