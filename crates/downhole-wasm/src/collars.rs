//! Hole collar table: one row per physical hole.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::DownholeError;
use crate::geometry::Point3;
use crate::mapping::{ColumnMapping, Field};
use crate::table::RawTable;

/// Surface location and identity of one hole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collar {
    /// Unique hole identifier.
    pub hole_id: String,
    /// Stable join key used by measurement rows.
    pub hole_index: i64,
    /// Collar easting.
    pub x: f64,
    /// Collar northing.
    pub y: f64,
    /// Collar elevation.
    pub z: f64,
}

impl Collar {
    /// Collar position as a point.
    pub const fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Indexed collar table.
///
/// Hole indices and identifiers are unique. Indices are assigned once at
/// construction and never re-derived from row position afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoleCollars {
    rows: Vec<Collar>,
    attributes: RawTable,
}

impl HoleCollars {
    /// Builds the table from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::DuplicateHole`] if a hole index or identifier
    /// repeats.
    pub fn new(rows: Vec<Collar>) -> Result<Self, DownholeError> {
        let mut indices = HashSet::with_capacity(rows.len());
        let mut ids = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !indices.insert(row.hole_index) {
                return Err(DownholeError::DuplicateHole(format!(
                    "hole index {} appears more than once",
                    row.hole_index
                )));
            }
            if !ids.insert(row.hole_id.as_str()) {
                return Err(DownholeError::DuplicateHole(format!(
                    "hole id `{}` appears more than once",
                    row.hole_id
                )));
            }
        }
        Ok(Self {
            rows,
            attributes: RawTable::new(),
        })
    }

    /// Builds the table from collar source data.
    ///
    /// Hole id and X/Y/Z are required. When the table has no hole-index
    /// column, indices are assigned from row position starting at 1. Columns
    /// not claimed by the mapping are kept as per-hole attributes.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] if a required column or cell is
    /// missing, and [`DownholeError::DuplicateHole`] on repeated holes.
    pub fn from_table(table: &RawTable, mapping: &ColumnMapping) -> Result<Self, DownholeError> {
        let required = [Field::HoleId, Field::X, Field::Y, Field::Z];
        let missing: Vec<&str> = required
            .iter()
            .filter(|&&f| mapping.resolve(f, table).is_none())
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(DownholeError::Configuration(format!(
                "collar table is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let column = |field: Field| {
            mapping
                .resolve(field, table)
                .and_then(|i| table.column_at(i))
                .ok_or_else(|| {
                    DownholeError::Configuration(format!("collar column `{field}` not found"))
                })
        };
        let hole_id = column(Field::HoleId)?;
        let x = column(Field::X)?;
        let y = column(Field::Y)?;
        let z = column(Field::Z)?;
        let hole_index = mapping
            .resolve(Field::HoleIndex, table)
            .and_then(|i| table.column_at(i));

        let missing_cell = |row: usize, field: Field| {
            DownholeError::Configuration(format!("collar row {row} has no `{field}` value"))
        };

        let mut rows = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let index = match hole_index {
                Some(col) => col
                    .i64_at(row)
                    .ok_or_else(|| missing_cell(row, Field::HoleIndex))?,
                None => i64::try_from(row + 1).map_err(|_| {
                    DownholeError::Configuration("too many collar rows".to_string())
                })?,
            };
            rows.push(Collar {
                hole_id: hole_id
                    .text_at(row)
                    .ok_or_else(|| missing_cell(row, Field::HoleId))?,
                hole_index: index,
                x: x.f64_at(row).ok_or_else(|| missing_cell(row, Field::X))?,
                y: y.f64_at(row).ok_or_else(|| missing_cell(row, Field::Y))?,
                z: z.f64_at(row).ok_or_else(|| missing_cell(row, Field::Z))?,
            });
        }

        let keys = mapping.key_columns(table);
        let attributes = RawTable::from_columns(
            table
                .columns()
                .iter()
                .enumerate()
                .filter(|(i, _)| !keys.contains(i))
                .map(|(_, c)| c.clone())
                .collect(),
        )?;

        let mut collars = Self::new(rows)?;
        collars.attributes = attributes;
        Ok(collars)
    }

    /// Number of holes.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when there are no holes.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates collars in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Collar> {
        self.rows.iter()
    }

    /// Looks up a collar by hole index.
    pub fn get(&self, hole_index: i64) -> Option<&Collar> {
        self.rows.iter().find(|c| c.hole_index == hole_index)
    }

    /// Looks up a collar by hole identifier.
    pub fn find(&self, hole_id: &str) -> Option<&Collar> {
        self.rows.iter().find(|c| c.hole_id == hole_id)
    }

    /// Per-hole metadata columns that are not part of the mapping.
    pub const fn attributes(&self) -> &RawTable {
        &self.attributes
    }
}

impl<'a> IntoIterator for &'a HoleCollars {
    type Item = &'a Collar;
    type IntoIter = std::slice::Iter<'a, Collar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
