//! Cone penetration test soundings.
//!
//! [`CptData`] is the immutable record a CPT reader hands over. GEF files
//! carry header blocks on top of that, so [`GefCpt`] holds the record plus the
//! headers side by side instead of extending the record itself.

use std::collections::BTreeMap;

use crate::collars::{Collar, HoleCollars};
use crate::collection::DownholeCollection;
use crate::error::DownholeError;
use crate::mapping::{ColumnMapping, Field};
use crate::table::{Column, RawTable};

/// Extension key under which GEF headers are stored on a collection.
pub const GEF_HEADERS_EXTENSION: &str = "gef_headers";

/// GEF header blocks, keyed by header name.
pub type GefHeaders = BTreeMap<String, Vec<String>>;

/// One sounding: where it was taken and what it measured.
#[derive(Debug, Clone, PartialEq)]
pub struct CptData {
    name: String,
    x: f64,
    y: f64,
    z: Option<f64>,
    data: RawTable,
}

impl CptData {
    /// Creates a record. `z` is the surface level, if known.
    pub fn new(name: impl Into<String>, x: f64, y: f64, z: Option<f64>, data: RawTable) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z,
            data,
        }
    }

    /// Sounding name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Easting.
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Northing.
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Surface level.
    pub const fn z(&self) -> Option<f64> {
        self.z
    }

    /// Measurement rows.
    pub const fn data(&self) -> &RawTable {
        &self.data
    }
}

/// A CPT record together with the GEF headers it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct GefCpt {
    base: CptData,
    gef_headers: Option<GefHeaders>,
}

impl GefCpt {
    /// Wraps a record, optionally attaching headers.
    pub const fn from_base(base: CptData, gef_headers: Option<GefHeaders>) -> Self {
        Self { base, gef_headers }
    }

    /// The wrapped record.
    pub const fn base(&self) -> &CptData {
        &self.base
    }

    /// Headers, if the source had any.
    pub const fn gef_headers(&self) -> Option<&GefHeaders> {
        self.gef_headers.as_ref()
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_gef_headers(mut self, gef_headers: Option<GefHeaders>) -> Self {
        self.gef_headers = gef_headers;
        self
    }

    /// Splits into the record and its headers.
    pub fn into_parts(self) -> (CptData, Option<GefHeaders>) {
        (self.base, self.gef_headers)
    }
}

impl From<CptData> for GefCpt {
    fn from(base: CptData) -> Self {
        Self::from_base(base, None)
    }
}

/// Builds a collection with one hole per sounding.
///
/// Holes are indexed from 1 in input order. Each sounding's rows are tagged
/// with its hole index and added as its own measurement table. Soundings
/// without a surface level are placed at `z = 0`.
///
/// # Errors
///
/// Returns [`DownholeError::DuplicateHole`] for repeated sounding names,
/// [`DownholeError::Configuration`] if a table already has a hole-index
/// column or matches no table shape.
pub fn collection_from_cpts(
    name: &str,
    cpts: Vec<GefCpt>,
    mapping: &ColumnMapping,
) -> Result<DownholeCollection, DownholeError> {
    let index_column = mapping
        .candidates(Field::HoleIndex)
        .first()
        .cloned()
        .ok_or_else(|| {
            DownholeError::Configuration("mapping has no hole_index column name".to_string())
        })?;

    let mut collars = Vec::with_capacity(cpts.len());
    let mut tables = Vec::with_capacity(cpts.len());
    let mut headers = serde_json::Map::new();

    for (position, cpt) in cpts.into_iter().enumerate() {
        let hole_index = i64::try_from(position + 1)
            .map_err(|_| DownholeError::Configuration("too many soundings".to_string()))?;
        let (base, gef_headers) = cpt.into_parts();

        if mapping.resolve(Field::HoleIndex, &base.data).is_some() {
            return Err(DownholeError::Configuration(format!(
                "sounding `{}` already has a hole index column",
                base.name
            )));
        }

        if let Some(h) = gef_headers {
            let value = serde_json::to_value(h).map_err(|err| {
                DownholeError::Configuration(format!("unserialisable GEF headers: {err}"))
            })?;
            headers.insert(base.name.clone(), value);
        }

        let rows = base.data.row_count();
        tables.push(
            base.data
                .with_column(Column::integer(index_column.clone(), vec![Some(hole_index); rows]))?,
        );
        collars.push(Collar {
            hole_id: base.name,
            hole_index,
            x: base.x,
            y: base.y,
            z: base.z.unwrap_or(0.0),
        });
    }

    log::debug!(
        "building collection `{name}` from {} soundings",
        collars.len()
    );

    let mut collection = DownholeCollection::new(HoleCollars::new(collars)?, name)
        .with_measurements(tables, Some(mapping))?;
    if !headers.is_empty() {
        collection.properties_mut().extensions.insert(
            GEF_HEADERS_EXTENSION.to_string(),
            serde_json::Value::Object(headers),
        );
    }
    Ok(collection)
}
