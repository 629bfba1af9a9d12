//! Column mapping configuration.
//!
//! Maps each semantic [`Field`] to an ordered list of candidate source column
//! names. The first candidate present in a table wins. Defaults cover the
//! generic names plus the AGS and GEF spellings of the same quantities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DownholeError;
use crate::table::RawTable;

/// Semantic quantity a source column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Hole identifier (collars).
    HoleId,
    /// Integer join key between collars and measurement rows.
    HoleIndex,
    /// Collar easting.
    X,
    /// Collar northing.
    Y,
    /// Collar elevation.
    Z,
    /// Distance along the hole.
    Depth,
    /// Interval top.
    Top,
    /// Interval base.
    Base,
    /// Inclination from vertical, degrees.
    Dip,
    /// Bearing clockwise from North, degrees.
    Azimuth,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::HoleId,
        Self::HoleIndex,
        Self::X,
        Self::Y,
        Self::Z,
        Self::Depth,
        Self::Top,
        Self::Base,
        Self::Dip,
        Self::Azimuth,
    ];

    /// Configuration key of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HoleId => "hole_id",
            Self::HoleIndex => "hole_index",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Depth => "depth",
            Self::Top => "top",
            Self::Base => "base",
            Self::Dip => "dip",
            Self::Azimuth => "azimuth",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Source column names for each semantic field.
///
/// Missing keys in a deserialized mapping fall back to [`ColumnMapping::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Candidates for [`Field::HoleId`].
    pub hole_id: Vec<String>,
    /// Candidates for [`Field::HoleIndex`].
    pub hole_index: Vec<String>,
    /// Candidates for [`Field::X`].
    pub x: Vec<String>,
    /// Candidates for [`Field::Y`].
    pub y: Vec<String>,
    /// Candidates for [`Field::Z`].
    pub z: Vec<String>,
    /// Candidates for [`Field::Depth`].
    pub depth: Vec<String>,
    /// Candidates for [`Field::Top`].
    pub top: Vec<String>,
    /// Candidates for [`Field::Base`].
    pub base: Vec<String>,
    /// Candidates for [`Field::Dip`].
    pub dip: Vec<String>,
    /// Candidates for [`Field::Azimuth`].
    pub azimuth: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            hole_id: names(&["hole_id"]),
            hole_index: names(&["hole_index"]),
            x: names(&["x"]),
            y: names(&["y"]),
            z: names(&["z"]),
            depth: names(&["depth", "penetrationLength", "SCPT_DPTH", "SCDG_DPTH"]),
            top: names(&["top", "SCPP_TOP"]),
            base: names(&["base", "SCPP_BASE"]),
            dip: names(&["dip", "inclinationResultant"]),
            azimuth: names(&["azimuth"]),
        }
    }
}

impl ColumnMapping {
    /// Parses a mapping from JSON. Keys that are absent keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, DownholeError> {
        serde_json::from_str(json)
            .map_err(|err| DownholeError::Configuration(format!("invalid column mapping: {err}")))
    }

    /// Candidate column names for a field.
    pub fn candidates(&self, field: Field) -> &[String] {
        match field {
            Field::HoleId => &self.hole_id,
            Field::HoleIndex => &self.hole_index,
            Field::X => &self.x,
            Field::Y => &self.y,
            Field::Z => &self.z,
            Field::Depth => &self.depth,
            Field::Top => &self.top,
            Field::Base => &self.base,
            Field::Dip => &self.dip,
            Field::Azimuth => &self.azimuth,
        }
    }

    /// Replaces the candidates for a field.
    #[must_use]
    pub fn with_candidates<I, S>(mut self, field: Field, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = candidates.into_iter().map(Into::into).collect();
        match field {
            Field::HoleId => self.hole_id = list,
            Field::HoleIndex => self.hole_index = list,
            Field::X => self.x = list,
            Field::Y => self.y = list,
            Field::Z => self.z = list,
            Field::Depth => self.depth = list,
            Field::Top => self.top = list,
            Field::Base => self.base = list,
            Field::Dip => self.dip = list,
            Field::Azimuth => self.azimuth = list,
        }
        self
    }

    /// Position of the first candidate column present in `table`.
    pub fn resolve(&self, field: Field, table: &RawTable) -> Option<usize> {
        self.candidates(field)
            .iter()
            .find_map(|name| table.column_index(name))
    }

    /// Like [`Self::resolve`] but reports a [`DownholeError::SchemaMismatch`].
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] if no candidate is present.
    pub fn require(&self, field: Field, table: &RawTable) -> Result<usize, DownholeError> {
        self.resolve(field, table)
            .ok_or_else(|| DownholeError::SchemaMismatch {
                field: field.to_string(),
                candidates: self.candidates(field).to_vec(),
            })
    }

    /// Positions of every column in `table` that some field resolves to.
    pub fn key_columns(&self, table: &RawTable) -> Vec<usize> {
        Field::ALL
            .iter()
            .filter_map(|&field| self.resolve(field, table))
            .collect()
    }
}
