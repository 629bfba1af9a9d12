//! Core geometry types: points, survey stations and the 3D bounding box.

use serde::Serialize;

use crate::error::DownholeError;

/// 3D point in the collection's coordinate reference system.
///
/// X is easting, Y is northing, Z is elevation (up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
    /// Elevation.
    pub z: f64,
}

impl Point3 {
    /// Creates a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One complete directional survey sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyStation {
    /// Measured depth along the hole.
    pub depth: f64,
    /// Inclination from vertical in degrees (0 = straight down).
    pub dip: f64,
    /// Bearing clockwise from North in degrees.
    pub azimuth: f64,
}

/// Axis-aligned 3D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
    /// Minimum Z coordinate.
    pub min_z: f64,
    /// Maximum Z coordinate.
    pub max_z: f64,
}

impl BoundingBox {
    /// Creates an empty bounding box that will expand with the first `update` call.
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut bounds = Self::new();
        for p in points {
            bounds.update(p.x, p.y, p.z);
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    /// Expands the bounding box to include the given point.
    pub fn update(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    /// Smallest box enclosing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
            min_z: self.min_z.min(other.min_z),
            max_z: self.max_z.max(other.max_z),
        }
    }

    /// Returns `true` until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y || self.min_z > self.max_z
    }

    /// Flattens to `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub const fn to_array(&self) -> [f64; 6] {
        [
            self.min_x, self.max_x, self.min_y, self.max_y, self.min_z, self.max_z,
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines per-hole boxes into one enclosing box.
///
/// # Errors
///
/// Returns [`DownholeError::InvalidValue`] for an empty slice; callers only
/// combine when at least one box was produced.
pub fn combine_bounding_boxes(boxes: &[BoundingBox]) -> Result<BoundingBox, DownholeError> {
    let Some((first, rest)) = boxes.split_first() else {
        return Err(DownholeError::InvalidValue(
            "bounding box list is empty".to_string(),
        ));
    };
    Ok(rest.iter().fold(*first, |acc, b| acc.union(b)))
}
