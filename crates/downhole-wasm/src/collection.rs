//! The downhole collection: collars plus the measurement tables recorded
//! along them.
//!
//! Collar data is stored once per hole; measurement data once per
//! measurement. The collection also carries the identity and metadata every
//! spatial entity has, and derives its 3D extent by desurveying each hole
//! through every distance table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collars::HoleCollars;
use crate::error::DownholeError;
use crate::export::{AttributeFactory, ContinuousAttribute, ObjectDataClient};
use crate::geometry::{combine_bounding_boxes, hole_bounding_box, BoundingBox};
use crate::mapping::ColumnMapping;
use crate::measurement::{
    MeasurementTable, MeasurementTableAdapter, MeasurementTableFactory, TableKind,
};
use crate::table::RawTable;

/// Coordinate reference system of a spatial entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateReferenceSystem {
    /// EPSG code.
    Epsg(u32),
    /// Well-known text definition.
    Wkt(String),
}

impl FromStr for CoordinateReferenceSystem {
    type Err = DownholeError;

    /// Parses `EPSG:28992`, a bare code, or falls back to WKT.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DownholeError::Configuration(
                "empty coordinate reference system".to_string(),
            ));
        }
        let code = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .and_then(|_| trimmed.get(5..))
            .unwrap_or(trimmed);
        Ok(code
            .parse::<u32>()
            .map_or_else(|_| Self::Wkt(trimmed.to_string()), Self::Epsg))
    }
}

impl fmt::Display for CoordinateReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => write!(f, "EPSG:{code}"),
            Self::Wkt(wkt) => f.write_str(wkt),
        }
    }
}

/// Identity and metadata shared by spatial entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpatialProperties {
    /// Display name.
    pub name: String,
    /// Stable identifier, if assigned.
    pub uuid: Option<Uuid>,
    /// Free text description.
    pub description: Option<String>,
    /// Coordinate reference system of all coordinates.
    pub coordinate_reference_system: Option<CoordinateReferenceSystem>,
    /// Key/value tags.
    pub tags: BTreeMap<String, String>,
    /// Custom extension data.
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// Capability of entities that occupy space.
pub trait SpatialData {
    /// Identity and metadata.
    fn spatial_properties(&self) -> &SpatialProperties;

    /// Axis-aligned extent, `None` when there is no usable geometry.
    ///
    /// # Errors
    ///
    /// Propagates schema errors raised while reading geometry.
    fn bounding_box(&self) -> Result<Option<BoundingBox>, DownholeError>;

    /// Coordinate reference system, if declared.
    fn coordinate_reference_system(&self) -> Option<&CoordinateReferenceSystem> {
        self.spatial_properties().coordinate_reference_system.as_ref()
    }
}

/// Input accepted by [`DownholeCollection::add_measurement_table`].
#[derive(Debug, Clone)]
pub enum MeasurementInput {
    /// An already built adapter.
    Table(Box<MeasurementTable>),
    /// A raw table to run through the factory.
    Raw(RawTable),
}

impl From<MeasurementTable> for MeasurementInput {
    fn from(table: MeasurementTable) -> Self {
        Self::Table(Box::new(table))
    }
}

impl From<RawTable> for MeasurementInput {
    fn from(table: RawTable) -> Self {
        Self::Raw(table)
    }
}

/// Summary of a collection returned to JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionMeta {
    /// Collection name.
    pub name: String,
    /// Number of holes.
    pub hole_count: u32,
    /// Number of measurement tables.
    pub table_count: u32,
    /// Number of distance tables.
    pub distance_table_count: u32,
    /// Number of interval tables.
    pub interval_table_count: u32,
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`, absent without usable geometry.
    pub bounds: Option<[f64; 6]>,
    /// Coordinate reference system, rendered as text.
    pub coordinate_reference_system: Option<String>,
}

pub(crate) fn saturate_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Collars plus an ordered list of measurement tables.
///
/// The list only grows; insertion order is kept for reproducibility.
#[derive(Debug, Clone)]
pub struct DownholeCollection {
    properties: SpatialProperties,
    collars: HoleCollars,
    measurements: Vec<MeasurementTable>,
}

impl DownholeCollection {
    /// Creates a collection with no measurement tables.
    pub fn new(collars: HoleCollars, name: impl Into<String>) -> Self {
        Self {
            properties: SpatialProperties {
                name: name.into(),
                ..SpatialProperties::default()
            },
            collars,
            measurements: Vec::new(),
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub const fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.properties.uuid = Some(uuid);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.properties.description = Some(description.into());
        self
    }

    /// Sets the coordinate reference system.
    #[must_use]
    pub fn with_coordinate_reference_system(mut self, crs: CoordinateReferenceSystem) -> Self {
        self.properties.coordinate_reference_system = Some(crs);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.properties.tags = tags;
        self
    }

    /// Replaces the extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: BTreeMap<String, serde_json::Value>) -> Self {
        self.properties.extensions = extensions;
        self
    }

    /// Adds initial measurement tables in order.
    ///
    /// # Errors
    ///
    /// Propagates the first factory error.
    pub fn with_measurements<I>(
        mut self,
        inputs: I,
        mapping: Option<&ColumnMapping>,
    ) -> Result<Self, DownholeError>
    where
        I: IntoIterator,
        I::Item: Into<MeasurementInput>,
    {
        for input in inputs {
            self.add_measurement_table(input, mapping)?;
        }
        Ok(self)
    }

    /// The collar table.
    pub const fn collars(&self) -> &HoleCollars {
        &self.collars
    }

    /// Mutable access to identity and metadata.
    pub fn properties_mut(&mut self) -> &mut SpatialProperties {
        &mut self.properties
    }

    /// Appends a measurement table.
    ///
    /// Raw tables go through [`MeasurementTableFactory`] using `mapping`, or
    /// the default mapping when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Configuration`] when a raw table matches no
    /// table shape under the mapping.
    pub fn add_measurement_table(
        &mut self,
        input: impl Into<MeasurementInput>,
        mapping: Option<&ColumnMapping>,
    ) -> Result<TableKind, DownholeError> {
        let table = match input.into() {
            MeasurementInput::Table(table) => *table,
            MeasurementInput::Raw(raw) => match mapping {
                Some(mapping) => MeasurementTableFactory::create(raw, mapping)?,
                None => MeasurementTableFactory::create(raw, &ColumnMapping::default())?,
            },
        };
        let kind = table.kind();
        self.measurements.push(table);
        Ok(kind)
    }

    /// Measurement tables in insertion order, optionally restricted to the
    /// given kinds.
    pub fn get_measurement_tables(&self, filter: Option<&[TableKind]>) -> Vec<&MeasurementTable> {
        self.measurements
            .iter()
            .filter(|t| filter.map_or(true, |kinds| kinds.contains(&t.kind())))
            .collect()
    }

    /// Number of measurement tables.
    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }

    /// Extent of every hole's desurveyed trajectory across all distance
    /// tables.
    ///
    /// Interval tables carry no survey and are ignored, as are distance tables
    /// without dip and azimuth columns. Holes with no complete survey row in a
    /// table contribute nothing for that table. Returns `None` when no hole
    /// produced a box.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::SchemaMismatch`] when a surveyed distance
    /// table has no hole index column.
    pub fn get_bounding_box(&self) -> Result<Option<BoundingBox>, DownholeError> {
        let mut boxes = Vec::new();

        for table in self.get_measurement_tables(Some(&[TableKind::Distance])) {
            table.prepare();
            if !table.has_trajectory_columns() {
                log::debug!(
                    "distance table with {} rows has no dip/azimuth columns; skipping",
                    table.row_count()
                );
                continue;
            }
            for collar in &self.collars {
                let depths = table.get_depth_values(collar.hole_index)?;
                let dips = table.get_dip_values(collar.hole_index)?;
                let azimuths = table.get_azimuth_values(collar.hole_index)?;
                match hole_bounding_box(collar.position(), &depths, &dips, &azimuths) {
                    Some(b) => boxes.push(b),
                    None => log::debug!(
                        "hole `{}` has no complete survey rows in this table",
                        collar.hole_id
                    ),
                }
            }
        }

        if boxes.is_empty() {
            return Ok(None);
        }
        combine_bounding_boxes(&boxes).map(Some)
    }

    /// Counts and extent of the collection.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::get_bounding_box`].
    pub fn meta(&self) -> Result<CollectionMeta, DownholeError> {
        let count =
            |kind: TableKind| saturate_u32(self.get_measurement_tables(Some(&[kind])).len());
        Ok(CollectionMeta {
            name: self.properties.name.clone(),
            hole_count: saturate_u32(self.collars.len()),
            table_count: saturate_u32(self.measurements.len()),
            distance_table_count: count(TableKind::Distance),
            interval_table_count: count(TableKind::Interval),
            bounds: self.get_bounding_box()?.map(|b| b.to_array()),
            coordinate_reference_system: self
                .properties
                .coordinate_reference_system
                .as_ref()
                .map(ToString::to_string),
        })
    }

    /// Persists collar metadata columns as continuous attributes.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from `client`.
    pub fn collar_attributes<C>(
        &self,
        client: &mut C,
    ) -> Result<Vec<ContinuousAttribute>, DownholeError>
    where
        C: ObjectDataClient + ?Sized,
    {
        AttributeFactory::create_all(self.collars.attributes().columns(), client)
    }
}

impl SpatialData for DownholeCollection {
    fn spatial_properties(&self) -> &SpatialProperties {
        &self.properties
    }

    fn bounding_box(&self) -> Result<Option<BoundingBox>, DownholeError> {
        self.get_bounding_box()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::collars::Collar;
    use crate::export::MemoryDataClient;
    use crate::table::Column;

    fn collars() -> HoleCollars {
        HoleCollars::new(vec![Collar {
            hole_id: "BH1".to_string(),
            hole_index: 1,
            x: 0.0,
            y: 0.0,
            z: 100.0,
        }])
        .expect("unique holes")
    }

    fn survey(depth: Vec<Option<f64>>, dip: Vec<Option<f64>>, az: Vec<Option<f64>>) -> RawTable {
        let holes = vec![Some(1); depth.len()];
        RawTable::from_columns(vec![
            Column::integer("hole_index", holes),
            Column::float("depth", depth),
            Column::float("dip", dip),
            Column::float("azimuth", az),
        ])
        .expect("uniform columns")
    }

    fn intervals() -> RawTable {
        RawTable::from_columns(vec![
            Column::integer("hole_index", vec![Some(1)]),
            Column::float("top", vec![Some(0.0)]),
            Column::float("base", vec![Some(500.0)]),
        ])
        .expect("uniform columns")
    }

    #[test]
    fn empty_collection_has_no_bounding_box() {
        let c = DownholeCollection::new(collars(), "empty");
        assert_eq!(c.get_bounding_box(), Ok(None));
    }

    #[test]
    fn collar_at_hundred_scenario() {
        let mut c = DownholeCollection::new(collars(), "scenario");
        c.add_measurement_table(
            survey(
                vec![Some(5.0), Some(15.0)],
                vec![Some(0.0), Some(0.0)],
                vec![Some(0.0), Some(0.0)],
            ),
            None,
        )
        .expect("distance table");
        let b = c.get_bounding_box().expect("schema ok").expect("one hole");
        assert_eq!(b.to_array(), [0.0, 0.0, 0.0, 0.0, 85.0, 100.0]);
    }

    #[test]
    fn interval_tables_do_not_contribute_geometry() {
        let mut c = DownholeCollection::new(collars(), "intervals");
        c.add_measurement_table(intervals(), None).expect("interval table");
        assert_eq!(c.get_bounding_box(), Ok(None));
    }

    #[test]
    fn distance_table_without_survey_columns_is_skipped() {
        let mut c = DownholeCollection::new(collars(), "cpt");
        let cpt = RawTable::from_columns(vec![
            Column::integer("hole_index", vec![Some(1)]),
            Column::float("penetrationLength", vec![Some(20.0)]),
        ])
        .expect("uniform columns");
        c.add_measurement_table(cpt, None).expect("distance table");
        assert_eq!(c.get_bounding_box(), Ok(None));
    }

    #[test]
    fn filter_preserves_insertion_order() {
        let mut c = DownholeCollection::new(collars(), "mixed");
        let first = survey(vec![Some(1.0)], vec![Some(0.0)], vec![Some(0.0)]);
        let second = survey(vec![Some(1.0), Some(2.0)], vec![None, None], vec![None, None]);
        c.add_measurement_table(first, None).expect("distance");
        c.add_measurement_table(intervals(), None).expect("interval");
        c.add_measurement_table(second, None).expect("distance");

        let distance = c.get_measurement_tables(Some(&[TableKind::Distance]));
        let rows: Vec<usize> = distance.iter().map(|t| t.row_count()).collect();
        assert_eq!(rows, vec![1, 2]);

        assert_eq!(c.get_measurement_tables(None).len(), 3);
        assert!(c.get_measurement_tables(Some(&[])).is_empty());
    }

    #[test]
    fn raw_table_without_shape_is_a_configuration_error() {
        let mut c = DownholeCollection::new(collars(), "bad");
        let raw = RawTable::from_columns(vec![Column::float("cone", vec![Some(1.0)])])
            .expect("single column");
        let err = c.add_measurement_table(raw, None).expect_err("no shape");
        assert!(matches!(err, DownholeError::Configuration(_)));
        assert_eq!(c.measurement_count(), 0);
    }

    #[test]
    fn surveyed_table_without_hole_index_is_a_schema_mismatch() {
        let mut c = DownholeCollection::new(collars(), "no index");
        let raw = RawTable::from_columns(vec![
            Column::float("depth", vec![Some(1.0)]),
            Column::float("dip", vec![Some(0.0)]),
            Column::float("azimuth", vec![Some(0.0)]),
        ])
        .expect("uniform columns");
        c.add_measurement_table(raw, None).expect("distance table");
        assert!(matches!(
            c.get_bounding_box(),
            Err(DownholeError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn meta_counts_tables_by_kind() {
        let mut c = DownholeCollection::new(collars(), "meta")
            .with_coordinate_reference_system(CoordinateReferenceSystem::Epsg(2193));
        c.add_measurement_table(
            survey(vec![Some(10.0)], vec![Some(90.0)], vec![Some(0.0)]),
            None,
        )
        .expect("distance");
        c.add_measurement_table(intervals(), None).expect("interval");
        let meta = c.meta().expect("schema ok");
        assert_eq!(meta.hole_count, 1);
        assert_eq!(meta.table_count, 2);
        assert_eq!(meta.distance_table_count, 1);
        assert_eq!(meta.interval_table_count, 1);
        assert_eq!(meta.coordinate_reference_system.as_deref(), Some("EPSG:2193"));
        let bounds = meta.bounds.expect("one surveyed hole");
        assert!((bounds[3] - 10.0).abs() < 1e-9);
        assert!((bounds[4] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn prebuilt_table_is_added_without_the_factory() {
        let raw = survey(vec![Some(10.0)], vec![Some(0.0)], vec![Some(0.0)]);
        let table = MeasurementTableFactory::create(raw, &ColumnMapping::default())
            .expect("distance shape");
        let id = Uuid::from_u128(7);
        let mut c = DownholeCollection::new(collars(), "prebuilt").with_uuid(id);
        assert_eq!(c.add_measurement_table(table, None), Ok(TableKind::Distance));
        assert_eq!(c.measurement_count(), 1);
        assert_eq!(c.spatial_properties().uuid, Some(id));
        let b = c.get_bounding_box().expect("schema ok").expect("surveyed hole");
        assert_eq!(b.to_array(), [0.0, 0.0, 0.0, 0.0, 90.0, 100.0]);
    }

    #[test]
    fn void_hole_index_rows_are_rejected_on_insert() {
        let mut c = DownholeCollection::new(collars(), "void");
        let raw = RawTable::from_columns(vec![
            Column::integer("hole_index", vec![None, Some(1)]),
            Column::float("depth", vec![Some(50.0), Some(5.0)]),
            Column::float("dip", vec![Some(0.0), Some(0.0)]),
            Column::float("azimuth", vec![Some(0.0), Some(0.0)]),
        ])
        .expect("uniform columns");
        let err = c.add_measurement_table(raw, None).expect_err("void index");
        assert!(matches!(err, DownholeError::Configuration(_)));
        assert_eq!(c.measurement_count(), 0);
    }

    #[test]
    fn crs_parsing() {
        assert_eq!(
            "EPSG:28992".parse::<CoordinateReferenceSystem>(),
            Ok(CoordinateReferenceSystem::Epsg(28992))
        );
        assert_eq!(
            "epsg:4326".parse::<CoordinateReferenceSystem>(),
            Ok(CoordinateReferenceSystem::Epsg(4326))
        );
        assert_eq!(
            "2193".parse::<CoordinateReferenceSystem>(),
            Ok(CoordinateReferenceSystem::Epsg(2193))
        );
        assert!(matches!(
            "PROJCS[\"local\"]".parse::<CoordinateReferenceSystem>(),
            Ok(CoordinateReferenceSystem::Wkt(_))
        ));
        assert!("  ".parse::<CoordinateReferenceSystem>().is_err());
        assert_eq!(CoordinateReferenceSystem::Epsg(7415).to_string(), "EPSG:7415");
    }

    #[test]
    fn spatial_data_exposes_metadata() {
        let c = DownholeCollection::new(collars(), "meta")
            .with_description("site investigation")
            .with_coordinate_reference_system(CoordinateReferenceSystem::Epsg(28992));
        assert_eq!(c.spatial_properties().name, "meta");
        assert_eq!(
            c.coordinate_reference_system(),
            Some(&CoordinateReferenceSystem::Epsg(28992))
        );
        assert_eq!(
            c.spatial_properties().description.as_deref(),
            Some("site investigation")
        );
    }

    #[test]
    fn collar_attributes_export_float_metadata() {
        let table = RawTable::from_columns(vec![
            Column::text("hole_id", vec![Some("BH1".to_string())]),
            Column::float("x", vec![Some(0.0)]),
            Column::float("y", vec![Some(0.0)]),
            Column::float("z", vec![Some(0.0)]),
            Column::float("final_depth", vec![Some(12.0)]),
            Column::text("contractor", vec![Some("acme".to_string())]),
        ])
        .expect("uniform columns");
        let collars =
            HoleCollars::from_table(&table, &ColumnMapping::default()).expect("valid collars");
        let c = DownholeCollection::new(collars, "attrs");
        let mut client = MemoryDataClient::new();
        let attributes = c.collar_attributes(&mut client).expect("memory client");
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].name, "final_depth");
    }
}
