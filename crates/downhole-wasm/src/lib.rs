#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::indexing_slicing)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `DownholeView` WASM module: borehole collars, measurement tables and their
//! desurveyed 3D extent.

pub mod collars;
pub mod collection;
pub mod cpt;
pub mod error;
pub mod export;
pub mod geometry;
pub mod mapping;
pub mod measurement;
pub mod table;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::collars::HoleCollars;
use crate::collection::{
    saturate_u32, CollectionMeta, CoordinateReferenceSystem, DownholeCollection,
};
use crate::mapping::ColumnMapping;
use crate::measurement::TableKind;
use crate::table::RawTable;

thread_local! {
    static CURRENT_COLLECTION: RefCell<Option<DownholeCollection>> = const { RefCell::new(None) };
}

fn store_collection(collection: DownholeCollection) {
    CURRENT_COLLECTION.with(|c| {
        *c.borrow_mut() = Some(collection);
    });
}

fn with_collection<T>(
    f: impl FnOnce(&mut DownholeCollection) -> Result<T, String>,
) -> Result<T, String> {
    CURRENT_COLLECTION.with(|c| {
        c.borrow_mut()
            .as_mut()
            .map_or_else(|| Err("no collection loaded".to_string()), f)
    })
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Initialize the WASM module. Sets up the panic hook and, with the
/// `debug_logs` feature, a console logger.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_logger();
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
const fn init_logger() {}

/// Start a new collection from a collar table, replacing the current one.
///
/// `collars` is a serialized [`RawTable`]; columns are resolved with the
/// default [`ColumnMapping`]. `crs` is an EPSG code or WKT string.
/// Returns the number of holes.
///
/// # Errors
///
/// Returns a descriptive error string if the table is malformed or misses
/// collar columns.
#[allow(clippy::needless_pass_by_value)]
#[wasm_bindgen]
pub fn load_collars(name: &str, collars: JsValue, crs: Option<String>) -> Result<u32, JsValue> {
    let table: RawTable = from_js(collars)?;
    load_collars_internal(name, &table, crs.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Internal collar loading shared between the wasm export and native tests.
#[doc(hidden)]
pub fn load_collars_internal(
    name: &str,
    table: &RawTable,
    crs: Option<&str>,
) -> Result<u32, String> {
    let collars =
        HoleCollars::from_table(table, &ColumnMapping::default()).map_err(|e| e.to_string())?;
    let mut collection = DownholeCollection::new(collars, name);
    if let Some(crs) = crs {
        let crs = crs
            .parse::<CoordinateReferenceSystem>()
            .map_err(|e| e.to_string())?;
        collection = collection.with_coordinate_reference_system(crs);
    }
    let holes = saturate_u32(collection.collars().len());
    store_collection(collection);
    Ok(holes)
}

/// Add a measurement table to the current collection.
///
/// `mapping` is an optional partial [`ColumnMapping`] object; fields it does
/// not name keep their defaults. Returns `"distance"` or `"interval"`.
///
/// # Errors
///
/// Returns a descriptive error string if no collection is loaded or the
/// table matches no measurement shape.
#[wasm_bindgen]
pub fn add_table(table: JsValue, mapping: JsValue) -> Result<String, JsValue> {
    let table: RawTable = from_js(table)?;
    let mapping: Option<ColumnMapping> = if mapping.is_undefined() || mapping.is_null() {
        None
    } else {
        Some(from_js(mapping)?)
    };
    add_table_internal(table, mapping.as_ref()).map_err(|e| JsValue::from_str(&e))
}

/// Internal table insertion shared between the wasm export and native tests.
#[doc(hidden)]
pub fn add_table_internal(
    table: RawTable,
    mapping: Option<&ColumnMapping>,
) -> Result<String, String> {
    with_collection(|c| {
        c.add_measurement_table(table, mapping)
            .map(|kind| kind.to_string())
            .map_err(|e| e.to_string())
    })
}

/// Retrieve the extent of the current collection.
///
/// Returns `[xmin, xmax, ymin, ymax, zmin, zmax]`, or an empty array when no
/// collection is loaded or no hole has a usable survey.
///
/// # Errors
///
/// Returns a descriptive error string if a surveyed table has no hole index
/// column.
#[wasm_bindgen]
pub fn get_bounding_box() -> Result<Vec<f64>, JsValue> {
    get_bounding_box_internal().map_err(|e| JsValue::from_str(&e))
}

/// Internal bounding box query shared between the wasm export and native tests.
#[doc(hidden)]
pub fn get_bounding_box_internal() -> Result<Vec<f64>, String> {
    CURRENT_COLLECTION.with(|c| {
        c.borrow().as_ref().map_or_else(
            || Ok(Vec::new()),
            |collection| {
                collection
                    .get_bounding_box()
                    .map(|b| b.map_or_else(Vec::new, |b| b.to_array().to_vec()))
                    .map_err(|e| e.to_string())
            },
        )
    })
}

/// Count the measurement tables of the current collection, optionally only
/// those of `kind` (`"distance"` or `"interval"`). Returns 0 when no
/// collection is loaded.
///
/// # Errors
///
/// Returns a descriptive error string for an unknown kind.
#[allow(clippy::needless_pass_by_value)]
#[wasm_bindgen]
pub fn table_count(kind: Option<String>) -> Result<u32, JsValue> {
    table_count_internal(kind.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Internal table count shared between the wasm export and native tests.
#[doc(hidden)]
pub fn table_count_internal(kind: Option<&str>) -> Result<u32, String> {
    let kind = kind
        .map(str::parse::<TableKind>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let filter = kind.as_ref().map(std::slice::from_ref);
    Ok(CURRENT_COLLECTION.with(|c| {
        c.borrow().as_ref().map_or(0, |collection| {
            saturate_u32(collection.get_measurement_tables(filter).len())
        })
    }))
}

/// Summarize the current collection.
///
/// Returns `CollectionMeta` as a `JsValue` via `serde-wasm-bindgen`.
///
/// # Errors
///
/// Returns a descriptive error string if no collection is loaded or the
/// extent cannot be computed.
#[wasm_bindgen]
pub fn collection_meta() -> Result<JsValue, JsValue> {
    let meta = collection_meta_internal().map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&meta).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Internal summary shared between the wasm export and native tests.
#[doc(hidden)]
pub fn collection_meta_internal() -> Result<CollectionMeta, String> {
    with_collection(|c| c.meta().map_err(|e| e.to_string()))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn collar_table() -> RawTable {
        RawTable::from_columns(vec![
            Column::text(
                "hole_id",
                vec![Some("BH1".to_string()), Some("BH2".to_string())],
            ),
            Column::float("x", vec![Some(0.0), Some(10.0)]),
            Column::float("y", vec![Some(0.0), Some(0.0)]),
            Column::float("z", vec![Some(100.0), Some(50.0)]),
        ])
        .expect("uniform collar columns")
    }

    fn survey_table() -> RawTable {
        RawTable::from_columns(vec![
            Column::integer("hole_index", vec![Some(1), Some(1)]),
            Column::float("depth", vec![Some(5.0), Some(15.0)]),
            Column::float("dip", vec![Some(0.0), Some(0.0)]),
            Column::float("azimuth", vec![Some(0.0), Some(0.0)]),
        ])
        .expect("uniform survey columns")
    }

    fn clear() {
        CURRENT_COLLECTION.with(|c| {
            *c.borrow_mut() = None;
        });
    }

    #[test]
    fn queries_without_collection() {
        clear();
        assert_eq!(get_bounding_box_internal(), Ok(Vec::new()));
        assert_eq!(table_count_internal(None), Ok(0));
        assert_eq!(
            add_table_internal(survey_table(), None),
            Err("no collection loaded".to_string()),
            "adding a table needs a collection"
        );
        assert!(collection_meta_internal().is_err(), "no collection => no meta");
    }

    #[test]
    fn load_then_add_then_query() {
        clear();
        assert_eq!(
            load_collars_internal("site", &collar_table(), Some("EPSG:28992")),
            Ok(2)
        );
        assert_eq!(
            add_table_internal(survey_table(), None),
            Ok("distance".to_string())
        );
        assert_eq!(
            get_bounding_box_internal(),
            Ok(vec![0.0, 0.0, 0.0, 0.0, 85.0, 100.0])
        );
        assert_eq!(table_count_internal(Some("distance")), Ok(1));
        assert_eq!(table_count_internal(Some("interval")), Ok(0));

        let meta = collection_meta_internal();
        assert!(meta.is_ok(), "expected meta, got {:?}", meta.as_ref().err());
        let Some(meta) = meta.ok() else {
            return;
        };
        assert_eq!(meta.name, "site");
        assert_eq!(meta.hole_count, 2);
        assert_eq!(meta.coordinate_reference_system.as_deref(), Some("EPSG:28992"));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        clear();
        assert!(table_count_internal(Some("survey")).is_err());
    }

    #[test]
    fn collars_missing_columns_fail_to_load() {
        clear();
        let table = RawTable::from_columns(vec![Column::float("x", vec![Some(0.0)])])
            .expect("single column");
        let result = load_collars_internal("bad", &table, None);
        assert!(result.is_err(), "missing hole_id/y/z should fail");
        assert_eq!(table_count_internal(None), Ok(0));
    }

    #[test]
    fn loading_replaces_previous_collection() {
        clear();
        assert_eq!(load_collars_internal("first", &collar_table(), None), Ok(2));
        assert!(add_table_internal(survey_table(), None).is_ok());
        assert_eq!(load_collars_internal("second", &collar_table(), None), Ok(2));
        assert_eq!(table_count_internal(None), Ok(0));
        assert_eq!(get_bounding_box_internal(), Ok(Vec::new()));
    }
}
