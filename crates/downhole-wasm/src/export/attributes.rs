//! Continuous attribute export.
//!
//! A float column becomes a single-column table persisted through an
//! [`ObjectDataClient`], plus the column's sentinel "no data" markers.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::DownholeError;
use crate::table::{Column, ColumnValues};

/// A single float64 column ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousTable {
    data: Vec<Option<f64>>,
}

impl ContinuousTable {
    /// Builds the table from a float column; other column types yield `None`.
    pub fn from_column(column: &Column) -> Option<Self> {
        match &column.values {
            ColumnValues::Float(values) => Some(Self {
                data: values.clone(),
            }),
            ColumnValues::Integer(_) | ColumnValues::Text(_) => None,
        }
    }

    /// Cell values, `None` for voids.
    pub fn values(&self) -> &[Option<f64>] {
        &self.data
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Little-endian float64 payload. Voids are written as NaN.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 8);
        for value in &self.data {
            bytes.extend_from_slice(&value.unwrap_or(f64::NAN).to_le_bytes());
        }
        bytes
    }
}

/// Opaque reference to a persisted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    /// Storage handle.
    pub data: String,
    /// Row count.
    pub length: usize,
    /// Column count.
    pub width: usize,
    /// Element type of the stored column.
    pub data_type: String,
}

/// Persists tables and hands back opaque handles.
pub trait ObjectDataClient {
    /// Saves a continuous table.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::Storage`] if the table cannot be persisted.
    fn save_table(&mut self, table: &ContinuousTable) -> Result<TableInfo, DownholeError>;
}

/// In-memory client addressing tables by the SHA-256 of their payload.
///
/// Saving identical payloads twice stores them once.
#[derive(Debug, Default)]
pub struct MemoryDataClient {
    tables: BTreeMap<String, ContinuousTable>,
}

impl MemoryDataClient {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Looks up a stored table by handle.
    pub fn get(&self, handle: &str) -> Option<&ContinuousTable> {
        self.tables.get(handle)
    }

    /// Number of distinct stored tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl ObjectDataClient for MemoryDataClient {
    fn save_table(&mut self, table: &ContinuousTable) -> Result<TableInfo, DownholeError> {
        let handle = hex::encode(Sha256::digest(table.to_le_bytes()));
        self.tables
            .entry(handle.clone())
            .or_insert_with(|| table.clone());
        Ok(TableInfo {
            data: handle,
            length: table.len(),
            width: 1,
            data_type: "float64".to_string(),
        })
    }
}

/// Sentinel values that mean "no data" in a continuous attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NanContinuous {
    /// Sentinel markers.
    pub values: Vec<f64>,
}

/// A persisted continuous attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousAttribute {
    /// Attribute key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Sentinel value descriptor.
    pub nan_description: NanContinuous,
    /// Handle to the stored values.
    pub values: TableInfo,
}

/// Converts columns into storage-ready attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeFactory;

impl AttributeFactory {
    /// Persists a float column as a continuous attribute.
    ///
    /// Non-float columns are skipped and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from `client`.
    pub fn create<C>(
        name: &str,
        column: &Column,
        client: &mut C,
    ) -> Result<Option<ContinuousAttribute>, DownholeError>
    where
        C: ObjectDataClient + ?Sized,
    {
        let Some(table) = ContinuousTable::from_column(column) else {
            log::debug!("skipping non-numeric column `{name}`");
            return Ok(None);
        };
        let values = client.save_table(&table)?;
        Ok(Some(ContinuousAttribute {
            key: name.to_string(),
            name: name.to_string(),
            nan_description: NanContinuous {
                values: column.nan_values.clone(),
            },
            values,
        }))
    }

    /// Persists every float column of `columns`, skipping the rest.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from `client`.
    pub fn create_all<'a, C>(
        columns: impl IntoIterator<Item = &'a Column>,
        client: &mut C,
    ) -> Result<Vec<ContinuousAttribute>, DownholeError>
    where
        C: ObjectDataClient + ?Sized,
    {
        let mut attributes = Vec::new();
        for column in columns {
            if let Some(attribute) = Self::create(&column.name, column, client)? {
                attributes.push(attribute);
            }
        }
        Ok(attributes)
    }
}
