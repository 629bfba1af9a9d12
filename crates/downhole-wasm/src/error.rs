//! Error types for the downhole data model.

use thiserror::Error;

/// Errors that can occur while building or querying a downhole collection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DownholeError {
    /// Construction-time requirements are unmet (missing mapping, no
    /// resolvable column set, malformed configuration).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A query touched a field whose mapped columns are absent from the table.
    #[error("schema mismatch: no column for `{field}` (looked for {candidates:?})")]
    SchemaMismatch {
        /// Semantic field or column name that failed to resolve.
        field: String,
        /// Column names that were tried, in order.
        candidates: Vec<String>,
    },

    /// A column does not have the same number of rows as its table.
    #[error("column `{name}` has {actual} rows, expected {expected}")]
    ColumnLength {
        /// Column name.
        name: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the offending column.
        actual: usize,
    },

    /// An interval row has its top below its base.
    #[error("invalid interval at row {row}: top {top} is greater than base {base}")]
    InvalidInterval {
        /// Zero-based row position.
        row: usize,
        /// Top depth of the row.
        top: f64,
        /// Base depth of the row.
        base: f64,
    },

    /// Two collars share a hole index or hole identifier.
    #[error("duplicate hole: {0}")]
    DuplicateHole(String),

    /// An internal contract was violated by the caller.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The object data client failed to persist a table.
    #[error("storage error: {0}")]
    Storage(String),
}
