//! Column-oriented tabular data as produced by format-specific readers.
//!
//! A [`RawTable`] is an ordered set of equally long named columns. Cells are
//! optional so that voids in the source survive until a consumer decides how
//! to treat them.

use serde::{Deserialize, Serialize};

use crate::error::DownholeError;

/// Typed cell storage for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValues {
    /// Floating point cells.
    Float(Vec<Option<f64>>),
    /// Integer cells.
    Integer(Vec<Option<i64>>),
    /// Free text cells.
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Returns `true` when the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column plus the sentinel values the source used for "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Source column name.
    pub name: String,
    /// Cell values.
    pub values: ColumnValues,
    /// Sentinel markers attached to this column by the reader.
    #[serde(default)]
    pub nan_values: Vec<f64>,
}

impl Column {
    /// Creates a floating point column.
    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Float(values),
            nan_values: Vec::new(),
        }
    }

    /// Creates an integer column.
    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Integer(values),
            nan_values: Vec::new(),
        }
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
            nan_values: Vec::new(),
        }
    }

    /// Attaches sentinel markers to the column.
    #[must_use]
    pub fn with_nan_values(mut self, nan_values: Vec<f64>) -> Self {
        self.nan_values = nan_values;
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` for floating point columns.
    pub const fn is_float(&self) -> bool {
        matches!(self.values, ColumnValues::Float(_))
    }

    /// Reads a cell as `f64`. Integers widen, text never coerces, NaN is
    /// reported as missing.
    #[allow(clippy::cast_precision_loss)]
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match &self.values {
            ColumnValues::Float(v) => v.get(row).copied().flatten().filter(|x| !x.is_nan()),
            ColumnValues::Integer(v) => v.get(row).copied().flatten().map(|x| x as f64),
            ColumnValues::Text(_) => None,
        }
    }

    /// Reads a cell as `i64`. Floats narrow only when they carry no fraction.
    #[allow(clippy::cast_possible_truncation)]
    pub fn i64_at(&self, row: usize) -> Option<i64> {
        match &self.values {
            ColumnValues::Integer(v) => v.get(row).copied().flatten(),
            ColumnValues::Float(v) => v
                .get(row)
                .copied()
                .flatten()
                .filter(|x| x.is_finite() && x.fract().abs() < f64::EPSILON)
                .map(|x| x as i64),
            ColumnValues::Text(_) => None,
        }
    }

    /// Reads a cell as text, rendering numbers.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Text(v) => v.get(row).cloned().flatten(),
            ColumnValues::Integer(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnValues::Float(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct TableRepr {
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<TableRepr> for RawTable {
    type Error = DownholeError;

    fn try_from(repr: TableRepr) -> Result<Self, Self::Error> {
        Self::from_columns(repr.columns)
    }
}

/// An ordered collection of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct RawTable {
    columns: Vec<Column>,
}

impl RawTable {
    /// Creates a table with no columns.
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Builds a table from columns, checking that they share one length.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::ColumnLength`] if the columns differ in length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DownholeError> {
        columns
            .into_iter()
            .try_fold(Self::new(), Self::with_column)
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns [`DownholeError::ColumnLength`] if the column length differs
    /// from the columns already present.
    pub fn with_column(mut self, column: Column) -> Result<Self, DownholeError> {
        if let Some(first) = self.columns.first() {
            let actual = column.len();
            if first.len() != actual {
                return Err(DownholeError::ColumnLength {
                    name: column.name,
                    expected: first.len(),
                    actual,
                });
            }
        }
        self.columns.push(column);
        Ok(self)
    }

    /// Number of rows (zero for a table without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Looks up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column at a position.
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns `true` if a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// All columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}
