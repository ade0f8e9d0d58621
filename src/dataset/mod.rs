//! Tabular data shared by training and inference.
//!
//! # Core Concepts
//!
//! - [`Table`]: column-oriented frame of named numeric or categorical columns.
//!   Both the historical training data and a single submitted record are
//!   represented as a `Table`, so the categorical encoder sees one input type.
//! - [`TrainingDataset`]: the feature table plus the numeric target, loaded
//!   once from CSV at startup.
//! - [`InferenceRecord`]: one user submission, mapping attribute names to
//!   scalar values.

use crate::preprocessing::PreprocessingError;
use serde::{Deserialize, Serialize};

mod loader;
mod record;

pub use self::loader::TrainingDataset;
pub use self::record::{FieldValue, InferenceRecord};

/// Storage kind of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// A single column of values.
///
/// Missing numeric cells are `NaN`; missing categorical cells are `None`.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

/// Column-oriented table with unique column names.
///
/// Column order is preserved exactly as inserted; the feature schema depends on it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Table::push_column`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, PreprocessingError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Append a column.
    ///
    /// # Errors
    /// Fails when the name is already taken or the column length differs from
    /// the rows already in the table.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), PreprocessingError> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "duplicate column '{}'",
                name
            )));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PreprocessingError::InvalidParameter(format!(
                "column '{}' has {} rows, table has {}",
                name,
                column.len(),
                self.n_rows
            )));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name, returning it if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.names.remove(idx);
        let column = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.n_rows = 0;
        }
        Some(column)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.columns[idx])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Iterate over `(name, column)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }
}
