//! Categorical feature encoding.
//!
//! Categorical fields are expanded into indicator ("one-hot") columns named
//! `"{field}_{category}"`. One reference category per field is dropped and is
//! represented by all indicators being zero.
//!
//! ```text
//! PEB: [A, B, C]  --fit-->  reference = A, indicators = [PEB_B, PEB_C]
//! { PEB: "PEB_C" } --encode--> { PEB_C: 1 }
//! { PEB: "A" }     --encode--> { }
//! ```
//!
//! The same fitted encoder is applied to the training table and to every
//! submitted record, so both sides always agree on the reference level.

mod one_hot;

pub use one_hot::{
    CategoricalEncoder, CategoricalEncoderParams, CategoryLevels, FittedCategoricalEncoder,
};

use ndarray::{Array2, ArrayView1};
use std::collections::BTreeMap;

/// Numeric frame produced by the encoder: named columns over a dense matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedFrame {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl EncodedFrame {
    pub(crate) fn new(columns: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.ncols());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Values of the first column carrying `name`.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.column(idx))
    }
}

/// A single encoded submission: column name to numeric value.
///
/// Holds only the columns the record actually produced; anything else is
/// implicitly zero once aligned to the feature schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedRecord {
    values: BTreeMap<String, f64>,
}

impl EncodedRecord {
    /// Take row `row` of `frame`. On duplicate column names the first one wins.
    pub(crate) fn from_frame_row(frame: &EncodedFrame, row: usize) -> Self {
        let mut values = BTreeMap::new();
        for (name, value) in frame.columns.iter().zip(frame.values.row(row).iter()) {
            values.entry(name.clone()).or_insert(*value);
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for EncodedRecord {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
