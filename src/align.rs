//! Reindexing of encoded data onto the feature schema.
//!
//! For each schema column the encoded value is taken when present and `0.0`
//! otherwise; encoded columns unknown to the schema are discarded. The result
//! always has exactly the schema's width and order.

use crate::preprocessing::encoding::{EncodedFrame, EncodedRecord};
use crate::schema::FeatureSchema;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;
use tracing::debug;

/// A record reindexed to [`FeatureSchema`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedFeatureVector {
    values: Array1<f64>,
}

impl AlignedFeatureVector {
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }
}

/// Align one encoded record to `schema`.
pub fn align(encoded: &EncodedRecord, schema: &FeatureSchema) -> AlignedFeatureVector {
    let values: Array1<f64> = schema
        .iter()
        .map(|name| encoded.get(name).unwrap_or(0.0))
        .collect();

    let dropped = encoded
        .iter()
        .filter(|(name, _)| schema.position(name).is_none())
        .count();
    if dropped > 0 {
        debug!(dropped, "encoded columns outside the schema were discarded");
    }

    AlignedFeatureVector { values }
}

/// Align every row of an encoded frame to `schema`.
///
/// On duplicate frame columns the first one wins, matching [`align`].
pub fn align_frame(frame: &EncodedFrame, schema: &FeatureSchema) -> Array2<f64> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(frame.columns().len());
    for (idx, name) in frame.columns().iter().enumerate() {
        index.entry(name.as_str()).or_insert(idx);
    }

    let mut result = Array2::<f64>::zeros((frame.n_rows(), schema.len()));
    for (out_col, name) in schema.iter().enumerate() {
        if let Some(&src) = index.get(name) {
            result.column_mut(out_col).assign(&frame.values().column(src));
        }
    }
    result
}
