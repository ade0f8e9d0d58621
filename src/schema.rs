//! Canonical ordered list of model input columns.

use crate::dataset::{Table, TrainingDataset};
use crate::error::Result;
use crate::preprocessing::encoding::{CategoricalEncoder, EncodedFrame, FittedCategoricalEncoder};
use crate::preprocessing::{FittedTransformer, PreprocessingError, Transformer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Ordered feature column names the model was trained against.
///
/// Cheap to clone; fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
}

impl FeatureSchema {
    /// Build a schema from explicit column names.
    ///
    /// # Errors
    /// Fails when a column name appears twice.
    pub fn new<I, S>(columns: I) -> std::result::Result<Self, PreprocessingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "duplicate feature column '{}'",
                    name
                )));
            }
        }
        Ok(Self {
            columns: columns.into(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.columns.join(", "))
    }
}

/// Output of [`SchemaBuilder::build`].
#[derive(Clone, Debug)]
pub struct SchemaFit {
    pub schema: FeatureSchema,
    /// Encoder fitted on the training features; reused for every submission.
    pub encoder: FittedCategoricalEncoder,
    /// Training features after encoding, in schema order.
    pub encoded: EncodedFrame,
}

/// Derives the [`FeatureSchema`] from training features.
///
/// Numeric columns keep their original order and are followed by the
/// indicator columns of each categorical field.
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    encoder: CategoricalEncoder,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom-configured encoder.
    pub fn with_encoder(mut self, encoder: CategoricalEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Fit the encoder on `features` (target already removed) and derive the schema.
    pub fn build(&self, features: &Table) -> std::result::Result<SchemaFit, PreprocessingError> {
        let encoder = self.encoder.fit(features)?;
        let encoded = encoder.transform(features)?;
        let schema = FeatureSchema::new(encoded.columns().iter().cloned())?;

        info!(
            columns = schema.len(),
            categorical_fields = encoder.levels().len(),
            "derived feature schema"
        );
        Ok(SchemaFit {
            schema,
            encoder,
            encoded,
        })
    }

    /// Load training data from `path` and build the schema from its features.
    ///
    /// # Errors
    /// [`crate::EstimatorError::DataLoad`] when the file cannot be read.
    pub fn build_from_csv<P: AsRef<Path>>(&self, path: P, target_column: &str) -> Result<SchemaFit> {
        let dataset = TrainingDataset::load(path, target_column)?;
        Ok(self.build(dataset.features())?)
    }
}
