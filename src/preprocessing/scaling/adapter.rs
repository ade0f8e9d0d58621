//! Runtime wrapper around the fitted [`FittedStandardScaler`].
//!
//! The adapter is fitted once at startup on the training features aligned to
//! the feature schema, and afterwards only transforms single submissions.

use super::standard::{FittedStandardScaler, StandardScaler};
use crate::align::{align_frame, AlignedFeatureVector};
use crate::preprocessing::encoding::EncodedFrame;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::Transformer;
use crate::schema::FeatureSchema;
use ndarray::{Array1, ArrayView1};
use tracing::debug;

/// Standardized feature vector ready for the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledFeatureVector {
    values: Array1<f64>,
}

impl ScaledFeatureVector {
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

/// Scaler with an explicit fitted/unfitted runtime state.
#[derive(Clone, Debug, Default)]
pub struct ScalerAdapter {
    scaler: StandardScaler,
    fitted: Option<FittedStandardScaler>,
}

impl ScalerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom-configured scaler.
    pub fn with_scaler(scaler: StandardScaler) -> Self {
        Self {
            scaler,
            fitted: None,
        }
    }

    /// Fit on the training frame reindexed to `schema`, so per-column
    /// statistics line up with the schema positions.
    ///
    /// Fitting again replaces the previous statistics.
    pub fn fit(
        &mut self,
        training: &EncodedFrame,
        schema: &FeatureSchema,
    ) -> Result<(), PreprocessingError> {
        let matrix = align_frame(training, schema);
        let fitted = self.scaler.fit(&matrix)?;
        debug!(features = schema.len(), rows = matrix.nrows(), "fitted scaler");
        self.fitted = Some(fitted);
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Learned statistics, if fitted.
    pub fn fitted(&self) -> Option<&FittedStandardScaler> {
        self.fitted.as_ref()
    }

    /// Standardize one aligned record. Never refits.
    ///
    /// # Errors
    /// [`PreprocessingError::NotFitted`] before [`ScalerAdapter::fit`];
    /// [`PreprocessingError::FeatureMismatch`] if the width differs from fit time.
    pub fn transform(
        &self,
        aligned: &AlignedFeatureVector,
    ) -> Result<ScaledFeatureVector, PreprocessingError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(PreprocessingError::NotFitted("ScalerAdapter"))?;
        let values = fitted.transform_row(aligned.values())?;
        Ok(ScaledFeatureVector { values })
    }
}
