//! Fit/apply contract shared by the categorical encoder and the scaler.
//!
//! A [`Transformer`] holds configuration only. Calling [`Transformer::fit`] on
//! the training table is the one way to get a [`FittedTransformer`], which then
//! transforms any number of submissions without changing its learned state.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;
use std::path::Path;

/// Unfitted configuration for a preprocessing step.
///
/// `Input` is what the step learns from at startup; the same type is
/// accepted at inference time. `Params` is the persisted form of the fitted
/// state.
pub trait Transformer: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Learn statistics or category levels from `data`.
    ///
    /// Fails with [`PreprocessingError::EmptyData`] when there is nothing to
    /// learn from.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// A preprocessing step with learned state.
///
/// `transform` borrows immutably, so estimating one property never
/// influences the next. Params extracted from a fitted step rebuild an
/// identical step through [`FittedTransformer::from_params`].
pub trait FittedTransformer: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    fn extract_params(&self) -> Self::Params;

    /// Rebuild from persisted params, rejecting inconsistent ones.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Column count of the table the step was fitted on.
    fn n_features_in(&self) -> usize;

    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PreprocessingError> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| PreprocessingError::Codec(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PreprocessingError>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        match Self::Params::from_bytes(&bytes) {
            Ok(params) => Self::from_params(params),
            Err(e) => Err(PreprocessingError::Codec(e.to_string())),
        }
    }
}
