//! Crate-level error taxonomy.
//!
//! Every variant is fatal for the scope it occurs in: bootstrap errors halt the
//! process before any submission is accepted, submission errors abort that
//! submission. Nothing here is retried or replaced by a default value.

use crate::preprocessing::PreprocessingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while bootstrapping or running the estimation pipeline.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Training data file is missing, unreadable or malformed.
    #[error("failed to load training data from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// No model artifact could be found in the artifact directory.
    #[error("no model found in {}: {reason}", dir.display())]
    ModelNotFound { dir: PathBuf, reason: String },

    /// A fitted component was used before fit.
    #[error("{0} used before fit")]
    NotFitted(&'static str),

    /// Model artifact could not be read or decoded.
    #[error("model artifact {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// The loaded model was trained against a different feature schema.
    #[error("model schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A submitted form value is outside its declared domain.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The model could not produce a usable estimate.
    #[error("inference failed: {0}")]
    Inference(String),

    /// A submission stage was entered out of order.
    #[error("invalid stage transition from {from} to {to}")]
    StageOrder { from: String, to: String },

    #[error(transparent)]
    Preprocessing(PreprocessingError),
}

impl From<PreprocessingError> for EstimatorError {
    fn from(err: PreprocessingError) -> Self {
        match err {
            PreprocessingError::NotFitted(component) => EstimatorError::NotFitted(component),
            other => EstimatorError::Preprocessing(other),
        }
    }
}

impl EstimatorError {
    pub(crate) fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimatorError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must stop the whole process rather than a single submission.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            EstimatorError::DataLoad { .. }
                | EstimatorError::ModelNotFound { .. }
                | EstimatorError::ArtifactCorrupt { .. }
                | EstimatorError::SchemaMismatch(_)
                | EstimatorError::NotFitted(_)
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EstimatorError>;
