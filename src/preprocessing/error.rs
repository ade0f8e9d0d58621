//! Failures raised while fitting or applying encoders and scalers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Fit was called on a table with no rows or no columns.
    #[error("cannot fit on empty data: {0}")]
    EmptyData(String),

    /// A row or matrix does not have the column count seen at fit time.
    #[error("expected {expected_features} columns, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },

    #[error("{0} used before fit")]
    NotFitted(&'static str),

    /// Bad configuration, duplicate column name or ill-formed value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Persisted parameters could not be encoded or decoded.
    #[error("parameter codec: {0}")]
    Codec(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::Codec(err.to_string())
    }
}
