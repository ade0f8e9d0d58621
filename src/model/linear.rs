//! Linear regression model: `y = w^T x + b`.

use super::InferenceModel;
use crate::preprocessing::PreprocessingError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Serializable representation of linear model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// A fitted linear model.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearModel {
    /// Creates a fitted linear model from trained parameters.
    ///
    /// # Errors
    /// Rejects empty or non-finite parameters.
    pub fn from_params(params: LinearParams) -> Result<Self, PreprocessingError> {
        if params.weights.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "linear model has no weights".to_string(),
            ));
        }
        if !params.bias.is_finite() || params.weights.iter().any(|w| !w.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "linear model parameters must be finite".to_string(),
            ));
        }
        Ok(Self {
            weights: Array1::from(params.weights),
            bias: params.bias,
        })
    }

    pub fn extract_params(&self) -> LinearParams {
        LinearParams {
            weights: self.weights.to_vec(),
            bias: self.bias,
        }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl InferenceModel for LinearModel {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, input: ArrayView1<'_, f64>) -> f64 {
        self.weights.dot(&input) + self.bias
    }

    fn predict_batch(&self, input: ArrayView2<'_, f64>) -> Array1<f64> {
        input.dot(&self.weights) + self.bias
    }
}
