//! Regression models used for inference.
//!
//! Linear and gradient-boosted tree models are supported. Models hold only
//! prediction parameters; training lives outside this crate.
//! A persisted model is a [`ModelArtifact`] on disk.

pub mod artifact;
pub mod linear;
pub mod tree;

pub use artifact::{ModelArtifact, ModelParams, ARTIFACT_FORMAT_VERSION};
pub use linear::{LinearModel, LinearParams};
pub use tree::{TreeEnsemble, TreeEnsembleParams, TreeNode};

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Inference interface of a trained regression model.
pub trait InferenceModel {
    /// Number of input features the model expects.
    fn n_features(&self) -> usize;

    /// Predict on a single sample.
    fn predict(&self, input: ArrayView1<'_, f64>) -> f64;

    /// Predict on a batch of samples, one per row.
    fn predict_batch(&self, input: ArrayView2<'_, f64>) -> Array1<f64> {
        input
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect()
    }
}
