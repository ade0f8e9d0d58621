//! On-disk model artifact format.
//!
//! An artifact is a bincode-encoded [`ModelArtifact`]: a format version, the
//! feature names the model was trained on (may be empty for artifacts produced
//! without schema metadata) and the model parameters.

use super::linear::{LinearModel, LinearParams};
use super::tree::{TreeEnsemble, TreeEnsembleParams};
use super::InferenceModel;
use crate::error::{EstimatorError, Result};
use crate::preprocessing::PreprocessingError;
use crate::serialization::SerializableParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current artifact format version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Parameters of a supported model family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelParams {
    Linear(LinearParams),
    TreeEnsemble(TreeEnsembleParams),
}

/// Serialized regression model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub model: ModelParams,
}

impl ModelArtifact {
    pub fn new(model: ModelParams) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: Vec::new(),
            model,
        }
    }

    /// Record the feature schema the model was trained against.
    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Write the artifact to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), PreprocessingError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read and decode an artifact.
    ///
    /// # Errors
    /// [`EstimatorError::ArtifactCorrupt`] if the file cannot be read, cannot
    /// be decoded or carries an unsupported format version.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let corrupt = |reason: String| EstimatorError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| corrupt(e.to_string()))?;
        let artifact = Self::from_bytes(&bytes).map_err(|e| corrupt(e.to_string()))?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    /// Build the inference model described by this artifact.
    pub fn build_model(
        &self,
    ) -> std::result::Result<Box<dyn InferenceModel + Send + Sync>, PreprocessingError> {
        match &self.model {
            ModelParams::Linear(params) => Ok(Box::new(LinearModel::from_params(params.clone())?)),
            ModelParams::TreeEnsemble(params) => {
                Ok(Box::new(TreeEnsemble::from_params(params.clone())?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;

    fn artifact() -> ModelArtifact {
        ModelArtifact::new(ModelParams::Linear(LinearParams {
            weights: vec![1.0, 2.0],
            bias: 0.5,
        }))
        .with_feature_names(["LivingArea", "PEB_B"])
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        artifact().save_to_file(&path).unwrap();

        let loaded = ModelArtifact::load_from_file(&path).unwrap();
        assert_eq!(loaded, artifact());
        assert_eq!(loaded.build_model().unwrap().n_features(), 2);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"not a model").unwrap();

        assert!(matches!(
            ModelArtifact::load_from_file(&path),
            Err(EstimatorError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let mut future = artifact();
        future.format_version = ARTIFACT_FORMAT_VERSION + 1;
        future.save_to_file(&path).unwrap();

        match ModelArtifact::load_from_file(&path) {
            Err(EstimatorError::ArtifactCorrupt { reason, .. }) => {
                assert!(reason.contains("unsupported format version"))
            }
            other => panic!("expected ArtifactCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_corrupt() {
        let result = ModelArtifact::load_from_file("/no/such/model.bin");
        assert!(matches!(result, Err(EstimatorError::ArtifactCorrupt { .. })));
    }

    #[test]
    fn test_tree_ensemble_with_bad_split_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.bin");
        ModelArtifact::new(ModelParams::TreeEnsemble(TreeEnsembleParams {
            n_features: 2,
            base_score: 0.0,
            trees: vec![vec![
                TreeNode::Split {
                    feature: 7,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    default_left: true,
                },
                TreeNode::Leaf { value: 1.0 },
                TreeNode::Leaf { value: 2.0 },
            ]],
        }))
        .save_to_file(&path)
        .unwrap();

        let handle = crate::predictor::locate_latest_model(dir.path(), &["bin"]).unwrap();
        match crate::predictor::Predictor::load(&handle) {
            Err(EstimatorError::ArtifactCorrupt { reason, .. }) => {
                assert!(reason.contains("out of range"))
            }
            other => panic!("expected ArtifactCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_build_model_rejects_empty_weights() {
        let empty = ModelArtifact::new(ModelParams::Linear(LinearParams {
            weights: vec![],
            bias: 0.0,
        }));
        assert!(empty.build_model().is_err());
    }
}
