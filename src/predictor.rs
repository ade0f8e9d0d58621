//! Model artifact discovery and inference.

use crate::error::{EstimatorError, Result};
use crate::model::{InferenceModel, ModelArtifact};
use crate::preprocessing::ScaledFeatureVector;
use crate::schema::FeatureSchema;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// File extensions recognized as model artifacts when none are configured.
pub const DEFAULT_MODEL_EXTENSIONS: &[&str] = &["bin", "model"];

/// Location of a model artifact selected on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelArtifactHandle {
    path: PathBuf,
    modified: SystemTime,
}

impl ModelArtifactHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate.as_ref().trim_start_matches('.')))
        })
        .unwrap_or(false)
}

/// Select the most recently modified artifact in `dir`.
///
/// Only regular files whose extension is in `extensions` (case-insensitive)
/// are candidates. Equal timestamps are resolved by the greater file path so
/// the choice is deterministic.
///
/// # Errors
/// [`EstimatorError::ModelNotFound`] if `dir` cannot be listed or holds no candidate.
pub fn locate_latest_model<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<ModelArtifactHandle> {
    let not_found = |reason: String| EstimatorError::ModelNotFound {
        dir: dir.to_path_buf(),
        reason,
    };

    let entries = std::fs::read_dir(dir).map_err(|e| not_found(e.to_string()))?;

    let mut latest: Option<ModelArtifactHandle> = None;
    for entry in entries {
        let entry = entry.map_err(|e| not_found(e.to_string()))?;
        let path = entry.path();
        if !has_extension(&path, extensions) {
            continue;
        }
        // Follows symlinks; dangling links are skipped.
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable model candidate");
                continue;
            }
        };
        let modified = metadata.modified().map_err(|e| not_found(e.to_string()))?;
        debug!(path = %path.display(), ?modified, "model artifact candidate");

        let candidate = ModelArtifactHandle { path, modified };
        latest = match latest {
            Some(current)
                if (current.modified, &current.path) >= (candidate.modified, &candidate.path) =>
            {
                Some(current)
            }
            _ => Some(candidate),
        };
    }

    let handle = latest.ok_or_else(|| {
        let wanted: Vec<&str> = extensions.iter().map(AsRef::as_ref).collect();
        not_found(format!("no files with extension {}", wanted.join("/")))
    })?;
    info!(path = %handle.path.display(), "selected latest model artifact");
    Ok(handle)
}

/// A loaded model artifact, held for the lifetime of the process.
pub struct Predictor {
    handle: ModelArtifactHandle,
    feature_names: Vec<String>,
    model: Box<dyn InferenceModel + Send + Sync>,
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("handle", &self.handle)
            .field("n_features", &self.model.n_features())
            .finish()
    }
}

impl Predictor {
    /// Read, decode and build the model behind `handle`.
    ///
    /// # Errors
    /// [`EstimatorError::ArtifactCorrupt`] if the artifact cannot be used.
    pub fn load(handle: &ModelArtifactHandle) -> Result<Self> {
        let artifact = ModelArtifact::load_from_file(&handle.path)?;
        let model = artifact
            .build_model()
            .map_err(|e| EstimatorError::ArtifactCorrupt {
                path: handle.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            path = %handle.path.display(),
            features = model.n_features(),
            "loaded model artifact"
        );
        Ok(Self {
            handle: handle.clone(),
            feature_names: artifact.feature_names,
            model,
        })
    }

    /// Wrap an in-memory model.
    pub fn from_model(
        handle: ModelArtifactHandle,
        feature_names: Vec<String>,
        model: Box<dyn InferenceModel + Send + Sync>,
    ) -> Self {
        Self {
            handle,
            feature_names,
            model,
        }
    }

    pub fn handle(&self) -> &ModelArtifactHandle {
        &self.handle
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Check the model was trained against `schema`.
    ///
    /// Artifacts that record feature names must match the schema exactly;
    /// otherwise only the input width is compared.
    pub fn verify_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if !self.feature_names.is_empty() {
            if self.feature_names.as_slice() != schema.columns() {
                let first_diff = self
                    .feature_names
                    .iter()
                    .zip(schema.iter())
                    .position(|(a, b)| a != b)
                    .unwrap_or_else(|| self.feature_names.len().min(schema.len()));
                return Err(EstimatorError::SchemaMismatch(format!(
                    "artifact has {} features, schema has {}; first difference at position {}",
                    self.feature_names.len(),
                    schema.len(),
                    first_diff
                )));
            }
        } else if self.model.n_features() != schema.len() {
            return Err(EstimatorError::SchemaMismatch(format!(
                "model expects {} features, schema has {}",
                self.model.n_features(),
                schema.len()
            )));
        }
        Ok(())
    }

    /// Run the model on one scaled record.
    ///
    /// # Errors
    /// [`EstimatorError::Inference`] on a width mismatch or a non-finite estimate.
    pub fn predict(&self, input: &ScaledFeatureVector) -> Result<f64> {
        if input.len() != self.model.n_features() {
            return Err(EstimatorError::Inference(format!(
                "model expects {} features, got {}",
                self.model.n_features(),
                input.len()
            )));
        }
        let estimate = self.model.predict(input.values());
        if !estimate.is_finite() {
            return Err(EstimatorError::Inference(format!(
                "model produced a non-finite estimate ({})",
                estimate
            )));
        }
        Ok(estimate)
    }
}
