//! Startup wiring and the per-submission estimation pipeline.
//!
//! [`Estimator::bootstrap`] runs once per process and establishes the
//! read-only state every submission shares:
//!
//! ```text
//! training CSV -> SchemaBuilder (fits encoder) -> ScalerAdapter::fit
//!              -> locate_latest_model -> Predictor::load -> verify_schema
//! ```
//!
//! Each submission then walks the stages of a [`Submission`]:
//! `Idle -> Encoding -> Aligning -> Scaling -> Predicting -> Done`, or
//! `Failed(reason)` at the first error.

use crate::align::align;
use crate::config::Config;
use crate::dataset::{InferenceRecord, TrainingDataset};
use crate::error::{EstimatorError, Result};
use crate::predictor::{locate_latest_model, Predictor};
use crate::preprocessing::encoding::FittedCategoricalEncoder;
use crate::preprocessing::ScalerAdapter;
use crate::schema::{FeatureSchema, SchemaBuilder, SchemaFit};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, info_span, warn};

/// Stage of a single submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Encoding,
    Aligning,
    Scaling,
    Predicting,
    Done,
    Failed(String),
}

impl PipelineStage {
    /// The only stage that may follow `self` on success.
    fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::Encoding),
            PipelineStage::Encoding => Some(PipelineStage::Aligning),
            PipelineStage::Aligning => Some(PipelineStage::Scaling),
            PipelineStage::Scaling => Some(PipelineStage::Predicting),
            PipelineStage::Predicting => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed(_))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "Idle"),
            PipelineStage::Encoding => write!(f, "Encoding"),
            PipelineStage::Aligning => write!(f, "Aligning"),
            PipelineStage::Scaling => write!(f, "Scaling"),
            PipelineStage::Predicting => write!(f, "Predicting"),
            PipelineStage::Done => write!(f, "Done"),
            PipelineStage::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

static NEXT_SUBMISSION_ID: AtomicU64 = AtomicU64::new(1);

/// State machine for one submission.
#[derive(Clone, Debug)]
pub struct Submission {
    id: u64,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            id: NEXT_SUBMISSION_ID.fetch_add(1, Ordering::Relaxed),
            stage: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    /// Every stage entered so far, starting with `Idle`.
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to `next`, which must be the direct successor of the current stage.
    ///
    /// # Errors
    /// [`EstimatorError::StageOrder`] for skipped, repeated or out-of-order stages.
    pub fn advance(&mut self, next: PipelineStage) -> Result<()> {
        if self.stage.successor().as_ref() != Some(&next) {
            return Err(EstimatorError::StageOrder {
                from: self.stage.to_string(),
                to: next.to_string(),
            });
        }
        debug!(submission = self.id, from = %self.stage, to = %next, "stage transition");
        self.enter(next);
        Ok(())
    }

    /// Abort the submission. No-op once it has finished.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.stage.is_terminal() {
            return;
        }
        self.enter(PipelineStage::Failed(reason.into()));
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.history.push(stage.clone());
        self.stage = stage;
    }
}

/// Process-wide estimation state, read-only after bootstrap.
#[derive(Debug)]
pub struct Estimator {
    schema: FeatureSchema,
    encoder: FittedCategoricalEncoder,
    scaler: ScalerAdapter,
    predictor: Predictor,
}

impl Estimator {
    /// Load training data, fit preprocessing and load the latest model.
    ///
    /// Every error is fatal: no submission may run without a complete estimator.
    pub fn bootstrap(config: &Config) -> Result<Self> {
        info!(
            data = %config.data_path.display(),
            models = %config.model_dir.display(),
            "bootstrapping estimator"
        );

        let dataset = TrainingDataset::load(&config.data_path, &config.target_column)?;
        let fit = SchemaBuilder::new().build(dataset.features())?;

        let mut scaler = ScalerAdapter::new();
        scaler.fit(&fit.encoded, &fit.schema)?;

        let handle = locate_latest_model(&config.model_dir, &config.model_extensions)?;
        let predictor = Predictor::load(&handle)?;

        Self::from_parts(fit, scaler, predictor)
    }

    /// Assemble an estimator from already-built components.
    ///
    /// # Errors
    /// [`EstimatorError::NotFitted`] if `scaler` was never fitted;
    /// [`EstimatorError::SchemaMismatch`] if the model disagrees with the schema.
    pub fn from_parts(fit: SchemaFit, scaler: ScalerAdapter, predictor: Predictor) -> Result<Self> {
        if !scaler.is_fitted() {
            return Err(EstimatorError::NotFitted("ScalerAdapter"));
        }
        predictor.verify_schema(&fit.schema)?;

        info!(
            features = fit.schema.len(),
            model = %predictor.handle().path().display(),
            "estimator ready"
        );
        Ok(Self {
            schema: fit.schema,
            encoder: fit.encoder,
            scaler,
            predictor,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &FittedCategoricalEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &ScalerAdapter {
        &self.scaler
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Run a fresh submission for `record`.
    pub fn estimate(&self, record: &InferenceRecord) -> Result<f64> {
        let mut submission = Submission::new();
        self.run(&mut submission, record)
    }

    /// Drive `submission` through every stage. On error the submission is
    /// left in `Failed` and the error is returned.
    pub fn run(&self, submission: &mut Submission, record: &InferenceRecord) -> Result<f64> {
        let span = info_span!("submission", id = submission.id());
        let _guard = span.enter();

        match self.run_stages(submission, record) {
            Ok(price) => {
                info!(price, "estimate produced");
                Ok(price)
            }
            Err(err) => {
                warn!(stage = %submission.stage(), error = %err, "submission failed");
                submission.fail(err.to_string());
                Err(err)
            }
        }
    }

    fn run_stages(&self, submission: &mut Submission, record: &InferenceRecord) -> Result<f64> {
        submission.advance(PipelineStage::Encoding)?;
        let encoded = self.encoder.encode_record(record)?;

        submission.advance(PipelineStage::Aligning)?;
        let aligned = align(&encoded, &self.schema);

        submission.advance(PipelineStage::Scaling)?;
        let scaled = self.scaler.transform(&aligned)?;

        submission.advance(PipelineStage::Predicting)?;
        let price = self.predictor.predict(&scaled)?;

        submission.advance(PipelineStage::Done)?;
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearParams, ModelArtifact, ModelParams};
    use std::path::Path;

    const CSV: &str = "\
LivingArea,Terrace,PEB,StateOfBuilding,Price
100,1,B,GOOD,200000
150,0,C,AS_NEW,300000
200,1,B,GOOD,400000
";

    fn write_fixture(dir: &Path, weights: Option<Vec<f64>>) -> Config {
        let data = dir.join("cleaned_data.csv");
        std::fs::write(&data, CSV).unwrap();

        let dataset = TrainingDataset::load(&data, "Price").unwrap();
        let schema = SchemaBuilder::new().build(dataset.features()).unwrap().schema;
        let weights = weights.unwrap_or_else(|| vec![1.0; schema.len()]);
        ModelArtifact::new(ModelParams::Linear(LinearParams {
            weights,
            bias: 250_000.0,
        }))
        .with_feature_names(schema.iter())
        .save_to_file(dir.join("model.bin"))
        .unwrap();

        Config::default()
            .with_data_path(data)
            .with_model_dir(dir)
    }

    #[test]
    fn test_stage_order_is_enforced() {
        let mut submission = Submission::new();
        assert!(submission.advance(PipelineStage::Aligning).is_err());
        submission.advance(PipelineStage::Encoding).unwrap();
        assert!(matches!(
            submission.advance(PipelineStage::Encoding),
            Err(EstimatorError::StageOrder { .. })
        ));
        assert_eq!(submission.stage(), &PipelineStage::Encoding);
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut submission = Submission::new();
        submission.advance(PipelineStage::Encoding).unwrap();
        submission.fail("boom");
        assert_eq!(submission.stage(), &PipelineStage::Failed("boom".to_string()));
        assert!(submission.advance(PipelineStage::Aligning).is_err());

        submission.fail("again");
        assert_eq!(submission.history().len(), 3);
    }

    #[test]
    fn test_bootstrap_and_estimate() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path(), None);
        let estimator = Estimator::bootstrap(&config).unwrap();

        assert_eq!(
            estimator.schema().columns(),
            ["LivingArea", "Terrace", "PEB_C", "StateOfBuilding_GOOD"]
        );

        let record = InferenceRecord::new()
            .with("LivingArea", 150_i64)
            .with("Terrace", true)
            .with("PEB", "PEB_B")
            .with("StateOfBuilding", "StateOfBuilding_GOOD");
        let mut submission = Submission::new();
        let price = estimator.run(&mut submission, &record).unwrap();

        assert!(price.is_finite());
        assert_eq!(
            submission.history(),
            [
                PipelineStage::Idle,
                PipelineStage::Encoding,
                PipelineStage::Aligning,
                PipelineStage::Scaling,
                PipelineStage::Predicting,
                PipelineStage::Done,
            ]
        );
    }

    #[test]
    fn test_submission_cannot_be_reused() {
        let dir = tempfile::tempdir().unwrap();
        let estimator = Estimator::bootstrap(&write_fixture(dir.path(), None)).unwrap();

        let record = InferenceRecord::new().with("LivingArea", 120_i64);
        let mut submission = Submission::new();
        estimator.run(&mut submission, &record).unwrap();
        assert!(matches!(
            estimator.run(&mut submission, &record),
            Err(EstimatorError::StageOrder { .. })
        ));
        assert_eq!(submission.stage(), &PipelineStage::Done);
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let estimator = Estimator::bootstrap(&write_fixture(dir.path(), None)).unwrap();

        let base = InferenceRecord::new().with("LivingArea", 120_i64);
        let unknown = base.clone().with("PEB", "PEB_G");
        assert_eq!(
            estimator.estimate(&base).unwrap(),
            estimator.estimate(&unknown).unwrap()
        );
    }

    #[test]
    fn test_non_finite_input_fails_submission() {
        let dir = tempfile::tempdir().unwrap();
        let estimator = Estimator::bootstrap(&write_fixture(dir.path(), None)).unwrap();

        let record = InferenceRecord::new().with("LivingArea", f64::NAN);
        let mut submission = Submission::new();
        let result = estimator.run(&mut submission, &record);

        assert!(matches!(result, Err(EstimatorError::Inference(_))));
        assert!(matches!(submission.stage(), PipelineStage::Failed(_)));
        assert!(submission.history().contains(&PipelineStage::Predicting));
    }

    #[test]
    fn test_empty_model_dir_halts_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path(), None);
        std::fs::remove_file(dir.path().join("model.bin")).unwrap();

        let err = Estimator::bootstrap(&config).unwrap_err();
        assert!(matches!(err, EstimatorError::ModelNotFound { .. }));
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn test_schema_mismatch_halts_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cleaned_data.csv");
        std::fs::write(&data, CSV).unwrap();
        ModelArtifact::new(ModelParams::Linear(LinearParams {
            weights: vec![1.0, 2.0],
            bias: 0.0,
        }))
        .with_feature_names(["LivingArea", "PEB_C"])
        .save_to_file(dir.path().join("model.bin"))
        .unwrap();

        let config = Config::default()
            .with_data_path(data)
            .with_model_dir(dir.path());
        assert!(matches!(
            Estimator::bootstrap(&config),
            Err(EstimatorError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_missing_data_halts_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default()
            .with_data_path(dir.path().join("missing.csv"))
            .with_model_dir(dir.path());
        assert!(matches!(
            Estimator::bootstrap(&config),
            Err(EstimatorError::DataLoad { .. })
        ));
    }
}
