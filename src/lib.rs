//! # price_estimator
//!
//! Feature alignment and inference pipeline for real-estate price estimates.
//!
//! Historical listings are loaded once at startup to derive the model's input
//! schema and fit the feature scaler. Each submitted property then goes
//! through a fixed sequence of stages before the latest trained model turns
//! it into a price.
//!
//! ## Pipeline
//!
//! ```text
//! startup:    training CSV -> SchemaBuilder + CategoricalEncoder fit -> ScalerAdapter fit
//!                          -> locate_latest_model -> Predictor::load
//! submission: PropertyForm -> InferenceRecord -> encode -> align -> scale -> predict
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_estimator::config::Config;
//! use price_estimator::form::{FormController, PropertyForm};
//! use price_estimator::pipeline::Estimator;
//!
//! # fn main() -> Result<(), price_estimator::EstimatorError> {
//! let config = Config::default();
//! let estimator = Estimator::bootstrap(&config)?;
//! let mut controller = FormController::new(estimator, config.currency.clone());
//!
//! let form = PropertyForm {
//!     living_area: 150,
//!     bedroom_count: 3,
//!     ..PropertyForm::default()
//! };
//! println!("{}", controller.submit(form)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `dataset` - training data loading and submitted records
//! - `preprocessing` - categorical encoding and standard scaling
//! - `schema` - canonical ordered feature columns
//! - `align` - reindexing encoded records to the schema
//! - `model` - inference models and the on-disk artifact format
//! - `predictor` - artifact discovery and inference
//! - `pipeline` - startup wiring and per-submission stages
//! - `form` - typed form input, session state and display formatting

pub mod align;

/// Runtime configuration loaded from YAML.
pub mod config;

/// Training data and per-submission records.
pub mod dataset;

pub mod error;

pub mod form;

/// Regression models and their persisted artifacts.
pub mod model;

pub mod pipeline;

pub mod predictor;

/// Data preprocessing transformers.
pub mod preprocessing;

pub mod schema;

/// Binary persistence of fitted parameters.
pub mod serialization;

pub use align::{align, AlignedFeatureVector};
pub use config::Config;
pub use dataset::{FieldValue, InferenceRecord, TrainingDataset};
pub use error::{EstimatorError, Result};
pub use form::{format_price, FormController, PropertyForm, SessionState};
pub use pipeline::{Estimator, PipelineStage, Submission};
pub use predictor::{locate_latest_model, ModelArtifactHandle, Predictor};
pub use schema::{FeatureSchema, SchemaBuilder};
