//! Data preprocessing transformers.
//!
//! Transformers follow a fit-once, transform-many life cycle:
//!
//! - [`Transformer`]: unfitted transformer holding configuration
//! - [`FittedTransformer`]: learned parameters, inference and serialization
//!
//! # Available Transformers
//!
//! - [`CategoricalEncoder`]: drop-first one-hot expansion of string columns
//! - [`StandardScaler`]: Z-score normalization
//! - [`ScalerAdapter`]: runtime wrapper applying a fitted scaler to single records
//!
//! # Example
//!
//! ```ignore
//! use price_estimator::preprocessing::{CategoricalEncoder, FittedTransformer, Transformer};
//!
//! let encoder = CategoricalEncoder::new().fit(dataset.features())?;
//! let encoded = encoder.transform(dataset.features())?;
//!
//! // Save for later use
//! encoder.save_to_file("encoder.bin")?;
//! ```

pub mod encoding;
pub mod error;
pub mod scaling;
pub mod traits;

pub use encoding::{
    CategoricalEncoder, CategoricalEncoderParams, CategoryLevels, EncodedFrame, EncodedRecord,
    FittedCategoricalEncoder,
};
pub use error::PreprocessingError;
pub use scaling::{
    FittedStandardScaler, ScaledFeatureVector, ScalerAdapter, StandardScaler,
    StandardScalerConfig, StandardScalerParams,
};
pub use traits::{FittedTransformer, Transformer};
