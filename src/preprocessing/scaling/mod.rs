//! Feature scaling.
//!
//! - [`StandardScaler`]: Z-score normalization over a numeric matrix.
//! - [`ScalerAdapter`]: fitted-once wrapper applied to single aligned records.

mod adapter;
mod standard;

pub use adapter::{ScaledFeatureVector, ScalerAdapter};
pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams};
