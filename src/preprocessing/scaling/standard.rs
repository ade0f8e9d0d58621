//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation. `NaN` cells are ignored while fitting.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Scaler switches, persisted with the fitted state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Persisted scaler state, one entry per schema column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub config: StandardScalerConfig,
    /// Mean of each feature (zeros if `with_mean` is false).
    pub mean: Vec<f64>,
    /// Standard deviation of each feature (ones if `with_std` is false).
    pub std: Vec<f64>,
    pub n_features: usize,
}

/// Unfitted z-score scaler.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    /// Centering and scaling both enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtract the per-column mean (default on).
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Divide by the per-column deviation (default on).
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

/// Mean and population std of the finite cells of a column.
fn nan_mean_std(column: ArrayView1<'_, f64>) -> (f64, f64) {
    let (count, sum) = column
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let var = column
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    (mean, var.sqrt())
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let stats: Vec<(f64, f64)> = data.axis_iter(Axis(1)).map(nan_mean_std).collect();

        let mean = if self.config.with_mean {
            stats.iter().map(|(m, _)| *m).collect()
        } else {
            Array1::zeros(cols)
        };

        // Constant features keep their scale
        let std = if self.config.with_std {
            stats
                .iter()
                .map(|(_, s)| if *s == 0.0 { 1.0 } else { *s })
                .collect()
        } else {
            Array1::ones(cols)
        };

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            std,
        })
    }
}

/// Scaler with learned column statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    /// Column means, NaN cells excluded.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Deviations used as divisors; zero-variance columns hold 1.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    /// Scale a single sample.
    pub fn transform_row(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, PreprocessingError> {
        if row.len() != self.mean.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.mean.len(),
                got_features: row.len(),
            });
        }
        let mut out = row.to_owned();
        Zip::from(&mut out)
            .and(&self.mean)
            .and(&self.std)
            .for_each(|x, &m, &s| *x = (*x - m) / s);
        Ok(out)
    }

    /// Undo the scaling.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        self.check_width(data.ncols())?;
        Ok(data * &self.std + &self.mean)
    }

    fn check_width(&self, cols: usize) -> Result<(), PreprocessingError> {
        if cols != self.mean.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.mean.len(),
                got_features: cols,
            });
        }
        Ok(())
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.check_width(data.ncols())?;
        Ok((data - &self.mean) / &self.std)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            config: self.config.clone(),
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
            n_features: self.mean.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.mean.len() != params.n_features || params.std.len() != params.n_features {
            return Err(PreprocessingError::Codec(format!(
                "scaler params hold {} means and {} deviations for {} features",
                params.mean.len(),
                params.std.len(),
                params.n_features
            )));
        }
        Ok(Self {
            config: params.config,
            mean: Array1::from(params.mean),
            std: Array1::from(params.std),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}
