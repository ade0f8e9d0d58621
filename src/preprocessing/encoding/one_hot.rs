//! Drop-first one-hot encoding for string categories.

use super::{EncodedFrame, EncodedRecord};
use crate::dataset::{Column, InferenceRecord, Table};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

const DEFAULT_SEPARATOR: &str = "_";

/// One-hot encoder for categorical (string) columns.
///
/// Learns the distinct categories of every categorical column. The reference
/// category of a field is its lexicographically first category (byte order);
/// it gets no indicator column. Numeric columns pass through untouched.
///
/// # Example
/// ```ignore
/// let encoder = CategoricalEncoder::new();
/// let fitted = encoder.fit(dataset.features())?;
///
/// let encoded = fitted.transform(dataset.features())?;
/// let record = fitted.encode_record(&submission)?;
/// ```
#[derive(Clone, Debug)]
pub struct CategoricalEncoder {
    separator: String,
}

impl CategoricalEncoder {
    /// Create a new encoder using `_` between field and category.
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Set the separator used in indicator names.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for CategoricalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Learned categories of one categorical field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryLevels {
    /// Source column name.
    pub field: String,
    /// Dropped category; `None` if the column never held a value.
    pub reference: Option<String>,
    /// Remaining categories in sorted order, one indicator column each.
    pub categories: Vec<String>,
}

/// Serializable parameters for a fitted CategoricalEncoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoricalEncoderParams {
    pub separator: String,
    pub numeric_columns: Vec<String>,
    pub levels: Vec<CategoryLevels>,
    pub n_features_in: usize,
}

/// Fitted CategoricalEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedCategoricalEncoder {
    separator: String,
    numeric_columns: Vec<String>,
    levels: Vec<CategoryLevels>,
    n_features_in: usize,
}

impl FittedCategoricalEncoder {
    /// Learned categories for each categorical field, in column order.
    pub fn levels(&self) -> &[CategoryLevels] {
        &self.levels
    }

    /// Numeric columns seen during fit, in column order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Output columns when applied to the full training table: numeric
    /// columns followed by every fitted indicator.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        for level in &self.levels {
            names.extend(
                level
                    .categories
                    .iter()
                    .map(|category| self.indicator_name(&level.field, category)),
            );
        }
        names
    }

    /// Indicator column name for a category of `field`.
    pub fn indicator_name(&self, field: &str, category: &str) -> String {
        format!("{}{}{}", field, self.separator, category)
    }

    /// Single-row encoding of a submitted record.
    pub fn encode_record(
        &self,
        record: &InferenceRecord,
    ) -> Result<EncodedRecord, PreprocessingError> {
        if record.is_empty() {
            return Ok(EncodedRecord::default());
        }
        let frame = self.transform(&record.to_table()?)?;
        Ok(EncodedRecord::from_frame_row(&frame, 0))
    }

    fn level(&self, field: &str) -> Option<&CategoryLevels> {
        self.levels.iter().find(|l| l.field == field)
    }
}

/// Strip an existing `"{field}{separator}"` prefix so prefixed and bare labels
/// name the same category.
fn normalize_label<'a>(field: &str, separator: &str, raw: &'a str) -> &'a str {
    raw.strip_prefix(field)
        .and_then(|rest| rest.strip_prefix(separator))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(raw)
}

fn distinct_labels<'a>(
    field: &str,
    separator: &str,
    values: &'a [Option<String>],
) -> BTreeSet<&'a str> {
    values
        .iter()
        .flatten()
        .map(|raw| normalize_label(field, separator, raw))
        .collect()
}

impl Transformer for CategoricalEncoder {
    type Input = Table;
    type Output = EncodedFrame;
    type Params = CategoricalEncoderParams;
    type Fitted = FittedCategoricalEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit CategoricalEncoder on empty data".to_string(),
            ));
        }

        let mut numeric_columns = Vec::new();
        let mut levels = Vec::new();

        for (name, column) in data.iter() {
            match column {
                Column::Numeric(_) => numeric_columns.push(name.to_string()),
                Column::Categorical(values) => {
                    let mut sorted = distinct_labels(name, &self.separator, values).into_iter();
                    let reference = sorted.next().map(str::to_string);
                    levels.push(CategoryLevels {
                        field: name.to_string(),
                        reference,
                        categories: sorted.map(str::to_string).collect(),
                    });
                }
            }
        }

        Ok(FittedCategoricalEncoder {
            separator: self.separator.clone(),
            numeric_columns,
            levels,
            n_features_in: data.n_columns(),
        })
    }
}

impl FittedTransformer for FittedCategoricalEncoder {
    type Input = Table;
    type Output = EncodedFrame;
    type Params = CategoricalEncoderParams;

    /// Numeric columns first, then for each categorical field one indicator
    /// per distinct non-reference category present in `data`, sorted.
    ///
    /// Categories never seen during fit still get a column; the feature
    /// aligner discards it.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let rows = data.n_rows();

        let mut names: Vec<String> = Vec::new();
        let mut numeric: Vec<&[f64]> = Vec::new();
        for (name, column) in data.iter() {
            if let Column::Numeric(values) = column {
                names.push(name.to_string());
                numeric.push(values);
            }
        }

        // (field values, normalized category) for each indicator column
        let mut indicators: Vec<(&str, &[Option<String>], &str)> = Vec::new();
        for (name, column) in data.iter() {
            let Column::Categorical(values) = column else {
                continue;
            };
            let level = self.level(name);
            if level.is_none() {
                debug!(field = name, "categorical column was not seen during fit");
            }
            for category in distinct_labels(name, &self.separator, values) {
                if let Some(level) = level {
                    if level.reference.as_deref() == Some(category) {
                        continue;
                    }
                    if !level.categories.iter().any(|c| c == category) {
                        debug!(field = name, category, "unseen category");
                    }
                }
                names.push(self.indicator_name(name, category));
                indicators.push((name, values, category));
            }
        }

        let mut result = Array2::<f64>::zeros((rows, names.len()));
        for (col, values) in numeric.iter().enumerate() {
            for (row, value) in values.iter().enumerate() {
                result[[row, col]] = *value;
            }
        }
        let offset = numeric.len();
        for (i, (field, values, category)) in indicators.iter().enumerate() {
            for (row, value) in values.iter().enumerate() {
                let hit = value
                    .as_deref()
                    .map(|raw| normalize_label(field, &self.separator, raw) == *category)
                    .unwrap_or(false);
                if hit {
                    result[[row, offset + i]] = 1.0;
                }
            }
        }

        Ok(EncodedFrame::new(names, result))
    }

    fn extract_params(&self) -> Self::Params {
        CategoricalEncoderParams {
            separator: self.separator.clone(),
            numeric_columns: self.numeric_columns.clone(),
            levels: self.levels.clone(),
            n_features_in: self.n_features_in,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(FittedCategoricalEncoder {
            separator: params.separator,
            numeric_columns: params.numeric_columns,
            levels: params.levels,
            n_features_in: params.n_features_in,
        })
    }

    fn n_features_in(&self) -> usize {
        self.n_features_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(values: &[&str]) -> Column {
        Column::Categorical(values.iter().map(|v| Some(v.to_string())).collect())
    }

    fn training_table() -> Table {
        Table::new()
            .with_column("LivingArea", Column::Numeric(vec![100.0, 80.0, 120.0, 95.0]))
            .unwrap()
            .with_column("PEB", cats(&["B", "C", "A", "C"]))
            .unwrap()
            .with_column("Terrace", Column::Numeric(vec![1.0, 0.0, 0.0, 1.0]))
            .unwrap()
            .with_column(
                "StateOfBuilding",
                cats(&["GOOD", "AS_NEW", "TO_RENOVATE", "GOOD"]),
            )
            .unwrap()
    }

    #[test]
    fn test_fit_drops_lexicographically_first_category() {
        let fitted = CategoricalEncoder::new().fit(&training_table()).unwrap();

        assert_eq!(fitted.n_features_in(), 4);
        assert_eq!(fitted.numeric_columns(), ["LivingArea", "Terrace"]);
        assert_eq!(fitted.levels()[0].reference.as_deref(), Some("A"));
        assert_eq!(fitted.levels()[0].categories, vec!["B", "C"]);
        assert_eq!(fitted.levels()[1].reference.as_deref(), Some("AS_NEW"));
        assert_eq!(fitted.levels()[1].categories, vec!["GOOD", "TO_RENOVATE"]);
    }

    #[test]
    fn test_transform_training_table_layout() {
        let table = training_table();
        let fitted = CategoricalEncoder::new().fit(&table).unwrap();
        let encoded = fitted.transform(&table).unwrap();

        let expected = [
            "LivingArea",
            "Terrace",
            "PEB_B",
            "PEB_C",
            "StateOfBuilding_GOOD",
            "StateOfBuilding_TO_RENOVATE",
        ];
        assert_eq!(encoded.columns(), expected);
        assert_eq!(fitted.feature_names(), expected);
        assert_eq!(encoded.values().shape(), &[4, 6]);

        // row 2: PEB=A (reference), TO_RENOVATE
        let row: Vec<f64> = encoded.values().row(2).to_vec();
        assert_eq!(row, vec![120.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_record_accepts_prefixed_labels() {
        let fitted = CategoricalEncoder::new().fit(&training_table()).unwrap();
        let record = InferenceRecord::new()
            .with("LivingArea", 150.0)
            .with("PEB", "PEB_C")
            .with("StateOfBuilding", "StateOfBuilding_GOOD");

        let encoded = fitted.encode_record(&record).unwrap();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded.get("LivingArea"), Some(150.0));
        assert_eq!(encoded.get("PEB_C"), Some(1.0));
        assert_eq!(encoded.get("StateOfBuilding_GOOD"), Some(1.0));
    }

    #[test]
    fn test_encode_record_reference_category_yields_no_indicator() {
        let fitted = CategoricalEncoder::new().fit(&training_table()).unwrap();
        let record = InferenceRecord::new()
            .with("PEB", "PEB_A")
            .with("StateOfBuilding", "AS_NEW");

        let encoded = fitted.encode_record(&record).unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_encode_record_unseen_category_is_kept() {
        let fitted = CategoricalEncoder::new().fit(&training_table()).unwrap();
        let record = InferenceRecord::new().with("PEB", "PEB_A++");

        let encoded = fitted.encode_record(&record).unwrap();
        assert_eq!(encoded.get("PEB_A++"), Some(1.0));
    }

    #[test]
    fn test_missing_categories_are_all_zero() {
        let table = Table::new()
            .with_column(
                "PEB",
                Column::Categorical(vec![Some("B".into()), None, Some("C".into())]),
            )
            .unwrap();
        let fitted = CategoricalEncoder::new().fit(&table).unwrap();
        let encoded = fitted.transform(&table).unwrap();

        assert_eq!(encoded.columns(), ["PEB_C"]);
        assert_eq!(encoded.values().column(0).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let table = training_table();
        let a = CategoricalEncoder::new().fit(&table).unwrap();
        let b = CategoricalEncoder::new().fit(&table).unwrap();
        assert_eq!(a.levels(), b.levels());
        assert_eq!(a.feature_names(), b.feature_names());
    }

    #[test]
    fn test_custom_separator() {
        let fitted = CategoricalEncoder::new()
            .with_separator("=")
            .fit(&training_table())
            .unwrap();
        assert!(fitted.feature_names().contains(&"PEB=B".to_string()));

        let encoded = fitted
            .encode_record(&InferenceRecord::new().with("PEB", "PEB=C"))
            .unwrap();
        assert_eq!(encoded.get("PEB=C"), Some(1.0));
    }

    #[test]
    fn test_empty_data() {
        let result = CategoricalEncoder::new().fit(&Table::new());
        assert!(matches!(result, Err(PreprocessingError::EmptyData(_))));
    }

    #[test]
    fn test_empty_record() {
        let fitted = CategoricalEncoder::new().fit(&training_table()).unwrap();
        let encoded = fitted.encode_record(&InferenceRecord::new()).unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_save_load_file() {
        let table = training_table();
        let fitted = CategoricalEncoder::new().fit(&table).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.bin");
        fitted.save_to_file(&path).unwrap();
        let loaded = FittedCategoricalEncoder::load_from_file(&path).unwrap();

        assert_eq!(loaded.levels(), fitted.levels());
        assert_eq!(
            loaded.transform(&table).unwrap(),
            fitted.transform(&table).unwrap()
        );
    }
}
