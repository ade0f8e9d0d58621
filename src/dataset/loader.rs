//! CSV loader for the historical training data.

use super::{Column, Table};
use crate::error::{EstimatorError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Historical property records: feature table plus numeric target.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct TrainingDataset {
    features: Table,
    target: Vec<f64>,
    target_name: String,
}

impl TrainingDataset {
    /// Load a CSV file with a header row and split off `target_column`.
    ///
    /// # Errors
    /// [`EstimatorError::DataLoad`] if the file is missing or malformed, the
    /// target column is missing or non-numeric, or there are no data rows.
    pub fn load<P: AsRef<Path>>(path: P, target_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let data_load = |reason: String| EstimatorError::DataLoad {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| data_load(e.to_string()))?;
        let dataset = Self::parse(BufReader::new(file), target_column).map_err(data_load)?;

        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.features.n_columns(),
            "loaded training data"
        );
        Ok(dataset)
    }

    /// Same as [`TrainingDataset::load`] but reads from any reader.
    pub fn from_reader<R: Read>(reader: R, target_column: &str) -> Result<Self> {
        Self::parse(reader, target_column).map_err(|reason| EstimatorError::DataLoad {
            path: PathBuf::from("<reader>"),
            reason,
        })
    }

    /// Build a dataset from an already assembled table.
    pub fn from_table(mut table: Table, target_column: &str) -> Result<Self> {
        let missing = |reason: String| EstimatorError::DataLoad {
            path: PathBuf::from("<table>"),
            reason,
        };
        let target = match table.drop_column(target_column) {
            Some(Column::Numeric(values)) => values,
            Some(Column::Categorical(_)) => {
                return Err(missing(format!(
                    "target column '{}' is not numeric",
                    target_column
                )))
            }
            None => {
                return Err(missing(format!(
                    "target column '{}' not found",
                    target_column
                )))
            }
        };
        if target.is_empty() {
            return Err(missing("no data rows".to_string()));
        }
        Ok(Self {
            features: table,
            target,
            target_name: target_column.to_string(),
        })
    }

    fn parse<R: Read>(reader: R, target_column: &str) -> std::result::Result<Self, String> {
        let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(str::to_string)
            .collect();
        if !headers.iter().any(|h| h == target_column) {
            return Err(format!("target column '{}' not found", target_column));
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for result in rdr.records() {
            let record = result.map_err(|e| e.to_string())?;
            for (col, value) in record.iter().enumerate() {
                cells[col].push(value.to_string());
            }
        }
        if cells.first().map_or(true, Vec::is_empty) {
            return Err("no data rows".to_string());
        }

        let mut table = Table::new();
        for (name, raw) in headers.into_iter().zip(cells) {
            let column = infer_column(raw);
            debug!(column = %name, kind = ?column.kind(), "inferred column kind");
            table.push_column(name, column).map_err(|e| e.to_string())?;
        }

        Self::from_table(table, target_column).map_err(|e| match e {
            EstimatorError::DataLoad { reason, .. } => reason,
            other => other.to_string(),
        })
    }

    pub fn features(&self) -> &Table {
        &self.features
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        cell.parse::<f64>().ok()
    }
}

/// Numeric if every non-empty cell parses, categorical otherwise.
fn infer_column(raw: Vec<String>) -> Column {
    let numeric = raw
        .iter()
        .filter(|cell| !cell.is_empty())
        .all(|cell| parse_cell(cell).is_some());

    if numeric {
        Column::Numeric(
            raw.iter()
                .map(|cell| parse_cell(cell).unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        Column::Categorical(
            raw.into_iter()
                .map(|cell| if cell.is_empty() { None } else { Some(cell) })
                .collect(),
        )
    }
}
