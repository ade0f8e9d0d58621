//! A single submitted property record.

use super::{Column, Table};
use crate::preprocessing::PreprocessingError;
use std::collections::BTreeMap;
use std::fmt;

/// Scalar value of one submitted attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Number(f64),
    /// Encoded as 0/1 before it reaches the encoder.
    Flag(bool),
    Category(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Flag(v) => write!(f, "{}", u8::from(*v)),
            FieldValue::Category(v) => f.write_str(v),
        }
    }
}

/// Mapping from raw attribute name to a submitted value.
///
/// Created per submission and discarded once the estimate is produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InferenceRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl InferenceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or overwrite a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// One-row [`Table`] view of the record, flags stored as 0/1.
    pub fn to_table(&self) -> Result<Table, PreprocessingError> {
        let mut table = Table::new();
        for (name, value) in &self.fields {
            let column = match value {
                FieldValue::Number(v) => Column::Numeric(vec![*v]),
                FieldValue::Flag(v) => Column::Numeric(vec![if *v { 1.0 } else { 0.0 }]),
                FieldValue::Category(v) => Column::Categorical(vec![Some(v.clone())]),
            };
            table.push_column(name.as_str(), column)?;
        }
        Ok(table)
    }
}
