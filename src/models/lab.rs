use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value produced for a single lab test: numeric, or qualitative text such as "Negative".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    Number(f64),
    Text(String),
}

impl TestValue {
    /// Numeric view; text reads as 0.
    pub fn as_number(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Text view; numbers read as "".
    pub fn as_text(&self) -> &str {
        match self {
            Self::Number(_) => "",
            Self::Text(s) => s,
        }
    }

    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl From<f64> for TestValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for TestValue {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for TestValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for TestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Failure raised by a derived or static generator function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Working report: test id to computed value, filled in as a generation pass runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabReport {
    values: HashMap<String, TestValue>,
}

impl LabReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, test_id: &str) -> Option<&TestValue> {
        self.values.get(test_id)
    }

    /// Numeric value of a test, if present and numeric.
    pub fn number(&self, test_id: &str) -> Option<f64> {
        self.values.get(test_id).and_then(TestValue::as_f64)
    }

    pub fn number_or(&self, test_id: &str, default: f64) -> f64 {
        self.number(test_id).unwrap_or(default)
    }

    /// Numeric value of a required input, or `MissingInput`.
    pub fn require_number(&self, test_id: &str) -> Result<f64, CalculationError> {
        self.number(test_id)
            .ok_or_else(|| CalculationError::MissingInput(test_id.into()))
    }

    pub fn text(&self, test_id: &str) -> Option<&str> {
        match self.values.get(test_id) {
            Some(TestValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn insert(&mut self, test_id: impl Into<String>, value: impl Into<TestValue>) {
        self.values.insert(test_id.into(), value.into());
    }

    pub fn remove(&mut self, test_id: &str) -> Option<TestValue> {
        self.values.remove(test_id)
    }

    pub fn contains(&self, test_id: &str) -> bool {
        self.values.contains_key(test_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TestValue)> {
        self.values.iter()
    }
}

impl FromIterator<(String, TestValue)> for LabReport {
    fn from_iter<I: IntoIterator<Item = (String, TestValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
