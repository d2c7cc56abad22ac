//! Machine learning integration module
//! Feature assembly, schema alignment and the classifier scoring contract

pub mod features;
pub mod xgboost;

pub use features::{align_to_schema, build_feature_rows, CalendarFacts, DayType, FeatureRow, OrderType};
pub use xgboost::XGBoostModel;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model input shape mismatch: model expects {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("Invalid model schema: {0}")]
    InvalidSchema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Binary classifier scoring contract
///
/// Implementations receive a matrix already aligned to the model schema and
/// return the positive-class probability of each row, in input order.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, matrix: &FeatureMatrix) -> ModelResult<Vec<f64>>;

    /// Smallest input width the model can score, when known
    fn required_features(&self) -> Option<usize> {
        None
    }
}

/// Ordered list of column names the classifier expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSchema {
    columns: Vec<String>,
}

impl ModelSchema {
    pub fn new(columns: Vec<String>) -> ModelResult<Self> {
        if columns.is_empty() {
            return Err(ModelError::InvalidSchema("schema has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ModelError::InvalidSchema(format!("duplicate column '{}'", column)));
            }
        }

        Ok(Self { columns })
    }

    /// Load a JSON array of column names
    pub fn load<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let columns: Vec<String> = serde_json::from_str(&raw)?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Dense row-major matrix of model inputs
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_cols: usize,
    values: Vec<f32>,
}

impl FeatureMatrix {
    pub fn new(n_cols: usize, values: Vec<f32>) -> ModelResult<Self> {
        if n_cols == 0 || values.len() % n_cols != 0 {
            return Err(ModelError::ShapeMismatch {
                expected: n_cols,
                got: values.len(),
            });
        }
        Ok(Self { n_cols, values })
    }

    pub fn n_rows(&self) -> usize {
        self.values.len() / self.n_cols
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index * self.n_cols;
        self.values.get(start..start + self.n_cols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.n_cols)
    }
}
