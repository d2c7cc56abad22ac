//! Gradient boosted tree classifier served through the `gbdt` crate.
//!
//! The artifact is an XGBoost JSON tree dump: the trees from
//! `booster.get_dump(dump_format="json")` written out as one JSON array,
//! with feature names cleared so every split reads `f<column index>`.

use gbdt::decision_tree::{Data, DataVec, PredVec};
use gbdt::gradient_boost::GBDT;
use serde::Deserialize;
use std::path::Path;

use super::{Classifier, FeatureMatrix, ModelError, ModelResult};

/// Trees are evaluated to a raw margin; the base score and the logistic
/// link are applied here.
const RAW_MARGIN_OBJECTIVE: &str = "binary:logitraw";

/// Just enough of a dump node to check which features the trees read
#[derive(Debug, Deserialize)]
struct DumpNode {
    #[serde(default)]
    split: Option<String>,
    #[serde(default)]
    children: Vec<DumpNode>,
}

pub struct XGBoostModel {
    booster: GBDT,
    base_margin: f64,
    num_trees: usize,
    required_features: usize,
}

impl XGBoostModel {
    pub fn load<P: AsRef<Path>>(path: P, base_score: f64) -> ModelResult<Self> {
        let path = path.as_ref();
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(ModelError::InvalidModel(format!(
                "base_score {} must be a probability in (0, 1)",
                base_score
            )));
        }

        let raw = std::fs::read_to_string(path)?;
        let trees: Vec<DumpNode> = serde_json::from_str(&raw)?;
        if trees.is_empty() {
            return Err(ModelError::InvalidModel("tree dump holds no trees".to_string()));
        }

        let mut max_index = None;
        for tree in &trees {
            max_index = max_index.max(max_split_index(tree)?);
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| ModelError::InvalidModel(format!("non UTF-8 model path {}", path.display())))?;
        let booster = GBDT::from_xgboost_dump(path_str, RAW_MARGIN_OBJECTIVE)
            .map_err(|e| ModelError::InvalidModel(e.to_string()))?;

        Ok(Self {
            booster,
            base_margin: logit(base_score),
            num_trees: trees.len(),
            required_features: max_index.map_or(0, |i| i + 1),
        })
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }
}

impl Classifier for XGBoostModel {
    fn predict_proba(&self, matrix: &FeatureMatrix) -> ModelResult<Vec<f64>> {
        if matrix.n_cols() < self.required_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.required_features,
                got: matrix.n_cols(),
            });
        }

        let data: DataVec = matrix
            .rows()
            .map(|row| Data::new_test_data(row.to_vec(), None))
            .collect();
        let margins: PredVec = self.booster.predict(&data);

        Ok(margins
            .into_iter()
            .map(|margin| sigmoid(self.base_margin + margin as f64))
            .collect())
    }

    fn required_features(&self) -> Option<usize> {
        Some(self.required_features)
    }
}

fn max_split_index(node: &DumpNode) -> ModelResult<Option<usize>> {
    let mut max_index = match &node.split {
        Some(split) => Some(feature_index(split)?),
        None => None,
    };
    for child in &node.children {
        max_index = max_index.max(max_split_index(child)?);
    }
    Ok(max_index)
}

/// `f12` → 12. Named splits mean the dump was taken with feature names set.
fn feature_index(split: &str) -> ModelResult<usize> {
    split
        .strip_prefix('f')
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| {
            ModelError::InvalidModel(format!(
                "split on '{}': features must be indexed as f<N>, clear feature names before dumping",
                split
            ))
        })
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn stump(feature: &str, threshold: f64, yes: f64, no: f64) -> serde_json::Value {
        json!({
            "nodeid": 0, "depth": 0, "split": feature, "split_condition": threshold,
            "yes": 1, "no": 2, "missing": 1,
            "children": [{"nodeid": 1, "leaf": yes}, {"nodeid": 2, "leaf": no}]
        })
    }

    fn write_dump(trees: serde_json::Value) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), trees.to_string()).unwrap();
        file
    }

    /// f0 < 0.5 → +0.5 else -0.5; f1 < 10 → +0.25 else -0.25
    fn two_stumps() -> NamedTempFile {
        write_dump(json!([stump("f0", 0.5, 0.5, -0.5), stump("f1", 10.0, 0.25, -0.25)]))
    }

    #[test]
    fn test_load_and_predict() {
        let dump = two_stumps();
        let model = XGBoostModel::load(dump.path(), 0.5).unwrap();
        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.required_features(), Some(2));

        let matrix = FeatureMatrix::new(2, vec![0.0, 5.0, 1.0, 20.0]).unwrap();
        let probs = model.predict_proba(&matrix).unwrap();
        assert!((probs[0] - sigmoid(0.75)).abs() < 1e-6);
        assert!((probs[1] - sigmoid(-0.75)).abs() < 1e-6);
    }

    #[test]
    fn test_base_score_shifts_margin() {
        let dump = two_stumps();
        let model = XGBoostModel::load(dump.path(), 0.2).unwrap();

        let matrix = FeatureMatrix::new(2, vec![0.0, 5.0]).unwrap();
        let probs = model.predict_proba(&matrix).unwrap();
        assert!((probs[0] - sigmoid(logit(0.2) + 0.75)).abs() < 1e-6);

        assert!(XGBoostModel::load(dump.path(), 1.0).is_err());
    }

    #[test]
    fn test_wider_schema_is_accepted() {
        let dump = two_stumps();
        let model = XGBoostModel::load(dump.path(), 0.5).unwrap();

        let matrix = FeatureMatrix::new(3, vec![0.0, 5.0, 42.0]).unwrap();
        assert_eq!(model.predict_proba(&matrix).unwrap().len(), 1);
    }

    #[test]
    fn test_shape_mismatch() {
        let dump = two_stumps();
        let model = XGBoostModel::load(dump.path(), 0.5).unwrap();

        let matrix = FeatureMatrix::new(1, vec![0.0]).unwrap();
        let err = model.predict_proba(&matrix).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn test_rejects_named_splits() {
        let dump = write_dump(json!([stump("hour", 12.0, 0.1, -0.1)]));
        let err = XGBoostModel::load(dump.path(), 0.5).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("'hour'"), "unexpected error: {}", err);
    }

    #[test]
    fn test_rejects_empty_dump() {
        let dump = write_dump(json!([]));
        assert!(matches!(
            XGBoostModel::load(dump.path(), 0.5),
            Err(ModelError::InvalidModel(_))
        ));
    }
}
