//! Model Artifact - CatBoost JSON export
//!
//! Reads the file produced by `model.save_model(path, format="json")` and
//! turns it into plain oblivious trees. Only float-feature splits and
//! single-dimension (binary logloss) leaves are supported.

use serde::Deserialize;

use crate::logic::error::ArtifactError;

/// CatBoost's own limit on oblivious tree depth
pub const MAX_TREE_DEPTH: usize = 16;

// ============================================================================
// RAW JSON SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawModel {
    #[serde(default)]
    pub features_info: RawFeaturesInfo,
    pub oblivious_trees: Vec<RawTree>,
    #[serde(default = "default_scale_and_bias")]
    pub scale_and_bias: (f64, Vec<f64>),
}

fn default_scale_and_bias() -> (f64, Vec<f64>) {
    (1.0, vec![0.0])
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawFeaturesInfo {
    #[serde(default)]
    pub float_features: Vec<RawFloatFeature>,
    #[serde(default)]
    pub categorical_features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFloatFeature {
    pub feature_index: usize,
    pub flat_feature_index: usize,
    #[serde(default)]
    pub feature_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTree {
    pub leaf_values: Vec<f64>,
    #[serde(default)]
    pub leaf_weights: Option<Vec<f64>>,
    #[serde(default)]
    pub splits: Vec<RawSplit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSplit {
    pub split_type: String,
    #[serde(default)]
    pub float_feature_index: Option<usize>,
    #[serde(default)]
    pub border: Option<f64>,
}

// ============================================================================
// PARSED MODEL
// ============================================================================

/// `value > border` sends the sample to the "1" side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    /// Column in the model row
    pub feature: usize,
    pub border: f64,
}

/// Symmetric tree: split `j` decides bit `j` of the leaf index
#[derive(Debug, Clone, PartialEq)]
pub struct ObliviousTree {
    pub splits: Vec<Split>,
    pub leaf_values: Vec<f64>,
    /// Training sample weight per leaf (cover)
    pub leaf_weights: Vec<f64>,
}

impl ObliviousTree {
    pub fn depth(&self) -> usize {
        self.splits.len()
    }

    pub fn leaf_index(&self, row: &[f64]) -> usize {
        self.splits
            .iter()
            .enumerate()
            .fold(0, |index, (bit, split)| {
                if row[split.feature] > split.border {
                    index | (1 << bit)
                } else {
                    index
                }
            })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.leaf_values[self.leaf_index(row)]
    }
}

/// Parsed ensemble. Raw output = scale * Σ tree + bias.
#[derive(Debug, Clone, PartialEq)]
pub struct ObliviousForest {
    pub trees: Vec<ObliviousTree>,
    pub scale: f64,
    pub bias: f64,
    /// Declared column ids in row order, if the export carries them
    pub feature_ids: Option<Vec<String>>,
    /// Number of columns the trees expect
    pub feature_count: usize,
}

impl ObliviousForest {
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let raw: RawModel = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub(crate) fn from_raw(raw: RawModel) -> Result<Self, ArtifactError> {
        if !raw.features_info.categorical_features.is_empty() {
            return Err(ArtifactError::Unsupported(
                "categorical feature hashing (export with integer-coded float features)".to_string(),
            ));
        }

        let (scale, biases) = raw.scale_and_bias;
        if biases.len() != 1 {
            return Err(ArtifactError::Unsupported(format!(
                "{}-dimensional output, expected a binary classifier",
                biases.len()
            )));
        }

        // float_feature_index (position among float features) → row column
        let mut float_features = raw.features_info.float_features;
        float_features.sort_by_key(|f| f.feature_index);
        let columns: Vec<usize> = float_features.iter().map(|f| f.flat_feature_index).collect();

        let mut seen = std::collections::BTreeSet::new();
        if let Some(column) = columns.iter().find(|c| !seen.insert(**c)) {
            return Err(ArtifactError::Unsupported(format!(
                "two float features share column {}",
                column
            )));
        }

        let feature_ids = if !float_features.is_empty()
            && float_features.iter().all(|f| f.feature_id.as_deref().is_some_and(|id| !id.is_empty()))
        {
            let mut by_column: Vec<_> = float_features.iter().collect();
            by_column.sort_by_key(|f| f.flat_feature_index);
            Some(by_column.iter().filter_map(|f| f.feature_id.clone()).collect())
        } else {
            None
        };

        let mut trees = Vec::with_capacity(raw.oblivious_trees.len());
        for (tree_index, raw_tree) in raw.oblivious_trees.into_iter().enumerate() {
            trees.push(parse_tree(tree_index, raw_tree, &columns)?);
        }

        let feature_count = if columns.is_empty() {
            trees
                .iter()
                .flat_map(|t| t.splits.iter().map(|s| s.feature + 1))
                .max()
                .unwrap_or(0)
        } else {
            columns.iter().max().map_or(0, |c| c + 1)
        };

        Ok(Self {
            trees,
            scale,
            bias: biases[0],
            feature_ids,
            feature_count,
        })
    }

    /// scale * Σ leaf + bias
    pub fn raw_output(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.scale * sum + self.bias
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(ObliviousTree::depth).max().unwrap_or(0)
    }
}

fn parse_tree(tree_index: usize, raw: RawTree, columns: &[usize]) -> Result<ObliviousTree, ArtifactError> {
    let mut splits = Vec::with_capacity(raw.splits.len());

    for split in raw.splits {
        if split.split_type != "FloatFeature" {
            return Err(ArtifactError::Unsupported(format!(
                "tree #{}: split type `{}`",
                tree_index, split.split_type
            )));
        }
        let (Some(float_index), Some(border)) = (split.float_feature_index, split.border) else {
            return Err(ArtifactError::Unsupported(format!(
                "tree #{}: float split without index or border",
                tree_index
            )));
        };
        let feature = if columns.is_empty() {
            float_index
        } else {
            *columns.get(float_index).ok_or_else(|| {
                ArtifactError::Unsupported(format!(
                    "tree #{}: float feature {} is not declared",
                    tree_index, float_index
                ))
            })?
        };
        splits.push(Split { feature, border });
    }

    if splits.len() > MAX_TREE_DEPTH {
        return Err(ArtifactError::Unsupported(format!(
            "tree #{}: depth {} exceeds {}",
            tree_index,
            splits.len(),
            MAX_TREE_DEPTH
        )));
    }

    let leaves = 1usize << splits.len();
    if raw.leaf_values.len() != leaves {
        return Err(ArtifactError::Unsupported(format!(
            "tree #{}: {} leaf values for depth {} (multi-dimensional leaves?)",
            tree_index,
            raw.leaf_values.len(),
            splits.len()
        )));
    }

    let leaf_weights = match raw.leaf_weights {
        Some(weights) if weights.len() == leaves => weights,
        Some(weights) => {
            return Err(ArtifactError::Unsupported(format!(
                "tree #{}: {} leaf weights for {} leaves",
                tree_index,
                weights.len(),
                leaves
            )))
        }
        // No cover recorded: treat leaves as equally likely
        None => vec![1.0; leaves],
    };

    Ok(ObliviousTree {
        splits,
        leaf_values: raw.leaf_values,
        leaf_weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = r#"{
        "features_info": {
            "float_features": [
                {"feature_index": 0, "flat_feature_index": 0, "feature_id": "a", "borders": [0.5]},
                {"feature_index": 1, "flat_feature_index": 1, "feature_id": "b", "borders": [10.0]}
            ]
        },
        "oblivious_trees": [
            {
                "leaf_values": [0.1, 0.2, 0.3, 0.4],
                "leaf_weights": [1, 2, 3, 4],
                "splits": [
                    {"border": 0.5, "float_feature_index": 0, "split_index": 0, "split_type": "FloatFeature"},
                    {"border": 10.0, "float_feature_index": 1, "split_index": 1, "split_type": "FloatFeature"}
                ]
            }
        ],
        "scale_and_bias": [2.0, [0.5]]
    }"#;

    #[test]
    fn test_parse_tiny_model() {
        let forest = ObliviousForest::from_json_str(TINY).unwrap();
        assert_eq!(forest.trees.len(), 1);
        assert_eq!(forest.feature_count, 2);
        assert_eq!(forest.feature_ids, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(forest.trees[0].leaf_weights, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_leaf_index_bit_order() {
        let forest = ObliviousForest::from_json_str(TINY).unwrap();
        let tree = &forest.trees[0];
        assert_eq!(tree.leaf_index(&[0.0, 0.0]), 0);
        assert_eq!(tree.leaf_index(&[1.0, 0.0]), 1);
        assert_eq!(tree.leaf_index(&[0.0, 20.0]), 2);
        assert_eq!(tree.leaf_index(&[1.0, 20.0]), 3);
        // Border itself goes left
        assert_eq!(tree.leaf_index(&[0.5, 10.0]), 0);
    }

    #[test]
    fn test_raw_output_applies_scale_and_bias() {
        let forest = ObliviousForest::from_json_str(TINY).unwrap();
        assert!((forest.raw_output(&[1.0, 20.0]) - (2.0 * 0.4 + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_weights_default_to_uniform() {
        let json = r#"{"oblivious_trees": [{"leaf_values": [1.0, -1.0],
            "splits": [{"border": 0.0, "float_feature_index": 0, "split_type": "FloatFeature"}]}]}"#;
        let forest = ObliviousForest::from_json_str(json).unwrap();
        assert_eq!(forest.trees[0].leaf_weights, vec![1.0, 1.0]);
        assert_eq!(forest.feature_ids, None);
        assert_eq!(forest.feature_count, 1);
        assert_eq!(forest.bias, 0.0);
    }

    #[test]
    fn test_rejects_ctr_split() {
        let json = r#"{"oblivious_trees": [{"leaf_values": [1.0, -1.0],
            "splits": [{"border": 0.0, "ctr_target_border_idx": 0, "split_type": "OnlineCtr"}]}]}"#;
        assert!(matches!(
            ObliviousForest::from_json_str(json),
            Err(ArtifactError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_multiclass() {
        let json = r#"{"oblivious_trees": [], "scale_and_bias": [1.0, [0.0, 0.0, 0.0]]}"#;
        assert!(matches!(
            ObliviousForest::from_json_str(json),
            Err(ArtifactError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_leaf_count_mismatch() {
        let json = r#"{"oblivious_trees": [{"leaf_values": [1.0, -1.0, 0.0],
            "splits": [{"border": 0.0, "float_feature_index": 0, "split_type": "FloatFeature"}]}]}"#;
        assert!(matches!(
            ObliviousForest::from_json_str(json),
            Err(ArtifactError::Unsupported(_))
        ));
    }

    #[test]
    fn test_corrupt_json() {
        assert!(matches!(
            ObliviousForest::from_json_str("{not json"),
            Err(ArtifactError::Parse(_))
        ));
    }
}
