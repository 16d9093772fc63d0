//! Tree Explainer - Exact path-dependent SHAP values for oblivious trees
//!
//! For every tree, the Shapley value of each feature it splits on is
//! computed over coalitions of that tree's own features, with
//!
//!   v(S) = E[tree(x) | x_S]
//!
//! evaluated by descending the tree: splits on features in S follow `x`,
//! other splits average both children weighted by leaf cover. The tree is
//! read root-first from the last split down to split 0, so the bits of the
//! leaf index are fixed from the most significant one.
//!
//! Attributions are additive: Σφ = raw output − expected value.

use super::types::{Attribution, Explanation};
use crate::logic::error::ExplanationError;
use crate::logic::features::layout::{FEATURE_COUNT, MODEL_FEATURES};
use crate::logic::features::FeatureVector;
use crate::logic::model::{Classifier, InferenceEngine, ObliviousTree};

/// Deepest tree the explainer will enumerate (4^depth work per tree)
pub const MAX_EXPLAIN_DEPTH: usize = 10;

/// Allowed gap between Σφ and output − base
const ADDITIVITY_TOLERANCE: f64 = 1e-6;

/// Explainer bound to one loaded classifier
pub struct TreeExplainer<'a> {
    classifier: &'a Classifier,
}

impl<'a> TreeExplainer<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier }
    }

    /// Cover-weighted mean raw output (the base value)
    pub fn expected_value(&self) -> f64 {
        let forest = self.classifier.forest();
        let sum: f64 = forest.trees.iter().map(tree_expected_value).sum();
        forest.scale * sum + forest.bias
    }

    pub fn explain(&self, vector: &FeatureVector) -> Result<Explanation, ExplanationError> {
        let forest = self.classifier.forest();
        let row = vector.as_slice();

        for (index, tree) in forest.trees.iter().enumerate() {
            if tree.depth() > MAX_EXPLAIN_DEPTH {
                return Err(ExplanationError::TreeTooDeep {
                    tree: index,
                    depth: tree.depth(),
                    max: MAX_EXPLAIN_DEPTH,
                });
            }
        }

        let raw_output = self.classifier.raw_output(row)?;
        let base_value = self.expected_value();

        let mut phi = [0.0f64; FEATURE_COUNT];
        for tree in &forest.trees {
            for (feature, value) in tree_shap(tree, row) {
                phi[feature] += forest.scale * value;
            }
        }

        let sum: f64 = phi.iter().sum();
        let expected = raw_output - base_value;
        if (sum - expected).abs() > ADDITIVITY_TOLERANCE {
            return Err(ExplanationError::Additivity { sum, expected });
        }

        let attributions = MODEL_FEATURES
            .iter()
            .zip(phi.iter())
            .zip(row.iter())
            .map(|((feature, value), input)| Attribution {
                feature: *feature,
                value: *value,
                input: *input,
            })
            .collect();

        log::debug!("Explained row: base {:.4}, output {:.4}", base_value, raw_output);

        Ok(Explanation {
            base_value,
            raw_output,
            attributions,
        })
    }
}

// ============================================================================
// PER-TREE SHAPLEY VALUES
// ============================================================================

fn tree_expected_value(tree: &ObliviousTree) -> f64 {
    let weights = &tree.leaf_weights;
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        tree.leaf_values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
    } else {
        tree.leaf_values.iter().sum::<f64>() / tree.leaf_values.len() as f64
    }
}

/// (row column, φ) for every distinct feature the tree splits on
fn tree_shap(tree: &ObliviousTree, row: &[f64]) -> Vec<(usize, f64)> {
    // Distinct features, in first-use order
    let mut features: Vec<usize> = Vec::new();
    for split in &tree.splits {
        if !features.contains(&split.feature) {
            features.push(split.feature);
        }
    }

    let m = features.len();
    if m == 0 {
        return Vec::new();
    }

    // Local feature slot of each split, as a bitmask position
    let split_slots: Vec<usize> = tree
        .splits
        .iter()
        .map(|s| features.iter().position(|f| *f == s.feature).unwrap_or(0))
        .collect();

    let prefix = cover_prefix_sums(&tree.leaf_weights);

    // v(S) for every coalition S ⊆ features
    let values: Vec<f64> = (0..1usize << m)
        .map(|coalition| conditional_expectation(tree, row, &split_slots, &prefix, coalition))
        .collect();

    let weights = shapley_weights(m);

    features
        .iter()
        .enumerate()
        .map(|(slot, feature)| {
            let bit = 1usize << slot;
            let phi = (0..1usize << m)
                .filter(|s| s & bit == 0)
                .map(|s| weights[s.count_ones() as usize] * (values[s | bit] - values[s]))
                .sum();
            (*feature, phi)
        })
        .collect()
}

/// prefix[i] = Σ weights[..i]
fn cover_prefix_sums(weights: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(weights.len() + 1);
    let mut acc = 0.0;
    prefix.push(acc);
    for w in weights {
        acc += w;
        prefix.push(acc);
    }
    prefix
}

/// Cover of the leaves sharing the fixed high bits `leaf_prefix` above `level`
fn cover(prefix: &[f64], leaf_prefix: usize, level: usize) -> f64 {
    prefix[leaf_prefix + (1 << level)] - prefix[leaf_prefix]
}

fn conditional_expectation(
    tree: &ObliviousTree,
    row: &[f64],
    split_slots: &[usize],
    prefix: &[f64],
    coalition: usize,
) -> f64 {
    descend(tree, row, split_slots, prefix, coalition, tree.depth(), 0)
}

fn descend(
    tree: &ObliviousTree,
    row: &[f64],
    split_slots: &[usize],
    prefix: &[f64],
    coalition: usize,
    level: usize,
    leaf_prefix: usize,
) -> f64 {
    if level == 0 {
        return tree.leaf_values[leaf_prefix];
    }

    let j = level - 1;
    let split = &tree.splits[j];
    let left = leaf_prefix;
    let right = leaf_prefix | (1 << j);

    if coalition & (1 << split_slots[j]) != 0 {
        let next = if row[split.feature] > split.border { right } else { left };
        return descend(tree, row, split_slots, prefix, coalition, j, next);
    }

    let left_cover = cover(prefix, left, j);
    let right_cover = cover(prefix, right, j);
    let total = left_cover + right_cover;
    let (wl, wr) = if total > 0.0 {
        (left_cover / total, right_cover / total)
    } else {
        (0.5, 0.5)
    };

    let mut value = 0.0;
    if wl > 0.0 {
        value += wl * descend(tree, row, split_slots, prefix, coalition, j, left);
    }
    if wr > 0.0 {
        value += wr * descend(tree, row, split_slots, prefix, coalition, j, right);
    }
    value
}

/// w[k] = k! (m − k − 1)! / m!
fn shapley_weights(m: usize) -> Vec<f64> {
    let mut factorial = vec![1.0f64; m + 1];
    for i in 1..=m {
        factorial[i] = factorial[i - 1] * i as f64;
    }
    (0..m)
        .map(|k| factorial[k] * factorial[m - k - 1] / factorial[m])
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{assemble, Feature, PatientRecord};

    fn fixture() -> Classifier {
        Classifier::from_json_str(include_str!("../../../tests/fixtures/catboost_model.json")).unwrap()
    }

    /// Single tree on age (split 0, border 70) and GCS (split 1, border 12)
    fn two_feature_model() -> Classifier {
        let json = r#"{
            "oblivious_trees": [{
                "leaf_values": [0.2, 0.6, -0.5, -0.1],
                "leaf_weights": [30, 20, 40, 10],
                "splits": [
                    {"border": 70, "float_feature_index": 0, "split_type": "FloatFeature"},
                    {"border": 12, "float_feature_index": 1, "split_type": "FloatFeature"}
                ]
            }]
        }"#;
        Classifier::from_json_str(json).unwrap()
    }

    #[test]
    fn test_two_feature_tree_by_hand() {
        let classifier = two_feature_model();
        let explainer = TreeExplainer::new(&classifier);
        let vector = assemble(&PatientRecord::default_form()).unwrap();

        // v(∅) = 0.5·0.36 + 0.5·(−0.42) = −0.03
        assert!((explainer.expected_value() - (-0.03)).abs() < 1e-12);

        let explanation = explainer.explain(&vector).unwrap();
        let age = explanation.get(Feature::Age).unwrap();
        let gcs = explanation.get(Feature::Gcs).unwrap();
        assert!((age - (-0.14)).abs() < 1e-12, "age φ = {}", age);
        assert!((gcs - 0.37).abs() < 1e-12, "gcs φ = {}", gcs);
        assert_eq!(explanation.get(Feature::Race), Some(0.0));
    }

    #[test]
    fn test_single_split_tree() {
        let json = r#"{
            "oblivious_trees": [{
                "leaf_values": [-0.05, 0.9],
                "leaf_weights": [90, 10],
                "splits": [{"border": 0.5, "float_feature_index": 16, "split_type": "FloatFeature"}]
            }]
        }"#;
        let classifier = Classifier::from_json_str(json).unwrap();
        let explainer = TreeExplainer::new(&classifier);
        let vector = assemble(&PatientRecord::default_form()).unwrap();

        let explanation = explainer.explain(&vector).unwrap();
        // −0.05 − (0.9·−0.05 + 0.1·0.9)
        let phi = explanation.get(Feature::Paraplegia).unwrap();
        assert!((phi - (-0.095)).abs() < 1e-12);
    }

    #[test]
    fn test_additivity_on_fixture() {
        let classifier = fixture();
        let explainer = TreeExplainer::new(&classifier);

        let mut record = PatientRecord::default_form();
        for (age, smoker, paraplegia) in [(65.0, 0.0, 0.0), (85.0, 1.0, 1.0), (40.0, 1.0, 0.0)] {
            record.insert(Feature::Age, age);
            record.insert(Feature::Smoker, smoker);
            record.insert(Feature::Paraplegia, paraplegia);
            let vector = assemble(&record).unwrap();

            let explanation = explainer.explain(&vector).unwrap();
            let sum: f64 = explanation.attributions.iter().map(|a| a.value).sum();
            let raw = classifier.raw_output(vector.as_slice()).unwrap();
            assert!((sum - (raw - explanation.base_value)).abs() < 1e-9);
            assert_eq!(explanation.raw_output, raw);
        }
    }

    #[test]
    fn test_unused_features_get_zero() {
        let classifier = fixture();
        let vector = assemble(&PatientRecord::default_form()).unwrap();
        let explanation = TreeExplainer::new(&classifier).explain(&vector).unwrap();

        assert_eq!(explanation.attributions.len(), FEATURE_COUNT);
        assert_eq!(explanation.get(Feature::Magnesium), Some(0.0));
        assert_eq!(explanation.get(Feature::Race), Some(0.0));
    }

    #[test]
    fn test_explain_is_deterministic() {
        let classifier = fixture();
        let vector = assemble(&PatientRecord::default_form()).unwrap();
        let explainer = TreeExplainer::new(&classifier);
        assert_eq!(explainer.explain(&vector).unwrap(), explainer.explain(&vector).unwrap());
    }

    #[test]
    fn test_too_deep_tree_is_explanation_error() {
        let depth = MAX_EXPLAIN_DEPTH + 1;
        let splits: Vec<String> = (0..depth)
            .map(|i| format!(
                r#"{{"border": {}, "float_feature_index": 0, "split_type": "FloatFeature"}}"#,
                i
            ))
            .collect();
        let leaves = vec!["0.0"; 1 << depth].join(",");
        let json = format!(
            r#"{{"oblivious_trees": [{{"leaf_values": [{}], "splits": [{}]}}]}}"#,
            leaves,
            splits.join(",")
        );

        let classifier = Classifier::from_json_str(&json).unwrap();
        let vector = assemble(&PatientRecord::default_form()).unwrap();
        assert!(matches!(
            TreeExplainer::new(&classifier).explain(&vector),
            Err(ExplanationError::TreeTooDeep { depth: 11, .. })
        ));
    }

    #[test]
    fn test_shapley_weights_sum() {
        // Σ_k C(m-1, k) w[k] = 1
        let m = 4;
        let w = shapley_weights(m);
        let binom = [1.0, 3.0, 3.0, 1.0];
        let total: f64 = w.iter().zip(binom.iter()).map(|(a, b)| a * b).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
