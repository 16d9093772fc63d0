//! Inference Engine - Gradient-boosted tree classifier
//!
//! Loads the CatBoost JSON export once and scores assembled rows.
//! The loaded `Classifier` is immutable; share it behind an `Arc`.

use std::path::Path;
use std::time::Instant;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::artifact::ObliviousForest;
use super::risk::RiskBand;
use crate::logic::error::{ArtifactError, InferenceError, SchemaMismatch};
use crate::logic::features::layout::{layout_hash, validate_model_layout, FEATURE_COUNT};
use crate::logic::features::FeatureVector;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub sha256: String,
    pub tree_count: usize,
    pub max_depth: usize,
    pub features: usize,
    /// Whether the artifact declared feature ids that were checked against the form
    pub layout_verified: bool,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// P(dysphagia), 0.0 - 1.0
    pub probability: f64,
    /// 100 × probability, one decimal
    pub percent: f64,
    pub band: RiskBand,
    /// Log-odds before the sigmoid
    pub raw_output: f64,
    pub inference_time_us: u64,
}

impl PredictionResult {
    pub fn from_probability(probability: f64, raw_output: f64, inference_time_us: u64) -> Self {
        let percent = to_percent(probability);
        Self {
            probability,
            percent,
            band: RiskBand::from_percent(percent),
            raw_output,
            inference_time_us,
        }
    }
}

/// 100 × p rounded to one decimal
pub fn to_percent(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Anything that can score model rows like `predict_proba`
pub trait InferenceEngine {
    /// One `[P(class0), P(class1)]` row per input row
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;

    /// Untransformed ensemble output for one row
    fn raw_output(&self, row: &[f64]) -> Result<f64, InferenceError>;
}

// ============================================================================
// CATBOOST IMPLEMENTATION
// ============================================================================

/// Loaded classifier. Built once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Classifier {
    forest: ObliviousForest,
    metadata: ModelMetadata,
}

impl Classifier {
    /// Load the JSON export from disk, optionally pinning its SHA-256.
    pub fn load(path: impl AsRef<Path>, expected_sha256: Option<&str>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        log::info!("Loading classifier from: {}", path.display());

        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let checksum = hex::encode(Sha256::digest(&bytes));

        if let Some(expected) = expected_sha256 {
            let expected = expected.trim().to_lowercase();
            if expected != checksum {
                return Err(ArtifactError::ChecksumMismatch {
                    expected,
                    actual: checksum,
                });
            }
            log::info!("Model checksum verified");
        }

        let json = String::from_utf8(bytes).map_err(|e| {
            ArtifactError::Unsupported(format!("artifact is not UTF-8 text: {}", e))
        })?;
        let forest = ObliviousForest::from_json_str(&json)?;

        let classifier = Self::from_forest(forest, path.display().to_string(), checksum)?;
        log::info!(
            "Classifier loaded: {} trees, max depth {}",
            classifier.metadata.tree_count,
            classifier.metadata.max_depth
        );
        Ok(classifier)
    }

    /// Build from an in-memory JSON export (fixtures, embedded models)
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let checksum = hex::encode(Sha256::digest(json.as_bytes()));
        let forest = ObliviousForest::from_json_str(json)?;
        Self::from_forest(forest, "<memory>".to_string(), checksum)
    }

    fn from_forest(forest: ObliviousForest, model_path: String, sha256: String) -> Result<Self, ArtifactError> {
        // Every split must index into the assembled row
        if forest.feature_count > FEATURE_COUNT {
            return Err(SchemaMismatch::CountMismatch {
                expected: FEATURE_COUNT,
                found: forest.feature_count,
            }
            .into());
        }

        let layout_verified = match &forest.feature_ids {
            Some(ids) => {
                validate_model_layout(ids.as_slice())?;
                true
            }
            None => {
                log::warn!("Model export carries no feature ids; column order cannot be verified");
                false
            }
        };

        let metadata = ModelMetadata {
            model_path,
            model_type: "catboost-oblivious".to_string(),
            sha256,
            tree_count: forest.trees.len(),
            max_depth: forest.max_depth(),
            features: FEATURE_COUNT,
            layout_verified,
            layout_hash: layout_hash(),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self { forest, metadata })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn forest(&self) -> &ObliviousForest {
        &self.forest
    }

    /// P(dysphagia) for one assembled row
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, InferenceError> {
        let rows = self.single_row(vector)?;
        let proba = self.predict_proba(rows.view())?;
        Ok(proba[[0, 1]])
    }

    /// Score plus band, raw output and timing
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, InferenceError> {
        let start_time = Instant::now();

        let probability = self.score(vector)?;
        let raw_output = self.raw_output(vector.as_slice())?;

        let elapsed = start_time.elapsed().as_micros() as u64;
        let result = PredictionResult::from_probability(probability, raw_output, elapsed);

        log::debug!(
            "Prediction: {:.1}% ({}) in {}us",
            result.percent,
            result.band,
            result.inference_time_us
        );
        Ok(result)
    }

    /// Cast the assembled row to the 1 × FEATURE_COUNT matrix the model takes
    fn single_row(&self, vector: &FeatureVector) -> Result<Array2<f64>, InferenceError> {
        if !vector.is_compatible() {
            return Err(InferenceError::InvalidInput(format!(
                "row built for layout v{} ({:08x}), model expects ({:08x})",
                vector.version,
                vector.layout_hash,
                layout_hash()
            )));
        }

        Array2::from_shape_vec((1, FEATURE_COUNT), vector.values.to_vec())
            .map_err(|e| InferenceError::InvalidInput(format!("Array error: {}", e)))
    }

    fn check_row(&self, row: &[f64]) -> Result<(), InferenceError> {
        if row.len() != FEATURE_COUNT {
            return Err(InferenceError::InvalidInput(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                row.len()
            )));
        }
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidInput(format!(
                "feature #{} is not finite",
                i
            )));
        }
        Ok(())
    }
}

impl InferenceEngine for Classifier {
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        let mut proba = Array2::<f64>::zeros((rows.nrows(), 2));

        for (i, row) in rows.outer_iter().enumerate() {
            let row: Vec<f64> = row.iter().copied().collect();
            let p = sigmoid(self.raw_output(&row)?);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }

        Ok(proba)
    }

    fn raw_output(&self, row: &[f64]) -> Result<f64, InferenceError> {
        self.check_row(row)?;
        Ok(self.forest.raw_output(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{assemble, PatientRecord};
    use ndarray::array;

    fn fixture() -> Classifier {
        Classifier::from_json_str(include_str!("../../../tests/fixtures/catboost_model.json")).unwrap()
    }

    #[test]
    fn test_fixture_loads_with_verified_layout() {
        let classifier = fixture();
        let meta = classifier.metadata();
        assert!(meta.layout_verified);
        assert_eq!(meta.tree_count, 4);
        assert_eq!(meta.max_depth, 3);
        assert_eq!(meta.sha256.len(), 64);
    }

    #[test]
    fn test_default_form_probability() {
        let classifier = fixture();
        let vector = assemble(&PatientRecord::default_form()).unwrap();

        // 0.2 - 0.2 - 0.05 + 0.0 - 0.4
        let result = classifier.predict(&vector).unwrap();
        assert!((result.raw_output - (-0.45)).abs() < 1e-12);
        assert!((result.probability - sigmoid(-0.45)).abs() < 1e-12);
        assert_eq!(result.percent, 38.9);
        assert_eq!(result.band, RiskBand::Medium);
    }

    #[test]
    fn test_score_in_unit_interval() {
        let classifier = fixture();
        let mut record = PatientRecord::default_form();
        for age in [18.0, 61.0, 75.0, 90.0, 120.0] {
            record.insert(crate::logic::features::Feature::Age, age);
            let p = classifier.score(&assemble(&record).unwrap()).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let classifier = fixture();
        let rows = Array2::from_shape_fn((3, FEATURE_COUNT), |(i, j)| (i * 30 + j) as f64);
        let proba = classifier.predict_proba(rows.view()).unwrap();
        assert_eq!(proba.dim(), (3, 2));
        for row in proba.outer_iter() {
            assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wrong_arity_is_invalid_input() {
        let classifier = fixture();
        let rows = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            classifier.predict_proba(rows.view()),
            Err(InferenceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_finite_is_invalid_input() {
        let classifier = fixture();
        let mut vector = assemble(&PatientRecord::default_form()).unwrap();
        vector.values[3] = f64::NAN;
        assert!(matches!(
            classifier.score(&vector),
            Err(InferenceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_stale_layout_is_invalid_input() {
        let classifier = fixture();
        let mut vector = assemble(&PatientRecord::default_form()).unwrap();
        vector.layout_hash ^= 1;
        assert!(classifier.score(&vector).is_err());
    }

    #[test]
    fn test_to_percent_rounds_to_one_decimal() {
        assert_eq!(to_percent(0.38936), 38.9);
        assert_eq!(to_percent(0.29951), 30.0);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }
}
