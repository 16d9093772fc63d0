//! Assessment - One button press, end to end
//!
//! record → model row → probability → (optional) attributions.
//! Schema and inference failures abort; explanation failures are kept on
//! the result so the probability can still be shown.

use serde::Serialize;

use crate::logic::error::AssessmentError;
use crate::logic::explain::{Explanation, TreeExplainer};
use crate::logic::features::{assemble, FeatureVector, PatientRecord};
use crate::logic::model::{Classifier, PredictionResult};

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Exactly what was scored
    pub vector: FeatureVector,
    pub prediction: PredictionResult,
    /// `None` when explanations are switched off
    pub explanation: Option<Result<Explanation, String>>,
}

pub fn assess(
    classifier: &Classifier,
    record: &PatientRecord,
    explain: bool,
) -> Result<Assessment, AssessmentError> {
    let vector = assemble(record)?;
    log::debug!("Model row: {}", vector.to_log_entry());

    let prediction = classifier.predict(&vector)?;

    let explanation = explain.then(|| {
        TreeExplainer::new(classifier).explain(&vector).map_err(|e| {
            log::warn!("Explanation failed: {}", e);
            e.to_string()
        })
    });

    log::info!("Assessment: {:.1}% ({})", prediction.percent, prediction.band);

    Ok(Assessment {
        vector,
        prediction,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::SchemaMismatch;
    use crate::logic::features::Feature;
    use crate::logic::model::RiskBand;

    fn fixture() -> Classifier {
        Classifier::from_json_str(include_str!("../../tests/fixtures/catboost_model.json")).unwrap()
    }

    #[test]
    fn test_default_male_scenario_is_deterministic() {
        let classifier = fixture();
        let mut record = PatientRecord::default_form();
        record.insert(Feature::Sex, 1.0);

        let first = assess(&classifier, &record, true).unwrap();
        let second = assess(&classifier, &record, true).unwrap();

        assert_eq!(first.prediction.probability, second.prediction.probability);
        assert_eq!(first.prediction.percent, 38.9);
        assert_eq!(first.prediction.band, RiskBand::Medium);
        assert_eq!(first.explanation, second.explanation);
        assert!(matches!(first.explanation, Some(Ok(_))));
    }

    #[test]
    fn test_sex_does_not_change_probability() {
        let classifier = fixture();
        let mut record = PatientRecord::default_form();
        let female = assess(&classifier, &record, false).unwrap();
        record.insert(Feature::Sex, 1.0);
        let male = assess(&classifier, &record, false).unwrap();

        assert_eq!(female.prediction.probability, male.prediction.probability);
    }

    #[test]
    fn test_explain_switch() {
        let classifier = fixture();
        let assessment = assess(&classifier, &PatientRecord::default_form(), false).unwrap();
        assert!(assessment.explanation.is_none());
    }

    #[test]
    fn test_missing_feature_never_predicts() {
        let classifier = fixture();
        let mut record = PatientRecord::default_form();
        record.remove(Feature::Diabetes);

        assert_eq!(
            assess(&classifier, &record, true).unwrap_err(),
            AssessmentError::Schema(SchemaMismatch::MissingFeature("diabetes".to_string()))
        );
    }

    /// Valid for scoring, one level too deep for the explainer
    fn too_deep_model() -> Classifier {
        let depth = crate::logic::explain::MAX_EXPLAIN_DEPTH + 1;
        let splits: Vec<String> = (0..depth)
            .map(|i| format!(
                r#"{{"border": {}, "float_feature_index": 0, "split_type": "FloatFeature"}}"#,
                i * 10
            ))
            .collect();
        let leaves = vec!["0.0"; 1 << depth].join(",");
        let json = format!(
            r#"{{"oblivious_trees": [{{"leaf_values": [{}], "splits": [{}]}}]}}"#,
            leaves,
            splits.join(",")
        );
        Classifier::from_json_str(&json).unwrap()
    }

    #[test]
    fn test_explanation_failure_keeps_prediction() {
        let classifier = too_deep_model();
        let assessment = assess(&classifier, &PatientRecord::default_form(), true).unwrap();

        assert_eq!(assessment.prediction.percent, 50.0);
        assert_eq!(assessment.prediction.band, RiskBand::Medium);
        match assessment.explanation {
            Some(Err(message)) => assert!(message.contains("depth 11"), "{}", message),
            other => panic!("expected a stored explanation error, got {:?}", other),
        }
    }

    #[test]
    fn test_high_risk_record() {
        let classifier = fixture();
        let mut record = PatientRecord::default_form();
        record.insert(Feature::Gcs, 14.0);
        record.insert(Feature::Age, 85.0);
        record.insert(Feature::Smoker, 1.0);
        record.insert(Feature::Diabetes, 1.0);
        record.insert(Feature::Neutrophils, 80.0);
        record.insert(Feature::Paraplegia, 1.0);

        // -0.1 + 0.7 + 0.9 + 0.25 - 0.4
        let assessment = assess(&classifier, &record, true).unwrap();
        assert!((assessment.prediction.raw_output - 1.35).abs() < 1e-12);
        assert_eq!(assessment.prediction.band, RiskBand::High);

        let explanation = assessment.explanation.unwrap().unwrap();
        let sum: f64 = explanation.attributions.iter().map(|a| a.value).sum();
        assert!((sum - (explanation.raw_output - explanation.base_value)).abs() < 1e-9);
    }
}
