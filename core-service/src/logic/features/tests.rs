//! Integration Tests for the Form Mapper
//!
//! Form submission → record → model row, end to end.

#[cfg(test)]
mod integration_tests {
    use std::collections::HashMap;

    use crate::logic::error::{MapperError, SchemaMismatch};
    use crate::logic::features::{
        assemble, collect, form_controls, Feature, PatientRecord, Widget, FEATURE_COUNT,
        MODEL_FEATURES,
    };

    /// What the browser posts for an untouched form
    fn default_submission() -> HashMap<String, String> {
        form_controls()
            .into_iter()
            .map(|control| {
                let value = match control.widget {
                    Widget::Slider { value, .. } => value.to_string(),
                    Widget::Choice { selected, .. } => selected.to_string(),
                };
                (control.name.to_string(), value)
            })
            .collect()
    }

    #[test]
    fn test_untouched_form_matches_default_record() {
        let record = collect(&default_submission()).unwrap();
        assert_eq!(record, PatientRecord::default_form());
    }

    #[test]
    fn test_submission_to_model_row() {
        let mut form = default_submission();
        form.insert("gender".into(), "Male".into());
        form.insert("race".into(), "Black".into());
        form.insert("jietan".into(), "Yes".into());
        form.insert("GCS".into(), "14".into());

        let vector = assemble(&collect(&form).unwrap()).unwrap();

        assert_eq!(vector.values.len(), FEATURE_COUNT);
        assert_eq!(vector.get_feature(Feature::Gcs), Some(14.0));
        assert_eq!(vector.get_feature(Feature::Race), Some(2.0));
        assert_eq!(vector.get_feature(Feature::Paraplegia), Some(1.0));
        assert_eq!(vector.get_feature(Feature::Smoker), Some(0.0));
    }

    #[test]
    fn test_row_follows_model_order() {
        let mut record = PatientRecord::new();
        for (i, feature) in MODEL_FEATURES.iter().enumerate().rev() {
            record.insert(*feature, i as f64);
        }

        let vector = assemble(&record).unwrap();
        for (i, value) in vector.values.iter().enumerate() {
            assert_eq!(*value, i as f64);
        }
    }

    #[test]
    fn test_missing_control_is_schema_mismatch() {
        let mut form = default_submission();
        form.remove("aki");

        let record = collect(&form).unwrap();
        assert_eq!(
            assemble(&record),
            Err(SchemaMismatch::MissingFeature("aki".to_string()))
        );
    }

    #[test]
    fn test_extra_field_is_schema_mismatch() {
        let mut form = default_submission();
        form.insert("bmi".into(), "24".into());

        assert!(matches!(
            collect(&form),
            Err(MapperError::Schema(SchemaMismatch::UnknownFeature(_)))
        ));
    }
}
