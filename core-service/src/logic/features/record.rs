//! Patient Record - One patient's collected form values
//!
//! Keyed by `Feature`, so the order controls are read in never leaks into
//! the model row. Assembly into the ordered model row lives in `vector.rs`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::layout::FORM_FEATURES;
use super::schema::{Feature, FeatureKind};
use crate::logic::error::{MapperError, SchemaMismatch};

/// Flat feature → value mapping for one prediction request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    values: BTreeMap<Feature, f64>,
}

impl PatientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the untouched form would submit
    pub fn default_form() -> Self {
        let mut record = Self::new();
        for feature in FORM_FEATURES {
            record.insert(feature, feature.default_value());
        }
        record
    }

    pub fn insert(&mut self, feature: Feature, value: f64) -> Option<f64> {
        self.values.insert(feature, value)
    }

    pub fn remove(&mut self, feature: Feature) -> Option<f64> {
        self.values.remove(&feature)
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }

    /// Human-labelled rows in form order, for the input details table
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        FORM_FEATURES
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (f.label(), f.display_value(v))))
            .collect()
    }
}

// ============================================================================
// FORM COLLECTION
// ============================================================================

/// Map a submitted form (control name → submitted text) onto a record.
///
/// Categorical controls submit their label, continuous controls their
/// number. Numbers are clamped into the slider range; absent controls are
/// left out of the record and caught later by `assemble`.
pub fn collect(form: &HashMap<String, String>) -> Result<PatientRecord, MapperError> {
    let mut record = PatientRecord::new();

    for (name, raw) in form {
        let feature = Feature::from_name(name)
            .ok_or_else(|| SchemaMismatch::UnknownFeature(name.clone()))?;
        let value = parse_value(feature, raw)?;
        record.insert(feature, value);
    }

    log::debug!("Collected {} form values", record.len());
    Ok(record)
}

fn parse_value(feature: Feature, raw: &str) -> Result<f64, MapperError> {
    let raw = raw.trim();
    match feature.kind() {
        FeatureKind::Continuous(range) => {
            let value: f64 = raw.parse().map_err(|_| MapperError::InvalidInput {
                feature: feature.name().to_string(),
                reason: format!("`{}` is not a number", raw),
            })?;
            if !value.is_finite() {
                return Err(MapperError::InvalidInput {
                    feature: feature.name().to_string(),
                    reason: "value must be finite".to_string(),
                });
            }
            Ok(range.clamp(value))
        }
        FeatureKind::Categorical(table) => table
            .encode(raw)
            .map(|code| code as f64)
            .ok_or_else(|| MapperError::InvalidInput {
                feature: feature.name().to_string(),
                reason: format!("`{}` is not one of {:?}", raw, table.labels().collect::<Vec<_>>()),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_form_covers_every_control() {
        let record = PatientRecord::default_form();
        assert_eq!(record.len(), FORM_FEATURES.len());
        assert_eq!(record.get(Feature::Age), Some(65.0));
        assert_eq!(record.get(Feature::Sex), Some(0.0));
        assert_eq!(record.get(Feature::Race), Some(1.0));
        assert_eq!(record.get(Feature::Aptt), Some(60.0));
    }

    #[test]
    fn test_collect_maps_labels_to_codes() {
        let record = collect(&form(&[
            ("gender", "Male"),
            ("race", "Asian"),
            ("smoker", "Yes"),
            ("aki", "No"),
            ("age", "72"),
            ("hongxibao", "4.5"),
        ]))
        .unwrap();

        assert_eq!(record.get(Feature::Sex), Some(1.0));
        assert_eq!(record.get(Feature::Race), Some(3.0));
        assert_eq!(record.get(Feature::Smoker), Some(1.0));
        assert_eq!(record.get(Feature::Aki), Some(0.0));
        assert_eq!(record.get(Feature::Age), Some(72.0));
        assert_eq!(record.get(Feature::RedBloodCells), Some(4.5));
    }

    #[test]
    fn test_collect_clamps_to_slider_range() {
        let record = collect(&form(&[("age", "150"), ("GCS", "1")])).unwrap();
        assert_eq!(record.get(Feature::Age), Some(120.0));
        assert_eq!(record.get(Feature::Gcs), Some(3.0));
    }

    #[test]
    fn test_collect_rejects_bad_number() {
        let err = collect(&form(&[("age", "sixty")])).unwrap_err();
        assert!(matches!(err, MapperError::InvalidInput { ref feature, .. } if feature == "age"));

        let err = collect(&form(&[("MEI", "NaN")])).unwrap_err();
        assert!(matches!(err, MapperError::InvalidInput { .. }));
    }

    #[test]
    fn test_collect_rejects_unknown_label() {
        let err = collect(&form(&[("race", "Martian")])).unwrap_err();
        assert!(matches!(err, MapperError::InvalidInput { .. }));
    }

    #[test]
    fn test_collect_rejects_unknown_field() {
        let err = collect(&form(&[("bmi", "22")])).unwrap_err();
        assert_eq!(
            err,
            MapperError::Schema(SchemaMismatch::UnknownFeature("bmi".to_string()))
        );
    }

    #[test]
    fn test_display_rows_use_labels() {
        let mut record = PatientRecord::new();
        record.insert(Feature::Sex, 1.0);
        record.insert(Feature::Race, 2.0);
        record.insert(Feature::Diabetes, 1.0);

        let rows = record.display_rows();
        assert_eq!(rows[0], ("Sex", "Male".to_string()));
        assert_eq!(rows[1], ("Race", "Black".to_string()));
        assert_eq!(rows[2], ("Diabetes", "Yes".to_string()));
    }
}
