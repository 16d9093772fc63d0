use serde::Serialize;

use crate::logic::features::Feature;

/// SHAP value of one model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attribution {
    pub feature: Feature,
    /// Contribution in log-odds; positive pushes toward dysphagia
    pub value: f64,
    /// The value the row carried for this feature
    pub input: f64,
}

/// Per-feature attributions for one row, in model input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Expected raw output over the training cover
    pub base_value: f64,
    /// Raw output for this row
    pub raw_output: f64,
    pub attributions: Vec<Attribution>,
}

impl Explanation {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.attributions
            .iter()
            .find(|a| a.feature == feature)
            .map(|a| a.value)
    }

    /// Sorted by |value|, largest first. Ties keep input order.
    pub fn ranked(&self) -> Vec<Attribution> {
        let mut ranked = self.attributions.clone();
        ranked.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
        ranked
    }
}

/// Mean |SHAP| per feature across explanations, largest first
pub fn mean_abs_importance(explanations: &[Explanation]) -> Vec<(Feature, f64)> {
    let Some(first) = explanations.first() else {
        return Vec::new();
    };

    let mut totals: Vec<(Feature, f64)> = first
        .attributions
        .iter()
        .map(|a| (a.feature, 0.0))
        .collect();

    for explanation in explanations {
        for (slot, attribution) in totals.iter_mut().zip(&explanation.attributions) {
            slot.1 += attribution.value.abs();
        }
    }

    let n = explanations.len() as f64;
    for slot in totals.iter_mut() {
        slot.1 /= n;
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explanation(values: &[(Feature, f64)]) -> Explanation {
        Explanation {
            base_value: 0.0,
            raw_output: values.iter().map(|(_, v)| v).sum(),
            attributions: values
                .iter()
                .map(|(feature, value)| Attribution { feature: *feature, value: *value, input: 0.0 })
                .collect(),
        }
    }

    #[test]
    fn test_ranked_by_magnitude() {
        let e = explanation(&[(Feature::Age, -0.14), (Feature::Gcs, 0.37), (Feature::Race, 0.0)]);
        let ranked: Vec<_> = e.ranked().iter().map(|a| a.feature).collect();
        assert_eq!(ranked, vec![Feature::Gcs, Feature::Age, Feature::Race]);

        // Input order untouched
        assert_eq!(e.attributions[0].feature, Feature::Age);
    }

    #[test]
    fn test_mean_abs_importance() {
        let a = explanation(&[(Feature::Age, -0.4), (Feature::Gcs, 0.1)]);
        let b = explanation(&[(Feature::Age, 0.2), (Feature::Gcs, 0.3)]);

        let importance = mean_abs_importance(&[a, b]);
        assert_eq!(importance[0].0, Feature::Age);
        assert!((importance[0].1 - 0.3).abs() < 1e-12);
        assert!((importance[1].1 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_mean_abs_importance_empty() {
        assert!(mean_abs_importance(&[]).is_empty());
    }
}
