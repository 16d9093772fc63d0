//! Form Controls - What the page renders for each feature
//!
//! Pure descriptors; HTML lives in the web crate.

use serde::Serialize;

use super::layout::FORM_FEATURES;
use super::schema::{ChoiceStyle, Feature, FeatureKind, FormColumn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Slider {
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    Choice {
        style: ChoiceStyle,
        options: Vec<&'static str>,
        selected: &'static str,
    },
}

/// One input control on the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormControl {
    /// Form field name (the model column id)
    pub name: &'static str,
    pub label: String,
    pub column: FormColumn,
    pub widget: Widget,
}

impl FormControl {
    pub fn for_feature(feature: Feature) -> Self {
        let label = match feature.unit() {
            "" => feature.label().to_string(),
            unit => format!("{} ({})", feature.label(), unit),
        };

        let widget = match feature.kind() {
            FeatureKind::Continuous(range) => Widget::Slider {
                min: range.min,
                max: range.max,
                step: range.step,
                value: range.default,
            },
            FeatureKind::Categorical(table) => {
                let options: Vec<_> = table.labels().collect();
                Widget::Choice {
                    style: table.style,
                    selected: options[0],
                    options,
                }
            }
        };

        Self {
            name: feature.name(),
            label,
            column: feature.column(),
            widget,
        }
    }

    /// Same control with the value taken from a previous submission
    pub fn with_value(mut self, feature: Feature, value: f64) -> Self {
        match (&mut self.widget, feature.kind()) {
            (Widget::Slider { value: current, .. }, FeatureKind::Continuous(range)) => {
                *current = range.clamp(value);
            }
            (Widget::Choice { selected, .. }, FeatureKind::Categorical(table)) => {
                if let Some(label) = table.decode(value.round() as i64) {
                    *selected = label;
                }
            }
            _ => {}
        }
        self
    }
}

/// Controls in render order: patient column first, then clinical column.
pub fn form_controls() -> Vec<FormControl> {
    let patient = FORM_FEATURES
        .iter()
        .filter(|f| f.column() == FormColumn::Patient);
    let clinical = FORM_FEATURES
        .iter()
        .filter(|f| f.column() == FormColumn::Clinical);

    patient
        .chain(clinical)
        .map(|f| FormControl::for_feature(*f))
        .collect()
}
