//! Feature Schema - Static description of every clinical input
//!
//! One `Feature` variant per control on the form. The wire name of each
//! variant is the column id the classifier was trained with, so a renamed
//! or dropped feature fails to compile instead of mis-scoring at runtime.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORICAL TABLES
// ============================================================================

/// How a categorical control is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceStyle {
    /// Horizontal radio buttons
    Radio,
    /// Drop-down select
    Select,
}

/// Enumerated code → label mapping for a categorical feature.
/// The first entry is the control's default selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoricalTable {
    pub entries: &'static [(i64, &'static str)],
    pub style: ChoiceStyle,
}

impl CategoricalTable {
    /// Label → code
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(code, _)| *code)
    }

    /// Code → label
    pub fn decode(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(_, label)| *label)
    }

    pub fn default_code(&self) -> i64 {
        self.entries[0].0
    }
}

pub static SEX_TABLE: CategoricalTable = CategoricalTable {
    entries: &[(0, "Female"), (1, "Male")],
    style: ChoiceStyle::Radio,
};

pub static RACE_TABLE: CategoricalTable = CategoricalTable {
    entries: &[(1, "White"), (2, "Black"), (3, "Asian"), (4, "Other")],
    style: ChoiceStyle::Select,
};

/// Yes/no clinical flags
pub static BINARY_TABLE: CategoricalTable = CategoricalTable {
    entries: &[(0, "No"), (1, "Yes")],
    style: ChoiceStyle::Radio,
};

// ============================================================================
// CONTINUOUS RANGES
// ============================================================================

/// Slider bounds for a continuous feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContinuousRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ContinuousRange {
    /// Range with the default at the midpoint and 0.1 granularity
    fn midpoint(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: 0.1,
            default: (min + max) / 2.0,
        }
    }

    /// Clamp into the slider bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

// ============================================================================
// FEATURE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    Continuous(ContinuousRange),
    Categorical(&'static CategoricalTable),
}

/// Which form column a control lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormColumn {
    /// Basic patient information
    Patient,
    /// Clinical characteristics
    Clinical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    Sex,
    Age,
    Gcs,
    Neutrophils,
    RedBloodCells,
    Aptt,
    AlkalinePhosphatase,
    Triglycerides,
    Hdl,
    Magnesium,
    Phosphorus,
    Race,
    Smoker,
    Aki,
    Leukemia,
    Diabetes,
    HeartFailure,
    Paraplegia,
    Malignancy,
    RenalReplacement,
}

/// Complete description of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub feature: Feature,
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: FeatureKind,
    pub column: FormColumn,
    pub in_model: bool,
}

impl Feature {
    /// Column id used by the trained model
    pub fn name(self) -> &'static str {
        match self {
            Feature::Sex => "gender",
            Feature::Age => "age",
            Feature::Gcs => "GCS",
            Feature::Neutrophils => "zhongxinglixbao",
            Feature::RedBloodCells => "hongxibao",
            Feature::Aptt => "huohuabufenningxuemeiyuanshijian",
            Feature::AlkalinePhosphatase => "jianxinglinsuanmei",
            Feature::Triglycerides => "ganyousanzhi",
            Feature::Hdl => "gaomiduzhidanbai",
            Feature::Magnesium => "MEI",
            Feature::Phosphorus => "P",
            Feature::Race => "race",
            Feature::Smoker => "smoker",
            Feature::Aki => "aki",
            Feature::Leukemia => "baixuezheng",
            Feature::Diabetes => "diabetes",
            Feature::HeartFailure => "xinlishuaijie",
            Feature::Paraplegia => "jietan",
            Feature::Malignancy => "exingzhongliu",
            Feature::RenalReplacement => "shenzangdaitizhiliao",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        super::layout::FORM_FEATURES
            .iter()
            .copied()
            .find(|f| f.name() == name)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Feature::Sex => "Sex",
            Feature::Age => "Age",
            Feature::Gcs => "GCS score",
            Feature::Neutrophils => "Neutrophils",
            Feature::RedBloodCells => "Red blood cells",
            Feature::Aptt => "APTT",
            Feature::AlkalinePhosphatase => "Alkaline phosphatase",
            Feature::Triglycerides => "Triglycerides",
            Feature::Hdl => "HDL cholesterol",
            Feature::Magnesium => "Magnesium",
            Feature::Phosphorus => "Phosphorus",
            Feature::Race => "Race",
            Feature::Smoker => "Smoking history",
            Feature::Aki => "Acute kidney injury",
            Feature::Leukemia => "Leukemia",
            Feature::Diabetes => "Diabetes",
            Feature::HeartFailure => "Heart failure",
            Feature::Paraplegia => "Paraplegia",
            Feature::Malignancy => "Malignant tumor",
            Feature::RenalReplacement => "Renal replacement therapy",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Feature::Age => "years",
            Feature::Gcs => "points (3-15)",
            Feature::Neutrophils => "% (30-90)",
            Feature::RedBloodCells => "10^12/L (2.0-6.0)",
            Feature::Aptt => "s (20-100)",
            Feature::AlkalinePhosphatase => "U/L (30-300)",
            Feature::Triglycerides => "mmol/L (0.1-5.0)",
            Feature::Hdl => "mmol/L (0.5-2.5)",
            Feature::Magnesium => "mmol/L (0.5-1.5)",
            Feature::Phosphorus => "mmol/L (0.5-1.8)",
            _ => "",
        }
    }

    pub fn kind(self) -> FeatureKind {
        use FeatureKind::{Categorical, Continuous};
        match self {
            Feature::Sex => Categorical(&SEX_TABLE),
            Feature::Race => Categorical(&RACE_TABLE),
            Feature::Age => Continuous(ContinuousRange {
                min: 18.0,
                max: 120.0,
                step: 1.0,
                default: 65.0,
            }),
            Feature::Gcs => Continuous(ContinuousRange::midpoint(3.0, 15.0)),
            Feature::Neutrophils => Continuous(ContinuousRange::midpoint(30.0, 90.0)),
            Feature::RedBloodCells => Continuous(ContinuousRange::midpoint(2.0, 6.0)),
            Feature::Aptt => Continuous(ContinuousRange::midpoint(20.0, 100.0)),
            Feature::AlkalinePhosphatase => Continuous(ContinuousRange::midpoint(30.0, 300.0)),
            Feature::Triglycerides => Continuous(ContinuousRange::midpoint(0.1, 5.0)),
            Feature::Hdl => Continuous(ContinuousRange::midpoint(0.5, 2.5)),
            Feature::Magnesium => Continuous(ContinuousRange::midpoint(0.5, 1.5)),
            Feature::Phosphorus => Continuous(ContinuousRange::midpoint(0.5, 1.8)),
            Feature::Smoker
            | Feature::Aki
            | Feature::Leukemia
            | Feature::Diabetes
            | Feature::HeartFailure
            | Feature::Paraplegia
            | Feature::Malignancy
            | Feature::RenalReplacement => Categorical(&BINARY_TABLE),
        }
    }

    pub fn column(self) -> FormColumn {
        match self.kind() {
            FeatureKind::Continuous(_) => FormColumn::Patient,
            FeatureKind::Categorical(_) if self == Feature::Sex => FormColumn::Patient,
            FeatureKind::Categorical(_) => FormColumn::Clinical,
        }
    }

    /// Whether the classifier consumes this feature
    pub fn in_model(self) -> bool {
        super::layout::feature_index(self.name()).is_some()
    }

    /// Value the untouched control submits
    pub fn default_value(self) -> f64 {
        match self.kind() {
            FeatureKind::Continuous(range) => range.default,
            FeatureKind::Categorical(table) => table.default_code() as f64,
        }
    }

    /// Render a stored value for display: labels for categorical codes
    pub fn display_value(self, value: f64) -> String {
        match self.kind() {
            FeatureKind::Categorical(table) => table
                .decode(value.round() as i64)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}", value)),
            FeatureKind::Continuous(range) if range.step >= 1.0 => format!("{:.0}", value),
            FeatureKind::Continuous(_) => format!("{:.1}", value),
        }
    }

    pub fn spec(self) -> FeatureSpec {
        FeatureSpec {
            feature: self,
            name: self.name(),
            label: self.label(),
            unit: self.unit(),
            kind: self.kind(),
            column: self.column(),
            in_model: self.in_model(),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
