//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the model input schema**
//!
//! `MODEL_FEATURES` is the exact column order the classifier was trained on.
//! The form, the record assembler, the predictor and the explainer all read
//! it from here.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::schema::Feature;
use crate::logic::error::SchemaMismatch;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of model features
pub const FEATURE_COUNT: usize = 19;

/// Model features in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for the model row
pub const MODEL_FEATURES: [Feature; FEATURE_COUNT] = [
    // === Continuous (0-9) ===
    Feature::Age,                 // 0
    Feature::Gcs,                 // 1
    Feature::Neutrophils,         // 2
    Feature::RedBloodCells,       // 3
    Feature::Aptt,                // 4
    Feature::AlkalinePhosphatase, // 5
    Feature::Triglycerides,       // 6
    Feature::Hdl,                 // 7
    Feature::Magnesium,           // 8
    Feature::Phosphorus,          // 9

    // === Categorical (10-18) ===
    Feature::Race,                // 10
    Feature::Smoker,              // 11
    Feature::Aki,                 // 12
    Feature::Leukemia,            // 13
    Feature::Diabetes,            // 14
    Feature::HeartFailure,        // 15
    Feature::Paraplegia,          // 16
    Feature::Malignancy,          // 17
    Feature::RenalReplacement,    // 18
];

/// Number of controls on the form
pub const FORM_FEATURE_COUNT: usize = 20;

/// Every feature the form collects, in render order.
/// Sex is shown to the clinician but was not a training column.
pub const FORM_FEATURES: [Feature; FORM_FEATURE_COUNT] = [
    Feature::Sex,
    Feature::Age,
    Feature::Gcs,
    Feature::Neutrophils,
    Feature::RedBloodCells,
    Feature::Aptt,
    Feature::AlkalinePhosphatase,
    Feature::Triglycerides,
    Feature::Hdl,
    Feature::Magnesium,
    Feature::Phosphorus,
    Feature::Race,
    Feature::Smoker,
    Feature::Aki,
    Feature::Leukemia,
    Feature::Diabetes,
    Feature::HeartFailure,
    Feature::Paraplegia,
    Feature::Malignancy,
    Feature::RenalReplacement,
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash of the model feature layout
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for feature in MODEL_FEATURES {
        hasher.update(feature.name().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: MODEL_FEATURES.iter().map(|f| f.name().to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Check that a classifier's declared feature ids equal `MODEL_FEATURES`,
/// position by position.
pub fn validate_model_layout<S: AsRef<str>>(names: &[S]) -> Result<(), SchemaMismatch> {
    if names.len() != FEATURE_COUNT {
        return Err(SchemaMismatch::CountMismatch {
            expected: FEATURE_COUNT,
            found: names.len(),
        });
    }

    for (position, (expected, found)) in MODEL_FEATURES.iter().zip(names).enumerate() {
        if expected.name() != found.as_ref() {
            return Err(SchemaMismatch::OrderMismatch {
                position,
                expected: expected.name().to_string(),
                found: found.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get model column index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    MODEL_FEATURES.iter().position(|f| f.name() == name)
}

/// Get model column name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    MODEL_FEATURES.get(index).map(|f| f.name())
}

// ============================================================================
// TESTS
// ============================================================================
