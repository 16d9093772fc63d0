//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION, MODEL_FEATURES};
use super::record::PatientRecord;
use super::schema::Feature;
use crate::logic::error::SchemaMismatch;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned model row. Values follow `MODEL_FEATURES` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_feature(&self, feature: Feature) -> Option<f64> {
        super::layout::feature_index(feature.name()).and_then(|i| self.get(i))
    }

    /// Whether this row was built against the current layout
    pub fn is_compatible(&self) -> bool {
        self.version == FEATURE_VERSION && self.layout_hash == layout_hash()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": MODEL_FEATURES.iter()
                .zip(self.values.iter())
                .map(|(feature, value)| (feature.name().to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Select exactly `MODEL_FEATURES`, in order, out of a record.
///
/// Form-only features (sex) are dropped. A model feature absent from the
/// record is a `SchemaMismatch`, never a silently zero-filled column.
pub fn assemble(record: &PatientRecord) -> Result<FeatureVector, SchemaMismatch> {
    let mut values = [0.0f64; FEATURE_COUNT];

    for (slot, feature) in values.iter_mut().zip(MODEL_FEATURES) {
        *slot = record
            .get(feature)
            .ok_or_else(|| SchemaMismatch::MissingFeature(feature.name().to_string()))?;
    }

    Ok(FeatureVector::from_values(values))
}

// ============================================================================
// TESTS
// ============================================================================
