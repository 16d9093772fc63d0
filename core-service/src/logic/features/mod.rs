//! Features Module - Clinical input schema and record assembly
//!
//! Schema tables, form control descriptors, form collection, and the
//! ordered model row handed to the classifier.

pub mod layout;
pub mod schema;
pub mod controls;
pub mod record;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, MODEL_FEATURES, FORM_FEATURES, LayoutInfo, validate_model_layout};
pub use schema::{Feature, FeatureKind, FeatureSpec, CategoricalTable};
pub use controls::{form_controls, FormControl, Widget};
pub use record::{collect, PatientRecord};
pub use vector::{assemble, FeatureVector};
