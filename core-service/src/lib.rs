//! Dysphagia Core - Post-stroke dysphagia risk assessment
//!
//! Feature schema, classifier inference and per-feature explanations.
//! No I/O beyond loading the model artifact once.

pub mod constants;
pub mod logic;

pub use logic::error::{
    ArtifactError, AssessmentError, ExplanationError, InferenceError, MapperError, SchemaMismatch,
};
