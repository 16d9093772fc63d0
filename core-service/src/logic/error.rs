//! Error types for the assessment pipeline.
//!
//! Each concern has its own enum so callers can tell fatal failures
//! (artifact, schema) apart from the recoverable explanation failure.

use thiserror::Error;

/// Classifier artifact could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is not valid CatBoost JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported model artifact: {0}")]
    Unsupported(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("model feature layout does not match the form: {0}")]
    Schema(#[from] SchemaMismatch),
}

/// Collected features do not line up with what the classifier expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("required feature `{0}` was not collected")]
    MissingFeature(String),

    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("expected {expected} model features, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("feature #{position} should be `{expected}`, found `{found}`")]
    OrderMismatch {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Form submission could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapperError {
    #[error("invalid value for `{feature}`: {reason}")]
    InvalidInput { feature: String, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
}

/// Model input was malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("invalid model input: {0}")]
    InvalidInput(String),
}

/// Attribution computation failed. Recovered and shown inline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplanationError {
    #[error("tree #{tree} has depth {depth}, explainer supports at most {max}")]
    TreeTooDeep { tree: usize, depth: usize, max: usize },

    #[error("attributions sum to {sum:.6} but model output minus base value is {expected:.6}")]
    Additivity { sum: f64, expected: f64 },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Failure of a whole assessment request (explanation failures excluded).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
