//! Model Module - Classifier artifact and inference
//!
//! Artifact parsing is kept apart from scoring so another tree export
//! format only touches `artifact.rs`.

pub mod artifact;
pub mod inference;
pub mod risk;

// Re-export common types
pub use artifact::{ObliviousForest, ObliviousTree, Split};
pub use inference::{Classifier, InferenceEngine, ModelMetadata, PredictionResult};
pub use risk::RiskBand;
