//! Logic Module - Assessment Engines
//!
//! - `features/` - Clinical input schema, form collection, model row
//! - `model/` - Tree ensemble loading and inference, risk bands
//! - `explain/` - Tree SHAP attributions and plots
//! - `assessment` - The full collect → predict → explain flow

pub mod error;
pub mod features;
pub mod model;
pub mod explain;
pub mod assessment;

pub use assessment::{assess, Assessment};
