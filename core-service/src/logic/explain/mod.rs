//! Explain Module - Per-feature attributions for a single prediction
//!
//! Exact Tree SHAP over the loaded oblivious trees, plus SVG views.

pub mod engine;
pub mod plot;
pub mod types;

pub use engine::{TreeExplainer, MAX_EXPLAIN_DEPTH};
pub use plot::{force_plot_svg, importance_bar_svg};
pub use types::{mean_abs_importance, Attribution, Explanation};
