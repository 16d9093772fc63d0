//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Model artifact location when MODEL_PATH is unset
pub const DEFAULT_MODEL_PATH: &str = "models/catboost_model.json";

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port
pub const DEFAULT_PORT: u16 = 8501;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Post-stroke Dysphagia Risk";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Expected SHA-256 of the artifact, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Get bind host from environment or use default
pub fn get_host() -> String {
    std::env::var("HOST")
        .unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

/// Get port from environment or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Check if SHAP explanations are enabled
pub fn is_explain_enabled() -> bool {
    std::env::var("EXPLAIN_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
