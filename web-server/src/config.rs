//! Configuration module

use dysphagia_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// CatBoost JSON export
    pub model_path: String,

    /// Pinned SHA-256 of the model file
    pub model_sha256: Option<String>,

    /// Compute SHAP explanations on predict
    pub explain_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: constants::get_host(),
            port: constants::get_port(),
            model_path: constants::get_model_path(),
            model_sha256: constants::get_model_sha256(),
            explain_enabled: constants::is_explain_enabled(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            model_path: constants::DEFAULT_MODEL_PATH.to_string(),
            model_sha256: None,
            explain_enabled: true,
        }
    }
}
