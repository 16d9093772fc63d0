//! Dysphagia Risk Web Server entry point
//!
//! Loads the classifier once, then serves the form. A model that cannot be
//! loaded stops startup.

use anyhow::Context;
use dysphagia_core::constants::{APP_NAME, APP_VERSION};
use dysphagia_core::logic::model::Classifier;
use dysphagia_web::{create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "dysphagia_web=debug,dysphagia_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("{} v{} starting...", APP_NAME, APP_VERSION);
    tracing::info!("Model: {}", config.model_path);

    let classifier = Classifier::load(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| format!("failed to load classifier from {}", config.model_path))
        .inspect_err(|e| tracing::error!("{:#}", e))?;

    if !config.explain_enabled {
        tracing::warn!("SHAP explanations disabled (EXPLAIN_ENABLED=false)");
    }

    let addr = config.bind_addr();
    let app = create_router(AppState::new(classifier, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
