//! Dysphagia Risk Web Server
//!
//! Single-page assessment form over the dysphagia classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  DYSPHAGIA WEB                       │
//! ├──────────────────────────────────────────────────────┤
//! │  GET  /            form                              │
//! │  POST /predict     collect → score → explain → page  │
//! │  GET  /api/v1/*    schema, model status (JSON)       │
//! │                       │                              │
//! │                       ▼                              │
//! │            ┌─────────────────────┐                   │
//! │            │ Arc<Classifier>     │  read-only        │
//! │            └─────────────────────┘                   │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod views;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use dysphagia_core::logic::model::Classifier;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub config: Config,
}

impl AppState {
    pub fn new(classifier: Classifier, config: Config) -> Self {
        Self {
            classifier: Arc::new(classifier),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::form::index))
        .route("/predict", post(handlers::predict::predict));

    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/schema", get(handlers::api::schema))
        .route("/api/v1/model", get(handlers::api::model));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
