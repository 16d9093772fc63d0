//! JSON endpoints for clients that do not use the form

use axum::{extract::State, Json};
use dysphagia_core::logic::features::{FeatureSpec, LayoutInfo, FORM_FEATURES};
use dysphagia_core::logic::model::ModelMetadata;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct SchemaResponse {
    layout: LayoutInfo,
    features: Vec<FeatureSpec>,
}

pub async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        layout: LayoutInfo::current(),
        features: FORM_FEATURES.iter().map(|f| f.spec()).collect(),
    })
}

#[derive(Serialize)]
pub struct ModelStatusResponse {
    status: &'static str,
    explain_enabled: bool,
    model: ModelMetadata,
}

pub async fn model(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    Json(ModelStatusResponse {
        status: "loaded",
        explain_enabled: state.config.explain_enabled,
        model: state.classifier.metadata().clone(),
    })
}
