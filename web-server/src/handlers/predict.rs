//! Prediction handler
//!
//! One submission: collect → assemble → score → explain → render.

use std::collections::HashMap;

use axum::{extract::State, response::Html, Form};
use dysphagia_core::logic::assess;
use dysphagia_core::logic::features::{collect, form_controls, Feature, FormControl, PatientRecord};

use crate::{views, AppResult, AppState};

/// Checkbox that is not a model input
const SHOW_INPUT_FIELD: &str = "show_input";

pub async fn predict(
    State(state): State<AppState>,
    Form(mut form): Form<HashMap<String, String>>,
) -> AppResult<Html<String>> {
    let show_input = form.remove(SHOW_INPUT_FIELD).is_some();

    let record = collect(&form)?;
    let assessment = assess(&state.classifier, &record, state.config.explain_enabled)?;

    tracing::info!(
        percent = assessment.prediction.percent,
        band = %assessment.prediction.band,
        inference_us = assessment.prediction.inference_time_us,
        "Prediction served"
    );

    let result = views::result_section(&assessment, &record, show_input);
    Ok(Html(views::page(&restore_controls(&record), show_input, Some(&result))))
}

/// Controls showing what was submitted
fn restore_controls(record: &PatientRecord) -> Vec<FormControl> {
    form_controls()
        .into_iter()
        .map(|control| {
            let submitted = Feature::from_name(control.name)
                .and_then(|feature| record.get(feature).map(|value| (feature, value)));
            match submitted {
                Some((feature, value)) => control.with_value(feature, value),
                None => control,
            }
        })
        .collect()
}
