//! Error handling

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use dysphagia_core::{AssessmentError, InferenceError, MapperError, SchemaMismatch};
use thiserror::Error;

use crate::views;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Collected features do not match the model
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    /// A submitted value could not be used
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Schema(e) => {
                tracing::warn!("Schema mismatch: {}", e);
                format!("The submitted record does not match the model inputs: {}", e)
            }
            AppError::InvalidInput(msg) => {
                tracing::warn!("Invalid input: {}", msg);
                msg.clone()
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}

impl From<MapperError> for AppError {
    fn from(err: MapperError) -> Self {
        match err {
            MapperError::Schema(e) => AppError::Schema(e),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Schema(e) => AppError::Schema(e),
            AssessmentError::Inference(e) => e.into(),
        }
    }
}
