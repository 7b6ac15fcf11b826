use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::backend::BackendError;
use crate::scanner::CaptureError;

/// Errors surfaced by the screen handlers. Each one renders as a visible
/// `{"message": ...}` body; nothing here takes the service down.
#[derive(Debug, Error)]
pub enum AppError {
    /// Form validation failed. Keys are wire field names.
    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Per-field messages, renamed through `wire_name`.
    pub fn validation(errors: &ValidationErrors, wire_name: fn(&str) -> &str) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (wire_name(field.as_ref()).to_string(), messages)
            })
            .collect();
        AppError::Validation(fields)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Capture(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Backend(BackendError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(fields) => json!({
                "message": "Validation failed",
                "errors": fields,
            }),
            other => json!({ "message": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
