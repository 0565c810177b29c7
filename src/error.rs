use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::translate::LanguagePair;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Translation model not available: {0}")]
    ModelUnavailable(LanguagePair),

    #[error("Translation returned empty result")]
    EmptyTranslation,

    #[error("Translation engine failed: {0}")]
    EngineFailure(String),

    #[error("Model registry error: {0}")]
    RegistryError(String),

    #[error("TTS synthesis failed: {0}")]
    SynthesisFailure(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl AppError {
    /// Status, machine code and the message the caller is allowed to see.
    /// Server-side failures never expose their detail.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::ModelUnavailable(_) => (
                StatusCode::BAD_REQUEST,
                "MODEL_UNAVAILABLE",
                self.to_string(),
            ),
            AppError::EmptyTranslation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EMPTY_TRANSLATION",
                "Translation failed".to_string(),
            ),
            AppError::EngineFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENGINE_FAILURE",
                "Translation failed".to_string(),
            ),
            AppError::RegistryError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "REGISTRY_ERROR",
                "Translation failed".to_string(),
            ),
            AppError::SynthesisFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SYNTHESIS_FAILURE",
                "TTS synthesis failed".to_string(),
            ),
            AppError::IoError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                "Internal server error".to_string(),
            ),
            AppError::JsonError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "JSON_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!("Request failed: {} - {}", code, self);
        } else {
            tracing::warn!("Request rejected: {} - {}", code, message);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
