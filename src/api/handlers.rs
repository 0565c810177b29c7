use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{
    HealthResponse, LanguagesResponse, TranslateRequest, TranslateResponse, TtsRequest,
    MAX_TEXT_CHARS,
};
use crate::api::routes::AppState;
use crate::error::AppError;

fn validate_text(text: &str) -> Result<(), AppError> {
    if text.is_empty() {
        return Err(AppError::BadRequest("Text is required".into()));
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Text too long (max {} chars)",
            MAX_TEXT_CHARS
        )));
    }

    Ok(())
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Local Translator & TTS API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "translation": "/api/translate",
            "tts": "/api/tts",
            "languages": "/api/languages",
            "health": "/health"
        }
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        translation: state.translation.is_ready(),
        tts: state.speech.is_ready(),
    })
}

pub async fn languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        translation: state.translation.supported_languages(),
        tts: state.speech.supported_languages(),
    })
}

pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, AppError> {
    // Validate input
    validate_text(&request.text)?;

    if request.source_lang.is_empty() || request.target_lang.is_empty() {
        return Err(AppError::BadRequest(
            "Source and target languages are required".into(),
        ));
    }

    let translation = state
        .translation
        .translate(&request.text, &request.source_lang, &request.target_lang)
        .await?;

    Ok(Json(TranslateResponse { translation }))
}

pub async fn tts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, AppError> {
    // Validate input
    validate_text(&request.text)?;

    let speed = request.speed.unwrap_or(1.0);
    let volume = request.volume.unwrap_or(1.0);

    // Synthesis is CPU bound, keep it off the async workers
    let wav = tokio::task::spawn_blocking(move || {
        state.speech.synthesize(
            &request.text,
            &request.lang,
            speed,
            volume,
            request.voice.as_deref(),
        )
    })
    .await
    .map_err(|e| AppError::SynthesisFailure(format!("Synthesis task failed: {}", e)))??;

    let length = wav.len().to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=speech.wav".to_string(),
            ),
            (header::CONTENT_LENGTH, length),
        ],
        wav,
    )
        .into_response())
}
