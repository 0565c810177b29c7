pub mod handlers;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::languages::Language;

/// Longest accepted request text, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub lang: String,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub translation: &'static [Language],
    pub tts: &'static [Language],
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub translation: bool,
    pub tts: bool,
}
