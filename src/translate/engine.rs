use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::registry::ModelHandle;
use crate::error::AppError;

#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate `text` with an installed model. An empty string means the
    /// engine produced nothing.
    async fn translate(&self, text: &str, model: &ModelHandle) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct TranslateHttpRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateHttpResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslationEngine {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTranslationEngine {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::EngineFailure(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.base_url)
    }
}

#[async_trait]
impl TranslationEngine for HttpTranslationEngine {
    async fn translate(&self, text: &str, model: &ModelHandle) -> Result<String, AppError> {
        let body = TranslateHttpRequest {
            q: text,
            source: &model.pair.source,
            target: &model.pair.target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.translate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::EngineFailure(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::EngineFailure(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: TranslateHttpResponse = response
            .json()
            .await
            .map_err(|e| AppError::EngineFailure(format!("Invalid response: {}", e)))?;

        Ok(parsed.translated_text.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::LanguagePair;
    use std::path::PathBuf;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model() -> ModelHandle {
        ModelHandle {
            pair: LanguagePair::new("en", "ru"),
            version: "1.0".into(),
            path: PathBuf::from("translate-en_ru-1_0.argosmodel"),
        }
    }

    #[tokio::test]
    async fn test_translate_sends_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(serde_json::json!({
                "q": "Hello",
                "source": "en",
                "target": "ru",
                "format": "text"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "translatedText": "Привет" })),
            )
            .mount(&server)
            .await;

        let engine = HttpTranslationEngine::new(format!("{}/", server.uri()), None).unwrap();
        let out = engine.translate("Hello", &model()).await.unwrap();
        assert_eq!(out, "Привет");
    }

    #[tokio::test]
    async fn test_null_translation_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "translatedText": null })),
            )
            .mount(&server)
            .await;

        let engine = HttpTranslationEngine::new(server.uri(), None).unwrap();
        assert_eq!(engine.translate("Hello", &model()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_http_error_is_engine_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let engine = HttpTranslationEngine::new(server.uri(), Some("secret".into())).unwrap();
        let err = engine.translate("Hello", &model()).await.unwrap_err();
        match err {
            AppError::EngineFailure(msg) => assert!(msg.contains("model crashed")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
