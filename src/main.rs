use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod languages;
mod text;
mod translate;
mod tts;

#[cfg(test)]
mod test_support;

use api::routes::{create_router, AppState};
use config::ServerConfig;
use translate::{ArgosIndexRegistry, HttpTranslationEngine, TranslationService};
use tts::{KokoroEngine, SpeechService};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment
    let config = ServerConfig::from_env().expect("Invalid configuration");
    let addr = config.bind_addr().expect("Invalid address");

    tracing::info!("Translator TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Translation models: {}", config.models_dir.display());
    tracing::info!("Translation backend: {}", config.translate_url);
    tracing::info!("Kokoro directory: {}", config.kokoro_dir.display());

    // Create translation service
    let registry = ArgosIndexRegistry::new(&config.package_index_url, config.models_dir.clone())
        .expect("Failed to create model registry client");
    let engine = HttpTranslationEngine::new(&config.translate_url, config.translate_api_key.clone())
        .expect("Failed to create translation client");
    let translation = TranslationService::new(Arc::new(registry), Arc::new(engine));

    // Create TTS service
    let speech = SpeechService::new(Arc::new(KokoroEngine::new(config.kokoro_dir.clone())));

    // Create app state
    let state = Arc::new(AppState {
        translation,
        speech,
    });

    // Provision default models and warm up TTS without holding up the listener
    let startup = Arc::clone(&state);
    tokio::spawn(async move {
        startup.translation.initialize().await;
    });
    let warmup = Arc::clone(&state);
    tokio::task::spawn_blocking(move || {
        warmup.speech.warm_up();
    });

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
