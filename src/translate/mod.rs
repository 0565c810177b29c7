pub mod engine;
pub mod registry;
pub mod tracker;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::AppError;
use crate::languages::{Language, DEFAULT_PAIR_LANGUAGES, PIVOT_LANGUAGE, TRANSLATION_LANGUAGES};

pub use engine::{HttpTranslationEngine, TranslationEngine};
pub use registry::{ArgosIndexRegistry, ModelHandle, ModelRegistry, PackageInfo};
pub use tracker::ModelTracker;

/// Ordered (source, target) translation direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// English to and from every default language.
pub fn default_pairs() -> Vec<LanguagePair> {
    DEFAULT_PAIR_LANGUAGES
        .iter()
        .flat_map(|code| {
            [
                LanguagePair::new(PIVOT_LANGUAGE, *code),
                LanguagePair::new(*code, PIVOT_LANGUAGE),
            ]
        })
        .collect()
}

pub fn is_translation_language(code: &str) -> bool {
    TRANSLATION_LANGUAGES.iter().any(|lang| lang.code == code)
}

pub struct TranslationService {
    registry: Arc<dyn ModelRegistry>,
    engine: Arc<dyn TranslationEngine>,
    tracker: ModelTracker,
}

impl TranslationService {
    pub fn new(registry: Arc<dyn ModelRegistry>, engine: Arc<dyn TranslationEngine>) -> Self {
        Self {
            registry,
            engine,
            tracker: ModelTracker::new(),
        }
    }

    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, AppError> {
        if source_lang == target_lang {
            return Ok(text.to_string());
        }

        let pair = LanguagePair::new(source_lang, target_lang);
        if !is_translation_language(source_lang) || !is_translation_language(target_lang) {
            return Err(AppError::ModelUnavailable(pair));
        }

        // 1. Make sure the model is installed
        let model = self.ensure_model(&pair).await?;

        // 2. Translate
        let translation = self.engine.translate(text, &model).await.map_err(|e| match e {
            AppError::EngineFailure(_) => e,
            other => AppError::EngineFailure(other.to_string()),
        })?;

        if translation.is_empty() {
            tracing::error!("Translation {} returned empty result", pair);
            return Err(AppError::EmptyTranslation);
        }

        Ok(translation)
    }

    pub async fn ensure_model(&self, pair: &LanguagePair) -> Result<Arc<ModelHandle>, AppError> {
        self.tracker
            .get_or_provision(pair, || self.provision(pair))
            .await
            .inspect_err(|e| tracing::error!("Failed to install model {}: {}", pair, e))
    }

    async fn provision(&self, pair: &LanguagePair) -> Result<ModelHandle, AppError> {
        let packages = self.registry.available_packages().await?;
        let package = registry::find_package(&packages, pair)
            .ok_or_else(|| AppError::ModelUnavailable(pair.clone()))?;

        tracing::info!("Installing translation model: {}", pair);
        let handle = self.registry.install(package).await?;
        tracing::debug!(
            "Model {} v{} installed at {}",
            handle.pair,
            handle.version,
            handle.path.display()
        );
        Ok(handle)
    }

    /// Track what is already installed, then install any missing default
    /// pair. Failures are logged and never abort startup.
    pub async fn initialize(&self) {
        match self.registry.installed_packages().await {
            Ok(installed) => {
                tracing::info!("Found {} installed translation models", installed.len());
                for handle in installed {
                    self.tracker.record(handle);
                }
            }
            Err(e) => tracing::warn!("Could not list installed translation models: {}", e),
        }

        let missing: Vec<LanguagePair> = default_pairs()
            .into_iter()
            .filter(|pair| self.tracker.get(pair).is_none())
            .collect();

        if missing.is_empty() {
            return;
        }

        if let Err(e) = self.registry.available_packages().await {
            tracing::error!("Failed to initialize translation models: {}", e);
            tracing::warn!(
                "Running without pre-installed models. Models will be installed on demand."
            );
            return;
        }

        tracing::info!("Installing {} default translation models...", missing.len());
        for pair in &missing {
            if let Err(e) = self.ensure_model(pair).await {
                tracing::warn!("Skipping default model {}: {}", pair, e);
            }
        }

        let pairs: Vec<String> = self.installed_pairs().iter().map(|p| p.to_string()).collect();
        tracing::info!(
            "Translation models ready: {} installed [{}]",
            pairs.len(),
            pairs.join(", ")
        );
    }

    pub fn is_ready(&self) -> bool {
        !self.tracker.is_empty()
    }

    pub fn installed_pairs(&self) -> Vec<LanguagePair> {
        self.tracker.installed_pairs()
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        TRANSLATION_LANGUAGES
    }
}
