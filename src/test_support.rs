//! In-memory stand-ins for the registry and the two engines.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::translate::{LanguagePair, ModelHandle, ModelRegistry, PackageInfo, TranslationEngine};
use crate::tts::SpeechEngine;

fn fake_handle(pair: LanguagePair) -> ModelHandle {
    let path = PathBuf::from(format!(
        "/fake/models/translate-{}_{}-1_0.argosmodel",
        pair.source, pair.target
    ));
    ModelHandle {
        pair,
        version: "1.0".into(),
        path,
    }
}

pub struct FakeRegistry {
    packages: Option<Vec<PackageInfo>>,
    installed: Vec<ModelHandle>,
    failing: Vec<LanguagePair>,
    index_calls: AtomicUsize,
    install_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn with_pairs(pairs: &[(&str, &str)]) -> Self {
        let packages = pairs
            .iter()
            .map(|(from, to)| PackageInfo {
                from_code: from.to_string(),
                to_code: to.to_string(),
                package_version: "1.0".into(),
                links: vec![format!("https://packages.invalid/{}_{}.argosmodel", from, to)],
            })
            .collect();

        Self {
            packages: Some(packages),
            installed: Vec::new(),
            failing: Vec::new(),
            index_calls: AtomicUsize::new(0),
            install_calls: AtomicUsize::new(0),
        }
    }

    /// Every index lookup fails.
    pub fn unreachable() -> Self {
        Self {
            packages: None,
            ..Self::with_pairs(&[])
        }
    }

    pub fn with_installed(mut self, pairs: &[(&str, &str)]) -> Self {
        self.installed = pairs
            .iter()
            .map(|(from, to)| fake_handle(LanguagePair::new(*from, *to)))
            .collect();
        self
    }

    pub fn failing_install(mut self, from: &str, to: &str) -> Self {
        self.failing.push(LanguagePair::new(from, to));
        self
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn install_calls(&self) -> usize {
        self.install_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelRegistry for FakeRegistry {
    async fn available_packages(&self) -> Result<Vec<PackageInfo>, AppError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.packages
            .clone()
            .ok_or_else(|| AppError::RegistryError("index unreachable".into()))
    }

    async fn installed_packages(&self) -> Result<Vec<ModelHandle>, AppError> {
        Ok(self.installed.clone())
    }

    async fn install(&self, package: &PackageInfo) -> Result<ModelHandle, AppError> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        let pair = package.pair();
        if self.failing.contains(&pair) {
            return Err(AppError::RegistryError(format!("download of {} failed", pair)));
        }
        Ok(fake_handle(pair))
    }
}

enum TranslationMode {
    Echo,
    Fixed(String),
    Fail,
}

pub struct FakeTranslationEngine {
    mode: TranslationMode,
    calls: AtomicUsize,
}

impl FakeTranslationEngine {
    /// Returns `[target] text`.
    pub fn echo() -> Self {
        Self {
            mode: TranslationMode::Echo,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(text: &str) -> Self {
        Self {
            mode: TranslationMode::Fixed(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: TranslationMode::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationEngine for FakeTranslationEngine {
    async fn translate(&self, text: &str, model: &ModelHandle) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            TranslationMode::Echo => Ok(format!("[{}] {}", model.pair.target, text)),
            TranslationMode::Fixed(out) => Ok(out.clone()),
            TranslationMode::Fail => Err(AppError::EngineFailure("engine crashed".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechCall {
    pub text: String,
    pub voice: String,
    pub locale: String,
    pub speed: f32,
}

/// Produces a fixed-amplitude tone whose length depends on text and speed.
pub struct FakeSpeechEngine {
    amplitude: f32,
    fail: bool,
    calls: Mutex<Vec<SpeechCall>>,
}

impl FakeSpeechEngine {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0.5)
        }
    }

    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<SpeechCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl SpeechEngine for FakeSpeechEngine {
    fn generate(&self, text: &str, voice: &str, locale: &str, speed: f32) -> Result<Vec<f32>, AppError> {
        self.calls.lock().unwrap().push(SpeechCall {
            text: text.to_string(),
            voice: voice.to_string(),
            locale: locale.to_string(),
            speed,
        });

        if self.fail {
            return Err(AppError::SynthesisFailure("engine crashed".into()));
        }

        let len = (text.chars().count() as f32 * 240.0 / speed) as usize;
        Ok((0..len)
            .map(|i| if i % 2 == 0 { self.amplitude } else { -self.amplitude })
            .collect())
    }
}
