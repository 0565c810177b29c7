use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;

use super::SpeechEngine;
use crate::error::AppError;
use crate::text;

/// Width of one voice style vector.
pub const STYLE_DIM: usize = 256;

/// Phoneme tokens per inference call, excluding the two boundary pads.
pub const MAX_PHONEME_TOKENS: usize = 510;

const MODEL_FILE: &str = "kokoro.onnx";
const CONFIG_FILE: &str = "config.json";
const VOICES_DIR: &str = "voices";
const WORD_SEPARATOR: &str = " ";

#[derive(Debug, Deserialize)]
struct KokoroConfig {
    vocab: HashMap<String, i64>,
}

struct LoadedModel {
    session: Session,
    vocab: HashMap<String, i64>,
}

impl LoadedModel {
    fn load(model_dir: &Path) -> Result<Self, AppError> {
        let model_path = model_dir.join(MODEL_FILE);
        let config_path = model_dir.join(CONFIG_FILE);

        if !model_path.exists() {
            return Err(AppError::SynthesisFailure(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let config: KokoroConfig = serde_json::from_reader(File::open(&config_path)?)?;

        let session = Session::builder()
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to load model: {}", e)))?;

        tracing::info!("Loaded Kokoro model from {}", model_path.display());

        Ok(Self {
            session,
            vocab: config.vocab,
        })
    }

    fn infer(&mut self, ids: &[i64], styles: &Array2<f32>, speed: f32) -> Result<Vec<f32>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // tokens: [batch, sequence] with a pad on each side
        let mut tokens = Vec::with_capacity(ids.len() + 2);
        tokens.push(0);
        tokens.extend_from_slice(ids);
        tokens.push(0);
        let tokens_value = Value::from_array((vec![1, tokens.len()], tokens))
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to create tokens tensor: {}", e)))?;

        // style: [1, 256], picked by phoneme count
        let style = styles.row(style_index(ids.len(), styles.nrows())).to_vec();
        let style_value = Value::from_array((vec![1, STYLE_DIM], style))
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to create style tensor: {}", e)))?;

        let speed_value = Value::from_array((vec![1], vec![speed]))
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to create speed tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![tokens_value, style_value, speed_value])
            .map_err(|e| AppError::SynthesisFailure(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get("audio")
            .or_else(|| outputs.get("waveform"))
            .ok_or_else(|| AppError::SynthesisFailure("Missing output tensor".to_string()))?;

        let output_view = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output_view.1.iter().copied().collect())
    }
}

/// Kokoro-82M ONNX synthesis.
///
/// Expects `kokoro.onnx`, `config.json` (phoneme vocabulary) and
/// `voices/<voice>.bin` (little-endian `f32` style table, 256 values per
/// row) under the model directory. The session is loaded on first use.
pub struct KokoroEngine {
    model_dir: PathBuf,
    model: Mutex<Option<LoadedModel>>,
    voices: RwLock<HashMap<String, Arc<Array2<f32>>>>,
}

impl KokoroEngine {
    pub fn new(model_dir: PathBuf) -> Self {
        Self {
            model_dir,
            model: Mutex::new(None),
            voices: RwLock::new(HashMap::new()),
        }
    }

    fn voice_styles(&self, voice: &str) -> Result<Arc<Array2<f32>>, AppError> {
        // Check cache
        {
            let voices = self.voices.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(styles) = voices.get(voice) {
                return Ok(Arc::clone(styles));
            }
        }

        let path = self.model_dir.join(VOICES_DIR).join(format!("{}.bin", voice));
        if !path.exists() {
            return Err(AppError::SynthesisFailure(format!("Voice '{}' not found", voice)));
        }
        let styles = Arc::new(parse_voice_styles(&std::fs::read(&path)?)?);

        // Cache it
        {
            let mut voices = self.voices.write().unwrap_or_else(PoisonError::into_inner);
            voices.insert(voice.to_string(), Arc::clone(&styles));
        }

        Ok(styles)
    }
}

impl SpeechEngine for KokoroEngine {
    fn generate(&self, text: &str, voice: &str, locale: &str, speed: f32) -> Result<Vec<f32>, AppError> {
        let styles = self.voice_styles(voice)?;

        let mut guard = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(LoadedModel::load(&self.model_dir)?);
        }
        let model = guard
            .as_mut()
            .ok_or_else(|| AppError::SynthesisFailure("Model not loaded".to_string()))?;

        let mut audio = Vec::new();
        for chunk in text::chunks(text) {
            let phonemes = phonemize(&chunk, locale)?;
            let ids = phonemes_to_ids(&phonemes, &model.vocab);
            let separator = model.vocab.get(WORD_SEPARATOR).copied();
            for window in token_windows(&ids, MAX_PHONEME_TOKENS, separator) {
                audio.extend(model.infer(window, &styles, speed)?);
            }
        }

        Ok(audio)
    }
}

/// Convert text to phonemes using espeak-ng
pub fn phonemize(text: &str, locale: &str) -> Result<String, AppError> {
    run_phonemizer(OsStr::new("espeak-ng"), text, locale)
}

/// Text goes in on stdin so it is never read as a command-line option.
fn run_phonemizer(program: &OsStr, text: &str, locale: &str) -> Result<String, AppError> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let mut child = Command::new(program)
        .args(["--ipa", "-q", "-v", locale, "--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            AppError::SynthesisFailure(format!(
                "Failed to run espeak-ng (is it installed?): {}",
                e
            ))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::SynthesisFailure(format!("espeak-ng failed: {}", stderr)));
    }

    // espeak-ng breaks long clauses over several lines
    let phonemes = String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(phonemes)
}

/// Split `ids` into windows of at most `max` tokens, cutting at the last
/// word separator that fits. A window with no separator is cut at `max`.
pub fn token_windows(ids: &[i64], max: usize, separator: Option<i64>) -> Vec<&[i64]> {
    let mut windows = Vec::new();
    let mut rest = ids;

    while rest.len() > max {
        let cut = separator
            .and_then(|sep| rest[..=max].iter().rposition(|&id| id == sep))
            .filter(|&pos| pos > 0);

        match cut {
            Some(pos) => {
                windows.push(&rest[..pos]);
                rest = &rest[pos + 1..];
            }
            None => {
                windows.push(&rest[..max]);
                rest = &rest[max..];
            }
        }
    }

    if !rest.is_empty() {
        windows.push(rest);
    }
    windows
}

/// Map each phoneme character through the vocabulary; unknown characters are
/// dropped.
pub fn phonemes_to_ids(phonemes: &str, vocab: &HashMap<String, i64>) -> Vec<i64> {
    let mut buf = [0u8; 4];
    phonemes
        .chars()
        .filter_map(|ch| vocab.get(&*ch.encode_utf8(&mut buf)).copied())
        .collect()
}

/// Style row for a sequence of `token_count` phonemes.
pub fn style_index(token_count: usize, rows: usize) -> usize {
    token_count.min(rows.saturating_sub(1))
}

pub fn parse_voice_styles(bytes: &[u8]) -> Result<Array2<f32>, AppError> {
    let row_bytes = STYLE_DIM * 4;
    if bytes.is_empty() || bytes.len() % row_bytes != 0 {
        return Err(AppError::SynthesisFailure(format!(
            "Voice table size {} is not a multiple of {}",
            bytes.len(),
            row_bytes
        )));
    }

    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let rows = values.len() / STYLE_DIM;

    Array2::from_shape_vec((rows, STYLE_DIM), values)
        .map_err(|e| AppError::SynthesisFailure(format!("Invalid voice table: {}", e)))
}
