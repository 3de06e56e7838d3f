//! Configuration for the whole assistant
//!
//! Loaded from TOML. Every section falls back to its defaults, so an empty or
//! missing file is a valid configuration.

use crate::session::settings::{clamp_rate, VoiceSettings, DEFAULT_RATE};
use crate::{MurmurError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "MURMUR_CONFIG";
pub const MODEL_ENV: &str = "MURMUR_MODEL";
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
const OLLAMA_DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MurmurConfig {
    pub model: ModelConfig,
    pub transcription: TranscriptionConfig,
    pub synthesis: SynthesisConfig,
    pub capture: CaptureConfig,
    pub voice: VoiceConfig,
    pub timeouts: TimeoutConfig,
    /// Where Save/Load point by default
    pub transcript_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub host: String,
    pub name: String,
    /// Reply recorded when the model fails or says nothing
    pub apology: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: format!("http://localhost:{}", OLLAMA_DEFAULT_PORT),
            name: "mistral".to_string(),
            apology: "Sorry, I had trouble responding.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionBackend {
    /// OpenAI-compatible `/audio/transcriptions`
    Http,
    /// Local whisper.cpp model (feature `whisper`)
    Whisper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub backend: TranscriptionBackend,
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub language: Option<String>,
    pub whisper_model_path: PathBuf,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            backend: TranscriptionBackend::Http,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            language: Some("en".to_string()),
            whisper_model_path: PathBuf::from("models/ggml-base.en.bin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisBackend {
    /// OpenAI-compatible `/audio/speech`
    Http,
    /// Local VITS model through sherpa-onnx (feature `sherpa`)
    Sherpa,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub backend: SynthesisBackend,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub sherpa: SherpaConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            backend: SynthesisBackend::Http,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "tts-1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            sherpa: SherpaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SherpaConfig {
    pub model: String,
    pub tokens: String,
    pub lexicon: String,
    pub data_dir: String,
    pub dict_dir: String,
    /// Number of speakers the model was trained with
    pub speakers: u32,
}

impl Default for SherpaConfig {
    fn default() -> Self {
        Self {
            model: "models/vits-piper-en_US-amy-low/en_US-amy-low.onnx".to_string(),
            tokens: "models/vits-piper-en_US-amy-low/tokens.txt".to_string(),
            lexicon: String::new(),
            data_dir: "models/vits-piper-en_US-amy-low/espeak-ng-data".to_string(),
            dict_dir: String::new(),
            speakers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub enabled: bool,
    /// Ambient noise sampled before listening
    pub calibration_ms: u64,
    /// Speech threshold as a multiple of the ambient RMS
    pub threshold_ratio: f32,
    pub min_threshold: f32,
    /// Silence that ends a phrase
    pub pause_ms: u64,
    pub max_phrase_ms: u64,
    /// How long to wait for speech to start
    pub listen_timeout_ms: u64,
    pub target_sample_rate: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calibration_ms: 1000,
            threshold_ratio: 1.5,
            min_threshold: 0.01,
            pause_ms: 800,
            max_phrase_ms: 30_000,
            listen_timeout_ms: 10_000,
            target_sample_rate: 16_000,
        }
    }
}

impl CaptureConfig {
    /// Longest a single capture can legitimately take
    pub fn worst_case(&self) -> Duration {
        Duration::from_millis(
            self.calibration_ms
                .saturating_add(self.listen_timeout_ms)
                .saturating_add(self.max_phrase_ms),
        )
    }

    /// Ambient samples to record at `sample_rate` before listening
    pub fn calibration_samples(&self, sample_rate: u32) -> usize {
        let samples = self.calibration_ms.saturating_mul(sample_rate as u64) / 1000;
        usize::try_from(samples).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub rate: u32,
    pub voice_id: String,
    pub muted: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            voice_id: String::new(),
            muted: false,
        }
    }
}

/// Per-provider call limits in milliseconds; 0 disables the limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub capture_ms: u64,
    pub transcription_ms: u64,
    pub generation_ms: u64,
    pub synthesis_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            capture_ms: 45_000,
            transcription_ms: 30_000,
            generation_ms: 120_000,
            synthesis_ms: 300_000,
        }
    }
}

impl TimeoutConfig {
    pub fn limit(ms: u64) -> Option<Duration> {
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    /// No limits at all
    pub fn unbounded() -> Self {
        Self {
            capture_ms: 0,
            transcription_ms: 0,
            generation_ms: 0,
            synthesis_ms: 0,
        }
    }
}

impl MurmurConfig {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MurmurError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            MurmurError::ConfigError(detail) => {
                MurmurError::ConfigError(format!("{}: {}", path.display(), detail))
            }
            other => other,
        })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: MurmurConfig =
            toml::from_str(content).map_err(|e| MurmurError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and load the configuration, then apply environment overrides
    ///
    /// `$MURMUR_CONFIG` wins, then `<config dir>/murmur/config.toml`. A missing
    /// default file means defaults; a missing `$MURMUR_CONFIG` file is an error.
    pub fn discover() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(path)?,
                _ => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `OLLAMA_HOST` and `MURMUR_MODEL`
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var(OLLAMA_HOST_ENV) {
            if !host.trim().is_empty() {
                self.model.host = normalize_host(&host);
            }
        }
        if let Ok(name) = std::env::var(MODEL_ENV) {
            if !name.trim().is_empty() {
                self.model.name = name.trim().to_string();
            }
        }
    }

    pub fn with_model(mut self, name: impl Into<String>) -> Self {
        self.model.name = name.into();
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.model.host = normalize_host(host);
        self
    }

    /// Text-only mode
    pub fn without_audio(mut self) -> Self {
        self.capture.enabled = false;
        self.synthesis.backend = SynthesisBackend::Disabled;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings::new(
            self.voice.rate as i64,
            self.voice.voice_id.clone(),
            self.voice.muted,
        )
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.transcript_path
            .clone()
            .unwrap_or_else(default_transcript_path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(MurmurError::ConfigError("Model name is required".to_string()));
        }
        if !self.model.host.starts_with("http://") && !self.model.host.starts_with("https://") {
            return Err(MurmurError::ConfigError(format!(
                "Model host must be an http(s) URL: {}",
                self.model.host
            )));
        }
        if self.model.apology.trim().is_empty() {
            return Err(MurmurError::ConfigError(
                "Apology text must not be blank".to_string(),
            ));
        }
        if clamp_rate(self.voice.rate as i64) != self.voice.rate {
            return Err(MurmurError::ConfigError(format!(
                "Voice rate {} is outside 50..=300",
                self.voice.rate
            )));
        }

        let capture = &self.capture;
        if capture.enabled {
            if capture.threshold_ratio <= 0.0 || capture.min_threshold < 0.0 {
                return Err(MurmurError::ConfigError(
                    "Capture thresholds must be positive".to_string(),
                ));
            }
            if capture.pause_ms == 0 || capture.max_phrase_ms == 0 || capture.listen_timeout_ms == 0
            {
                return Err(MurmurError::ConfigError(
                    "Capture durations must be non-zero".to_string(),
                ));
            }
            if capture.target_sample_rate == 0 {
                return Err(MurmurError::ConfigError(
                    "Capture sample rate must be non-zero".to_string(),
                ));
            }
            if let Some(limit) = TimeoutConfig::limit(self.timeouts.capture_ms) {
                if limit <= capture.worst_case() {
                    return Err(MurmurError::ConfigError(format!(
                        "Capture timeout {:?} must exceed calibration + listen + phrase time {:?}",
                        limit,
                        capture.worst_case()
                    )));
                }
            }
        }

        if self.synthesis.backend == SynthesisBackend::Sherpa && self.synthesis.sherpa.speakers == 0 {
            return Err(MurmurError::ConfigError(
                "Sherpa model must have at least one speaker".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("murmur").join("config.toml"))
}

pub fn default_transcript_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("murmur")
        .join("chat_history.txt")
}

/// Accepts `host`, `host:port` or a full URL, as `OLLAMA_HOST` does
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let (scheme, rest) = match host.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", host),
    };
    if rest.contains(':') {
        format!("{}://{}", scheme, rest)
    } else {
        format!("{}://{}:{}", scheme, rest, OLLAMA_DEFAULT_PORT)
    }
}
