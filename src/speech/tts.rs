//! Text-to-speech
//!
//! `speak` blocks until the audio has finished playing, so the round-trip
//! gate stays closed while the assistant is talking.

use crate::audio::DisabledAudio;
use crate::{MurmurError, Result};
use serde::Serialize;
use tracing::debug;

#[cfg(feature = "audio-io")]
use crate::integration::config::SynthesisConfig;
#[cfg(feature = "audio-io")]
use reqwest::blocking::Client;
#[cfg(feature = "audio-io")]
use std::time::Duration;
#[cfg(feature = "audio-io")]
use tracing::warn;

/// Rate that maps to normal speaking speed
pub const BASE_RATE: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
}

impl VoiceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` and return once playback has finished
    ///
    /// `rate` is in words per minute. An empty `voice_id` selects the
    /// engine's default voice; an unknown one is a [`MurmurError::SynthesisError`].
    fn speak(&self, text: &str, rate: u32, voice_id: &str) -> Result<()>;

    fn voices(&self) -> Vec<VoiceInfo>;
}

/// Speed multiplier for a words-per-minute rate
pub fn speed_for_rate(rate: u32) -> f32 {
    (rate as f32 / BASE_RATE as f32).clamp(0.25, 4.0)
}

/// Resolve a voice id against a voice list; empty means the first voice
pub fn resolve_voice<'a>(voices: &'a [VoiceInfo], voice_id: &str) -> Result<&'a VoiceInfo> {
    if voice_id.is_empty() {
        return voices
            .first()
            .ok_or_else(|| MurmurError::SynthesisError("No voices available".to_string()));
    }
    voices
        .iter()
        .find(|v| v.id == voice_id)
        .ok_or_else(|| MurmurError::SynthesisError(format!("Unknown voice: {}", voice_id)))
}

impl SpeechSynthesizer for DisabledAudio {
    fn speak(&self, text: &str, _rate: u32, _voice_id: &str) -> Result<()> {
        debug!("Speech output disabled, not speaking {} chars", text.len());
        Ok(())
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'static str,
}

/// OpenAI-compatible `/audio/speech` synthesis, played back with rodio
#[cfg(feature = "audio-io")]
pub struct HttpSynthesizer {
    url: String,
    model: String,
    api_key: Option<String>,
    voices: Vec<VoiceInfo>,
    client: Client,
}

#[cfg(feature = "audio-io")]
impl HttpSynthesizer {
    pub fn new(config: &SynthesisConfig, timeout: Option<Duration>) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set, sending speech requests without a key",
                config.api_key_env
            );
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MurmurError::ConfigError(format!("HTTP client: {}", e)))?;

        let voices = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
            .iter()
            .map(|id| {
                let mut name = id.to_string();
                name[..1].make_ascii_uppercase();
                VoiceInfo::new(*id, name)
            })
            .collect();

        Ok(Self {
            url: format!("{}/audio/speech", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            voices,
            client,
        })
    }

    fn fetch(&self, text: &str, rate: u32, voice: &str) -> Result<Vec<u8>> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            speed: speed_for_rate(rate),
            response_format: "wav",
        };
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request
            .send()
            .map_err(|e| MurmurError::SynthesisError(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(MurmurError::SynthesisError(format!(
                "{}: {}",
                status,
                body.trim()
            )));
        }
        let bytes = res
            .bytes()
            .map_err(|e| MurmurError::SynthesisError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(feature = "audio-io")]
impl SpeechSynthesizer for HttpSynthesizer {
    fn speak(&self, text: &str, rate: u32, voice_id: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let voice = resolve_voice(&self.voices, voice_id)?;
        let audio = self.fetch(text, rate, &voice.id)?;
        debug!("Received {} bytes of speech for voice {}", audio.len(), voice.id);
        crate::audio::output::play_encoded(audio)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }
}
