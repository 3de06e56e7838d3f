//! Speech-to-text
//!
//! The default backend posts the phrase as a WAV upload to an
//! OpenAI-compatible `/audio/transcriptions` endpoint.

use crate::audio::{encode_wav, AudioSample};
use crate::integration::config::TranscriptionConfig;
use crate::{MurmurError, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub trait Transcriber: Send + Sync {
    /// Turn a captured phrase into text
    ///
    /// Fails with [`MurmurError::Unintelligible`] when nothing usable was
    /// heard and [`MurmurError::TranscriptionUnavailable`] when the service
    /// itself failed.
    fn transcribe(&self, audio: &AudioSample) -> Result<String>;
}

/// Normalize recognizer output; blank or bracket-only text is unintelligible
///
/// Recognizers mark non-speech with tags like `[BLANK_AUDIO]` or `(music)`.
pub fn recognized_text(raw: &str) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => text.push(c),
            _ => {}
        }
    }
    if text.trim().is_empty() {
        return Err(MurmurError::Unintelligible);
    }
    Ok(raw.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct HttpTranscriber {
    url: String,
    model: String,
    language: Option<String>,
    api_key: Option<String>,
    client: Client,
}

impl HttpTranscriber {
    pub fn new(config: &TranscriptionConfig, timeout: Option<Duration>) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set, sending transcription requests without a key",
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

        Ok(Self {
            url: format!(
                "{}/audio/transcriptions",
                config.endpoint.trim_end_matches('/')
            ),
            model: config.model.clone(),
            language: config.language.clone(),
            api_key,
            client,
        })
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, audio: &AudioSample) -> Result<String> {
        if audio.is_empty() {
            return Err(MurmurError::Unintelligible);
        }

        let wav = encode_wav(&audio.samples, audio.sample_rate)
            .map_err(|e| MurmurError::TranscriptionUnavailable(format!("WAV encoding: {}", e)))?;
        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| MurmurError::TranscriptionUnavailable(e.to_string()))?;
        let mut form = Form::new().part("file", part).text("model", self.model.clone());
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request
            .send()
            .map_err(|e| MurmurError::TranscriptionUnavailable(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(MurmurError::TranscriptionUnavailable(format!(
                "{}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: TranscriptionResponse = res
            .json()
            .map_err(|e| MurmurError::TranscriptionUnavailable(e.to_string()))?;
        debug!("Transcribed {:.1}s of audio", audio.duration_secs());
        recognized_text(&parsed.text)
    }
}
