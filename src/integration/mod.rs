//! Wiring between the session and the external providers

pub mod config;
pub mod orchestrator;
pub mod timeout;

pub use config::MurmurConfig;
pub use orchestrator::{Orchestrator, OrchestratorConfig, Providers, RoundTripOutcome};
pub use timeout::call_with_timeout;

use crate::audio::{AudioSource, DisabledAudio};
use crate::llm::OllamaClient;
use crate::speech::{HttpTranscriber, SpeechSynthesizer, Transcriber};
use crate::Result;
use config::{SynthesisBackend, TimeoutConfig, TranscriptionBackend};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured providers
///
/// Backends behind a disabled cargo feature fall back to a disabled stand-in
/// with a warning.
pub fn build_providers(config: &MurmurConfig) -> Result<Providers> {
    let timeouts = &config.timeouts;

    let model = Arc::new(OllamaClient::new(
        &config.model,
        TimeoutConfig::limit(timeouts.generation_ms),
    )?);

    let transcriber: Arc<dyn Transcriber> = match config.transcription.backend {
        TranscriptionBackend::Http => Arc::new(HttpTranscriber::new(
            &config.transcription,
            TimeoutConfig::limit(timeouts.transcription_ms),
        )?),
        #[cfg(feature = "whisper")]
        TranscriptionBackend::Whisper => Arc::new(crate::speech::WhisperTranscriber::new(
            &config.transcription,
        )?),
        #[cfg(not(feature = "whisper"))]
        TranscriptionBackend::Whisper => {
            warn!("Built without the `whisper` feature, using the HTTP transcriber");
            Arc::new(HttpTranscriber::new(
                &config.transcription,
                TimeoutConfig::limit(timeouts.transcription_ms),
            )?)
        }
    };

    let audio: Arc<dyn AudioSource> = if !config.capture.enabled {
        info!("Audio capture disabled");
        Arc::new(DisabledAudio)
    } else {
        microphone(config)
    };

    let synthesizer = synthesizer(config)?;

    Ok(Providers {
        audio,
        transcriber,
        model,
        synthesizer,
    })
}

#[cfg(feature = "audio-io")]
fn microphone(config: &MurmurConfig) -> Arc<dyn AudioSource> {
    Arc::new(crate::audio::MicrophoneCapture::new(config.capture.clone()))
}

#[cfg(not(feature = "audio-io"))]
fn microphone(_config: &MurmurConfig) -> Arc<dyn AudioSource> {
    warn!("Built without the `audio-io` feature, voice input is unavailable");
    Arc::new(DisabledAudio)
}

fn synthesizer(config: &MurmurConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    let synthesis = &config.synthesis;
    match synthesis.backend {
        SynthesisBackend::Disabled => Ok(Arc::new(DisabledAudio)),
        #[cfg(feature = "audio-io")]
        SynthesisBackend::Http => Ok(Arc::new(crate::speech::HttpSynthesizer::new(
            synthesis,
            TimeoutConfig::limit(config.timeouts.synthesis_ms),
        )?)),
        #[cfg(feature = "sherpa")]
        SynthesisBackend::Sherpa => Ok(Arc::new(crate::speech::SherpaSynthesizer::new(
            &synthesis.sherpa,
        )?)),
        #[allow(unreachable_patterns)]
        other => {
            warn!("{:?} speech output not compiled in, replies will not be spoken", other);
            Ok(Arc::new(DisabledAudio))
        }
    }
}

/// Check the model server is reachable and has the configured model
///
/// Only ever logs; the assistant starts either way.
pub fn probe_model(config: &MurmurConfig) {
    let client = match OllamaClient::new(&config.model, None) {
        Ok(client) => client,
        Err(e) => {
            warn!("Cannot build model client: {}", e);
            return;
        }
    };
    match client.list_models() {
        Ok(models) if client.has_model(&models) => {
            info!("Model {} available at {}", client.model(), config.model.host)
        }
        Ok(models) => warn!(
            "Model {} not pulled on {} (available: {})",
            client.model(),
            config.model.host,
            models.join(", ")
        ),
        Err(e) => warn!("Model server {} unreachable: {}", config.model.host, e),
    }
}
