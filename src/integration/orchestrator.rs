//! Round-trip orchestration
//!
//! One user action becomes one round-trip:
//! capture -> transcribe -> generate -> synthesize. Results reach the
//! transcript only through the session event queue.

use super::config::{MurmurConfig, TimeoutConfig};
use super::timeout::call_with_timeout;
use crate::audio::AudioSource;
use crate::llm::ChatModel;
use crate::messages::Speaker;
use crate::session::{InputSource, RoundTripGuard, RoundTripPhase, SessionLink};
use crate::speech::{SpeechSynthesizer, Transcriber};
use crate::{MurmurError, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const CAPTURE: &str = "microphone";
const TRANSCRIPTION: &str = "speech recognizer";
const GENERATION: &str = "model";
const SYNTHESIS: &str = "speech synthesizer";

/// The external services a round-trip talks to
#[derive(Clone)]
pub struct Providers {
    pub audio: Arc<dyn AudioSource>,
    pub transcriber: Arc<dyn Transcriber>,
    pub model: Arc<dyn ChatModel>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub apology: String,
    pub capture_timeout: Option<Duration>,
    pub transcription_timeout: Option<Duration>,
    pub generation_timeout: Option<Duration>,
    pub synthesis_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&MurmurConfig::default())
    }
}

impl From<&MurmurConfig> for OrchestratorConfig {
    fn from(config: &MurmurConfig) -> Self {
        Self {
            apology: config.model.apology.clone(),
            capture_timeout: TimeoutConfig::limit(config.timeouts.capture_ms),
            transcription_timeout: TimeoutConfig::limit(config.timeouts.transcription_ms),
            generation_timeout: TimeoutConfig::limit(config.timeouts.generation_ms),
            synthesis_timeout: TimeoutConfig::limit(config.timeouts.synthesis_ms),
        }
    }
}

impl OrchestratorConfig {
    pub fn without_timeouts(mut self) -> Self {
        self.capture_timeout = None;
        self.transcription_timeout = None;
        self.generation_timeout = None;
        self.synthesis_timeout = None;
        self
    }
}

/// How a round-trip ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundTripOutcome {
    /// Nothing to send; the transcript is unchanged
    Empty,
    Replied {
        reply: String,
        /// Whether the reply was handed to the synthesizer and played
        spoken: bool,
    },
    /// Stopped before the model was asked, with the status that was recorded
    Aborted(MurmurError),
}

#[derive(Clone)]
pub struct Orchestrator {
    providers: Providers,
    link: SessionLink,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(providers: Providers, link: SessionLink, config: OrchestratorConfig) -> Self {
        Self {
            providers,
            link,
            config,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.link.is_busy()
    }

    /// Run a typed round-trip on the calling thread
    ///
    /// Returns [`MurmurError::Busy`] without touching the transcript if
    /// another round-trip is in flight.
    pub fn submit_text(&self, text: &str) -> Result<RoundTripOutcome> {
        let text = text.trim();
        let guard = self
            .link
            .try_begin(InputSource::Typed, Some(text.to_string()))?;

        if text.is_empty() {
            debug!("Ignoring empty submission");
            guard.end();
            return Ok(RoundTripOutcome::Empty);
        }

        self.link.events().append(Speaker::User, text);
        let outcome = self.respond(text);
        guard.end();
        Ok(outcome)
    }

    /// Start a voice round-trip on its own worker thread
    ///
    /// The gate is claimed before the thread starts, so a second trigger
    /// while this one runs fails with [`MurmurError::Busy`].
    pub fn trigger_voice(&self) -> Result<JoinHandle<RoundTripOutcome>> {
        let guard = self.link.try_begin(InputSource::Voice, None)?;
        let this = self.clone();
        thread::Builder::new()
            .name("voice-round-trip".to_string())
            .spawn(move || this.run_voice(guard))
            .map_err(|e| MurmurError::ChannelError(format!("Failed to spawn voice worker: {}", e)))
    }

    fn run_voice(&self, guard: RoundTripGuard) -> RoundTripOutcome {
        info!("Voice round-trip {} started", guard.id());
        let outcome = match self.listen() {
            Ok(text) => {
                self.link.events().append(Speaker::User, &text);
                self.respond(&text)
            }
            Err(e) => {
                warn!("Voice input failed: {}", e);
                self.link.events().status(e.user_message());
                RoundTripOutcome::Aborted(e)
            }
        };
        guard.end();
        outcome
    }

    fn listen(&self) -> Result<String> {
        let events = self.link.events();

        events.phase(RoundTripPhase::Listening);
        let audio = Arc::clone(&self.providers.audio);
        let sample = call_with_timeout(CAPTURE, self.config.capture_timeout, move || {
            audio.capture()
        })?;

        events.phase(RoundTripPhase::Transcribing);
        let transcriber = Arc::clone(&self.providers.transcriber);
        let text = call_with_timeout(
            TRANSCRIPTION,
            self.config.transcription_timeout,
            move || transcriber.transcribe(&sample),
        )?;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(MurmurError::Unintelligible);
        }
        Ok(text)
    }

    /// Generate, record and speak a reply; never fails
    fn respond(&self, prompt: &str) -> RoundTripOutcome {
        let events = self.link.events();

        events.phase(RoundTripPhase::Generating);
        let model = Arc::clone(&self.providers.model);
        let owned = prompt.to_string();
        let reply = match call_with_timeout(GENERATION, self.config.generation_timeout, move || {
            model.complete(&owned)
        }) {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                warn!("Model returned an empty reply");
                self.config.apology.clone()
            }
            Err(e) => {
                warn!("Model call failed: {}", e);
                self.config.apology.clone()
            }
        };
        events.append(Speaker::Assistant, &reply);

        // Settings are read here so mute/rate changes made during generation apply
        let settings = self.link.voice_settings();
        if settings.muted {
            debug!("Muted, skipping synthesis");
            return RoundTripOutcome::Replied {
                reply,
                spoken: false,
            };
        }

        events.phase(RoundTripPhase::Synthesizing);
        let synthesizer = Arc::clone(&self.providers.synthesizer);
        let text = reply.clone();
        let spoken = match call_with_timeout(SYNTHESIS, self.config.synthesis_timeout, move || {
            synthesizer.speak(&text, settings.rate, &settings.voice_id)
        }) {
            Ok(()) => true,
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                false
            }
        };

        RoundTripOutcome::Replied { reply, spoken }
    }
}
