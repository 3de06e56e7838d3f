//! Session state
//!
//! Owned by the UI thread. Round-trip workers never touch it directly; they
//! hold a [`SessionLink`] and post [`SessionEvent`]s that are applied here.

use super::events::{event_queue, EventSink, SessionEvent, Wake};
use super::round_trip::{
    InputSource, RoundTripGate, RoundTripGuard, RoundTripPhase, RoundTripStats,
};
use super::settings::{clamp_rate, SharedVoiceSettings, VoiceSettings};
use super::surface::TranscriptSurface;
use crate::messages::{persistence, Message, Speaker, Transcript};
use crate::{MurmurError, Result};
use crossbeam_channel::Receiver;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The handle a round-trip worker receives
#[derive(Debug, Clone)]
pub struct SessionLink {
    gate: RoundTripGate,
    settings: SharedVoiceSettings,
    events: EventSink,
}

impl SessionLink {
    pub fn try_begin(
        &self,
        source: InputSource,
        input_text: Option<String>,
    ) -> Result<RoundTripGuard> {
        self.gate.try_begin(source, input_text, self.events.clone())
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        self.settings.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }
}

pub struct SessionState {
    transcript: Transcript,
    settings: SharedVoiceSettings,
    phase: RoundTripPhase,
    gate: RoundTripGate,
    events: EventSink,
    events_rx: Receiver<SessionEvent>,
    surface: Box<dyn TranscriptSurface>,
}

impl SessionState {
    pub fn new(settings: VoiceSettings, surface: Box<dyn TranscriptSurface>) -> Self {
        let (events, events_rx) = event_queue();
        let settings = VoiceSettings {
            rate: clamp_rate(settings.rate as i64),
            ..settings
        };
        Self {
            transcript: Transcript::new(),
            settings: SharedVoiceSettings::new(settings),
            phase: RoundTripPhase::Idle,
            gate: RoundTripGate::new(),
            events,
            events_rx,
            surface,
        }
    }

    pub fn link(&self) -> SessionLink {
        SessionLink {
            gate: self.gate.clone(),
            settings: self.settings.clone(),
            events: self.events.clone(),
        }
    }

    pub fn set_surface(&mut self, surface: Box<dyn TranscriptSurface>) {
        self.surface = surface;
    }

    /// Install the waker called on every posted event, replacing any previous one
    pub fn set_waker(&self, waker: impl Wake + 'static) {
        self.events.set_waker(Arc::new(waker));
    }

    pub fn append_message(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.push(Message::new(speaker, text));
    }

    pub fn append_status(&mut self, text: impl Into<String>) {
        self.append_message(Speaker::System, text);
    }

    fn push(&mut self, message: Message) {
        let kept = message.clone();
        if self.transcript.push(message) {
            self.surface.appended(&kept);
        }
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.surface.cleared();
        info!("Transcript cleared");
        self.append_status("Chat history cleared.");
    }

    /// Store a speech rate, clamped to the supported range
    pub fn set_rate(&mut self, value: i64) -> u32 {
        let rate = clamp_rate(value);
        if rate as i64 != value {
            debug!("Rate {} clamped to {}", value, rate);
        }
        self.settings.update(|s| s.rate = rate);
        rate
    }

    pub fn set_voice(&mut self, voice_id: impl Into<String>) {
        let voice_id = voice_id.into();
        debug!("Voice set to {:?}", voice_id);
        self.settings.update(|s| s.voice_id = voice_id);
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.update(|s| {
            s.muted = !s.muted;
            s.muted
        });
        info!("Speech output {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    pub fn try_begin_round_trip(&self, source: InputSource) -> Result<RoundTripGuard> {
        self.link().try_begin(source, None)
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Apply everything round-trips have posted since the last call
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SessionEvent::Append(message) => self.push(message),
                SessionEvent::Phase(phase) => {
                    debug!("Phase {:?} -> {:?}", self.phase, phase);
                    self.phase = phase;
                }
                SessionEvent::Finished => {
                    self.phase = RoundTripPhase::Idle;
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn save_transcript(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match persistence::save(path, self.transcript.messages()) {
            Ok(()) => {
                self.append_status(format!("Chat history saved to: {}", path.display()));
                Ok(())
            }
            Err(e) => {
                warn!("Saving transcript failed: {}", e);
                self.append_status(format!("Error saving chat history: {}", detail(&e)));
                Err(e)
            }
        }
    }

    /// Replace the transcript with a saved log
    ///
    /// On failure the current transcript is kept and a status line is added.
    pub fn load_transcript(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        match persistence::load(path) {
            Ok(messages) => {
                self.transcript.replace(messages);
                self.surface.cleared();
                for message in self.transcript.messages() {
                    self.surface.appended(message);
                }
                let count = self.transcript.len();
                info!("Loaded {} messages from {:?}", count, path);
                self.append_status(format!("Chat history loaded from: {}", path.display()));
                Ok(count)
            }
            Err(e) => {
                warn!("Loading transcript failed: {}", e);
                self.append_status(format!("Error loading chat history: {}", detail(&e)));
                Err(e)
            }
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        self.settings.snapshot()
    }

    pub fn phase(&self) -> RoundTripPhase {
        self.phase
    }

    pub fn round_trip_stats(&self) -> RoundTripStats {
        self.gate.stats()
    }
}

fn detail(e: &MurmurError) -> String {
    match e {
        MurmurError::PersistenceError(detail) => detail.clone(),
        other => other.to_string(),
    }
}
