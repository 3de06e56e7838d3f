//! UI-side state
//!
//! Wraps the session with the bits only the window cares about: the input
//! field, the transcript path field and the voice list.

use crate::integration::{Orchestrator, RoundTripOutcome};
use crate::session::SessionState;
use crate::speech::VoiceInfo;
use crate::MurmurError;
use std::path::PathBuf;
use tracing::{debug, error, warn};

pub struct UiState {
    pub session: SessionState,
    pub orchestrator: Orchestrator,
    pub voices: Vec<VoiceInfo>,
    /// Current text input
    pub input_text: String,
    pub transcript_path: String,
}

impl UiState {
    pub fn new(
        session: SessionState,
        orchestrator: Orchestrator,
        voices: Vec<VoiceInfo>,
        transcript_path: PathBuf,
    ) -> Self {
        Self {
            session,
            orchestrator,
            voices,
            input_text: String::new(),
            transcript_path: transcript_path.display().to_string(),
        }
    }

    pub fn greet(&mut self) {
        self.session.append_status("Voice Chatbot Started!");
        self.session.append_status("How can I help you today?");
    }

    /// Submit the input field as a typed round-trip
    ///
    /// Runs on the UI thread. The field is cleared unless the action was
    /// dropped because another round-trip is in flight.
    pub fn send_message(&mut self) {
        let text = self.input_text.clone();
        match self.orchestrator.submit_text(&text) {
            Ok(RoundTripOutcome::Empty) => self.input_text.clear(),
            Ok(outcome) => {
                debug!("Typed round-trip finished: {:?}", outcome);
                self.input_text.clear();
            }
            Err(MurmurError::Busy) => debug!("Busy, typed input kept"),
            Err(e) => error!("Typed round-trip failed: {}", e),
        }
        self.session.poll_events();
    }

    /// Start a voice round-trip in the background
    pub fn trigger_voice(&mut self) {
        match self.orchestrator.trigger_voice() {
            // Fire-and-forget; the worker reports through session events
            Ok(_handle) => {}
            Err(MurmurError::Busy) => debug!("Busy, voice trigger dropped"),
            Err(e) => {
                warn!("Could not start voice input: {}", e);
                self.session.append_status(e.user_message());
            }
        }
    }

    pub fn clear(&mut self) {
        if self.is_busy() {
            debug!("Busy, clear ignored");
            return;
        }
        self.session.clear_transcript();
    }

    pub fn save(&mut self) {
        let path = PathBuf::from(self.transcript_path.trim());
        // Failure is already reported in the transcript
        let _ = self.session.save_transcript(path);
    }

    pub fn load(&mut self) {
        if self.is_busy() {
            debug!("Busy, load ignored");
            return;
        }
        let path = PathBuf::from(self.transcript_path.trim());
        let _ = self.session.load_transcript(path);
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }
}
