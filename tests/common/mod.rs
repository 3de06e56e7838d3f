//! Scriptable fake providers shared by the integration tests

#![allow(dead_code)]

use murmur::audio::{AudioSample, AudioSource};
use murmur::integration::{Orchestrator, OrchestratorConfig, Providers};
use murmur::llm::ChatModel;
use murmur::messages::Speaker;
use murmur::session::{NullSurface, SessionState, VoiceSettings};
use murmur::speech::{SpeechSynthesizer, Transcriber, VoiceInfo};
use murmur::{MurmurError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a fake provider does on its next call
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(MurmurError),
    Panic,
    Sleep(Duration, String),
}

impl Behavior {
    pub fn reply(text: &str) -> Self {
        Behavior::Reply(text.to_string())
    }

    fn run(&self) -> Result<String> {
        match self {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Panic => panic!("injected provider panic"),
            Behavior::Sleep(duration, text) => {
                std::thread::sleep(*duration);
                Ok(text.clone())
            }
        }
    }
}

pub struct FakeAudio {
    pub behavior: Mutex<Behavior>,
    pub calls: AtomicUsize,
}

impl AudioSource for FakeAudio {
    fn capture(&self) -> Result<AudioSample> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        behavior
            .run()
            .map(|_| AudioSample::new(vec![0.1; 1600], 16_000))
    }
}

pub struct FakeTranscriber {
    pub behavior: Mutex<Behavior>,
    pub calls: AtomicUsize,
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&self, _audio: &AudioSample) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        behavior.run()
    }
}

pub struct FakeModel {
    pub behavior: Mutex<Behavior>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

impl ChatModel for FakeModel {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let behavior = self.behavior.lock().clone();
        behavior.run()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub rate: u32,
    pub voice_id: String,
}

pub struct FakeSynthesizer {
    pub behavior: Mutex<Behavior>,
    pub spoken: Mutex<Vec<Utterance>>,
}

impl FakeSynthesizer {
    pub fn calls(&self) -> usize {
        self.spoken.lock().len()
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn speak(&self, text: &str, rate: u32, voice_id: &str) -> Result<()> {
        self.spoken.lock().push(Utterance {
            text: text.to_string(),
            rate,
            voice_id: voice_id.to_string(),
        });
        let behavior = self.behavior.lock().clone();
        behavior.run().map(|_| ())
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo::new("alloy", "Alloy"),
            VoiceInfo::new("nova", "Nova"),
        ]
    }
}

/// A session wired to fake providers
pub struct Rig {
    pub session: SessionState,
    pub orchestrator: Orchestrator,
    pub audio: Arc<FakeAudio>,
    pub transcriber: Arc<FakeTranscriber>,
    pub model: Arc<FakeModel>,
    pub synthesizer: Arc<FakeSynthesizer>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        let audio = Arc::new(FakeAudio {
            behavior: Mutex::new(Behavior::reply("")),
            calls: AtomicUsize::new(0),
        });
        let transcriber = Arc::new(FakeTranscriber {
            behavior: Mutex::new(Behavior::reply("hello from voice")),
            calls: AtomicUsize::new(0),
        });
        let model = Arc::new(FakeModel {
            behavior: Mutex::new(Behavior::reply("hi there")),
            prompts: Mutex::new(Vec::new()),
        });
        let synthesizer = Arc::new(FakeSynthesizer {
            behavior: Mutex::new(Behavior::reply("")),
            spoken: Mutex::new(Vec::new()),
        });

        let providers = Providers {
            audio: audio.clone(),
            transcriber: transcriber.clone(),
            model: model.clone(),
            synthesizer: synthesizer.clone(),
        };

        let session = SessionState::new(VoiceSettings::default(), Box::new(NullSurface));
        let orchestrator = Orchestrator::new(providers, session.link(), config);

        Self {
            session,
            orchestrator,
            audio,
            transcriber,
            model,
            synthesizer,
        }
    }

    pub fn set_audio(&self, behavior: Behavior) {
        *self.audio.behavior.lock() = behavior;
    }

    pub fn set_transcriber(&self, behavior: Behavior) {
        *self.transcriber.behavior.lock() = behavior;
    }

    pub fn set_model(&self, behavior: Behavior) {
        *self.model.behavior.lock() = behavior;
    }

    pub fn set_synthesizer(&self, behavior: Behavior) {
        *self.synthesizer.behavior.lock() = behavior;
    }

    /// Speaker/text pairs after applying pending events
    pub fn turns(&mut self) -> Vec<(Speaker, String)> {
        self.session.poll_events();
        self.session.transcript().turns()
    }

    /// Poll until the gate is free or `limit` passes
    pub fn wait_idle(&mut self, limit: Duration) -> bool {
        let started = Instant::now();
        while started.elapsed() < limit {
            self.session.poll_events();
            if !self.session.is_busy() {
                self.session.poll_events();
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }
}

/// Provider fakes kept after the session moves into a window
pub struct FakeHandles {
    pub audio: Arc<FakeAudio>,
    pub transcriber: Arc<FakeTranscriber>,
    pub model: Arc<FakeModel>,
    pub synthesizer: Arc<FakeSynthesizer>,
}

pub fn turn(speaker: Speaker, text: &str) -> (Speaker, String) {
    (speaker, text.to_string())
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("murmur-{}-{}.txt", name, uuid::Uuid::new_v4()))
}
