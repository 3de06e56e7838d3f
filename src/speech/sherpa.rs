use super::tts::{resolve_voice, speed_for_rate, SpeechSynthesizer, VoiceInfo};
use crate::audio::output::play_samples;
use crate::integration::config::SherpaConfig;
use crate::{MurmurError, Result};
use parking_lot::Mutex;
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use tracing::{debug, info};

/// Local VITS synthesis through sherpa-onnx
///
/// Voice ids are speaker ids of a multi-speaker model.
pub struct SherpaSynthesizer {
    tts: Mutex<VitsTts>,
    voices: Vec<VoiceInfo>,
}

impl SherpaSynthesizer {
    pub fn new(config: &SherpaConfig) -> Result<Self> {
        for (what, path) in [("model", &config.model), ("tokens", &config.tokens)] {
            if path.is_empty() || !Path::new(path).exists() {
                return Err(MurmurError::ConfigError(format!(
                    "TTS {} not found: {}",
                    what, path
                )));
            }
        }

        info!("Loading VITS model from {}", config.model);
        let tts = VitsTts::new(VitsTtsConfig {
            model: config.model.clone(),
            tokens: config.tokens.clone(),
            lexicon: config.lexicon.clone(),
            data_dir: config.data_dir.clone(),
            dict_dir: config.dict_dir.clone(),
            length_scale: 1.0,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            ..Default::default()
        });

        let voices = (0..config.speakers.max(1))
            .map(|sid| VoiceInfo::new(sid.to_string(), format!("Speaker {}", sid)))
            .collect();

        Ok(Self {
            tts: Mutex::new(tts),
            voices,
        })
    }
}

impl SpeechSynthesizer for SherpaSynthesizer {
    fn speak(&self, text: &str, rate: u32, voice_id: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let voice = resolve_voice(&self.voices, voice_id)?;
        let sid: i32 = voice
            .id
            .parse()
            .map_err(|_| MurmurError::SynthesisError(format!("Bad speaker id: {}", voice.id)))?;

        let audio = self
            .tts
            .lock()
            .create(text, sid, speed_for_rate(rate))
            .map_err(|e| MurmurError::SynthesisError(format!("Synthesis failed: {}", e)))?;

        debug!(
            "Synthesized {} samples at {} Hz",
            audio.samples.len(),
            audio.sample_rate
        );
        play_samples(audio.samples, audio.sample_rate as u32)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }
}
