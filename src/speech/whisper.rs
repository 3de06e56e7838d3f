use super::stt::{recognized_text, Transcriber};
use crate::audio::{resample_mono, AudioSample};
use crate::integration::config::TranscriptionConfig;
use crate::{MurmurError, Result};
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Local whisper.cpp transcription
pub struct WhisperTranscriber {
    context: WhisperContext,
    language: Option<String>,
    n_threads: i32,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let path = &config.whisper_model_path;
        if !path.exists() {
            return Err(MurmurError::ConfigError(format!(
                "Whisper model not found: {:?}",
                path
            )));
        }

        let context = WhisperContext::new_with_params(
            path.to_str()
                .ok_or_else(|| MurmurError::ConfigError("Invalid model path".to_string()))?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| MurmurError::ConfigError(format!("Failed to load Whisper model: {:?}", e)))?;

        info!("Whisper model loaded from {:?}", path);

        let n_threads = std::thread::available_parallelism()
            .map(|n| n.get().min(8) as i32)
            .unwrap_or(4);

        Ok(Self {
            context,
            language: config.language.clone(),
            n_threads,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &AudioSample) -> Result<String> {
        if audio.is_empty() {
            return Err(MurmurError::Unintelligible);
        }
        let samples = resample_mono(&audio.samples, audio.sample_rate, WHISPER_SAMPLE_RATE)
            .map_err(|e| MurmurError::TranscriptionUnavailable(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);
        params.set_translate(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        if let Some(ref lang) = self.language {
            params.set_language(Some(lang));
        }

        let mut state = self.context.create_state().map_err(|e| {
            MurmurError::TranscriptionUnavailable(format!("Failed to create state: {:?}", e))
        })?;
        state.full(params, &samples).map_err(|e| {
            MurmurError::TranscriptionUnavailable(format!("Transcription failed: {:?}", e))
        })?;

        let segments = state.full_n_segments().map_err(|e| {
            MurmurError::TranscriptionUnavailable(format!("Failed to get segments: {:?}", e))
        })?;
        let mut text = String::new();
        for i in 0..segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                MurmurError::TranscriptionUnavailable(format!("Failed to read segment: {:?}", e))
            })?;
            text.push_str(&segment);
        }

        debug!("Whisper produced {} segments", segments);
        recognized_text(&text)
    }
}
