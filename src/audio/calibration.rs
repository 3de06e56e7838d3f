//! Energy-based speech endpointing
//!
//! The ambient noise level is measured first; anything louder than
//! `threshold_ratio` times that level counts as speech.

use crate::integration::config::CaptureConfig;
use tracing::debug;

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseCalibration {
    pub noise_rms: f32,
    pub threshold: f32,
}

impl NoiseCalibration {
    pub fn from_samples(ambient: &[f32], threshold_ratio: f32, min_threshold: f32) -> Self {
        let noise_rms = rms(ambient);
        let threshold = (noise_rms * threshold_ratio).max(min_threshold);
        debug!(
            "Ambient noise rms {:.4}, speech threshold {:.4}",
            noise_rms, threshold
        );
        Self {
            noise_rms,
            threshold,
        }
    }

    pub fn is_speech(&self, chunk: &[f32]) -> bool {
        rms(chunk) >= self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseStatus {
    /// No speech yet
    Waiting,
    Speaking,
    /// Trailing pause seen, or the phrase hit its maximum length
    Complete,
    /// Nobody spoke before the listen timeout
    TimedOut,
}

pub struct PhraseDetector {
    calibration: NoiseCalibration,
    pause_samples: usize,
    max_phrase_samples: usize,
    wait_samples: usize,
    waited: usize,
    silence_run: usize,
    phrase: Vec<f32>,
    started: bool,
}

impl PhraseDetector {
    pub fn new(calibration: NoiseCalibration, sample_rate: u32, config: &CaptureConfig) -> Self {
        let to_samples = |ms: u64| (ms as u128 * sample_rate as u128 / 1000) as usize;
        Self {
            calibration,
            pause_samples: to_samples(config.pause_ms),
            max_phrase_samples: to_samples(config.max_phrase_ms),
            wait_samples: to_samples(config.listen_timeout_ms),
            waited: 0,
            silence_run: 0,
            phrase: Vec::new(),
            started: false,
        }
    }

    pub fn feed(&mut self, chunk: &[f32]) -> PhraseStatus {
        let speech = self.calibration.is_speech(chunk);

        if !self.started {
            if !speech {
                self.waited += chunk.len();
                return if self.waited >= self.wait_samples {
                    PhraseStatus::TimedOut
                } else {
                    PhraseStatus::Waiting
                };
            }
            self.started = true;
            debug!("Speech started after {} samples", self.waited);
        }

        self.phrase.extend_from_slice(chunk);
        if speech {
            self.silence_run = 0;
        } else {
            self.silence_run += chunk.len();
        }

        if self.silence_run >= self.pause_samples || self.phrase.len() >= self.max_phrase_samples {
            PhraseStatus::Complete
        } else {
            PhraseStatus::Speaking
        }
    }

    pub fn into_phrase(self) -> Vec<f32> {
        self.phrase
    }
}
