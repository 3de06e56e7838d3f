pub mod calibration;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod resampler;
pub mod wav;

pub use calibration::{NoiseCalibration, PhraseDetector, PhraseStatus};
#[cfg(feature = "audio-io")]
pub use input::MicrophoneCapture;
pub use resampler::{resample_mono, AudioResampler};
pub use wav::encode_wav;

use crate::{MurmurError, Result};

/// One captured phrase, mono
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSample {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Records one spoken phrase
///
/// Blocks until the phrase ends. Returns [`MurmurError::Unintelligible`] when
/// nobody speaks before the listen timeout.
pub trait AudioSource: Send + Sync {
    fn capture(&self) -> Result<AudioSample>;
}

/// Stand-in when no audio device is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAudio;

impl AudioSource for DisabledAudio {
    fn capture(&self) -> Result<AudioSample> {
        Err(MurmurError::CaptureError("audio input is disabled".to_string()))
    }
}
