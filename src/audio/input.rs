use super::calibration::{NoiseCalibration, PhraseDetector, PhraseStatus};
use super::resampler::resample_mono;
use super::{AudioSample, AudioSource};
use crate::integration::config::CaptureConfig;
use crate::{MurmurError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, error, info};

/// Longest gap between two device callbacks before the device counts as dead
const CALLBACK_STALL: Duration = Duration::from_secs(2);

/// Default microphone, opened fresh for every capture
///
/// The cpal stream is not `Send`, so it lives only for the duration of one
/// `capture` call on whatever thread makes it.
pub struct MicrophoneCapture {
    config: CaptureConfig,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    fn open(&self) -> Result<(Stream, Receiver<Vec<f32>>, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| MurmurError::CaptureError("No input device available".into()))?;

        debug!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported = device.default_input_config().map_err(|e| {
            MurmurError::CaptureError(format!("Failed to get input config: {}", e))
        })?;
        let sample_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();

        let (tx, rx) = unbounded();
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, tx)?,
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, tx)?,
            other => {
                return Err(MurmurError::CaptureError(format!(
                    "Unsupported sample format '{}'",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| MurmurError::CaptureError(format!("Failed to start input stream: {}", e)))?;

        Ok((stream, rx, sample_rate))
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, tx: Sender<Vec<f32>>) -> Result<Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mono: Vec<f32> = data
                    .chunks(channels)
                    .map(|frame| {
                        frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>() / channels as f32
                    })
                    .collect();
                // Receiver goes away as soon as the phrase is complete
                let _ = tx.send(mono);
            },
            |err| error!("Audio input stream error: {}", err),
            None,
        )
        .map_err(|e| MurmurError::CaptureError(format!("Failed to build input stream: {}", e)))
}

fn next_chunk(rx: &Receiver<Vec<f32>>) -> Result<Vec<f32>> {
    rx.recv_timeout(CALLBACK_STALL).map_err(|e| match e {
        RecvTimeoutError::Timeout => {
            MurmurError::CaptureError("Input device stopped delivering audio".into())
        }
        RecvTimeoutError::Disconnected => {
            MurmurError::CaptureError("Input stream closed".into())
        }
    })
}

impl AudioSource for MicrophoneCapture {
    fn capture(&self) -> Result<AudioSample> {
        let (stream, rx, device_rate) = self.open()?;

        let calibration_samples = self.config.calibration_samples(device_rate);
        let mut ambient = Vec::with_capacity(calibration_samples);
        while ambient.len() < calibration_samples {
            ambient.extend(next_chunk(&rx)?);
        }
        let calibration = NoiseCalibration::from_samples(
            &ambient,
            self.config.threshold_ratio,
            self.config.min_threshold,
        );

        let mut detector = PhraseDetector::new(calibration, device_rate, &self.config);
        loop {
            match detector.feed(&next_chunk(&rx)?) {
                PhraseStatus::Waiting | PhraseStatus::Speaking => continue,
                PhraseStatus::Complete => break,
                PhraseStatus::TimedOut => {
                    info!("No speech within {}ms", self.config.listen_timeout_ms);
                    return Err(MurmurError::Unintelligible);
                }
            }
        }
        drop(stream);

        let phrase = detector.into_phrase();
        let samples = resample_mono(&phrase, device_rate, self.config.target_sample_rate)?;
        let sample = AudioSample::new(samples, self.config.target_sample_rate);
        info!("Captured {:.1}s phrase", sample.duration_secs());
        Ok(sample)
    }
}
