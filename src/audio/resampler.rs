use crate::{MurmurError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Mono sinc resampler for captured phrases
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(MurmurError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| MurmurError::CaptureError(format!("Failed to create resampler: {}", e)))?;

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let chunk_size = self.resampler.input_frames_max();
        let mut output = Vec::with_capacity((input.len() as f64 * ratio * 1.1) as usize);

        for chunk in input.chunks(chunk_size) {
            // SincFixedIn wants exactly chunk_size frames; the last chunk is zero-padded
            let mut padded = vec![0.0f32; chunk_size];
            padded[..chunk.len()].copy_from_slice(chunk);

            let wave_in = [padded];
            let processed = self
                .resampler
                .process(&wave_in[..], None)
                .map_err(|e| MurmurError::CaptureError(format!("Resampling failed: {}", e)))?;

            let produced = &processed[0];
            let keep = if chunk.len() < chunk_size {
                ((chunk.len() as f64) * ratio).ceil() as usize
            } else {
                produced.len()
            };
            output.extend_from_slice(&produced[..keep.min(produced.len())]);
        }

        debug!(
            "Resampled {} Hz -> {} Hz: {} -> {} samples",
            self.input_rate,
            self.output_rate,
            input.len(),
            output.len()
        );
        Ok(output)
    }
}

/// Resample in one step; equal rates return the input unchanged
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }
    AudioResampler::new(input_rate, output_rate)?.resample(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_mono(&input, 16000, 16000).unwrap(), input);
    }

    #[test]
    fn test_downsample_length() {
        let input: Vec<f32> = (0..48000).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resample_mono(&input, 48000, 16000).unwrap();

        // One second in, roughly one second out
        let expected = 16000.0;
        let diff = (output.len() as f32 - expected).abs();
        assert!(diff < expected * 0.05, "got {} samples", output.len());
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(AudioResampler::new(0, 16000).is_err());
    }
}
