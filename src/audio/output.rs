//! Blocking playback on the default output device

use crate::{MurmurError, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use tracing::debug;

fn open_sink() -> Result<(OutputStream, Sink)> {
    let (stream, handle) = OutputStream::try_default()
        .map_err(|e| MurmurError::SynthesisError(format!("No output device: {}", e)))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| MurmurError::SynthesisError(format!("Failed to create sink: {}", e)))?;
    Ok((stream, sink))
}

/// Play mono samples and wait until they finish
pub fn play_samples(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }
    let (_stream, sink) = open_sink()?;
    debug!("Playing {} samples at {} Hz", samples.len(), sample_rate);
    sink.append(SamplesBuffer::new(1, sample_rate, samples));
    sink.sleep_until_end();
    Ok(())
}

/// Play an encoded clip (WAV, MP3, ...) and wait until it finishes
pub fn play_encoded(bytes: Vec<u8>) -> Result<()> {
    let (_stream, sink) = open_sink()?;
    let source = Decoder::new(Cursor::new(bytes))
        .map_err(|e| MurmurError::SynthesisError(format!("Failed to decode audio: {}", e)))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
