#[cfg(feature = "sherpa")]
pub mod sherpa;
pub mod stt;
pub mod tts;
#[cfg(feature = "whisper")]
pub mod whisper;

#[cfg(feature = "sherpa")]
pub use sherpa::SherpaSynthesizer;
pub use stt::{HttpTranscriber, Transcriber};
#[cfg(feature = "audio-io")]
pub use tts::HttpSynthesizer;
pub use tts::{SpeechSynthesizer, VoiceInfo};
#[cfg(feature = "whisper")]
pub use whisper::WhisperTranscriber;
