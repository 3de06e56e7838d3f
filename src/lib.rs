pub mod audio;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod session;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MurmurError {
    #[error("A round-trip is already in progress")]
    Busy,

    #[error("Could not understand audio")]
    Unintelligible,

    #[error("Speech recognition unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("Audio capture error: {0}")]
    CaptureError(String),

    #[error("{provider} did not respond within {timeout_ms}ms")]
    ProviderTimeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for MurmurError {
    fn from(e: std::io::Error) -> Self {
        MurmurError::PersistenceError(e.to_string())
    }
}

impl MurmurError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The next user action will be accepted once the current turn ends
            MurmurError::Busy => true,
            MurmurError::Unintelligible => true,
            // Network hiccups and overloaded services usually clear up
            MurmurError::TranscriptionUnavailable(_) => true,
            MurmurError::ProviderTimeout { .. } => true,
            MurmurError::ModelError(_) => true,
            MurmurError::SynthesisError(_) => true,
            MurmurError::PersistenceError(_) => true,
            // Hardware errors may require user intervention
            MurmurError::CaptureError(_) => false,
            MurmurError::ConfigError(_) => false,
            MurmurError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            MurmurError::Busy => "Still working on the previous request.".to_string(),
            MurmurError::Unintelligible => "Could not understand audio".to_string(),
            MurmurError::TranscriptionUnavailable(detail) => {
                format!("Speech recognition error: {}", detail)
            }
            MurmurError::CaptureError(detail) => format!("Microphone error: {}", detail),
            MurmurError::ProviderTimeout {
                provider,
                timeout_ms,
            } => format!(
                "The {} timed out after {:.1}s.",
                provider,
                *timeout_ms as f64 / 1000.0
            ),
            MurmurError::ModelError(_) => {
                "AI response generation failed. Please try again.".to_string()
            }
            MurmurError::SynthesisError(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            MurmurError::PersistenceError(detail) => format!("File error: {}", detail),
            MurmurError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            MurmurError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MurmurError>;
