use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RATE_MIN: u32 = 50;
pub const RATE_MAX: u32 = 300;
/// 200 words per minute plus 20%
pub const DEFAULT_RATE: u32 = 240;

/// Speech output settings applied to the next synthesis step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub rate: u32,
    pub voice_id: String,
    pub muted: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            voice_id: String::new(),
            muted: false,
        }
    }
}

impl VoiceSettings {
    pub fn new(rate: i64, voice_id: impl Into<String>, muted: bool) -> Self {
        Self {
            rate: clamp_rate(rate),
            voice_id: voice_id.into(),
            muted,
        }
    }
}

pub fn clamp_rate(value: i64) -> u32 {
    value.clamp(RATE_MIN as i64, RATE_MAX as i64) as u32
}

/// Voice settings shared with round-trip workers
///
/// Only the session writes; workers take a snapshot right before synthesis.
#[derive(Debug, Clone, Default)]
pub struct SharedVoiceSettings {
    inner: Arc<RwLock<VoiceSettings>>,
}

impl SharedVoiceSettings {
    pub fn new(settings: VoiceSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> VoiceSettings {
        self.inner.read().clone()
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut VoiceSettings) -> R) -> R {
        f(&mut self.inner.write())
    }
}
