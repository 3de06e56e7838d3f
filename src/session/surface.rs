use crate::messages::Message;

/// Display that mirrors the transcript
///
/// Only ever called by `SessionState`, on the thread that owns it.
pub trait TranscriptSurface {
    fn appended(&mut self, message: &Message);

    fn cleared(&mut self);
}

/// Surface for headless sessions
#[derive(Debug, Default)]
pub struct NullSurface;

impl TranscriptSurface for NullSurface {
    fn appended(&mut self, _message: &Message) {}

    fn cleared(&mut self) {}
}
