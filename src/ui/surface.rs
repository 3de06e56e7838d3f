use crate::messages::Message;
use crate::session::{TranscriptSurface, Wake};

/// Repaints the window whenever the transcript changes
pub struct RepaintSurface {
    ctx: egui::Context,
}

impl RepaintSurface {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl TranscriptSurface for RepaintSurface {
    fn appended(&mut self, _message: &Message) {
        self.ctx.request_repaint();
    }

    fn cleared(&mut self) {
        self.ctx.request_repaint();
    }
}

/// Round-trip workers wake the window through the context; repaint requests
/// are safe from any thread
impl Wake for egui::Context {
    fn wake(&self) {
        self.request_repaint();
    }
}
