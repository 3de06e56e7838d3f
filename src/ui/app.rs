//! Main window and eframe integration

use super::components::{InputBar, MessageList, VoiceControls};
use super::state::UiState;
use super::surface::RepaintSurface;
use crate::integration::{build_providers, MurmurConfig, Orchestrator, OrchestratorConfig};
use crate::session::SessionState;
use crate::Result;
use egui::{CentralPanel, TopBottomPanel};
use std::time::Duration;
use tracing::info;

/// Poll interval while a round-trip is running
const BUSY_REPAINT: Duration = Duration::from_millis(100);

pub struct MurmurApp {
    state: UiState,
    waker_installed: bool,
}

impl MurmurApp {
    /// Build the app from configuration; the transcript repaints `cc`'s context
    pub fn new(cc: &eframe::CreationContext<'_>, config: &MurmurConfig) -> Result<Self> {
        let providers = build_providers(config)?;
        let voices = providers.synthesizer.voices();

        let session = SessionState::new(
            config.voice_settings(),
            Box::new(RepaintSurface::new(cc.egui_ctx.clone())),
        );
        let orchestrator =
            Orchestrator::new(providers, session.link(), OrchestratorConfig::from(config));

        let mut state = UiState::new(session, orchestrator, voices, config.transcript_path());
        state.greet();
        Ok(Self::from_state(state))
    }

    pub fn from_state(state: UiState) -> Self {
        Self {
            state,
            waker_installed: false,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    /// Apply pending session events and draw one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.waker_installed {
            self.state.session.set_waker(ctx.clone());
            self.waker_installed = true;
        }

        let was_busy = self.state.is_busy();
        self.state.session.poll_events();

        TopBottomPanel::top("voice_controls")
            .show(ctx, |ui| VoiceControls::new(&mut self.state).show(ui));

        TopBottomPanel::bottom("input_area")
            .show(ctx, |ui| InputBar::new(&mut self.state).show(ui));

        CentralPanel::default().show(ctx, |ui| MessageList::new(&self.state.session).show(ui));

        // A round-trip that finished after the poll above still has events queued
        if was_busy || self.state.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }
}

impl eframe::App for MurmurApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let stats = self.state.session.round_trip_stats();
        info!(
            "Shutting down after {} round-trips ({} in flight)",
            stats.begun,
            stats.in_flight()
        );
    }
}
