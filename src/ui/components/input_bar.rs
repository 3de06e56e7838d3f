//! Input bar component
//!
//! Text entry with send and voice buttons.

use crate::ui::state::UiState;
use egui::{self, Key};

pub struct InputBar<'a> {
    state: &'a mut UiState,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut UiState) -> Self {
        Self { state }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let busy = self.state.is_busy();

        ui.horizontal(|ui| {
            let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
                .hint_text("Type a message...")
                .desired_width((ui.available_width() - 140.0).max(100.0))
                .id(egui::Id::new("message_input"));
            let response = ui.add(text_edit);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
            });

            let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let can_send = !busy && !self.state.input_text.trim().is_empty();
            let send = ui.add_enabled(can_send, egui::Button::new("Send"));
            send.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
            });

            let voice = ui.add_enabled(!busy, egui::Button::new("Speak"));
            voice.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, !busy, "Voice input")
            });

            if send.clicked() || (enter_pressed && can_send) {
                self.state.send_message();
                response.request_focus();
            }
            if voice.clicked() {
                self.state.trigger_voice();
            }
        });
    }
}
