use crate::session::settings::{RATE_MAX, RATE_MIN};
use crate::ui::state::UiState;

/// Rate, voice, mute and transcript file controls
pub struct VoiceControls<'a> {
    state: &'a mut UiState,
}

impl<'a> VoiceControls<'a> {
    pub fn new(state: &'a mut UiState) -> Self {
        Self { state }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let settings = self.state.session.voice_settings();
        // Replacing the transcript under an in-flight round-trip would splice its reply in
        let idle = !self.state.is_busy();

        ui.horizontal(|ui| {
            let mut rate = settings.rate as i64;
            let slider = ui.add(
                egui::Slider::new(&mut rate, RATE_MIN as i64..=RATE_MAX as i64).text("Rate"),
            );
            if slider.changed() {
                self.state.session.set_rate(rate);
            }

            let selected = self
                .state
                .voices
                .iter()
                .find(|v| v.id == settings.voice_id)
                .map(|v| v.name.clone())
                .unwrap_or_else(|| "Default".to_string());
            let mut chosen = None;
            egui::ComboBox::from_label("Voice")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for voice in &self.state.voices {
                        if ui
                            .selectable_label(voice.id == settings.voice_id, &voice.name)
                            .clicked()
                        {
                            chosen = Some(voice.id.clone());
                        }
                    }
                });
            if let Some(id) = chosen {
                self.state.session.set_voice(id);
            }

            let (text, label) = if settings.muted {
                ("Unmute", "Unmute speech")
            } else {
                ("Mute", "Mute speech")
            };
            let mute = ui.button(text);
            mute.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, label));
            if mute.clicked() {
                self.state.session.toggle_mute();
            }

            let clear = ui.add_enabled(idle, egui::Button::new("Clear"));
            clear.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, idle, "Clear chat")
            });
            if clear.clicked() {
                self.state.clear();
            }
        });

        ui.horizontal(|ui| {
            let path = ui.add(
                egui::TextEdit::singleline(&mut self.state.transcript_path)
                    .desired_width((ui.available_width() - 120.0).max(100.0))
                    .id(egui::Id::new("transcript_path")),
            );
            path.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Transcript path")
            });

            let save = ui.button("Save");
            save.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Save chat")
            });
            if save.clicked() {
                self.state.save();
            }

            let load = ui.add_enabled(idle, egui::Button::new("Load"));
            load.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, idle, "Load chat")
            });
            if load.clicked() {
                self.state.load();
            }
        });
    }
}
