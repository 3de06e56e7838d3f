//! Transcript view

use crate::messages::{Message, Speaker};
use crate::session::SessionState;
use egui::{self, RichText};

pub struct MessageList<'a> {
    session: &'a SessionState,
}

impl<'a> MessageList<'a> {
    pub fn new(session: &'a SessionState) -> Self {
        Self { session }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in self.session.transcript().iter() {
                    show_message(ui, message);
                    ui.add_space(4.0);
                }

                if let Some(indicator) = self.session.phase().indicator() {
                    let response = ui.label(RichText::new(indicator).weak().italics());
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Phase: {}", indicator),
                        )
                    });
                }
            });
    }
}

fn accessible_label(message: &Message) -> String {
    match message.speaker {
        Speaker::User => format!("User message: {}", message.text),
        Speaker::Assistant => format!("Assistant response: {}", message.text),
        Speaker::System => format!("Status: {}", message.text),
    }
}

fn show_message(ui: &mut egui::Ui, message: &Message) {
    let label = accessible_label(message);

    if message.is_status() {
        let response = ui.label(RichText::new(&message.text).weak());
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label));
        return;
    }

    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new(format!("{}:", message.speaker.label())).strong());
        let response = ui.label(&message.text);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label));

        if message.speaker == Speaker::Assistant {
            let copy = ui.small_button("Copy").on_hover_text("Copy response");
            if copy.clicked() {
                ui.ctx().copy_text(message.text.clone());
            }
        }
    });
    ui.label(
        RichText::new(message.timestamp.format("%H:%M").to_string())
            .small()
            .weak(),
    );
}
