use eframe::egui;

use crate::common::DisplayRecord;
use crate::ui::sink::MessageSink;

pub fn render(ui: &mut egui::Ui, sink: &mut MessageSink) {
    let scroll_to_latest = sink.take_scroll_request();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for record in sink.records() {
                match record {
                    DisplayRecord::Message {
                        sender,
                        message,
                        created_at,
                    } => {
                        ui.horizontal_wrapped(|ui| {
                            ui.strong(sender);
                            ui.label(message);
                        });
                        ui.label(egui::RichText::new(created_at).small().weak());
                    }
                    DisplayRecord::Error { message } => {
                        ui.colored_label(
                            egui::Color32::RED,
                            "There was an error processing this message:",
                        );
                        ui.label(egui::RichText::new(message).italics());
                    }
                }
                ui.add_space(4.0);
            }

            if scroll_to_latest {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
}
