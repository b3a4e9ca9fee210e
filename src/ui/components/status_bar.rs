use eframe::egui;

use crate::ui::state::{AppState, ConnectionStatus};

/// Connection state, identity and the latest notices. Returns true when the
/// user asked to log out.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> bool {
    let mut logout = false;

    ui.horizontal(|ui| {
        let (color, text) = match &state.connection {
            ConnectionStatus::Idle => (egui::Color32::GRAY, "idle".to_string()),
            ConnectionStatus::Connecting => (egui::Color32::YELLOW, "connecting...".to_string()),
            ConnectionStatus::Open => (egui::Color32::GREEN, "connected".to_string()),
            ConnectionStatus::Closed(reason) => {
                (egui::Color32::RED, format!("disconnected ({reason})"))
            }
        };
        ui.colored_label(color, "●");
        ui.label(text);

        ui.separator();
        match state.session.get() {
            Some(identity) => ui.label(format!("Signed in as {}", identity.name)),
            None => ui.label(egui::RichText::new("(resolving user...)").weak()),
        };

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Logout").clicked() {
                logout = true;
            }
            ui.label(egui::RichText::new(format!("chat #{}", state.chat_id())).weak());
        });
    });

    for notice in state.notices.iter().rev().take(3) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("[{}]", notice.timestamp.format("%H:%M:%S"))).weak(),
            );
            ui.label(&notice.text);
        });
    }

    logout
}
