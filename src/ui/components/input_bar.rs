use eframe::egui;

/// Compose row. Returns true when the user asked to send; the caller decides
/// whether the text is sendable and clears it.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool) -> bool {
    let mut send = false;
    ui.add_enabled_ui(enabled, |ui| {
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(input_text);
            if ui.button("Send").clicked() {
                send = true;
            }

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send = true;
                response.request_focus();
            }
        });
    });

    send
}
