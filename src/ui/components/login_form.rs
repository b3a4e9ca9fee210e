use eframe::egui;

use crate::ui::state::AppState;

#[derive(Default)]
pub struct LoginActions {
    pub login: bool,
    pub register: bool,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> LoginActions {
    let mut actions = LoginActions::default();

    ui.heading("Sign in");
    ui.separator();

    egui::Grid::new("login_grid").num_columns(2).show(ui, |ui| {
        ui.label("Username:");
        ui.text_edit_singleline(&mut state.username_input);
        ui.end_row();

        ui.label("Password:");
        let response = ui.add(egui::TextEdit::singleline(&mut state.password_input).password(true));
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            actions.login = true;
        }
        ui.end_row();
    });

    ui.horizontal(|ui| {
        if ui.button("Login").clicked() {
            actions.login = true;
        }
        if ui.button("Register").clicked() {
            actions.register = true;
        }
    });

    if let Some(error) = &state.login_error {
        ui.colored_label(egui::Color32::RED, error);
    }

    actions
}
