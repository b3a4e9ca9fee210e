use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent};
use crate::config::AppConfig;

use super::components::{chat_area, input_bar, login_form, status_bar};
use super::state::{AppState, ConnectionStatus, View};

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        Self {
            state: AppState::new(config),
            command_sender,
            event_receiver,
        }
    }

    /// Drains network events in arrival order before the frame is drawn.
    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply(event);
        }
    }

    fn send_command(&self, command: NetworkCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to network: {err}");
        }
    }

    fn render_login(&mut self, ctx: &egui::Context) {
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| login_form::render(ui, &mut self.state))
            .inner;

        let command = if actions.login {
            self.state.login_command()
        } else if actions.register {
            self.state.register_command()
        } else {
            None
        };
        if let Some(command) = command {
            self.send_command(command);
        }
    }

    fn render_chat(&mut self, ctx: &egui::Context) {
        let logout = egui::TopBottomPanel::top("status_bar")
            .show(ctx, |ui| status_bar::render(ui, &self.state))
            .inner;
        if logout {
            self.send_command(NetworkCommand::Logout);
        }

        let enabled = self.state.connection == ConnectionStatus::Open;
        let submit = egui::TopBottomPanel::bottom("compose")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let submit = input_bar::render(ui, &mut self.state.input_text, enabled);
                ui.add_space(4.0);
                submit
            })
            .inner;
        if submit {
            self.state.submit(&self.command_sender);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, &mut self.state.sink);
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        match self.state.view {
            View::Login => self.render_login(ctx),
            View::Chat => self.render_chat(ctx),
        }

        ctx.request_repaint();
    }
}
