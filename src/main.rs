mod common;
mod config;
mod error;
mod network;
mod session;
mod ui;

use clap::Parser;
use dotenvy::dotenv;
use network::{AuthGateway, ChatClient};
use tokio::sync::mpsc;
use ui::ChatApp;

use common::NetworkCommand;
use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "ws_chat_client",
    version,
    about = "Desktop client for the WebSocket chat server"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat server base URL, e.g. http://localhost:8000
    #[arg(long, env = "CHAT_SERVER_URL")]
    server: Option<String>,
    /// Room the composed messages are sent to
    #[arg(long, env = "CHAT_ID")]
    chat_id: Option<String>,
    /// Explicit sender id for outgoing messages
    #[arg(long, env = "CHAT_USER_ID")]
    user_id: Option<String>,
    /// Existing X-Authorization value; opens the chat view directly
    #[arg(long, env = "CHAT_AUTH_TOKEN")]
    token: Option<String>,
    /// Full chat socket URL when it is not at <server>/ws/chat
    #[arg(long, env = "CHAT_SOCKET_URL")]
    socket_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        let mut config = config::load_config(&self.config);
        if let Some(server) = self.server {
            config.server_url = server;
        }
        if let Some(chat_id) = self.chat_id {
            config.chat_id = chat_id;
        }
        if self.user_id.is_some() {
            config.user_id = self.user_id;
        }
        if self.token.is_some() {
            config.auth_token = self.token;
        }
        if self.socket_url.is_some() {
            config.socket_url = self.socket_url;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let app_config = Cli::parse().into_config();
    let auth = AuthGateway::new(&app_config).inspect_err(|err| {
        log::error!("Cannot set up HTTP client for {}: {err}", app_config.server_url);
    })?;

    run_client(app_config, auth).await?;
    Ok(())
}

async fn run_client(app_config: AppConfig, auth: AuthGateway) -> Result<(), eframe::Error> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let has_token = auth.auth_token().is_some();
    let network_config = app_config.clone();
    tokio::spawn(async move {
        let client = ChatClient::new(event_tx, cmd_rx, network_config, auth);
        if let Err(err) = client.run().await {
            log::error!("Network client terminated: {err}");
        }
    });

    // A live cookie means the chat view loads straight away, as on a reload.
    if has_token {
        if let Err(err) = cmd_tx.try_send(NetworkCommand::OpenChat) {
            log::warn!("Failed to request chat view: {err}");
        }
    }

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client started against {}", app_config.server_url);

            Ok(Box::new(ChatApp::new(
                cc,
                &app_config,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )
}
