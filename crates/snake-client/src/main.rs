use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use snake_client::controls::{Control, HELP_TEXT, parse_control};
use snake_client::score_client::BackendClient;
use snake_client::session::{GameSession, SessionInput, SessionSettings};
use snake_client::terminal::TerminalFrontend;
use snake_core::config::SnakeConfig;
use snake_core::render::Theme;
use snake_core::scoreboard::connection_error_text;
use snake_core::toast::MessageKind;

#[tokio::main]
async fn main() {
    // Frames go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match SnakeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        },
    };

    let client = match BackendClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create HTTP client");
            std::process::exit(1);
        },
    };
    tracing::info!(backend = client.base_url(), "Snake starting");

    let session = GameSession::new(
        SessionSettings::from_config(&config),
        client.clone(),
        TerminalFrontend::new(Theme::default()),
    );

    // Health check runs alongside the game and reports as a message
    let notifier = session.notifier();
    tokio::spawn(async move {
        match client.health().await {
            Ok(info) => {
                tracing::info!(
                    mensagem = %info.mensagem,
                    versao = %info.versao,
                    timestamp = %info.timestamp,
                    "Backend reachable"
                );
                notifier
                    .push(
                        MessageKind::Success,
                        format!("{} (versão {})", info.mensagem, info.versao),
                    )
                    .await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                notifier
                    .push(MessageKind::Error, connection_error_text(&e.to_string()))
                    .await;
            },
        }
    });

    let (input_tx, input_rx) = mpsc::unbounded_channel();

    if let Ok(username) = std::env::var("SNAKE_USERNAME")
        && !username.is_empty()
        && let Ok(password) = std::env::var("SNAKE_PASSWORD")
    {
        let _ = input_tx.send(SessionInput::Login { username, password });
    }

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_control(&line) {
                    Some(Control::Input(input)) => {
                        if input_tx.send(input).is_err() {
                            break;
                        }
                    },
                    Some(Control::Help) => eprintln!("{HELP_TEXT}"),
                    None => tracing::debug!(line = %line, "Unrecognized input"),
                },
                Ok(None) => {
                    let _ = input_tx.send(SessionInput::Quit);
                    break;
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    let _ = input_tx.send(SessionInput::Quit);
                    break;
                },
            }
        }
    });

    session.run(input_rx).await;
}
