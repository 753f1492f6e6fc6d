//! Cosmic Quest - terminal client for an astronomy chat agent
//!
//! A conversation state machine driven by a ratatui front end, talking to
//! the agent backend over JSON HTTP.

mod agent;
mod app;
mod attachment;
mod config;
mod markdown;
mod runtime;
mod state_machine;
mod tui;
mod ui;

use agent::{AgentService, HttpAgentService, LoggingService};
use app::App;
use config::ClientConfig;
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::from_env();

    // The terminal belongs to the UI, so logs go to a file
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_filter)?)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    tracing::info!(
        api = %config.api_base_url,
        log_path = %config.log_path.display(),
        "Starting Cosmic Quest"
    );

    let agent = LoggingService::new(HttpAgentService::new(&config.api_base_url));
    let mut app = App::new(agent);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Client stopped with an error");
    } else {
        tracing::info!("Client stopped");
    }
    result
}

async fn run<A: AgentService + 'static>(
    terminal: &mut Tui,
    app: &mut App<A>,
) -> Result<(), Box<dyn Error>> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => app.handle_event(event),
            Some(completion) = app.next_completion() => app.handle_completion(completion),
            else => break,
        }
    }

    Ok(())
}
