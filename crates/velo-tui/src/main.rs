use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use velo_core::Config;

mod app;
mod handler;
mod markup;
mod presenter;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

const LOG_FILE: &str = "velo-chat.log";

/// The terminal belongs to the UI, so logs go to a file next to the settings.
///
/// Priority: `RUST_LOG` env var > default "info" for our crates
fn init_logging() -> Result<WorkerGuard> {
    let log_dir = Config::config_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &log_dir, LOG_FILE,
    ));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,velo_core=info,velo_tui=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging()?;

    let config = Config::load().context("failed to read the settings file")?;
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "chat client stopped");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
