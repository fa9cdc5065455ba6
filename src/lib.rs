pub mod acquisition;
pub mod display;
pub mod error;
pub mod protocol;
pub mod serial;
pub mod settings;
mod utils;

use std::io;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use acquisition::{acquisition_loop, spawn_stdin_commands, AcquisitionController, ControlCommand};
use display::{DisplaySink, JsonLinesDisplay, TerminalDisplay};
use serial::{HandshakeConfig, SerialConnector};
use settings::{MonitorSettings, OutputMode, SettingsStore};

pub const DEBUG_ENV: &str = "JOYMON_DEBUG";

pub fn run() -> Result<()> {
    let debug_mode = std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var); logs go to stderr.
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("joymon starting up...");

    let store = SettingsStore::from_env()?;
    info!("Settings from {}", store.path().display());
    let settings = store.current();

    // One thread: the poll loop owns the port and never shares it.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(monitor(settings));

    // The stdin reader may be parked in a blocking read; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn monitor(settings: MonitorSettings) -> Result<()> {
    let display: Box<dyn DisplaySink> = match settings.output {
        OutputMode::Text => Box::new(TerminalDisplay::new(io::stdout())),
        OutputMode::Json => Box::new(JsonLinesDisplay::new(io::stdout())),
    };
    let controller = AcquisitionController::new(
        Box::new(SerialConnector::new(&settings)),
        HandshakeConfig::from(&settings),
        display,
    );

    let (tx, rx) = mpsc::unbounded_channel();
    if settings.auto_start {
        tx.send(ControlCommand::Start)
            .context("command channel closed before start")?;
    }
    let reader = spawn_stdin_commands(tx);

    let cancel_token = CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        });
    }

    info!("Commands: start, stop, quit");
    let controller =
        acquisition_loop(controller, rx, settings.tick_interval(), cancel_token).await;
    reader.abort();

    info!(
        "Exiting after {} readings in the last session",
        controller.snapshot().readings
    );
    Ok(())
}
