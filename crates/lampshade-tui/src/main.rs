//! `lampshade` — terminal dashboard for the lights on a home-automation hub.
//!
//! Polls the hub's `/api/states` endpoint, shows every light in a selectable
//! table, and switches the highlighted light on or off with Enter.
//!
//! Logs are written to a file (default `/tmp/lampshade.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod event;
mod refresh;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lampshade_config::Config;
use lampshade_core::{Hub, HubConfig};

use crate::app::App;

/// Terminal dashboard for watching and toggling home-automation lights.
#[derive(Parser, Debug)]
#[command(name = "lampshade", version, about)]
struct Cli {
    /// Hub base URL (e.g., http://homeassistant.local:8123)
    #[arg(short = 'u', long, env = "LAMPSHADE_URL")]
    url: Option<String>,

    /// Seconds between automatic refreshes
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective hub settings to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/lampshade.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI. The returned guard must live until exit so buffered logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lampshade={log_level},lampshade_core={log_level},lampshade_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("lampshade.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Load the config file (if any), then let CLI flags win.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let loaded = match &cli.config {
        Some(path) => lampshade_config::load_config_at(path),
        None => lampshade_config::load_config(),
    };
    let mut cfg: Config = loaded.wrap_err("failed to load configuration")?;

    let hub = &mut cfg.hub;
    if let Some(url) = &cli.url {
        hub.base_url.clone_from(url);
    }
    if let Some(secs) = cli.poll_interval {
        hub.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.timeout {
        hub.timeout_secs = secs;
    }

    Ok(cfg)
}

fn resolve_hub_config(cli: &Cli) -> Result<HubConfig> {
    resolve_config(cli)?
        .hub
        .to_hub_config()
        .wrap_err("invalid hub settings")
}

fn save_settings(cli: &Cli) -> Result<()> {
    let cfg = resolve_config(cli)?;
    // Refuse to persist settings that would not start
    cfg.hub.to_hub_config().wrap_err("invalid hub settings")?;

    let path = cli.config.clone().unwrap_or_else(lampshade_config::config_path);
    match &cli.config {
        Some(path) => lampshade_config::save_config_at(&cfg, path),
        None => lampshade_config::save_config(&cfg),
    }
    .wrap_err("failed to save configuration")?;

    info!(path = %path.display(), "saved configuration");
    println!("Saved settings to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_tracing(&cli);

    // Hooks before anything touches the terminal
    tui::install_hooks()?;

    if cli.save_config {
        return save_settings(&cli);
    }

    let config = resolve_hub_config(&cli)?;
    info!(
        url = %config.base_url,
        poll_interval = ?config.poll_interval,
        timeout = ?config.timeout,
        "starting lampshade"
    );

    let hub = Hub::new(config)?;
    let mut app = App::new(hub);
    app.run().await?;

    Ok(())
}
