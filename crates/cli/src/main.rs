//! Faculty portal command-line client

mod commands;
mod config;
mod logging;
mod prompt;
mod state_dir;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use config::PortalSettings;
use state_dir::StateDir;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::{Level, error, info, warn};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Sign in to the faculty portal from the terminal")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to portal.toml in the config directory)
    #[arg(short = 'c', long, global = true, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the session file and log
    #[arg(short = 'd', long, global = true, env = "PORTAL_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Backend base address, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Set logging level [default: warn]
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    /// Keep the session in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Flags given on the command line win over every other source
    fn apply_overrides(&self, settings: &mut PortalSettings) {
        if let Some(base_url) = &self.base_url {
            settings.api.base_url.clone_from(base_url);
        }
        if let Some(timeout) = self.timeout {
            settings.api.timeout_secs = timeout;
        }
        if let Some(state_dir) = &self.state_dir {
            settings.state_dir = Some(state_dir.clone());
        }
    }

    fn level(&self, settings: &PortalSettings) -> Level {
        if let Some(level) = &self.log_level {
            return level.clone().into();
        }
        match settings.log_level.as_deref().map(str::parse::<Level>) {
            Some(Ok(level)) => level,
            Some(Err(_)) => {
                // Logging is not up yet
                eprintln!("warning: ignoring invalid log_level in configuration");
                Level::WARN
            }
            None => Level::WARN,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| StateDir::resolve(cli.state_dir.clone()).config_path());
    let mut settings = PortalSettings::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    cli.apply_overrides(&mut settings);

    let state_dir = StateDir::resolve(settings.state_dir.clone());
    let log_file = (!cli.no_file_log && !cli.ephemeral).then(|| state_dir.log_path());
    logging::init_logging(cli.level(&settings), log_file.as_deref())?;

    info!("Starting portal CLI");
    if settings.api.base_url.starts_with("http://") && !is_local(&settings.api.base_url) {
        warn!(base_url = %settings.api.base_url, "Credentials will be sent without TLS");
    }

    let context = Context::open(&settings, &state_dir, cli.ephemeral)?;
    match cli.command.execute(&context).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Loopback hosts only; the host must match exactly, not by prefix
fn is_local(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
