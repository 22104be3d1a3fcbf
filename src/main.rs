use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use folio::ai::GeminiClient;
use folio::app::App;
use folio::config::Config;
use folio::profile::Profile;
use folio::view::View;

/// Folio - an interactive portfolio in your terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the résumé JSON document
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Path to the achievements JSON document
    #[arg(short, long)]
    achievements: Option<PathBuf>,

    /// View shown at startup
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set global default subscriber")?;
    } else {
        // stderr keeps log lines out of the UI drawn on stdout
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set global default subscriber")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_default()?
    };

    // Command-line overrides
    if let Some(profile) = args.profile {
        config.data.profile_path = profile;
    }
    if let Some(achievements) = args.achievements {
        config.data.achievements_path = achievements;
    }
    if let Some(view) = args.view {
        config.app.default_view = view;
    }

    // Check if stdout is a TTY
    if !std::io::stdout().is_terminal() {
        eprintln!("Error: folio must be run in an interactive terminal.");
        eprintln!("It cannot be run with redirected output or in non-TTY environments.");
        eprintln!("\nUsage: Run 'folio' directly in a terminal emulator.");
        std::process::exit(1);
    }

    // A missing profile is not fatal: every view shows a "not loaded" message
    let profile = match Profile::load_from_file(&config.data.profile_path) {
        Ok(profile) => Some(Arc::new(profile)),
        Err(e) => {
            error!("{:#}", e);
            None
        }
    };

    info!("Starting {} {}", config.app.name, config.app.version);
    let generator = Arc::new(GeminiClient::from_config(&config.ai));
    let mut app = App::new(config, profile, generator);

    if let Err(e) = app.run().await {
        // Ensure terminal is cleaned up before showing error
        eprintln!("\nfolio encountered an error: {e:#}");
        eprintln!("\nIf the terminal display is corrupted, try running:");
        eprintln!("  reset");
        return Err(e);
    }

    Ok(())
}
