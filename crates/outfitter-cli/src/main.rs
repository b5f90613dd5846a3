//! outfitter - a terminal client for the outfit-recommendation service.
//!
//! Sign in, photograph garments into your wardrobe, and chat with the
//! assistant for outfit ideas.

mod app;
mod chat;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use outfitter_core::config::Config;
use outfitter_core::models::GarmentType;

use app::App;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "outfitter.log";

#[derive(Parser)]
#[command(name = "outfitter")]
#[command(about = "Terminal client for the outfitter wardrobe assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an existing account
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Remove all stored credentials
    Logout,
    /// Show the signed-in account
    Profile,
    /// Show backend and session state
    Status,
    /// Upload a photo of a garment to your wardrobe
    Upload {
        /// Image file to upload
        path: PathBuf,
        /// Garment category: top, bottom, dress, jewelry or hat
        #[arg(short = 't', long = "type")]
        garment: GarmentType,
    },
    /// Chat with the assistant for outfit ideas
    Chat,
}

/// Initialize the tracing subscriber for logging.
/// Logs go to a daily file so they never interleave with prompts.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: could not create log directory {}: {}", log_dir.display(), e);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config ({:#}), using defaults", e);
        Config::default()
    });

    let log_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    let _guard = init_tracing(&log_dir);
    info!("outfitter starting");

    let mut app = App::new(config)?;

    let result = match cli.command {
        Commands::Login { email } => app.login(email).await,
        Commands::Register { email } => app.register(email).await,
        Commands::Logout => app.logout(),
        Commands::Profile => app.profile(),
        Commands::Status => app.status(),
        Commands::Upload { path, garment } => app.upload(&path, garment).await,
        Commands::Chat => app.chat().await,
    };

    info!(ok = result.is_ok(), "outfitter shutting down");
    result
}
