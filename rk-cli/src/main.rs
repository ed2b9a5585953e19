//! Restkit CLI - issue REST calls through the Restkit request engine.
//!
//! Useful for probing an API from the terminal: every call prints the
//! result envelope, and the exit status reflects its success flag.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use rk_core::config::AppConfig;
use rk_core::constants;
use rk_core::error::RkResult;
use rk_core::logging;

/// Restkit - typed REST client toolkit.
#[derive(Parser)]
#[command(
    name = "restkit",
    version,
    about = "Issue REST calls and inspect the result envelope",
    long_about = "A command-line front end for the Restkit request engine.\n\
                  Calls are resolved against the configured base URI and always print an envelope."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Base URI (overrides config).
    #[arg(short, long, global = true)]
    base_uri: Option<String>,

    /// Bearer token (overrides config).
    #[arg(short, long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request.
    Get {
        /// Path resolved against the base URI.
        path: String,
    },
    /// Send a POST request with a JSON body.
    Post {
        path: String,
        /// JSON body, or @FILE to read it from a file.
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    /// Send a PUT request with a JSON body.
    Put {
        path: String,
        /// JSON body, or @FILE to read it from a file.
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    /// Send a DELETE request.
    Delete { path: String },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> RkResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from_file(Path::new(path))?,
        None => AppConfig::load_default()?,
    };
    if let Some(ref uri) = cli.base_uri {
        config.client.base_uri = AppConfig::sanitize_base_uri(uri);
    }
    if let Some(token) = cli.token {
        config.client.auth_token = Some(token);
    }

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let log_dir = config
        .effective_log_dir()
        .unwrap_or_else(|_| PathBuf::from("logs"));
    let log_guard = match logging::init_from_config(&config.logging, &log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging(&config.logging.level);
            warn!("file logging unavailable, using console only: {e}");
            None
        }
    };

    info!("{} CLI v{}", constants::APP_NAME, constants::APP_VERSION);

    let call = match cli.command {
        Commands::Get { path } => commands::call::Call::get(path),
        Commands::Post { path, data } => commands::call::Call::post(path, &data)?,
        Commands::Put { path, data } => commands::call::Call::put(path, &data)?,
        Commands::Delete { path } => commands::call::Call::delete(path),
        Commands::Config { action } => {
            return commands::config::run(&config, cli.config.as_deref(), action, cli.format);
        }
    };

    let success = commands::call::run(&config, call, cli.format).await?;
    if !success {
        // exit() skips destructors; flush the file writer first
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
