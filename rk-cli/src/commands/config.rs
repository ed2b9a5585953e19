//! Config command - inspect the effective configuration.

use clap::Subcommand;
use rk_core::config::AppConfig;
use rk_core::error::{RkError, RkResult};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the configuration file path.
    Path,
    /// Print the effective configuration (token masked).
    Show,
}

/// Run the config command.
pub fn run(
    config: &AppConfig,
    explicit_path: Option<&str>,
    action: ConfigAction,
    format: OutputFormat,
) -> RkResult<()> {
    match action {
        ConfigAction::Path => {
            let path = match explicit_path {
                Some(p) => std::path::PathBuf::from(p),
                None => AppConfig::default_config_path()?,
            };
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let masked = masked(config);
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&masked)?;
                    println!("{json}");
                }
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&masked)
                        .map_err(|e| RkError::Config(format!("failed to render config: {e}")))?;
                    print!("{text}");
                }
            }
        }
    }
    Ok(())
}

/// Copy of the config with the token replaced.
fn masked(config: &AppConfig) -> AppConfig {
    let mut copy = config.clone();
    if let Some(ref token) = copy.client.auth_token {
        copy.client.auth_token = Some(if token.is_empty() { String::new() } else { "****".into() });
    }
    copy
}
