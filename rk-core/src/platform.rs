//! Platform-specific directory lookup.

use std::path::PathBuf;

use crate::constants::APP_DIR_NAME;
use crate::error::{RkError, RkResult};

/// Namespace for OS-specific application directories.
pub struct Platform;

impl Platform {
    /// Get the platform-specific application data directory.
    ///
    /// - Windows: `%APPDATA%/restkit`
    /// - macOS: `~/Library/Application Support/restkit`
    /// - Linux: `~/.local/share/restkit`
    pub fn data_dir() -> RkResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| RkError::Config("could not determine data directory".into()))?;
        Ok(base.join(APP_DIR_NAME))
    }

    /// Get the platform-specific configuration directory.
    ///
    /// - Windows: `%APPDATA%/restkit`
    /// - macOS: `~/Library/Application Support/restkit`
    /// - Linux: `~/.config/restkit`
    pub fn config_dir() -> RkResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| RkError::Config("could not determine config directory".into()))?;
        Ok(base.join(APP_DIR_NAME))
    }
}
