//! File System Utilities
//!
//! Configuration directory management.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "greenforce", "greenforce-monitor").ok_or_else(|| Error::Invalid {
        message: "Could not determine project directories".to_string(),
    })
}

/// Get or create the client's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/greenforce-monitor/` or `$XDG_CONFIG_HOME/greenforce-monitor/`
/// - **macOS**: `~/Library/Application Support/io.greenforce.greenforce-monitor/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\greenforce\greenforce-monitor\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let config_dir = dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    Ok(config_dir.to_path_buf())
}
