//! First-run setup.
//!
//! Writes the default configuration file when none exists yet, so users have
//! a commented template to put their API key into.

use std::path::Path;

/// Embedded default configuration template.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/meetscribe.toml");

/// Creates the config file from the default template if it is missing.
///
/// Returns `true` when a new file was written.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn ensure_config(config_path: &Path) -> anyhow::Result<bool> {
    if config_path.exists() {
        tracing::debug!("Config file present: {}", config_path.display());
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    tracing::info!("Wrote default configuration to {}", config_path.display());

    Ok(true)
}
