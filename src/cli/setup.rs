use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;

/// Writes the default configuration to `path`, refusing to overwrite an
/// existing file.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = serde_yaml::to_string(&AppConfig::default())
        .context("Failed to serialize default configuration")?;
    std::fs::write(path, format!("---\n{default_config}"))
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    info!("Created default configuration at {}", path.display());
    Ok(())
}

pub fn run() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    write_default_config(&path)?;
    println!("Created default configuration at {}", path.display());
    Ok(())
}
