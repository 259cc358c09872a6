use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Record the current (detached) pid.
pub fn write(path: &Path) -> Result<()> {
    fs::write(path, format!("{}\n", std::process::id()))
        .with_context(|| format!("Failed to write pid file {}", path.display()))
}

/// Best-effort removal on shutdown.
pub fn remove(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        log::warn!("Failed to remove pid file {}: {err}", path.display());
    }
}
