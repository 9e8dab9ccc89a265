//! File-backed tracing for debug sessions.
//!
//! The terminal belongs to the dashboard while it runs, so nothing is ever written to
//! stdout or stderr. With debug off no subscriber is installed and `tracing` events are
//! dropped; the in-app debug ring buffer still records them.

use crate::services::config::DashboardConfig;
use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;

pub fn init(config: &DashboardConfig) -> Result<bool> {
    if !config.debug {
        return Ok(false);
    }
    if let Some(parent) = config.log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
    }
    // Truncate on every start
    let file = File::create(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(Level::DEBUG)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;
    tracing::info!(log_file = %config.log_file.display(), "debug logging enabled");
    Ok(true)
}
