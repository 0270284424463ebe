//! Command feature handlers.
//!
//! Each module owns one command feature.

pub mod archive_command;
pub mod cleanup_command;
pub mod config_command;
pub mod duplicates_command;
pub mod list_command;
pub mod note_command;
pub mod scan_command;
pub mod show_command;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::state::StateStore;

/// Scan root from the flag, else config. Required for every disk operation.
pub(crate) fn resolve_scan_root(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.scan_root()).ok_or_else(|| {
        anyhow!("No scan root given. Pass --root or set paths.scan_root in the config file.")
    })
}

pub(crate) fn resolve_archive_root(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.archive_root()).ok_or_else(|| {
        anyhow!(
            "No archive root given. Pass --archive-root or set paths.archive_root in the config file."
        )
    })
}

/// Open the state store at the configured directory, or the per-user default.
pub(crate) fn open_store(config: &Config) -> Result<StateStore> {
    let dir = match config.state_dir() {
        Some(dir) => dir,
        None => StateStore::default_dir()?,
    };
    Ok(StateStore::at_dir(&dir))
}
