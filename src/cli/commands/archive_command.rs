//! Archive command feature.
//!
//! This module owns and handles the "unitscan archive" command behavior.
//! Moves one file into the flat archive with collision-safe naming.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::resolve_archive_root;
use crate::archive;
use crate::config::Config;
use crate::output::OutputMode;

pub(crate) fn handle_archive(
    file: PathBuf,
    archive_root: Option<PathBuf>,
    mode: OutputMode,
) -> Result<()> {
    let config = Config::load();
    let archive_root = resolve_archive_root(archive_root, &config)?;

    if !file.is_file() {
        return Err(anyhow!("Not a file: {}", file.display()));
    }

    let destination = archive::move_to_archive(&file, &archive_root)?;
    if mode != OutputMode::Quiet {
        println!("Archived {} -> {}", file.display(), destination.display());
    }
    Ok(())
}
