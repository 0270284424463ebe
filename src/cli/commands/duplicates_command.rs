//! Duplicates command feature.
//!
//! This module owns and handles the "unitscan duplicates" command behavior.
//! Candidate files are re-listed from disk; stored display text is never
//! parsed back into paths.

use anyhow::Result;
use std::path::PathBuf;

use super::{open_store, resolve_scan_root};
use crate::config::Config;
use crate::duplicates;
use crate::output::{self, OutputMode};

pub(crate) fn handle_duplicates(
    root: Option<PathBuf>,
    json: bool,
    mode: OutputMode,
) -> Result<()> {
    let config = Config::load();
    let root = resolve_scan_root(root, &config)?;
    let store = open_store(&config)?;
    let aggregate = store.load()?;

    let scan = duplicates::scan_for_cleanup(&aggregate.results, &root, &config.extensions)?;
    if json {
        output::print_duplicates_json(&scan)?;
    } else {
        output::print_duplicates(&scan, mode);
    }
    Ok(())
}
