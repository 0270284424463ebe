//! Scan command feature.
//!
//! This module owns and handles the "unitscan scan" command behavior.
//! A scan replaces the stored results wholesale; notes survive untouched.

use anyhow::Result;
use std::path::PathBuf;

use super::{open_store, resolve_scan_root};
use crate::config::Config;
use crate::output::{self, OutputMode};
use crate::scanner;
use crate::state::UnitRecord;

pub(crate) fn handle_scan(root: Option<PathBuf>, json: bool, mode: OutputMode) -> Result<()> {
    let config = Config::load();
    let root = resolve_scan_root(root, &config)?;
    let store = open_store(&config)?;

    // Scan first. If the walk fails, the stored aggregate is never touched.
    let outcome = scanner::scan_root(&root, &config.extensions, mode)?;

    let mut aggregate = store.load()?;
    aggregate.replace_results(outcome.records.clone());
    store.save(&aggregate)?;

    let rows: Vec<&UnitRecord> = aggregate.results.iter().collect();
    if json {
        output::print_records_json(&rows)?;
    } else {
        output::print_scan_summary(&outcome, &root, mode);
        output::print_records_table(&rows, mode);
        if mode == OutputMode::Verbose || mode == OutputMode::VeryVerbose {
            println!("Saved results to {}", store.path().display());
        }
    }
    Ok(())
}
