//! Cleanup command feature.
//!
//! This module owns and handles the "unitscan cleanup" command behavior.
//! Archives duplicate program files into the flat archive, recycles bak
//! files, then rescans so the stored results match the disk again.

use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{open_store, resolve_archive_root, resolve_scan_root};
use crate::archive;
use crate::cli::read_line_from_stdin;
use crate::config::Config;
use crate::duplicates;
use crate::output::{self, OutputMode};
use crate::progress;
use crate::scanner;

pub(crate) fn handle_cleanup(
    root: Option<PathBuf>,
    archive_root: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
    mode: OutputMode,
) -> Result<()> {
    let config = Config::load();
    let root = resolve_scan_root(root, &config)?;
    let archive_root = resolve_archive_root(archive_root, &config)?;

    // Fatal configuration problems surface before anything is listed or asked.
    archive::validate_roots(&root, &archive_root)?;

    let store = open_store(&config)?;
    let mut aggregate = store.load()?;
    let scan = duplicates::scan_for_cleanup(&aggregate.results, &root, &config.extensions)?;

    if scan.is_empty() {
        if mode != OutputMode::Quiet {
            println!("Nothing to clean up: no duplicate program files, no bak files.");
        }
        return Ok(());
    }

    output::print_cleanup_plan(&scan, &archive_root, mode);

    if !yes && !dry_run {
        print!("Proceed? [y/N]: ");
        io::stdout().flush().ok();
        let input = match read_line_from_stdin() {
            Ok(line) => line.trim().to_lowercase(),
            Err(_) => {
                println!("\nCleanup cancelled (failed to read input).");
                return Ok(());
            }
        };
        if input != "y" && input != "yes" {
            println!("Cleanup cancelled.");
            return Ok(());
        }
    }

    let total = (scan.backup_files.len() + scan.candidate_count()) as u64;
    let bar = if mode != OutputMode::Quiet && !dry_run {
        Some(progress::create_progress_bar(total, "Cleaning up..."))
    } else {
        None
    };
    let report = archive::run_cleanup(&scan, &root, &archive_root, dry_run, bar.as_ref())?;
    if let Some(pb) = bar {
        progress::finish_and_clear(&pb);
    }

    output::print_cleanup_report(&report, dry_run, mode);

    if !dry_run {
        // The disk changed under the stored results; bring them back in line.
        let outcome = scanner::scan_root(&root, &config.extensions, mode)?;
        aggregate.replace_results(outcome.records);
        store.save(&aggregate)?;
        if mode == OutputMode::Verbose || mode == OutputMode::VeryVerbose {
            println!(
                "Results refreshed: {} rows saved to {}",
                aggregate.results.len(),
                store.path().display()
            );
        }
    }
    Ok(())
}
