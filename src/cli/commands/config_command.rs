//! Config command feature.
//!
//! This module owns and handles the "unitscan config" command behavior.

use crate::config::Config;
use crate::theme::Theme;

pub(crate) fn handle_config(show: bool, reset: bool, path: bool) -> anyhow::Result<()> {
    if reset {
        Config::default().save()?;
        println!("{} Configuration reset to defaults.", Theme::success("OK"));
        return Ok(());
    }

    if path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // --show and the bare command behave the same.
    let _ = show;
    print_config(&Config::load());
    Ok(())
}

fn print_config(config: &Config) {
    println!("{}", Theme::header("Current Configuration"));
    println!("{}", Theme::divider_bold(60));
    println!();
    println!("Paths:");
    println!("  Scan root: {}", value_or_unset(&config.paths.scan_root));
    println!(
        "  Archive root: {}",
        value_or_unset(&config.paths.archive_root)
    );
    if config.paths.state_dir.trim().is_empty() {
        println!("  State dir: (per-user default)");
    } else {
        println!("  State dir: {}", config.paths.state_dir.trim());
    }
    println!(
        "  Decommission dir: {}",
        value_or_unset(&config.paths.decommission_dir)
    );
    println!();
    println!("Extensions:");
    println!("  Program: {}", config.extensions.program.join(", "));
    println!("  Quick panel: {}", config.extensions.quick_panel);
    println!();
    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn value_or_unset(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "(not set)"
    } else {
        trimmed
    }
}
