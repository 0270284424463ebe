use crate::archive::CleanupReport;
use crate::duplicates::DuplicateScan;
use crate::index::LocationGroup;
use crate::scanner::{self, ScanOutcome};
use crate::state::UnitRecord;
use crate::theme::Theme;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to a maximum display width (adds ellipsis if needed).
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }

    let ellipsis = "…";
    let ellipsis_w = UnicodeWidthStr::width(ellipsis);
    let target = max_width.saturating_sub(ellipsis_w);

    let mut out = String::new();
    let mut w = 0usize;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw > target {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push_str(ellipsis);
    out
}

/// Pad/truncate content to a specific display width (Unicode-aware).
fn pad_right_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let w = UnicodeWidthStr::width(truncated.as_str());
    format!("{}{}", truncated, " ".repeat(width.saturating_sub(w)))
}

/// Print a table row with borders and 1-space cell padding.
fn print_table_row(cols: &[(String, usize)]) {
    let mut row = String::from("│");
    for (content, width) in cols {
        row.push(' ');
        row.push_str(&pad_right_to_width(content, *width));
        row.push(' ');
        row.push('│');
    }
    println!("{}", row);
}

/// Print a horizontal separator line (Unicode box drawing).
/// Widths are content widths (excluding the 1-space left/right padding).
fn print_table_separator(widths: &[usize], left: &str, mid: &str, right: &str) {
    let mut sep = left.to_string();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            sep.push_str(mid);
        }
        // +2 for the 1-space padding on each side of the cell
        sep.push_str(&"─".repeat(width + 2));
    }
    sep.push_str(right);
    println!("{}", sep);
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors
    Normal,      // Standard output
    Verbose,     // More details
    VeryVerbose, // All details including file paths
}

/// Row counts shared by the table footer and the JSON summary.
#[derive(Debug, Clone, Copy, Default, Serialize)]
struct RowCounts {
    total_rows: usize,
    missing_program: usize,
    missing_quick_panel: usize,
    multiple_program_dirs: usize,
}

fn count_rows(records: &[&UnitRecord]) -> RowCounts {
    let mut counts = RowCounts {
        total_rows: records.len(),
        ..RowCounts::default()
    };
    for record in records {
        if record.is_program_missing() {
            counts.missing_program += 1;
        }
        if record.is_quick_panel_missing() && !record.is_bak_summary() {
            counts.missing_quick_panel += 1;
        }
        if record.program_count_in_dir > 1 {
            counts.multiple_program_dirs += 1;
        }
    }
    counts
}

fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn file_timestamp(path: &Path) -> String {
    match scanner::file_modified(path) {
        Ok(ts) => format_timestamp(&ts),
        Err(_) => "-".to_string(),
    }
}

fn file_size(path: &Path) -> String {
    match fs::metadata(path) {
        Ok(meta) => bytesize::to_string(meta.len(), false),
        Err(_) => "-".to_string(),
    }
}

/// Print the unit records as a bordered table. Verbose adds the directory
/// path under each row; very verbose adds quick-panel timestamps too.
pub fn print_records_table(records: &[&UnitRecord], mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    if records.is_empty() {
        println!();
        println!("{}", Theme::muted("No unit directories in the results."));
        println!();
        return;
    }

    println!();

    // Table column widths
    // (content widths; padding handled by table helpers)
    let col_widths = [12, 12, 34, 16, 5, 22];

    print_table_separator(&col_widths, "┌", "┬", "┐");
    print_table_row(&[
        (Theme::primary("Location"), col_widths[0]),
        (Theme::primary("Unit"), col_widths[1]),
        (Theme::primary("Program File"), col_widths[2]),
        (Theme::primary("Modified"), col_widths[3]),
        (Theme::primary("Qtr"), col_widths[4]),
        (Theme::primary("Quick Panel"), col_widths[5]),
    ]);
    print_table_separator(&col_widths, "├", "┼", "┤");

    for record in records {
        let modified = if record.is_program_missing() {
            "-".to_string()
        } else {
            format_timestamp(&record.program_file_modified)
        };
        print_table_row(&[
            (Theme::category(&record.location), col_widths[0]),
            (Theme::category(&record.unit), col_widths[1]),
            (Theme::value(&record.program_file), col_widths[2]),
            (modified, col_widths[3]),
            (record.quarter.clone(), col_widths[4]),
            (record.quick_panel_file.clone(), col_widths[5]),
        ]);

        if mode == OutputMode::Verbose || mode == OutputMode::VeryVerbose {
            println!(
                "  {} {}",
                Theme::muted("└─"),
                Theme::muted(&record.directory_path.display().to_string())
            );
            if mode == OutputMode::VeryVerbose {
                if let Some(ts) = record.quick_panel_file_modified {
                    println!(
                        "     {}",
                        Theme::muted(&format!("quick panel modified {}", format_timestamp(&ts)))
                    );
                }
            }
        }
    }

    print_table_separator(&col_widths, "└", "┴", "┘");

    let counts = count_rows(records);
    println!();
    println!(
        "{} rows: {} missing program, {} missing quick panel, {} with multiple programs",
        format_number(counts.total_rows as u64),
        counts.missing_program,
        counts.missing_quick_panel,
        counts.multiple_program_dirs
    );
    println!();
}

/// Print the location/unit tree with per-unit row counts.
pub fn print_tree(groups: &[LocationGroup], mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    if groups.is_empty() {
        println!();
        println!("{}", Theme::muted("No unit directories in the results."));
        println!();
        return;
    }

    println!();
    let mut unit_total = 0usize;
    for group in groups {
        println!("{}", Theme::header(&group.display));
        for unit in &group.units {
            unit_total += 1;
            let rows = if unit.row_count == 1 { "row" } else { "rows" };
            println!(
                "  {} {} {}",
                Theme::muted("└─"),
                unit.display,
                Theme::muted(&format!("({} {})", unit.row_count, rows))
            );
        }
    }
    println!();
    println!(
        "{} locations, {} units",
        format_number(groups.len() as u64),
        format_number(unit_total as u64)
    );
    println!();
}

/// One-line summary after a scan finishes.
pub fn print_scan_summary(outcome: &ScanOutcome, root: &Path, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }
    println!(
        "Scanned {} directories under {}: {} unit rows, {} program files.",
        format_number(outcome.directories_scanned as u64),
        root.display(),
        format_number(outcome.records.len() as u64),
        format_number(outcome.program_inventory.len() as u64)
    );
}

/// Full detail for one unit row, plus its note when present.
pub fn print_unit_detail(record: &UnitRecord, note: Option<&str>) {
    println!();
    print_detail_line("Location", &record.location);
    print_detail_line("Unit", &record.unit);
    print_detail_line("Program file", &record.program_file);
    let modified = if record.is_program_missing() {
        "-".to_string()
    } else {
        format_timestamp(&record.program_file_modified)
    };
    print_detail_line("Modified", &modified);
    print_detail_line("Quarter", &record.quarter);
    print_detail_line("Quick panel", &record.quick_panel_file);
    if let Some(ts) = record.quick_panel_file_modified {
        print_detail_line("QP modified", &format_timestamp(&ts));
    }
    print_detail_line(
        "Directory",
        &record.directory_path.display().to_string(),
    );
    print_detail_line("Programs here", &record.program_count_in_dir.to_string());
    if let Some(text) = note {
        print_detail_line("Note", text);
    }
    println!();
}

fn print_detail_line(label: &str, value: &str) {
    println!("{:<14} {}", Theme::primary(&format!("{}:", label)), value);
}

/// List duplicate groups and backup files found for cleanup.
pub fn print_duplicates(scan: &DuplicateScan, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    println!();
    if scan.sets.is_empty() {
        println!("{}", Theme::muted("No directories with duplicate program files."));
    } else {
        for (idx, set) in scan.sets.iter().enumerate() {
            println!(
                "Group {} {} ({} files)",
                idx + 1,
                Theme::category(&set.directory.display().to_string()),
                set.files.len()
            );
            for file in &set.files {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                println!(
                    "  {} {}  {:>10}  {}",
                    Theme::muted("└─"),
                    file_timestamp(file),
                    Theme::size(&file_size(file)),
                    name
                );
            }
        }
    }

    println!();
    if scan.backup_files.is_empty() {
        println!("{}", Theme::muted("No bak files under the root."));
    } else {
        println!("Bak files: {}", format_number(scan.backup_files.len() as u64));
        if mode == OutputMode::Verbose || mode == OutputMode::VeryVerbose {
            for path in &scan.backup_files {
                println!("  {}", Theme::muted(&path.display().to_string()));
            }
        }
    }
    println!();
}

/// What a cleanup is about to do, shown before the confirmation prompt.
pub fn print_cleanup_plan(scan: &DuplicateScan, archive_root: &Path, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    print_duplicates(scan, mode);
    println!(
        "Cleanup will archive {} files to {} and recycle {} bak files.",
        format_number(scan.candidate_count() as u64),
        archive_root.display(),
        format_number(scan.backup_files.len() as u64)
    );
}

/// Counters after a cleanup batch. Per-file failures always go to stderr.
pub fn print_cleanup_report(report: &CleanupReport, dry_run: bool, mode: OutputMode) {
    for (path, message) in &report.errors {
        eprintln!("Warning: {}: {}", path.display(), message);
    }

    if mode == OutputMode::Quiet {
        return;
    }

    println!();
    if dry_run {
        println!(
            "{}",
            Theme::header(&format!(
                "Dry run: {} files would be archived, {} bak files would be recycled.",
                report.archived, report.deleted
            ))
        );
    } else {
        println!(
            "{}",
            Theme::header(&format!(
                "Cleanup complete: {} archived ({} failed), {} recycled ({} failed).",
                report.archived, report.archive_failed, report.deleted, report.delete_failed
            ))
        );
    }
    println!();
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: String,
    timestamp: String,
    summary: RowCounts,
    results: Vec<&'a UnitRecord>,
}

#[derive(Serialize)]
struct JsonDuplicateSet {
    directory: String,
    files: Vec<String>,
}

#[derive(Serialize)]
struct JsonDuplicates {
    version: String,
    timestamp: String,
    sets: Vec<JsonDuplicateSet>,
    backup_files: Vec<String>,
}

pub fn print_records_json(records: &[&UnitRecord]) -> anyhow::Result<()> {
    let report = JsonReport {
        version: "1.0".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        summary: count_rows(records),
        results: records.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn print_duplicates_json(scan: &DuplicateScan) -> anyhow::Result<()> {
    let report = JsonDuplicates {
        version: "1.0".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sets: scan
            .sets
            .iter()
            .map(|set| JsonDuplicateSet {
                directory: set.directory.to_string_lossy().to_string(),
                files: set
                    .files
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect(),
            })
            .collect(),
        backup_files: scan
            .backup_files
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Format number with commas
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
