use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classify;
use crate::config::Extensions;
use crate::output::OutputMode;
use crate::progress;
use crate::state::{self, ProgramPresence, QuickPanelPresence, UnitRecord};

/// Everything one scan produces: ordered unit records plus the flat inventory
/// of qualifying program files under the root.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub records: Vec<UnitRecord>,
    pub program_inventory: Vec<PathBuf>,
    pub directories_scanned: usize,
}

/// Walk the root once and classify every directory into unit records.
///
/// Read-only. Any enumeration failure aborts the whole scan with a single
/// error; the caller keeps its previous aggregate in that case. The walk is
/// sorted by file name so "first program file in a directory" is a stable,
/// testable choice.
pub fn scan_root(root: &Path, extensions: &Extensions, mode: OutputMode) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(anyhow!(
            "Scan root does not exist or is not a directory: {}",
            root.display()
        ));
    }

    let spinner = if mode != OutputMode::Quiet {
        Some(progress::create_spinner("Indexing directory tree..."))
    } else {
        None
    };

    let walked = collect_tree(root, &extensions.program);
    if let Some(sp) = spinner {
        progress::finish_and_clear(&sp);
    }
    let (directories, inventory) = walked?;

    let bar = if mode != OutputMode::Quiet {
        Some(progress::create_progress_bar(
            directories.len() as u64,
            "Classifying directories...",
        ))
    } else {
        None
    };

    let classified = build_records(root, &directories, &inventory, extensions, bar.as_ref());
    if let Some(pb) = bar {
        progress::finish_and_clear(&pb);
    }
    let mut records = classified?;

    records.sort_by_key(|r| {
        (
            r.location.to_lowercase(),
            r.unit.to_lowercase(),
            r.program_file.to_lowercase(),
        )
    });

    Ok(ScanOutcome {
        records,
        program_inventory: inventory,
        directories_scanned: directories.len(),
    })
}

/// One pass over the tree: every directory (root included) plus every
/// qualifying program file, both in sorted walk order.
fn collect_tree(root: &Path, program_exts: &[String]) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut directories = Vec::new();
    let mut inventory = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to enumerate directory tree under {}", root.display())
        })?;
        if entry.file_type().is_dir() {
            directories.push(entry.into_path());
        } else if entry.file_type().is_file()
            && classify::is_program_file(entry.path(), program_exts)
        {
            inventory.push(entry.into_path());
        }
    }

    Ok((directories, inventory))
}

fn build_records(
    root: &Path,
    directories: &[PathBuf],
    inventory: &[PathBuf],
    extensions: &Extensions,
    progress: Option<&ProgressBar>,
) -> Result<Vec<UnitRecord>> {
    let mut records = Vec::new();
    for dir in directories {
        if let Some(pb) = progress {
            pb.inc(1);
        }
        if let Some(record) = classify_directory(dir, root, inventory, extensions)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Classify one directory against the program-file inventory. Directories
/// with neither program nor quick-panel files produce no record.
fn classify_directory(
    dir: &Path,
    root: &Path,
    inventory: &[PathBuf],
    extensions: &Extensions,
) -> Result<Option<UnitRecord>> {
    let files_in_dir: Vec<&PathBuf> = inventory
        .iter()
        .filter(|file| {
            file.parent()
                .map(|parent| classify::same_directory(parent, dir))
                .unwrap_or(false)
        })
        .collect();
    let program_count = files_in_dir.len();

    let mut mer_files: Vec<PathBuf> = Vec::new();
    let mut bak_count = 0usize;
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to list directory: {}", dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to list directory: {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect entry in {}", dir.display()))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        // A bak-named .MER counts in both lists, like any other bak file.
        if classify::has_extension(&path, &extensions.quick_panel) {
            mer_files.push(path.clone());
        }
        if classify::is_backup_file(&path) {
            bak_count += 1;
        }
    }

    let relative = dir.strip_prefix(root).unwrap_or_else(|_| Path::new(""));
    let (location, unit) = classify::extract_location_unit(&relative.to_string_lossy());

    if program_count > 0 {
        let presence = if program_count == 1 {
            ProgramPresence::Single(file_name_string(files_in_dir[0]))
        } else {
            ProgramPresence::Multiple(program_count)
        };
        // First inventory file in walk order stands in for the directory.
        let modified = file_modified(files_in_dir[0])?;
        let quick_panel = quick_panel_presence(&mer_files)?;
        Ok(Some(UnitRecord {
            location,
            unit,
            program_file: presence.display(bak_count),
            program_file_modified: modified,
            quick_panel_file: quick_panel.display(),
            quick_panel_file_modified: quick_panel.modified(),
            quarter: classify::to_quarter(modified),
            directory_path: dir.to_path_buf(),
            program_count_in_dir: presence.count(),
        }))
    } else if !mer_files.is_empty() {
        let quick_panel = quick_panel_presence(&mer_files)?;
        Ok(Some(UnitRecord {
            location,
            unit,
            program_file: ProgramPresence::Missing.display(bak_count),
            program_file_modified: state::missing_timestamp(),
            quick_panel_file: quick_panel.display(),
            quick_panel_file_modified: quick_panel.modified(),
            quarter: String::new(),
            directory_path: dir.to_path_buf(),
            program_count_in_dir: 0,
        }))
    } else {
        Ok(None)
    }
}

fn quick_panel_presence(mer_files: &[PathBuf]) -> Result<QuickPanelPresence> {
    if mer_files.len() > 1 {
        Ok(QuickPanelPresence::Multiple(mer_files.len()))
    } else if let Some(sole) = mer_files.first() {
        Ok(QuickPanelPresence::Single {
            name: file_name_string(sole),
            modified: file_modified(sole)?,
        })
    } else {
        Ok(QuickPanelPresence::Missing)
    }
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn file_modified(path: &Path) -> Result<DateTime<Local>> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    let modified = metadata
        .modified()
        .with_context(|| format!("Failed to read modified time: {}", path.display()))?;
    Ok(modified.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        MISSING_PROGRAM_LABEL, MISSING_QUICK_PANEL_LABEL, MULTIPLE_PROGRAMS_LABEL,
        MULTIPLE_QUICK_PANELS_LABEL,
    };
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "contents of {name}").unwrap();
        path
    }

    fn make_dirs(root: &Path, rel: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_scan_classifies_single_multiple_and_missing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let lact1 = make_dirs(root, "Greeley/LACT-1");
        write_file(&lact1, "PUMP_01.ACD");
        write_file(&lact1, "panel.MER");

        let lact2 = make_dirs(root, "Greeley/LACT-2");
        write_file(&lact2, "A.ACD");
        write_file(&lact2, "B.ACD");
        write_file(&lact2, "panel.MER");

        let lact3 = make_dirs(root, "Evans/LACT-3");
        write_file(&lact3, "orphan.MER");

        make_dirs(root, "Evans/empty");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.program_inventory.len(), 3);

        // Sorted by (location, unit, programFile): Evans before Greeley.
        let missing = &outcome.records[0];
        assert_eq!(missing.location, "Evans");
        assert_eq!(missing.unit, "LACT-3");
        assert_eq!(missing.program_file, MISSING_PROGRAM_LABEL);
        assert_eq!(missing.program_file_modified, state::missing_timestamp());
        assert_eq!(missing.quarter, "");
        assert_eq!(missing.program_count_in_dir, 0);
        assert_eq!(missing.quick_panel_file, "orphan.MER");
        assert!(missing.quick_panel_file_modified.is_some());

        let single = &outcome.records[1];
        assert_eq!(single.location, "Greeley");
        assert_eq!(single.unit, "LACT-1");
        assert_eq!(single.program_file, "PUMP_01.ACD");
        assert_eq!(single.program_count_in_dir, 1);
        assert_eq!(single.quarter, classify::to_quarter(single.program_file_modified));
        assert_eq!(single.quick_panel_file, "panel.MER");

        let multiple = &outcome.records[2];
        assert_eq!(multiple.unit, "LACT-2");
        assert_eq!(multiple.program_file, MULTIPLE_PROGRAMS_LABEL);
        assert_eq!(multiple.program_count_in_dir, 2);
        assert_eq!(multiple.quick_panel_file, "panel.MER");
        assert!(multiple.quick_panel_file_modified.is_some());
    }

    #[test]
    fn test_scan_annotates_bak_clutter() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = make_dirs(root, "Greeley/LACT-4");
        write_file(&unit, "PUMP.ACD");
        write_file(&unit, "PUMP_bak.ACD");
        write_file(&unit, "old.bak");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        // Backup-named .ACD files never count as program files.
        assert_eq!(record.program_count_in_dir, 1);
        assert_eq!(record.program_file, "PUMP.ACD (plus 2 bak files)");
        assert_eq!(record.quick_panel_file, MISSING_QUICK_PANEL_LABEL);
        assert!(record.quick_panel_file_modified.is_none());
    }

    #[test]
    fn test_scan_single_bak_annotation_is_singular() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = make_dirs(root, "Greeley/LACT-5");
        write_file(&unit, "PUMP.RSS");
        write_file(&unit, "copy.bak");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        assert_eq!(outcome.records[0].program_file, "PUMP.RSS (plus 1 bak file)");
    }

    #[test]
    fn test_scan_multiple_quick_panels_drop_timestamp() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = make_dirs(root, "Greeley/LACT-6");
        write_file(&unit, "PUMP.ACD");
        write_file(&unit, "panel_v1.MER");
        write_file(&unit, "panel_v2.MER");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        let record = &outcome.records[0];
        assert_eq!(record.quick_panel_file, MULTIPLE_QUICK_PANELS_LABEL);
        assert!(record.quick_panel_file_modified.is_none());
    }

    #[test]
    fn test_scan_first_file_by_name_supplies_timestamp() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = make_dirs(root, "Greeley/LACT-7");
        // Written second, but alphabetically first: the walk is sorted, so
        // AAA.ACD is the representative file.
        write_file(&unit, "ZZZ.ACD");
        let first = write_file(&unit, "AAA.ACD");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        let record = &outcome.records[0];
        assert_eq!(record.program_file, MULTIPLE_PROGRAMS_LABEL);
        assert_eq!(record.program_file_modified, file_modified(&first).unwrap());
    }

    #[test]
    fn test_scan_root_level_files_have_blank_location() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "stray.ACD");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].location, "");
        assert_eq!(outcome.records[0].unit, "");
        assert_eq!(outcome.records[0].program_file, "stray.ACD");
    }

    #[test]
    fn test_scan_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("not-there");
        let result = scan_root(&gone, &Extensions::default(), OutputMode::Quiet);
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_ignores_other_extensions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = make_dirs(root, "Greeley/LACT-8");
        write_file(&unit, "readme.txt");
        write_file(&unit, "photo.jpg");

        let outcome = scan_root(root, &Extensions::default(), OutputMode::Quiet).unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.program_inventory.is_empty());
        // Root, Greeley, LACT-8.
        assert_eq!(outcome.directories_scanned, 3);
    }
}
