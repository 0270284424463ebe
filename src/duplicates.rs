use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classify;
use crate::config::Extensions;
use crate::scanner;
use crate::state::UnitRecord;

/// One directory holding more than one qualifying program file. Files are
/// ordered ascending by last-write time for operator review; every one of
/// them is an archive candidate.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Duplicate sets plus the independent backup-file collection for one root.
#[derive(Debug, Clone, Default)]
pub struct DuplicateScan {
    pub sets: Vec<DuplicateSet>,
    pub backup_files: Vec<PathBuf>,
}

impl DuplicateScan {
    pub fn candidate_count(&self) -> usize {
        self.sets.iter().map(|set| set.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.backup_files.is_empty()
    }
}

/// Find directories whose rows claim program files and that hold more than
/// one on disk right now.
///
/// The directory listing is the ground truth; display strings are never
/// parsed back into paths. A directory that vanished since the scan simply
/// yields nothing.
pub fn detect(results: &[UnitRecord], extensions: &Extensions) -> Result<Vec<DuplicateSet>> {
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut sets = Vec::new();

    for record in results {
        if record.program_count_in_dir == 0 {
            continue;
        }
        let dir = &record.directory_path;
        if seen.iter().any(|known| classify::same_directory(known, dir)) {
            continue;
        }
        seen.push(dir.clone());
        if !dir.is_dir() {
            continue;
        }

        let files = list_program_files(dir, &extensions.program)?;
        if files.len() > 1 {
            sets.push(DuplicateSet {
                directory: dir.clone(),
                files: sort_by_modified(files)?,
            });
        }
    }

    Ok(sets)
}

/// Every backup-named file anywhere under the root. Deletion candidates,
/// independent of duplicate grouping.
pub fn collect_backup_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut backups = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to enumerate directory tree under {}", root.display())
        })?;
        if entry.file_type().is_file() && classify::is_backup_file(entry.path()) {
            backups.push(entry.into_path());
        }
    }
    Ok(backups)
}

/// Both cleanup inputs at once: duplicate sets from the saved results and the
/// backup files under the root.
pub fn scan_for_cleanup(
    results: &[UnitRecord],
    root: &Path,
    extensions: &Extensions,
) -> Result<DuplicateScan> {
    Ok(DuplicateScan {
        sets: detect(results, extensions)?,
        backup_files: collect_backup_files(root)?,
    })
}

fn list_program_files(dir: &Path, program_exts: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to list directory: {}", dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to list directory: {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect entry in {}", dir.display()))?;
        if file_type.is_file() && classify::is_program_file(&entry.path(), program_exts) {
            files.push(entry.path());
        }
    }
    Ok(files)
}

fn sort_by_modified(files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut with_times: Vec<(PathBuf, DateTime<Local>)> = Vec::with_capacity(files.len());
    for file in files {
        let modified = scanner::file_modified(&file)?;
        with_times.push((file, modified));
    }
    with_times.sort_by_key(|(_, modified)| *modified);
    Ok(with_times.into_iter().map(|(file, _)| file).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;
    use crate::scanner::scan_root;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "contents of {name}").unwrap();
        path
    }

    fn scan(root: &Path) -> Vec<UnitRecord> {
        scan_root(root, &Extensions::default(), OutputMode::Quiet)
            .unwrap()
            .records
    }

    #[test]
    fn test_detect_flags_directories_with_two_or_more() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let crowded = root.join("Greeley/LACT-1");
        fs::create_dir_all(&crowded).unwrap();
        write_file(&crowded, "old.ACD");
        write_file(&crowded, "new.ACD");
        write_file(&crowded, "newest.RSS");

        let lone = root.join("Greeley/LACT-2");
        fs::create_dir_all(&lone).unwrap();
        write_file(&lone, "only.ACD");

        let sets = detect(&scan(root), &Extensions::default()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].directory, crowded);
        assert_eq!(sets[0].files.len(), 3);

        // Ascending by last-write time.
        let times: Vec<_> = sets[0]
            .files
            .iter()
            .map(|f| scanner::file_modified(f).unwrap())
            .collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_detect_ignores_backup_named_programs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = root.join("Greeley/LACT-3");
        fs::create_dir_all(&unit).unwrap();
        write_file(&unit, "PUMP.ACD");
        write_file(&unit, "PUMP_bak.ACD");

        let sets = detect(&scan(root), &Extensions::default()).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn test_detect_trusts_disk_over_stale_records() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = root.join("Greeley/LACT-4");
        fs::create_dir_all(&unit).unwrap();
        write_file(&unit, "PUMP.ACD");

        let records = scan(root);
        assert_eq!(records[0].program_count_in_dir, 1);

        // A second file appears after the scan: the live listing wins.
        write_file(&unit, "PUMP_rev2.ACD");
        let sets = detect(&records, &Extensions::default()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].files.len(), 2);
    }

    #[test]
    fn test_detect_skips_vanished_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = root.join("Greeley/LACT-5");
        fs::create_dir_all(&unit).unwrap();
        write_file(&unit, "A.ACD");
        write_file(&unit, "B.ACD");

        let records = scan(root);
        fs::remove_dir_all(&unit).unwrap();

        let sets = detect(&records, &Extensions::default()).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn test_collect_backup_files_walks_everywhere() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let deep = root.join("Greeley/LACT-6/history");
        fs::create_dir_all(&deep).unwrap();
        write_file(&deep, "PUMP_bak.ACD");
        write_file(root, "top.bak");
        write_file(&deep, "keep.ACD");

        let mut backups = collect_backup_files(root).unwrap();
        backups.sort();
        assert_eq!(backups.len(), 2);
        assert!(backups.iter().any(|p| p.ends_with("top.bak")));
        assert!(backups.iter().any(|p| p.ends_with("PUMP_bak.ACD")));
    }

    #[test]
    fn test_scan_for_cleanup_combines_both() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let unit = root.join("Greeley/LACT-7");
        fs::create_dir_all(&unit).unwrap();
        write_file(&unit, "A.ACD");
        write_file(&unit, "B.ACD");
        write_file(&unit, "A_bak.ACD");

        let records = scan(root);
        let cleanup = scan_for_cleanup(&records, root, &Extensions::default()).unwrap();
        assert_eq!(cleanup.sets.len(), 1);
        assert_eq!(cleanup.candidate_count(), 2);
        assert_eq!(cleanup.backup_files.len(), 1);
        assert!(!cleanup.is_empty());
    }
}
