use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::classify;
use crate::duplicates::DuplicateScan;

/// Validation failures that block a cleanup before any file is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Scan root does not exist or is not a directory: {0}")]
    MissingScanRoot(PathBuf),
    #[error("Archive root exists but is not a directory: {0}")]
    ArchiveRootNotADirectory(PathBuf),
    #[error("Archive root must not be inside the scan root: {0}")]
    ArchiveInsideScanRoot(PathBuf),
}

/// Counters for one cleanup batch, plus every per-file failure.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub archived: usize,
    pub archive_failed: usize,
    pub deleted: usize,
    pub delete_failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn has_failures(&self) -> bool {
        self.archive_failed > 0 || self.delete_failed > 0
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.archived += other.archived;
        self.archive_failed += other.archive_failed;
        self.deleted += other.deleted;
        self.delete_failed += other.delete_failed;
        self.errors.extend(other.errors);
    }
}

/// Reject impossible cleanup configurations before anything moves. The
/// archive root does not have to exist yet, but it must not sit inside the
/// scan root (the next scan would index the archive).
pub fn validate_roots(scan_root: &Path, archive_root: &Path) -> Result<()> {
    if !scan_root.is_dir() {
        return Err(ValidationError::MissingScanRoot(scan_root.to_path_buf()).into());
    }
    if archive_root.exists() && !archive_root.is_dir() {
        return Err(ValidationError::ArchiveRootNotADirectory(archive_root.to_path_buf()).into());
    }

    let scan_abs = resolve_absolute(scan_root)?;
    let archive_abs = resolve_absolute(archive_root)?;
    if is_nested_inside(&archive_abs, &scan_abs) {
        return Err(ValidationError::ArchiveInsideScanRoot(archive_root.to_path_buf()).into());
    }
    Ok(())
}

/// Make a path absolute and fold away `.`/`..` without touching the
/// filesystem, so paths that do not exist yet can still be compared.
fn resolve_absolute(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to resolve current directory")?
            .join(path)
    };
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// Case-insensitive prefix test with a separator guard, so `root2` never
/// counts as nested inside `root`.
fn is_nested_inside(child: &Path, parent: &Path) -> bool {
    let child = classify::normalize_for_comparison(child);
    let parent = classify::normalize_for_comparison(parent);
    child == parent || child.starts_with(&format!("{parent}/"))
}

/// Pick the collision-free destination for one source file, creating the
/// archive root on first use. Destinations must be resolved one move at a
/// time: the previous move has to land before the next name is chosen.
pub fn flat_destination(archive_root: &Path, source: &Path) -> Result<PathBuf> {
    fs::create_dir_all(archive_root).with_context(|| {
        format!(
            "Failed to create archive directory: {}",
            archive_root.display()
        )
    })?;
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Source has no file name: {}", source.display()))?;
    Ok(archive_root.join(unique_name_in(archive_root, &name)))
}

fn unique_name_in(dir: &Path, name: &str) -> String {
    if !dir.join(name).exists() {
        return name.to_string();
    }
    let (stem, ext) = classify::split_stem_extension(name);
    let mut counter = 2;
    loop {
        let candidate = format!("{stem} ({counter}){ext}");
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Move one file into the flat archive, renaming on collision. Falls back to
/// copy+remove when the archive lives on another device.
pub fn move_to_archive(source: &Path, archive_root: &Path) -> Result<PathBuf> {
    let destination = flat_destination(archive_root, source)?;
    match fs::rename(source, &destination) {
        Ok(()) => Ok(destination),
        Err(_) if source.exists() => {
            fs::copy(source, &destination).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    source.display(),
                    destination.display()
                )
            })?;
            fs::remove_file(source).with_context(|| {
                format!("Failed to remove original after copy: {}", source.display())
            })?;
            Ok(destination)
        }
        Err(err) => Err(err).with_context(|| {
            format!(
                "Failed to move {} to {}",
                source.display(),
                destination.display()
            )
        }),
    }
}

/// Move every candidate into the flat archive. Per-file failures are counted
/// and recorded; the batch always runs to completion.
pub fn archive_batch(
    candidates: &[PathBuf],
    archive_root: &Path,
    dry_run: bool,
    progress: Option<&ProgressBar>,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    for source in candidates {
        if let Some(pb) = progress {
            pb.inc(1);
        }
        if dry_run {
            report.archived += 1;
            continue;
        }
        match move_to_archive(source, archive_root) {
            Ok(_) => report.archived += 1,
            Err(err) => {
                report.archive_failed += 1;
                report.errors.push((source.clone(), format!("{err:#}")));
            }
        }
    }
    report
}

/// Send backup files to the recycle bin. A file that is already gone counts
/// as deleted; anything else that fails is recorded and the batch moves on.
pub fn purge_backup_files(
    paths: &[PathBuf],
    dry_run: bool,
    progress: Option<&ProgressBar>,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    for path in paths {
        if let Some(pb) = progress {
            pb.inc(1);
        }
        if dry_run {
            report.deleted += 1;
            continue;
        }
        match trash::delete(path) {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                if path.exists() {
                    report.delete_failed += 1;
                    report.errors.push((path.clone(), format!("{err:#}")));
                } else {
                    report.deleted += 1;
                }
            }
        }
    }
    report
}

/// The whole cleanup batch: validate, purge backups, archive duplicates.
/// Validation failures abort before any mutation; everything after that is
/// per-file best effort.
pub fn run_cleanup(
    scan: &DuplicateScan,
    scan_root: &Path,
    archive_root: &Path,
    dry_run: bool,
    progress: Option<&ProgressBar>,
) -> Result<CleanupReport> {
    validate_roots(scan_root, archive_root)?;

    let mut report = purge_backup_files(&scan.backup_files, dry_run, progress);
    let candidates: Vec<PathBuf> = scan
        .sets
        .iter()
        .flat_map(|set| set.files.iter().cloned())
        .collect();
    report.merge(archive_batch(&candidates, archive_root, dry_run, progress));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::DuplicateSet;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "contents of {name}").unwrap();
        path
    }

    #[test]
    fn test_flat_destination_appends_counter_on_collision() {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        let archive = temp.path().join("archive");
        let source = write_file(&source_dir, "PUMP.ACD");

        let first = flat_destination(&archive, &source).unwrap();
        assert_eq!(first, archive.join("PUMP.ACD"));

        write_file(&archive, "PUMP.ACD");
        let second = flat_destination(&archive, &source).unwrap();
        assert_eq!(second, archive.join("PUMP (2).ACD"));

        write_file(&archive, "PUMP (2).ACD");
        let third = flat_destination(&archive, &source).unwrap();
        assert_eq!(third, archive.join("PUMP (3).ACD"));
    }

    #[test]
    fn test_flat_destination_without_extension() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("archive");
        let source = write_file(temp.path(), "NOEXT");

        fs::create_dir_all(&archive).unwrap();
        write_file(&archive, "NOEXT");
        let dest = flat_destination(&archive, &source).unwrap();
        assert_eq!(dest, archive.join("NOEXT (2)"));
    }

    #[test]
    fn test_move_to_archive_relocates_file() {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        let archive = temp.path().join("archive");
        let source = write_file(&source_dir, "PUMP.ACD");

        let dest = move_to_archive(&source, &archive).unwrap();
        assert!(!source.exists());
        assert!(dest.exists());
        assert_eq!(dest, archive.join("PUMP.ACD"));
        let content = fs::read_to_string(&dest).unwrap();
        assert!(content.contains("PUMP.ACD"));
    }

    #[test]
    fn test_archive_batch_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        let archive = temp.path().join("archive");

        let good = write_file(&source_dir, "good.ACD");
        let missing = source_dir.join("missing.ACD");

        let report = archive_batch(
            &[missing.clone(), good.clone()],
            &archive,
            false,
            None,
        );
        assert_eq!(report.archived, 1);
        assert_eq!(report.archive_failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, missing);
        assert!(report.has_failures());
        assert!(archive.join("good.ACD").exists());
    }

    #[test]
    fn test_archive_batch_dry_run_moves_nothing() {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        let archive = temp.path().join("archive");
        let source = write_file(&source_dir, "keep.ACD");

        let report = archive_batch(&[source.clone()], &archive, true, None);
        assert_eq!(report.archived, 1);
        assert!(source.exists());
        assert!(!archive.exists());
    }

    #[test]
    fn test_purge_tolerates_already_gone_files() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("already_gone.bak");

        let report = purge_backup_files(&[gone], false, None);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.delete_failed, 0);
    }

    #[test]
    fn test_purge_dry_run_only_counts() {
        let temp = TempDir::new().unwrap();
        let bak = write_file(temp.path(), "old.bak");
        let report = purge_backup_files(&[bak.clone()], true, None);
        assert_eq!(report.deleted, 1);
        assert!(bak.exists());
    }

    #[test]
    fn test_validate_roots_rejects_nested_archive() {
        let temp = TempDir::new().unwrap();
        let scan_root = temp.path().join("plants");
        fs::create_dir_all(&scan_root).unwrap();

        let nested = scan_root.join("archive");
        assert!(validate_roots(&scan_root, &nested).is_err());

        // Case differences do not hide the nesting.
        let nested_case = temp.path().join("PLANTS").join("Archive");
        assert!(validate_roots(&scan_root, &nested_case).is_err());

        // The scan root itself is not a valid archive either.
        assert!(validate_roots(&scan_root, &scan_root).is_err());

        let sibling = temp.path().join("archive");
        assert!(validate_roots(&scan_root, &sibling).is_ok());

        // A sibling whose name merely extends the root's is fine.
        let prefix_sibling = temp.path().join("plants2");
        assert!(validate_roots(&scan_root, &prefix_sibling).is_ok());
    }

    #[test]
    fn test_validate_roots_requires_scan_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("not-there");
        let archive = temp.path().join("archive");
        let err = validate_roots(&missing, &archive).unwrap_err();
        assert!(err.to_string().contains("Scan root"));
    }

    #[test]
    fn test_run_cleanup_validates_before_mutating() {
        let temp = TempDir::new().unwrap();
        let scan_root = temp.path().join("plants");
        let unit = scan_root.join("Greeley/LACT-1");
        fs::create_dir_all(&unit).unwrap();
        let a = write_file(&unit, "A.ACD");
        let b = write_file(&unit, "B.ACD");
        let bak = write_file(&unit, "old.bak");

        let scan = DuplicateScan {
            sets: vec![DuplicateSet {
                directory: unit.clone(),
                files: vec![a.clone(), b.clone()],
            }],
            backup_files: vec![bak.clone()],
        };

        // Nested archive root: fatal, nothing moves.
        let nested = scan_root.join("archive");
        assert!(run_cleanup(&scan, &scan_root, &nested, false, None).is_err());
        assert!(a.exists());
        assert!(b.exists());
        assert!(bak.exists());

        // Valid archive root: both duplicates move.
        let archive = temp.path().join("archive");
        let report = run_cleanup(&scan, &scan_root, &archive, false, None).unwrap();
        assert_eq!(report.archived, 2);
        assert_eq!(report.archive_failed, 0);
        assert!(archive.join("A.ACD").exists());
        assert!(archive.join("B.ACD").exists());
        assert!(!a.exists());
        assert!(!b.exists());
    }
}
