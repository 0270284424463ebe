use std::path::Path;

use chrono::{DateTime, Datelike, Local};

/// Check if a path carries the given extension, case-insensitively.
/// The configured value may be written with or without a leading dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    let want = ext.trim_start_matches('.');
    match path.extension() {
        Some(actual) => actual.to_string_lossy().eq_ignore_ascii_case(want),
        None => want.is_empty(),
    }
}

/// Check if a file name contains "bak" anywhere, case-insensitively.
///
/// Deliberately not anchored to the suffix: shop-floor naming is messy
/// ("PUMP_bak2.ACD", "BAKUP.RSS", "copy.bak" all count).
pub fn is_backup_file(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_lowercase().contains("bak"),
        None => false,
    }
}

/// Check if a path is a qualifying program file: one of the configured
/// primary extensions, and not a backup file.
pub fn is_program_file(path: &Path, program_exts: &[String]) -> bool {
    program_exts.iter().any(|ext| has_extension(path, ext)) && !is_backup_file(path)
}

/// Split a directory path relative to the scan root into (location, unit).
///
/// The first segment is the location, the second the unit; anything deeper is
/// ignored. Missing segments come back as empty strings.
pub fn extract_location_unit(relative_dir: &str) -> (String, String) {
    let mut parts = relative_dir
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty());
    let location = parts.next().unwrap_or("").to_string();
    let unit = parts.next().unwrap_or("").to_string();
    (location, unit)
}

/// Derive the calendar-quarter label for a timestamp, e.g. July 2025 -> "25-Q3".
pub fn to_quarter(timestamp: DateTime<Local>) -> String {
    let quarter = ((timestamp.month() - 1) / 3) + 1;
    format!("{:02}-Q{}", timestamp.year() % 100, quarter)
}

/// Strip a trailing `" [<anything> in folder]"` count annotation from a display
/// string, returning the text before `" ["`. Anything else passes through
/// unchanged.
///
/// Only meaningful for single-file displays; multi-file rows carry a synthetic
/// label with no recoverable filename.
pub fn strip_count_suffix(display: &str) -> String {
    if let Some(idx) = display.rfind(" [") {
        if idx > 0 && display.to_lowercase().ends_with(" in folder]") {
            return display[..idx].to_string();
        }
    }
    display.to_string()
}

/// Split a file name into (stem, extension-with-dot) for suffix insertion.
/// A name without a dot, or with only a leading dot, has no extension.
pub fn split_stem_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Normalize a path string for comparison: lowercase, forward slashes, no
/// trailing separator. The trees this tool indexes live on Windows shares, so
/// path equality is case-insensitive on every platform.
pub fn normalize_for_comparison(path: &Path) -> String {
    let mut normalized = path.display().to_string().replace('\\', "/").to_lowercase();
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Case-insensitive directory equality on the normalized path text.
pub fn same_directory(a: &Path, b: &Path) -> bool {
    normalize_for_comparison(a) == normalize_for_comparison(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_has_extension_ignores_case_and_dot() {
        assert!(has_extension(Path::new("PUMP_01.ACD"), "acd"));
        assert!(has_extension(Path::new("pump_01.acd"), ".ACD"));
        assert!(has_extension(Path::new("panel.MER"), "mer"));
        assert!(!has_extension(Path::new("pump_01.acd"), "rss"));
        assert!(!has_extension(Path::new("no_extension"), "acd"));
    }

    #[test]
    fn test_is_backup_file_matches_substring() {
        assert!(is_backup_file(Path::new("file.BAK")));
        assert!(is_backup_file(Path::new("file_bak.txt")));
        assert!(is_backup_file(Path::new("BAKUP.ACD")));
        assert!(!is_backup_file(Path::new("back.ACD")));
        assert!(!is_backup_file(Path::new("program.RSS")));
    }

    #[test]
    fn test_is_program_file_excludes_backups() {
        let exts = vec!["acd".to_string(), "rss".to_string()];
        assert!(is_program_file(Path::new("unit.ACD"), &exts));
        assert!(is_program_file(Path::new("unit.rss"), &exts));
        assert!(!is_program_file(Path::new("unit_bak.ACD"), &exts));
        assert!(!is_program_file(Path::new("unit.MER"), &exts));
    }

    #[test]
    fn test_extract_location_unit() {
        assert_eq!(extract_location_unit(""), (String::new(), String::new()));
        assert_eq!(
            extract_location_unit("A/B/C"),
            ("A".to_string(), "B".to_string())
        );
        assert_eq!(
            extract_location_unit("Greeley\\LACT-7"),
            ("Greeley".to_string(), "LACT-7".to_string())
        );
        assert_eq!(
            extract_location_unit("OnlyLocation"),
            ("OnlyLocation".to_string(), String::new())
        );
        assert_eq!(
            extract_location_unit("//double//separators//deep"),
            ("double".to_string(), "separators".to_string())
        );
    }

    #[test]
    fn test_to_quarter_is_quarter_stable() {
        let feb = Local.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap();
        let mar = Local.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let apr = Local.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let jul = Local.with_ymd_and_hms(2025, 7, 20, 8, 30, 0).unwrap();
        assert_eq!(to_quarter(feb), "25-Q1");
        assert_eq!(to_quarter(mar), "25-Q1");
        assert_eq!(to_quarter(apr), "25-Q2");
        assert_eq!(to_quarter(jul), "25-Q3");
    }

    #[test]
    fn test_strip_count_suffix() {
        assert_eq!(
            strip_count_suffix("PUMP_01.ACD [3 in folder]"),
            "PUMP_01.ACD"
        );
        assert_eq!(
            strip_count_suffix("PUMP_01.ACD [3 IN FOLDER]"),
            "PUMP_01.ACD"
        );
        assert_eq!(strip_count_suffix("PUMP_01.ACD"), "PUMP_01.ACD");
        assert_eq!(
            strip_count_suffix("PUMP_01.ACD (plus 2 bak files)"),
            "PUMP_01.ACD (plus 2 bak files)"
        );
        // Annotation alone, nothing before it: unchanged.
        assert_eq!(strip_count_suffix(" [3 in folder]"), " [3 in folder]");
    }

    #[test]
    fn test_split_stem_extension() {
        assert_eq!(split_stem_extension("unit.ACD"), ("unit", ".ACD"));
        assert_eq!(split_stem_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_stem_extension("noext"), ("noext", ""));
        assert_eq!(split_stem_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_same_directory_is_case_insensitive() {
        assert!(same_directory(
            Path::new("C:\\Plants\\Greeley"),
            Path::new("c:/plants/greeley")
        ));
        assert!(same_directory(
            Path::new("/srv/plants/greeley/"),
            Path::new("/srv/plants/Greeley")
        ));
        assert!(!same_directory(
            Path::new("/srv/plants/greeley"),
            Path::new("/srv/plants/evans")
        ));
    }
}
