use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify;

/// Display label for a directory holding more than one program file.
pub const MULTIPLE_PROGRAMS_LABEL: &str = "Multiple program files";
/// Display label for a directory with quick-panel files but no program file.
pub const MISSING_PROGRAM_LABEL: &str = "Program file not found";
/// Display label for a directory holding more than one quick-panel file.
pub const MULTIPLE_QUICK_PANELS_LABEL: &str = "Multiple MER files";
/// Display label for a directory with no quick-panel file.
pub const MISSING_QUICK_PANEL_LABEL: &str = "MER file not found";
/// Prefix of legacy backup-count summary rows; excluded from missing-MER
/// filtering when present in an old state file.
pub const BAK_SUMMARY_PREFIX: &str = "[Total files with 'bak' in name:";

const STATE_FILE_NAME: &str = "state.json";

/// Sentinel timestamp for rows without a program file.
pub fn missing_timestamp() -> DateTime<Local> {
    DateTime::<Utc>::UNIX_EPOCH.with_timezone(&Local)
}

/// How many program files a directory holds, carrying the literal name only
/// when it is recoverable. Display text is rendered from this, never parsed
/// back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramPresence {
    Single(String),
    Multiple(usize),
    Missing,
}

impl ProgramPresence {
    pub fn count(&self) -> usize {
        match self {
            ProgramPresence::Single(_) => 1,
            ProgramPresence::Multiple(count) => *count,
            ProgramPresence::Missing => 0,
        }
    }

    /// Render the display string, annotating backup-file clutter when present.
    pub fn display(&self, bak_count: usize) -> String {
        let base = match self {
            ProgramPresence::Single(name) => name.clone(),
            ProgramPresence::Multiple(_) => MULTIPLE_PROGRAMS_LABEL.to_string(),
            ProgramPresence::Missing => return MISSING_PROGRAM_LABEL.to_string(),
        };
        if bak_count > 0 {
            format!(
                "{} (plus {} bak file{})",
                base,
                bak_count,
                if bak_count > 1 { "s" } else { "" }
            )
        } else {
            base
        }
    }
}

/// Quick-panel (.MER) presence for a directory. The timestamp survives only
/// when exactly one file exists.
#[derive(Debug, Clone, PartialEq)]
pub enum QuickPanelPresence {
    Single {
        name: String,
        modified: DateTime<Local>,
    },
    Multiple(usize),
    Missing,
}

impl QuickPanelPresence {
    pub fn display(&self) -> String {
        match self {
            QuickPanelPresence::Single { name, .. } => name.clone(),
            QuickPanelPresence::Multiple(_) => MULTIPLE_QUICK_PANELS_LABEL.to_string(),
            QuickPanelPresence::Missing => MISSING_QUICK_PANEL_LABEL.to_string(),
        }
    }

    pub fn modified(&self) -> Option<DateTime<Local>> {
        match self {
            QuickPanelPresence::Single { modified, .. } => Some(*modified),
            _ => None,
        }
    }
}

/// One indexed unit directory. Field names mirror the persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub location: String,
    pub unit: String,
    pub program_file: String,
    pub program_file_modified: DateTime<Local>,
    pub quick_panel_file: String,
    pub quick_panel_file_modified: Option<DateTime<Local>>,
    pub quarter: String,
    pub directory_path: PathBuf,
    pub program_count_in_dir: usize,
}

impl UnitRecord {
    pub fn is_program_missing(&self) -> bool {
        self.program_count_in_dir == 0
    }

    /// True when the row has no usable quick-panel timestamp. Rows holding
    /// several quick-panel files count as missing here, matching the display
    /// contract (no single file to point at).
    pub fn is_quick_panel_missing(&self) -> bool {
        self.quick_panel_file_modified.is_none()
            || self.quick_panel_file == MISSING_QUICK_PANEL_LABEL
    }

    /// Legacy state files may carry synthetic backup-count summary rows.
    pub fn is_bak_summary(&self) -> bool {
        self.program_file.starts_with(BAK_SUMMARY_PREFIX)
    }

    /// Resolve the sole program file's full path for single-file rows.
    /// Multi-file rows carry a synthetic label and return None; so do rows
    /// whose display text no longer names a program file (e.g. annotated with
    /// a bak count).
    pub fn single_program_path(&self, program_exts: &[String]) -> Option<PathBuf> {
        if self.program_count_in_dir != 1 {
            return None;
        }
        let name = classify::strip_count_suffix(&self.program_file);
        let candidate = self.directory_path.join(name);
        if classify::is_program_file(&candidate, program_exts) {
            Some(candidate)
        } else {
            None
        }
    }
}

/// The persisted whole: ordered scan results plus free-text unit notes.
///
/// Results are replaced wholesale by a scan; notes survive scans and change
/// only through the note operations below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(default)]
    pub results: Vec<UnitRecord>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl Aggregate {
    pub fn note_key(location: &str, unit: &str) -> String {
        format!("{}::{}", location, unit)
    }

    pub fn note_for(&self, location: &str, unit: &str) -> Option<&str> {
        self.notes
            .get(&Self::note_key(location, unit))
            .map(String::as_str)
    }

    /// Store a note for a unit. Whitespace-only text clears the entry instead
    /// of storing an empty note.
    pub fn set_note(&mut self, location: &str, unit: &str, text: &str) {
        let key = Self::note_key(location, unit);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.notes.remove(&key);
        } else {
            self.notes.insert(key, trimmed.to_string());
        }
    }

    pub fn clear_note(&mut self, location: &str, unit: &str) {
        self.notes.remove(&Self::note_key(location, unit));
    }

    pub fn replace_results(&mut self, results: Vec<UnitRecord>) {
        self.results = results;
    }
}

/// JSON persistence for the aggregate, one document per state directory.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn at_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STATE_FILE_NAME),
        }
    }

    /// Default state directory: %APPDATA%\unitscan
    pub fn default_dir() -> Result<PathBuf> {
        let appdata =
            std::env::var("APPDATA").context("APPDATA environment variable not set")?;
        Ok(PathBuf::from(appdata).join("unitscan"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the aggregate. A missing file is an empty aggregate; stored order
    /// is preserved as-is (the scanner is the only writer of result order).
    pub fn load(&self) -> Result<Aggregate> {
        if !self.path.exists() {
            return Ok(Aggregate::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;
        let aggregate = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;
        Ok(aggregate)
    }

    pub fn save(&self, aggregate: &Aggregate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }
        let json =
            serde_json::to_string_pretty(aggregate).context("Failed to serialize state")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        Ok(())
    }
}
