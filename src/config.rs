use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,

    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// Root of the location/unit tree to scan. Empty means unset.
    #[serde(default)]
    pub scan_root: String,

    /// Flat directory that receives archived duplicates. Empty means unset.
    #[serde(default)]
    pub archive_root: String,

    /// Where the scan state JSON lives. Empty means the per-user default.
    #[serde(default)]
    pub state_dir: String,

    /// Holding area for files from decommissioned units. Empty means unset.
    #[serde(default)]
    pub decommission_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(default = "default_program_extensions")]
    pub program: Vec<String>,

    #[serde(default = "default_quick_panel_extension")]
    pub quick_panel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            extensions: Extensions::default(),
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            scan_root: String::new(),
            archive_root: String::new(),
            state_dir: String::new(),
            decommission_dir: String::new(),
        }
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            program: default_program_extensions(),
            quick_panel: default_quick_panel_extension(),
        }
    }
}

fn default_program_extensions() -> Vec<String> {
    vec!["acd".to_string(), "rss".to_string()]
}

fn default_quick_panel_extension() -> String {
    "mer".to_string()
}

impl Config {
    /// Get the config file path: %APPDATA%\unitscan\config.toml
    pub fn config_path() -> Result<PathBuf> {
        let appdata =
            std::env::var("APPDATA").context("APPDATA environment variable not set")?;
        let config_dir = PathBuf::from(appdata).join("unitscan");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file or return defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) if path.exists() => match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config file: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, toml).context("Failed to write config file")?;

        Ok(())
    }

    pub fn scan_root(&self) -> Option<PathBuf> {
        path_or_none(&self.paths.scan_root)
    }

    pub fn archive_root(&self) -> Option<PathBuf> {
        path_or_none(&self.paths.archive_root)
    }

    pub fn state_dir(&self) -> Option<PathBuf> {
        path_or_none(&self.paths.state_dir)
    }

    pub fn decommission_dir(&self) -> Option<PathBuf> {
        path_or_none(&self.paths.decommission_dir)
    }
}

fn path_or_none(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
