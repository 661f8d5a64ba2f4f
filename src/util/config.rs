//! Configuration file support for xcprobe.
//!
//! xcprobe supports two configuration file locations:
//! - Global: `~/.xcprobe/config.toml` - User-wide defaults
//! - Project: `.xcprobe/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// xcprobe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for `xcprobe check` and `xcprobe targets`
    pub check: CheckConfig,

    /// Defaults for `xcprobe scan`
    pub scan: ScanConfig,
}

/// Source-membership lookup defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Path to `project.pbxproj`
    pub project: Option<PathBuf>,

    /// Source file to look up (e.g., WatchApp.swift)
    pub file: Option<String>,

    /// Target expected to compile it (e.g., WatchApp)
    pub target: Option<String>,
}

/// Signature scan defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory to scan (e.g., a DerivedData products directory)
    pub root: Option<PathBuf>,

    /// Byte patterns as hex strings; empty means the built-in set
    pub patterns: Vec<String>,

    /// Also look at files whose name starts with `.`
    pub include_hidden: bool,

    /// Follow symbolic links while walking
    pub follow_links: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Check settings
        if other.check.project.is_some() {
            self.check.project = other.check.project;
        }
        if other.check.file.is_some() {
            self.check.file = other.check.file;
        }
        if other.check.target.is_some() {
            self.check.target = other.check.target;
        }

        // Scan settings
        if other.scan.root.is_some() {
            self.scan.root = other.scan.root;
        }
        if !other.scan.patterns.is_empty() {
            self.scan.patterns = other.scan.patterns;
        }
        if other.scan.include_hidden {
            self.scan.include_hidden = true;
        }
        if other.scan.follow_links {
            self.scan.follow_links = true;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xcprobe/config.toml)
/// 2. Global config (~/.xcprobe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Load the configuration that applies to `cwd`.
pub fn load_config_for(cwd: &Path) -> Config {
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(cwd))
}

/// Get the global xcprobe config directory (~/.xcprobe).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".xcprobe"))
}

/// Get the global config path (~/.xcprobe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.xcprobe/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xcprobe").join("config.toml")
}
