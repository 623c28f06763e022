//! Configuration management for the source resolver.
//!
//! Loads configuration from TOML files and provides runtime defaults. The
//! allow/deny lists and the title rule table live here so they can be
//! replaced wholesale in tests and by users.

use crate::grouper::{default_title_rules, TitleRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Why a config file could not be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub apps: AppsConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub strategies: StrategiesConfig,

    #[serde(default)]
    pub grouping: GroupingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppsConfig {
    /// Recognized productivity/communication applications
    #[serde(default = "default_important_apps")]
    pub important_apps: Vec<String>,

    /// Apps titling windows `file - Project`; only the project is shown
    #[serde(default = "default_project_title_apps")]
    pub project_title_apps: Vec<String>,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            important_apps: default_important_apps(),
            project_title_apps: default_project_title_apps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Owner names to drop (supports glob wildcards)
    #[serde(default = "default_denied_apps")]
    pub denied_apps: Vec<String>,

    /// Process names of the host application itself
    #[serde(default)]
    pub host_app_names: Vec<String>,

    /// Windows narrower than this are not content windows
    #[serde(default = "default_min_dimension")]
    pub min_width: f64,

    #[serde(default = "default_min_dimension")]
    pub min_height: f64,

    /// Layers above this are system overlays
    #[serde(default = "default_max_layer")]
    pub max_layer: i64,

    /// Untitled windows from unknown apps survive only above this size
    #[serde(default = "default_large_window_width")]
    pub large_window_width: f64,

    #[serde(default = "default_large_window_height")]
    pub large_window_height: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            denied_apps: default_denied_apps(),
            host_app_names: Vec::new(),
            min_width: default_min_dimension(),
            min_height: default_min_dimension(),
            max_layer: default_max_layer(),
            large_window_width: default_large_window_width(),
            large_window_height: default_large_window_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategiesConfig {
    /// Enable the window-server helper process
    #[serde(default = "default_true")]
    pub auxiliary_enabled: bool,

    /// Enable the System Events fallback
    #[serde(default = "default_true")]
    pub scripted_enabled: bool,

    /// Interpreter used to run the helper script
    #[serde(default = "default_python_interpreter")]
    pub python_interpreter: String,

    /// Path to osascript
    #[serde(default = "default_osascript_path")]
    pub osascript_path: String,

    /// Deadline for a single strategy, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        Self {
            auxiliary_enabled: true,
            scripted_enabled: true,
            python_interpreter: default_python_interpreter(),
            osascript_path: default_osascript_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Trailing title segments at or above this length are not app names
    #[serde(default = "default_name_length_cap")]
    pub name_length_cap: usize,

    /// Raw titles longer than this are shortened to their first segment
    #[serde(default = "default_long_title_threshold")]
    pub long_title_threshold: usize,

    /// Named-application rules, highest priority first
    #[serde(default = "default_title_rules")]
    pub rules: Vec<TitleRule>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            name_length_cap: default_name_length_cap(),
            long_title_threshold: default_long_title_threshold(),
            rules: default_title_rules(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_dimension() -> f64 {
    50.0
}

fn default_max_layer() -> i64 {
    200
}

fn default_large_window_width() -> f64 {
    300.0
}

fn default_large_window_height() -> f64 {
    200.0
}

fn default_python_interpreter() -> String {
    "python3".to_string()
}

fn default_osascript_path() -> String {
    "osascript".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_name_length_cap() -> usize {
    30
}

fn default_long_title_threshold() -> usize {
    50
}

fn default_denied_apps() -> Vec<String> {
    vec!["Finder".to_string()]
}

fn default_project_title_apps() -> Vec<String> {
    vec!["Cursor".to_string()]
}

fn default_important_apps() -> Vec<String> {
    [
        "zoom.us",
        "Zoom",
        "Microsoft PowerPoint",
        "Notion",
        "Slack",
        "Microsoft Teams",
        "MSTeams",
        "Teams",
        "Discord",
        "Google Chrome",
        "Microsoft Word",
        "Microsoft Excel",
        "Keynote",
        "Figma",
        "Sketch",
        "Adobe Photoshop",
        "Visual Studio Code",
        "Cursor",
        "Safari",
        "Firefox",
        "WeChat",
        "Obsidian",
        "Roam Research",
        "Chrome",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        let result = Self::try_load_from_path(&path);
        Self::or_default(&path, result)
    }

    /// Read and parse a config file without falling back or logging
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Resolve a load result to a config, logging why defaults were used
    pub fn or_default(path: &Path, result: Result<Self, ConfigError>) -> Self {
        match result {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                config
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("Failed to load config file {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("source-resolver")
            .join("config.toml")
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: PathBuf) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(&path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
