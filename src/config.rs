use crate::error::{Result, RunlogError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "runlog";

/// The filename for the configuration file.
const CONFIG_FILENAME: &str = "config.toml";

/// Longest display name the rename dialog accepts.
pub const DEFAULT_MAX_NAME_LEN: usize = 14;

/// User configuration for run storage and renaming.
///
/// Every field is optional in the TOML file; missing fields take their
/// defaults, so an empty file is a valid config.
///
/// # Example
///
/// ```toml
/// # Where run records live. Defaults to `runs/` next to the executable.
/// storage_dir = "/home/me/runs"
///
/// # Longest display name accepted when renaming
/// max_name_len = 14
///
/// # Serialize renames that target the same run, across processes
/// serialize_renames = false
///
/// # Write through a temp file and rename it into place
/// atomic_writes = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<key>.json` run records.
    ///
    /// When unset, `runs/` next to the running executable is used.
    pub storage_dir: Option<PathBuf>,

    /// Maximum number of characters in a display name, enforced by the
    /// rename dialog. The renamer itself accepts any string.
    pub max_name_len: usize,

    /// Whether renames targeting the same run wait for each other.
    ///
    /// When `true`, each rename holds an OS file lock on `.<key>.json.lock`
    /// in the storage directory, so separate `runlog` processes are
    /// serialized too. When `false`, two concurrent renames of one run race
    /// and the last write wins.
    pub serialize_renames: bool,

    /// Whether record writes go through a temp file and an atomic rename.
    pub atomic_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            serialize_renames: false,
            atomic_writes: true,
        }
    }
}

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_name_len = 0` would make every name invalid.
    ZeroMaxNameLen,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroMaxNameLen => {
                write!(f, "`max_name_len` must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a configuration for logical consistency.
///
/// ```
/// use runlog::config::{Config, validate_config};
///
/// assert!(validate_config(&Config::default()).is_ok());
///
/// let invalid = Config {
///     max_name_len: 0,
///     ..Default::default()
/// };
/// assert!(validate_config(&invalid).is_err());
/// ```
pub fn validate_config(config: &Config) -> std::result::Result<(), ConfigError> {
    if config.max_name_len == 0 {
        return Err(ConfigError::ZeroMaxNameLen);
    }
    Ok(())
}

/// Get the runlog config directory path (~/.config/runlog/).
///
/// Does not create the directory.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RunlogError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (~/.config/runlog/config.toml).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILENAME))
}

/// Load the configuration from `~/.config/runlog/config.toml`.
///
/// A missing file yields the defaults; nothing is created on disk.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Load and validate a configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| {
        RunlogError::Config(format!("Failed to parse config file at {:?}: {}", path, e))
    })?;

    validate_config(&config).map_err(|e| RunlogError::Config(e.to_string()))?;

    Ok(config)
}
