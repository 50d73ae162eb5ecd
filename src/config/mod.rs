//! Configuration module
//!
//! Settings resolve in layers: built-in defaults, then the optional
//! config file, then command-line flags, then the preset. The file only
//! changes defaults; it can never force a mode.

mod settings;

pub use settings::{ConfigError, Parity, Preset, SerialSettings, Settings, StopBits};

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

/// Get the platform configuration directory for this tool.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "sercom", "Sercom").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Optional defaults read from `config.toml`.
///
/// Every field is optional; an absent file is an empty set of overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Default port name.
    pub port: Option<String>,
    /// Default baud rate.
    pub baud: Option<u32>,
    /// Default data bits.
    pub data_bits: Option<u8>,
    /// Default parity.
    pub parity: Option<Parity>,
    /// Default stop bits.
    pub stop_bits: Option<StopBits>,
    /// Read timeout in milliseconds.
    pub read_timeout_ms: Option<u64>,
    /// Default inter-command delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Default transcript rotation limit in megabytes.
    pub max_log_size_mb: Option<u64>,
    /// Transcript entries buffered between flushes.
    pub flush_every: Option<usize>,
}

impl FileConfig {
    /// Load `config.toml` from the platform config directory, if present.
    pub fn load() -> Result<Self, ConfigError> {
        match config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
