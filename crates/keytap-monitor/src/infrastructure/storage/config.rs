//! TOML-based configuration persistence for the monitor application.
//!
//! Reads and writes [`MonitorConfig`] to the platform-appropriate config
//! file:
//! - Windows:  `%APPDATA%\Keytap\config.toml`
//! - Linux:    `~/.config/keytap/config.toml`
//! - macOS:    `~/Library/Application Support/Keytap/config.toml`
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return
//! value of `some_fn()` when the field is absent from the TOML file, so the
//! monitor works on first run and across upgrades from older config files.
//!
//! The external device path can additionally be overridden with the
//! `DEVICE_PATH` environment variable, which wins over the config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the external scancode device path.
pub const DEVICE_PATH_ENV: &str = "DEVICE_PATH";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level monitor configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    pub capture: CaptureConfig,
    pub monitor: MonitorSection,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Embedded capture subsystem settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Capture strategy: `"synthetic"` or `"intercept"`.
    #[serde(default = "default_source")]
    pub source: String,
    /// Synthetic tick interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Event buffer capacity in bytes.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

/// Poll-loop and display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSection {
    /// How often the consumer polls the device, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Trailing characters kept in the visible transcript.
    #[serde(default = "default_transcript_limit")]
    pub transcript_limit: usize,
}

/// External scancode device settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// When set, the monitor reads raw bytes from this path (conventionally
    /// `/dev/kbd`) instead of running the embedded capture subsystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Stats persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsConfig {
    /// Stats file location; defaults to `stats.txt` in the platform data
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_source() -> String {
    "synthetic".to_string()
}
fn default_interval_ms() -> u64 {
    120
}
fn default_buffer_capacity() -> usize {
    4096
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_transcript_limit() -> usize {
    200
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            monitor: MonitorSection::default(),
            device: DeviceConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            interval_ms: default_interval_ms(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            transcript_limit: default_transcript_limit(),
        }
    }
}

impl MonitorConfig {
    /// The effective external device path: the `DEVICE_PATH` environment
    /// variable when set and non-empty, otherwise `device.path` from the
    /// file. `None` selects the embedded capture subsystem.
    pub fn device_path_override(&self) -> Option<PathBuf> {
        match std::env::var_os(DEVICE_PATH_ENV) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => self.device.path.clone(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// The default stats file path in the platform data directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn default_stats_path() -> Result<PathBuf, ConfigError> {
    platform_data_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)
        .map(|dir| dir.join("stats.txt"))
}

/// Loads [`MonitorConfig`] from disk, returning `MonitorConfig::default()`
/// if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than
/// "not found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<MonitorConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: MonitorConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MonitorConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Keytap"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keytap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Keytap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// Resolves the platform data base directory (for the stats file).
fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Keytap"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("keytap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Keytap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
