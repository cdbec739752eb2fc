//! TOML configuration file for airpair.
//!
//! Looked up at `--config <PATH>` or, when that flag is absent, at:
//! - Windows:  `%APPDATA%\airpair\config.toml`
//! - Linux:    `~/.config/airpair/config.toml`
//! - macOS:    `~/Library/Application Support/airpair/config.toml`
//!
//! Every field is optional.  Example:
//!
//! ```toml
//! [adb]
//! path = "/opt/android-sdk/platform-tools/adb"
//!
//! [session]
//! do_mode_switch = true
//! mode_switch_port = 5555
//!
//! [log]
//! level = "debug"
//!
//! [display]
//! qr_border = 2
//! ```
//!
//! Command-line flags override file values, which override the built-in
//! defaults.  The merge happens in the binary; this module only loads.

use std::path::{Path, PathBuf};

use airpair_core::SessionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::terminal::DEFAULT_QR_BORDER;

/// Default `adb` executable, resolved through `PATH`.
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Default `tracing` filter when neither `RUST_LOG`, `--debug` nor the file
/// specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
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
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub adb: AdbSection,
    pub session: SessionConfig,
    pub log: LogSection,
    pub display: DisplaySection,
}

/// `[adb]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbSection {
    /// Path to the `adb` platform tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `tracing` filter directive, e.g. `"debug"` or `"airpair=trace"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// `[display]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Quiet-zone width around the QR code, in modules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_border: Option<u32>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub adb_path: PathBuf,
    pub session: SessionConfig,
    pub log_level: String,
    /// Render the credential as a QR code (otherwise print the payload).
    pub show_qr: bool,
    /// Quiet-zone width around the QR code, in modules.
    pub qr_border: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from(DEFAULT_ADB_PATH),
            session: SessionConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            show_qr: true,
            qr_border: DEFAULT_QR_BORDER,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Parses config file content.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads the config file at `path`.
///
/// A missing file at the default location is not an error; a missing file
/// that was asked for explicitly is.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path, required: bool) -> Result<FileConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            Ok(FileConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolves the default config file path, if the platform has a config
/// directory.
pub fn default_config_path() -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join("config.toml"))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("airpair"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("airpair")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("airpair"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
