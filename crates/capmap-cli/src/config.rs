//! CLI configuration
//!
//! Read from an optional TOML file:
//!
//! ```toml
//! [log]
//! filter = "info,capmap_io=debug"
//! format = "json"
//!
//! [export]
//! out_dir = "exports"
//! ```
//!
//! Missing sections and keys fall back to defaults. Command line flags
//! override file values.

use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File looked up in the working directory when `--config` is not given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "capmap.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CapmapConfig {
    /// Logging setup
    pub(crate) log: LogConfig,
    /// CSV export setup
    pub(crate) export: ExportConfig,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub(crate) filter: String,
    /// Output format
    pub(crate) format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// `[export]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ExportConfig {
    /// Directory receiving exported sheets
    pub(crate) out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
        }
    }
}

impl CapmapConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// With log format
    #[inline]
    #[must_use]
    pub(crate) fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log.format = format;
        self
    }

    /// With export directory
    #[inline]
    #[must_use]
    pub(crate) fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export.out_dir = dir.into();
        self
    }

    /// Parse TOML text
    pub(crate) fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `capmap.toml` in `cwd` is
    /// used when present, otherwise defaults.
    pub(crate) fn load(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::new());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
