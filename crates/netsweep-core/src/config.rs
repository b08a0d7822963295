//! Settings for netsweep.
//!
//! Settings are loaded from (in priority order):
//! 1. Environment variables (`NETSWEEP__` prefix, `__` separator)
//! 2. Settings file (`config.toml` by default, required)
//! 3. Defaults for the optional keys

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level settings, immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub nmap_script: ScannerSettings,
    #[serde(default)]
    pub archive: ArchiveSettings,
    #[serde(default)]
    pub publish: PublishSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Connection parameters for the IPAM service.
#[derive(Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL, e.g. `https://ipam.example.net`.
    pub url_base: String,

    /// API token, sent as `Authorization: Token <token>`.
    pub token: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Tag name that marks a prefix for discovery.
    #[serde(default = "default_discovery_tag")]
    pub discovery_tag: String,
}

// Keeps the token out of logs.
impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("url_base", &self.url_base)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("discovery_tag", &self.discovery_tag)
            .finish()
    }
}

/// How the external scanner is invoked and where its documents land.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSettings {
    /// Scanner executable, invoked as `<script_name> [args...] <prefix>`.
    pub script_name: String,

    /// Arguments placed before the prefix.
    #[serde(default)]
    pub args: Vec<String>,

    /// Directory the scanner writes its documents to.
    #[serde(default = "default_scan_dir")]
    pub scan_dir: PathBuf,

    /// Extension of scan documents, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    /// Archiver executable, invoked with no arguments.
    #[serde(default = "default_archive_command")]
    pub command: String,
}

/// Fixed fields attached to every address created in IPAM.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSettings {
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Custom field that carries the OS fingerprint.
    #[serde(default = "default_custom_field")]
    pub custom_field: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Log file appended to in addition to stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_discovery_tag() -> String {
    "Discover".to_string()
}

fn default_scan_dir() -> PathBuf {
    PathBuf::from("./scans")
}

fn default_extension() -> String {
    "xml".to_string()
}

fn default_archive_command() -> String {
    "./compress.sh".to_string()
}

fn default_status() -> String {
    "active".to_string()
}

fn default_description() -> String {
    "Discovered by netsweep".to_string()
}

fn default_custom_field() -> String {
    "osmatch".to_string()
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            command: default_archive_command(),
        }
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            status: default_status(),
            description: default_description(),
            custom_field: default_custom_field(),
        }
    }
}

impl Settings {
    /// Load settings from `<file_prefix>.{toml,json,yaml,...}` overlaid with
    /// `NETSWEEP__` environment variables.
    ///
    /// The file is required. Missing or malformed files, missing required
    /// keys, and empty required values are all errors.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(true))
            .add_source(
                config::Environment::with_prefix("NETSWEEP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()
    }

    /// Parse settings from a TOML string, without environment overlay.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.api.url_base.trim().is_empty() {
            return Err(ConfigError::Empty("api.url_base"));
        }
        if self.api.token.trim().is_empty() {
            return Err(ConfigError::Empty("api.token"));
        }
        if self.nmap_script.script_name.trim().is_empty() {
            return Err(ConfigError::Empty("nmap_script.script_name"));
        }

        let trimmed = self.api.url_base.trim_end_matches('/').len();
        self.api.url_base.truncate(trimmed);
        self.nmap_script.extension = self
            .nmap_script
            .extension
            .trim_start_matches('.')
            .to_string();

        Ok(self)
    }
}
