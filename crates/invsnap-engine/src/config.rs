//! Rebuild configuration.
//!
//! Layers, lowest to highest precedence:
//!
//! 1. built-in defaults (`data/raw` → `public/data`, pretty logs)
//! 2. a TOML file: `invsnap.toml` in the working directory, or an explicit path
//! 3. overrides from the environment and command line (merged by the CLI)
//!
//! ```toml
//! input_dir = "exports"
//! data_dir = "site/data"
//! log_format = "json"
//! ```

#![allow(clippy::result_large_err)]

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use invsnap_core::errors::{ExError, ExErrorKind, Result};
use invsnap_core::logging_facility::Profile;

pub const DEFAULT_CONFIG_FILE: &str = "invsnap.toml";
pub const DEFAULT_INPUT_DIR: &str = "data/raw";
pub const DEFAULT_DATA_DIR: &str = "public/data";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, debug level
    #[default]
    Pretty,
    /// JSON lines, info level
    Json,
}

impl LogFormat {
    /// Logging profile for this format
    pub fn profile(self) -> Profile {
        match self {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

impl FromStr for LogFormat {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ExError::new(ExErrorKind::Config)
                .with_op("parse_log_format")
                .with_message(format!(
                    "unknown log format {:?}; expected \"pretty\" or \"json\"",
                    other
                ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

/// Contents of a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

impl ConfigFile {
    /// Parse TOML text; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// `Config` for malformed TOML, unknown keys, or bad values.
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_entity_id(origin.display().to_string())
                .with_message(e.to_string())
        })
    }
}

/// Highest-precedence values (environment or command line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

/// Resolved settings for one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildConfig {
    /// Directory of raw `.csv` exports
    pub input_dir: PathBuf,
    /// Directory the derived artifacts are published to
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_format: LogFormat::default(),
        }
    }
}

impl RebuildConfig {
    /// Resolve configuration from all layers.
    ///
    /// With `config_path = None`, `invsnap.toml` in the working directory is
    /// used if it exists. An explicit path must exist.
    ///
    /// # Errors
    ///
    /// `Config` when the file is unreadable or invalid.
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => read_config_file(path, true)?,
            None => read_config_file(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        Ok(Self::default().merge_file(file).merge_overrides(overrides))
    }

    /// Apply values present in a config file.
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(input_dir) = file.input_dir {
            self.input_dir = input_dir;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(log_format) = file.log_format {
            self.log_format = log_format;
        }
        self
    }

    /// Apply environment or command-line overrides.
    pub fn merge_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input_dir) = overrides.input_dir {
            self.input_dir = input_dir;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(log_format) = overrides.log_format {
            self.log_format = log_format;
        }
        self
    }
}

fn read_config_file(path: &Path, required: bool) -> Result<ConfigFile> {
    match fs::read_to_string(path) {
        Ok(text) => ConfigFile::parse(path, &text),
        Err(e) if e.kind() == ErrorKind::NotFound && !required => Ok(ConfigFile::default()),
        Err(e) => Err(ExError::new(ExErrorKind::Config)
            .with_op("load_config")
            .with_entity_id(path.display().to_string())
            .with_message(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RebuildConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("data/raw"));
        assert_eq!(config.data_dir, PathBuf::from("public/data"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_file_then_overrides() {
        let file = ConfigFile::parse(
            Path::new("invsnap.toml"),
            "input_dir = \"exports\"\ndata_dir = \"site\"\nlog_format = \"json\"\n",
        )
        .unwrap();
        let config = RebuildConfig::default()
            .merge_file(file)
            .merge_overrides(ConfigOverrides {
                data_dir: Some(PathBuf::from("override")),
                ..ConfigOverrides::default()
            });

        assert_eq!(config.input_dir, PathBuf::from("exports"));
        assert_eq!(config.data_dir, PathBuf::from("override"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = ConfigFile::parse(Path::new("invsnap.toml"), "inputdir = \"x\"\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
        assert_eq!(err.entity_id(), Some("invsnap.toml"));
    }

    #[test]
    fn test_bad_log_format_is_config_error() {
        let err = ConfigFile::parse(Path::new("c.toml"), "log_format = \"xml\"\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = RebuildConfig::load(Some(&missing), ConfigOverrides::default()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "input_dir = \"in\"\n").unwrap();

        let config = RebuildConfig::load(Some(&path), ConfigOverrides::default()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }
}
