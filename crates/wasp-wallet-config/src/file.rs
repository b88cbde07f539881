//! Configuration file schema (wasp-wallet.toml / ~/.wasp/wallet.toml)
//!
//! Every section is optional so that a global file and a project file can each
//! carry only the settings they care about.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One configuration file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WalletConfigFile {
    /// Native module location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibrarySection>,

    /// Native logger settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<LoggerSection>,

    /// Dispatcher behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchSection>,
}

/// `[library]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibrarySection {
    /// Path to the native module, or a bare library name resolved through the search paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Extra directories searched before the platform defaults
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,
}

/// `[logger]`, forwarded to the native `init_logger` entry point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggerSection {
    /// Output file name, or `stdout`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_filter: Option<LevelFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_enabled: Option<bool>,

    /// Only log these targets
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_filter: Vec<String>,

    /// Never log these targets
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_exclusions: Vec<String>,
}

/// `[dispatch]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_channel: Option<ErrorChannelMode>,

    /// Treat a failed native string destroy as a hard error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_reclaim: Option<bool>,
}

/// Native log level filter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LevelFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(LevelFilter::Off),
            "error" => Ok(LevelFilter::Error),
            "warn" => Ok(LevelFilter::Warn),
            "info" => Ok(LevelFilter::Info),
            "debug" => Ok(LevelFilter::Debug),
            "trace" => Ok(LevelFilter::Trace),
            other => Err(ConfigError::InvalidValue {
                field: "logger.level_filter".to_string(),
                reason: format!(
                    "must be one of off, error, warn, info, debug, trace; got '{}'",
                    other
                ),
            }),
        }
    }
}

/// How the dispatcher reads the native last-error accessor
///
/// `Serialized` holds a process-wide lock from the native invoke until the
/// last error has been read. `Concurrent` skips the lock and is only correct
/// when the native module keeps its last error per thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorChannelMode {
    #[default]
    Serialized,
    Concurrent,
}

impl FromStr for ErrorChannelMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "serialized" => Ok(ErrorChannelMode::Serialized),
            "concurrent" => Ok(ErrorChannelMode::Concurrent),
            other => Err(ConfigError::InvalidValue {
                field: "dispatch.error_channel".to_string(),
                reason: format!("must be 'serialized' or 'concurrent', got '{}'", other),
            }),
        }
    }
}

impl WalletConfigFile {
    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration text; `origin` is only used in error messages
    pub fn parse(content: &str, origin: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: origin.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate values serde cannot check on its own
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(library) = &self.library {
            if let Some(path) = &library.path {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "library.path".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }

        if let Some(logger) = &self.logger {
            if let Some(name) = &logger.name {
                if name.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "logger.name".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Merge another file into this one; `other` wins for every value it sets
    pub fn merge(&mut self, other: &WalletConfigFile) {
        if let Some(library) = &other.library {
            let base = self.library.get_or_insert_with(Default::default);
            if library.path.is_some() {
                base.path = library.path.clone();
            }
            // project search paths are tried before global ones
            let mut paths = library.search_paths.clone();
            paths.extend(base.search_paths.drain(..));
            base.search_paths = paths;
        }

        if let Some(logger) = &other.logger {
            let base = self.logger.get_or_insert_with(Default::default);
            if logger.name.is_some() {
                base.name = logger.name.clone();
            }
            if logger.level_filter.is_some() {
                base.level_filter = logger.level_filter;
            }
            if logger.color_enabled.is_some() {
                base.color_enabled = logger.color_enabled;
            }
            if !logger.target_filter.is_empty() {
                base.target_filter = logger.target_filter.clone();
            }
            if !logger.target_exclusions.is_empty() {
                base.target_exclusions = logger.target_exclusions.clone();
            }
        }

        if let Some(dispatch) = &other.dispatch {
            let base = self.dispatch.get_or_insert_with(Default::default);
            if dispatch.error_channel.is_some() {
                base.error_channel = dispatch.error_channel;
            }
            if dispatch.strict_reclaim.is_some() {
                base.strict_reclaim = dispatch.strict_reclaim;
            }
        }
    }
}
