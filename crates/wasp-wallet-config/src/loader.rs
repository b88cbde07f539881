//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::file::{ErrorChannelMode, LevelFilter, LoggerSection, WalletConfigFile};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project-level configuration file name
pub const CONFIG_FILE_NAME: &str = "wasp-wallet.toml";

const ENV_LIBRARY: &str = "WASP_WALLET_LIBRARY";
const ENV_LOG_LEVEL: &str = "WASP_WALLET_LOG_LEVEL";
const ENV_ERROR_CHANNEL: &str = "WASP_WALLET_ERROR_CHANNEL";
const ENV_STRICT_RECLAIM: &str = "WASP_WALLET_STRICT_RECLAIM";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.wasp/wallet.toml) - lowest priority
/// 2. Project config (./wasp-wallet.toml) - overrides global
/// 3. Environment variables (WASP_WALLET_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Merged file contents plus environment overrides
    pub file: WalletConfigFile,

    /// Directory where wasp-wallet.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.wasp/wallet.toml
    pub fn with_global_config_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find wasp-wallet.toml, merges it over the
    /// global config and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_file) = self.find_project_config(start_dir)?;

        let mut file = self.load_global_config()?;
        file.merge(&project_file);
        let file = self.apply_env_overrides(file)?;

        Ok(Config { file, project_root })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_file = WalletConfigFile::load_from_file(config_path)?;

        let mut file = self.load_global_config()?;
        file.merge(&project_file);
        let file = self.apply_env_overrides(file)?;

        Ok(Config {
            file,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, WalletConfigFile)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let file = WalletConfigFile::load_from_file(&config_path)?;
                return Ok((Some(current), file));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, WalletConfigFile::default())),
            }
        }
    }

    /// Load global configuration; a missing file (or home directory) yields defaults
    fn load_global_config(&mut self) -> ConfigResult<WalletConfigFile> {
        if self.global_config_path.is_none() {
            match Self::global_config_dir() {
                Ok(dir) => self.global_config_path = Some(dir.join("wallet.toml")),
                Err(ConfigError::HomeNotFound) => return Ok(WalletConfigFile::default()),
                Err(e) => return Err(e),
            }
        }

        match &self.global_config_path {
            Some(path) if path.exists() => WalletConfigFile::load_from_file(path),
            _ => Ok(WalletConfigFile::default()),
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut file: WalletConfigFile) -> ConfigResult<WalletConfigFile> {
        if let Ok(path) = env::var(ENV_LIBRARY) {
            if !path.is_empty() {
                file.library.get_or_insert_with(Default::default).path = Some(PathBuf::from(path));
            }
        }

        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            let level: LevelFilter = level.parse()?;
            file.logger.get_or_insert_with(Default::default).level_filter = Some(level);
        }

        if let Ok(mode) = env::var(ENV_ERROR_CHANNEL) {
            let mode: ErrorChannelMode = mode.parse()?;
            file.dispatch
                .get_or_insert_with(Default::default)
                .error_channel = Some(mode);
        }

        if let Ok(strict) = env::var(ENV_STRICT_RECLAIM) {
            let strict = matches!(strict.to_lowercase().as_str(), "true" | "1" | "yes");
            file.dispatch
                .get_or_insert_with(Default::default)
                .strict_reclaim = Some(strict);
        }

        Ok(file)
    }

    /// Get the global configuration directory (~/.wasp)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".wasp"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Configured native module path, if any
    pub fn library_path(&self) -> Option<&Path> {
        self.file
            .library
            .as_ref()
            .and_then(|l| l.path.as_deref())
    }

    /// Configured native module path, or an error when none is set
    pub fn require_library_path(&self) -> ConfigResult<&Path> {
        self.library_path().ok_or(ConfigError::MissingLibrary)
    }

    /// Extra library search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        self.file
            .library
            .as_ref()
            .map(|l| l.search_paths.as_slice())
            .unwrap_or(&[])
    }

    /// Native logger settings (defaults when no [logger] section exists)
    pub fn logger(&self) -> LoggerSection {
        self.file.logger.clone().unwrap_or_default()
    }

    /// Effective error-channel mode (default: serialized)
    pub fn error_channel(&self) -> ErrorChannelMode {
        self.file
            .dispatch
            .as_ref()
            .and_then(|d| d.error_channel)
            .unwrap_or_default()
    }

    /// Whether a failed native string destroy is a hard error (default: false)
    pub fn strict_reclaim(&self) -> bool {
        self.file
            .dispatch
            .as_ref()
            .and_then(|d| d.strict_reclaim)
            .unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}
