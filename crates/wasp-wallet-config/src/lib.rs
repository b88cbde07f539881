//! Wallet SDK configuration
//!
//! Provides configuration management for the native wallet bridge:
//! - Location of the native module and extra library search paths
//! - Native logger settings passed to `init_logger`
//! - Dispatcher behaviour (error-channel serialization, reclaim strictness)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.wasp/wallet.toml)
//! 3. Project config (./wasp-wallet.toml, searched upwards)
//! 4. Environment variables (WASP_WALLET_*)
//!
//! # Example
//!
//! ```no_run
//! use wasp_wallet_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! if let Some(path) = config.library_path() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod file;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("No native library configured (set [library].path or WASP_WALLET_LIBRARY)")]
    MissingLibrary,

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use file::{
    DispatchSection, ErrorChannelMode, LevelFilter, LibrarySection, LoggerSection, WalletConfigFile,
};
pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME};
