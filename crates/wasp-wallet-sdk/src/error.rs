//! Error taxonomy for the native bridge

use crate::ffi::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;
use wasp_wallet_config::ConfigError;

/// Fallback text when a native call fails and the last-error accessor is empty
pub const GENERIC_NATIVE_ERROR: &str = "native call failed without an error message";

/// Library loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Library file not found in search paths
    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    /// The dynamic loader rejected the file (wrong architecture, missing dependency, ...)
    #[error("Failed to load library '{}': {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },

    /// The dynamic loader refused to release the module
    #[error("Failed to unload library: {0}")]
    UnloadFailed(String),
}

/// Every failure the bridge can report
#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// One or more required exports are absent; binding is all-or-nothing
    #[error("native module is missing required exports: {}", missing.join(", "))]
    SymbolBind { missing: Vec<String> },

    #[error("failed to encode request: {0}")]
    Encoding(String),

    /// The native call returned its null sentinel
    #[error("native call failed: {0}")]
    Native(String),

    /// The native library answered with an error envelope
    #[error("remote error: {0}")]
    Remote(String),

    #[error("malformed response: {0}")]
    Decode(String),

    /// The response was copied but the native side refused to free its buffer
    #[error("native buffer was copied but could not be destroyed: {0}")]
    BufferReclaim(String),

    #[error("{kind} handle is null")]
    InvalidHandle { kind: ResourceKind },

    #[error("event subscription failed: {0}")]
    EventSubscription(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SdkError {
    /// Message carried by a remote (error envelope) failure
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            SdkError::Remote(message) => Some(message),
            _ => None,
        }
    }

    /// True for errors that leave the SDK unusable (load and bind failures)
    pub fn is_fatal(&self) -> bool {
        matches!(self, SdkError::Load(_) | SdkError::SymbolBind { .. })
    }
}

/// Result type for bridge operations
pub type SdkResult<T> = Result<T, SdkError>;
