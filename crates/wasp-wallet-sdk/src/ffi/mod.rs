//! Foreign Function Interface to the native wallet module
//!
//! - `loader`: locating and opening the shared library
//! - `symbols`: typed binding of its exports
//! - `handles`: opaque resource tokens
//! - `reclaim`: copying out and releasing native strings
//! - `callbacks`: event delivery from native threads

pub(crate) mod callbacks;
pub mod handles;
pub mod loader;
pub mod reclaim;
pub mod symbols;

pub use handles::{ClientPtr, ResourceKind, SecretManagerPtr, WalletPtr};
pub use loader::{LibraryLoader, NativeLibrary};
pub use reclaim::ReclaimedBuffer;
pub use symbols::{NativeApi, SymbolSource, LISTEN_WALLET_SYMBOL, REQUIRED_SYMBOLS};
