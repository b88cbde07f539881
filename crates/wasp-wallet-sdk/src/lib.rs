//! Wasp Wallet SDK - bridge to a native IOTA wallet library
//!
//! This library drives a native wallet module through its C ABI:
//! - Dynamic loading and all-or-nothing symbol binding
//! - Request encoding straight into locked, scrubbed memory
//! - Copy-then-destroy reclamation of native response strings
//! - `{type, payload}` envelope decoding and error classification
//! - Typed method catalogue and `Wallet` / `SecretManager` / `Utils` facades
//!
//! No cryptography happens here; the native module does all of it.
//!
//! # Example
//!
//! ```no_run
//! use wasp_wallet_sdk::{Sdk, Utils};
//!
//! let sdk = Sdk::load("iota_sdk_native")?;
//! let mnemonic = Utils::new(&sdk).generate_mnemonic()?;
//! assert!(!mnemonic.is_empty());
//! mnemonic.release();
//! # Ok::<(), wasp_wallet_sdk::SdkError>(())
//! ```

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chain;
pub mod codec;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod events;
pub mod ffi;
pub mod memory;
pub mod methods;
pub mod secret_manager;
pub mod types;
pub mod utils;
pub mod wallet;

pub use chain::{build_bip32_chain, build_bip44_chain, Bip32Chain, Bip44Chain, Chain};
pub use codec::SealedRequest;
pub use dispatch::{DispatchOptions, NativeResponse, Sdk};
pub use envelope::Envelope;
pub use error::{LoadError, SdkError, SdkResult};
pub use events::{EventStream, WalletEvent, WalletEventType};
pub use ffi::{ClientPtr, ResourceKind, SecretManagerPtr, WalletPtr};
pub use memory::{GuardedBuffer, Secret};
pub use methods::{NoData, RawMethod};
pub use secret_manager::SecretManager;
pub use types::CoinType;
pub use utils::Utils;
pub use wallet::Wallet;

pub use wasp_wallet_config::{Config, ConfigLoader, ErrorChannelMode, LevelFilter};
