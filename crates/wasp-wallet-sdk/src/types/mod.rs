//! Data contracts exchanged with the native module
//!
//! These are carried through as opaque JSON; nothing here is interpreted
//! beyond serialization.

mod addresses;
mod ledger;
mod options;

pub use addresses::{
    Ed25519Signature, GenerateAddressOptions, GenerateAddressesOptions, Range,
    Secp256k1EcdsaSignature,
};
pub use ledger::{LedgerApp, LedgerDeviceType, LedgerNanoStatus};
pub use options::{
    Auth, ClientOptions, Duration, LedgerNanoSecretManager, LoggerConfig, MnemonicSecretManager,
    OutputSyncOptions, SecretManagerOptions, StrongholdOptions, StrongholdSecretManager,
    SyncOptions, WalletOptions,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// `0x`-prefixed hex text
pub type HexString = String;

/// SLIP-44 coin type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(pub u32);

impl CoinType {
    pub const ETHER: CoinType = CoinType(60);
    pub const IOTA: CoinType = CoinType(4218);
    pub const SHIMMER: CoinType = CoinType(4219);
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
