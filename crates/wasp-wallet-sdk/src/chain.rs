//! BIP32 / BIP44 derivation chains
//!
//! Only the data shape is built here. Derivation itself happens in the
//! native module.

use crate::types::CoinType;
use serde::{Deserialize, Serialize};

/// BIP44 purpose field
pub const HD_WALLET_TYPE: u32 = 44;

/// `[purpose, coin, account, change, address]` path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bip32Chain(pub [u32; 5]);

impl Bip32Chain {
    pub fn segments(&self) -> &[u32; 5] {
        &self.0
    }
}

/// BIP44 path in its named-field form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44Chain {
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub address_index: u32,
}

/// Either chain form; the native side accepts both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Chain {
    Bip32(Bip32Chain),
    Bip44(Bip44Chain),
}

impl From<Bip32Chain> for Chain {
    fn from(chain: Bip32Chain) -> Self {
        Chain::Bip32(chain)
    }
}

impl From<Bip44Chain> for Chain {
    fn from(chain: Bip44Chain) -> Self {
        Chain::Bip44(chain)
    }
}

/// `m/44'/coin'/account'/internal'/address'` as path segments
pub fn build_bip32_chain(
    coin_type: CoinType,
    account_index: u32,
    internal_address: bool,
    address_index: u32,
) -> Bip32Chain {
    Bip32Chain([
        HD_WALLET_TYPE,
        coin_type.0,
        account_index,
        u32::from(internal_address),
        address_index,
    ])
}

/// BIP44 chain on the external (change = 0) branch
pub fn build_bip44_chain(coin_type: CoinType, account_index: u32, address_index: u32) -> Bip44Chain {
    Bip44Chain {
        coin_type: coin_type.0,
        account: account_index,
        change: 0,
        address_index,
    }
}
