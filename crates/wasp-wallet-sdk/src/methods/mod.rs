//! Request descriptors for the native `call_*_method` entry points
//!
//! Every request renders as `{"name": <method>, "data": <payload>}`. Methods
//! without a payload carry `"data": null`. The payload shapes are owned by
//! the native module; they are modelled here only far enough to serialize.

mod client;
mod secret_manager;
mod utils;
mod wallet;

pub use client::ClientMethod;
pub use secret_manager::SecretManagerMethod;
pub use utils::UtilsMethod;
pub use wallet::{AccountMethod, CallAccountMethodData, CallAccountRequest, WalletMethod};

use crate::memory::Secret;
use serde::Serialize;
use serde_json::Value;

/// Payload of a method that takes no arguments; serializes as `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NoData;

/// A request outside the typed catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawMethod {
    pub name: String,
    pub data: Value,
}

impl RawMethod {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn without_data(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }
}

/// `storeMnemonic` payload, shared by wallets and secret managers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreMnemonicData {
    pub mnemonic: Secret,
}
