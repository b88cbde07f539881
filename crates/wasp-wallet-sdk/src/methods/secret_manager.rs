use super::{NoData, StoreMnemonicData};
use crate::chain::Chain;
use crate::types::{GenerateAddressesOptions, HexString};
use serde::Serialize;
use serde_json::Value;

/// Requests accepted by `call_secret_manager_method`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum SecretManagerMethod {
    GenerateEd25519Addresses {
        options: GenerateAddressesOptions,
    },
    GenerateEvmAddresses {
        options: GenerateAddressesOptions,
    },
    GetLedgerNanoStatus(NoData),
    #[serde(rename_all = "camelCase")]
    SignatureUnlock {
        transaction_essence_hash: HexString,
        chain: Chain,
    },
    SignEd25519 {
        message: HexString,
        chain: Chain,
    },
    SignSecp256k1Ecdsa {
        message: HexString,
        chain: Chain,
    },
    /// The prepared transaction is produced by the native module and passed back untouched
    #[serde(rename_all = "camelCase")]
    SignTransaction { prepared_transaction_data: Value },
    StoreMnemonic(StoreMnemonicData),
}
