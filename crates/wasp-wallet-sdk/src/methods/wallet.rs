use super::{NoData, StoreMnemonicData};
use crate::events::WalletEventType;
use crate::memory::Secret;
use crate::types::{Auth, ClientOptions, GenerateAddressOptions, SyncOptions};
use serde::Serialize;

/// Requests accepted by `call_wallet_method`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum WalletMethod {
    #[serde(rename_all = "camelCase")]
    Backup { destination: String, password: Secret },
    #[serde(rename_all = "camelCase")]
    ChangeStrongholdPassword {
        current_password: Secret,
        new_password: Secret,
    },
    ClearStrongholdPassword(NoData),
    #[serde(rename_all = "camelCase")]
    ClearListeners { event_types: Vec<WalletEventType> },
    #[serde(rename_all = "camelCase")]
    CreateAccount {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
    },
    GenerateMnemonic(NoData),
    #[serde(rename_all = "camelCase")]
    GenerateEd25519Address {
        account_index: u32,
        address_index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<GenerateAddressOptions>,
    },
    GetAccountIndexes(NoData),
    GetAccounts(NoData),
    /// `account_id` is an index or an alias
    #[serde(rename_all = "camelCase")]
    GetAccount { account_id: String },
    GetLedgerNanoStatus(NoData),
    IsStrongholdPasswordAvailable(NoData),
    #[serde(rename_all = "camelCase")]
    RecoverAccounts {
        account_start_index: u32,
        account_gap_limit: u32,
        address_gap_limit: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        sync_options: Option<SyncOptions>,
    },
    RemoveLatestAccount(NoData),
    #[serde(rename_all = "camelCase")]
    RestoreBackup {
        source: String,
        password: Secret,
        #[serde(skip_serializing_if = "Option::is_none")]
        ignore_if_coin_type_mismatch: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ignore_if_bech32_mismatch: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetClientOptions { client_options: ClientOptions },
    SetStrongholdPassword { password: Secret },
    #[serde(rename_all = "camelCase")]
    SetStrongholdPasswordClearInterval {
        #[serde(skip_serializing_if = "Option::is_none")]
        interval_in_milliseconds: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    StartBackgroundSync {
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<SyncOptions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        interval_in_milliseconds: Option<u64>,
    },
    StopBackgroundSync(NoData),
    StoreMnemonic(StoreMnemonicData),
    UpdateNodeAuth {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        auth: Option<Auth>,
    },
    CallAccountMethod(CallAccountMethodData),
}

/// Account-scoped call nested inside `callAccountMethod`
///
/// The method defaults to the typed [`AccountMethod`] set; any other
/// serializable request (for example a [`RawMethod`](super::RawMethod)) can
/// be nested instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAccountMethodData<M = AccountMethod> {
    pub account_id: u32,
    pub method: M,
}

impl<M: Serialize> CallAccountMethodData<M> {
    pub fn new(account_id: u32, method: M) -> Self {
        Self { account_id, method }
    }

    /// Wrap into the outer wallet request
    pub fn into_request(self) -> CallAccountRequest<M> {
        CallAccountRequest::CallAccountMethod(self)
    }
}

/// `callAccountMethod` wallet request for an arbitrary nested method
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum CallAccountRequest<M> {
    CallAccountMethod(CallAccountMethodData<M>),
}

/// Typed account methods
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum AccountMethod {
    Addresses(NoData),
    GenerateEd25519Addresses {
        amount: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<GenerateAddressOptions>,
    },
    GetBalance(NoData),
    Sync {
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<SyncOptions>,
    },
}

impl<M: Serialize> From<CallAccountMethodData<M>> for CallAccountRequest<M> {
    fn from(data: CallAccountMethodData<M>) -> Self {
        data.into_request()
    }
}
