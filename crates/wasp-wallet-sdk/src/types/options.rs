use super::CoinType;
use crate::memory::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasp_wallet_config::{LevelFilter, LoggerSection};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Native logger output configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Output file name, or `stdout`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_filter: Option<LevelFilter>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub color_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_exclusions: Vec<String>,
}

impl LoggerConfig {
    pub fn stdout(level_filter: LevelFilter) -> Self {
        Self {
            name: Some("stdout".to_string()),
            level_filter: Some(level_filter),
            ..Self::default()
        }
    }
}

impl From<&LoggerSection> for LoggerConfig {
    fn from(section: &LoggerSection) -> Self {
        Self {
            name: section.name.clone(),
            level_filter: section.level_filter,
            color_enabled: section.color_enabled.unwrap_or(false),
            target_filter: section.target_filter.clone(),
            target_exclusions: section.target_exclusions.clone(),
        }
    }
}

/// Seconds plus nanoseconds, as the native side encodes durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Duration {
    pub secs: u64,
    pub nanos: u32,
}

impl From<std::time::Duration> for Duration {
    fn from(duration: std::time::Duration) -> Self {
        Self {
            secs: duration.as_secs(),
            nanos: duration.subsec_nanos(),
        }
    }
}

/// Node client builder options
///
/// Node descriptors and network info are passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_node: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_pow_node: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permanodes: Vec<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_node_health: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub local_pow: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub quorum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quorum_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pow_worker_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_pow_timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_sync_interval: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_options: Option<Value>,
}

impl ClientOptions {
    /// Options with a single node URL
    pub fn with_node(url: impl Into<String>) -> Self {
        Self {
            nodes: vec![Value::String(url.into())],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MnemonicSecretManager {
    pub mnemonic: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongholdOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrongholdSecretManager {
    pub stronghold: StrongholdOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerNanoSecretManager {
    /// `true` for the Speculos simulator
    pub ledger_nano: bool,
}

/// The secret manager backing a wallet or standalone signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SecretManagerOptions {
    Mnemonic(MnemonicSecretManager),
    Stronghold(StrongholdSecretManager),
    LedgerNano(LedgerNanoSecretManager),
}

impl SecretManagerOptions {
    pub fn mnemonic(mnemonic: Secret) -> Self {
        Self::Mnemonic(MnemonicSecretManager { mnemonic })
    }

    pub fn stronghold(password: Secret, snapshot_path: impl Into<String>) -> Self {
        Self::Stronghold(StrongholdSecretManager {
            stronghold: StrongholdOptions {
                password: Some(password),
                snapshot_path: Some(snapshot_path.into()),
            },
        })
    }

    pub fn ledger_nano(simulator: bool) -> Self {
        Self::LedgerNano(LedgerNanoSecretManager {
            ledger_nano: simulator,
        })
    }
}

/// Wallet builder options
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_options: Option<ClientOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_type: Option<CoinType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_manager: Option<SecretManagerOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

/// Which output kinds to sync for one address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSyncOptions {
    #[serde(default, skip_serializing_if = "is_false")]
    pub alias_outputs: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub basic_outputs: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nft_outputs: bool,
    /// Only meaningful for alias addresses
    #[serde(default, skip_serializing_if = "is_false")]
    pub foundry_outputs: bool,
}

/// Account sync options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_start_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_start_index_internal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<OutputSyncOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<OutputSyncOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft: Option<OutputSyncOptions>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_syncing: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sync_incoming_transactions: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sync_native_token_foundries: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sync_only_most_basic_outputs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_pending_transactions: Option<bool>,
}

/// Node authentication
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<Secret>,
    /// `[user, password]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth_name_pwd: Option<(String, Secret)>,
}
