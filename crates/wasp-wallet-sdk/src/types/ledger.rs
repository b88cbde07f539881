use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerDeviceType {
    LedgerNanoS,
    LedgerNanoSPlus,
    LedgerNanoX,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerApp {
    pub name: String,
    pub version: String,
}

/// Connection and app state of a Ledger Nano device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerNanoStatus {
    pub connected: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub blind_signing_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<LedgerApp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<LedgerDeviceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<u32>,
}
