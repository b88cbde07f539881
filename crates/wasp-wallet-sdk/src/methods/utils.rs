use super::NoData;
use crate::memory::Secret;
use crate::types::HexString;
use serde::Serialize;

/// Stateless requests accepted by `call_utils_method`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum UtilsMethod {
    GenerateMnemonic(NoData),
    VerifyMnemonic { mnemonic: Secret },
    Bech32ToHex { bech32: String },
    #[serde(rename_all = "camelCase")]
    HexToBech32 { hex: HexString, bech32_hrp: String },
}
