//! Stateless utility calls

use crate::dispatch::Sdk;
use crate::error::SdkResult;
use crate::memory::Secret;
use crate::methods::{NoData, UtilsMethod};
use crate::types::HexString;

#[derive(Debug, Clone, Copy)]
pub struct Utils<'a> {
    sdk: &'a Sdk,
}

impl<'a> Utils<'a> {
    pub fn new(sdk: &'a Sdk) -> Self {
        Self { sdk }
    }

    /// A fresh mnemonic, decoded straight into guarded memory
    pub fn generate_mnemonic(&self) -> SdkResult<Secret> {
        self.sdk
            .call_utils_method(&UtilsMethod::GenerateMnemonic(NoData))?
            .parse_secret()
    }

    /// `Ok(true)` for a valid mnemonic; an invalid one is a remote error
    pub fn verify_mnemonic(&self, mnemonic: Secret) -> SdkResult<bool> {
        self.sdk
            .call_utils_method_status(&UtilsMethod::VerifyMnemonic { mnemonic })
    }

    pub fn bech32_to_hex(&self, bech32: impl Into<String>) -> SdkResult<HexString> {
        self.sdk.call_utils_method_typed(&UtilsMethod::Bech32ToHex {
            bech32: bech32.into(),
        })
    }

    pub fn hex_to_bech32(
        &self,
        hex: impl Into<String>,
        bech32_hrp: impl Into<String>,
    ) -> SdkResult<String> {
        self.sdk.call_utils_method_typed(&UtilsMethod::HexToBech32 {
            hex: hex.into(),
            bech32_hrp: bech32_hrp.into(),
        })
    }
}
