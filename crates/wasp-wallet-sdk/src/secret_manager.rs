//! Standalone secret manager facade

use crate::chain::Chain;
use crate::dispatch::Sdk;
use crate::error::{SdkError, SdkResult};
use crate::ffi::SecretManagerPtr;
use crate::memory::Secret;
use crate::methods::{NoData, SecretManagerMethod, StoreMnemonicData};
use crate::types::{
    CoinType, Ed25519Signature, GenerateAddressOptions, GenerateAddressesOptions,
    LedgerNanoStatus, Range, Secp256k1EcdsaSignature, SecretManagerOptions,
};
use serde_json::Value;
use tracing::warn;

/// A native secret manager
///
/// One created through a constructor here is destroyed when dropped. A view
/// obtained from a [`Wallet`](crate::Wallet) belongs to the wallet and is
/// left alone.
#[derive(Debug)]
pub struct SecretManager<'a> {
    sdk: &'a Sdk,
    ptr: SecretManagerPtr,
    owned: bool,
}

impl<'a> SecretManager<'a> {
    pub fn create(sdk: &'a Sdk, options: &SecretManagerOptions) -> SdkResult<Self> {
        let ptr = sdk.create_secret_manager(options)?;
        Ok(Self {
            sdk,
            ptr,
            owned: true,
        })
    }

    /// In-memory mnemonic secret manager
    pub fn new_mnemonic(sdk: &'a Sdk, mnemonic: Secret) -> SdkResult<Self> {
        Self::create(sdk, &SecretManagerOptions::mnemonic(mnemonic))
    }

    /// Stronghold snapshot secret manager; the snapshot is created if missing
    pub fn new_stronghold(
        sdk: &'a Sdk,
        password: Secret,
        snapshot_path: impl Into<String>,
    ) -> SdkResult<Self> {
        Self::create(sdk, &SecretManagerOptions::stronghold(password, snapshot_path))
    }

    /// Ledger Nano secret manager; `simulator` selects the Speculos emulator
    pub fn new_ledger(sdk: &'a Sdk, simulator: bool) -> SdkResult<Self> {
        Self::create(sdk, &SecretManagerOptions::ledger_nano(simulator))
    }

    pub(crate) fn borrowed(sdk: &'a Sdk, ptr: SecretManagerPtr) -> Self {
        Self {
            sdk,
            ptr,
            owned: false,
        }
    }

    pub fn as_ptr(&self) -> SecretManagerPtr {
        self.ptr
    }

    fn call<T: serde::de::DeserializeOwned>(&self, method: &SecretManagerMethod) -> SdkResult<T> {
        self.sdk.call_secret_manager_method_typed(self.ptr, method)
    }

    pub fn get_ledger_status(&self) -> SdkResult<LedgerNanoStatus> {
        self.call(&SecretManagerMethod::GetLedgerNanoStatus(NoData))
    }

    pub fn generate_ed25519_addresses(
        &self,
        range: Range,
        account_index: u32,
        bech32_hrp: Option<&str>,
        coin_type: CoinType,
        options: Option<GenerateAddressOptions>,
    ) -> SdkResult<Vec<String>> {
        let mut request = GenerateAddressesOptions::new(coin_type, account_index, range);
        request.bech32_hrp = bech32_hrp.map(str::to_string);
        request.options = options;
        self.call(&SecretManagerMethod::GenerateEd25519Addresses { options: request })
    }

    /// The single address at `address_index`
    pub fn generate_ed25519_address(
        &self,
        address_index: u32,
        account_index: u32,
        bech32_hrp: Option<&str>,
        coin_type: CoinType,
        options: Option<GenerateAddressOptions>,
    ) -> SdkResult<String> {
        self.generate_ed25519_addresses(
            Range::single(address_index),
            account_index,
            bech32_hrp,
            coin_type,
            options,
        )?
        .into_iter()
        .next()
        .ok_or_else(|| SdkError::Decode("native module returned no address".to_string()))
    }

    /// EVM addresses on the Ether coin type
    pub fn generate_evm_addresses(
        &self,
        range: Range,
        account_index: u32,
        options: Option<GenerateAddressOptions>,
    ) -> SdkResult<Vec<String>> {
        let mut request = GenerateAddressesOptions::new(CoinType::ETHER, account_index, range);
        request.options = options;
        self.call(&SecretManagerMethod::GenerateEvmAddresses { options: request })
    }

    /// Store a mnemonic into a Stronghold snapshot
    pub fn store_mnemonic(&self, mnemonic: Secret) -> SdkResult<bool> {
        let method = SecretManagerMethod::StoreMnemonic(StoreMnemonicData { mnemonic });
        self.sdk
            .call_secret_manager_method_status(self.ptr, &method)
    }

    /// Ed25519 signature over a transaction essence
    pub fn sign_transaction_essence(
        &self,
        essence: impl Into<String>,
        chain: impl Into<Chain>,
    ) -> SdkResult<Ed25519Signature> {
        self.call(&SecretManagerMethod::SignEd25519 {
            message: essence.into(),
            chain: chain.into(),
        })
    }

    pub fn sign_secp256k1_ecdsa(
        &self,
        message: impl Into<String>,
        chain: impl Into<Chain>,
    ) -> SdkResult<Secp256k1EcdsaSignature> {
        self.call(&SecretManagerMethod::SignSecp256k1Ecdsa {
            message: message.into(),
            chain: chain.into(),
        })
    }

    /// Signature unlock block for a transaction essence hash
    pub fn signature_unlock(
        &self,
        transaction_essence_hash: impl Into<String>,
        chain: impl Into<Chain>,
    ) -> SdkResult<Value> {
        self.call(&SecretManagerMethod::SignatureUnlock {
            transaction_essence_hash: transaction_essence_hash.into(),
            chain: chain.into(),
        })
    }

    pub fn sign_transaction(&self, prepared_transaction_data: Value) -> SdkResult<Value> {
        self.call(&SecretManagerMethod::SignTransaction {
            prepared_transaction_data,
        })
    }

    /// Destroy the native secret manager now instead of on drop
    ///
    /// A borrowed view is released without touching the native side.
    pub fn destroy(mut self) -> SdkResult<()> {
        let ptr = std::mem::replace(&mut self.ptr, SecretManagerPtr::NULL);
        if self.owned {
            self.sdk.destroy_secret_manager(ptr)
        } else {
            Ok(())
        }
    }
}

impl Drop for SecretManager<'_> {
    fn drop(&mut self) {
        if !self.owned || self.ptr.is_null() {
            return;
        }
        if let Err(error) = self.sdk.destroy_secret_manager(self.ptr) {
            warn!(%error, secret_manager = %self.ptr, "failed to destroy secret manager");
        }
    }
}
