//! Wallet facade
//!
//! A [`Wallet`] owns its native wallet token. The client and secret manager
//! the native wallet uses internally are looked up once at creation and are
//! only ever borrowed; destroying the wallet releases them natively.

use crate::chain::Chain;
use crate::dispatch::Sdk;
use crate::error::SdkResult;
use crate::events::{EventStream, WalletEventType};
use crate::ffi::{ClientPtr, SecretManagerPtr, WalletPtr};
use crate::memory::Secret;
use crate::methods::{CallAccountMethodData, ClientMethod, NoData, WalletMethod};
use crate::secret_manager::SecretManager;
use crate::types::{Ed25519Signature, GenerateAddressOptions, LedgerNanoStatus, WalletOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Wallet<'a> {
    sdk: &'a Sdk,
    wallet: WalletPtr,
    client: ClientPtr,
    secret_manager: SecretManagerPtr,
}

impl<'a> Wallet<'a> {
    /// Create a native wallet and resolve its client and secret manager
    ///
    /// If either lookup fails the new wallet is destroyed again before the
    /// error is returned.
    pub fn create(sdk: &'a Sdk, options: &WalletOptions) -> SdkResult<Self> {
        let wallet = sdk.create_wallet(options)?;

        let relations = sdk.get_client_from_wallet(wallet).and_then(|client| {
            let secret_manager = sdk.get_secret_manager_from_wallet(wallet)?;
            Ok((client, secret_manager))
        });

        match relations {
            Ok((client, secret_manager)) => {
                debug!(%wallet, %client, %secret_manager, "wallet ready");
                Ok(Self {
                    sdk,
                    wallet,
                    client,
                    secret_manager,
                })
            }
            Err(error) => {
                if let Err(cleanup) = sdk.destroy_wallet(wallet) {
                    warn!(error = %cleanup, %wallet, "failed to destroy half-initialised wallet");
                }
                Err(error)
            }
        }
    }

    pub fn as_ptr(&self) -> WalletPtr {
        self.wallet
    }

    pub fn client_ptr(&self) -> ClientPtr {
        self.client
    }

    pub fn secret_manager_ptr(&self) -> SecretManagerPtr {
        self.secret_manager
    }

    /// The wallet's own secret manager, borrowed for as long as the wallet lives
    pub fn secret_manager(&self) -> SecretManager<'_> {
        SecretManager::borrowed(self.sdk, self.secret_manager)
    }

    fn call<T: DeserializeOwned>(&self, method: &WalletMethod) -> SdkResult<T> {
        self.sdk.call_wallet_method_typed(self.wallet, method)
    }

    pub fn get_ledger_status(&self) -> SdkResult<LedgerNanoStatus> {
        self.call(&WalletMethod::GetLedgerNanoStatus(NoData))
    }

    /// Create an account; the account document is returned as-is
    pub fn create_account(&self, alias: Option<&str>, bech32_hrp: Option<&str>) -> SdkResult<Value> {
        self.call(&WalletMethod::CreateAccount {
            alias: alias.map(str::to_string),
            bech32_hrp: bech32_hrp.map(str::to_string),
        })
    }

    pub fn get_accounts(&self) -> SdkResult<Vec<Value>> {
        self.call(&WalletMethod::GetAccounts(NoData))
    }

    pub fn generate_ed25519_address(
        &self,
        account_index: u32,
        address_index: u32,
        bech32_hrp: Option<&str>,
        options: Option<GenerateAddressOptions>,
    ) -> SdkResult<String> {
        self.call(&WalletMethod::GenerateEd25519Address {
            account_index,
            address_index,
            bech32_hrp: bech32_hrp.map(str::to_string),
            options,
        })
    }

    /// Store a mnemonic through the wallet's secret manager
    pub fn store_mnemonic(&self, mnemonic: Secret) -> SdkResult<bool> {
        self.secret_manager().store_mnemonic(mnemonic)
    }

    pub fn set_stronghold_password(&self, password: Secret) -> SdkResult<bool> {
        self.sdk
            .call_wallet_method_status(self.wallet, &WalletMethod::SetStrongholdPassword { password })
    }

    /// Run a method against one account and decode its payload
    pub fn call_account_method<T, M>(&self, account_id: u32, method: M) -> SdkResult<T>
    where
        T: DeserializeOwned,
        M: Serialize,
    {
        let request = CallAccountMethodData::new(account_id, method).into_request();
        self.sdk.call_wallet_method_typed(self.wallet, &request)
    }

    /// Run a method against one account, reporting only whether it succeeded
    pub fn call_account_method_status<M: Serialize>(
        &self,
        account_id: u32,
        method: M,
    ) -> SdkResult<bool> {
        let request = CallAccountMethodData::new(account_id, method).into_request();
        self.sdk.call_wallet_method_status(self.wallet, &request)
    }

    /// Sign a transaction essence with the wallet's secret manager
    pub fn sign_transaction_essence(
        &self,
        essence: impl Into<String>,
        chain: impl Into<Chain>,
    ) -> SdkResult<Ed25519Signature> {
        self.secret_manager().sign_transaction_essence(essence, chain)
    }

    /// Node info from the wallet's client
    pub fn get_node_info(&self) -> SdkResult<Value> {
        self.sdk
            .call_client_method_typed(self.client, &ClientMethod::GetInfo(NoData))
    }

    /// Subscribe to wallet events; an empty slice subscribes to all of them
    pub fn listen(&self, event_types: &[WalletEventType]) -> SdkResult<EventStream> {
        let event_types = if event_types.is_empty() {
            &WalletEventType::ALL[..]
        } else {
            event_types
        };
        self.sdk.listen_wallet(self.wallet, event_types)
    }

    /// Clear native listeners and end the local event stream
    pub fn clear_listeners(&self, event_types: &[WalletEventType]) -> SdkResult<bool> {
        let cleared = self.sdk.call_wallet_method_status(
            self.wallet,
            &WalletMethod::ClearListeners {
                event_types: event_types.to_vec(),
            },
        )?;
        self.sdk.stop_events();
        Ok(cleared)
    }

    /// Destroy the native wallet now instead of on drop
    pub fn destroy(mut self) -> SdkResult<()> {
        let wallet = std::mem::replace(&mut self.wallet, WalletPtr::NULL);
        self.sdk.destroy_wallet(wallet)
    }
}

impl Drop for Wallet<'_> {
    fn drop(&mut self) {
        if self.wallet.is_null() {
            return;
        }
        if let Err(error) = self.sdk.destroy_wallet(self.wallet) {
            warn!(%error, wallet = %self.wallet, "failed to destroy wallet");
        }
    }
}
