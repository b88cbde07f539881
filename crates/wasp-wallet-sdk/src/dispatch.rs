//! Native call dispatcher
//!
//! [`Sdk`] owns the loaded native module and drives every call through the
//! same sequence: encode the request into guarded memory, invoke the native
//! entry point, read the last error on a null sentinel, and otherwise copy
//! the returned string out and release it.
//!
//! The native last-error slot is global to the module. In
//! [`ErrorChannelMode::Serialized`] a process-wide lock is held from the
//! invoke until the error (or the reclaimed response) has been read, so one
//! thread's failure text can never be reported to another.

use crate::codec::{self, SealedRequest};
use crate::envelope::{self, Envelope};
use crate::error::{SdkError, SdkResult, GENERIC_NATIVE_ERROR};
use crate::events::{EventStream, WalletEventType};
use crate::ffi::callbacks;
use crate::ffi::reclaim::Reclaimer;
use crate::ffi::{
    ClientPtr, LibraryLoader, NativeApi, NativeLibrary, ResourceKind, SecretManagerPtr,
    SymbolSource, WalletPtr, LISTEN_WALLET_SYMBOL,
};
use crate::memory::{GuardedBuffer, Secret};
use crate::types::LoggerConfig;
use parking_lot::{const_mutex, Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::c_char;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};
use wasp_wallet_config::{Config, ErrorChannelMode};

static ERROR_CHANNEL: Mutex<()> = const_mutex(());
static NEXT_SDK_ID: AtomicU64 = AtomicU64::new(1);

/// Dispatcher behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    pub error_channel: ErrorChannelMode,
    /// Fail a call whose response buffer the native side refused to free
    pub strict_reclaim: bool,
}

impl DispatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            error_channel: config.error_channel(),
            strict_reclaim: config.strict_reclaim(),
        }
    }
}

/// A response copied out of native memory
///
/// The bytes live in guarded memory and are scrubbed when this is dropped
/// or released.
#[derive(Debug)]
pub struct NativeResponse {
    buffer: GuardedBuffer,
    anomaly: Option<SdkError>,
}

impl NativeResponse {
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Set when the native side kept its copy of this response
    pub fn reclaim_anomaly(&self) -> Option<&SdkError> {
        self.anomaly.as_ref()
    }

    pub fn envelope(&self) -> SdkResult<Envelope<'_>> {
        Envelope::parse(self.as_bytes())
    }

    /// Decode the payload, then scrub the response
    pub fn parse<T: DeserializeOwned>(self) -> SdkResult<T> {
        envelope::parse_typed(self.as_bytes())
    }

    /// `true` for a `success`/`ok` response, then scrub it
    pub fn parse_status(self) -> SdkResult<bool> {
        envelope::parse_status(self.as_bytes())
    }

    /// Decode a single-string payload into guarded memory, then scrub the response
    pub fn parse_secret(self) -> SdkResult<Secret> {
        envelope::parse_secret(self.as_bytes())
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for NativeResponse {
    fn drop(&mut self) {
        self.buffer.clear();
        trace!(state = "released");
    }
}

/// A loaded and bound native wallet module
pub struct Sdk {
    id: u64,
    api: NativeApi,
    /// `None` when bound to an in-process symbol source
    library: Option<NativeLibrary>,
    options: DispatchOptions,
}

impl Sdk {
    /// Load a native module by path or bare library name
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        Self::load_with(&LibraryLoader::new(), path.as_ref(), DispatchOptions::default())
    }

    /// Load the module named by a configuration and initialise the native
    /// logger when a `[logger]` section is present
    pub fn from_config(config: &Config) -> SdkResult<Self> {
        let path = config.require_library_path()?;

        let mut loader = LibraryLoader::new();
        for search_path in config.search_paths().iter().rev() {
            loader.add_search_path(search_path.clone());
        }

        let sdk = Self::load_with(&loader, path, DispatchOptions::from_config(config))?;
        if config.file.logger.is_some() {
            sdk.init_logger(&LoggerConfig::from(&config.logger()))?;
        }
        Ok(sdk)
    }

    fn load_with(loader: &LibraryLoader, path: &Path, options: DispatchOptions) -> SdkResult<Self> {
        let library = loader.open(&path.to_string_lossy())?;
        // SAFETY: the module is the native wallet library whose exports have the
        // declared signatures; it is kept alive in `self.library` alongside the table
        let api = unsafe { NativeApi::bind(&library)? };
        debug!(
            path = %library.path().display(),
            events = api.supports_events(),
            "native exports bound"
        );
        Ok(Self::with_api(api, Some(library), options))
    }

    /// Bind to a module that is already part of this process
    ///
    /// # Safety
    ///
    /// Every export the source reports must have the declared signature and
    /// stay valid for the lifetime of the returned `Sdk`.
    pub unsafe fn from_symbols(
        source: &dyn SymbolSource,
        options: DispatchOptions,
    ) -> SdkResult<Self> {
        let api = NativeApi::bind(source)?;
        debug!(events = api.supports_events(), "in-process exports bound");
        Ok(Self::with_api(api, None, options))
    }

    fn with_api(api: NativeApi, library: Option<NativeLibrary>, options: DispatchOptions) -> Self {
        Self {
            id: NEXT_SDK_ID.fetch_add(1, Ordering::Relaxed),
            api,
            library,
            options,
        }
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    pub fn supports_events(&self) -> bool {
        self.api.supports_events()
    }

    /// Release the native module
    ///
    /// Every handle issued by it is invalid afterwards; the borrow checker
    /// keeps facades from outliving this call.
    pub fn unload(mut self) -> SdkResult<()> {
        callbacks::detach(self.id);
        match self.library.take() {
            Some(library) => library.close(),
            None => Ok(()),
        }
    }

    /// Current native last-error text, if any
    pub fn last_error(&self) -> Option<String> {
        self.reclaimer().last_error()
    }

    fn reclaimer(&self) -> Reclaimer {
        Reclaimer::new(&self.api)
    }

    fn error_channel(&self) -> Option<MutexGuard<'static, ()>> {
        match self.options.error_channel {
            ErrorChannelMode::Serialized => Some(ERROR_CHANNEL.lock()),
            ErrorChannelMode::Concurrent => None,
        }
    }

    /// Error for a failed native call; must run before the channel lock is dropped
    fn native_failure(&self, kind: ResourceKind, operation: &str) -> SdkError {
        let message = self
            .last_error()
            .unwrap_or_else(|| GENERIC_NATIVE_ERROR.to_string());
        debug!(%kind, operation, %message, "native call failed");
        SdkError::Native(message)
    }

    /// Error for a failed module-level call that targets no resource
    fn lifecycle_failure(&self, operation: &str) -> SdkError {
        let message = self
            .last_error()
            .unwrap_or_else(|| GENERIC_NATIVE_ERROR.to_string());
        debug!(operation, %message, "native call failed");
        SdkError::Native(message)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Configure native logging
    pub fn init_logger(&self, config: &LoggerConfig) -> SdkResult<()> {
        let sealed = codec::encode(config)?;
        let _channel = self.error_channel();
        // SAFETY: bound export; `sealed` outlives the call
        if unsafe { (self.api.init_logger)(sealed.as_ptr()) } {
            trace!("native logger initialised");
            Ok(())
        } else {
            Err(self.lifecycle_failure("init_logger"))
        }
    }

    fn create(
        &self,
        kind: ResourceKind,
        options: &impl Serialize,
        create: unsafe extern "C" fn(*const c_char) -> usize,
    ) -> SdkResult<usize> {
        let sealed: SealedRequest = codec::encode(options)?;
        let _channel = self.error_channel();
        // SAFETY: bound export; `sealed` outlives the call
        let token = unsafe { create(sealed.as_ptr()) };
        if token == 0 {
            return Err(self.native_failure(kind, "create"));
        }
        trace!(%kind, token = format_args!("{:#x}", token), "resource created");
        Ok(token)
    }

    fn destroy(
        &self,
        kind: ResourceKind,
        token: usize,
        destroy: unsafe extern "C" fn(usize) -> bool,
    ) -> SdkResult<()> {
        if token == 0 {
            trace!(%kind, "destroy of null handle skipped");
            return Ok(());
        }
        let _channel = self.error_channel();
        // SAFETY: bound export; token was issued by this module
        if unsafe { destroy(token) } {
            trace!(%kind, token = format_args!("{:#x}", token), "resource destroyed");
            Ok(())
        } else {
            Err(self.native_failure(kind, "destroy"))
        }
    }

    fn relation(
        &self,
        kind: ResourceKind,
        wallet: WalletPtr,
        lookup: unsafe extern "C" fn(usize) -> usize,
    ) -> SdkResult<usize> {
        if wallet.is_null() {
            return Err(SdkError::InvalidHandle {
                kind: ResourceKind::Wallet,
            });
        }
        let _channel = self.error_channel();
        // SAFETY: bound export; wallet token was issued by this module
        let token = unsafe { lookup(wallet.as_raw()) };
        if token == 0 {
            return Err(self.native_failure(kind, "lookup from wallet"));
        }
        Ok(token)
    }

    pub fn create_client(&self, options: &impl Serialize) -> SdkResult<ClientPtr> {
        let token = self.create(ResourceKind::Client, options, self.api.create_client)?;
        // SAFETY: non-null token just issued by the module
        Ok(unsafe { ClientPtr::from_raw(token) })
    }

    pub fn create_wallet(&self, options: &impl Serialize) -> SdkResult<WalletPtr> {
        let token = self.create(ResourceKind::Wallet, options, self.api.create_wallet)?;
        // SAFETY: non-null token just issued by the module
        Ok(unsafe { WalletPtr::from_raw(token) })
    }

    pub fn create_secret_manager(&self, options: &impl Serialize) -> SdkResult<SecretManagerPtr> {
        let token = self.create(
            ResourceKind::SecretManager,
            options,
            self.api.create_secret_manager,
        )?;
        // SAFETY: non-null token just issued by the module
        Ok(unsafe { SecretManagerPtr::from_raw(token) })
    }

    /// Destroy a client; a null handle is a no-op
    pub fn destroy_client(&self, client: ClientPtr) -> SdkResult<()> {
        self.destroy(ResourceKind::Client, client.as_raw(), self.api.destroy_client)
    }

    /// Destroy a wallet; a null handle is a no-op
    ///
    /// Ends the event subscription only if it belongs to this wallet.
    pub fn destroy_wallet(&self, wallet: WalletPtr) -> SdkResult<()> {
        self.destroy(ResourceKind::Wallet, wallet.as_raw(), self.api.destroy_wallet)?;
        if !wallet.is_null() {
            callbacks::uninstall_for(self.id, wallet);
        }
        Ok(())
    }

    /// Destroy a secret manager; a null handle is a no-op
    pub fn destroy_secret_manager(&self, secret_manager: SecretManagerPtr) -> SdkResult<()> {
        self.destroy(
            ResourceKind::SecretManager,
            secret_manager.as_raw(),
            self.api.destroy_secret_manager,
        )
    }

    /// The client a wallet uses internally
    pub fn get_client_from_wallet(&self, wallet: WalletPtr) -> SdkResult<ClientPtr> {
        let token = self.relation(ResourceKind::Client, wallet, self.api.get_client_from_wallet)?;
        // SAFETY: non-null token issued by the module
        Ok(unsafe { ClientPtr::from_raw(token) })
    }

    /// The secret manager a wallet uses internally
    pub fn get_secret_manager_from_wallet(&self, wallet: WalletPtr) -> SdkResult<SecretManagerPtr> {
        let token = self.relation(
            ResourceKind::SecretManager,
            wallet,
            self.api.get_secret_manager_from_wallet,
        )?;
        // SAFETY: non-null token issued by the module
        Ok(unsafe { SecretManagerPtr::from_raw(token) })
    }

    // ------------------------------------------------------------------
    // Method calls
    // ------------------------------------------------------------------

    /// Encode, invoke, and reclaim one method call
    fn call(
        &self,
        kind: ResourceKind,
        request: &(impl Serialize + ?Sized),
        invoke: impl FnOnce(*const c_char) -> *mut c_char,
    ) -> SdkResult<NativeResponse> {
        let sealed = codec::encode(request)?;
        trace!(%kind, state = "sealed");

        let channel = self.error_channel();
        let returned = invoke(sealed.as_ptr());
        sealed.release();
        trace!(%kind, state = "invoked");

        let Some(token) = NonNull::new(returned) else {
            let error = self.native_failure(kind, "call method");
            trace!(%kind, state = "failed");
            return Err(error);
        };

        trace!(%kind, state = "reclaiming");
        // SAFETY: non-null string returned by the module and not yet destroyed
        let reclaimed = unsafe { self.reclaimer().reclaim(token) };
        drop(channel);
        trace!(%kind, state = "reclaimed");

        let (buffer, anomaly) = reclaimed.into_parts();
        match anomaly {
            Some(error) if self.options.strict_reclaim => {
                buffer.release();
                trace!(%kind, state = "failed");
                Err(error)
            }
            anomaly => Ok(NativeResponse { buffer, anomaly }),
        }
    }

    pub fn call_client_method(
        &self,
        client: ClientPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<NativeResponse> {
        if client.is_null() {
            return Err(SdkError::InvalidHandle {
                kind: ResourceKind::Client,
            });
        }
        let call = self.api.call_client_method;
        // SAFETY: bound export; token issued by this module; request outlives the call
        self.call(ResourceKind::Client, request, |ptr| unsafe {
            call(client.as_raw(), ptr)
        })
    }

    pub fn call_wallet_method(
        &self,
        wallet: WalletPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<NativeResponse> {
        if wallet.is_null() {
            return Err(SdkError::InvalidHandle {
                kind: ResourceKind::Wallet,
            });
        }
        let call = self.api.call_wallet_method;
        // SAFETY: bound export; token issued by this module; request outlives the call
        self.call(ResourceKind::Wallet, request, |ptr| unsafe {
            call(wallet.as_raw(), ptr)
        })
    }

    pub fn call_secret_manager_method(
        &self,
        secret_manager: SecretManagerPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<NativeResponse> {
        if secret_manager.is_null() {
            return Err(SdkError::InvalidHandle {
                kind: ResourceKind::SecretManager,
            });
        }
        let call = self.api.call_secret_manager_method;
        // SAFETY: bound export; token issued by this module; request outlives the call
        self.call(ResourceKind::SecretManager, request, |ptr| unsafe {
            call(secret_manager.as_raw(), ptr)
        })
    }

    /// Stateless utility call; takes no resource handle
    pub fn call_utils_method(&self, request: &(impl Serialize + ?Sized)) -> SdkResult<NativeResponse> {
        let call = self.api.call_utils_method;
        // SAFETY: bound export; request outlives the call
        self.call(ResourceKind::Utils, request, |ptr| unsafe { call(ptr) })
    }

    pub fn call_client_method_typed<T: DeserializeOwned>(
        &self,
        client: ClientPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<T> {
        self.call_client_method(client, request)?.parse()
    }

    pub fn call_client_method_status(
        &self,
        client: ClientPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<bool> {
        self.call_client_method(client, request)?.parse_status()
    }

    pub fn call_wallet_method_typed<T: DeserializeOwned>(
        &self,
        wallet: WalletPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<T> {
        self.call_wallet_method(wallet, request)?.parse()
    }

    pub fn call_wallet_method_status(
        &self,
        wallet: WalletPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<bool> {
        self.call_wallet_method(wallet, request)?.parse_status()
    }

    pub fn call_secret_manager_method_typed<T: DeserializeOwned>(
        &self,
        secret_manager: SecretManagerPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<T> {
        self.call_secret_manager_method(secret_manager, request)?
            .parse()
    }

    pub fn call_secret_manager_method_status(
        &self,
        secret_manager: SecretManagerPtr,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<bool> {
        self.call_secret_manager_method(secret_manager, request)?
            .parse_status()
    }

    pub fn call_utils_method_typed<T: DeserializeOwned>(
        &self,
        request: &(impl Serialize + ?Sized),
    ) -> SdkResult<T> {
        self.call_utils_method(request)?.parse()
    }

    pub fn call_utils_method_status(&self, request: &(impl Serialize + ?Sized)) -> SdkResult<bool> {
        self.call_utils_method(request)?.parse_status()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Subscribe to wallet events
    ///
    /// Requires the optional `listen_wallet` export. A new subscription
    /// replaces any previous one, whose stream then ends.
    pub fn listen_wallet(
        &self,
        wallet: WalletPtr,
        event_types: &[WalletEventType],
    ) -> SdkResult<EventStream> {
        let listen = self.api.listen_wallet.ok_or_else(|| SdkError::SymbolBind {
            missing: vec![LISTEN_WALLET_SYMBOL.to_string()],
        })?;
        if wallet.is_null() {
            return Err(SdkError::InvalidHandle {
                kind: ResourceKind::Wallet,
            });
        }

        let sealed = codec::encode(event_types)?;
        let receiver = callbacks::install(self.id, wallet, self.reclaimer());

        let _channel = self.error_channel();
        // SAFETY: bound export; the trampoline is a 'static fn and `sealed` outlives the call
        let accepted = unsafe {
            listen(
                wallet.as_raw(),
                sealed.as_ptr(),
                callbacks::wallet_event_trampoline,
            )
        };

        if !accepted {
            callbacks::uninstall(self.id);
            let message = self
                .last_error()
                .unwrap_or_else(|| GENERIC_NATIVE_ERROR.to_string());
            warn!(%message, "wallet event subscription rejected");
            return Err(SdkError::EventSubscription(message));
        }

        debug!(events = event_types.len(), "wallet event subscription active");
        Ok(EventStream::new(receiver))
    }

    /// End the current event subscription, if this SDK installed it
    ///
    /// Events the native side still fires afterwards are released and
    /// scrubbed without being delivered.
    pub fn stop_events(&self) -> bool {
        callbacks::uninstall(self.id)
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        // the trampoline must never call into a module that is gone
        callbacks::detach(self.id);
    }
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("id", &self.id)
            .field("library", &self.library.as_ref().map(|l| l.path()))
            .field("options", &self.options)
            .finish()
    }
}
