//! Typed binding of the native module's exported entry points
//!
//! The set of exports is closed and declared once below. Binding resolves
//! every name up front and fails with the complete list of absent names, so a
//! half-bound module is never observable.

use crate::error::{SdkError, SdkResult};
use std::ffi::{c_char, c_void};
use std::fmt;

pub type InitLoggerFn = unsafe extern "C" fn(config: *const c_char) -> bool;
pub type CreateFn = unsafe extern "C" fn(options: *const c_char) -> usize;
pub type DestroyFn = unsafe extern "C" fn(token: usize) -> bool;
pub type DestroyStringFn = unsafe extern "C" fn(buffer: *mut c_char) -> bool;
pub type RelationFn = unsafe extern "C" fn(wallet: usize) -> usize;
pub type CallMethodFn = unsafe extern "C" fn(token: usize, request: *const c_char) -> *mut c_char;
pub type CallUtilsMethodFn = unsafe extern "C" fn(request: *const c_char) -> *mut c_char;
pub type LastErrorFn = unsafe extern "C" fn() -> *const c_char;

/// Callback the native module invokes with each wallet event (a native-owned string)
pub type EventCallbackFn = extern "C" fn(event: *const c_char);
pub type ListenWalletFn =
    unsafe extern "C" fn(wallet: usize, events: *const c_char, callback: EventCallbackFn) -> bool;

/// Optional export for wallet event subscription
pub const LISTEN_WALLET_SYMBOL: &str = "listen_wallet";

/// Anything that can report the address of an exported symbol
///
/// Implemented by [`NativeLibrary`](super::NativeLibrary); in-process modules
/// (tests, statically linked builds) can implement it over a table of
/// `extern "C"` functions.
pub trait SymbolSource {
    /// Address of the export `name`, or `None` when it is absent
    fn symbol_address(&self, name: &str) -> Option<*const c_void>;
}

macro_rules! native_api {
    ($($field:ident: $ty:ty = $symbol:literal,)+) => {
        /// Exports every native module must provide
        pub const REQUIRED_SYMBOLS: &[&str] = &[$($symbol),+];

        /// The bound entry points of one native module
        #[derive(Clone, Copy)]
        pub struct NativeApi {
            $(pub(crate) $field: $ty,)+
            pub(crate) listen_wallet: Option<ListenWalletFn>,
        }

        impl NativeApi {
            /// Resolve every export, or report all the missing ones at once
            ///
            /// # Safety
            ///
            /// Each export found under a required name must have the
            /// signature declared for it in this module, and the source must
            /// outlive the returned table.
            pub unsafe fn bind(source: &dyn SymbolSource) -> SdkResult<Self> {
                let mut missing = Vec::new();
                $(
                    let $field = source.symbol_address($symbol).filter(|p| !p.is_null());
                    if $field.is_none() {
                        missing.push($symbol.to_string());
                    }
                )+

                let listen_wallet = source
                    .symbol_address(LISTEN_WALLET_SYMBOL)
                    .filter(|p| !p.is_null())
                    .map(|p| std::mem::transmute::<*const c_void, ListenWalletFn>(p));

                match ($($field,)+) {
                    ($(Some($field),)+) => Ok(Self {
                        $($field: std::mem::transmute::<*const c_void, $ty>($field),)+
                        listen_wallet,
                    }),
                    _ => Err(SdkError::SymbolBind { missing }),
                }
            }
        }
    };
}

native_api! {
    init_logger: InitLoggerFn = "init_logger",
    create_client: CreateFn = "create_client",
    destroy_client: DestroyFn = "destroy_client",
    call_client_method: CallMethodFn = "call_client_method",
    create_wallet: CreateFn = "create_wallet",
    destroy_wallet: DestroyFn = "destroy_wallet",
    call_wallet_method: CallMethodFn = "call_wallet_method",
    get_client_from_wallet: RelationFn = "get_client_from_wallet",
    get_secret_manager_from_wallet: RelationFn = "get_secret_manager_from_wallet",
    create_secret_manager: CreateFn = "create_secret_manager",
    destroy_secret_manager: DestroyFn = "destroy_secret_manager",
    call_secret_manager_method: CallMethodFn = "call_secret_manager_method",
    call_utils_method: CallUtilsMethodFn = "call_utils_method",
    destroy_string: DestroyStringFn = "destroy_string",
    binding_get_last_error: LastErrorFn = "binding_get_last_error",
}

impl NativeApi {
    /// Whether the module exports the optional event subscription entry point
    pub fn supports_events(&self) -> bool {
        self.listen_wallet.is_some()
    }
}

impl fmt::Debug for NativeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeApi")
            .field("exports", &REQUIRED_SYMBOLS.len())
            .field("events", &self.supports_events())
            .finish()
    }
}
