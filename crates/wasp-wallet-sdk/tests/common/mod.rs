//! In-process stand-in for the native wallet module
//!
//! Every export is a Rust `extern "C"` function over process-wide state, so
//! tests using it must run `#[serial]` and call [`reset`] first.

#![allow(dead_code)]

use parking_lot::{const_mutex, Mutex};
use std::collections::{HashMap, VecDeque};
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use wasp_wallet_sdk::ffi::symbols::*;
use wasp_wallet_sdk::{DispatchOptions, Sdk, SdkResult};

pub const ECHO_42: &str = r#"{"type":"success","payload":"42"}"#;

/// What the next `call_*_method` answers
enum Reply {
    Json(String),
    /// Null sentinel with this last-error text
    Fail(Option<String>),
}

static REPLIES: Mutex<VecDeque<Reply>> = const_mutex(VecDeque::new());
static REQUESTS: Mutex<Vec<String>> = const_mutex(Vec::new());
static LAST_ERROR: Mutex<Option<CString>> = const_mutex(None);
static EVENT_CALLBACK: Mutex<Option<EventCallbackFn>> = const_mutex(None);

static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(0x1000);
static STRINGS_DESTROYED: AtomicUsize = AtomicUsize::new(0);
static RESOURCES_DESTROYED: AtomicUsize = AtomicUsize::new(0);
static DESTROY_STRING_OK: AtomicBool = AtomicBool::new(true);
static CREATE_FAILS: AtomicBool = AtomicBool::new(false);
static RELATION_FAILS: AtomicBool = AtomicBool::new(false);
static LISTEN_ACCEPTS: AtomicBool = AtomicBool::new(true);
static LOGGER_ACCEPTS: AtomicBool = AtomicBool::new(true);
static MIRROR: AtomicBool = AtomicBool::new(false);

/// Method names starting with this fail with the remainder as last error
pub const MIRROR_FAIL_PREFIX: &str = "fail:";

pub fn reset() {
    REPLIES.lock().clear();
    REQUESTS.lock().clear();
    *LAST_ERROR.lock() = None;
    *EVENT_CALLBACK.lock() = None;
    STRINGS_DESTROYED.store(0, Ordering::SeqCst);
    RESOURCES_DESTROYED.store(0, Ordering::SeqCst);
    DESTROY_STRING_OK.store(true, Ordering::SeqCst);
    CREATE_FAILS.store(false, Ordering::SeqCst);
    RELATION_FAILS.store(false, Ordering::SeqCst);
    LISTEN_ACCEPTS.store(true, Ordering::SeqCst);
    LOGGER_ACCEPTS.store(true, Ordering::SeqCst);
    MIRROR.store(false, Ordering::SeqCst);
}

/// Queue a JSON response for the next method call
pub fn reply(json: &str) {
    REPLIES.lock().push_back(Reply::Json(json.to_string()));
}

/// Queue a null-sentinel failure for the next method call
pub fn fail_next(last_error: Option<&str>) {
    REPLIES.lock().push_back(Reply::Fail(last_error.map(str::to_string)));
}

pub fn set_last_error(message: Option<&str>) {
    *LAST_ERROR.lock() = message.map(|m| CString::new(m).unwrap());
}

pub fn refuse_string_destroy() {
    DESTROY_STRING_OK.store(false, Ordering::SeqCst);
}

pub fn fail_creates() {
    CREATE_FAILS.store(true, Ordering::SeqCst);
}

pub fn fail_relations() {
    RELATION_FAILS.store(true, Ordering::SeqCst);
}

pub fn reject_logger() {
    LOGGER_ACCEPTS.store(false, Ordering::SeqCst);
}

/// Answer every method call from its own request instead of the reply queue
///
/// A method named `fail:<text>` fails with `<text>` as last error; any other
/// answers `{"type":"success","payload":{"name":<name>,"token":<token>}}`.
/// Safe to use from several threads at once.
pub fn mirror_requests() {
    MIRROR.store(true, Ordering::SeqCst);
}

pub fn reject_listen() {
    LISTEN_ACCEPTS.store(false, Ordering::SeqCst);
}

pub fn strings_destroyed() -> usize {
    STRINGS_DESTROYED.load(Ordering::SeqCst)
}

pub fn resources_destroyed() -> usize {
    RESOURCES_DESTROYED.load(Ordering::SeqCst)
}

/// Every request document received so far, in order
pub fn requests() -> Vec<String> {
    REQUESTS.lock().clone()
}

pub fn last_request() -> serde_json::Value {
    let requests = REQUESTS.lock();
    let last = requests.last().expect("no request recorded");
    serde_json::from_str(last).unwrap()
}

/// Deliver an event the way the native module would; `false` if nobody subscribed
pub fn emit_event(json: &str) -> bool {
    let callback = *EVENT_CALLBACK.lock();
    match callback {
        Some(callback) => {
            callback(CString::new(json).unwrap().into_raw());
            true
        }
        None => false,
    }
}

unsafe fn record(request: *const c_char) {
    let text = CStr::from_ptr(request).to_string_lossy().into_owned();
    REQUESTS.lock().push(text);
}

fn next_reply() -> *mut c_char {
    let reply = REPLIES
        .lock()
        .pop_front()
        .unwrap_or_else(|| Reply::Json(ECHO_42.to_string()));
    match reply {
        Reply::Json(json) => CString::new(json).unwrap().into_raw(),
        Reply::Fail(message) => {
            set_last_error(message.as_deref());
            std::ptr::null_mut()
        }
    }
}

/// Reply derived from the request alone
unsafe fn mirror(token: usize, request: *const c_char) -> *mut c_char {
    let request: serde_json::Value =
        serde_json::from_slice(CStr::from_ptr(request).to_bytes()).unwrap();
    let name = request["name"].as_str().unwrap_or_default();
    match name.strip_prefix(MIRROR_FAIL_PREFIX) {
        Some(message) => {
            set_last_error(Some(message));
            // widen the window between failing and the error read
            std::thread::yield_now();
            std::ptr::null_mut()
        }
        None => {
            let reply = serde_json::json!({
                "type": "success",
                "payload": {"name": name, "token": token},
            });
            CString::new(reply.to_string()).unwrap().into_raw()
        }
    }
}

fn answer(token: usize, request: *const c_char) -> *mut c_char {
    // SAFETY: the dispatcher passes a live NUL-terminated request
    unsafe {
        if MIRROR.load(Ordering::SeqCst) {
            mirror(token, request)
        } else {
            record(request);
            next_reply()
        }
    }
}

unsafe extern "C" fn init_logger(config: *const c_char) -> bool {
    record(config);
    if !LOGGER_ACCEPTS.load(Ordering::SeqCst) {
        set_last_error(Some("logger already initialised"));
        return false;
    }
    true
}

unsafe extern "C" fn create(options: *const c_char) -> usize {
    record(options);
    if CREATE_FAILS.load(Ordering::SeqCst) {
        set_last_error(Some("invalid options"));
        return 0;
    }
    NEXT_TOKEN.fetch_add(0x10, Ordering::SeqCst)
}

unsafe extern "C" fn destroy(_token: usize) -> bool {
    RESOURCES_DESTROYED.fetch_add(1, Ordering::SeqCst);
    true
}

unsafe extern "C" fn destroy_string(buffer: *mut c_char) -> bool {
    drop(CString::from_raw(buffer));
    STRINGS_DESTROYED.fetch_add(1, Ordering::SeqCst);
    if !DESTROY_STRING_OK.load(Ordering::SeqCst) {
        set_last_error(Some("double free detected"));
        return false;
    }
    true
}

unsafe extern "C" fn client_from_wallet(wallet: usize) -> usize {
    if RELATION_FAILS.load(Ordering::SeqCst) {
        set_last_error(Some("wallet has no client"));
        return 0;
    }
    wallet + 1
}

unsafe extern "C" fn secret_manager_from_wallet(wallet: usize) -> usize {
    wallet + 2
}

unsafe extern "C" fn call_method(token: usize, request: *const c_char) -> *mut c_char {
    answer(token, request)
}

unsafe extern "C" fn call_utils_method(request: *const c_char) -> *mut c_char {
    answer(0, request)
}

unsafe extern "C" fn last_error() -> *const c_char {
    // The CString stays put until the next set_last_error
    LAST_ERROR
        .lock()
        .as_ref()
        .map_or(std::ptr::null(), |message| message.as_ptr())
}

unsafe extern "C" fn listen_wallet(
    _wallet: usize,
    events: *const c_char,
    callback: EventCallbackFn,
) -> bool {
    record(events);
    if !LISTEN_ACCEPTS.load(Ordering::SeqCst) {
        set_last_error(Some("listener rejected"));
        return false;
    }
    *EVENT_CALLBACK.lock() = Some(callback);
    true
}

/// Symbol table over the stub exports
pub struct StubModule {
    symbols: HashMap<&'static str, *const c_void>,
}

impl StubModule {
    pub fn new() -> Self {
        let symbols: [(&'static str, *const c_void); 16] = [
            ("init_logger", init_logger as InitLoggerFn as *const c_void),
            ("create_client", create as CreateFn as *const c_void),
            ("create_wallet", create as CreateFn as *const c_void),
            ("create_secret_manager", create as CreateFn as *const c_void),
            ("destroy_client", destroy as DestroyFn as *const c_void),
            ("destroy_wallet", destroy as DestroyFn as *const c_void),
            ("destroy_secret_manager", destroy as DestroyFn as *const c_void),
            ("destroy_string", destroy_string as DestroyStringFn as *const c_void),
            ("get_client_from_wallet", client_from_wallet as RelationFn as *const c_void),
            (
                "get_secret_manager_from_wallet",
                secret_manager_from_wallet as RelationFn as *const c_void,
            ),
            ("call_client_method", call_method as CallMethodFn as *const c_void),
            ("call_wallet_method", call_method as CallMethodFn as *const c_void),
            ("call_secret_manager_method", call_method as CallMethodFn as *const c_void),
            ("call_utils_method", call_utils_method as CallUtilsMethodFn as *const c_void),
            ("binding_get_last_error", last_error as LastErrorFn as *const c_void),
            (LISTEN_WALLET_SYMBOL, listen_wallet as ListenWalletFn as *const c_void),
        ];
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Drop exports from the table
    pub fn without(mut self, names: &[&'static str]) -> Self {
        for name in names {
            self.symbols.remove(name);
        }
        self
    }

    pub fn bind(&self, options: DispatchOptions) -> SdkResult<Sdk> {
        // SAFETY: every entry points at a stub with the declared signature,
        // and the stubs are 'static
        unsafe { Sdk::from_symbols(self, options) }
    }

    pub fn sdk(&self) -> Sdk {
        self.bind(DispatchOptions::default()).unwrap()
    }
}

impl SymbolSource for StubModule {
    fn symbol_address(&self, name: &str) -> Option<*const c_void> {
        self.symbols.get(name).copied()
    }
}
