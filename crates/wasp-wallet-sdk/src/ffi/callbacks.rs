//! Native-to-Rust event trampoline
//!
//! The native module calls back through a plain `extern "C" fn` with no user
//! data pointer, so the destination lives in process-wide slots. Only one
//! subscription is active at a time; a new one replaces the previous sink and
//! closes its stream.
//!
//! The string-release entry point is kept in a slot of its own that outlives
//! the subscription. The native side may still fire after a stream ended, and
//! those strings are copied and scrubbed like any other so they are destroyed
//! exactly once. Only when the module itself is gone are late events left
//! alone.

use crate::events::WalletEvent;
use crate::ffi::handles::WalletPtr;
use crate::ffi::reclaim::Reclaimer;
use parking_lot::{const_mutex, Mutex};
use std::ffi::c_char;
use std::ptr::NonNull;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace, warn};

struct EventSink {
    /// Identifies the SDK instance that installed the sink
    owner: u64,
    wallet: WalletPtr,
    sender: UnboundedSender<WalletEvent>,
}

struct ModuleReclaimer {
    owner: u64,
    reclaimer: Reclaimer,
}

static EVENT_SINK: Mutex<Option<EventSink>> = const_mutex(None);
static EVENT_RECLAIMER: Mutex<Option<ModuleReclaimer>> = const_mutex(None);

/// Route future callbacks for `wallet` to a fresh channel
pub(crate) fn install(
    owner: u64,
    wallet: WalletPtr,
    reclaimer: Reclaimer,
) -> UnboundedReceiver<WalletEvent> {
    let (sender, receiver) = mpsc::unbounded_channel();
    *EVENT_RECLAIMER.lock() = Some(ModuleReclaimer { owner, reclaimer });
    let previous = EVENT_SINK.lock().replace(EventSink {
        owner,
        wallet,
        sender,
    });
    if previous.is_some() {
        debug!("replaced existing wallet event sink");
    }
    receiver
}

/// Drop the sink if `owner` installed it
pub(crate) fn uninstall(owner: u64) -> bool {
    remove_sink(|sink| sink.owner == owner)
}

/// Drop the sink only if it belongs to `wallet` of `owner`
pub(crate) fn uninstall_for(owner: u64, wallet: WalletPtr) -> bool {
    remove_sink(|sink| sink.owner == owner && sink.wallet == wallet)
}

/// Forget everything `owner` installed; its module is about to go away
pub(crate) fn detach(owner: u64) {
    uninstall(owner);
    let mut slot = EVENT_RECLAIMER.lock();
    if slot.as_ref().map(|entry| entry.owner) == Some(owner) {
        *slot = None;
        trace!(owner, "wallet event reclaimer removed");
    }
}

fn remove_sink(matches: impl FnOnce(&EventSink) -> bool) -> bool {
    let mut slot = EVENT_SINK.lock();
    match slot.as_ref() {
        Some(sink) if matches(sink) => {
            trace!(owner = sink.owner, wallet = %sink.wallet, "wallet event sink removed");
            *slot = None;
            true
        }
        _ => false,
    }
}

/// Entry point handed to the native `listen_wallet`
pub(crate) extern "C" fn wallet_event_trampoline(event: *const c_char) {
    let Some(token) = NonNull::new(event.cast_mut()) else {
        warn!("native module delivered a null wallet event");
        return;
    };

    let reclaimer = EVENT_RECLAIMER.lock().as_ref().map(|entry| entry.reclaimer);
    let Some(reclaimer) = reclaimer else {
        warn!("wallet event arrived after its module was released; left to the native side");
        return;
    };

    // SAFETY: the native module hands over ownership of a NUL-terminated string
    let reclaimed = unsafe { reclaimer.reclaim(token) };
    let (buffer, _anomaly) = reclaimed.into_parts();
    let event = WalletEvent::new(buffer);

    let slot = EVENT_SINK.lock();
    match slot.as_ref() {
        Some(sink) => {
            if sink.sender.send(event).is_err() {
                debug!("wallet event stream closed; event scrubbed");
            }
        }
        None => debug!("wallet event arrived with no active subscription; event scrubbed"),
    }
}
