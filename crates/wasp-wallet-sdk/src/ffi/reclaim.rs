//! Taking ownership of native-allocated strings
//!
//! Every non-null string the native module returns is copied once into a
//! [`GuardedBuffer`] and then handed back to `destroy_string` exactly once.
//! A refused destroy does not lose the copy; it is reported alongside it.

use crate::error::SdkError;
use crate::ffi::symbols::{DestroyStringFn, LastErrorFn, NativeApi};
use crate::memory::GuardedBuffer;
use std::ffi::{c_char, CStr};
use std::ptr::NonNull;
use tracing::{trace, warn};

/// Copies native strings out and releases them
#[derive(Clone, Copy)]
pub(crate) struct Reclaimer {
    destroy_string: DestroyStringFn,
    last_error: LastErrorFn,
}

/// A native string copied into guarded memory
#[derive(Debug)]
pub struct ReclaimedBuffer {
    buffer: GuardedBuffer,
    anomaly: Option<SdkError>,
}

impl ReclaimedBuffer {
    pub fn buffer(&self) -> &GuardedBuffer {
        &self.buffer
    }

    /// Set when the native side refused to free its original
    pub fn anomaly(&self) -> Option<&SdkError> {
        self.anomaly.as_ref()
    }

    pub fn into_parts(self) -> (GuardedBuffer, Option<SdkError>) {
        (self.buffer, self.anomaly)
    }
}

impl Reclaimer {
    pub(crate) fn new(api: &NativeApi) -> Self {
        Self {
            destroy_string: api.destroy_string,
            last_error: api.binding_get_last_error,
        }
    }

    /// Copy and release one native string
    ///
    /// # Safety
    ///
    /// `token` must be a NUL-terminated string allocated by the native module
    /// and not yet destroyed. It is invalid after this call.
    pub(crate) unsafe fn reclaim(&self, token: NonNull<c_char>) -> ReclaimedBuffer {
        let bytes = CStr::from_ptr(token.as_ptr()).to_bytes();
        let buffer = GuardedBuffer::from_slice(bytes);

        let anomaly = if (self.destroy_string)(token.as_ptr()) {
            trace!(len = buffer.len(), "native buffer reclaimed");
            None
        } else {
            let reason = self
                .last_error()
                .unwrap_or_else(|| "destroy_string returned false".to_string());
            warn!(%reason, "native buffer was copied but not destroyed");
            Some(SdkError::BufferReclaim(reason))
        };

        ReclaimedBuffer { buffer, anomaly }
    }

    /// Read the native last-error text without taking ownership of it
    pub(crate) fn last_error(&self) -> Option<String> {
        // SAFETY: the accessor takes no arguments and returns null or a NUL-terminated string
        let ptr = unsafe { (self.last_error)() };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: non-null pointer from the accessor, valid until the next native call
        let message = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        (!message.is_empty()).then_some(message)
    }
}
