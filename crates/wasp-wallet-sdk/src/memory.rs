//! Protected memory for secret-bearing bytes
//!
//! A [`GuardedBuffer`] owns a fixed-capacity heap region that never
//! reallocates in place. Growing allocates a fresh region, copies, and scrubs
//! the old one before it is freed, so no stale copy of the contents is ever
//! handed back to the allocator. On unix the region is also `mlock`ed on a
//! best-effort basis so it stays out of swap.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::Utf8Error;
use tracing::debug;
use zeroize::Zeroize;

/// Heap bytes that are scrubbed before they are freed
pub struct GuardedBuffer {
    bytes: Box<[u8]>,
    len: usize,
    locked: bool,
}

impl GuardedBuffer {
    /// Allocate a zero-filled region of exactly `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        // vec![0; n] is a single zeroed allocation, into_boxed_slice keeps it
        let bytes = vec![0u8; capacity].into_boxed_slice();
        let locked = lock_region(&bytes);
        Self {
            bytes,
            len: 0,
            locked,
        }
    }

    /// Copy `data` into a new region sized to fit it exactly
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buffer = Self::with_capacity(data.len());
        buffer.bytes[..data.len()].copy_from_slice(data);
        buffer.len = data.len();
        buffer
    }

    /// Append bytes, moving to a larger region when the current one is full
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        let needed = self.len + data.len();
        if needed > self.capacity() {
            self.grow(needed);
        }
        self.bytes[self.len..needed].copy_from_slice(data);
        self.len = needed;
    }

    fn grow(&mut self, needed: usize) {
        let capacity = needed.max(self.capacity().saturating_mul(2)).max(64);
        let mut grown = Self::with_capacity(capacity);
        grown.bytes[..self.len].copy_from_slice(self.as_bytes());
        grown.len = self.len;
        // the previous region is scrubbed by its Drop
        drop(std::mem::replace(self, grown));
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the OS accepted the page lock for this region
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Zero the contents and keep the allocation
    pub fn clear(&mut self) {
        self.bytes.zeroize();
        self.len = 0;
    }

    /// Scrub and free the region
    pub fn release(self) {
        drop(self);
    }
}

impl Clone for GuardedBuffer {
    /// Copies into a second guarded region; both copies are scrubbed independently
    fn clone(&self) -> Self {
        Self::from_slice(self.as_bytes())
    }
}

impl Drop for GuardedBuffer {
    fn drop(&mut self) {
        self.bytes.zeroize();
        if self.locked {
            unlock_region(&self.bytes);
        }
    }
}

impl fmt::Debug for GuardedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn lock_region(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    // SAFETY: the range is a live allocation owned by the caller
    let locked = unsafe { libc::mlock(bytes.as_ptr().cast(), bytes.len()) == 0 };
    if !locked {
        debug!(
            len = bytes.len(),
            error = %std::io::Error::last_os_error(),
            "mlock refused; buffer stays swappable"
        );
    }
    locked
}

#[cfg(unix)]
fn unlock_region(bytes: &[u8]) {
    // SAFETY: same range that was passed to mlock
    unsafe {
        libc::munlock(bytes.as_ptr().cast(), bytes.len());
    }
}

#[cfg(not(unix))]
fn lock_region(_bytes: &[u8]) -> bool {
    false
}

#[cfg(not(unix))]
fn unlock_region(_bytes: &[u8]) {}

/// A UTF-8 secret held in guarded memory
///
/// Serializes as a plain JSON string straight out of the guarded region, so a
/// secret placed inside a request never passes through an unprotected copy.
#[derive(Clone)]
pub struct Secret(GuardedBuffer);

impl Secret {
    /// Take ownership of guarded bytes, rejecting invalid UTF-8
    pub fn new(buffer: GuardedBuffer) -> Result<Self, Utf8Error> {
        buffer.as_str()?;
        Ok(Self(buffer))
    }

    /// Copy a string into guarded memory
    ///
    /// The caller remains responsible for the source string.
    pub fn from_str_copy(value: &str) -> Self {
        Self(GuardedBuffer::from_slice(value.as_bytes()))
    }

    /// Borrow the secret text
    pub fn expose(&self) -> &str {
        // validated at construction
        self.0.as_str().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_buffer(self) -> GuardedBuffer {
        self.0
    }

    pub fn release(self) {
        self.0.release();
    }
}

impl From<String> for Secret {
    /// Moves the string into guarded memory and scrubs the original
    fn from(mut value: String) -> Self {
        let secret = Self::from_str_copy(&value);
        value.zeroize();
        secret
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}
