//! Request encoding into guarded memory
//!
//! Requests are streamed by `serde_json` directly into a [`GuardedBuffer`]
//! through [`GuardedWriter`]; the serializer never builds an intermediate
//! `String` or `Vec`, so the only copy of a secret-bearing request lives in
//! scrubbed memory. The encoded bytes are NUL-terminated and handed to the
//! native side as a borrowed C string for the duration of one call.

use crate::error::{SdkError, SdkResult};
use crate::memory::GuardedBuffer;
use serde::Serialize;
use std::ffi::c_char;
use std::io;
use tracing::trace;

/// Starting capacity for request buffers; most requests fit without growing
const INITIAL_REQUEST_CAPACITY: usize = 512;

/// `io::Write` sink backed by guarded memory
pub struct GuardedWriter {
    buffer: GuardedBuffer,
}

impl GuardedWriter {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_REQUEST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: GuardedBuffer::with_capacity(capacity),
        }
    }

    pub fn into_buffer(self) -> GuardedBuffer {
        self.buffer
    }
}

impl Default for GuardedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for GuardedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An encoded, NUL-terminated request held in guarded memory
///
/// Dropping it scrubs and frees the bytes.
#[derive(Debug)]
pub struct SealedRequest {
    buffer: GuardedBuffer,
}

impl SealedRequest {
    /// Pointer valid for as long as `self` is alive
    pub fn as_ptr(&self) -> *const c_char {
        self.buffer.as_bytes().as_ptr().cast()
    }

    /// The JSON document without its terminator
    pub fn json(&self) -> &[u8] {
        let bytes = self.buffer.as_bytes();
        &bytes[..bytes.len() - 1]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn release(self) {
        self.buffer.release();
    }
}

/// Encode a request or options document for the native side
pub fn encode<T: Serialize + ?Sized>(request: &T) -> SdkResult<SealedRequest> {
    let mut writer = GuardedWriter::new();
    serde_json::to_writer(&mut writer, request).map_err(|e| SdkError::Encoding(e.to_string()))?;
    let mut buffer = writer.into_buffer();

    // JSON escapes U+0000, so a raw NUL can only come from a broken serializer
    if buffer.as_bytes().contains(&0) {
        return Err(SdkError::Encoding(
            "encoded request contains a NUL byte".to_string(),
        ));
    }

    buffer.extend_from_slice(&[0]);
    trace!(len = buffer.len() - 1, "request sealed");
    Ok(SealedRequest { buffer })
}
