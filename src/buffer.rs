//! Growable staging buffer for compressed output
//!
//! The buffer only grows. It is sized in power-of-two classes so a thread
//! that sees a stream of similar payloads settles on one allocation, and
//! reused bytes are never zeroed because the encoder always writes before
//! it reads.

use alloc::vec::Vec;

/// Smallest size class handed out
pub const MIN_SIZE_CLASS: usize = 256;

/// Reusable byte buffer
#[derive(Debug, Default)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer (no allocation)
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Borrow exactly `min_size` writable bytes, growing if needed
    ///
    /// Previously written bytes may still be present in the returned slice.
    pub fn rent(&mut self, min_size: usize) -> &mut [u8] {
        if self.buf.len() < min_size {
            self.buf.resize(size_class(min_size), 0);
        }
        &mut self.buf[..min_size]
    }

    /// Borrow the first `len` bytes written by a previous rent
    #[inline]
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.buf[..len]
    }

    /// Current size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been allocated yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Round a request up to its size class
#[inline]
fn size_class(min_size: usize) -> usize {
    min_size
        .max(MIN_SIZE_CLASS)
        .checked_next_power_of_two()
        .unwrap_or(min_size)
}
