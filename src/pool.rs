//! Per-thread scratch space for the compressor
//!
//! A [`Scratch`] bundles one hash-table pool and one output buffer. Under
//! `std` every thread owns one in thread-local storage, so concurrent
//! compressions never contend on a lock.
//!
//! The thread scratch cannot be taken twice on the same thread: a nested
//! [`with_thread_scratch`] returns [`Error::PoolBusy`](crate::Error::PoolBusy)
//! instead of handing out a second borrow of a table that is mid-scan.

use crate::buffer::OutputBuffer;
use crate::table::TablePool;

/// Reusable state for one compression at a time
#[derive(Debug, Default)]
pub struct Scratch {
    /// Match-finder tables
    pub tables: TablePool,
    /// Staging buffer for compressed bytes
    pub buffer: OutputBuffer,
}

impl Scratch {
    /// Create empty scratch space; tables and buffer allocate on first use
    pub const fn new() -> Self {
        Self {
            tables: TablePool::new(),
            buffer: OutputBuffer::new(),
        }
    }
}

#[cfg(feature = "std")]
std::thread_local! {
    static THREAD_SCRATCH: core::cell::RefCell<Scratch> = const { core::cell::RefCell::new(Scratch::new()) };
}

/// Run `f` with this thread's scratch space
///
/// The borrow is released when `f` returns or unwinds.
#[cfg(feature = "std")]
pub fn with_thread_scratch<R>(f: impl FnOnce(&mut Scratch) -> R) -> crate::Result<R> {
    THREAD_SCRATCH.with(|cell| {
        let mut scratch = cell.try_borrow_mut().map_err(|_| crate::Error::PoolBusy)?;
        Ok(f(&mut scratch))
    })
}
