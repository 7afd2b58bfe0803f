//! packlz: LZ4 block compression for MessagePack payloads
//!
//! This crate compresses serialized MessagePack bytes with the LZ4 block
//! format and wraps the result in a single MessagePack extension, so a
//! reader can tell compressed payloads from raw ones without any side
//! channel.
//!
//! # Block Format
//!
//! ```text
//! +----------------------------+----------------------+--------------------+
//! | ext header (type 99)       | 0xd2 + i32 BE length | LZ4 token stream   |
//! +----------------------------+----------------------+--------------------+
//! ```
//!
//! Payloads shorter than the threshold (64 bytes by default), and payloads
//! that do not shrink, are written as-is.
//!
//! # Features
//!
//! - Safe compressor and decompressor, every read and write bounds-checked
//! - Per-thread reusable hash tables and output buffers, no locking
//! - Decoder rejects truncated or hostile streams, never allocates more
//!   than the configured maximum
//! - `no_std` support through the explicit-context [`BlockCodec`]
//!
//! # Example
//!
//! ```rust
//! use packlz::*;
//!
//! let payload = b"abcdabcdabcdabcd".repeat(16);
//! let framed = maybe_compress(&payload)?;
//! assert!(framed.len() < payload.len());
//!
//! let restored = maybe_decompress(&framed)?;
//! assert_eq!(restored, payload);
//!
//! // short payloads are left alone
//! assert_eq!(maybe_compress(b"tiny")?, b"tiny");
//! # Ok::<(), packlz::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod block;
pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ext;
pub mod length;
pub mod options;
pub mod pool;
pub mod table;

#[cfg(all(feature = "std", test))]
pub mod bench;

// Re-export main types
pub use block::{inspect, BlockCodec, BlockInfo, BlockKind};
pub use encoder::max_compressed_size;
pub use error::{Error, Result};
pub use options::{BlockOptions, CompressionMode};
pub use pool::Scratch;

#[cfg(feature = "std")]
pub use block::{decode_block, decode_block_with, encode_block, encode_block_with};

/// MessagePack extension type code of an LZ4 block
pub const LZ4_BLOCK_EXT_TYPE: i8 = 99;

/// Payloads shorter than this are not compressed by default
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 64;

/// Default cap on a block's declared uncompressed length (64 MiB)
pub const DEFAULT_MAX_UNCOMPRESSED_LEN: usize = 64 * 1024 * 1024;

/// Compress serialized bytes if worthwhile
///
/// The output is either `bytes` unchanged or one LZ4 extension block.
#[cfg(feature = "std")]
pub fn maybe_compress(bytes: &[u8]) -> Result<alloc::vec::Vec<u8>> {
    encode_block(bytes)
}

/// Undo [`maybe_compress`]
///
/// Raw payloads come back unchanged; a corrupt block is an error.
#[cfg(feature = "std")]
pub fn maybe_decompress(bytes: &[u8]) -> Result<alloc::vec::Vec<u8>> {
    decode_block(bytes)
}
