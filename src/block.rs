//! LZ4 block framing
//!
//! A compressed payload travels as one MessagePack extension of type
//! [`LZ4_BLOCK_EXT_TYPE`]:
//!
//! ```text
//! +----------------------+-------------------------+----------------------+
//! | ext header (type 99) | int32 uncompressed len  | LZ4 token stream     |
//! +----------------------+-------------------------+----------------------+
//! ```
//!
//! Anything else is a raw payload and is returned unchanged by the reader.
//! Payloads below the threshold, and payloads that compression would not
//! shrink, are written raw. A payload whose first bytes could be read as an
//! LZ4 block header is always framed, so reading back what was written is
//! never ambiguous.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use tracing::{debug, trace};

use crate::encoder::{self, max_compressed_size, MAX_INPUT_SIZE};
use crate::error::{Error, Result};
use crate::ext::{self, ExtHeader, FIXED_I32_SIZE};
use crate::options::{BlockOptions, CompressionMode};
use crate::pool::Scratch;
use crate::{decoder, LZ4_BLOCK_EXT_TYPE};

/// Location of the pieces of a framed LZ4 block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Declared length of the decompressed payload
    pub uncompressed_len: usize,
    /// Byte range of the token stream within the framed bytes
    pub stream: Range<usize>,
}

/// What a byte sequence holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Stored as-is
    Raw,
    /// One LZ4 extension block
    Lz4(BlockInfo),
}

/// Parse the envelope of `framed` without decompressing
pub fn inspect(framed: &[u8]) -> Result<BlockKind> {
    let (header, header_len) = match ExtHeader::decode(framed)? {
        Some((header, len)) if header.type_code == LZ4_BLOCK_EXT_TYPE => (header, len),
        _ => return Ok(BlockKind::Raw),
    };

    let body = &framed[header_len..];
    let body_len = header.len as usize;
    if body.len() < body_len {
        return Err(Error::UnexpectedEof);
    }
    if body.len() > body_len {
        return Err(Error::TrailingBytes);
    }

    let (declared, prefix_len) = ext::decode_i32(body)?;
    if declared <= 0 {
        return Err(Error::InvalidLength);
    }

    Ok(BlockKind::Lz4(BlockInfo {
        uncompressed_len: declared as usize,
        stream: header_len + prefix_len..framed.len(),
    }))
}

/// Whether a raw copy of `payload` would be read back as something else
#[inline]
fn must_frame(payload: &[u8]) -> bool {
    match ExtHeader::decode(payload) {
        Ok(None) => false,
        Ok(Some((header, _))) => header.type_code == LZ4_BLOCK_EXT_TYPE,
        Err(_) => true,
    }
}

/// Compress `payload` into the scratch buffer
///
/// Returns the compressed length, or `None` when storing the payload raw
/// is at least as small.
fn stage(scratch: &mut Scratch, payload: &[u8], framed_only: bool) -> Result<Option<usize>> {
    let first_try = payload.len();
    let output = scratch.buffer.rent(first_try);

    match encoder::compress_with_pool(&mut scratch.tables, payload, output) {
        Ok(written) => Ok(Some(written)),
        Err(Error::InsufficientOutputSpace) if !framed_only => Ok(None),
        Err(Error::InsufficientOutputSpace) => {
            let bound = max_compressed_size(payload.len());
            trace!(len = payload.len(), bound, "growing staging buffer");
            let output = scratch.buffer.rent(bound);
            encoder::compress_with_pool(&mut scratch.tables, payload, output).map(Some)
        }
        Err(e) => Err(e),
    }
}

/// Frame `payload` using the given scratch space
pub fn encode_with_scratch(
    options: &BlockOptions,
    scratch: &mut Scratch,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if options.mode == CompressionMode::None {
        return Ok(payload.to_vec());
    }

    let framed_only = must_frame(payload);
    if !framed_only && payload.len() < options.threshold {
        trace!(len = payload.len(), threshold = options.threshold, "below threshold, stored raw");
        return Ok(payload.to_vec());
    }

    // a block over either limit could not be read back
    if payload.len() > MAX_INPUT_SIZE || payload.len() > options.max_uncompressed_len {
        if framed_only {
            return Err(Error::InputTooLarge);
        }
        debug!(
            len = payload.len(),
            limit = options.max_uncompressed_len,
            "payload too large to compress, stored raw"
        );
        return Ok(payload.to_vec());
    }

    let Some(compressed_len) = stage(scratch, payload, framed_only)? else {
        debug!(len = payload.len(), "compression does not shrink payload, stored raw");
        return Ok(payload.to_vec());
    };

    let header = ExtHeader::new(LZ4_BLOCK_EXT_TYPE, (FIXED_I32_SIZE + compressed_len) as u32);
    let total = header.total_size();
    if !framed_only && total >= payload.len() {
        debug!(len = payload.len(), framed = total, "framed block not smaller, stored raw");
        return Ok(payload.to_vec());
    }

    let mut out = vec![0u8; total];
    let mut pos = header.encode(&mut out)?;
    pos += ext::encode_fixed_i32(payload.len() as i32, &mut out[pos..])?;
    out[pos..].copy_from_slice(scratch.buffer.filled(compressed_len));

    trace!(len = payload.len(), framed = total, "payload compressed");
    Ok(out)
}

/// Append the decoded form of `framed` to `out`
///
/// Returns the number of bytes appended. On error `out` is left as it was.
pub fn decode_into(options: &BlockOptions, framed: &[u8], out: &mut Vec<u8>) -> Result<usize> {
    if options.mode == CompressionMode::None {
        out.extend_from_slice(framed);
        return Ok(framed.len());
    }

    let info = match inspect(framed) {
        Ok(BlockKind::Raw) => {
            out.extend_from_slice(framed);
            return Ok(framed.len());
        }
        Ok(BlockKind::Lz4(info)) => info,
        Err(e) => {
            debug!(error = ?e, len = framed.len(), "rejected block envelope");
            return Err(e);
        }
    };

    if info.uncompressed_len > options.max_uncompressed_len {
        debug!(
            declared = info.uncompressed_len,
            limit = options.max_uncompressed_len,
            "declared length over limit"
        );
        return Err(Error::LengthLimitExceeded);
    }

    let start = out.len();
    out.resize(start + info.uncompressed_len, 0);

    match decoder::decompress(&framed[info.stream], &mut out[start..]) {
        Ok(_) => Ok(info.uncompressed_len),
        Err(e) => {
            out.truncate(start);
            debug!(error = ?e, declared = info.uncompressed_len, "rejected compressed stream");
            Err(e)
        }
    }
}

/// Decode `framed` into a new vector
pub fn decode(options: &BlockOptions, framed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode_into(options, framed, &mut out)?;
    Ok(out)
}

/// Framing codec that owns its scratch space
///
/// Works without `std`; keep one per thread or task.
#[derive(Debug, Default)]
pub struct BlockCodec {
    options: BlockOptions,
    scratch: Scratch,
}

impl BlockCodec {
    /// Create a codec with validated options
    pub fn new(options: BlockOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            scratch: Scratch::new(),
        })
    }

    /// Options in use
    #[inline]
    pub fn options(&self) -> &BlockOptions {
        &self.options
    }

    /// Frame `payload`, compressing it when worthwhile
    pub fn encode(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        encode_with_scratch(&self.options, &mut self.scratch, payload)
    }

    /// Decode a framed payload
    pub fn decode(&self, framed: &[u8]) -> Result<Vec<u8>> {
        decode(&self.options, framed)
    }

    /// Append a decoded payload to `out`
    pub fn decode_into(&self, framed: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        decode_into(&self.options, framed, out)
    }
}

/// Frame `payload` with this thread's scratch space
///
/// A nested call on the same thread (from inside another compression)
/// falls back to a temporary scratch.
#[cfg(feature = "std")]
pub fn encode_block_with(options: &BlockOptions, payload: &[u8]) -> Result<Vec<u8>> {
    options.validate()?;
    match crate::pool::with_thread_scratch(|scratch| encode_with_scratch(options, scratch, payload)) {
        Ok(result) => result,
        Err(Error::PoolBusy) => {
            debug!("thread scratch busy, using a temporary one");
            encode_with_scratch(options, &mut Scratch::new(), payload)
        }
        Err(e) => Err(e),
    }
}

/// Frame `payload` with default options
#[cfg(feature = "std")]
pub fn encode_block(payload: &[u8]) -> Result<Vec<u8>> {
    encode_block_with(&BlockOptions::default(), payload)
}

/// Decode a framed payload with the given options
#[cfg(feature = "std")]
pub fn decode_block_with(options: &BlockOptions, framed: &[u8]) -> Result<Vec<u8>> {
    options.validate()?;
    decode(options, framed)
}

/// Decode a framed payload with default options
#[cfg(feature = "std")]
pub fn decode_block(framed: &[u8]) -> Result<Vec<u8>> {
    decode(&BlockOptions::default(), framed)
}
