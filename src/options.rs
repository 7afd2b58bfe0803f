//! Block framing configuration

use crate::error::{Error, Result};
use crate::{DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_MAX_UNCOMPRESSED_LEN};

/// Whether payloads are compressed at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionMode {
    /// Bytes pass through untouched in both directions
    None,
    /// Payloads at or above the threshold become one LZ4 extension block
    #[default]
    Lz4Block,
}

/// Options for the framing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlockOptions {
    /// Compression mode
    pub mode: CompressionMode,
    /// Payloads shorter than this are stored raw
    pub threshold: usize,
    /// Largest uncompressed length a block may declare
    pub max_uncompressed_len: usize,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            mode: CompressionMode::Lz4Block,
            threshold: DEFAULT_COMPRESSION_THRESHOLD,
            max_uncompressed_len: DEFAULT_MAX_UNCOMPRESSED_LEN,
        }
    }
}

impl BlockOptions {
    /// Options that never compress
    pub fn uncompressed() -> Self {
        Self::default().with_mode(CompressionMode::None)
    }

    /// Set the compression mode
    #[must_use]
    pub fn with_mode(mut self, mode: CompressionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the size threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the largest accepted uncompressed length
    #[must_use]
    pub fn with_max_uncompressed_len(mut self, max: usize) -> Self {
        self.max_uncompressed_len = max;
        self
    }

    /// Check the options against the wire format's limits
    ///
    /// The length prefix is a signed 32-bit integer, so no block can declare
    /// more than `i32::MAX` bytes.
    pub fn validate(&self) -> Result<()> {
        if self.max_uncompressed_len == 0 || self.max_uncompressed_len > i32::MAX as usize {
            return Err(Error::LengthLimitExceeded);
        }
        Ok(())
    }
}
