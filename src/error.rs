//! Error types for the LZ4 block codec and its framing

/// Errors that can occur while compressing, decompressing or framing a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Output buffer too small for the compressed stream
    InsufficientOutputSpace,
    /// Unexpected end of input (truncated token, length, offset or literals)
    UnexpectedEof,
    /// Match offset is zero or points before the start of the output
    OffsetOutOfRange,
    /// Stream writes past the end of the output buffer
    OutputOverrun,
    /// Stream ended before the declared length was produced
    OutputUnderrun,
    /// Integer overflow in length calculations
    Overflow,
    /// Malformed MessagePack extension envelope
    InvalidExtension,
    /// Declared uncompressed length is zero or negative
    InvalidLength,
    /// Declared uncompressed length exceeds the configured maximum
    LengthLimitExceeded,
    /// Extra bytes follow a complete block
    TrailingBytes,
    /// Thread scratch space is already in use on this thread
    PoolBusy,
    /// Payload too large to compress, or to frame under the configured limit
    InputTooLarge,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::InsufficientOutputSpace => "output buffer too small for compressed stream",
            Error::UnexpectedEof => "unexpected end of compressed data",
            Error::OffsetOutOfRange => "match offset points outside decoded output",
            Error::OutputOverrun => "compressed stream overruns output buffer",
            Error::OutputUnderrun => "compressed stream ended before declared length",
            Error::Overflow => "integer overflow in length calculations",
            Error::InvalidExtension => "malformed MessagePack extension envelope",
            Error::InvalidLength => "declared uncompressed length is not positive",
            Error::LengthLimitExceeded => "declared uncompressed length exceeds limit",
            Error::TrailingBytes => "unexpected bytes after compressed block",
            Error::PoolBusy => "thread scratch space already in use",
            Error::InputTooLarge => "payload too large to compress",
        }
    }

    /// Whether the error means the input bytes are malformed
    ///
    /// Corruption is never recoverable for the message at hand. The
    /// encoder-side errors [`Error::InsufficientOutputSpace`],
    /// [`Error::PoolBusy`] and [`Error::InputTooLarge`] are not corruption.
    pub const fn is_corruption(&self) -> bool {
        !matches!(
            self,
            Error::InsufficientOutputSpace | Error::PoolBusy | Error::InputTooLarge
        )
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        assert!(!Error::InsufficientOutputSpace.is_corruption());
        assert!(!Error::PoolBusy.is_corruption());
        assert!(Error::OffsetOutOfRange.is_corruption());
        assert!(Error::UnexpectedEof.is_corruption());
        assert!(Error::LengthLimitExceeded.is_corruption());
        assert!(Error::Overflow.is_corruption());
        assert!(!Error::InputTooLarge.is_corruption());
    }
}
