//! LZ4 length continuation bytes
//!
//! A token nibble saturates at 15. The rest of the length follows as a run
//! of `255` bytes terminated by one byte below `255`; every byte is added
//! to the nibble. This module encodes and decodes that tail.

use crate::error::{Error, Result};

/// Nibble value that announces continuation bytes
pub const NIBBLE_MAX: usize = 15;

/// Number of continuation bytes needed for `value`
#[inline]
pub const fn encoded_len(value: usize) -> usize {
    value / 255 + 1
}

/// Encode `value` (the length minus [`NIBBLE_MAX`]) as continuation bytes
///
/// Returns the number of bytes written, or Error::InsufficientOutputSpace
/// if the buffer cannot hold them.
#[inline]
pub fn encode(value: usize, buf: &mut [u8]) -> Result<usize> {
    let len = encoded_len(value);
    if len > buf.len() {
        return Err(Error::InsufficientOutputSpace);
    }

    let full = len - 1;
    buf[..full].fill(255);
    buf[full] = (value % 255) as u8;
    Ok(len)
}

/// Decode continuation bytes from the given buffer
///
/// Returns (value, bytes_consumed) or an error.
#[inline]
pub fn decode(buf: &[u8]) -> Result<(usize, usize)> {
    let mut value = 0usize;
    let mut pos = 0;

    loop {
        if pos >= buf.len() {
            return Err(Error::UnexpectedEof);
        }

        let byte = buf[pos];
        pos += 1;

        value = value.checked_add(byte as usize).ok_or(Error::Overflow)?;

        if byte != 255 {
            return Ok((value, pos));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let cases = [(0usize, 1usize), (254, 1), (255, 2), (509, 2), (510, 3), (9_975, 40)];

        for (value, expected_len) in cases {
            let mut buf = [0u8; 64];
            let written = encode(value, &mut buf).unwrap();
            assert_eq!(written, expected_len);
            assert_eq!(written, encoded_len(value));

            let (decoded, consumed) = decode(&buf[..written]).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, written);
        }
    }

    #[test]
    fn test_exact_multiple_of_255_ends_with_zero() {
        let mut buf = [0u8; 4];
        let written = encode(255, &mut buf).unwrap();
        assert_eq!(&buf[..written], &[255, 0]);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 1];
        assert_eq!(encode(600, &mut buf), Err(Error::InsufficientOutputSpace));
    }

    #[test]
    fn test_unexpected_eof() {
        assert_eq!(decode(&[]), Err(Error::UnexpectedEof));
        assert_eq!(decode(&[255, 255]), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let (value, consumed) = decode(&[255, 3, 0xAA, 0xBB]).unwrap();
        assert_eq!(value, 258);
        assert_eq!(consumed, 2);
    }
}
