//! LZ4 block decompressor
//!
//! The decompressor replays a token stream into an output slice sized to
//! exactly the uncompressed length. Every length, offset and copy is
//! validated before it is applied, so truncated or hostile input surfaces
//! as an error and never reads or writes outside the two slices.

use crate::encoder::MIN_MATCH;
use crate::error::{Error, Result};
use crate::length::{self, NIBBLE_MAX};

/// Cursor over a compressed token stream
#[derive(Debug)]
pub struct TokenReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> TokenReader<'a> {
    /// Create a reader at the start of `buf`
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Check if cursor is at end
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read a u8 value
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        if self.pos >= self.buf.len() {
            return Err(Error::UnexpectedEof);
        }
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read a u16 value (little-endian)
    #[inline]
    pub fn get_u16_le(&mut self) -> Result<u16> {
        if self.pos + 2 > self.buf.len() {
            return Err(Error::UnexpectedEof);
        }
        let value = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Read raw bytes without copying
    #[inline]
    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.buf.len() - self.pos {
            return Err(Error::UnexpectedEof);
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a token nibble, following continuation bytes when it saturated
    #[inline]
    pub fn get_length(&mut self, nibble: u8) -> Result<usize> {
        let nibble = nibble as usize;
        if nibble < NIBBLE_MAX {
            return Ok(nibble);
        }
        let (extra, consumed) = length::decode(&self.buf[self.pos..])?;
        self.pos += consumed;
        nibble.checked_add(extra).ok_or(Error::Overflow)
    }
}

/// Copy `len` bytes from `src` to `dst` within `buf`, `src < dst`
///
/// When the ranges overlap the copy runs forward in chunks of at most
/// `dst - src` bytes, so bytes written earlier in the same match become the
/// source for later ones.
#[inline]
fn copy_match(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let distance = dst - src;

    if distance >= len {
        buf.copy_within(src..src + len, dst);
        return;
    }

    let mut copied = 0;
    while copied < len {
        let chunk = distance.min(len - copied);
        buf.copy_within(src + copied..src + copied + chunk, dst + copied);
        copied += chunk;
    }
}

/// Decompress a token stream into `output`
///
/// `output` must be exactly as long as the uncompressed data. Returns the
/// number of bytes consumed from `input` (all of it on success).
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let mut src = TokenReader::new(input);
    let out_len = output.len();
    let mut op = 0usize;

    while !src.is_at_end() {
        let token = src.get_u8()?;

        let literal_len = src.get_length(token >> 4)?;
        let literals = src.get_bytes(literal_len)?;
        let literal_end = op.checked_add(literal_len).ok_or(Error::Overflow)?;
        if literal_end > out_len {
            return Err(Error::OutputOverrun);
        }
        output[op..literal_end].copy_from_slice(literals);
        op = literal_end;

        // last literals
        if src.is_at_end() {
            break;
        }

        if op == out_len {
            return Err(Error::OutputOverrun);
        }

        let offset = src.get_u16_le()? as usize;
        if offset == 0 || offset > op {
            return Err(Error::OffsetOutOfRange);
        }

        let match_len = src
            .get_length(token & 0x0F)?
            .checked_add(MIN_MATCH)
            .ok_or(Error::Overflow)?;
        let match_end = op.checked_add(match_len).ok_or(Error::Overflow)?;
        if match_end > out_len {
            return Err(Error::OutputOverrun);
        }

        copy_match(output, op - offset, op, match_len);
        op = match_end;
    }

    if op != out_len {
        return Err(Error::OutputUnderrun);
    }

    Ok(src.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn test_literal_only_stream() {
        let stream = [0x50, b'h', b'e', b'l', b'l', b'o'];
        let mut out = [0u8; 5];
        assert_eq!(decompress(&stream, &mut out).unwrap(), stream.len());
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn test_empty_stream_for_empty_output() {
        let mut out = [0u8; 0];
        assert_eq!(decompress(&[], &mut out).unwrap(), 0);
        assert_eq!(decompress(&[0x00], &mut out).unwrap(), 1);
    }

    #[test]
    fn test_overlapping_run_length_copy() {
        // one literal 'z', match distance 1, length 300, then an empty last sequence
        let mut stream = vec![0x1F, b'z', 0x01, 0x00];
        let extra = 300 - MIN_MATCH - NIBBLE_MAX;
        stream.push(255);
        stream.push((extra - 255) as u8);
        stream.push(0x00);

        let mut out = vec![0u8; 301];
        decompress(&stream, &mut out).unwrap();
        assert!(out.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_overlapping_pattern_copy() {
        // "abc" then a 9 byte match at distance 3
        let stream = [0x35, b'a', b'b', b'c', 0x03, 0x00, 0x10, b'!'];
        let mut out = [0u8; 13];
        decompress(&stream, &mut out).unwrap();
        assert_eq!(&out, b"abcabcabcabc!");
    }

    #[test]
    fn test_offset_before_output_start() {
        let stream = [0x10, b'a', 0x02, 0x00, 0x00];
        let mut out = [0u8; 5];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OffsetOutOfRange));
    }

    #[test]
    fn test_zero_offset_rejected() {
        let stream = [0x10, b'a', 0x00, 0x00, 0x00];
        let mut out = [0u8; 5];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OffsetOutOfRange));
    }

    #[test]
    fn test_match_overrun() {
        let stream = [0x1F, b'a', 0x01, 0x00, 0x20];
        let mut out = [0u8; 10];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OutputOverrun));
    }

    #[test]
    fn test_literal_overrun() {
        let stream = [0x40, 1, 2, 3, 4];
        let mut out = [0u8; 3];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OutputOverrun));
    }

    #[test]
    fn test_full_output_with_input_remaining() {
        let stream = [0x30, 1, 2, 3, 0x01, 0x00];
        let mut out = [0u8; 3];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OutputOverrun));
    }

    #[test]
    fn test_short_stream_is_underrun() {
        let stream = [0x30, 1, 2, 3];
        let mut out = [0u8; 8];
        assert_eq!(decompress(&stream, &mut out), Err(Error::OutputUnderrun));
    }

    #[test]
    fn test_truncated_fields() {
        let mut out = [0u8; 64];
        // literal continuation missing
        assert_eq!(decompress(&[0xF0], &mut out), Err(Error::UnexpectedEof));
        // literals cut short
        assert_eq!(decompress(&[0x40, 1, 2], &mut out), Err(Error::UnexpectedEof));
        // offset cut short
        assert_eq!(decompress(&[0x10, 1, 0x01], &mut out), Err(Error::UnexpectedEof));
        // match continuation missing
        assert_eq!(decompress(&[0x1F, 1, 0x01, 0x00], &mut out), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_huge_literal_length_does_not_allocate_or_panic() {
        let mut stream = vec![0xF0];
        stream.extend(core::iter::repeat(255u8).take(1000));
        stream.push(0);
        let mut out = [0u8; 16];
        assert_eq!(decompress(&stream, &mut out), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_reader_positions() {
        let data: Vec<u8> = vec![0x34, 0x12, 0xAA, 0xBB, 0xCC];
        let mut reader = TokenReader::new(&data);
        assert_eq!(reader.get_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.get_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.get_u8().unwrap(), 0xCC);
        assert!(reader.is_at_end());
        assert_eq!(reader.get_u8(), Err(Error::UnexpectedEof));
    }
}
