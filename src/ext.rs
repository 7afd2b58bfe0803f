//! MessagePack extension envelope
//!
//! Only the pieces of MessagePack that an LZ4 block touches live here: the
//! extension header and a fixed-width 32-bit integer.
//!
//! ```text
//! fixext N  : 0xd4..=0xd8  type:i8                    (N = 1, 2, 4, 8, 16)
//! ext 8     : 0xc7  len:u8           type:i8
//! ext 16    : 0xc8  len:u16 (BE)     type:i8
//! ext 32    : 0xc9  len:u32 (BE)     type:i8
//! int 32    : 0xd2  value:i32 (BE)
//! ```

use crate::error::{Error, Result};

/// MessagePack format markers
pub mod markers {
    /// fixext 1
    pub const FIXEXT1: u8 = 0xd4;
    /// fixext 2
    pub const FIXEXT2: u8 = 0xd5;
    /// fixext 4
    pub const FIXEXT4: u8 = 0xd6;
    /// fixext 8
    pub const FIXEXT8: u8 = 0xd7;
    /// fixext 16
    pub const FIXEXT16: u8 = 0xd8;
    /// ext 8
    pub const EXT8: u8 = 0xc7;
    /// ext 16
    pub const EXT16: u8 = 0xc8;
    /// ext 32
    pub const EXT32: u8 = 0xc9;
    /// uint 8
    pub const UINT8: u8 = 0xcc;
    /// uint 16
    pub const UINT16: u8 = 0xcd;
    /// uint 32
    pub const UINT32: u8 = 0xce;
    /// int 8
    pub const INT8: u8 = 0xd0;
    /// int 16
    pub const INT16: u8 = 0xd1;
    /// int 32
    pub const INT32: u8 = 0xd2;
}

use markers::*;

/// Size of an `int 32` value (marker + 4 bytes)
pub const FIXED_I32_SIZE: usize = 5;

/// MessagePack extension header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtHeader {
    /// Application-defined extension type
    pub type_code: i8,
    /// Payload length in bytes
    pub len: u32,
}

impl ExtHeader {
    /// Largest encoded header (ext 32)
    pub const MAX_SIZE: usize = 6;

    /// Create a new extension header
    #[inline]
    pub fn new(type_code: i8, len: u32) -> Self {
        Self { type_code, len }
    }

    /// Encoded header size, using the smallest form for `len`
    #[inline]
    pub fn encoded_size(&self) -> usize {
        match self.len {
            1 | 2 | 4 | 8 | 16 => 2,
            0..=0xFF => 3,
            0x100..=0xFFFF => 4,
            _ => 6,
        }
    }

    /// Header plus payload size
    #[inline]
    pub fn total_size(&self) -> usize {
        self.encoded_size() + self.len as usize
    }

    /// Encode header to bytes
    ///
    /// Returns the number of bytes written.
    #[inline]
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.encoded_size();
        if buf.len() < size {
            return Err(Error::InsufficientOutputSpace);
        }

        let type_byte = self.type_code as u8;
        match self.len {
            1 | 2 | 4 | 8 | 16 => {
                buf[0] = match self.len {
                    1 => FIXEXT1,
                    2 => FIXEXT2,
                    4 => FIXEXT4,
                    8 => FIXEXT8,
                    _ => FIXEXT16,
                };
                buf[1] = type_byte;
            }
            0..=0xFF => {
                buf[0] = EXT8;
                buf[1] = self.len as u8;
                buf[2] = type_byte;
            }
            0x100..=0xFFFF => {
                buf[0] = EXT16;
                buf[1..3].copy_from_slice(&(self.len as u16).to_be_bytes());
                buf[3] = type_byte;
            }
            _ => {
                buf[0] = EXT32;
                buf[1..5].copy_from_slice(&self.len.to_be_bytes());
                buf[5] = type_byte;
            }
        }

        Ok(size)
    }

    /// Decode a header from the start of `buf`
    ///
    /// Returns `Ok(None)` when `buf` is empty or does not start with an
    /// extension marker, and (header, bytes_consumed) otherwise.
    #[inline]
    pub fn decode(buf: &[u8]) -> Result<Option<(Self, usize)>> {
        let Some(&marker) = buf.first() else {
            return Ok(None);
        };

        let (len, type_at) = match marker {
            FIXEXT1 => (1, 1),
            FIXEXT2 => (2, 1),
            FIXEXT4 => (4, 1),
            FIXEXT8 => (8, 1),
            FIXEXT16 => (16, 1),
            EXT8 => {
                if buf.len() < 2 {
                    return Err(Error::UnexpectedEof);
                }
                (buf[1] as u32, 2)
            }
            EXT16 => {
                if buf.len() < 3 {
                    return Err(Error::UnexpectedEof);
                }
                (u16::from_be_bytes([buf[1], buf[2]]) as u32, 3)
            }
            EXT32 => {
                if buf.len() < 5 {
                    return Err(Error::UnexpectedEof);
                }
                (u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]), 5)
            }
            _ => return Ok(None),
        };

        if buf.len() <= type_at {
            return Err(Error::UnexpectedEof);
        }

        let header = Self {
            type_code: buf[type_at] as i8,
            len,
        };
        Ok(Some((header, type_at + 1)))
    }
}

/// Encode `value` as `int 32` (always 5 bytes)
#[inline]
pub fn encode_fixed_i32(value: i32, buf: &mut [u8]) -> Result<usize> {
    if buf.len() < FIXED_I32_SIZE {
        return Err(Error::InsufficientOutputSpace);
    }
    buf[0] = INT32;
    buf[1..5].copy_from_slice(&value.to_be_bytes());
    Ok(FIXED_I32_SIZE)
}

/// Decode any MessagePack integer that fits an `i32`
///
/// Returns (value, bytes_consumed) or an error.
#[inline]
pub fn decode_i32(buf: &[u8]) -> Result<(i32, usize)> {
    let Some(&marker) = buf.first() else {
        return Err(Error::UnexpectedEof);
    };

    let width = match marker {
        0x00..=0x7f | 0xe0..=0xff => return Ok(((marker as i8) as i32, 1)),
        UINT8 | INT8 => 1,
        UINT16 | INT16 => 2,
        UINT32 | INT32 => 4,
        _ => return Err(Error::InvalidExtension),
    };

    if buf.len() < 1 + width {
        return Err(Error::UnexpectedEof);
    }
    let b = &buf[1..1 + width];

    let value = match marker {
        UINT8 => b[0] as i32,
        INT8 => b[0] as i8 as i32,
        UINT16 => u16::from_be_bytes([b[0], b[1]]) as i32,
        INT16 => i16::from_be_bytes([b[0], b[1]]) as i32,
        UINT32 => {
            let v = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
            i32::try_from(v).map_err(|_| Error::Overflow)?
        }
        _ => i32::from_be_bytes([b[0], b[1], b[2], b[3]]),
    };

    Ok((value, 1 + width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_forms() {
        let cases = [
            (1u32, 2usize, FIXEXT1),
            (16, 2, FIXEXT16),
            (0, 3, EXT8),
            (200, 3, EXT8),
            (300, 4, EXT16),
            (70_000, 6, EXT32),
        ];

        for (len, size, marker) in cases {
            let header = ExtHeader::new(99, len);
            let mut buf = [0u8; ExtHeader::MAX_SIZE];
            assert_eq!(header.encode(&mut buf).unwrap(), size);
            assert_eq!(buf[0], marker);

            let (decoded, consumed) = ExtHeader::decode(&buf[..size]).unwrap().unwrap();
            assert_eq!(decoded, header);
            assert_eq!(consumed, size);
        }
    }

    #[test]
    fn test_negative_type_code() {
        let header = ExtHeader::new(-1, 12);
        let mut buf = [0u8; 8];
        let size = header.encode(&mut buf).unwrap();
        assert_eq!(&buf[..size], &[EXT8, 12, 0xFF]);
        assert_eq!(ExtHeader::decode(&buf[..size]).unwrap(), Some((header, 3)));
    }

    #[test]
    fn test_non_extension_bytes() {
        assert_eq!(ExtHeader::decode(&[]), Ok(None));
        assert_eq!(ExtHeader::decode(&[0x93, 1, 2, 3]), Ok(None));
        assert_eq!(ExtHeader::decode(&[0xd2, 0, 0, 0, 1]), Ok(None));
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(ExtHeader::decode(&[EXT8]), Err(Error::UnexpectedEof));
        assert_eq!(ExtHeader::decode(&[EXT8, 4]), Err(Error::UnexpectedEof));
        assert_eq!(ExtHeader::decode(&[EXT32, 0, 0, 1]), Err(Error::UnexpectedEof));
        assert_eq!(ExtHeader::decode(&[FIXEXT4]), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_fixed_i32() {
        let mut buf = [0u8; FIXED_I32_SIZE];
        encode_fixed_i32(10_000, &mut buf).unwrap();
        assert_eq!(buf, [INT32, 0x00, 0x00, 0x27, 0x10]);
        assert_eq!(decode_i32(&buf).unwrap(), (10_000, 5));

        let mut small = [0u8; 4];
        assert_eq!(encode_fixed_i32(1, &mut small), Err(Error::InsufficientOutputSpace));
    }

    #[test]
    fn test_lenient_integer_forms() {
        assert_eq!(decode_i32(&[0x7f]).unwrap(), (127, 1));
        assert_eq!(decode_i32(&[0xff]).unwrap(), (-1, 1));
        assert_eq!(decode_i32(&[UINT8, 200]).unwrap(), (200, 2));
        assert_eq!(decode_i32(&[INT8, 0x80]).unwrap(), (-128, 2));
        assert_eq!(decode_i32(&[UINT16, 0x01, 0x00]).unwrap(), (256, 3));
        assert_eq!(decode_i32(&[INT16, 0xff, 0x00]).unwrap(), (-256, 3));
        assert_eq!(decode_i32(&[UINT32, 0x00, 0x01, 0x00, 0x00]).unwrap(), (65_536, 5));
        assert_eq!(decode_i32(&[UINT32, 0xff, 0xff, 0xff, 0xff]), Err(Error::Overflow));
        assert_eq!(decode_i32(&[0xc0]), Err(Error::InvalidExtension));
        assert_eq!(decode_i32(&[INT32, 0, 0]), Err(Error::UnexpectedEof));
        assert_eq!(decode_i32(&[]), Err(Error::UnexpectedEof));
    }
}
