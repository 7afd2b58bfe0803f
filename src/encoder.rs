//! Greedy LZ4 block compressor
//!
//! The compressor scans the input with a single-slot hash table, emitting
//! one sequence (literal run + match) per accepted back-reference and a
//! final literal-only sequence. The scan step grows while no match is
//! found, so incompressible regions are skipped quickly.
//!
//! Every write goes through a bounds-checked [`TokenWriter`]; when the
//! output slice is too small the call fails with
//! [`Error::InsufficientOutputSpace`] and nothing past the slice is touched.

use crate::error::{Error, Result};
use crate::length::{self, NIBBLE_MAX};
use crate::table::{HashTable, Position, TableMode, TablePool, TableRef};

/// Shortest match worth encoding
pub const MIN_MATCH: usize = 4;

/// The last bytes of a block are always literals
pub const LAST_LITERALS: usize = 5;

/// A match may not start within this many bytes of the end
pub const MF_LIMIT: usize = 12;

/// Inputs shorter than this are stored as one literal run
pub const MIN_LENGTH: usize = MF_LIMIT + 1;

/// Largest backward distance an offset can express
pub const MAX_DISTANCE: usize = 65_535;

/// Largest input accepted by the compressor
pub const MAX_INPUT_SIZE: usize = 0x7E00_0000;

/// Scan step grows by one every `1 << SKIP_STRENGTH` failed probes
const SKIP_STRENGTH: u32 = 6;

/// Worst-case compressed size for `input_len` bytes
#[inline]
pub const fn max_compressed_size(input_len: usize) -> usize {
    input_len + input_len / 255 + 16
}

/// Bounds-checked writer over the compressor output
struct TokenWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> TokenWriter<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Fail unless `n` more bytes fit
    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(Error::InsufficientOutputSpace),
        }
    }

    #[inline]
    fn put_u8(&mut self, value: u8) -> Result<()> {
        self.ensure(1)?;
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    #[inline]
    fn put_u16_le(&mut self, value: u16) -> Result<()> {
        self.ensure(2)?;
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_le_bytes());
        self.pos += 2;
        Ok(())
    }

    #[inline]
    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    #[inline]
    fn put_length(&mut self, value: usize) -> Result<()> {
        let written = length::encode(value, &mut self.buf[self.pos..])?;
        self.pos += written;
        Ok(())
    }

    /// OR `bits` into an already written token
    #[inline]
    fn patch(&mut self, token_pos: usize, bits: u8) {
        self.buf[token_pos] |= bits;
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }
}

#[inline]
fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

#[inline]
fn read_u64(data: &[u8], pos: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[pos..pos + 8]);
    u64::from_le_bytes(word)
}

/// Write a token holding the literal length, then the literals
///
/// Returns the token position so the match length can be patched in.
/// With `match_follows` the two offset bytes are reserved as well.
#[inline]
fn emit_literals(out: &mut TokenWriter<'_>, literals: &[u8], match_follows: bool) -> Result<usize> {
    let len = literals.len();
    let continuation = if len >= NIBBLE_MAX {
        length::encoded_len(len - NIBBLE_MAX)
    } else {
        0
    };
    let offset = if match_follows { 2 } else { 0 };
    // token + continuation + literals (+ offset), all or nothing
    out.ensure(1 + continuation + len + offset)?;

    let token_pos = out.position();
    if len >= NIBBLE_MAX {
        out.put_u8((NIBBLE_MAX as u8) << 4)?;
        out.put_length(len - NIBBLE_MAX)?;
    } else {
        out.put_u8((len as u8) << 4)?;
    }
    out.put_bytes(literals)?;
    Ok(token_pos)
}

/// Write the match length (already reduced by [`MIN_MATCH`])
#[inline]
fn emit_match_length(out: &mut TokenWriter<'_>, token_pos: usize, extra: usize) -> Result<()> {
    if extra >= NIBBLE_MAX {
        out.ensure(length::encoded_len(extra - NIBBLE_MAX))?;
        out.patch(token_pos, NIBBLE_MAX as u8);
        out.put_length(extra - NIBBLE_MAX)
    } else {
        out.patch(token_pos, extra as u8);
        Ok(())
    }
}

/// Length of the common run at `pos` and `candidate`, stopping at `limit`
#[inline]
fn count_matching(input: &[u8], mut pos: usize, mut candidate: usize, limit: usize) -> usize {
    let start = pos;

    while pos + 8 <= limit {
        let diff = read_u64(input, pos) ^ read_u64(input, candidate);
        if diff != 0 {
            return pos - start + (diff.trailing_zeros() / 8) as usize;
        }
        pos += 8;
        candidate += 8;
    }

    while pos < limit && input[pos] == input[candidate] {
        pos += 1;
        candidate += 1;
    }

    pos - start
}

/// Whether `candidate` is a usable back-reference for `pos`
#[inline]
fn is_match(input: &[u8], candidate: usize, pos: usize) -> bool {
    candidate < pos && pos - candidate <= MAX_DISTANCE && read_u32(input, candidate) == read_u32(input, pos)
}

/// Compressor core, generic over the table position width
///
/// `table` must be zeroed.
fn compress_into<P: Position>(
    table: &mut HashTable<P>,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let len = input.len();
    let mut out = TokenWriter::new(output);
    let mut anchor = 0;

    if len >= MIN_LENGTH {
        let mf_limit = len - MF_LIMIT;
        let match_limit = len - LAST_LITERALS;

        table.put(HashTable::<P>::hash(read_u32(input, 0)), 0);
        let mut ip = 1;
        let mut forward_hash = HashTable::<P>::hash(read_u32(input, ip));

        'search: loop {
            let mut forward_ip = ip;
            let mut step = 1;
            let mut attempts = 1usize << SKIP_STRENGTH;

            let mut candidate = loop {
                let hash = forward_hash;
                ip = forward_ip;
                forward_ip += step;
                step = attempts >> SKIP_STRENGTH;
                attempts += 1;

                if forward_ip > mf_limit {
                    break 'search;
                }

                let candidate = table.get(hash);
                forward_hash = HashTable::<P>::hash(read_u32(input, forward_ip));
                table.put(hash, ip);

                if is_match(input, candidate, ip) {
                    break candidate;
                }
            };

            // catch up
            while ip > anchor && candidate > 0 && input[ip - 1] == input[candidate - 1] {
                ip -= 1;
                candidate -= 1;
            }

            let mut token_pos = emit_literals(&mut out, &input[anchor..ip], true)?;

            loop {
                out.put_u16_le((ip - candidate) as u16)?;

                let extra = count_matching(input, ip + MIN_MATCH, candidate + MIN_MATCH, match_limit);
                ip += MIN_MATCH + extra;
                emit_match_length(&mut out, token_pos, extra)?;
                anchor = ip;

                if ip > mf_limit {
                    break 'search;
                }

                table.put(HashTable::<P>::hash(read_u32(input, ip - 2)), ip - 2);

                // a match starting right here needs no literals
                let hash = HashTable::<P>::hash(read_u32(input, ip));
                candidate = table.get(hash);
                table.put(hash, ip);
                if !is_match(input, candidate, ip) {
                    break;
                }

                token_pos = emit_literals(&mut out, &[], true)?;
            }

            ip += 1;
            forward_hash = HashTable::<P>::hash(read_u32(input, ip));
        }
    }

    emit_literals(&mut out, &input[anchor..], false)?;
    Ok(out.position())
}

/// Compress `input` into `output` using tables from `pool`
///
/// Returns the number of bytes written. `output` of at least
/// [`max_compressed_size`] bytes always succeeds.
pub fn compress_with_pool(pool: &mut TablePool, input: &[u8], output: &mut [u8]) -> Result<usize> {
    if input.len() > MAX_INPUT_SIZE {
        return Err(Error::InputTooLarge);
    }

    match pool.acquire(TableMode::for_input_len(input.len())) {
        TableRef::Narrow(table) => compress_into(table, input, output),
        TableRef::Wide(table) => compress_into(table, input, output),
    }
}

/// Compress `input` into `output` with freshly allocated tables
///
/// Prefer [`compress_with_pool`] on hot paths.
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    compress_with_pool(&mut TablePool::new(), input, output)
}
