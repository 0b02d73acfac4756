//! Unsigned LEB128 decoding.
//!
//! Each byte contributes its low 7 bits, least significant group first; a
//! clear high bit ends the value. Two forms are provided:
//!
//! - [`read_uleb128`] reads from a seekable [`ByteCursor`] and advances it.
//! - [`read_uleb128_from_buf`] drains a byte queue (a `&[u8]` that is
//!   re-sliced as bytes are taken) and reports how many bytes it consumed.
//!
//! Values wider than 64 bits are not detected; bits shifted past bit 63 are
//! dropped.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Folds one LEB128 group into `result`.
#[inline(always)]
fn accumulate(result: &mut u64, byte: u8, shift: u32) {
    if shift < u64::BITS {
        *result |= ((byte & 0x7F) as u64) << shift;
    }
}

/// Reads an unsigned LEB128 value at the cursor position.
///
/// On success the cursor is left just past the terminating byte. If the data
/// ends before a terminating byte the error is [`Error::UnexpectedEof`].
///
/// # Performance
///
/// Single-byte values (0-127) take a fast path with no loop; most trie fields
/// (terminal sizes, flags, child offsets in small tries) fit in one byte.
#[inline]
pub fn read_uleb128(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    if let Some(&b0) = cursor.remaining().first() {
        if b0 < 0x80 {
            cursor.seek(cursor.position() + 1);
            return Ok(b0 as u64);
        }
    }

    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = cursor.read_u8()?;
        accumulate(&mut result, byte, shift);
        if byte < 0x80 {
            return Ok(result);
        }
        shift = shift.saturating_add(7);
    }
}

/// Reads an unsigned LEB128 value from the front of a byte queue.
///
/// Returns the decoded value and the number of bytes consumed, and advances
/// `buf` past them. An empty queue is a terminal case, not an error: it
/// yields `(0, 0)`. A queue that runs dry in the middle of a value yields
/// [`Error::InvalidUleb128`].
pub fn read_uleb128_from_buf(buf: &mut &[u8]) -> Result<(u64, usize)> {
    if buf.is_empty() {
        return Ok((0, 0));
    }

    let mut result: u64 = 0;
    let mut shift = 0u32;
    let mut length = 0usize;

    loop {
        let Some((&byte, rest)) = buf.split_first() else {
            return Err(Error::InvalidUleb128 { offset: length });
        };
        *buf = rest;
        length += 1;

        accumulate(&mut result, byte, shift);
        if byte < 0x80 {
            return Ok((result, length));
        }
        shift = shift.saturating_add(7);
    }
}
