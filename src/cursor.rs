//! Seekable, bounds-checked cursor over a borrowed byte range.
//!
//! The cursor may be positioned anywhere, including past the end of the data.
//! Reads at or beyond the end report [`Error::UnexpectedEof`] instead of
//! panicking, so offsets decoded from untrusted input can be followed without
//! validating them first.

use crate::error::{Error, Result};

/// A read-only cursor over an export-info byte range.
///
/// Each traversal owns its own cursor; the underlying bytes are shared
/// immutably, so any number of cursors may read the same range concurrently.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute position.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Returns true if no bytes remain at the current position.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the bytes from the current position to the end.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(Error::UnexpectedEof { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a zero-terminated byte run, consuming the terminator.
    ///
    /// The returned slice excludes the terminator. If the data ends before a
    /// zero byte is found the cursor is left at the end of the data.
    pub fn read_cstr(&mut self) -> Result<&'a [u8]> {
        let rest = self.remaining();
        match memchr::memchr(0, rest) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&rest[..len])
            }
            None => {
                self.pos = self.pos.max(self.data.len());
                Err(Error::UnexpectedEof { offset: self.pos })
            }
        }
    }
}
