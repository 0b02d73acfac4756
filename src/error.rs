//! Error types for export trie decoding.
//!
//! Every failure mode of the decoder is reported through [`Error`]; malformed
//! input never panics.

use thiserror::Error;

/// The main error type for export trie decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ==================== Byte Source Errors ====================
    #[error("unexpected end of input at offset {offset:#x}")]
    UnexpectedEof { offset: usize },

    #[error("invalid ULEB128 after {offset} byte(s)")]
    InvalidUleb128 { offset: usize },

    // ==================== Trie Errors ====================
    #[error("export trie truncated while reading {field} at offset {offset:#x} (node at {node:#x})")]
    Truncated {
        field: &'static str,
        node: usize,
        offset: usize,
    },

    #[error("symbol not in trie: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("export trie node limit of {limit} exceeded at node {offset:#x}")]
    NodeLimitExceeded { limit: usize, offset: usize },

    #[error("export name of {length} bytes exceeds trie size {limit} at node {offset:#x}")]
    NameTooLong {
        length: usize,
        limit: usize,
        offset: usize,
    },
}

/// A specialized Result type for export trie operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if a byte source ran out before a value was complete.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. })
    }

    /// Returns true if this is the walker's "symbol not found" result.
    ///
    /// This is an expected negative answer, not a sign of corrupt input.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SymbolNotFound { .. })
    }

    /// Creates a truncation error for `field` of the node at `node`.
    #[inline]
    pub fn truncated(field: &'static str, node: usize, offset: usize) -> Self {
        Error::Truncated {
            field,
            node,
            offset,
        }
    }

    /// Creates a symbol not found error.
    #[inline]
    pub fn not_found(symbol: &[u8]) -> Self {
        Error::SymbolNotFound {
            symbol: String::from_utf8_lossy(symbol).into_owned(),
        }
    }
}
