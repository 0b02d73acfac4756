//! Decoded export records.

use std::fmt;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::leb128::read_uleb128;

use super::flags::ExportFlags;

// =============================================================================
// Export Entry
// =============================================================================

/// An exported symbol produced by a full trie walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// Symbol name; for re-exports with a source name, `"<name> (<source name>)"`
    pub name: String,
    /// Export flags
    pub flags: ExportFlags,
    /// Re-export library ordinal or resolver stub offset, depending on flags
    pub other: u64,
    /// Resolved address for regular and thread-local exports, raw value otherwise
    pub address: u64,
    /// Dylib that provides a re-exported symbol, filled in by callers that
    /// resolve ordinals against a load-command list
    pub found_in_dylib: Option<String>,
}

impl ExportEntry {
    /// Records the dylib a re-export was resolved to.
    pub fn with_dylib(mut self, dylib: impl Into<String>) -> Self {
        self.found_in_dylib = Some(dylib.into());
        self
    }
}

impl fmt::Display for ExportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found_in_dylib {
            Some(dylib) => write!(f, "0x{:8x}: {}, {}", self.address, self.name, dylib),
            None => write!(f, "0x{:8x}: {}", self.address, self.name),
        }
    }
}

// =============================================================================
// Traversal Node
// =============================================================================

/// A pending node on the parser's work stack.
///
/// Each node owns its prefix; children get a fresh copy extended by their
/// edge label, so siblings never share name bytes.
#[derive(Debug, Clone)]
pub(crate) struct TraversalNode {
    /// Offset of the node's encoding within the trie
    pub offset: u64,
    /// Concatenated edge labels from the root to this node
    pub prefix: Vec<u8>,
}

impl TraversalNode {
    /// The root node: offset 0, empty prefix.
    pub fn root() -> Self {
        Self {
            offset: 0,
            prefix: Vec::new(),
        }
    }

    /// Creates the child reached through `label`.
    pub fn child(&self, label: &[u8], offset: u64) -> Self {
        let mut prefix = Vec::with_capacity(self.prefix.len() + label.len());
        prefix.extend_from_slice(&self.prefix);
        prefix.extend_from_slice(label);
        Self { offset, prefix }
    }
}

// =============================================================================
// Export Payload
// =============================================================================

/// The terminal payload of one export, decoded from the offset returned by
/// [`walk_trie`](super::walk_trie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Export flags
    pub flags: ExportFlags,
    /// Re-export library ordinal or resolver stub offset
    pub other: u64,
    /// Name of the symbol in the source library, for re-exports that rename
    pub reexport_name: Option<String>,
    /// Value before relocation
    pub value: u64,
}

impl ExportPayload {
    /// Decodes the payload that starts at `offset` in `data`.
    pub fn decode_at(data: &[u8], offset: usize) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        cursor.seek(offset);

        let field = move |name: &'static str| move |e: Error| truncation(e, name, offset);

        let flags = ExportFlags::from_raw(read_uleb128(&mut cursor).map_err(field("flags"))?);

        let mut other = 0;
        let mut reexport_name = None;
        if flags.is_reexport() {
            other = read_uleb128(&mut cursor).map_err(field("re-export ordinal"))?;
            let name = cursor.read_cstr().map_err(field("re-export name"))?;
            if !name.is_empty() {
                reexport_name = Some(String::from_utf8_lossy(name).into_owned());
            }
        }

        let value = read_uleb128(&mut cursor).map_err(field("value"))?;

        if flags.is_stub_and_resolver() {
            other = read_uleb128(&mut cursor).map_err(field("resolver offset"))?;
        }

        Ok(Self {
            flags,
            other,
            reexport_name,
            value,
        })
    }

    /// Returns the value relocated by `load_address` when the export kind
    /// calls for it.
    #[inline]
    pub fn address(&self, load_address: u64) -> u64 {
        if self.flags.is_relocatable() {
            self.value.wrapping_add(load_address)
        } else {
            self.value
        }
    }
}

/// Maps a cursor end-of-input into a trie truncation error for `field`.
pub(crate) fn truncation(err: Error, field: &'static str, node: usize) -> Error {
    match err {
        Error::UnexpectedEof { offset } => Error::truncated(field, node, offset),
        other => other,
    }
}
