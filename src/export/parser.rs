//! Full export trie materialization.
//!
//! The trie is walked depth-first with a heap-allocated work stack rather than
//! recursion, since trie depth is controlled by the (untrusted) input.

use tracing::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::leb128::read_uleb128;

use super::entry::{truncation, ExportEntry, TraversalNode};
use super::flags::ExportFlags;

/// Parses every export in `data`, relocating regular and thread-local
/// exports by `load_address`.
///
/// Output order follows the traversal and should be treated as unspecified.
pub fn parse_trie(data: &[u8], load_address: u64) -> Result<Vec<ExportEntry>> {
    ExportTrieParser::new(data)
        .with_load_address(load_address)
        .parse_all()
}

/// Parser for export tries.
#[derive(Debug, Clone)]
pub struct ExportTrieParser<'a> {
    data: &'a [u8],
    load_address: u64,
    node_limit: usize,
}

impl<'a> ExportTrieParser<'a> {
    /// Creates a new parser for the given export trie data.
    ///
    /// The node limit defaults to the byte length of the trie: each node of a
    /// well-formed trie starts at its own offset, so only tries with shared or
    /// cyclic child offsets can exceed it.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            load_address: 0,
            node_limit: data.len().max(1),
        }
    }

    /// Sets the address added to regular and thread-local export values.
    pub fn with_load_address(mut self, load_address: u64) -> Self {
        self.load_address = load_address;
        self
    }

    /// Sets the maximum number of nodes a single parse may visit.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = limit;
        self
    }

    /// Parses all exports from the trie.
    ///
    /// An empty byte range is an error: even a trie without exports encodes a
    /// root terminal size.
    pub fn parse_all(&self) -> Result<Vec<ExportEntry>> {
        let mut exports = Vec::new();
        let mut cursor = ByteCursor::new(self.data);
        let mut nodes = vec![TraversalNode::root()];
        let mut visited = 0usize;

        while let Some(node) = nodes.pop() {
            let node_offset = to_offset(node.offset);

            visited += 1;
            if visited > self.node_limit {
                return Err(Error::NodeLimitExceeded {
                    limit: self.node_limit,
                    offset: node_offset,
                });
            }

            cursor.seek(node_offset);
            let terminal_size = read_uleb128(&mut cursor)
                .map_err(|e| truncation(e, "terminal size", node_offset))?;

            if terminal_size != 0 {
                let export = self.parse_terminal_info(&mut cursor, &node, node_offset)?;
                trace!(offset = node_offset, name = %export.name, "export");
                exports.push(export);
            }

            // The child count sits one byte past the terminal payload.
            cursor.seek(to_offset(
                node.offset.saturating_add(terminal_size).saturating_add(1),
            ));
            let Ok(child_count) = cursor.read_u8() else {
                trace!(offset = node_offset, "end of trie data at child count");
                break;
            };

            for _ in 0..child_count {
                let label = cursor
                    .read_cstr()
                    .map_err(|e| truncation(e, "edge label", node_offset))?;
                let child_offset = read_uleb128(&mut cursor)
                    .map_err(|e| truncation(e, "child offset", node_offset))?;

                // A name spells out distinct edge labels, so it can never be
                // longer than the trie itself.
                let length = node.prefix.len() + label.len();
                if length > self.data.len() {
                    return Err(Error::NameTooLong {
                        length,
                        limit: self.data.len(),
                        offset: node_offset,
                    });
                }

                nodes.push(node.child(label, child_offset));
            }
        }

        debug!(
            exports = exports.len(),
            nodes = visited,
            size = self.data.len(),
            "parsed export trie"
        );

        Ok(exports)
    }

    /// Parses the terminal payload that follows a node's terminal size.
    fn parse_terminal_info(
        &self,
        cursor: &mut ByteCursor<'a>,
        node: &TraversalNode,
        node_offset: usize,
    ) -> Result<ExportEntry> {
        let field = move |name: &'static str| move |e: Error| truncation(e, name, node_offset);

        let flags = ExportFlags::from_raw(read_uleb128(cursor).map_err(field("flags"))?);

        let mut other = 0;
        let mut reexport_name: &[u8] = &[];
        if flags.is_reexport() {
            other = read_uleb128(cursor).map_err(field("re-export ordinal"))?;
            reexport_name = cursor.read_cstr().map_err(field("re-export name"))?;
        }

        let mut address = read_uleb128(cursor).map_err(field("value"))?;

        if flags.is_stub_and_resolver() {
            other = read_uleb128(cursor).map_err(field("resolver offset"))?;
        }

        if flags.is_regular() || flags.is_thread_local() {
            address = address.wrapping_add(self.load_address);
        }

        let prefix = String::from_utf8_lossy(&node.prefix);
        let name = if reexport_name.is_empty() {
            prefix.into_owned()
        } else {
            format!("{} ({})", prefix, String::from_utf8_lossy(reexport_name))
        };

        Ok(ExportEntry {
            name,
            flags,
            other,
            address,
            found_in_dylib: None,
        })
    }
}

/// Converts a decoded offset to a cursor position; unrepresentable offsets
/// land past the end of any slice.
#[inline]
pub(crate) fn to_offset(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}
