//! Single-symbol export trie lookup.
//!
//! The walker follows only the edges that spell out the requested symbol and
//! never reconstructs other names. Edge labels are still read to the end even
//! after a mismatch, since the child offset that follows them is needed to
//! stay aligned with the stream.

use tracing::trace;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::leb128::read_uleb128;

use super::entry::{truncation, ExportPayload};
use super::parser::to_offset;

/// Returns the offset of `symbol`'s export payload in `data`.
///
/// The offset points just past the terminal size of the symbol's node, where
/// its flags begin. Decode it with [`ExportPayload::decode_at`].
pub fn walk_trie(data: &[u8], symbol: impl AsRef<[u8]>) -> Result<usize> {
    TrieWalker::new(data).find(symbol)
}

/// Looks up `symbol` and decodes its export payload.
pub fn lookup_export(data: &[u8], symbol: impl AsRef<[u8]>) -> Result<ExportPayload> {
    let offset = walk_trie(data, symbol)?;
    ExportPayload::decode_at(data, offset)
}

/// Targeted lookup over an export trie.
#[derive(Debug, Clone)]
pub struct TrieWalker<'a> {
    data: &'a [u8],
    node_limit: usize,
}

impl<'a> TrieWalker<'a> {
    /// Creates a walker over `data`.
    ///
    /// As with the parser, the number of nodes a lookup may descend through
    /// defaults to the byte length of the trie.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            node_limit: data.len().max(1),
        }
    }

    /// Sets the maximum number of nodes a single lookup may visit.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = limit;
        self
    }

    /// Finds the export payload offset of `symbol`.
    ///
    /// Returns [`Error::SymbolNotFound`] when the trie has no such export,
    /// whether the walk dead-ends or the data runs out while reading edges.
    pub fn find(&self, symbol: impl AsRef<[u8]>) -> Result<usize> {
        let symbol = symbol.as_ref();
        let mut cursor = ByteCursor::new(self.data);
        let mut offset = 0usize;
        let mut match_index = 0usize;
        let mut visited = 0usize;

        loop {
            visited += 1;
            if visited > self.node_limit {
                return Err(Error::NodeLimitExceeded {
                    limit: self.node_limit,
                    offset,
                });
            }

            cursor.seek(offset);
            let terminal_size =
                read_uleb128(&mut cursor).map_err(|e| truncation(e, "terminal size", offset))?;

            if match_index == symbol.len() && terminal_size != 0 {
                return Ok(cursor.position());
            }

            cursor.seek(to_offset(
                (offset as u64)
                    .saturating_add(terminal_size)
                    .saturating_add(1),
            ));
            let Ok(child_count) = cursor.read_u8() else {
                break;
            };

            match self.follow_edge(&mut cursor, symbol, match_index, child_count)? {
                Some((child_offset, index)) => {
                    trace!(from = offset, to = child_offset, matched = index, "descend");
                    offset = to_offset(child_offset);
                    match_index = index;
                }
                None => break,
            }
        }

        Err(Error::not_found(symbol))
    }

    /// Scans the `child_count` edges at the cursor for one that continues
    /// `symbol` from `match_index`.
    ///
    /// Returns the child offset and the new match index of the first matching
    /// edge, or `None` if no edge matches or the data runs out.
    fn follow_edge(
        &self,
        cursor: &mut ByteCursor<'a>,
        symbol: &[u8],
        match_index: usize,
        child_count: u8,
    ) -> Result<Option<(u64, usize)>> {
        for _ in 0..child_count {
            let mut index = match_index;
            let mut wrong_edge = false;

            loop {
                let Ok(c) = cursor.read_u8() else {
                    return Ok(None);
                };
                if c == 0 {
                    break;
                }
                if !wrong_edge {
                    if index != symbol.len() && c != symbol[index] {
                        wrong_edge = true;
                    }
                    index += 1;
                    // The edge runs past the end of the symbol while still
                    // matching; the symbol cannot be below any sibling either.
                    if index > symbol.len() {
                        return Err(Error::not_found(symbol));
                    }
                }
            }

            let Ok(child_offset) = read_uleb128(cursor) else {
                return Ok(None);
            };

            if !wrong_edge {
                return Ok(Some((child_offset, index)));
            }
        }

        Ok(None)
    }
}
