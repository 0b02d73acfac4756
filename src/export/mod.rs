//! Mach-O export trie decoding.
//!
//! The export trie is a compact representation of exported symbols in a Mach-O file.
//! It uses a trie (prefix tree) structure where each node can contain:
//! - Terminal information (flags, address, optional other value)
//! - Children edges (label prefix + offset to child node)
//!
//! # Node Layout
//!
//! ```text
//! terminal size   ULEB128, 0 for non-terminal nodes
//! payload         terminal size bytes:
//!                   flags            ULEB128
//!                   ordinal + name   ULEB128, NUL-terminated (re-exports only)
//!                   value            ULEB128
//!                   resolver         ULEB128 (stub-and-resolver only)
//! child count     u8
//! edges           child count times: NUL-terminated label, ULEB128 child offset
//! ```
//!
//! [`ExportTrieParser`] materializes every export. [`TrieWalker`] locates a
//! single symbol's payload without building any other names; decode that
//! payload with [`ExportPayload::decode_at`].

mod entry;
mod flags;
mod parser;
mod walker;

#[cfg(test)]
pub(crate) mod test_support;

pub use entry::{ExportEntry, ExportPayload};
pub use flags::*;
pub use parser::{parse_trie, ExportTrieParser};
pub use walker::{lookup_export, walk_trie, TrieWalker};
