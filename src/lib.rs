//! machtrie - A decoder for Mach-O export tries.
//!
//! Dynamic linkers and object-file tools store a binary image's exported
//! symbols in an "export trie", a prefix tree flattened into a byte range and
//! built on ULEB128 integers. This crate decodes that byte range:
//!
//! - [`parse_trie`] walks the whole trie and returns every [`ExportEntry`].
//! - [`walk_trie`] finds one symbol and returns the offset of its payload.
//! - [`leb128`] exposes the underlying varint codec.
//!
//! Locating the export-info range inside a Mach-O file is left to the caller.
//! Every entry point borrows the bytes immutably and keeps its own traversal
//! state, so lookups may run concurrently over the same range.
//!
//! # Example
//!
//! ```no_run
//! use machtrie::{parse_trie, lookup_export};
//!
//! fn main() -> machtrie::Result<()> {
//!     let export_info: &[u8] = &[/* LC_DYLD_EXPORTS_TRIE data */];
//!
//!     for export in parse_trie(export_info, 0x1_0000_0000)? {
//!         println!("{export}");
//!     }
//!
//!     let payload = lookup_export(export_info, "_main")?;
//!     println!("_main = {:#x}", payload.address(0x1_0000_0000));
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod error;
pub mod export;
pub mod leb128;

// Re-export main types
pub use cursor::ByteCursor;
pub use error::{Error, Result};
pub use export::{
    lookup_export, parse_trie, walk_trie, ExportEntry, ExportFlags, ExportKind, ExportPayload,
    ExportTrieParser, TrieWalker,
};
