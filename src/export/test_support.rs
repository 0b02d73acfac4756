//! Trie fixtures and a small trie assembler for tests.

use super::flags::{EXPORT_SYMBOL_FLAGS_REEXPORT, EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER};

/// `_foo` = 0x1000 and `_bar` = 0x2000, both regular.
///
/// ```text
/// 0x00  root   ts=0  "_" -> 0x05
/// 0x05  "_"    ts=0  "foo" -> 0x11, "bar" -> 0x16
/// 0x11  _foo   ts=3  flags=0 value=0x1000, no children
/// 0x16  _bar   ts=3  flags=0 value=0x2000, no children
/// ```
pub const TWO_EXPORT_TRIE: &[u8] = &[
    0x00, 0x01, b'_', 0x00, 0x05, // root
    0x00, 0x02, b'f', b'o', b'o', 0x00, 0x11, b'b', b'a', b'r', 0x00, 0x16, // "_"
    0x03, 0x00, 0x80, 0x20, 0x00, // _foo
    0x03, 0x00, 0x80, 0x40, 0x00, // _bar
];

/// One export of each kind, plus a terminal node with a child.
///
/// ```text
/// 0x00  root  ts=0  "_" -> 0x05
/// 0x05  "_"   ts=0  "a" -> 0x13, "t" -> 0x22, "s" -> 0x26, "z" -> 0x2b
/// 0x13  _a    ts=2  regular value=0x10; "b" -> 0x1a
/// 0x1a  _ab   ts=6  re-export ordinal=1 name="_x" value=0
/// 0x22  _t    ts=2  thread-local value=0x20
/// 0x26  _s    ts=3  stub-and-resolver value=0x30 resolver=0x40
/// 0x2b  _z    ts=2  absolute value=0x50
/// ```
pub const MIXED_TRIE: &[u8] = &[
    0x00, 0x01, b'_', 0x00, 0x05, // root
    0x00, 0x04, b'a', 0x00, 0x13, b't', 0x00, 0x22, b's', 0x00, 0x26, b'z', 0x00, 0x2B, // "_"
    0x02, 0x00, 0x10, 0x01, b'b', 0x00, 0x1A, // _a
    0x06, 0x08, 0x01, b'_', b'x', 0x00, 0x00, 0x00, // _ab
    0x02, 0x01, 0x20, 0x00, // _t
    0x03, 0x10, 0x30, 0x40, 0x00, // _s
    0x02, 0x02, 0x50, 0x00, // _z
];

/// Re-export source name of [`wide_terminal_trie`].
pub const WIDE_TERMINAL_SOURCE: &str = concat!(
    "_libdispatch_introspection_hook_queue_callout_begin_",
    "with_a_source_name_long_enough_to_need_two_terminal_size_bytes_xx",
    "_and_then_end",
);

/// `_r` re-exported from ordinal 1 as [`WIDE_TERMINAL_SOURCE`], whose terminal
/// size (134) needs two ULEB128 bytes.
///
/// ```text
/// 0x00  root  ts=0    "_r" -> 0x06
/// 0x06  _r    ts=134  (0x86 0x01) re-export ordinal=1 name=<130 bytes> value=0
/// 0x8e        no children
/// ```
pub fn wide_terminal_trie() -> Vec<u8> {
    let mut payload = vec![EXPORT_SYMBOL_FLAGS_REEXPORT as u8, 0x01];
    payload.extend_from_slice(WIDE_TERMINAL_SOURCE.as_bytes());
    payload.extend([0x00, 0x00]);
    assert_eq!(payload.len(), 134);

    let mut out = vec![0x00, 0x01, b'_', b'r', 0x00, 0x06];
    out.extend([0x86, 0x01]);
    out.extend(payload);
    out.push(0x00);
    out
}

/// One export to place in an assembled trie.
#[derive(Debug, Clone)]
pub struct TestExport {
    pub name: String,
    pub flags: u64,
    pub other: u64,
    pub value: u64,
    /// Re-export source name; ignored unless `flags` has the re-export bit
    pub source: String,
}

impl TestExport {
    pub fn regular(name: &str, value: u64) -> Self {
        Self::new(name, 0x00, 0, value, "")
    }

    pub fn thread_local(name: &str, value: u64) -> Self {
        Self::new(name, 0x01, 0, value, "")
    }

    pub fn absolute(name: &str, value: u64) -> Self {
        Self::new(name, 0x02, 0, value, "")
    }

    pub fn reexport(name: &str, ordinal: u64, source: &str) -> Self {
        Self::new(name, EXPORT_SYMBOL_FLAGS_REEXPORT, ordinal, 0, source)
    }

    pub fn stub(name: &str, stub: u64, resolver: u64) -> Self {
        Self::new(name, EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER, resolver, stub, "")
    }

    fn new(name: &str, flags: u64, other: u64, value: u64, source: &str) -> Self {
        Self {
            name: name.to_string(),
            flags,
            other,
            value,
            source: source.to_string(),
        }
    }

    fn is_reexport(&self) -> bool {
        self.flags & EXPORT_SYMBOL_FLAGS_REEXPORT != 0
    }

    /// The name the parser reports for this export.
    pub fn entry_name(&self) -> String {
        if self.is_reexport() && !self.source.is_empty() {
            format!("{} ({})", self.name, self.source)
        } else {
            self.name.clone()
        }
    }

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_uleb128(&mut out, self.flags);
        if self.is_reexport() {
            push_uleb128(&mut out, self.other);
            out.extend_from_slice(self.source.as_bytes());
            out.push(0);
        }
        push_uleb128(&mut out, self.value);
        if self.flags & EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER != 0 {
            push_uleb128(&mut out, self.other);
        }
        out
    }
}

/// Appends `value` to `out` as unsigned LEB128.
pub fn push_uleb128(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn uleb128_len(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()).max(1);
    bits.div_ceil(7) as usize
}

#[derive(Default)]
struct Node {
    terminal: Option<Vec<u8>>,
    children: Vec<(Vec<u8>, Node)>,
}

impl Node {
    fn insert(&mut self, name: &[u8], payload: Vec<u8>) {
        if name.is_empty() {
            self.terminal = Some(payload);
            return;
        }

        for i in 0..self.children.len() {
            let label = &self.children[i].0;
            let common = label.iter().zip(name).take_while(|(a, b)| a == b).count();
            if common == 0 {
                continue;
            }
            if common < label.len() {
                let (label, child) = self.children.remove(i);
                let mut split = Node::default();
                split.children.push((label[common..].to_vec(), child));
                self.children.insert(i, (label[..common].to_vec(), split));
            }
            self.children[i].1.insert(&name[common..], payload);
            return;
        }

        let leaf = Node {
            terminal: Some(payload),
            children: Vec::new(),
        };
        self.children.push((name.to_vec(), leaf));
    }
}

/// A node flattened for layout: terminal payload and (label, node index) edges.
struct FlatNode {
    terminal: Vec<u8>,
    edges: Vec<(Vec<u8>, usize)>,
}

fn flatten(node: &Node, out: &mut Vec<FlatNode>) -> usize {
    let index = out.len();
    out.push(FlatNode {
        terminal: node.terminal.clone().unwrap_or_default(),
        edges: Vec::new(),
    });
    for (label, child) in &node.children {
        let child_index = flatten(child, out);
        out[index].edges.push((label.clone(), child_index));
    }
    index
}

/// Assembles an export trie holding `exports`.
///
/// Names must be non-empty, unique and free of NUL bytes, and each payload
/// must stay under 128 bytes so that every terminal size is one byte long.
/// Node offsets are recomputed until their LEB128 widths settle.
pub fn assemble_trie(exports: &[TestExport]) -> Vec<u8> {
    let mut root = Node::default();
    for export in exports {
        let payload = export.payload();
        assert!(payload.len() < 0x80, "payload too large for a test trie");
        root.insert(export.name.as_bytes(), payload);
    }

    let mut nodes = Vec::new();
    flatten(&root, &mut nodes);

    let mut offsets = vec![0usize; nodes.len()];
    loop {
        let mut next = Vec::with_capacity(nodes.len());
        let mut pos = 0usize;
        for node in &nodes {
            next.push(pos);
            pos += 1 + node.terminal.len() + 1;
            for (label, child) in &node.edges {
                pos += label.len() + 1 + uleb128_len(offsets[*child] as u64);
            }
        }
        if next == offsets {
            break;
        }
        offsets = next;
    }

    let mut out = Vec::new();
    for node in &nodes {
        push_uleb128(&mut out, node.terminal.len() as u64);
        out.extend_from_slice(&node.terminal);
        out.push(node.edges.len() as u8);
        for (label, child) in &node.edges {
            out.extend_from_slice(label);
            out.push(0);
            push_uleb128(&mut out, offsets[*child] as u64);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_matches_fixture() {
        let data = assemble_trie(&[
            TestExport::regular("_foo", 0x1000),
            TestExport::regular("_bar", 0x2000),
        ]);
        assert_eq!(data, TWO_EXPORT_TRIE);
    }
}
