//! Export symbol flags.

use std::fmt;

use bitflags::bitflags;

// =============================================================================
// Raw Constants
// =============================================================================

/// Export symbol kind mask.
pub const EXPORT_SYMBOL_FLAGS_KIND_MASK: u64 = 0x03;

/// Regular export.
pub const EXPORT_SYMBOL_FLAGS_KIND_REGULAR: u64 = 0x00;

/// Thread-local variable.
pub const EXPORT_SYMBOL_FLAGS_KIND_THREAD_LOCAL: u64 = 0x01;

/// Absolute symbol (not relative to any section).
pub const EXPORT_SYMBOL_FLAGS_KIND_ABSOLUTE: u64 = 0x02;

/// Weak definition.
pub const EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION: u64 = 0x04;

/// Re-export from another dylib.
pub const EXPORT_SYMBOL_FLAGS_REEXPORT: u64 = 0x08;

/// Stub and resolver.
pub const EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER: u64 = 0x10;

/// Static resolver.
pub const EXPORT_SYMBOL_FLAGS_STATIC_RESOLVER: u64 = 0x20;

// =============================================================================
// Export Flags
// =============================================================================

bitflags! {
    /// Flags attached to a terminal node of an export trie.
    ///
    /// The low two bits hold the export kind rather than independent flags;
    /// use [`ExportFlags::kind`] or the `is_*` predicates instead of testing
    /// them directly. Unknown bits are retained as decoded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExportFlags: u64 {
        /// Kind bit 0 (thread-local when alone)
        const KIND_THREAD_LOCAL = EXPORT_SYMBOL_FLAGS_KIND_THREAD_LOCAL;
        /// Kind bit 1 (absolute when alone)
        const KIND_ABSOLUTE = EXPORT_SYMBOL_FLAGS_KIND_ABSOLUTE;
        /// Weak definition
        const WEAK_DEFINITION = EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION;
        /// Re-exported from another image
        const REEXPORT = EXPORT_SYMBOL_FLAGS_REEXPORT;
        /// Stub with a lazy resolver function
        const STUB_AND_RESOLVER = EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER;
        /// Static resolver
        const STATIC_RESOLVER = EXPORT_SYMBOL_FLAGS_STATIC_RESOLVER;
    }
}

/// The export kind encoded in the low bits of [`ExportFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// Section-relative address
    Regular,
    /// Thread-local variable descriptor
    ThreadLocal,
    /// Absolute value
    Absolute,
    /// Reserved kind value
    Unknown(u8),
}

impl ExportFlags {
    /// Wraps a raw flags value decoded from a trie, keeping unknown bits.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self::from_bits_retain(raw)
    }

    /// Returns the raw flags value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.bits()
    }

    /// Returns the export kind.
    #[inline]
    pub fn kind(self) -> ExportKind {
        match self.bits() & EXPORT_SYMBOL_FLAGS_KIND_MASK {
            EXPORT_SYMBOL_FLAGS_KIND_REGULAR => ExportKind::Regular,
            EXPORT_SYMBOL_FLAGS_KIND_THREAD_LOCAL => ExportKind::ThreadLocal,
            EXPORT_SYMBOL_FLAGS_KIND_ABSOLUTE => ExportKind::Absolute,
            other => ExportKind::Unknown(other as u8),
        }
    }

    /// Returns true if this is a re-export.
    #[inline]
    pub fn is_reexport(self) -> bool {
        self.contains(Self::REEXPORT)
    }

    /// Returns true if this is a stub with resolver.
    #[inline]
    pub fn is_stub_and_resolver(self) -> bool {
        self.contains(Self::STUB_AND_RESOLVER)
    }

    /// Returns true if this is a regular (non thread-local) export.
    #[inline]
    pub fn is_regular(self) -> bool {
        self.kind() == ExportKind::Regular
    }

    /// Returns true if this is a thread-local export.
    #[inline]
    pub fn is_thread_local(self) -> bool {
        self.kind() == ExportKind::ThreadLocal
    }

    /// Returns true if this is an absolute symbol.
    #[inline]
    pub fn is_absolute(self) -> bool {
        self.kind() == ExportKind::Absolute
    }

    /// Returns true if this is a weak definition.
    #[inline]
    pub fn is_weak_definition(self) -> bool {
        self.contains(Self::WEAK_DEFINITION)
    }

    /// Returns true if the value should be relocated by the load address.
    #[inline]
    pub fn is_relocatable(self) -> bool {
        self.is_regular() || self.is_thread_local()
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Regular => f.write_str("regular"),
            ExportKind::ThreadLocal => f.write_str("thread_local"),
            ExportKind::Absolute => f.write_str("absolute"),
            ExportKind::Unknown(kind) => write!(f, "kind({kind})"),
        }
    }
}

impl fmt::Display for ExportFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        if self.is_weak_definition() {
            f.write_str("|weak")?;
        }
        if self.is_reexport() {
            f.write_str("|reexport")?;
        }
        if self.is_stub_and_resolver() {
            f.write_str("|stub_and_resolver")?;
        }
        if self.contains(Self::STATIC_RESOLVER) {
            f.write_str("|static_resolver")?;
        }
        Ok(())
    }
}
