//! Interned identifier names.
//!
//! Identifiers, method names, and class names are interned to `Name(u32)`
//! for O(1) equality. Unlike a compiler-wide sharded interner, the
//! interner here is owned by one document: all mutation already goes
//! through the document's exclusive write scope, so no internal locking
//! is needed.

use std::fmt;

use rustc_hash::FxHashMap;

/// Interned string handle.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Create a name from a raw interner index.
    ///
    /// Only meaningful for indices produced by the same interner; mainly
    /// useful for building test fixtures.
    #[inline]
    pub const fn from_raw(index: u32) -> Self {
        Name(index)
    }

    /// Get the index into the interner.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Document-owned string interner.
///
/// Cloned together with the document on snapshot, so a snapshot can
/// intern new names without affecting the original.
#[derive(Clone, Default)]
pub struct StringInterner {
    map: FxHashMap<Box<str>, u32>,
    strings: Vec<Box<str>>,
}

impl StringInterner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its handle.
    ///
    /// Repeated calls with the same content return the same `Name`.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&index) = self.map.get(text) {
            return Name(index);
        }
        let index = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        self.strings.push(text.into());
        self.map.insert(text.into(), index);
        Name(index)
    }

    /// Look up the content of an interned name.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    #[track_caller]
    pub fn lookup(&self, name: Name) -> &str {
        &self.strings[name.index()]
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.strings.len())
            .finish_non_exhaustive()
    }
}
