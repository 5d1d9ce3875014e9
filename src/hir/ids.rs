//! Identifiers for namespaces in the symbol index.

use std::fmt;

/// Dense index of a namespace (module or class) in a [`SymbolIndex`].
///
/// Ids are only meaningful for the index that handed them out; they are
/// reassigned whenever the graph is rebuilt.
///
/// [`SymbolIndex`]: super::SymbolIndex
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(u32);

impl DefId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def#{}", self.0)
    }
}
