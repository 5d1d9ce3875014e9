//! Identifier text.
//!
//! Ruby identifiers and constant segments are short, so [`Name`] wraps a
//! `SmolStr`: names up to 23 bytes are stored inline and cloning never
//! allocates.

use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;

/// A simple (unqualified) identifier: `foo`, `Base`, `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: &str) -> Self {
        Self(SmolStr::new(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Ruby constants start with an uppercase letter.
    pub fn is_constant(&self) -> bool {
        self.0.chars().next().is_some_and(char::is_uppercase)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<SmolStr> for Name {
    fn from(text: SmolStr) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
