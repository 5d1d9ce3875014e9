// Parsed-file wrapper shared by the HIR and the project loader
pub mod file;

pub use file::{ParseError, SyntaxFile};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
