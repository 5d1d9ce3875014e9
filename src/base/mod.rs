//! Foundation types for the rubric toolchain.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`FileId`] - Interned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for diagnostics
//! - [`Name`] - Cheap-to-clone identifier text
//! - Domain constants (file extensions, always-present methods)
//!
//! This module has NO dependencies on other rubric modules.

pub mod constants;
mod file_id;
mod name;
mod position;
mod span;

pub use file_id::FileId;
pub use name::Name;
pub use position::{Position, Span};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
