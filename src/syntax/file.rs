//! Syntax file wrapper for parsed Ruby files.
//!
//! Bundles the rowan parse result with the source text and a line index so
//! later layers can report positions without reparsing.

use crate::base::{LineIndex, Span};
use crate::parser::{AstNode, GreenNode, Parse, SourceFile, SyntaxNode, parse};

/// A parse error converted to a line/column span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// A parsed syntax file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFile {
    text: String,
    green: GreenNode,
    errors: Vec<ParseError>,
    line_index: LineIndex,
}

impl SyntaxFile {
    /// Parse `source` into a syntax file
    pub fn new(source: &str) -> Self {
        let Parse { green, errors } = parse(source);
        let line_index = LineIndex::new(source);
        let errors = errors
            .into_iter()
            .map(|error| ParseError {
                span: line_index.span(error.range),
                message: error.message,
            })
            .collect();
        Self {
            text: source.to_string(),
            green,
            errors,
            line_index,
        }
    }

    /// Get the root syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Get the root source file AST node
    pub fn source_file(&self) -> Option<SourceFile> {
        SourceFile::cast(self.syntax())
    }

    /// Check if parsing had errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get parse errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Get the source text of the file
    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// Line index for converting byte offsets to line/column positions
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}
