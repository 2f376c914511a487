//! Source positions and ranges.

use serde::Serialize;
use std::fmt;
use vellum_carton::CompactString;

/// Zero-based line/column position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A range of source text inside one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub file: CompactString,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub fn new(file: impl Into<CompactString>, start: SourcePosition, end: SourcePosition) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for SourceRange {
    /// Human form, one-based like compiler output: `file:line:column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file,
            self.start.line + 1,
            self.start.column + 1
        )
    }
}

/// Identity of a syntax node inside its document.
///
/// Entities never hold the node itself; the parse that produced it is gone by
/// the time anyone reads the entity. The byte span is enough to tell two nodes
/// of the same kind apart and to find the node again in a fresh parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SyntaxNodeId {
    pub start: u32,
    pub end: u32,
}

impl SyntaxNodeId {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_display_is_one_based() {
        let range = SourceRange::new("x.js", SourcePosition::new(0, 0), SourcePosition::new(0, 5));
        assert_eq!(range.to_string(), "x.js:1:1");
    }
}
