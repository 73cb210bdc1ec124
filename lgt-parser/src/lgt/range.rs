//! Position and range tracking
//!
//! Byte spans are the canonical coordinates everywhere in this crate; line and
//! column positions are derived on demand through [LineIndex]. All range
//! boundaries produced by the scanner land on character boundaries, so the
//! conversions here are safe on multi-byte UTF-8 input.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position in source text (both zero-based, column in bytes
/// from the line start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source range: a byte span plus its start/end positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    /// Whether `offset` falls inside this range (end-exclusive).
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.span.start <= offset && offset < self.span.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Fast byte-offset to line/column conversion over one text snapshot.
pub struct LineIndex {
    /// Byte offsets where each line starts.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset to a position.
    pub fn position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, byte_offset - self.line_starts[line])
    }

    /// Convert a byte span to a [Range].
    pub fn range(&self, span: &ByteRange<usize>) -> Range {
        Range::new(
            span.clone(),
            self.position(span.start),
            self.position(span.end),
        )
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of `line`, if it exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        self.line_starts[line]
    }
}

/// Byte offset of the start of the line containing `offset`, computed
/// directly from the text (no index required).
pub fn line_start_of(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    match text[..offset].rfind('\n') {
        Some(nl) => nl + 1,
        None => 0,
    }
}

/// The leading whitespace of the line starting at `line_start`.
pub fn leading_whitespace(text: &str, line_start: usize) -> &str {
    let rest = &text[line_start..];
    let end = rest
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(rest.len());
    &rest[..end]
}
