//! # Source Positions and Ranges
//!
//! Byte-offset based source ranges attached to every parsed node, origin,
//! and target. Ranges are half-open: `start` is inclusive, `end` exclusive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position within a source file.
///
/// `line` and `column` are 1-based and only used for display; all range
/// arithmetic uses the zero-based `byte` offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based byte offset.
    pub byte: usize,
}

impl Pos {
    /// Create a position.
    pub fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }
}

/// A half-open range of bytes within a named file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Name of the file the range lies in.
    pub filename: String,
    /// Inclusive start position.
    pub start: Pos,
    /// Exclusive end position.
    pub end: Pos,
}

impl Range {
    /// Create a range.
    pub fn new(filename: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self {
            filename: filename.into(),
            start,
            end,
        }
    }

    /// A range covering zero bytes.
    pub fn empty(&self) -> bool {
        self.start.byte == self.end.byte
    }

    /// Whether `offset` lies within `[start, end)`.
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start.byte && offset < self.end.byte
    }

    /// Whether `pos` lies within the range, end inclusive.
    ///
    /// Cursor queries treat a position right after the last byte as still
    /// inside, which is where an editor cursor sits after typing a name.
    pub fn contains_pos(&self, pos: Pos) -> bool {
        pos.byte >= self.start.byte && pos.byte <= self.end.byte
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.filename == other.filename
            && other.start.byte >= self.start.byte
            && other.end.byte <= self.end.byte
    }

    /// Whether two ranges share at least one byte.
    ///
    /// Ranges in different files never overlap, and a zero-length range
    /// overlaps nothing, including itself.
    pub fn overlaps(&self, other: &Range) -> bool {
        if self.filename != other.filename {
            return false;
        }
        if self.empty() || other.empty() {
            return false;
        }
        self.contains_offset(other.start.byte)
            || self.contains_offset(other.end.byte.saturating_sub(1))
            || other.contains_offset(self.start.byte)
            || other.contains_offset(self.end.byte.saturating_sub(1))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{}-{},{}",
            self.filename, self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}
