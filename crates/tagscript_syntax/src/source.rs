//! Source and position model.
//!
//! Every token and AST node is stamped with a [`Position`]: a start and end [`Point`] plus the [`Source`] it came
//! from. Tokens themselves only carry a byte [`Span`]; the parser converts spans to points through a [`LineIndex`]
//! and shifts them by the caller-supplied [`Offset`] so fragments parsed on their own still report coordinates in
//! the enclosing document.
//!
//! ## Notes
//! - Lines are 1-based, columns are 0-based character counts (not bytes).
//! - `Source` is shared by reference count; sub-parses of one document all point at the same `Source`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a piece of text came from.
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk, already read.
    File { path: PathBuf, text: String },
    /// In-memory code with no file behind it.
    Code { text: String },
}

/// Shared handle to a [`Source`].
pub type SourceRef = Arc<Source>;

impl Source {
    pub fn file(path: impl Into<PathBuf>, text: impl Into<String>) -> SourceRef {
        Arc::new(Source::File {
            path: path.into(),
            text: text.into(),
        })
    }

    pub fn code(text: impl Into<String>) -> SourceRef {
        Arc::new(Source::Code { text: text.into() })
    }

    /// The full text of the source.
    pub fn text(&self) -> &str {
        match self {
            Source::File { text, .. } | Source::Code { text } => text,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File { path, .. } => Some(path),
            Source::Code { .. } => None,
        }
    }

    /// Human-readable identity for diagnostics.
    pub fn name(&self) -> String {
        match self {
            Source::File { path, .. } => path.display().to_string(),
            Source::Code { .. } => "<code>".to_string(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.name())
    }
}

/// Byte range in the text a token was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A line/column location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// 1-based line.
    pub line: u32,
    /// 0-based column, counted in characters.
    pub column: u32,
}

impl Point {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start of a fragment inside its enclosing document.
///
/// `Offset::default()` (line 1, column 0) is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub line: u32,
    pub column: u32,
}

impl Default for Offset {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl Offset {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Offset whose origin is `point`.
    pub fn at(point: Point) -> Self {
        Self {
            line: point.line,
            column: point.column,
        }
    }

    /// Translate a point local to the fragment into the enclosing document.
    ///
    /// Columns only shift on the fragment's first line; later lines start at the document's own margin.
    pub fn apply(&self, point: Point) -> Point {
        let line = point.line + self.line.saturating_sub(1);
        let column = if point.line == 1 {
            point.column + self.column
        } else {
            point.column
        };
        Point { line, column }
    }

    /// Compose two offsets: `inner` is relative to the fragment described by `self`.
    pub fn then(&self, inner: Offset) -> Offset {
        Offset::at(self.apply(Point::new(inner.line, inner.column)))
    }
}

/// A (start, end, source) triple.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    pub start: Point,
    pub end: Point,
    pub source: SourceRef,
}

impl Position {
    pub fn new(start: Point, end: Point, source: SourceRef) -> Self {
        Self { start, end, source }
    }

    /// Zero-width position at `point`.
    pub fn at(point: Point, source: SourceRef) -> Self {
        Self {
            start: point,
            end: point,
            source,
        }
    }

    /// Smallest position spanning both `self` and `other`.
    pub fn merge(&self, other: &Position) -> Position {
        Position {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            source: self.source.clone(),
        }
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Position) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `self` ends at or before `other` starts.
    pub fn precedes(&self, other: &Position) -> bool {
        self.end <= other.start
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.name(), self.start)
    }
}

/// Byte offset to line/column conversion for one text buffer.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Local (un-offset) point for byte `offset` in `text`.
    pub fn point(&self, text: &str, offset: usize) -> Point {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text.get(line_start..offset).map_or(0, |s| s.chars().count());
        Point::new(line as u32 + 1, column as u32)
    }

    /// Byte offset where 1-based `line` starts, if it exists.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)? as usize).copied()
    }

    /// Byte offset of a local point, clamped to the text.
    pub fn offset(&self, text: &str, point: Point) -> usize {
        let Some(start) = self.line_start(point.line) else {
            return text.len();
        };
        text[start..]
            .char_indices()
            .take_while(|(_, c)| *c != '\n')
            .nth(point.column as usize)
            .map_or_else(
                || {
                    let rest = &text[start..];
                    start + rest.find('\n').unwrap_or(rest.len())
                },
                |(i, _)| start + i,
            )
    }
}
