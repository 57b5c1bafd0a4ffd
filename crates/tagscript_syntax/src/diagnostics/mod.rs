//! Issues: syntax problems reported as data.
//!
//! A parse never fails because the input is malformed. Every problem becomes an [`Issue`] with a message and a
//! [`Position`], and the caller decides whether the result is usable.
//!
//! ## Module Structure
//!
//! - `messages` - Constructors for every issue message the front end emits
//! - `expected` - Expected-token sets and rule context for grammar errors
//! - `validate` - End-of-parse checks over the lexer's final state
//! - `report` - miette rendering of issues with their source text

pub mod expected;
pub mod messages;
pub mod report;
pub mod validate;

use std::fmt;

use crate::source::Position;

/// Broad origin of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A lexical region was never closed.
    Lexical,
    /// The token stream does not fit the grammar.
    Syntax,
    /// The input parses but is not meaningful (`1.foo`, a close tag without an open tag).
    Semantic,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Lexical => write!(f, "lexical error"),
            IssueKind::Syntax => write!(f, "syntax error"),
            IssueKind::Semantic => write!(f, "error"),
        }
    }
}

/// A problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub message: String,
    pub position: Position,
    pub kind: IssueKind,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            kind,
        }
    }

    pub fn lexical(message: impl Into<String>, position: Position) -> Self {
        Self::new(IssueKind::Lexical, message, position)
    }

    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::new(IssueKind::Syntax, message, position)
    }

    pub fn semantic(message: impl Into<String>, position: Position) -> Self {
        Self::new(IssueKind::Semantic, message, position)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.position)
    }
}
