//! Rendering issues with source context.
//!
//! An [`IssueReport`] pairs one [`Issue`] with the text it points into, as a [`miette::Diagnostic`]. The text comes
//! from the issue's own [`Position`], so reports work for files and in-memory code alike.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::components::BuiltinComponents;
//! use tagscript_syntax::config::ParserConfig;
//! use tagscript_syntax::diagnostics::report::IssueReport;
//! use tagscript_syntax::parser;
//!
//! let result = parser::parse("x = true.foo;", &ParserConfig::default(), &BuiltinComponents).unwrap();
//! let report = IssueReport::new(&result.issues[0]);
//! assert_eq!(report.to_string(), "Invalid dot access: [true] cannot be accessed with a dot");
//! ```

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use super::{Issue, IssueKind};
use crate::source::{LineIndex, Position};

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct IssueReport {
    message: String,
    #[source_code]
    code: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
    #[help]
    help: Option<String>,
}

impl IssueReport {
    pub fn new(issue: &Issue) -> Self {
        let text = issue.position.source.text().to_string();
        let span = source_span(&text, &issue.position);
        Self {
            message: issue.message.clone(),
            code: NamedSource::new(issue.position.source.name(), text),
            span,
            label: issue.kind.to_string(),
            help: help_for(issue),
        }
    }
}

/// One report per issue, in order.
pub fn reports(issues: &[Issue]) -> Vec<IssueReport> {
    issues.iter().map(IssueReport::new).collect()
}

/// Byte range of `pos` in `text`; positions past the text are clamped to its end.
fn source_span(text: &str, pos: &Position) -> SourceSpan {
    let index = LineIndex::new(text);
    let start = index.offset(text, pos.start);
    let end = index.offset(text, pos.end).max(start);
    SourceSpan::from(start..end)
}

fn help_for(issue: &Issue) -> Option<String> {
    match issue.kind {
        IssueKind::Lexical => Some("a region opened here is never closed".to_string()),
        IssueKind::Syntax | IssueKind::Semantic => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Point, Source};

    #[test]
    fn span_covers_the_issue_position() {
        let source = Source::code("a = 1;\nb = ?;");
        let pos = Position::new(Point::new(2, 4), Point::new(2, 5), source);
        let report = IssueReport::new(&Issue::syntax("bad", pos));
        assert_eq!(report.span, SourceSpan::from(11..12));
        assert_eq!(report.label, "syntax error");
        assert!(report.help.is_none());
    }

    #[test]
    fn positions_outside_the_text_are_clamped() {
        let source = Source::code("x");
        let pos = Position::new(Point::new(9, 0), Point::new(9, 3), source);
        let report = IssueReport::new(&Issue::lexical("Unclosed comment on line 9", pos));
        assert_eq!(report.span, SourceSpan::from(1..1));
        assert!(report.help.is_some());
    }

    #[test]
    fn report_carries_source_code_and_no_cause() {
        let source = Source::code("x = ;");
        let pos = Position::new(Point::new(1, 4), Point::new(1, 5), source);
        let report = IssueReport::new(&Issue::syntax("bad", pos));
        assert!(report.source_code().is_some());
        assert!(std::error::Error::source(&report).is_none());
    }
}
