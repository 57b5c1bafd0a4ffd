//! End-of-parse checks over the lexer's final state.
//!
//! These run after the grammar is done with the token stream:
//! - An unpopped mode means a region was opened and never closed. The top mode names the construct; a rescan finds
//!   the token that opened it.
//! - Tokens left after the parser stopped are reported as extra characters.
//! - When only generic grammar errors were found, an unmatched `{` (or `(` for expressions) is the likelier cause
//!   and replaces them.

use super::{Issue, IssueKind, messages};
use crate::lexer::{Lexer, Mode, Token, TokenKind};
use crate::source::{Position, Span};
use tagscript_core::lang::punctuation::PunctuationId;

/// Longest extra text quoted in a message.
const EXTRA_TEXT_LIMIT: usize = 100;

/// Maps a byte span of the lexed text to a document position.
pub type Locate<'l> = &'l dyn Fn(Span) -> Position;

/// Describe the innermost unterminated region, if any.
pub fn unterminated_construct(lexer: &Lexer<'_>, locate: Locate<'_>) -> Option<Issue> {
    let modes = lexer.modes();
    if !modes.is_unpopped() {
        return None;
    }
    let at = |token: Option<Token>| {
        let pos = locate(token.map_or(Span::new(0, 0), |t| t.span));
        (pos.start.line, pos)
    };
    let issue = match modes.top() {
        Mode::Output => {
            let (line, pos) = at(last_tag_open(lexer, Some("output")));
            messages::unclosed_output_tag(line, pos)
        }
        Mode::TagHead => {
            let found = lexer.find_previous_token_and_siblings(
                |k| matches!(k, TokenKind::ComponentOpen | TokenKind::ComponentSlashOpen),
                2,
            );
            let name: String = found.iter().skip(1).map(|t| t.text(lexer.source())).collect();
            let (line, pos) = at(found.first().cloned());
            messages::unclosed_tag(&name, line, pos)
        }
        Mode::TagExpression => {
            let (line, pos) = at(last_tag_open(lexer, None));
            messages::unclosed_tag_expression(line, pos)
        }
        Mode::TagComment => {
            let (line, pos) = at(lexer.find_previous_token(|k| *k == TokenKind::TagComment));
            messages::unclosed_tag_comment(line, pos)
        }
        Mode::BlockComment => {
            let (line, pos) = at(lexer.find_previous_token(|k| {
                matches!(k, TokenKind::BlockComment | TokenKind::DocComment)
            }));
            messages::unclosed_comment(line, pos)
        }
        Mode::Hash if modes.contains(Mode::DoubleQuote) || modes.contains(Mode::SingleQuote) => {
            let (_, pos) = at(lexer.find_previous_token(|k| matches!(k, TokenKind::OpenQuote(_))));
            messages::unterminated_hash(pos)
        }
        Mode::DoubleQuote => {
            let (_, pos) = at(lexer.find_previous_token(|k| *k == TokenKind::OpenQuote('"')));
            messages::unterminated_quote(pos)
        }
        Mode::SingleQuote => {
            let (_, pos) = at(lexer.find_previous_token(|k| {
                matches!(k, TokenKind::OpenQuote('\'') | TokenKind::QueryString(_))
            }));
            messages::unterminated_single_quote(pos)
        }
        Mode::ScriptIsland => {
            let (line, pos) = at(last_tag_open(lexer, Some("script")));
            messages::unclosed_script_island(line, pos)
        }
        Mode::TemplateIsland => {
            let (line, pos) = at(lexer.find_previous_token(|k| *k == TokenKind::TemplateIslandStart));
            messages::unclosed_template_island(line, pos)
        }
        Mode::Hash | Mode::Script | Mode::Template | Mode::Query => {
            let (_, pos) = at(lexer.tokens().last().cloned());
            messages::unpopped_modes(&modes.unpopped(), pos)
        }
    };
    tracing::debug!(mode = modes.top().name(), message = %issue.message, "unterminated construct");
    Some(issue)
}

/// `Extra char(s) [...]` for input left after the parser stopped at byte `start`.
pub fn extra_chars(lexer: &Lexer<'_>, start: usize, locate: Locate<'_>) -> Issue {
    let mut text = String::new();
    let mut first: Option<Span> = None;
    for token in lexer.rescan().iter().filter(|t| t.span.start >= start) {
        if token.kind == TokenKind::Eof || text.chars().count() >= EXTRA_TEXT_LIMIT {
            break;
        }
        if first.is_none() && !token.is_hidden() {
            first = Some(token.span);
        }
        if first.is_some() {
            text.push_str(token.text(lexer.source()));
        }
    }
    messages::extra_chars(&text, locate(first.unwrap_or(Span::new(start, start))))
}

/// The unmatched-bracket fallback.
///
/// Applies only when `issues` is non-empty and holds no lexical issue. When an unclosed `open` exists, every syntax
/// issue is replaced by a single unclosed-bracket issue; semantic issues are kept.
pub fn unclosed_fallback(lexer: &Lexer<'_>, issues: &mut Vec<Issue>, open: PunctuationId, locate: Locate<'_>) {
    if issues.is_empty() || issues.iter().any(|i| i.kind == IssueKind::Lexical) {
        return;
    }
    let close = match open {
        PunctuationId::LParen => PunctuationId::RParen,
        PunctuationId::LBracket => PunctuationId::RBracket,
        _ => PunctuationId::RBrace,
    };
    let Some(token) = lexer.find_unclosed_token(open, close) else {
        return;
    };
    let pos = locate(token.span);
    let line = pos.start.line;
    let issue = match open {
        PunctuationId::LParen => messages::unclosed_paren(line, pos),
        _ => messages::unclosed_brace(line, pos),
    };
    issues.retain(|i| i.kind != IssueKind::Syntax);
    issues.insert(0, issue);
}

/// The last `<` opening a tag, optionally only for tag `name`.
fn last_tag_open(lexer: &Lexer<'_>, name: Option<&str>) -> Option<Token> {
    let tokens = lexer.rescan();
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.is_hidden()).collect();
    significant.iter().enumerate().rev().find_map(|(i, t)| {
        if !matches!(t.kind, TokenKind::ComponentOpen | TokenKind::UnexpectedExpressionEnd) {
            return None;
        }
        let matches_name = match (name, significant.get(i + 2).map(|n| &n.kind)) {
            (None, _) => true,
            (Some(want), Some(TokenKind::ComponentName(found))) => found.eq_ignore_ascii_case(want),
            _ => false,
        };
        matches_name.then(|| (*t).clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LineIndex, Source};
    use tagscript_core::Flavor;

    fn check(text: &str, resting: Mode, flavor: Flavor) -> Option<String> {
        let mut lexer = Lexer::new(text, resting, flavor);
        lexer.tokenize();
        let source = Source::code(text);
        let index = LineIndex::new(text);
        let locate = |span: Span| {
            Position::new(index.point(text, span.start), index.point(text, span.end), source.clone())
        };
        unterminated_construct(&lexer, &locate).map(|i| i.message)
    }

    #[test]
    fn names_the_unterminated_construct() {
        let cf = |s| check(s, Mode::Template, Flavor::Cf);
        assert_eq!(cf("a\n<cfoutput>#x#"), Some("Unclosed output tag on line 2".into()));
        assert_eq!(cf("<cfhttp url=\"x\""), Some("Unclosed tag [cfhttp] starting on line 1".into()));
        assert_eq!(cf("\n\n<cfhttp url=x"), Some("Unclosed tag [cfhttp] starting on line 3".into()));
        assert_eq!(cf("<cfset x = 1"), Some("Unclosed expression inside an opening tag on line 1".into()));
        assert_eq!(cf("<!--- never"), Some("Unclosed tag comment on line 1".into()));
        assert_eq!(cf("<cfscript>x = 1;"), Some("Unclosed script island on line 1".into()));
        assert_eq!(cf("<cfoutput>ok</cfoutput>"), None);
    }

    #[test]
    fn names_unterminated_script_constructs() {
        let script = |s| check(s, Mode::Script, Flavor::Box);
        assert_eq!(script("x = \"abc"), Some("Unterminated quote expression.".into()));
        assert_eq!(script("x = 'abc"), Some("Unterminated single quote expression.".into()));
        assert_eq!(
            script("x = \"a#b"),
            Some("Unterminated hash expression inside of string literal.".into())
        );
        assert_eq!(script("x = 1; /* open"), Some("Unclosed comment on line 1".into()));
        assert_eq!(script("x = ```<bx:http a"), Some("Unclosed tag [bx:http] starting on line 1".into()));
        assert_eq!(script("x = ```text"), Some("Unclosed template island on line 1".into()));
    }
}
