//! Contextual token reclassification.
//!
//! The raw lexer decides token kinds from the characters alone. Some decisions need the previous significant token
//! or the next character: `foo.and` is a member named `and`, `and(1)` at the start of a statement is a call, and
//! `<cfif a gt b>=` ends the tag with a `>` that is followed by literal text.
//!
//! [`Reclassifier`] is an iterator over the raw stream. It rewrites kinds, splits compound tokens in two (the second
//! half is buffered and returned on the following call), and records the spans of unexpected expression ends for the
//! parser to report.
//!
//! ## Notes
//! - Only default-channel tokens update the lookbehind.
//! - Reclassification never fails.

use crate::lexer::{Token, TokenKind};
use crate::source::Span;
use tagscript_core::Flavor;
use tagscript_core::lang::keywords::{KeywordCategory, KeywordId};
use tagscript_core::lang::operators::{self, OperatorId};
use tagscript_core::lang::punctuation::PunctuationId;

/// Tag names whose head is a script expression; an operator word right after one cannot be binary.
const EXPRESSION_TAG_NAMES: &[&str] = &["set", "if", "elseif", "return"];

/// Keywords that take a parenthesised head, so `kw(` is not a call.
const PAREN_KEYWORDS: &[KeywordId] = &[
    KeywordId::If,
    KeywordId::ElseIf,
    KeywordId::While,
    KeywordId::For,
    KeywordId::Switch,
    KeywordId::Catch,
    KeywordId::Function,
    KeywordId::Return,
    KeywordId::New,
];

/// Reclassified stream plus the side-channel findings.
#[derive(Debug, Clone)]
pub struct Reclassified {
    pub tokens: Vec<Token>,
    /// `<` tokens that opened a tag while a tag expression was still open.
    pub unexpected_ends: Vec<Span>,
}

/// Iterator adapter rewriting raw tokens.
pub struct Reclassifier<'a, I: Iterator<Item = Token>> {
    raw: I,
    source: &'a str,
    flavor: Flavor,
    pending: Option<Token>,
    previous: Option<TokenKind>,
    brace_depth: usize,
    /// Brace depth outside each open `switch { ... }` body.
    switch_bodies: Vec<usize>,
    /// A `switch` keyword was seen and its body brace has not opened yet.
    switch_pending: bool,
    unexpected_ends: Vec<Span>,
}

impl<'a, I: Iterator<Item = Token>> Reclassifier<'a, I> {
    pub fn new(raw: I, source: &'a str, flavor: Flavor) -> Self {
        Self {
            raw,
            source,
            flavor,
            pending: None,
            previous: None,
            brace_depth: 0,
            switch_bodies: Vec::new(),
            switch_pending: false,
            unexpected_ends: Vec::new(),
        }
    }

    /// Spans of unexpected expression ends seen so far.
    pub fn unexpected_ends(&self) -> &[Span] {
        &self.unexpected_ends
    }

    fn rewrite(&mut self, token: Token) -> Token {
        let Token { kind, span, .. } = &token;
        let (start, end) = (span.start, span.end);
        match kind {
            TokenKind::ComponentCloseEqual => {
                self.buffer(TokenKind::ContentText("=".to_string()), Span::new(start + 1, end));
                Token::new(TokenKind::ComponentClose, Span::new(start, start + 1))
            }
            TokenKind::ComponentPrefix if self.previous_is_keyword(&[KeywordId::New, KeywordId::Import]) => {
                let ident_end = start + 2;
                self.buffer(TokenKind::Punctuation(PunctuationId::Colon), Span::new(ident_end, end));
                let prefix = self.source.get(start..ident_end).unwrap_or("bx").to_string();
                tracing::debug!(start, "split component prefix after new/import");
                Token::new(TokenKind::Ident(prefix), Span::new(start, ident_end))
            }
            TokenKind::UnexpectedExpressionEnd => {
                self.unexpected_ends.push(*span);
                Token::new(TokenKind::ComponentOpen, *span)
            }
            TokenKind::Keyword(KeywordId::ElseIf) => {
                if self.previous_is_punct(PunctuationId::RBrace) && self.next_char_skipping_space(end) == Some('(') {
                    let split = (start + 4).min(end);
                    self.buffer(TokenKind::Keyword(KeywordId::If), Span::new(split, end));
                    tracing::debug!(start, "split elseif");
                    Token::new(TokenKind::Keyword(KeywordId::Else), Span::new(start, split))
                } else {
                    self.identifier(&token)
                }
            }
            TokenKind::Operator(id) if operators::is_word(*id) => {
                if self.previous_is_punct(PunctuationId::Dot) {
                    return self.identifier(&token);
                }
                let call = *id != OperatorId::Not && self.next_char_skipping_space(end) == Some('(');
                if call && self.previous.as_ref().is_none_or(cannot_precede_operator) {
                    return self.identifier(&token);
                }
                token
            }
            TokenKind::Keyword(KeywordId::Switch) if self.previous_is_punct(PunctuationId::Dot) => {
                self.identifier(&token)
            }
            TokenKind::Keyword(id) if self.flavor == Flavor::Cf && self.cf_keyword_as_identifier(*id, end) => {
                self.identifier(&token)
            }
            _ => token,
        }
    }

    /// Cf heuristics for reserved words used as variable names.
    fn cf_keyword_as_identifier(&self, id: KeywordId, end: usize) -> bool {
        let info = tagscript_core::lang::keywords::info_for(id);
        if info.category == KeywordCategory::Literal || matches!(id, KeywordId::New | KeywordId::Function) {
            return false;
        }
        let in_switch_body = self.switch_bodies.last().is_some_and(|d| *d + 1 == self.brace_depth);
        let next = self.next_char_skipping_space(end);
        let immediate = self.source.get(end..).and_then(|s| s.chars().next());
        match next {
            Some(':') => return !(in_switch_body && matches!(id, KeywordId::Case | KeywordId::Default)),
            Some(',' | ')') => return true,
            _ => {}
        }
        if self.previous_is_punct(PunctuationId::Comma) {
            return true;
        }
        match immediate {
            Some('[') if id != KeywordId::In && id != KeywordId::Return => return true,
            Some('.') if id != KeywordId::Return => return true,
            Some(']') if self.previous_is_punct(PunctuationId::LBracket) => return true,
            Some('#') if self.previous == Some(TokenKind::Hash) => return true,
            _ => {}
        }
        if next == Some('(') && !PAREN_KEYWORDS.contains(&id) {
            return true;
        }
        id == KeywordId::Return && self.previous_is_keyword(&[KeywordId::Return])
    }

    fn identifier(&self, token: &Token) -> Token {
        let text = token.text(self.source).to_string();
        tracing::debug!(text = %text, start = token.span.start, "reclassified as identifier");
        Token::new(TokenKind::Ident(text), token.span)
    }

    fn buffer(&mut self, kind: TokenKind, span: Span) {
        self.pending = Some(Token::new(kind, span));
    }

    fn previous_is_punct(&self, id: PunctuationId) -> bool {
        self.previous.as_ref().is_some_and(|k| k.is_punctuation(id))
    }

    fn previous_is_keyword(&self, ids: &[KeywordId]) -> bool {
        self.previous
            .as_ref()
            .and_then(|k| k.keyword_id())
            .is_some_and(|id| ids.contains(&id))
    }

    fn next_char_skipping_space(&self, at: usize) -> Option<char> {
        self.source.get(at..)?.trim_start().chars().next()
    }

    /// Update the lookbehind with an emitted default-channel token.
    fn observe(&mut self, kind: &TokenKind) {
        match kind {
            TokenKind::Keyword(KeywordId::Switch) => self.switch_pending = true,
            TokenKind::Punctuation(PunctuationId::LBrace) => {
                if std::mem::take(&mut self.switch_pending) {
                    self.switch_bodies.push(self.brace_depth);
                }
                self.brace_depth += 1;
            }
            TokenKind::Punctuation(PunctuationId::RBrace) => {
                self.brace_depth = self.brace_depth.saturating_sub(1);
                if self.switch_bodies.last() == Some(&self.brace_depth) {
                    self.switch_bodies.pop();
                }
            }
            _ => {}
        }
        self.previous = Some(kind.clone());
    }
}

impl<'a, I: Iterator<Item = Token>> Iterator for Reclassifier<'a, I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => {
                let raw = self.raw.next()?;
                if raw.is_hidden() { raw } else { self.rewrite(raw) }
            }
        };
        if !token.is_hidden() {
            self.observe(&token.kind);
        }
        Some(token)
    }
}

/// Whether an operator word after `kind` cannot be a binary operator.
fn cannot_precede_operator(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Operator(_) => true,
        TokenKind::Punctuation(id) => matches!(
            id,
            PunctuationId::LParen
                | PunctuationId::LBrace
                | PunctuationId::RBrace
                | PunctuationId::LBracket
                | PunctuationId::Semicolon
                | PunctuationId::Colon
                | PunctuationId::Dot
                | PunctuationId::Comma
                | PunctuationId::Arrow
                | PunctuationId::FatArrow
                | PunctuationId::ColonColon
                | PunctuationId::Pipe
                | PunctuationId::Question
        ),
        TokenKind::Keyword(id) => matches!(id, KeywordId::Return | KeywordId::Switch),
        TokenKind::ComponentName(name) => EXPRESSION_TAG_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name)),
        _ => false,
    }
}

/// Reclassify a complete raw stream.
#[tracing::instrument(skip_all, fields(tokens = tokens.len(), flavor = flavor.name()))]
pub fn reclassify(tokens: Vec<Token>, source: &str, flavor: Flavor) -> Reclassified {
    let mut stage = Reclassifier::new(tokens.into_iter(), source, flavor);
    let tokens: Vec<Token> = stage.by_ref().collect();
    Reclassified {
        tokens,
        unexpected_ends: stage.unexpected_ends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Mode, lex};

    fn run(src: &str, mode: Mode, flavor: Flavor) -> Reclassified {
        reclassify(lex(src, mode, flavor).tokens, src, flavor)
    }

    fn kinds(src: &str, mode: Mode, flavor: Flavor) -> Vec<TokenKind> {
        run(src, mode, flavor)
            .tokens
            .into_iter()
            .filter(|t| !t.is_hidden() && t.kind != TokenKind::Eof)
            .map(|t| t.kind)
            .collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    #[test]
    fn operator_word_after_dot_is_a_member() {
        let k = kinds("foo.and", Mode::Script, Flavor::Box);
        assert_eq!(k[2], ident("and"));
        let k = kinds("foo.switch", Mode::Script, Flavor::Box);
        assert_eq!(k[2], ident("switch"));
    }

    #[test]
    fn operator_word_call_depends_on_what_came_before() {
        assert_eq!(kinds("and(1)", Mode::Script, Flavor::Box)[0], ident("and"));
        assert_eq!(kinds("x = and(1)", Mode::Script, Flavor::Box)[2], ident("and"));
        assert_eq!(kinds("x; and(1)", Mode::Script, Flavor::Box)[2], ident("and"));
        assert_eq!(
            kinds("x and (y)", Mode::Script, Flavor::Box)[1],
            TokenKind::Operator(OperatorId::And)
        );
        assert_eq!(
            kinds("x = not(y)", Mode::Script, Flavor::Box)[2],
            TokenKind::Operator(OperatorId::Not)
        );
    }

    #[test]
    fn close_equal_is_split_into_close_and_text() {
        let out = run("<cfif a gt b>=x", Mode::Template, Flavor::Cf);
        let significant: Vec<&Token> = out.tokens.iter().filter(|t| !t.is_hidden()).collect();
        let close = significant
            .iter()
            .position(|t| t.kind == TokenKind::ComponentClose)
            .unwrap();
        assert_eq!(significant[close].span, Span::new(12, 13));
        assert_eq!(significant[close + 1].kind, TokenKind::ContentText("=".to_string()));
        assert_eq!(significant[close + 1].span, Span::new(13, 14));
    }

    #[test]
    fn prefix_after_new_is_split() {
        let out = run("new bx:Foo()", Mode::Script, Flavor::Box);
        let significant: Vec<&Token> = out.tokens.iter().filter(|t| !t.is_hidden()).collect();
        assert_eq!(significant[1].kind, ident("bx"));
        assert_eq!(significant[1].span, Span::new(4, 6));
        assert_eq!(significant[2].kind, TokenKind::Punctuation(PunctuationId::Colon));
        assert_eq!(significant[2].span, Span::new(6, 7));
        assert_eq!(significant[3].kind, ident("Foo"));
    }

    #[test]
    fn prefix_elsewhere_is_kept() {
        let k = kinds("bx:http url=\"x\";", Mode::Script, Flavor::Box);
        assert_eq!(k[0], TokenKind::ComponentPrefix);
    }

    #[test]
    fn unexpected_expression_end_becomes_a_tag_open() {
        let out = run("<cfset x = <cfoutput>", Mode::Template, Flavor::Cf);
        assert_eq!(out.unexpected_ends, vec![Span::new(11, 12)]);
        assert!(out.tokens.iter().all(|t| t.kind != TokenKind::UnexpectedExpressionEnd));
        assert_eq!(
            out.tokens.iter().filter(|t| t.kind == TokenKind::ComponentOpen).count(),
            2
        );
    }

    #[test]
    fn cf_elseif_after_brace_is_split() {
        let src = "if (a) { } elseif (b) { }";
        let out = run(src, Mode::Script, Flavor::Cf);
        let significant: Vec<&Token> = out.tokens.iter().filter(|t| !t.is_hidden()).collect();
        let at = significant
            .iter()
            .position(|t| t.kind == TokenKind::Keyword(KeywordId::Else))
            .unwrap();
        assert_eq!(significant[at].span, Span::new(11, 15));
        assert_eq!(significant[at + 1].kind, TokenKind::Keyword(KeywordId::If));
        assert_eq!(significant[at + 1].span, Span::new(15, 17));
    }

    #[test]
    fn cf_elseif_elsewhere_is_an_identifier() {
        assert_eq!(kinds("elseif = 1", Mode::Script, Flavor::Cf)[0], ident("elseif"));
    }

    #[test]
    fn cf_keywords_used_as_variables() {
        assert_eq!(kinds("f(var, 1)", Mode::Script, Flavor::Cf)[2], ident("var"));
        assert_eq!(kinds("x = default.y", Mode::Script, Flavor::Cf)[2], ident("default"));
        assert_eq!(kinds("x = [default]", Mode::Script, Flavor::Cf)[3], ident("default"));
        assert_eq!(kinds("x = { default: 1 }", Mode::Script, Flavor::Cf)[3], ident("default"));
    }

    #[test]
    fn cf_switch_labels_stay_keywords() {
        let k = kinds("switch (x) { case 1: break; default: y = 2; }", Mode::Script, Flavor::Cf);
        assert!(k.contains(&TokenKind::Keyword(KeywordId::Default)));
        assert!(k.contains(&TokenKind::Keyword(KeywordId::Case)));
    }

    #[test]
    fn box_keeps_keywords() {
        let k = kinds("f(var, 1)", Mode::Script, Flavor::Box);
        assert_eq!(k[2], TokenKind::Keyword(KeywordId::Var));
    }

    #[test]
    fn literals_and_closures_are_never_rewritten() {
        let k = kinds("f(1, true, function() {})", Mode::Script, Flavor::Cf);
        assert!(k.contains(&TokenKind::Keyword(KeywordId::True)));
        assert!(k.contains(&TokenKind::Keyword(KeywordId::Function)));
    }
}
