//! Disambiguation predicates.
//!
//! Pure lookahead checks the parser consults at choice points where two productions start the same way. Each takes
//! the default-channel token slice and the current index; only [`is_tag_invocation`] also asks the tag registry.
//!
//! ## Notes
//! - `is_tag_invocation` evaluates its checks in a fixed order and the first failing check decides: a call or index
//!   after the name wins over the type-keyword check, so `query[1]` is an index expression.

use crate::lexer::{Token, TokenKind};
use tagscript_core::Flavor;
use tagscript_core::lang::components::TagRegistry;
use tagscript_core::lang::keywords::KeywordId;
use tagscript_core::lang::operators::OperatorId;
use tagscript_core::lang::punctuation::PunctuationId;
use tagscript_core::lang::types;

/// Lookahead cap for scans that skip an unbounded prefix (function headers, lambda parameter lists).
const SCAN_LIMIT: usize = 256;

fn at(tokens: &[Token], i: usize) -> Option<&TokenKind> {
    tokens.get(i).map(|t| &t.kind).filter(|k| **k != TokenKind::Eof)
}

fn is_punct(tokens: &[Token], i: usize, id: PunctuationId) -> bool {
    at(tokens, i).is_some_and(|k| k.is_punctuation(id))
}

fn is_keyword(tokens: &[Token], i: usize, id: KeywordId) -> bool {
    at(tokens, i).is_some_and(|k| k.is_keyword(id))
}

/// Name of an identifier-like token as written.
pub fn name_at<'s>(tokens: &[Token], i: usize, source: &'s str) -> Option<&'s str> {
    let token = tokens.get(i)?;
    token.kind.identifier_like().map(|_| token.text(source))
}

fn is_assignment(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Operator(
            OperatorId::Assign
                | OperatorId::PlusEq
                | OperatorId::MinusEq
                | OperatorId::StarEq
                | OperatorId::SlashEq
                | OperatorId::PercentEq
                | OperatorId::AmpEq
        )
    )
}

/// Whether the statement at `pos` is a tag/component invocation (`http url="x" { ... }`).
///
/// ## Checks (first failure returns `false`)
/// 1. The token is identifier-like.
/// 2. The registry knows the name.
/// 3. The next token is not `(`, `[`, an assignment, `::` or `?.`.
/// 4. A type keyword after the name is an attribute only when `=` follows it (`widget class="x"`, not
///    `param string x`).
/// 5. The statement is not a typed declaration ([`is_typed_declaration`], `query results = 1`).
/// 6. Neither of the next two tokens is `.`.
pub fn is_tag_invocation(tokens: &[Token], pos: usize, source: &str, registry: &dyn TagRegistry) -> bool {
    let Some(name) = name_at(tokens, pos, source) else {
        return false;
    };
    if !registry.has_tag(name) {
        return false;
    }
    if let Some(next) = at(tokens, pos + 1) {
        let call_or_access = next.is_punctuation(PunctuationId::LParen)
            || next.is_punctuation(PunctuationId::LBracket)
            || next.is_punctuation(PunctuationId::ColonColon)
            || next.is_punctuation(PunctuationId::SafeDot)
            || is_assignment(next)
            || next.is_operator(OperatorId::PlusPlus)
            || next.is_operator(OperatorId::MinusMinus);
        if call_or_access {
            return false;
        }
    }
    let typed = name_at(tokens, pos + 1, source).is_some_and(types::is_type_keyword)
        && !at(tokens, pos + 2).is_some_and(|k| k.is_operator(OperatorId::Assign));
    if typed || is_typed_declaration(tokens, pos, source) {
        return false;
    }
    !(is_punct(tokens, pos + 1, PunctuationId::Dot) || is_punct(tokens, pos + 2, PunctuationId::Dot))
}

/// `Query results = ...`: a type name, a plain identifier and `=`, with no component body after it.
///
/// A `{` at bracket depth zero that does not start a value (after `=`, `:`, `,` or an opening bracket) is a
/// component body, so `query name="q" { ... }` stays a tag.
pub fn is_typed_declaration(tokens: &[Token], pos: usize, source: &str) -> bool {
    let typed = matches!(at(tokens, pos), Some(TokenKind::Ident(_)))
        && name_at(tokens, pos, source).is_some_and(types::is_type_keyword)
        && matches!(at(tokens, pos + 1), Some(TokenKind::Ident(_)))
        && at(tokens, pos + 2).is_some_and(|k| k.is_operator(OperatorId::Assign));
    typed && !has_component_body(tokens, pos + 3)
}

fn has_component_body(tokens: &[Token], from: usize) -> bool {
    let mut depth = 0usize;
    for i in (from..).take(SCAN_LIMIT) {
        let Some(kind) = at(tokens, i) else {
            return false;
        };
        match kind.punctuation_id() {
            Some(PunctuationId::Semicolon) if depth == 0 => return false,
            Some(PunctuationId::LBrace) => {
                let starts_value = i == from
                    || at(tokens, i - 1).is_some_and(|prev| {
                        matches!(prev, TokenKind::Operator(_))
                            || prev.is_punctuation(PunctuationId::Colon)
                            || prev.is_punctuation(PunctuationId::Comma)
                            || prev.is_punctuation(PunctuationId::LParen)
                            || prev.is_punctuation(PunctuationId::LBracket)
                            || prev.is_punctuation(PunctuationId::LBrace)
                    });
                if depth == 0 && !starts_value {
                    return true;
                }
                depth += 1;
            }
            Some(PunctuationId::LParen | PunctuationId::LBracket) => depth += 1,
            Some(PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace) => {
                let Some(inner) = depth.checked_sub(1) else {
                    return false;
                };
                depth = inner;
            }
            _ => {}
        }
    }
    false
}

/// Cf script: `cfhttp(url="x")` where `http` is a registered tag.
pub fn is_prefixed_call_component(tokens: &[Token], pos: usize, flavor: Flavor, registry: &dyn TagRegistry) -> bool {
    if flavor != Flavor::Cf || !is_punct(tokens, pos + 1, PunctuationId::LParen) {
        return false;
    }
    let Some(TokenKind::Ident(name)) = at(tokens, pos) else {
        return false;
    };
    let prefix = flavor.tag_prefix();
    name.len() > prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
        && registry.has_tag(&name[prefix.len()..])
}

/// `var|final|static` followed by an identifier-like token.
pub fn is_declaration_modifier(tokens: &[Token], pos: usize) -> bool {
    let modifier = at(tokens, pos)
        .and_then(|k| k.keyword_id())
        .is_some_and(|id| matches!(id, KeywordId::Var | KeywordId::Final | KeywordId::Static));
    modifier && at(tokens, pos + 1).is_some_and(|k| k.identifier_like().is_some())
}

/// `throw` not followed by `(`.
pub fn is_throw_statement(tokens: &[Token], pos: usize) -> bool {
    is_keyword(tokens, pos, KeywordId::Throw) && !is_punct(tokens, pos + 1, PunctuationId::LParen)
}

/// `throw name=...`: the component form.
pub fn is_throw_component(tokens: &[Token], pos: usize) -> bool {
    is_keyword(tokens, pos, KeywordId::Throw)
        && at(tokens, pos + 1).is_some_and(|k| k.identifier_like().is_some())
        && at(tokens, pos + 2).is_some_and(|k| k.is_operator(OperatorId::Assign))
}

/// Optional access, modifiers and a return type, then `function name`.
pub fn is_function_declaration(tokens: &[Token], pos: usize) -> bool {
    let mut i = pos;
    while at(tokens, i).and_then(|k| k.keyword_id()).is_some_and(|id| {
        matches!(
            id,
            KeywordId::Public
                | KeywordId::Private
                | KeywordId::Package
                | KeywordId::Remote
                | KeywordId::Static
                | KeywordId::Final
                | KeywordId::Abstract
        )
    }) {
        i += 1;
    }
    if !is_keyword(tokens, i, KeywordId::Function) {
        // Return type: a dotted name, optionally followed by `[]`.
        if at(tokens, i).is_none_or(|k| k.identifier_like().is_none()) {
            return false;
        }
        i += 1;
        while is_punct(tokens, i, PunctuationId::Dot) && at(tokens, i + 1).is_some_and(|k| k.identifier_like().is_some())
        {
            i += 2;
        }
        if is_punct(tokens, i, PunctuationId::LBracket) && is_punct(tokens, i + 1, PunctuationId::RBracket) {
            i += 2;
        }
    }
    is_keyword(tokens, i, KeywordId::Function)
        && at(tokens, i + 1).is_some_and(|k| k.identifier_like().is_some() || k.keyword_id().is_some())
}

/// `label: for|while|do`.
pub fn is_labelled_loop(tokens: &[Token], pos: usize) -> bool {
    matches!(at(tokens, pos), Some(TokenKind::Ident(_)))
        && is_punct(tokens, pos + 1, PunctuationId::Colon)
        && (is_keyword(tokens, pos + 2, KeywordId::For)
            || is_keyword(tokens, pos + 2, KeywordId::While)
            || is_keyword(tokens, pos + 2, KeywordId::Do))
}

/// An identifier-compatible keyword used as a value: `default = 1`, `param.x`, `var[1]`.
pub fn is_keyword_used_as_value(tokens: &[Token], pos: usize) -> bool {
    let compatible = at(tokens, pos)
        .and_then(|k| k.keyword_id())
        .is_some_and(tagscript_core::lang::keywords::is_identifier_compatible);
    compatible
        && at(tokens, pos + 1).is_some_and(|k| {
            is_assignment(k) || k.is_punctuation(PunctuationId::Dot) || k.is_punctuation(PunctuationId::LBracket)
        })
}

/// `(params) =>`, `(params) ->`, `x =>` or `x ->`.
pub fn is_lambda_start(tokens: &[Token], pos: usize) -> bool {
    let arrow = |i| is_punct(tokens, i, PunctuationId::FatArrow) || is_punct(tokens, i, PunctuationId::Arrow);
    if at(tokens, pos).is_some_and(|k| k.identifier_like().is_some()) {
        return arrow(pos + 1);
    }
    if !is_punct(tokens, pos, PunctuationId::LParen) {
        return false;
    }
    match matching_close(tokens, pos) {
        Some(close) => arrow(close + 1),
        None => false,
    }
}

/// Index of the bracket closing the one opened at `open`.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open).take(SCAN_LIMIT) {
        match token.punctuation_id() {
            Some(PunctuationId::LParen | PunctuationId::LBracket | PunctuationId::LBrace) => depth += 1,
            Some(PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace) => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ if token.kind == TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}
