//! Query-mode scanning.
//!
//! Query words are never keywords at the lexical level: `SELECT`, `from` and `and` all come out as identifiers and
//! the query parser matches them case-insensitively.

use super::{Lexer, Mode, TokenKind, is_ident_continue, is_ident_start};
use tagscript_core::lang::operators::OperatorId;
use tagscript_core::lang::punctuation::PunctuationId;

impl<'a> Lexer<'a> {
    pub(super) fn scan_query(&mut self) {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return;
        };
        match c {
            c if c.is_whitespace() => self.scan_whitespace(start),
            '-' if self.peek_at(1) == Some('-') => self.scan_line_comment(start),
            '/' if self.peek_at(1) == Some('*') => self.scan_block_comment(),
            '\'' => self.scan_query_string(start),
            '[' => match self.rest().find(']') {
                Some(end) => {
                    let name = self.source[self.pos + 1..self.pos + end].to_string();
                    self.advance_bytes(end + 1);
                    self.add_token(TokenKind::QuotedIdent(name), start);
                }
                None => {
                    self.advance();
                    self.add_punct(PunctuationId::LBracket, start);
                }
            },
            '?' => {
                self.advance();
                self.add_token(TokenKind::Placeholder("?".to_string()), start);
            }
            ':' if self.peek_at(1).is_some_and(is_ident_start) => {
                self.advance();
                let name_start = self.pos;
                self.eat_while(is_ident_continue);
                let name = self.source[name_start..self.pos].to_string();
                self.add_token(TokenKind::Placeholder(name), start);
            }
            c if c.is_ascii_digit() => self.scan_query_number(start),
            c if is_ident_start(c) => {
                self.eat_while(is_ident_continue);
                let word = self.source[start..self.pos].to_string();
                self.add_token(TokenKind::Ident(word), start);
            }
            _ => self.scan_query_symbol(start),
        }
    }

    fn scan_query_string(&mut self, start: usize) {
        self.modes.push(Mode::SingleQuote);
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let text = self.source[start + 1..].to_string();
                    self.add_token(TokenKind::QueryString(text), start);
                    return;
                }
                Some('\'') if self.peek_at(1) == Some('\'') => self.advance_bytes(2),
                Some('\'') => {
                    let text = self.source[start + 1..self.pos].to_string();
                    self.advance();
                    self.add_token(TokenKind::QueryString(text), start);
                    self.modes.pop();
                    return;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_query_number(&mut self, start: usize) {
        self.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.eat_while(|c| c.is_ascii_digit());
        }
        let text = self.source[start..self.pos].to_string();
        self.add_token(if is_float { TokenKind::Float(text) } else { TokenKind::Int(text) }, start);
    }

    fn scan_query_symbol(&mut self, start: usize) {
        const QUERY_SYMBOLS: &[(&str, Option<OperatorId>, Option<PunctuationId>)] = &[
            ("<>", Some(OperatorId::NotEq), None),
            ("!=", Some(OperatorId::NotEq), None),
            ("<=", Some(OperatorId::LtEq), None),
            (">=", Some(OperatorId::GtEq), None),
            ("||", Some(OperatorId::PipePipe), None),
            ("=", Some(OperatorId::Assign), None),
            ("<", Some(OperatorId::Lt), None),
            (">", Some(OperatorId::Gt), None),
            ("+", Some(OperatorId::Plus), None),
            ("-", Some(OperatorId::Minus), None),
            ("*", Some(OperatorId::Star), None),
            ("/", Some(OperatorId::Slash), None),
            ("%", Some(OperatorId::Percent), None),
            ("(", None, Some(PunctuationId::LParen)),
            (")", None, Some(PunctuationId::RParen)),
            (",", None, Some(PunctuationId::Comma)),
            (".", None, Some(PunctuationId::Dot)),
            (";", None, Some(PunctuationId::Semicolon)),
        ];
        let rest = self.rest();
        let Some((spelling, op, punct)) = QUERY_SYMBOLS.iter().find(|(s, _, _)| rest.starts_with(s)) else {
            self.bump_unknown();
            return;
        };
        self.advance_bytes(spelling.len());
        match (op, punct) {
            (Some(id), _) => self.add_op(*id, start),
            (_, Some(id)) => self.add_punct(*id, start),
            _ => {}
        }
    }
}
