//! Script-mode scanning.
//!
//! Used for the `Script` resting mode and for the two script-like nested modes: `Hash` (an interpolation hole)
//! and `TagExpression` (the raw expression of `<cfset>`, `<cfif>`, `<cfelseif>` and `<cfreturn>`). The nested
//! modes differ only in how they end.

use super::{Lexer, Mode, TokenKind, is_ident_continue, is_ident_start};
use tagscript_core::Flavor;
use tagscript_core::lang::keywords;
use tagscript_core::lang::operators::{self, OperatorId};
use tagscript_core::lang::punctuation::PunctuationId;

#[derive(Clone, Copy)]
enum Sym {
    Op(OperatorId),
    Punct(PunctuationId),
}

/// Symbol spellings, longest first.
const SYMBOLS: &[(&str, Sym)] = &[
    ("===", Sym::Op(OperatorId::EqEqEq)),
    ("!==", Sym::Op(OperatorId::NotEqEq)),
    ("==", Sym::Op(OperatorId::EqEq)),
    ("!=", Sym::Op(OperatorId::NotEq)),
    ("<>", Sym::Op(OperatorId::NotEq)),
    ("<=", Sym::Op(OperatorId::LtEq)),
    (">=", Sym::Op(OperatorId::GtEq)),
    ("&&", Sym::Op(OperatorId::AmpAmp)),
    ("||", Sym::Op(OperatorId::PipePipe)),
    ("++", Sym::Op(OperatorId::PlusPlus)),
    ("--", Sym::Op(OperatorId::MinusMinus)),
    ("+=", Sym::Op(OperatorId::PlusEq)),
    ("-=", Sym::Op(OperatorId::MinusEq)),
    ("*=", Sym::Op(OperatorId::StarEq)),
    ("/=", Sym::Op(OperatorId::SlashEq)),
    ("%=", Sym::Op(OperatorId::PercentEq)),
    ("&=", Sym::Op(OperatorId::AmpEq)),
    ("?:", Sym::Op(OperatorId::Elvis)),
    ("?.", Sym::Punct(PunctuationId::SafeDot)),
    ("->", Sym::Punct(PunctuationId::Arrow)),
    ("=>", Sym::Punct(PunctuationId::FatArrow)),
    ("::", Sym::Punct(PunctuationId::ColonColon)),
    ("+", Sym::Op(OperatorId::Plus)),
    ("-", Sym::Op(OperatorId::Minus)),
    ("*", Sym::Op(OperatorId::Star)),
    ("/", Sym::Op(OperatorId::Slash)),
    ("\\", Sym::Op(OperatorId::Backslash)),
    ("%", Sym::Op(OperatorId::Percent)),
    ("^", Sym::Op(OperatorId::Caret)),
    ("&", Sym::Op(OperatorId::Amp)),
    ("=", Sym::Op(OperatorId::Assign)),
    ("<", Sym::Op(OperatorId::Lt)),
    (">", Sym::Op(OperatorId::Gt)),
    ("!", Sym::Op(OperatorId::Bang)),
    ("?", Sym::Punct(PunctuationId::Question)),
    (":", Sym::Punct(PunctuationId::Colon)),
    (";", Sym::Punct(PunctuationId::Semicolon)),
    (",", Sym::Punct(PunctuationId::Comma)),
    (".", Sym::Punct(PunctuationId::Dot)),
    ("|", Sym::Punct(PunctuationId::Pipe)),
    ("@", Sym::Punct(PunctuationId::At)),
    ("(", Sym::Punct(PunctuationId::LParen)),
    (")", Sym::Punct(PunctuationId::RParen)),
    ("[", Sym::Punct(PunctuationId::LBracket)),
    ("]", Sym::Punct(PunctuationId::RBracket)),
    ("{", Sym::Punct(PunctuationId::LBrace)),
    ("}", Sym::Punct(PunctuationId::RBrace)),
];

impl<'a> Lexer<'a> {
    pub(super) fn scan_script(&mut self) {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return;
        };
        let top = self.modes.top();
        let unnested = self.modes.depth() == 0;

        match c {
            c if c.is_whitespace() => self.scan_whitespace(start),
            '/' if self.peek_at(1) == Some('/') => self.scan_line_comment(start),
            '/' if self.peek_at(1) == Some('*') => self.scan_block_comment(),
            '"' | '\'' => {
                self.advance();
                self.add_token(TokenKind::OpenQuote(c), start);
                self.modes.push(if c == '"' { Mode::DoubleQuote } else { Mode::SingleQuote });
            }
            '#' => {
                self.advance();
                self.add_token(TokenKind::Hash, start);
                if top == Mode::Hash && unnested {
                    self.modes.pop();
                } else {
                    self.modes.push(Mode::Hash);
                }
            }
            '`' if top == Mode::Script && self.starts_with("```") => {
                self.advance_bytes(3);
                self.add_token(TokenKind::TemplateIslandStart, start);
                self.modes.push(Mode::TemplateIsland);
            }
            '<' if top == Mode::TagExpression && self.tag_start_len(1).is_some() => {
                // A new tag starts before this tag's expression was closed.
                self.advance();
                self.add_token(TokenKind::UnexpectedExpressionEnd, start);
                self.modes.pop();
                self.scan_tag_name(false);
            }
            '>' if top == Mode::TagExpression && unnested => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.add_token(TokenKind::ComponentCloseEqual, start);
                } else {
                    self.add_token(TokenKind::ComponentClose, start);
                }
                self.modes.pop();
                self.open_tag = None;
            }
            '/' if top == Mode::TagExpression && unnested && self.peek_at(1) == Some('>') => {
                self.advance_bytes(2);
                self.add_token(TokenKind::ComponentSlashClose, start);
                self.modes.pop();
                self.open_tag = None;
            }
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) && !self.after_value() => {
                self.scan_number(start)
            }
            c if is_ident_start(c) => self.scan_word(start),
            _ => self.scan_symbol(start),
        }
    }

    /// Whether the last significant token ends an operand, so a following `.` is member access.
    fn after_value(&self) -> bool {
        matches!(
            self.last_significant(),
            Some(
                TokenKind::Ident(_)
                    | TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::CloseQuote(_)
                    | TokenKind::Punctuation(PunctuationId::RParen | PunctuationId::RBracket)
            )
        )
    }

    fn scan_number(&mut self, start: usize) {
        let mut is_float = false;
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance_bytes(digit_at);
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        let text = self.source[start..self.pos].to_string();
        let kind = if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        };
        self.add_token(kind, start);
    }

    fn scan_word(&mut self, start: usize) {
        if self.flavor == Flavor::Box
            && self.starts_with_ignore_case("bx:")
            && self.peek_at(3).is_some_and(is_ident_start)
        {
            self.advance_bytes(3);
            self.add_token(TokenKind::ComponentPrefix, start);
            return;
        }

        self.eat_while(is_ident_continue);
        let word = &self.source[start..self.pos];
        let kind = if let Some(id) = operators::lookup_word(word, self.flavor) {
            TokenKind::Operator(id)
        } else if let Some(id) = keywords::lookup(word, self.flavor) {
            TokenKind::Keyword(id)
        } else {
            TokenKind::Ident(word.to_string())
        };
        self.add_token(kind, start);
    }

    fn scan_symbol(&mut self, start: usize) {
        let rest = self.rest();
        let Some((spelling, sym)) = SYMBOLS.iter().find(|(s, _)| rest.starts_with(s)) else {
            self.bump_unknown();
            return;
        };
        self.advance_bytes(spelling.len());
        match *sym {
            Sym::Op(id) => self.add_op(id, start),
            Sym::Punct(id) => {
                match id {
                    PunctuationId::LParen | PunctuationId::LBracket | PunctuationId::LBrace => {
                        self.modes.open_bracket()
                    }
                    PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace => {
                        self.modes.close_bracket()
                    }
                    _ => {}
                }
                self.add_punct(id, start);
            }
        }
    }
}
