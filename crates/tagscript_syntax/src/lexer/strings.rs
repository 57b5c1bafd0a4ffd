//! Quoted string bodies.
//!
//! A string body is a run of `StringText` tokens separated by `#` holes. Doubled quotes (`""`, `''`) and doubled
//! hashes (`##`) stay inside the text; the parser unescapes them.

use super::{Lexer, Mode, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn scan_string(&mut self, quote: char) {
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    self.flush_string_text(start);
                    return;
                }
                Some(c) if c == quote => {
                    if self.peek_at(1) == Some(quote) {
                        self.advance_bytes(2);
                        continue;
                    }
                    self.flush_string_text(start);
                    let close = self.pos;
                    self.advance();
                    self.add_token(TokenKind::CloseQuote(quote), close);
                    self.modes.pop();
                    return;
                }
                Some('#') => {
                    if self.peek_at(1) == Some('#') {
                        self.advance_bytes(2);
                        continue;
                    }
                    self.flush_string_text(start);
                    let hash = self.pos;
                    self.advance();
                    self.add_token(TokenKind::Hash, hash);
                    self.modes.push(Mode::Hash);
                    return;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn flush_string_text(&mut self, start: usize) {
        if self.pos > start {
            let text = self.source[start..self.pos].to_string();
            self.add_token(TokenKind::StringText(text), start);
        }
    }
}
