//! Mode-driven lexer for the script, template and query dialects.
//!
//! Handles tokenization including:
//! - Keywords, word operators and identifiers (case-insensitive vocabulary)
//! - Numeric literals, quoted strings with `#expr#` holes and doubled-quote escapes
//! - Template text, tag heads, tag expressions and `output` bodies
//! - Script islands in templates and template islands in script
//! - Comments of every dialect, emitted on the hidden channel
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (`TokenKind`, `Token`, `Channel`)
//! - `modes` - `Mode` and the `ModeStack`
//! - `script` - Script-mode scanning (also used inside holes and tag expressions)
//! - `template` - Template text, tag heads, islands and tag comments
//! - `strings` - Quoted string bodies
//! - `query` - Query-mode scanning
//!
//! ## Notes
//! - The lexer never fails. Reaching end of input inside a nested region leaves that region's mode on the stack;
//!   the diagnostics layer turns the leftover stack into a construct-specific message.
//! - [`Lexer::rescan`] re-tokenizes from the start. The backward searches used by diagnostics
//!   ([`Lexer::find_previous_token`], [`Lexer::find_unclosed_token`]) and comment extraction work on a rescan.

pub mod modes;
mod query;
mod script;
mod strings;
mod template;
pub mod tokens;

pub use modes::{Mode, ModeStack};
pub use tokens::{Channel, Token, TokenKind};

use crate::source::Span;
use tagscript_core::Flavor;
use tagscript_core::lang::operators::OperatorId;
use tagscript_core::lang::punctuation::PunctuationId;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Mode transitions (simplified):
//
// [Template] → `<cfname` → [TagHead] → `>` → [Template]      (`output` → [Output], `script` → [ScriptIsland])
//            → `<cfset`  → [TagExpression] → unnested `>` → [Template]
// [TagHead]  → `"` → [DoubleQuote] → `#` → [Hash] → `#` → [DoubleQuote] → `"` → [TagHead]
// [Script]   → "```" → [TemplateIsland] → "```" → [Script]
// ============================================================================

/// Output of a complete tokenization.
#[derive(Debug, Clone)]
pub struct LexOutcome {
    pub tokens: Vec<Token>,
    /// The mode stack as it stood at end of input.
    pub modes: ModeStack,
}

/// Lexer over one source text.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    flavor: Flavor,
    resting: Mode,
    modes: ModeStack,
    tokens: Vec<Token>,
    /// Lower-cased name of the tag whose head is being scanned, and whether it is a closing tag.
    open_tag: Option<(String, bool)>,
    /// Inside a tag head, the previous significant token was `=`.
    after_equals: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer starting in `resting` mode.
    pub fn new(source: &'a str, resting: Mode, flavor: Flavor) -> Self {
        Self {
            source,
            pos: 0,
            flavor,
            resting,
            modes: ModeStack::new(resting),
            tokens: Vec::new(),
            open_tag: None,
            after_equals: false,
        }
    }

    /// Tokenize the entire source.
    ///
    /// The token stream always ends with an `Eof` token. Calling this twice is a no-op the second time.
    pub fn tokenize(&mut self) -> &[Token] {
        if self.tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
            return &self.tokens;
        }
        while !self.is_at_end() {
            let before = (self.pos, self.modes.len());
            self.scan_token();
            if (self.pos, self.modes.len()) == before {
                // Each step consumes input or changes mode.
                self.bump_unknown();
            }
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, Span::new(self.source.len(), self.source.len())));
        &self.tokens
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn modes(&self) -> &ModeStack {
        &self.modes
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Whether end of input was reached inside a nested region.
    pub fn has_unpopped_modes(&self) -> bool {
        self.modes.is_unpopped()
    }

    pub fn into_outcome(mut self) -> LexOutcome {
        self.tokenize();
        LexOutcome {
            tokens: self.tokens,
            modes: self.modes,
        }
    }

    // ========================================================================
    // Reset and rescan
    // ========================================================================

    /// Re-tokenize the source from the beginning with a fresh lexer.
    pub fn rescan(&self) -> Vec<Token> {
        Lexer::new(self.source, self.resting, self.flavor).into_outcome().tokens
    }

    /// The last token in the rescanned stream matching `pred`.
    pub fn find_previous_token(&self, pred: impl Fn(&TokenKind) -> bool) -> Option<Token> {
        self.rescan().into_iter().rev().find(|t| pred(&t.kind))
    }

    /// The last token matching `pred` followed by up to `siblings` default-channel tokens after it.
    pub fn find_previous_token_and_siblings(&self, pred: impl Fn(&TokenKind) -> bool, siblings: usize) -> Vec<Token> {
        let tokens = self.rescan();
        let Some(index) = tokens.iter().rposition(|t| pred(&t.kind)) else {
            return Vec::new();
        };
        let mut out = vec![tokens[index].clone()];
        out.extend(
            tokens[index + 1..]
                .iter()
                .filter(|t| !t.is_hidden() && t.kind != TokenKind::Eof)
                .take(siblings)
                .cloned(),
        );
        out
    }

    /// The innermost `open` punctuation that has no matching `close`.
    pub fn find_unclosed_token(&self, open: PunctuationId, close: PunctuationId) -> Option<Token> {
        let mut stack = Vec::new();
        for token in self.rescan() {
            if token.kind.is_punctuation(open) {
                stack.push(token);
            } else if token.kind.is_punctuation(close) {
                stack.pop();
            }
        }
        stack.pop()
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advance over `n` bytes known to be on a char boundary.
    fn advance_bytes(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        self.rest()
            .get(..s.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(s))
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.pos)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    fn bump_unknown(&mut self) {
        let start = self.pos;
        if let Some(c) = self.advance() {
            self.add_token(TokenKind::Unknown(c.to_string()), start);
        }
    }

    /// The last default-channel token emitted so far.
    fn last_significant(&self) -> Option<&TokenKind> {
        self.tokens.iter().rev().find(|t| !t.is_hidden()).map(|t| &t.kind)
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        match self.modes.top() {
            Mode::Script | Mode::Hash | Mode::TagExpression => self.scan_script(),
            Mode::Template | Mode::Output | Mode::TemplateIsland => self.scan_template(),
            Mode::TagHead => self.scan_tag_head(),
            Mode::DoubleQuote => self.scan_string('"'),
            Mode::SingleQuote => self.scan_string('\''),
            Mode::ScriptIsland => self.scan_script_island(),
            Mode::Query => self.scan_query(),
            // Comment modes are entered and left inside a single scan step; finding one on top means the comment
            // ran to end of input, so there is nothing left to scan.
            Mode::TagComment | Mode::BlockComment => self.pos = self.source.len(),
        }
    }

    /// Scan a `/* ... */` comment; `/** ... */` becomes a doc comment.
    fn scan_block_comment(&mut self) {
        let start = self.pos;
        let is_doc = self.starts_with("/**") && !self.starts_with("/**/");
        self.modes.push(Mode::BlockComment);
        self.advance_bytes(2);
        match self.rest().find("*/") {
            Some(end) => {
                self.advance_bytes(end + 2);
                self.modes.pop();
            }
            None => self.pos = self.source.len(),
        }
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        };
        self.add_token(kind, start);
    }

    fn scan_line_comment(&mut self, start: usize) {
        self.eat_while(|c| c != '\n');
        self.add_token(TokenKind::LineComment, start);
    }

    fn scan_whitespace(&mut self, start: usize) {
        self.eat_while(char::is_whitespace);
        self.add_token(TokenKind::Whitespace, start);
    }
}

/// Tokenize `source` completely, starting in `resting` mode.
#[tracing::instrument(skip_all, fields(len = source.len(), mode = resting.name(), flavor = flavor.name()))]
pub fn lex(source: &str, resting: Mode, flavor: Flavor) -> LexOutcome {
    let outcome = Lexer::new(source, resting, flavor).into_outcome();
    tracing::debug!(tokens = outcome.tokens.len(), unpopped = outcome.modes.is_unpopped(), "lexed");
    outcome
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests;
