//! Token types for the mode lexer.
//!
//! The lexer uses **registry-backed IDs** for vocabulary:
//! - `Keyword(KeywordId)` for reserved words
//! - `Operator(OperatorId)` for operators (including word operators like `and` and `eq`)
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! Everything else is structural: string quotes and interpolation markers, template text, tag delimiters, island
//! bodies and trivia.
//!
//! ## Notes
//! - `ComponentCloseEqual`, `ComponentPrefix` and `UnexpectedExpressionEnd` are raw tokens. The reclassifier
//!   rewrites them before the parser sees them.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use crate::source::Span;
use tagscript_core::lang::keywords::KeywordId;
use tagscript_core::lang::operators::OperatorId;
use tagscript_core::lang::punctuation::PunctuationId;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and literals ==========
    Ident(String),
    Int(String),
    Float(String),

    // ========== Strings ==========
    /// Opening `"` or `'`.
    OpenQuote(char),
    /// Closing `"` or `'`.
    CloseQuote(char),
    /// Raw string content between quotes and holes; doubled quotes and `##` are still escaped.
    StringText(String),
    /// `#` opening or closing an interpolation hole.
    Hash,

    // ========== Template ==========
    /// Verbatim markup text between tags.
    ContentText(String),
    /// `<` that opens a tag.
    ComponentOpen,
    /// `</` that opens a closing tag.
    ComponentSlashOpen,
    /// Flavor prefix of a tag name (`cf` or `bx:`).
    Prefix(String),
    /// Tag name after its prefix.
    ComponentName(String),
    /// Attribute name inside a tag head.
    AttrName(String),
    /// Unquoted attribute value (`<cfloop index=i ...>`).
    UnquotedValue(String),
    /// `>` that ends a tag head.
    ComponentClose,
    /// `/>` that ends a self-closing tag head.
    ComponentSlashClose,

    // ========== Islands ==========
    /// Raw body of a script island inside a template, or a template island inside script.
    IslandText(String),
    /// Triple backtick that opens a template island in script.
    TemplateIslandStart,
    /// Triple backtick that closes a template island in script.
    TemplateIslandEnd,

    // ========== Query ==========
    /// Single-quoted query string with the quotes removed (`''` still escaped).
    QueryString(String),
    /// `[name]` quoted identifier with the brackets removed.
    QuotedIdent(String),
    /// `?` or `:name` bind parameter.
    Placeholder(String),

    // ========== Raw tokens (rewritten by the reclassifier) ==========
    /// `>=` that terminates a tag expression (`<cfif a gt b>=`).
    ComponentCloseEqual,
    /// `bx:` glued to a name in script.
    ComponentPrefix,
    /// `<` that opens a new tag while a tag expression is still open.
    UnexpectedExpressionEnd,

    // ========== Trivia ==========
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,
    TagComment,

    // ========== Special ==========
    /// A character no mode knows what to do with.
    Unknown(String),
    Eof,
}

/// Parser-visible tokens go on `Default`; trivia goes on `Hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Default,
    Hidden,
}

/// A token with its kind, source span and channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub channel: Channel,
}

impl Token {
    /// Construct a new parser-visible token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        let channel = if kind.is_trivia() {
            Channel::Hidden
        } else {
            Channel::Default
        };
        Self { kind, span, channel }
    }

    /// The exact source text this token was scanned from.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }
}
