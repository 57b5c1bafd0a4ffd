//! Punctuation vocabulary.
//!
//! This module defines the canonical set of non-operator punctuation tokens used by the lexer/parser:
//! delimiters, separators, access markers and arrows.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** (punctuation has no case).
//! - `?` is punctuation (ternary marker), while `?:` is the elvis operator and `?.` is [`PunctuationId::SafeDot`].
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::punctuation::{self, PunctuationId};
//!
//! assert_eq!(punctuation::from_str("::"), Some(PunctuationId::ColonColon));
//! assert_eq!(punctuation::as_str(PunctuationId::FatArrow), "=>");
//! ```

/// Broad syntactic grouping for punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationCategory {
    /// Brackets and braces.
    Delimiter,
    /// Separators like `,`, `;` and `:`.
    Separator,
    /// Access markers like `.`, `?.` and `::`.
    Access,
    /// Lambda arrows `->` and `=>`.
    Arrow,
    /// Misc markers like `?`, `@` and `|`.
    Marker,
}

/// Stable identifier for punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PunctuationId {
    // Separators / markers
    Comma,
    Colon,
    Semicolon,
    Question,
    At,
    Pipe,

    // Access
    Dot,
    SafeDot,
    ColonColon,

    // Lambda arrows
    Arrow,
    FatArrow,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

/// Metadata for a punctuation token.
#[derive(Debug, Clone, Copy)]
pub struct PunctuationInfo {
    pub id: PunctuationId,
    pub canonical: &'static str,
    pub category: PunctuationCategory,
}

/// Registry of all punctuation tokens, in [`PunctuationId`] order.
pub const PUNCTUATION: &[PunctuationInfo] = &[
    info(PunctuationId::Comma, ",", PunctuationCategory::Separator),
    info(PunctuationId::Colon, ":", PunctuationCategory::Separator),
    info(PunctuationId::Semicolon, ";", PunctuationCategory::Separator),
    info(PunctuationId::Question, "?", PunctuationCategory::Marker),
    info(PunctuationId::At, "@", PunctuationCategory::Marker),
    info(PunctuationId::Pipe, "|", PunctuationCategory::Marker),
    info(PunctuationId::Dot, ".", PunctuationCategory::Access),
    info(PunctuationId::SafeDot, "?.", PunctuationCategory::Access),
    info(PunctuationId::ColonColon, "::", PunctuationCategory::Access),
    info(PunctuationId::Arrow, "->", PunctuationCategory::Arrow),
    info(PunctuationId::FatArrow, "=>", PunctuationCategory::Arrow),
    info(PunctuationId::LParen, "(", PunctuationCategory::Delimiter),
    info(PunctuationId::RParen, ")", PunctuationCategory::Delimiter),
    info(PunctuationId::LBracket, "[", PunctuationCategory::Delimiter),
    info(PunctuationId::RBracket, "]", PunctuationCategory::Delimiter),
    info(PunctuationId::LBrace, "{", PunctuationCategory::Delimiter),
    info(PunctuationId::RBrace, "}", PunctuationCategory::Delimiter),
];

pub fn as_str(id: PunctuationId) -> &'static str {
    info_for(id).canonical
}

pub fn category(id: PunctuationId) -> PunctuationCategory {
    info_for(id).category
}

pub fn info_for(id: PunctuationId) -> &'static PunctuationInfo {
    &PUNCTUATION[id as usize]
}

/// Resolve a punctuation spelling to its identifier.
pub fn from_str(s: &str) -> Option<PunctuationId> {
    PUNCTUATION.iter().find(|p| p.canonical == s).map(|p| p.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: PunctuationId, canonical: &'static str, category: PunctuationCategory) -> PunctuationInfo {
    PunctuationInfo { id, canonical, category }
}
