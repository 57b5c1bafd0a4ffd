//! Type keywords.
//!
//! Type names are ordinary identifiers to the lexer. The parser only needs to recognise them in two places: typed
//! parameter/return declarations and the tag-invocation predicate, where `query result = ...` must not be read as a
//! `query` tag with a `result` attribute.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::types;
//!
//! assert!(types::is_type_keyword("Query"));
//! assert!(!types::is_type_keyword("http"));
//! ```

/// Stable identifier for the built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKeywordId {
    Numeric,
    String,
    Boolean,
    Class,
    Interface,
    Array,
    Struct,
    Query,
    Any,
    Function,
}

/// Canonical spellings, in [`TypeKeywordId`] order.
pub const TYPE_KEYWORDS: &[(TypeKeywordId, &str)] = &[
    (TypeKeywordId::Numeric, "numeric"),
    (TypeKeywordId::String, "string"),
    (TypeKeywordId::Boolean, "boolean"),
    (TypeKeywordId::Class, "class"),
    (TypeKeywordId::Interface, "interface"),
    (TypeKeywordId::Array, "array"),
    (TypeKeywordId::Struct, "struct"),
    (TypeKeywordId::Query, "query"),
    (TypeKeywordId::Any, "any"),
    (TypeKeywordId::Function, "function"),
];

/// Resolve a type keyword, case-insensitively.
pub fn from_str(s: &str) -> Option<TypeKeywordId> {
    TYPE_KEYWORDS
        .iter()
        .find(|(_, spelling)| spelling.eq_ignore_ascii_case(s))
        .map(|(id, _)| *id)
}

pub fn as_str(id: TypeKeywordId) -> &'static str {
    TYPE_KEYWORDS[id as usize].1
}

pub fn is_type_keyword(s: &str) -> bool {
    from_str(s).is_some()
}
