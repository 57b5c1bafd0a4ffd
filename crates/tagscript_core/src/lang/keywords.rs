//! Define the reserved keyword vocabulary of the script dialect.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, categories, flavor availability and whether the
//! word may also be used as a plain identifier.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-insensitive** (`IF`, `If` and `if` are the same keyword).
//! - Word operators (`and`, `eq`, `contains`, ...) are not keywords; they live in [`crate::lang::operators`].
//! - [`KEYWORDS`] is ordered exactly like [`KeywordId`] so [`info_for`] is a direct index.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::keywords::{self, KeywordId};
//! use tagscript_core::Flavor;
//!
//! assert_eq!(keywords::from_str("Function"), Some(KeywordId::Function));
//! assert!(keywords::is_identifier_compatible(KeywordId::Default));
//! assert_eq!(keywords::lookup("elseif", Flavor::Box), None);
//! ```

use super::registry::{Availability, Example, Flavor, Stability};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordId {
    // Control flow / statements
    If,
    Else,
    ElseIf,
    While,
    Do,
    For,
    In,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Try,
    Catch,
    Finally,
    Throw,
    Rethrow,
    Include,
    Import,
    Param,

    // Declarations / modifiers
    Function,
    Class,
    Component,
    Interface,
    Property,
    Var,
    Final,
    Static,
    Abstract,
    Public,
    Private,
    Package,
    Remote,
    Required,
    As,
    New,

    // Literals
    True,
    False,
    Null,
}

/// High-level grouping for documentation and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Declaration,
    Modifier,
    Import,
    Literal,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `identifier_compatible` marks words that the grammar also accepts where an identifier is expected
///   (`default = 1`, `foo.property`). Diagnostics drop these from "expected" sets when an identifier is expected.
/// - `availability` restricts a spelling to one flavor (e.g. `elseif` only exists in the `Cf` script flavor).
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub identifier_compatible: bool,
    pub availability: Availability,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Registry of all keywords, in [`KeywordId`] order.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow / statements
    info(KeywordId::If, "if", KeywordCategory::ControlFlow, false),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow, false),
    KeywordInfo {
        availability: Availability::CfOnly,
        examples: &[Example {
            code: "if (a) { } elseif (b) { }",
            note: Some("Split into `else` `if` by the reclassifier."),
        }],
        ..info(KeywordId::ElseIf, "elseif", KeywordCategory::ControlFlow, false)
    },
    info(KeywordId::While, "while", KeywordCategory::ControlFlow, false),
    info(KeywordId::Do, "do", KeywordCategory::ControlFlow, false),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow, false),
    info(KeywordId::In, "in", KeywordCategory::ControlFlow, true),
    info(KeywordId::Switch, "switch", KeywordCategory::ControlFlow, false),
    info(KeywordId::Case, "case", KeywordCategory::ControlFlow, false),
    info(KeywordId::Default, "default", KeywordCategory::ControlFlow, true),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow, false),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow, false),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow, false),
    info(KeywordId::Try, "try", KeywordCategory::ControlFlow, false),
    info(KeywordId::Catch, "catch", KeywordCategory::ControlFlow, false),
    info(KeywordId::Finally, "finally", KeywordCategory::ControlFlow, false),
    info(KeywordId::Throw, "throw", KeywordCategory::ControlFlow, true),
    info(KeywordId::Rethrow, "rethrow", KeywordCategory::ControlFlow, true),
    info(KeywordId::Include, "include", KeywordCategory::Import, true),
    info(KeywordId::Import, "import", KeywordCategory::Import, true),
    info(KeywordId::Param, "param", KeywordCategory::Declaration, true),
    // Declarations / modifiers
    info(KeywordId::Function, "function", KeywordCategory::Declaration, false),
    info(KeywordId::Class, "class", KeywordCategory::Declaration, true),
    info(KeywordId::Component, "component", KeywordCategory::Declaration, true),
    info(KeywordId::Interface, "interface", KeywordCategory::Declaration, true),
    info(KeywordId::Property, "property", KeywordCategory::Declaration, true),
    info(KeywordId::Var, "var", KeywordCategory::Modifier, true),
    info(KeywordId::Final, "final", KeywordCategory::Modifier, true),
    info(KeywordId::Static, "static", KeywordCategory::Modifier, true),
    info(KeywordId::Abstract, "abstract", KeywordCategory::Modifier, true),
    info(KeywordId::Public, "public", KeywordCategory::Modifier, true),
    info(KeywordId::Private, "private", KeywordCategory::Modifier, true),
    info(KeywordId::Package, "package", KeywordCategory::Modifier, true),
    info(KeywordId::Remote, "remote", KeywordCategory::Modifier, true),
    info(KeywordId::Required, "required", KeywordCategory::Modifier, true),
    info(KeywordId::As, "as", KeywordCategory::Import, true),
    info(KeywordId::New, "new", KeywordCategory::Declaration, false),
    // Literals
    info(KeywordId::True, "true", KeywordCategory::Literal, false),
    info(KeywordId::False, "false", KeywordCategory::Literal, false),
    info(KeywordId::Null, "null", KeywordCategory::Literal, false),
];

/// Canonical (lower-case) spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Whether the keyword may stand where an identifier is expected.
pub fn is_identifier_compatible(id: KeywordId) -> bool {
    info_for(id).identifier_compatible
}

/// Full metadata.
///
/// ## Notes
/// - [`KEYWORDS`] is kept in declaration order, which `lang_registry_guardrails` verifies.
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    &KEYWORDS[id as usize]
}

/// Lookup by spelling, regardless of flavor.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling matches this registry (ASCII case-insensitive).
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical.eq_ignore_ascii_case(s)).map(|k| k.id)
}

/// Lookup by spelling, restricted to the keywords `flavor` actually reserves.
pub fn lookup(s: &str, flavor: Flavor) -> Option<KeywordId> {
    from_str(s).filter(|id| info_for(*id).availability.allows(flavor))
}

/// Iterate over every keyword id that is also accepted as an identifier.
pub fn identifier_compatible() -> impl Iterator<Item = KeywordId> {
    KEYWORDS.iter().filter(|k| k.identifier_compatible).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    identifier_compatible: bool,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        identifier_compatible,
        availability: Availability::Both,
        stability: Stability::Stable,
        examples: &[],
    }
}
