//! Operator vocabulary.
//!
//! This module defines the canonical operator set: symbol operators like `&&` and word operators like `and`, `eq`
//! or `contains`, along with precedence, associativity and fixity.
//!
//! ## Notes
//! - Symbol spellings are matched exactly; word spellings are matched **case-insensitively**.
//! - Word operators are never keywords. The reclassifier turns them into identifiers in call and member positions
//!   (`and()`, `foo.and`), which is why [`OperatorInfo::is_word`] is tracked here.
//! - Several word spellings share one id (`eq`, `equal` and `is` are all [`OperatorId::Equal`]).
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("<>"), Some(OperatorId::NotEq));
//! assert_eq!(operators::from_word("GTE"), Some(OperatorId::GreaterThanOrEqual));
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::registry::{Availability, Flavor, Stability};

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Define whether an operator is infix (binary), prefix or postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Postfix,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Backslash,
    Percent,
    Caret,
    Amp,
    PlusPlus,
    MinusMinus,

    // Comparison
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    AmpAmp,
    PipePipe,
    Bang,
    Elvis,

    // Assignment
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,

    // Word operators
    And,
    Or,
    Not,
    Xor,
    Eqv,
    Imp,
    Mod,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Less,
    Greater,
    Than,
    Contains,
    Does,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `precedence` is a relative ordering where higher binds tighter. Partial words (`less`, `than`, `does`) only
///   form an operator together with their neighbours and carry the precedence of the comparison they build.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub is_word: bool,
    pub availability: Availability,
    pub stability: Stability,
}

/// Registry of all operators, in [`OperatorId`] order.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, &["+"], 60, Associativity::Left, Fixity::Infix),
    op(OperatorId::Minus, &["-"], 60, Associativity::Left, Fixity::Infix),
    op(OperatorId::Star, &["*"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::Slash, &["/"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::Backslash, &["\\"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::Percent, &["%"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::Caret, &["^"], 80, Associativity::Right, Fixity::Infix),
    op(OperatorId::Amp, &["&"], 50, Associativity::Left, Fixity::Infix),
    op(OperatorId::PlusPlus, &["++"], 90, Associativity::None, Fixity::Postfix),
    op(OperatorId::MinusMinus, &["--"], 90, Associativity::None, Fixity::Postfix),
    // Comparison
    op(OperatorId::EqEq, &["=="], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::EqEqEq, &["==="], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::NotEq, &["!=", "<>"], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::NotEqEq, &["!=="], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::Lt, &["<"], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::LtEq, &["<="], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::Gt, &[">"], 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::GtEq, &[">="], 40, Associativity::Left, Fixity::Infix),
    // Logical
    op(OperatorId::AmpAmp, &["&&"], 30, Associativity::Left, Fixity::Infix),
    op(OperatorId::PipePipe, &["||"], 20, Associativity::Left, Fixity::Infix),
    op(OperatorId::Bang, &["!"], 35, Associativity::None, Fixity::Prefix),
    op(OperatorId::Elvis, &["?:"], 10, Associativity::Right, Fixity::Infix),
    // Assignment
    op(OperatorId::Assign, &["="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::PlusEq, &["+="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::MinusEq, &["-="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::StarEq, &["*="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::SlashEq, &["/="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::PercentEq, &["%="], 5, Associativity::Right, Fixity::Infix),
    op(OperatorId::AmpEq, &["&="], 5, Associativity::Right, Fixity::Infix),
    // Word operators
    word(OperatorId::And, &["and"], 30, Fixity::Infix),
    word(OperatorId::Or, &["or"], 20, Fixity::Infix),
    word(OperatorId::Not, &["not"], 35, Fixity::Prefix),
    word(OperatorId::Xor, &["xor"], 18, Fixity::Infix),
    word(OperatorId::Eqv, &["eqv"], 16, Fixity::Infix),
    word(OperatorId::Imp, &["imp"], 16, Fixity::Infix),
    word(OperatorId::Mod, &["mod"], 70, Fixity::Infix),
    word(OperatorId::Equal, &["eq", "equal", "is"], 40, Fixity::Infix),
    word(OperatorId::NotEqual, &["neq"], 40, Fixity::Infix),
    word(OperatorId::GreaterThan, &["gt"], 40, Fixity::Infix),
    word(OperatorId::GreaterThanOrEqual, &["gte", "ge"], 40, Fixity::Infix),
    word(OperatorId::LessThan, &["lt"], 40, Fixity::Infix),
    word(OperatorId::LessThanOrEqual, &["lte", "le"], 40, Fixity::Infix),
    word(OperatorId::Less, &["less"], 40, Fixity::Infix),
    word(OperatorId::Greater, &["greater"], 40, Fixity::Infix),
    word(OperatorId::Than, &["than"], 40, Fixity::Infix),
    word(OperatorId::Contains, &["contains"], 40, Fixity::Infix),
    word(OperatorId::Does, &["does"], 40, Fixity::Infix),
];

/// Return the full metadata entry for an operator.
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    &OPERATORS[id as usize]
}

/// The first (canonical) spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Whether the operator is spelled as a word (`and`, `eq`, ...).
pub fn is_word(id: OperatorId) -> bool {
    info_for(id).is_word
}

/// Resolve a symbol spelling (or a word spelling, case-insensitively) to its identifier.
///
/// ## Returns
/// - `Some(OperatorId)` if the spelling exists in [`OPERATORS`].
/// - `None` otherwise.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| {
            o.spellings.iter().any(|s| {
                if o.is_word {
                    s.eq_ignore_ascii_case(spelling)
                } else {
                    *s == spelling
                }
            })
        })
        .map(|o| o.id)
}

/// Resolve a word spelling only; symbol operators never match.
pub fn from_word(spelling: &str) -> Option<OperatorId> {
    from_str(spelling).filter(|id| is_word(*id))
}

/// Resolve a word spelling that `flavor` treats as an operator.
pub fn lookup_word(spelling: &str, flavor: Flavor) -> Option<OperatorId> {
    from_word(spelling).filter(|id| info_for(*id).availability.allows(flavor))
}

/// Symbol spellings sorted longest first, for maximal-munch scanning.
pub fn symbol_spellings_longest_first() -> Vec<(&'static str, OperatorId)> {
    let mut out: Vec<(&'static str, OperatorId)> = OPERATORS
        .iter()
        .filter(|o| !o.is_word)
        .flat_map(|o| o.spellings.iter().map(move |s| (*s, o.id)))
        .collect();
    out.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    out
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        associativity,
        fixity,
        is_word: false,
        availability: Availability::Both,
        stability: Stability::Stable,
    }
}

const fn word(id: OperatorId, spellings: &'static [&'static str], precedence: u8, fixity: Fixity) -> OperatorInfo {
    OperatorInfo {
        is_word: true,
        ..op(id, spellings, precedence, Associativity::Left, fixity)
    }
}
