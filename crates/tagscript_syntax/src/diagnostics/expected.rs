//! Grammar-error messages built from expected-token sets and rule context.
//!
//! When the parser cannot continue it knows two things: which alternatives it tried at the failing token (the
//! expected set) and which grammar rules were active (the rule stack). This module turns both into one readable
//! message:
//!
//! ```text
//! while parsing a function body in a box class: expected [;, }] but found [foo]
//! ```
//!
//! ## Notes
//! - Consecutive repeats in the rule stack are collapsed; root rules only name the chain when nothing else does.
//! - When `identifier` is expected, keywords that are merely identifier-compatible are dropped from the set.
//! - The set is de-duplicated, sorted case-insensitively and capped at [`MAX_EXPECTED`] entries plus `...`.

use tagscript_core::lang::keywords::{self, KeywordId};
use tagscript_core::lang::operators::{self, OperatorId};
use tagscript_core::lang::punctuation::{self, PunctuationId};

/// Maximum number of alternatives listed in one message.
pub const MAX_EXPECTED: usize = 12;

/// Rule names that describe a whole parse rather than a construct inside it.
pub const ROOT_RULES: &[&str] = &["box script", "box class", "interface definition", "box template", "query"];

/// One alternative the parser would have accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    Keyword(KeywordId),
    Operator(OperatorId),
    Punct(PunctuationId),
    Identifier,
    Number,
    String,
    Expression,
    Statement,
    ComponentName,
    /// `>` or `/>` ending a tag.
    TagClose,
    Eof,
    /// A query word (`FROM`, `BY`, ...).
    Word(&'static str),
}

impl Expected {
    pub fn label(self) -> String {
        match self {
            Expected::Keyword(id) => keywords::as_str(id).to_string(),
            Expected::Operator(id) => operators::as_str(id).to_string(),
            Expected::Punct(id) => punctuation::as_str(id).to_string(),
            Expected::Identifier => "identifier".to_string(),
            Expected::Number => "number".to_string(),
            Expected::String => "string".to_string(),
            Expected::Expression => "expression".to_string(),
            Expected::Statement => "statement".to_string(),
            Expected::ComponentName => "component name".to_string(),
            Expected::TagClose => ">".to_string(),
            Expected::Eof => "end of file".to_string(),
            Expected::Word(word) => word.to_string(),
        }
    }
}

/// Render an expected set as `[a, b, c]`.
pub fn render_set(set: &[Expected]) -> String {
    let wants_identifier = set.contains(&Expected::Identifier);
    let mut labels: Vec<String> = set
        .iter()
        .filter(|e| match e {
            Expected::Keyword(id) => !(wants_identifier && keywords::is_identifier_compatible(*id)),
            _ => true,
        })
        .map(|e| e.label())
        .collect();
    labels.sort_by_key(|l| l.to_lowercase());
    labels.dedup();
    if labels.len() > MAX_EXPECTED {
        labels.truncate(MAX_EXPECTED);
        labels.push("...".to_string());
    }
    format!("[{}]", labels.join(", "))
}

/// `while parsing a X in a Y ...`, innermost rule first. Empty when no rule is active.
pub fn context_chain(rules: &[&str]) -> String {
    let mut chain: Vec<&str> = Vec::new();
    for rule in rules.iter().rev() {
        if ROOT_RULES.contains(rule) && !chain.is_empty() {
            continue;
        }
        if chain.last() == Some(rule) {
            continue;
        }
        chain.push(rule);
    }
    if chain.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = chain.iter().map(|r| format!("{} {r}", article(r))).collect();
    format!("while parsing {}", parts.join(" in "))
}

/// The complete grammar-error message.
pub fn grammar_error(rules: &[&str], set: &[Expected], found: &str) -> String {
    let chain = context_chain(rules);
    let set = render_set(set);
    if chain.is_empty() {
        format!("Expected {set} but found [{found}]")
    } else {
        format!("{chain}: expected {set} but found [{found}]")
    }
}

fn article(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
