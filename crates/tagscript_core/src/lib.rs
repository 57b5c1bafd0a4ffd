//! Provide the canonical language vocabulary shared by the tagscript lexer, parser and tooling.
//!
//! This crate is intentionally small and dependency-free. It contains const registries that describe the
//! reserved words, operators, punctuation, scope names and type keywords of the script and template dialects,
//! plus the [`lang::components::TagRegistry`] capability the parser consults to tell tag invocations apart from
//! ordinary expressions.
//!
//! ## Notes
//!
//! - No IO, no global state, and no AST types.
//! - Spellings are matched case-insensitively: both dialects are case-insensitive for reserved vocabulary.

pub mod lang;

pub use lang::registry::Flavor;
