//! Language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators,
//! punctuation, type keywords, scope names and the tag/component registry.
//!
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up spellings and metadata
//! through the registry tables instead of comparing strings all over the lexer and parser.
//!
//! ## Notes
//! - Registries are **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   reclassification, predicates).
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("IF"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

pub mod components;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod registry;
pub mod scopes;
pub mod types;
