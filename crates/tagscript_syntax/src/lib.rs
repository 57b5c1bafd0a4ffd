//! Syntax front end for tagscript: mode lexer, reclassifier, parsers, normalizer and the canonical AST.
//!
//! One text may mix four dialects (script, template markup, `SELECT` queries and documentation comments) in two
//! flavors. Every dialect is lowered into the same canonical AST, and every problem is reported as an
//! [`diagnostics::Issue`] with a document position instead of an error.
//!
//! ## Notes
//! - This crate is "syntax-only": no name resolution, no evaluation.
//! - Vocabulary identity (keywords/operators/punctuation/scopes/components) comes from `tagscript_core::lang`.
//! - The tag registry is a read-only capability passed to every parse; nothing here holds global state, so
//!   independent parses can run on separate threads.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::Flavor;
//! use tagscript_core::lang::components::BuiltinComponents;
//! use tagscript_syntax::config::{Dialect, ParserConfig, SourceType};
//! use tagscript_syntax::parser;
//!
//! let config = ParserConfig::new(SourceType::new(Dialect::Template, Flavor::Cf));
//! let result = parser::parse("<cfif x gt 1>big<cfelse>small</cfif>", &config, &BuiltinComponents).unwrap();
//! assert!(result.is_correct());
//! ```
//!
//! ## See also
//! - `tagscript_core::lang` for the registry-backed language vocabulary.

pub mod ast;
pub mod comments;
pub mod config;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod predicates;
pub mod reclassify;
pub mod source;
pub mod template;
pub mod token_helpers;
pub mod transpile;

pub use config::{Dialect, ParserConfig, ProgramKind, SourceType};
pub use diagnostics::{Issue, IssueKind};
pub use error::ParseError;
pub use parser::{EntryPoint, ParsingResult};
