#![forbid(unsafe_code)]
//! tagscript: a front end for tag-based markup and its script, query and doc-comment dialects.
//!
//! The parsing work lives in the `tagscript_syntax` crate; this crate re-exports it and adds the command-line
//! tool (`check`, `parse`, `lex`, `detect`).
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Malformed input**: Never an error. Problems in the text are reported as issues inside the parse result.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;

pub use tagscript_core::Flavor;
pub use tagscript_core::lang::components::{BuiltinComponents, TagRegistry};
pub use tagscript_syntax::diagnostics::report::{IssueReport, reports};
pub use tagscript_syntax::{
    Dialect, EntryPoint, Issue, IssueKind, ParseError, ParserConfig, ParsingResult, ProgramKind, SourceType, ast,
    detect, lexer, parser,
};
