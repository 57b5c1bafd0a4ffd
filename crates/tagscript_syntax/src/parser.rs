//! Parser for the script, template, query and documentation dialects.
//!
//! Turns the reclassified token stream into the canonical AST. One [`Parser`] handles every entry point
//! ([`EntryPoint`]); dialect boundaries inside a text (script islands, re-parsed attribute conditions, doc comments)
//! are handled by fragment parsers that share the parent's source, registry and configuration.
//!
//! ## Examples
//!
//! ```rust
//! use tagscript_core::lang::components::BuiltinComponents;
//! use tagscript_syntax::config::ParserConfig;
//! use tagscript_syntax::parser;
//!
//! let result = parser::parse("x = 1;", &ParserConfig::default(), &BuiltinComponents).unwrap();
//! assert!(result.issues.is_empty());
//! assert_eq!(result.root.unwrap().statements().unwrap().len(), 1);
//! ```

use std::path::Path;

use crate::ast::*;
use crate::comments;
use crate::config::{Dialect, ParserConfig, ProgramKind};
use crate::detect;
use crate::diagnostics::expected::{self, Expected};
use crate::diagnostics::{Issue, IssueKind, messages, validate};
use crate::error::ParseError;
use crate::lexer::{Lexer, Mode, Token, TokenKind};
use crate::predicates;
use crate::source::{LineIndex, Offset, Point, Position, Source, SourceRef, Span};
use crate::template::{self, ExpressionTag, NormalizeHost, TagHead, TemplateItem};
use crate::transpile;
use tagscript_core::Flavor;
use tagscript_core::lang::components::TagRegistry;
use tagscript_core::lang::keywords::KeywordId;
use tagscript_core::lang::operators::{self, OperatorId};
use tagscript_core::lang::punctuation::PunctuationId;
use tagscript_core::lang::scopes;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/template.rs");
include!("parser/query.rs");
include!("parser/doc.rs");
include!("parser/fragment.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
