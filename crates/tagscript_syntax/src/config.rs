//! Parser configuration.
//!
//! A parse is described by what the text is ([`SourceType`]: dialect and flavor), what shape is expected
//! ([`ProgramKind`]), where it starts in its document, and a few knobs for the outermost parse.
//!
//! ## Examples
//! ```rust
//! use tagscript_syntax::config::{Dialect, ParserConfig, ProgramKind, SourceType};
//! use tagscript_core::Flavor;
//!
//! let config = ParserConfig::new(SourceType::new(Dialect::Template, Flavor::Cf))
//!     .with_kind(ProgramKind::Document)
//!     .with_max_depth(32);
//! assert_eq!(config.max_depth, 32);
//! assert!(config.transpile.merge_docs_into_annotations);
//! ```

use std::fmt;

use crate::source::Offset;
use tagscript_core::Flavor;

/// Default limit on nested statements, expressions and sub-parses.
///
/// One level costs several parser frames, so the default keeps a parse within a 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Concrete syntax of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Script,
    Template,
    Query,
    Doc,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Script => "script",
            Dialect::Template => "template",
            Dialect::Query => "query",
            Dialect::Doc => "doc",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialect plus flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceType {
    pub dialect: Dialect,
    pub flavor: Flavor,
}

impl SourceType {
    pub const fn new(dialect: Dialect, flavor: Flavor) -> Self {
        Self { dialect, flavor }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.flavor.name(), self.dialect)
    }
}

/// Expected shape of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgramKind {
    /// A sequence of statements (or a template).
    #[default]
    Document,
    /// A class or interface.
    Declaration,
    Expression,
    Statement,
}

impl ProgramKind {
    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::Document => "document",
            ProgramKind::Declaration => "declaration",
            ProgramKind::Expression => "expression",
            ProgramKind::Statement => "statement",
        }
    }
}

/// Options for the whole-tree rewrite that runs after the outermost parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranspileConfig {
    /// Copy documentation entries into annotations (skipping `hint` and names already annotated).
    pub merge_docs_into_annotations: bool,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            merge_docs_into_annotations: true,
        }
    }
}

/// Everything a parse needs besides the text and the tag registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub source_type: SourceType,
    pub program_kind: ProgramKind,
    /// Where the text starts in its document.
    pub offset: Offset,
    pub max_depth: usize,
    pub transpile: TranspileConfig,
    /// Attach comments to the statements that follow them.
    pub associate_comments: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(SourceType::default())
    }
}

impl ParserConfig {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            program_kind: ProgramKind::Document,
            offset: Offset::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            transpile: TranspileConfig::default(),
            associate_comments: true,
        }
    }

    pub fn with_kind(mut self, kind: ProgramKind) -> Self {
        self.program_kind = kind;
        self
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_transpile(mut self, transpile: TranspileConfig) -> Self {
        self.transpile = transpile;
        self
    }

    pub fn with_comment_association(mut self, associate: bool) -> Self {
        self.associate_comments = associate;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.source_type.flavor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.source_type, SourceType::new(Dialect::Script, Flavor::Box));
        assert_eq!(config.program_kind, ProgramKind::Document);
        assert_eq!(config.offset, Offset::new(1, 0));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.associate_comments);
    }

    #[test]
    fn builder_overrides() {
        let config = ParserConfig::new(SourceType::new(Dialect::Query, Flavor::Cf))
            .with_kind(ProgramKind::Expression)
            .with_offset(Offset::new(10, 4))
            .with_transpile(TranspileConfig {
                merge_docs_into_annotations: false,
            })
            .with_comment_association(false);
        assert_eq!(config.flavor(), Flavor::Cf);
        assert_eq!(config.offset, Offset::new(10, 4));
        assert!(!config.transpile.merge_docs_into_annotations);
        assert!(!config.associate_comments);
        assert_eq!(config.source_type.to_string(), "cf query");
    }
}
