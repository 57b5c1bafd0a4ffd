//! Template dialect: the flat item list and its normalization into canonical statements.
//!
//! The template parser does not build nested nodes. It emits one [`TemplateItem`] per piece of markup (text, an
//! opening tag, a closing tag, a raw-expression tag, a script island) and leaves nesting to [`normalize`], which
//! pairs closing tags with their openers and lowers structural tags (`if`, `try`, `function`, ...) into the same
//! statements the script dialect produces.
//!
//! ## Module Structure
//!
//! - `normalize` - Working list, back-patching, finalization of each tag kind

pub mod normalize;

pub use normalize::{NormalizeHost, normalize};

use crate::ast::{Annotation, Expr, Ident, Spanned, Stmt, StringLit};

/// One piece of template markup, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateItem {
    /// Verbatim markup text.
    Text(Spanned<String>),
    /// Text inside an `output` body, with `#expr#` holes.
    Interpolated(Spanned<StringLit>),
    /// `<cfname attr=value ...>` or `<cfname ... />`.
    Open(Spanned<TagHead>),
    /// `</cfname>`
    Close(Spanned<Ident>),
    /// `set`, `if`, `elseif` and `return`, whose heads are raw expressions.
    Expression(Spanned<ExpressionTag>),
    /// Body of a `script` tag, already parsed as statements.
    ScriptIsland(Spanned<Vec<Spanned<Stmt>>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagHead {
    /// Tag name without its prefix, as written.
    pub name: Ident,
    pub attributes: Vec<Spanned<Annotation>>,
    pub self_closing: bool,
}

impl TagHead {
    /// Lower-cased name, the form the registry and the normalizer compare.
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionTag {
    Set(Spanned<Stmt>),
    If(Spanned<Expr>),
    ElseIf(Spanned<Expr>),
    Return(Option<Spanned<Expr>>),
}
