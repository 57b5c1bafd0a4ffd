//! Scope names.
//!
//! An identifier spelled like a scope (`variables`, `local`, `arguments`, ...) becomes a scope reference in the
//! canonical AST instead of a plain identifier. Matching is case-insensitive and the canonical spelling is the
//! lower-case one.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::scopes::{self, ScopeId};
//!
//! assert_eq!(scopes::from_str("VARIABLES"), Some(ScopeId::Variables));
//! assert_eq!(scopes::as_str(ScopeId::This), "this");
//! ```

/// Stable identifier for every scope name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeId {
    Application,
    Arguments,
    Cgi,
    Cookie,
    Form,
    Local,
    Request,
    Server,
    Session,
    Super,
    This,
    Thread,
    Url,
    Variables,
}

/// Canonical spellings, in [`ScopeId`] order.
pub const SCOPES: &[(ScopeId, &str)] = &[
    (ScopeId::Application, "application"),
    (ScopeId::Arguments, "arguments"),
    (ScopeId::Cgi, "cgi"),
    (ScopeId::Cookie, "cookie"),
    (ScopeId::Form, "form"),
    (ScopeId::Local, "local"),
    (ScopeId::Request, "request"),
    (ScopeId::Server, "server"),
    (ScopeId::Session, "session"),
    (ScopeId::Super, "super"),
    (ScopeId::This, "this"),
    (ScopeId::Thread, "thread"),
    (ScopeId::Url, "url"),
    (ScopeId::Variables, "variables"),
];

pub fn from_str(s: &str) -> Option<ScopeId> {
    SCOPES
        .iter()
        .find(|(_, spelling)| spelling.eq_ignore_ascii_case(s))
        .map(|(id, _)| *id)
}

pub fn as_str(id: ScopeId) -> &'static str {
    SCOPES[id as usize].1
}
