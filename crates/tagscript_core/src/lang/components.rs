//! Tag/component registry.
//!
//! The parser never decides on its own whether a name is a tag. It asks a [`TagRegistry`], which is handed to it
//! at construction time as a read-only capability. [`BuiltinComponents`] answers from the [`COMPONENTS`] table and
//! [`StaticRegistry`] wraps any caller-supplied descriptor list (grammar-only tests, embedders with extra tags).
//!
//! ## Notes
//! - All lookups are ASCII case-insensitive and never include the flavor prefix (`http`, not `cfhttp`).
//! - A name unknown to the registry does not require a body and allows one.
//!
//! ## Examples
//! ```rust
//! use tagscript_core::lang::components::{BuiltinComponents, TagRegistry};
//!
//! let registry = BuiltinComponents;
//! assert!(registry.has_tag("HTTP"));
//! assert!(registry.requires_body("savecontent"));
//! assert!(!registry.allows_body("dump"));
//! assert!(!registry.has_tag("myUdf"));
//! ```

/// Read-only queries the parser makes about tag/component names.
///
/// Implementations must be safe to share between parses running on different threads.
pub trait TagRegistry: Send + Sync {
    /// Whether `name` is a known tag/component.
    fn has_tag(&self, name: &str) -> bool;

    /// Whether an invocation of `name` must have a body.
    fn requires_body(&self, name: &str) -> bool;

    /// Whether an invocation of `name` may have a body.
    fn allows_body(&self, name: &str) -> bool;
}

/// Body arity of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRule {
    /// A body is mandatory (`savecontent`).
    Required,
    /// A body may be present (`http` with `httpparam` children).
    Allowed,
    /// Must be self-contained (`dump`).
    Forbidden,
}

/// Metadata for a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub name: &'static str,
    pub body: BodyRule,
}

impl ComponentDescriptor {
    pub const fn new(name: &'static str, body: BodyRule) -> Self {
        Self { name, body }
    }
}

/// Built-in components.
///
/// Structural tags that the template normalizer lowers itself (`if`, `set`, `function`, ...) are listed too so
/// `has_tag` answers consistently for both dialects.
pub const COMPONENTS: &[ComponentDescriptor] = &[
    // Structural, lowered by the template normalizer
    c("argument", BodyRule::Forbidden),
    c("break", BodyRule::Forbidden),
    c("case", BodyRule::Required),
    c("catch", BodyRule::Allowed),
    c("component", BodyRule::Allowed),
    c("continue", BodyRule::Forbidden),
    c("defaultcase", BodyRule::Required),
    c("else", BodyRule::Forbidden),
    c("elseif", BodyRule::Forbidden),
    c("finally", BodyRule::Allowed),
    c("function", BodyRule::Allowed),
    c("if", BodyRule::Required),
    c("import", BodyRule::Forbidden),
    c("include", BodyRule::Forbidden),
    c("interface", BodyRule::Allowed),
    c("output", BodyRule::Allowed),
    c("property", BodyRule::Forbidden),
    c("rethrow", BodyRule::Forbidden),
    c("return", BodyRule::Forbidden),
    c("script", BodyRule::Allowed),
    c("set", BodyRule::Forbidden),
    c("switch", BodyRule::Required),
    c("throw", BodyRule::Forbidden),
    c("try", BodyRule::Required),
    c("while", BodyRule::Required),
    // Generic components
    c("abort", BodyRule::Forbidden),
    c("content", BodyRule::Allowed),
    c("cookie", BodyRule::Forbidden),
    c("directory", BodyRule::Forbidden),
    c("document", BodyRule::Allowed),
    c("dump", BodyRule::Forbidden),
    c("execute", BodyRule::Allowed),
    c("exit", BodyRule::Forbidden),
    c("file", BodyRule::Forbidden),
    c("flush", BodyRule::Forbidden),
    c("header", BodyRule::Forbidden),
    c("http", BodyRule::Allowed),
    c("httpparam", BodyRule::Forbidden),
    c("invoke", BodyRule::Allowed),
    c("invokeargument", BodyRule::Forbidden),
    c("location", BodyRule::Forbidden),
    c("lock", BodyRule::Required),
    c("log", BodyRule::Forbidden),
    c("loop", BodyRule::Allowed),
    c("mail", BodyRule::Allowed),
    c("mailparam", BodyRule::Forbidden),
    c("module", BodyRule::Allowed),
    c("object", BodyRule::Forbidden),
    c("param", BodyRule::Forbidden),
    c("procparam", BodyRule::Forbidden),
    c("procresult", BodyRule::Forbidden),
    c("query", BodyRule::Required),
    c("queryparam", BodyRule::Forbidden),
    c("savecontent", BodyRule::Required),
    c("setting", BodyRule::Forbidden),
    c("silent", BodyRule::Required),
    c("sleep", BodyRule::Forbidden),
    c("storedproc", BodyRule::Allowed),
    c("thread", BodyRule::Allowed),
    c("timer", BodyRule::Required),
    c("trace", BodyRule::Forbidden),
    c("transaction", BodyRule::Allowed),
    c("xml", BodyRule::Required),
    c("zip", BodyRule::Allowed),
];

/// Find a descriptor in `table`, ignoring ASCII case.
pub fn find<'t>(table: &'t [ComponentDescriptor], name: &str) -> Option<&'t ComponentDescriptor> {
    table.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Registry backed by the built-in [`COMPONENTS`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinComponents;

impl TagRegistry for BuiltinComponents {
    fn has_tag(&self, name: &str) -> bool {
        find(COMPONENTS, name).is_some()
    }

    fn requires_body(&self, name: &str) -> bool {
        find(COMPONENTS, name).is_some_and(|d| d.body == BodyRule::Required)
    }

    fn allows_body(&self, name: &str) -> bool {
        find(COMPONENTS, name).is_none_or(|d| d.body != BodyRule::Forbidden)
    }
}

/// Registry over an owned descriptor list.
///
/// ## Examples
/// ```rust
/// use tagscript_core::lang::components::{BodyRule, ComponentDescriptor, StaticRegistry, TagRegistry};
///
/// let registry = StaticRegistry::new(vec![ComponentDescriptor::new("widget", BodyRule::Required)]);
/// assert!(registry.has_tag("Widget"));
/// assert!(!registry.has_tag("http"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    descriptors: Vec<ComponentDescriptor>,
}

impl StaticRegistry {
    pub fn new(descriptors: Vec<ComponentDescriptor>) -> Self {
        Self { descriptors }
    }

    /// The built-in table plus `extra` descriptors; later entries do not override earlier ones.
    pub fn with_builtins(extra: impl IntoIterator<Item = ComponentDescriptor>) -> Self {
        let mut descriptors = COMPONENTS.to_vec();
        descriptors.extend(extra);
        Self { descriptors }
    }
}

impl TagRegistry for StaticRegistry {
    fn has_tag(&self, name: &str) -> bool {
        find(&self.descriptors, name).is_some()
    }

    fn requires_body(&self, name: &str) -> bool {
        find(&self.descriptors, name).is_some_and(|d| d.body == BodyRule::Required)
    }

    fn allows_body(&self, name: &str) -> bool {
        find(&self.descriptors, name).is_none_or(|d| d.body != BodyRule::Forbidden)
    }
}

// --- helpers -----------------------------------------------------------------

const fn c(name: &'static str, body: BodyRule) -> ComponentDescriptor {
    ComponentDescriptor::new(name, body)
}
