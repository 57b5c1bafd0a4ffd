//! Canonical abstract syntax tree.
//!
//! Every dialect lowers into this one vocabulary: template tags, script statements and query text all end up as the
//! same [`Stmt`] and [`Expr`] families. Each node is wrapped in [`Spanned`], which records its [`Position`] in the
//! original document and the verbatim source text it was built from.
//!
//! ## Notes
//! - Nodes are immutable once built. The template normalizer works on its own intermediate form and only produces
//!   finished nodes here.
//! - `Spanned::span` is a byte range in the text the node was parsed from. For nodes coming out of a sub-parse that
//!   is the fragment, not the document; use `pos` for document coordinates.

use crate::source::{Position, Span};
use tagscript_core::lang::scopes::ScopeId;

/// A node with its location, source text and attached comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub pos: Position,
    pub text: String,
    /// Comments associated with this node after a full parse (statements only).
    pub comments: Vec<Comment>,
    pub(crate) span: Span,
}

impl<T> Spanned<T> {
    pub(crate) fn new(node: T, pos: Position, text: impl Into<String>, span: Span) -> Self {
        Self {
            node,
            pos,
            text: text.into(),
            comments: Vec::new(),
            span,
        }
    }

    /// Wrap a new node in the location of an existing one.
    pub(crate) fn with_node<U>(&self, node: U) -> Spanned<U> {
        Spanned {
            node,
            pos: self.pos.clone(),
            text: self.text.clone(),
            comments: Vec::new(),
            span: self.span,
        }
    }

    /// Replace the node, keeping location, text and comments.
    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            pos: self.pos,
            text: self.text,
            comments: self.comments,
            span: self.span,
        }
    }
}

/// Identifier spelling, as written.
pub type Ident = String;

// ============================================================================
// Root
// ============================================================================

/// Root of a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// A document: script statements or a lowered template.
    Script(Spanned<Script>),
    Class(Spanned<ClassDecl>),
    Interface(Spanned<InterfaceDecl>),
    Expression(Spanned<Expr>),
    Statement(Spanned<Stmt>),
    Query(Spanned<Select>),
    Doc(Spanned<Documentation>),
}

impl AstNode {
    pub fn pos(&self) -> &Position {
        match self {
            AstNode::Script(n) => &n.pos,
            AstNode::Class(n) => &n.pos,
            AstNode::Interface(n) => &n.pos,
            AstNode::Expression(n) => &n.pos,
            AstNode::Statement(n) => &n.pos,
            AstNode::Query(n) => &n.pos,
            AstNode::Doc(n) => &n.pos,
        }
    }

    /// Top-level statements, if this root has any.
    pub fn statements(&self) -> Option<&[Spanned<Stmt>]> {
        match self {
            AstNode::Script(s) => Some(&s.node.statements),
            AstNode::Class(c) => Some(&c.node.body),
            AstNode::Interface(i) => Some(&i.node.body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub statements: Vec<Spanned<Stmt>>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Private,
    Package,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Var,
    Final,
    Static,
    Abstract,
}

/// `name` or `name=value` attached to a declaration or component.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: Ident,
    pub value: Option<Spanned<Expr>>,
}

/// Parsed `/** ... */` content: the description (as `hint`) and `@name value` entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Documentation {
    pub annotations: Vec<Spanned<Annotation>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub imports: Vec<Spanned<Stmt>>,
    pub annotations: Vec<Spanned<Annotation>>,
    pub documentation: Vec<Spanned<Annotation>>,
    pub modifiers: Vec<Modifier>,
    pub properties: Vec<Spanned<PropertyDecl>>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub imports: Vec<Spanned<Stmt>>,
    pub annotations: Vec<Spanned<Annotation>>,
    pub documentation: Vec<Spanned<Annotation>>,
    pub body: Vec<Spanned<Stmt>>,
}

/// `property [type] name [attr=value ...];` with every part stored as an annotation (`name`, `type`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub annotations: Vec<Spanned<Annotation>>,
    pub documentation: Vec<Spanned<Annotation>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub access: Option<Access>,
    pub modifiers: Vec<Modifier>,
    pub return_type: Option<Ident>,
    /// Empty for closures.
    pub name: Ident,
    pub args: Vec<Spanned<ArgumentDecl>>,
    pub annotations: Vec<Spanned<Annotation>>,
    pub documentation: Vec<Spanned<Annotation>>,
    /// `None` for abstract and interface functions.
    pub body: Option<Vec<Spanned<Stmt>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDecl {
    pub required: bool,
    pub ty: Option<Ident>,
    pub name: Ident,
    pub default: Option<Spanned<Expr>>,
    pub annotations: Vec<Spanned<Annotation>>,
    /// `@name` entries of the owning function's doc comment.
    pub documentation: Vec<Spanned<Annotation>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Spanned<Expr>),
    /// `var x = 1`, `final static y = 2`
    Var(VarDecl),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(WhileStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    Switch(SwitchStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Rethrow,
    Return(Option<Spanned<Expr>>),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Include(Spanned<Expr>),
    Import(ImportStmt),
    Param(ParamStmt),
    Block(Vec<Spanned<Stmt>>),
    Function(FunctionDecl),
    /// Generic tag/component invocation.
    Component(ComponentStmt),
    Output(OutputStmt),
    /// Template text or interpolated text written to the output buffer.
    BufferOutput(Spanned<Expr>),
    /// Script dialect embedded in a template.
    ScriptIsland(Vec<Spanned<Stmt>>),
    /// Template dialect embedded in script.
    TemplateIsland(Vec<Spanned<Stmt>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub modifiers: Vec<Modifier>,
    /// `Query` in `Query results = ...`.
    pub declared_type: Option<Ident>,
    pub target: Spanned<Expr>,
    pub value: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Spanned<Expr>,
    pub then: Vec<Spanned<Stmt>>,
    /// `else if` is an `else` holding a single `If`.
    pub otherwise: Option<Vec<Spanned<Stmt>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub label: Option<Ident>,
    pub cond: Spanned<Expr>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub label: Option<Ident>,
    pub init: Option<Spanned<Expr>>,
    pub cond: Option<Spanned<Expr>>,
    pub step: Option<Spanned<Expr>>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub label: Option<Ident>,
    /// `for (var x in ...)`
    pub declared: bool,
    pub var: Spanned<Expr>,
    pub collection: Spanned<Expr>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub subject: Spanned<Expr>,
    pub cases: Vec<Spanned<SwitchCase>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`.
    pub value: Option<Spanned<Expr>>,
    /// Template `<cfcase delimiter=",">`.
    pub delimiter: Option<Spanned<Expr>>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Vec<Spanned<Stmt>>,
    pub catches: Vec<Spanned<CatchClause>>,
    pub finally: Option<Vec<Spanned<Stmt>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub types: Vec<Spanned<Expr>>,
    pub var: Ident,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThrowStmt {
    pub object: Option<Spanned<Expr>>,
    pub kind: Option<Spanned<Expr>>,
    pub message: Option<Spanned<Expr>>,
    pub detail: Option<Spanned<Expr>>,
    pub error_code: Option<Spanned<Expr>>,
    pub extended_info: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    /// Dotted name, optionally with a `prefix:`.
    pub name: String,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamStmt {
    pub ty: Option<Ident>,
    pub name: Spanned<Expr>,
    pub default: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStmt {
    pub name: Ident,
    pub attributes: Vec<Spanned<Annotation>>,
    pub body: Option<Vec<Spanned<Stmt>>>,
}

impl ComponentStmt {
    /// Attribute value by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&Spanned<Expr>> {
        self.attributes
            .iter()
            .find(|a| a.node.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.node.value.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputStmt {
    pub attributes: Vec<Spanned<Annotation>>,
    pub body: Vec<Spanned<Stmt>>,
}

impl Stmt {
    /// Every statement list directly owned by this statement, in source order.
    pub fn bodies_mut(&mut self) -> Vec<&mut Vec<Spanned<Stmt>>> {
        match self {
            Stmt::If(s) => {
                let mut out = vec![&mut s.then];
                out.extend(s.otherwise.as_mut());
                out
            }
            Stmt::While(s) | Stmt::DoWhile(s) => vec![&mut s.body],
            Stmt::For(s) => vec![&mut s.body],
            Stmt::ForIn(s) => vec![&mut s.body],
            Stmt::Switch(s) => s.cases.iter_mut().map(|c| &mut c.node.body).collect(),
            Stmt::Try(s) => {
                let mut out = vec![&mut s.body];
                out.extend(s.catches.iter_mut().map(|c| &mut c.node.body));
                out.extend(s.finally.as_mut());
                out
            }
            Stmt::Block(body) | Stmt::ScriptIsland(body) | Stmt::TemplateIsland(body) => vec![body],
            Stmt::Function(f) => f.body.as_mut().into_iter().collect(),
            Stmt::Component(c) => c.body.as_mut().into_iter().collect(),
            Stmt::Output(o) => vec![&mut o.body],
            Stmt::Expr(_)
            | Stmt::Var(_)
            | Stmt::Throw(_)
            | Stmt::Rethrow
            | Stmt::Return(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Include(_)
            | Stmt::Import(_)
            | Stmt::Param(_)
            | Stmt::BufferOutput(_) => Vec::new(),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(String),
    Float(String),
    Str(StringLit),
    Ident(Ident),
    Scope(ScopeId),
    Unary(UnaryOp, Box<Spanned<Expr>>),
    Postfix(Box<Spanned<Expr>>, PostfixOp),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    Ternary {
        cond: Box<Spanned<Expr>>,
        then: Box<Spanned<Expr>>,
        otherwise: Box<Spanned<Expr>>,
    },
    Elvis(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    Assign {
        target: Box<Spanned<Expr>>,
        op: AssignOp,
        value: Box<Spanned<Expr>>,
    },
    /// `a.b` or `a?.b`
    Dot {
        object: Box<Spanned<Expr>>,
        name: Ident,
        safe: bool,
    },
    /// `a::b`
    StaticAccess {
        object: Box<Spanned<Expr>>,
        name: Ident,
    },
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Argument>,
    },
    New {
        class: Box<Spanned<Expr>>,
        args: Vec<Argument>,
    },
    Array(Vec<Spanned<Expr>>),
    Struct {
        /// `[ k: v ]` instead of `{ k: v }`.
        ordered: bool,
        entries: Vec<StructEntry>,
    },
    Closure(Box<FunctionDecl>),
    Lambda {
        params: Vec<Spanned<ArgumentDecl>>,
        body: LambdaBody,
        arrow: Arrow,
    },

    // ========== Query-only ==========
    /// `?` (`None`) or `:name`.
    Placeholder(Option<Ident>),
    /// `*` in a select list.
    Star,
    Between {
        expr: Box<Spanned<Expr>>,
        low: Box<Spanned<Expr>>,
        high: Box<Spanned<Expr>>,
        negated: bool,
    },
    InList {
        expr: Box<Spanned<Expr>>,
        items: Vec<Spanned<Expr>>,
        negated: bool,
    },
    IsNull {
        expr: Box<Spanned<Expr>>,
        negated: bool,
    },
}

impl Expr {
    /// Literal kinds that never have members.
    pub fn is_scalar_literal(&self) -> bool {
        matches!(self, Expr::Null | Expr::Bool(_) | Expr::Int(_) | Expr::Float(_))
    }

    /// Plain string literal content, if this is a string without holes.
    pub fn as_plain_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => s.as_plain(),
            _ => None,
        }
    }
}

/// A quoted string with `#expr#` holes.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub quote: Option<char>,
    pub parts: Vec<StringPart>,
}

impl StringLit {
    pub fn plain(quote: Option<char>, text: impl Into<String>) -> Self {
        Self {
            quote,
            parts: vec![StringPart::Text(text.into())],
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [StringPart::Text(text)] => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    /// Unescaped text.
    Text(String),
    Hole(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<Ident>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructEntry {
    pub key: Spanned<Expr>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Box<Spanned<Expr>>),
    Block(Vec<Spanned<Stmt>>),
}

/// `=>` or `->`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrow {
    Fat,
    Thin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    PreInc,
    PreDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Concat,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,
    Eqv,
    Imp,
    Contains,
    NotContains,
    Like,
    NotLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<Spanned<SelectItem>>,
    pub from: Vec<Spanned<TableRef>>,
    pub filter: Option<Spanned<Expr>>,
    pub group_by: Vec<Spanned<Expr>>,
    pub having: Option<Spanned<Expr>>,
    pub order_by: Vec<Spanned<OrderBy>>,
    pub limit: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Spanned<Expr>,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: Ident,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Spanned<Expr>,
    pub descending: bool,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// ...` or `-- ...`
    Line,
    /// `/* ... */` or `<!--- ... --->`
    Block,
    /// `/** ... */`
    Doc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Comment text with delimiters and gutters removed.
    pub text: String,
    pub pos: Position,
    /// Parsed content of a doc comment.
    pub documentation: Option<Documentation>,
}

// ============================================================================
// Visitor trait for in-place AST rewrites
// ============================================================================

/// Mutable traversal of the canonical tree.
///
/// Every method defaults to visiting the node's children through the matching `walk_*` function; override a method
/// and call the walker yourself to choose between pre- and post-order.
pub trait VisitorMut {
    fn visit_node(&mut self, node: &mut AstNode) {
        walk_node(self, node);
    }

    fn visit_class(&mut self, class: &mut ClassDecl) {
        walk_class(self, class);
    }

    fn visit_interface(&mut self, interface: &mut InterfaceDecl) {
        walk_interface(self, interface);
    }

    fn visit_property(&mut self, property: &mut PropertyDecl) {
        walk_annotations(self, &mut property.annotations);
    }

    fn visit_function(&mut self, function: &mut FunctionDecl) {
        walk_function(self, function);
    }

    fn visit_stmt(&mut self, stmt: &mut Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr(self, expr);
    }
}

pub fn walk_node<V: VisitorMut + ?Sized>(v: &mut V, node: &mut AstNode) {
    match node {
        AstNode::Script(script) => walk_stmts(v, &mut script.node.statements),
        AstNode::Class(class) => v.visit_class(&mut class.node),
        AstNode::Interface(interface) => v.visit_interface(&mut interface.node),
        AstNode::Expression(expr) => v.visit_expr(expr),
        AstNode::Statement(stmt) => v.visit_stmt(stmt),
        AstNode::Query(select) => walk_select(v, &mut select.node),
        AstNode::Doc(_) => {}
    }
}

pub fn walk_class<V: VisitorMut + ?Sized>(v: &mut V, class: &mut ClassDecl) {
    walk_stmts(v, &mut class.imports);
    walk_annotations(v, &mut class.annotations);
    for property in &mut class.properties {
        v.visit_property(&mut property.node);
    }
    walk_stmts(v, &mut class.body);
}

pub fn walk_interface<V: VisitorMut + ?Sized>(v: &mut V, interface: &mut InterfaceDecl) {
    walk_stmts(v, &mut interface.imports);
    walk_annotations(v, &mut interface.annotations);
    walk_stmts(v, &mut interface.body);
}

pub fn walk_function<V: VisitorMut + ?Sized>(v: &mut V, function: &mut FunctionDecl) {
    for arg in &mut function.args {
        walk_argument(v, &mut arg.node);
    }
    walk_annotations(v, &mut function.annotations);
    if let Some(body) = &mut function.body {
        walk_stmts(v, body);
    }
}

fn walk_argument<V: VisitorMut + ?Sized>(v: &mut V, arg: &mut ArgumentDecl) {
    if let Some(default) = &mut arg.default {
        v.visit_expr(default);
    }
    walk_annotations(v, &mut arg.annotations);
}

pub fn walk_annotations<V: VisitorMut + ?Sized>(v: &mut V, annotations: &mut [Spanned<Annotation>]) {
    for annotation in annotations {
        if let Some(value) = &mut annotation.node.value {
            v.visit_expr(value);
        }
    }
}

pub fn walk_stmts<V: VisitorMut + ?Sized>(v: &mut V, stmts: &mut [Spanned<Stmt>]) {
    for stmt in stmts {
        v.visit_stmt(stmt);
    }
}

fn walk_opt<V: VisitorMut + ?Sized>(v: &mut V, expr: &mut Option<Spanned<Expr>>) {
    if let Some(expr) = expr {
        v.visit_expr(expr);
    }
}

pub fn walk_stmt<V: VisitorMut + ?Sized>(v: &mut V, stmt: &mut Spanned<Stmt>) {
    match &mut stmt.node {
        Stmt::Expr(expr) | Stmt::Include(expr) | Stmt::BufferOutput(expr) => v.visit_expr(expr),
        Stmt::Var(decl) => {
            v.visit_expr(&mut decl.target);
            walk_opt(v, &mut decl.value);
        }
        Stmt::If(s) => {
            v.visit_expr(&mut s.cond);
            walk_stmts(v, &mut s.then);
            if let Some(otherwise) = &mut s.otherwise {
                walk_stmts(v, otherwise);
            }
        }
        Stmt::While(s) | Stmt::DoWhile(s) => {
            v.visit_expr(&mut s.cond);
            walk_stmts(v, &mut s.body);
        }
        Stmt::For(s) => {
            walk_opt(v, &mut s.init);
            walk_opt(v, &mut s.cond);
            walk_opt(v, &mut s.step);
            walk_stmts(v, &mut s.body);
        }
        Stmt::ForIn(s) => {
            v.visit_expr(&mut s.var);
            v.visit_expr(&mut s.collection);
            walk_stmts(v, &mut s.body);
        }
        Stmt::Switch(s) => {
            v.visit_expr(&mut s.subject);
            for case in &mut s.cases {
                walk_opt(v, &mut case.node.value);
                walk_opt(v, &mut case.node.delimiter);
                walk_stmts(v, &mut case.node.body);
            }
        }
        Stmt::Try(s) => {
            walk_stmts(v, &mut s.body);
            for catch in &mut s.catches {
                for ty in &mut catch.node.types {
                    v.visit_expr(ty);
                }
                walk_stmts(v, &mut catch.node.body);
            }
            if let Some(finally) = &mut s.finally {
                walk_stmts(v, finally);
            }
        }
        Stmt::Throw(s) => {
            for field in [
                &mut s.object,
                &mut s.kind,
                &mut s.message,
                &mut s.detail,
                &mut s.error_code,
                &mut s.extended_info,
            ] {
                walk_opt(v, field);
            }
        }
        Stmt::Return(value) => walk_opt(v, value),
        Stmt::Param(p) => {
            v.visit_expr(&mut p.name);
            walk_opt(v, &mut p.default);
        }
        Stmt::Block(body) | Stmt::ScriptIsland(body) | Stmt::TemplateIsland(body) => walk_stmts(v, body),
        Stmt::Function(function) => v.visit_function(function),
        Stmt::Component(c) => {
            walk_annotations(v, &mut c.attributes);
            if let Some(body) = &mut c.body {
                walk_stmts(v, body);
            }
        }
        Stmt::Output(o) => {
            walk_annotations(v, &mut o.attributes);
            walk_stmts(v, &mut o.body);
        }
        Stmt::Rethrow | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Import(_) => {}
    }
}

pub fn walk_expr<V: VisitorMut + ?Sized>(v: &mut V, expr: &mut Spanned<Expr>) {
    match &mut expr.node {
        Expr::Null
        | Expr::Bool(_)
        | Expr::Int(_)
        | Expr::Float(_)
        | Expr::Ident(_)
        | Expr::Scope(_)
        | Expr::Placeholder(_)
        | Expr::Star => {}
        Expr::Str(literal) => {
            for part in &mut literal.parts {
                if let StringPart::Hole(hole) = part {
                    v.visit_expr(hole);
                }
            }
        }
        Expr::Unary(_, inner) | Expr::Postfix(inner, _) => v.visit_expr(inner),
        Expr::Binary(left, _, right) | Expr::Elvis(left, right) => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Ternary { cond, then, otherwise } => {
            v.visit_expr(cond);
            v.visit_expr(then);
            v.visit_expr(otherwise);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Expr::Dot { object, .. } | Expr::StaticAccess { object, .. } => v.visit_expr(object),
        Expr::Index { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        Expr::Call { callee: target, args } | Expr::New { class: target, args } => {
            v.visit_expr(target);
            for arg in args {
                v.visit_expr(&mut arg.value);
            }
        }
        Expr::Array(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::Struct { entries, .. } => {
            for entry in entries {
                v.visit_expr(&mut entry.key);
                v.visit_expr(&mut entry.value);
            }
        }
        Expr::Closure(function) => v.visit_function(function),
        Expr::Lambda { params, body, .. } => {
            for param in params {
                walk_argument(v, &mut param.node);
            }
            match body {
                LambdaBody::Expr(body) => v.visit_expr(body),
                LambdaBody::Block(body) => walk_stmts(v, body),
            }
        }
        Expr::Between { expr, low, high, .. } => {
            v.visit_expr(expr);
            v.visit_expr(low);
            v.visit_expr(high);
        }
        Expr::InList { expr, items, .. } => {
            v.visit_expr(expr);
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::IsNull { expr, .. } => v.visit_expr(expr),
    }
}

fn walk_select<V: VisitorMut + ?Sized>(v: &mut V, select: &mut Select) {
    for item in &mut select.items {
        v.visit_expr(&mut item.node.expr);
    }
    walk_opt(v, &mut select.filter);
    for expr in &mut select.group_by {
        v.visit_expr(expr);
    }
    walk_opt(v, &mut select.having);
    for order in &mut select.order_by {
        v.visit_expr(&mut order.node.expr);
    }
    walk_opt(v, &mut select.limit);
}
