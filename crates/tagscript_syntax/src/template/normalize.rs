//! Template normalization.
//!
//! Items are pushed onto a working list in source order. An opening tag becomes an [`Entry::Open`] whose body is
//! still unknown. A closing tag searches backwards for the nearest open entry with the same name, takes every entry
//! after it as the body (back-patching), and replaces the open entry with the finalized node. Any open entry left
//! when its enclosing block ends is finalized without a body.
//!
//! Tags that only make sense inside a parent (`else`, `case`, `catch`, `argument`, ...) finalize into markers. The
//! parent consumes them when it is finalized; a marker that reaches any other list is reported and dropped.
//!
//! ## Notes
//! - Finalized nodes are immutable `Stmt` values. Nothing here mutates a node after it was built.
//! - Spans of finalized nodes run from the opening tag to the end of the closing tag.

use crate::ast::*;
use crate::diagnostics::{Issue, messages};
use crate::source::{Point, Position, Span};
use crate::template::{ExpressionTag, TemplateItem, TagHead};
use tagscript_core::Flavor;
use tagscript_core::lang::components::TagRegistry;

/// What the normalizer needs from the parser that owns the items.
pub trait NormalizeHost {
    fn flavor(&self) -> Flavor;
    fn registry(&self) -> &dyn TagRegistry;
    fn report(&mut self, issue: Issue);
    /// Document position of a byte span of the host's text.
    fn locate(&self, span: Span) -> Position;
    fn slice(&self, span: Span) -> String;
    /// Parse `text`, which starts at document point `start`, as one expression.
    fn expression_fragment(&mut self, text: &str, start: Point) -> Spanned<Expr>;
    /// Record an inconsistency in the working list that no issue explains.
    fn internal(&mut self, message: String);
}

/// Lower template items into statements.
pub fn normalize<H: NormalizeHost>(items: Vec<TemplateItem>, host: &mut H) -> Vec<Spanned<Stmt>> {
    let mut normalizer = Normalizer { host };
    let mut entries = Vec::new();
    for item in items {
        normalizer.push(&mut entries, item);
    }
    normalizer.statements(entries)
}

enum Entry {
    Stmt(Spanned<Stmt>),
    Open(OpenNode),
    Marker(Spanned<Marker>),
}

/// A tag whose body is not known yet.
struct OpenNode {
    head: Spanned<TagHead>,
    /// Raw condition of an `if` tag.
    condition: Option<Spanned<Expr>>,
}

enum Marker {
    Else,
    ElseIf(Spanned<Expr>),
    Case(SwitchCase),
    DefaultCase(SwitchCase),
    Catch(CatchClause),
    Finally(Vec<Spanned<Stmt>>),
    Argument(ArgumentDecl),
}

impl Marker {
    fn name(&self) -> &'static str {
        match self {
            Marker::Else => "else",
            Marker::ElseIf(_) => "elseif",
            Marker::Case(_) => "case",
            Marker::DefaultCase(_) => "defaultcase",
            Marker::Catch(_) => "catch",
            Marker::Finally(_) => "finally",
            Marker::Argument(_) => "argument",
        }
    }

    fn parent(&self) -> &'static str {
        match self {
            Marker::Else | Marker::ElseIf(_) => "if",
            Marker::Case(_) | Marker::DefaultCase(_) => "switch",
            Marker::Catch(_) | Marker::Finally(_) => "try",
            Marker::Argument(_) => "function",
        }
    }
}

struct Normalizer<'h, H: NormalizeHost> {
    host: &'h mut H,
}

impl<H: NormalizeHost> Normalizer<'_, H> {
    // ========================================================================
    // Working list
    // ========================================================================

    fn push(&mut self, entries: &mut Vec<Entry>, item: TemplateItem) {
        match item {
            TemplateItem::Text(text) => {
                let value = text.with_node(Expr::Str(StringLit::plain(None, text.node.clone())));
                entries.push(Entry::Stmt(text.with_node(Stmt::BufferOutput(value))));
            }
            TemplateItem::Interpolated(text) => {
                let stmt = text.with_node(());
                entries.push(Entry::Stmt(stmt.with_node(Stmt::BufferOutput(text.map(Expr::Str)))));
            }
            TemplateItem::Open(head) => {
                let open = OpenNode { head, condition: None };
                if open.head.node.self_closing {
                    let end = open.head.span;
                    let done = self.finalize(open, None, end);
                    entries.extend(done);
                } else {
                    entries.push(Entry::Open(open));
                }
            }
            TemplateItem::Close(name) => self.back_patch(entries, name),
            TemplateItem::Expression(tag) => {
                let at = tag.with_node(());
                match tag.node {
                    ExpressionTag::Set(stmt) => entries.push(Entry::Stmt(stmt)),
                    ExpressionTag::Return(value) => entries.push(Entry::Stmt(at.with_node(Stmt::Return(value)))),
                    ExpressionTag::ElseIf(cond) => entries.push(Entry::Marker(at.with_node(Marker::ElseIf(cond)))),
                    ExpressionTag::If(cond) => {
                        let head = at.with_node(TagHead {
                            name: "if".to_string(),
                            attributes: Vec::new(),
                            self_closing: false,
                        });
                        entries.push(Entry::Open(OpenNode {
                            head,
                            condition: Some(cond),
                        }));
                    }
                }
            }
            TemplateItem::ScriptIsland(island) => entries.push(Entry::Stmt(island.map(Stmt::ScriptIsland))),
        }
    }

    fn back_patch(&mut self, entries: &mut Vec<Entry>, close: Spanned<Ident>) {
        let key = close.node.to_ascii_lowercase();
        let index = entries
            .iter()
            .rposition(|e| matches!(e, Entry::Open(open) if open.head.node.key() == key));
        let Some(index) = index else {
            self.host.report(messages::end_without_start(&close.node, close.pos.clone()));
            return;
        };
        let body = entries.split_off(index + 1);
        let Some(Entry::Open(open)) = entries.pop() else {
            self.host.internal(format!("open entry for [{key}] vanished while back-patching"));
            return;
        };
        let body = self.finish_block(body);
        tracing::trace!(tag = %key, children = body.len(), "back-patched body");
        let done = self.finalize(open, Some(body), close.span);
        entries.extend(done);
    }

    /// Finalize every open entry left in a block that has ended.
    fn finish_block(&mut self, entries: Vec<Entry>) -> Vec<Entry> {
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Entry::Open(open) => {
                    let end = open.head.span;
                    out.extend(self.finalize(open, None, end));
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Statements of a finished block; stray markers are reported and dropped.
    fn statements(&mut self, entries: Vec<Entry>) -> Vec<Spanned<Stmt>> {
        let entries = self.finish_block(entries);
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Entry::Stmt(stmt) => out.push(stmt),
                Entry::Marker(marker) => {
                    let node = &marker.node;
                    self.host
                        .report(messages::marker_outside(node.name(), node.parent(), marker.pos.clone()));
                }
                Entry::Open(_) => {}
            }
        }
        out
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    fn finalize(&mut self, open: OpenNode, body: Option<Vec<Entry>>, end: Span) -> Vec<Entry> {
        let span = Span::new(open.head.span.start, end.end.max(open.head.span.end));
        let key = open.head.node.key();
        self.check_body_rule(&open.head, body.as_deref());

        let entry = match key.as_str() {
            "if" => self.lower_if(open, body, span),
            "else" => return self.marker_with_siblings(Marker::Else, span, body),
            "while" => self.lower_while(&open.head, body, span),
            "loop" => self.lower_loop(open.head, body, span),
            "switch" => self.lower_switch(&open.head, body, span),
            "case" | "defaultcase" => self.lower_case(&open.head, body, span, key == "case"),
            "try" => self.lower_try(body, span),
            "catch" => self.lower_catch(&open.head, body, span),
            "finally" => {
                let stmts = self.statements(body.unwrap_or_default());
                Entry::Marker(self.node(Marker::Finally(stmts), span))
            }
            "function" => self.lower_function(&open.head, body, span),
            "argument" => {
                let argument = self.lower_argument(&open.head);
                return self.marker_with_siblings(Marker::Argument(argument), span, body);
            }
            "import" => match self.lower_import(&open.head) {
                Some(import) => Entry::Stmt(self.node(Stmt::Import(import), span)),
                None => self.generic(open.head, body, span),
            },
            "break" => Entry::Stmt(self.node(Stmt::Break(None), span)),
            "continue" => Entry::Stmt(self.node(Stmt::Continue(None), span)),
            _ => self.generic(open.head, body, span),
        };
        vec![entry]
    }

    fn check_body_rule(&mut self, head: &Spanned<TagHead>, body: Option<&[Entry]>) {
        let key = head.node.key();
        let registry = self.host.registry();
        let issue = match body {
            None if registry.requires_body(&key) => Some(messages::requires_body(&head.node.name, head.pos.clone())),
            Some(body) if !registry.allows_body(&key) && body.iter().any(has_content) => {
                Some(messages::body_not_allowed(&head.node.name, head.pos.clone()))
            }
            _ => None,
        };
        if let Some(issue) = issue {
            self.host.report(issue);
        }
    }

    /// A marker tag written with a body keeps the body as following siblings.
    fn marker_with_siblings(&mut self, marker: Marker, span: Span, body: Option<Vec<Entry>>) -> Vec<Entry> {
        let mut out = vec![Entry::Marker(self.node(marker, span))];
        out.extend(body.unwrap_or_default());
        out
    }

    fn generic(&mut self, head: Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let body = body.map(|entries| self.statements(entries));
        let TagHead { name, attributes, .. } = head.node;
        Entry::Stmt(self.node(Stmt::Component(ComponentStmt { name, attributes, body }), span))
    }

    fn lower_if(&mut self, open: OpenNode, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let cond = match open.condition {
            Some(cond) => cond,
            None => {
                self.host
                    .report(messages::missing_attribute("condition", "if", open.head.pos.clone()));
                open.head.with_node(Expr::Null)
            }
        };

        let mut then = Vec::new();
        let mut branches: Vec<(Spanned<Marker>, Vec<Entry>)> = Vec::new();
        for entry in body.unwrap_or_default() {
            match entry {
                Entry::Marker(marker) if matches!(marker.node, Marker::Else | Marker::ElseIf(_)) => {
                    branches.push((marker, Vec::new()))
                }
                other => match branches.last_mut() {
                    Some((_, segment)) => segment.push(other),
                    None => then.push(other),
                },
            }
        }

        let mut otherwise: Option<Vec<Spanned<Stmt>>> = None;
        for (marker, segment) in branches.into_iter().rev() {
            let stmts = self.statements(segment);
            let Spanned { node, span: at, .. } = marker;
            match node {
                Marker::ElseIf(cond) => {
                    let nested = IfStmt {
                        cond,
                        then: stmts,
                        otherwise: otherwise.take(),
                    };
                    otherwise = Some(vec![self.node(Stmt::If(nested), Span::new(at.start, span.end))]);
                }
                _ => otherwise = Some(stmts),
            }
        }

        let then = self.statements(then);
        Entry::Stmt(self.node(Stmt::If(IfStmt { cond, then, otherwise }), span))
    }

    fn lower_while(&mut self, head: &Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let cond = match self.find_attribute(head, "condition", true, None) {
            Some(value) => self.reparse_condition(value),
            None => head.with_node(Expr::Null),
        };
        let body = self.statements(body.unwrap_or_default());
        Entry::Stmt(self.node(Stmt::While(WhileStmt { label: None, cond, body }), span))
    }

    /// `loop` stays a component; a string `condition` becomes a closure returning the parsed expression.
    fn lower_loop(&mut self, mut head: Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let position = head
            .node
            .attributes
            .iter()
            .position(|a| a.node.name.eq_ignore_ascii_case("condition"));
        if let Some(index) = position {
            let value = head.node.attributes[index].node.value.clone();
            if let Some(value) = value.filter(|v| v.node.as_plain_str().is_some()) {
                let at = value.with_node(());
                let cond = self.reparse_condition(value);
                let returned = at.with_node(Stmt::Return(Some(cond)));
                let closure = FunctionDecl {
                    access: None,
                    modifiers: Vec::new(),
                    return_type: None,
                    name: String::new(),
                    args: Vec::new(),
                    annotations: Vec::new(),
                    documentation: Vec::new(),
                    body: Some(vec![returned]),
                };
                head.node.attributes[index].node.value = Some(at.with_node(Expr::Closure(Box::new(closure))));
            }
        }
        self.generic(head, body, span)
    }

    fn lower_switch(&mut self, head: &Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let subject = self
            .find_attribute(head, "expression", true, None)
            .unwrap_or_else(|| head.with_node(Expr::Null));
        let mut cases = Vec::new();
        let mut reported = false;
        for entry in body.unwrap_or_default() {
            match entry {
                Entry::Marker(marker) if matches!(marker.node, Marker::Case(_) | Marker::DefaultCase(_)) => {
                    let at = marker.with_node(());
                    if let Marker::Case(case) | Marker::DefaultCase(case) = marker.node {
                        cases.push(at.with_node(case));
                    }
                }
                Entry::Stmt(stmt) if is_whitespace_text(&stmt) => {}
                other => {
                    if !reported {
                        let pos = match &other {
                            Entry::Stmt(s) => s.pos.clone(),
                            Entry::Marker(m) => m.pos.clone(),
                            Entry::Open(o) => o.head.pos.clone(),
                        };
                        self.host.report(messages::switch_body_only_cases(pos));
                        reported = true;
                    }
                }
            }
        }
        Entry::Stmt(self.node(Stmt::Switch(SwitchStmt { subject, cases }), span))
    }

    fn lower_case(&mut self, head: &Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span, valued: bool) -> Entry {
        let value = if valued {
            Some(
                self.find_attribute(head, "value", true, None)
                    .unwrap_or_else(|| head.with_node(Expr::Null)),
            )
        } else {
            None
        };
        let delimiter = self.find_attribute(head, "delimiter", false, None);
        let mut stmts = self.statements(body.unwrap_or_default());
        stmts.push(self.node(Stmt::Break(None), Span::new(span.end, span.end)));
        let case = SwitchCase {
            value,
            delimiter,
            body: stmts,
        };
        let marker = if valued { Marker::Case(case) } else { Marker::DefaultCase(case) };
        Entry::Marker(self.node(marker, span))
    }

    fn lower_try(&mut self, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let mut rest = Vec::new();
        let mut catches = Vec::new();
        let mut finally = None;
        for entry in body.unwrap_or_default() {
            match entry {
                Entry::Marker(marker) if matches!(marker.node, Marker::Catch(_) | Marker::Finally(_)) => {
                    let at = marker.with_node(());
                    match marker.node {
                        Marker::Catch(clause) => catches.push(at.with_node(clause)),
                        Marker::Finally(stmts) => finally = Some(stmts),
                        _ => {}
                    }
                }
                other => rest.push(other),
            }
        }
        let body = self.statements(rest);
        Entry::Stmt(self.node(Stmt::Try(TryStmt { body, catches, finally }), span))
    }

    fn lower_catch(&mut self, head: &Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let kind = self
            .find_attribute(head, "type", false, Some("any"))
            .unwrap_or_else(|| head.with_node(Expr::Str(StringLit::plain(None, "any"))));
        let var = self
            .find_attribute(head, "name", false, None)
            .and_then(|v| self.attribute_as_string(&v, "name", false))
            .unwrap_or_else(|| self.host.flavor().default_catch_variable().to_string());
        let stmts = self.statements(body.unwrap_or_default());
        let clause = CatchClause {
            types: vec![kind],
            var,
            body: stmts,
        };
        Entry::Marker(self.node(Marker::Catch(clause), span))
    }

    fn lower_function(&mut self, head: &Spanned<TagHead>, body: Option<Vec<Entry>>, span: Span) -> Entry {
        let name = self
            .find_attribute(head, "name", true, None)
            .and_then(|v| self.attribute_as_string(&v, "name", false))
            .unwrap_or_default();
        let access = self
            .find_attribute(head, "access", false, None)
            .and_then(|v| v.node.as_plain_str().and_then(access_from_str));
        let return_type = self
            .find_attribute(head, "returntype", false, None)
            .and_then(|v| v.node.as_plain_str().map(str::to_string));

        let mut args = Vec::new();
        let mut rest = Vec::new();
        for entry in body.unwrap_or_default() {
            match entry {
                Entry::Marker(marker) if matches!(marker.node, Marker::Argument(_)) => {
                    let at = marker.with_node(());
                    if let Marker::Argument(argument) = marker.node {
                        args.push(at.with_node(argument));
                    }
                }
                other => rest.push(other),
            }
        }
        let annotations = other_attributes(head, &["name", "access", "returntype"]);
        let decl = FunctionDecl {
            access,
            modifiers: Vec::new(),
            return_type,
            name,
            args,
            annotations,
            documentation: Vec::new(),
            body: Some(self.statements(rest)),
        };
        Entry::Stmt(self.node(Stmt::Function(decl), span))
    }

    fn lower_argument(&mut self, head: &Spanned<TagHead>) -> ArgumentDecl {
        let name = self
            .find_attribute(head, "name", true, None)
            .and_then(|v| self.attribute_as_string(&v, "name", false))
            .unwrap_or_default();
        let required = self
            .find_attribute(head, "required", false, None)
            .and_then(|v| v.node.as_plain_str().map(is_truthy))
            .unwrap_or(false);
        let ty = self
            .find_attribute(head, "type", false, None)
            .and_then(|v| v.node.as_plain_str().map(str::to_string));
        let default = self.find_attribute(head, "default", false, None);
        ArgumentDecl {
            required,
            ty,
            name,
            default,
            annotations: other_attributes(head, &["name", "required", "type", "default"]),
            documentation: Vec::new(),
        }
    }

    /// `<bx:import name="a.b.C" alias="D">`; the taglib form stays a component.
    fn lower_import(&mut self, head: &Spanned<TagHead>) -> Option<ImportStmt> {
        let name = self.find_attribute(head, "name", false, None)?;
        let name = self.attribute_as_string(&name, "name", false)?;
        let alias = self
            .find_attribute(head, "alias", false, None)
            .and_then(|v| v.node.as_plain_str().map(str::to_string));
        Some(ImportStmt { name, alias })
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Value of attribute `name` on `head`.
    ///
    /// A missing attribute yields `default` (as a string literal at the tag) or, when `required`, a
    /// `Missing X attribute on Y component` issue.
    fn find_attribute(
        &mut self,
        head: &Spanned<TagHead>,
        name: &str,
        required: bool,
        default: Option<&str>,
    ) -> Option<Spanned<Expr>> {
        let found = head
            .node
            .attributes
            .iter()
            .find(|a| a.node.name.eq_ignore_ascii_case(name));
        match found {
            Some(attribute) => Some(
                attribute
                    .node
                    .value
                    .clone()
                    .unwrap_or_else(|| attribute.with_node(Expr::Str(StringLit::plain(None, "")))),
            ),
            None => {
                if let Some(default) = default {
                    return Some(head.with_node(Expr::Str(StringLit::plain(None, default))));
                }
                if required {
                    self.host
                        .report(messages::missing_attribute(name, &head.node.name, head.pos.clone()));
                }
                None
            }
        }
    }

    /// Plain string content of an attribute value.
    fn attribute_as_string(&mut self, value: &Spanned<Expr>, name: &str, allow_empty: bool) -> Option<String> {
        match value.node.as_plain_str() {
            Some("") if !allow_empty => {
                self.host.report(messages::empty_attribute(name, value.pos.clone()));
                None
            }
            Some(text) => Some(text.to_string()),
            None => {
                self.host.report(messages::attribute_not_string(name, value.pos.clone()));
                None
            }
        }
    }

    /// Re-parse a plain string condition as an expression; anything else is used as is.
    fn reparse_condition(&mut self, value: Spanned<Expr>) -> Spanned<Expr> {
        let Expr::Str(literal) = &value.node else {
            return value;
        };
        let Some(text) = literal.as_plain() else {
            return value;
        };
        let shift = u32::from(literal.quote.is_some());
        let start = Point::new(value.pos.start.line, value.pos.start.column + shift);
        let text = text.to_string();
        self.host.expression_fragment(&text, start)
    }

    fn node<T>(&self, node: T, span: Span) -> Spanned<T> {
        Spanned::new(node, self.host.locate(span), self.host.slice(span), span)
    }
}

fn is_whitespace_text(stmt: &Spanned<Stmt>) -> bool {
    match &stmt.node {
        Stmt::BufferOutput(value) => value.node.as_plain_str().is_some_and(|t| t.trim().is_empty()),
        _ => false,
    }
}

fn has_content(entry: &Entry) -> bool {
    match entry {
        Entry::Stmt(stmt) => !is_whitespace_text(stmt),
        Entry::Marker(_) | Entry::Open(_) => true,
    }
}

fn other_attributes(head: &Spanned<TagHead>, consumed: &[&str]) -> Vec<Spanned<Annotation>> {
    head.node
        .attributes
        .iter()
        .filter(|a| !consumed.iter().any(|c| a.node.name.eq_ignore_ascii_case(c)))
        .cloned()
        .collect()
}

fn access_from_str(text: &str) -> Option<Access> {
    match text.to_ascii_lowercase().as_str() {
        "public" => Some(Access::Public),
        "private" => Some(Access::Private),
        "package" => Some(Access::Package),
        "remote" => Some(Access::Remote),
        _ => None,
    }
}

fn is_truthy(text: &str) -> bool {
    matches!(text.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::config::{Dialect, ParserConfig, SourceType};
    use crate::parser::{ParsingResult, parse};
    use tagscript_core::Flavor;
    use tagscript_core::lang::components::BuiltinComponents;

    fn template(text: &str) -> ParsingResult {
        let config = ParserConfig::new(SourceType::new(Dialect::Template, Flavor::Cf));
        parse(text, &config, &BuiltinComponents).expect("parse")
    }

    fn statements(result: &ParsingResult) -> &[Spanned<Stmt>] {
        result.root.as_ref().and_then(|r| r.statements()).expect("statements")
    }

    fn messages(result: &ParsingResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn close_tag_back_patches_the_body() {
        let result = template("<cfwidget>A<cfinner>B</cfinner>C</cfwidget>");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        assert_eq!(stmts.len(), 1);
        match &stmts[0].node {
            Stmt::Component(c) => {
                assert_eq!(c.name, "widget");
                let body = c.body.as_ref().expect("body");
                let texts: Vec<&str> = body.iter().map(|s| s.text.as_str()).collect();
                assert_eq!(texts, vec!["A", "<cfinner>B</cfinner>", "C"]);
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn if_elseif_else_chain() {
        let result = template("<cfif a>1<cfelseif b>2<cfelse>3</cfif>");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::If(outer) => {
                assert!(matches!(outer.cond.node, Expr::Ident(ref n) if n == "a"));
                let otherwise = outer.otherwise.as_ref().expect("else branch");
                match &otherwise[0].node {
                    Stmt::If(inner) => {
                        assert!(matches!(inner.cond.node, Expr::Ident(ref n) if n == "b"));
                        assert_eq!(inner.otherwise.as_ref().map(Vec::len), Some(1));
                    }
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn switch_cases_get_implicit_break() {
        let result = template(
            "<cfswitch expression=\"#x#\"><cfcase value=\"1\">one</cfcase><cfdefaultcase>other</cfdefaultcase></cfswitch>",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Switch(switch) => {
                assert_eq!(switch.cases.len(), 2);
                assert!(switch.cases[1].node.value.is_none());
                for case in &switch.cases {
                    assert!(matches!(case.node.body.last().map(|s| &s.node), Some(Stmt::Break(None))));
                }
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn try_catch_defaults() {
        let result = template("<cftry>x<cfcatch>y</cfcatch><cffinally>z</cffinally></cftry>");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Try(t) => {
                assert_eq!(t.catches.len(), 1);
                // `cfcatch` is the default, renamed by the outermost transpile.
                assert_eq!(t.catches[0].node.var, "bxcatch");
                assert_eq!(t.catches[0].node.types[0].node.as_plain_str(), Some("any"));
                assert!(t.finally.is_some());
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn function_collects_arguments() {
        let result = template(
            "<cffunction name=\"add\" returntype=\"numeric\"><cfargument name=\"a\" required=\"true\"><cfreturn a></cffunction>",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Function(f) => {
                assert_eq!(f.name, "add");
                assert_eq!(f.return_type.as_deref(), Some("numeric"));
                assert_eq!(f.args.len(), 1);
                assert!(f.args[0].node.required);
                assert!(matches!(f.body.as_deref(), Some([Spanned { node: Stmt::Return(Some(_)), .. }])));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn while_condition_is_reparsed() {
        let result = template("<cfwhile condition=\"i lt 5\">x</cfwhile>");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::While(w) => {
                assert!(matches!(w.cond.node, Expr::Binary(_, BinaryOp::Lt, _)));
                assert_eq!(w.cond.pos.start.column, 20);
            }
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn loop_condition_becomes_closure() {
        let result = template("<cfloop condition=\"i lt 5\">x</cfloop>");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Component(c) => {
                assert!(matches!(c.attribute("condition").map(|v| &v.node), Some(Expr::Closure(_))));
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            messages(&template("text</cfwidget>")),
            vec!["Found end component [widget] without matching start component"]
        );
        assert_eq!(messages(&template("<cfsavecontent variable=\"x\">")), vec!["Component [savecontent] requires a body."]);
        assert_eq!(
            messages(&template("<cfdump var=\"#x#\">body</cfdump>")),
            vec!["The [dump] component does not allow a body"]
        );
        assert_eq!(
            messages(&template("<cfelse>")),
            vec!["The [else] component must be inside an [if] component"]
        );
        assert_eq!(
            messages(&template("<cfswitch expression=\"x\">stray<cfcase value=\"1\">a</cfcase></cfswitch>")),
            vec!["Switch body can only contain case statements"]
        );
        assert_eq!(messages(&template("<cfwhile>x</cfwhile>")), vec!["Missing condition attribute on while component"]);
        assert_eq!(
            messages(&template("<cffunction name=\"\"></cffunction>")),
            vec!["Attribute [name] cannot be empty"]
        );
    }
}
