//! Whole-tree rewrite run once after the outermost parse.
//!
//! Generic components that have a dedicated statement (`include`, `throw`, `rethrow`, `output`) are lowered into
//! it, so later stages never see them as components. For the `Cf` flavor, legacy names are also rewritten to their
//! `Box` spelling: identifiers, component names, attribute names and a few attribute values.
//!
//! ## Notes
//! - Sub-parses never run this; the outermost parse rewrites the merged tree exactly once.
//! - Renames compare names ignoring ASCII case and write the canonical lower-case (or camel-case) spelling.

use crate::ast::*;
use crate::config::TranspileConfig;
use crate::diagnostics::{Issue, messages};
use crate::source::{Position, Span};
use tagscript_core::Flavor;

/// Legacy identifiers and their replacements.
const IDENTIFIER_RENAMES: &[(&str, &str)] = &[
    ("cfcatch", "bxcatch"),
    ("cfthread", "bxthread"),
    ("cffile", "bxfile"),
    ("cfftp", "bxftp"),
    ("cfhttp", "bxhttp"),
    ("cfquery", "bxquery"),
    ("cfdocument", "bxdocument"),
    ("cfstoredproc", "bxstoredproc"),
    ("thistag", "thiscomponent"),
];

const COMPONENT_RENAMES: &[(&str, &str)] = &[("module", "component")];

/// `(component, attribute, replacement)`
const ATTRIBUTE_RENAMES: &[(&str, &str, &str)] = &[
    ("setting", "enablecfoutputonly", "enableoutputonly"),
    ("invoke", "component", "class"),
    ("procparam", "cfsqltype", "sqltype"),
    ("queryparam", "cfsqltype", "sqltype"),
    ("object", "component", "className"),
];

const SQL_TYPE_PREFIX: &str = "cf_sql_";

/// Rewrite `root` in place. Problems found while lowering (a missing required attribute) are appended to `issues`.
pub fn transpile(root: &mut AstNode, flavor: Flavor, config: &TranspileConfig, issues: &mut Vec<Issue>) {
    let mut transpiler = Transpiler {
        flavor,
        config,
        issues,
        lowered: 0,
    };
    transpiler.visit_node(root);
    tracing::debug!(flavor = flavor.name(), lowered = transpiler.lowered, "transpiled");
}

struct Transpiler<'t> {
    flavor: Flavor,
    config: &'t TranspileConfig,
    issues: &'t mut Vec<Issue>,
    /// Components lowered into dedicated statements.
    lowered: usize,
}

impl VisitorMut for Transpiler<'_> {
    fn visit_class(&mut self, class: &mut ClassDecl) {
        if self.config.merge_docs_into_annotations {
            merge_documentation(&class.documentation, &mut class.annotations);
        }
        walk_class(self, class);
    }

    fn visit_interface(&mut self, interface: &mut InterfaceDecl) {
        if self.config.merge_docs_into_annotations {
            merge_documentation(&interface.documentation, &mut interface.annotations);
        }
        walk_interface(self, interface);
    }

    fn visit_property(&mut self, property: &mut PropertyDecl) {
        if self.config.merge_docs_into_annotations {
            merge_documentation(&property.documentation, &mut property.annotations);
        }
        walk_annotations(self, &mut property.annotations);
    }

    fn visit_function(&mut self, function: &mut FunctionDecl) {
        if self.config.merge_docs_into_annotations {
            merge_documentation(&function.documentation, &mut function.annotations);
            for arg in &mut function.args {
                merge_documentation(&arg.node.documentation, &mut arg.node.annotations);
            }
        }
        walk_function(self, function);
    }

    fn visit_stmt(&mut self, stmt: &mut Spanned<Stmt>) {
        walk_stmt(self, stmt);
        if self.flavor == Flavor::Cf {
            if let Stmt::Try(t) = &mut stmt.node {
                for catch in &mut t.catches {
                    if let Some(renamed) = lookup(IDENTIFIER_RENAMES, &catch.node.var) {
                        catch.node.var = renamed.to_string();
                    }
                }
            }
        }
        let Stmt::Component(component) = &mut stmt.node else {
            return;
        };
        if self.flavor == Flavor::Cf {
            rename_component(component);
        }
        let lowered = match component.name.to_ascii_lowercase().as_str() {
            "include" => Some(self.lower_include(component, stmt.pos.clone())),
            "throw" => Some(lower_throw(component)),
            "rethrow" => Some(Stmt::Rethrow),
            "output" => Some(Stmt::Output(OutputStmt {
                attributes: std::mem::take(&mut component.attributes),
                body: component.body.take().unwrap_or_default(),
            })),
            _ => None,
        };
        if let Some(lowered) = lowered {
            self.lowered += 1;
            stmt.node = lowered;
        }
    }

    fn visit_expr(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr(self, expr);
        if self.flavor != Flavor::Cf {
            return;
        }
        if let Expr::Ident(name) = &mut expr.node {
            if let Some(renamed) = lookup(IDENTIFIER_RENAMES, name) {
                *name = renamed.to_string();
            }
        }
    }
}

impl Transpiler<'_> {
    fn lower_include(&mut self, component: &mut ComponentStmt, pos: Position) -> Stmt {
        match take_attribute(component, "template") {
            Some(template) => Stmt::Include(template),
            None => {
                self.issues
                    .push(messages::missing_attribute("template", &component.name, pos.clone()));
                let empty = Spanned::new(Expr::Str(StringLit::plain(None, "")), pos, "", Span::new(0, 0));
                Stmt::Include(empty)
            }
        }
    }
}

fn lower_throw(component: &mut ComponentStmt) -> Stmt {
    Stmt::Throw(ThrowStmt {
        object: take_attribute(component, "object"),
        kind: take_attribute(component, "type"),
        message: take_attribute(component, "message"),
        detail: take_attribute(component, "detail"),
        error_code: take_attribute(component, "errorcode"),
        extended_info: take_attribute(component, "extendedinfo"),
    })
}

/// Apply the legacy component, attribute and attribute-value rewrites.
fn rename_component(component: &mut ComponentStmt) {
    if let Some(renamed) = lookup(COMPONENT_RENAMES, &component.name) {
        component.name = renamed.to_string();
    }
    for attribute in &mut component.attributes {
        let renamed = ATTRIBUTE_RENAMES.iter().find(|(owner, from, _)| {
            owner.eq_ignore_ascii_case(&component.name) && from.eq_ignore_ascii_case(&attribute.node.name)
        });
        if let Some((_, _, to)) = renamed {
            attribute.node.name = to.to_string();
        }
        if attribute.node.name.eq_ignore_ascii_case("sqltype") {
            if let Some(value) = &mut attribute.node.value {
                strip_sql_type_prefix(value);
            }
        }
    }
    if component.name.eq_ignore_ascii_case("query") {
        component.attributes.retain(|a| {
            if !a.node.name.eq_ignore_ascii_case("dbtype") {
                return true;
            }
            match a.node.value.as_ref().and_then(|v| v.node.as_plain_str()) {
                Some(dbtype) => dbtype.eq_ignore_ascii_case("query") || dbtype.eq_ignore_ascii_case("hql"),
                None => true,
            }
        });
    }
}

fn strip_sql_type_prefix(value: &mut Spanned<Expr>) {
    let Expr::Str(literal) = &mut value.node else {
        return;
    };
    if let [StringPart::Text(text)] = literal.parts.as_mut_slice() {
        let prefixed = text
            .get(..SQL_TYPE_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(SQL_TYPE_PREFIX));
        if prefixed {
            *text = text[SQL_TYPE_PREFIX.len()..].to_string();
        }
    }
}

/// Copy documentation entries into annotations, skipping `hint` and names already annotated.
fn merge_documentation(documentation: &[Spanned<Annotation>], annotations: &mut Vec<Spanned<Annotation>>) {
    for entry in documentation {
        let name = &entry.node.name;
        if name.eq_ignore_ascii_case("hint") || annotations.iter().any(|a| a.node.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        annotations.push(entry.clone());
    }
}

fn take_attribute(component: &mut ComponentStmt, name: &str) -> Option<Spanned<Expr>> {
    let index = component
        .attributes
        .iter()
        .position(|a| a.node.name.eq_ignore_ascii_case(name))?;
    let attribute = component.attributes.remove(index);
    let empty = attribute.with_node(Expr::Str(StringLit::plain(None, "")));
    Some(attribute.node.value.unwrap_or(empty))
}

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(name))
        .map(|(_, to)| *to)
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::config::{Dialect, ParserConfig, SourceType, TranspileConfig};
    use crate::parser::{ParsingResult, parse};
    use tagscript_core::Flavor;
    use tagscript_core::lang::components::BuiltinComponents;

    fn parse_with(text: &str, dialect: Dialect, flavor: Flavor) -> ParsingResult {
        let config = ParserConfig::new(SourceType::new(dialect, flavor));
        parse(text, &config, &BuiltinComponents).expect("parse")
    }

    fn statements(result: &ParsingResult) -> &[Spanned<Stmt>] {
        result.root.as_ref().and_then(|r| r.statements()).expect("statements")
    }

    fn attribute_names(stmt: &Spanned<Stmt>) -> Vec<&str> {
        match &stmt.node {
            Stmt::Component(c) => c.attributes.iter().map(|a| a.node.name.as_str()).collect(),
            other => panic!("expected a component, got {other:?}"),
        }
    }

    #[test]
    fn dedicated_components_are_lowered() {
        let result = parse_with(
            "<cfinclude template=\"header.cfm\"><cfthrow message=\"boom\" type=\"App\"><cfrethrow><cfoutput>#x#</cfoutput>",
            Dialect::Template,
            Flavor::Cf,
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        assert!(matches!(&stmts[0].node, Stmt::Include(e) if e.node.as_plain_str() == Some("header.cfm")));
        match &stmts[1].node {
            Stmt::Throw(t) => {
                assert_eq!(t.message.as_ref().and_then(|m| m.node.as_plain_str()), Some("boom"));
                assert_eq!(t.kind.as_ref().and_then(|m| m.node.as_plain_str()), Some("App"));
                assert!(t.detail.is_none());
            }
            other => panic!("expected throw, got {other:?}"),
        }
        assert!(matches!(stmts[2].node, Stmt::Rethrow));
        assert!(matches!(&stmts[3].node, Stmt::Output(o) if o.body.len() == 1));
    }

    #[test]
    fn include_without_template_is_reported() {
        let result = parse_with("<cfinclude>", Dialect::Template, Flavor::Cf);
        let messages: Vec<&str> = result.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["Missing template attribute on include component"]);
        assert!(matches!(statements(&result)[0].node, Stmt::Include(_)));
    }

    /// Every identifier in a statement, in visiting order.
    fn identifiers(stmt: &Spanned<Stmt>) -> Vec<String> {
        struct Collect(Vec<String>);
        impl VisitorMut for Collect {
            fn visit_expr(&mut self, expr: &mut Spanned<Expr>) {
                if let Expr::Ident(name) = &expr.node {
                    self.0.push(name.clone());
                }
                walk_expr(self, expr);
            }
        }
        let mut collect = Collect(Vec::new());
        collect.visit_stmt(&mut stmt.clone());
        collect.0
    }

    #[test]
    fn legacy_identifiers_are_renamed_for_cf() {
        let result = parse_with("x = cfcatch.message & thistag.y;", Dialect::Script, Flavor::Cf);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(identifiers(&statements(&result)[0]), vec!["x", "bxcatch", "thiscomponent"]);

        let boxed = parse_with("x = cfcatch.message;", Dialect::Script, Flavor::Box);
        assert_eq!(identifiers(&statements(&boxed)[0]), vec!["x", "cfcatch"]);
    }

    #[test]
    fn default_catch_variable_is_renamed() {
        let result = parse_with("<cftry><cfcatch>oops</cfcatch></cftry>", Dialect::Template, Flavor::Cf);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let Stmt::Try(t) = &statements(&result)[0].node else {
            panic!("expected try");
        };
        assert_eq!(t.catches[0].node.var, "bxcatch");
    }

    #[test]
    fn attributes_are_renamed_and_values_rewritten() {
        let result = parse_with(
            "<cfqueryparam cfsqltype=\"CF_SQL_VARCHAR\" value=\"a\">\n<cfinvoke component=\"svc\" method=\"run\">\n<cfquery name=\"q\" dbtype=\"odbc\">x</cfquery>\n<cfquery name=\"r\" dbtype=\"query\">y</cfquery>",
            Dialect::Template,
            Flavor::Cf,
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts: Vec<&Spanned<Stmt>> = statements(&result)
            .iter()
            .filter(|s| matches!(s.node, Stmt::Component(_)))
            .collect();
        assert_eq!(attribute_names(stmts[0]), vec!["sqltype", "value"]);
        match &stmts[0].node {
            Stmt::Component(c) => assert_eq!(c.attribute("sqltype").and_then(|v| v.node.as_plain_str()), Some("VARCHAR")),
            _ => unreachable!(),
        }
        assert_eq!(attribute_names(stmts[1]), vec!["class", "method"]);
        assert_eq!(attribute_names(stmts[2]), vec!["name"]);
        assert_eq!(attribute_names(stmts[3]), vec!["name", "dbtype"]);
    }

    #[test]
    fn documentation_merges_into_annotations() {
        let text = "/**\n * Says hi.\n * @deprecated use hello\n * @output false\n */\n@output true\nfunction hi() {}";
        let result = parse_with(text, Dialect::Script, Flavor::Box);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let Stmt::Function(f) = &statements(&result)[0].node else {
            panic!("expected a function");
        };
        let names: Vec<&str> = f.annotations.iter().map(|a| a.node.name.as_str()).collect();
        assert_eq!(names, vec!["output", "deprecated"]);
        assert_eq!(f.documentation.len(), 3);

        let config = ParserConfig::new(SourceType::new(Dialect::Script, Flavor::Box)).with_transpile(TranspileConfig {
            merge_docs_into_annotations: false,
        });
        let result = parse(text, &config, &BuiltinComponents).expect("parse");
        let Stmt::Function(f) = &statements(&result)[0].node else {
            panic!("expected a function");
        };
        assert_eq!(f.annotations.len(), 1);
    }
}
