#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on the script, declaration, query and doc grammars, on the nesting guard and on position
/// bookkeeping for fragments. Template normalization has its own tests next to the normalizer.
mod tests {
    use super::*;
    use tagscript_core::lang::components::BuiltinComponents;

    fn config(dialect: Dialect, kind: ProgramKind) -> ParserConfig {
        ParserConfig::new(crate::config::SourceType::new(dialect, Flavor::Box)).with_kind(kind)
    }

    fn script(text: &str) -> ParsingResult {
        parse(text, &config(Dialect::Script, ProgramKind::Document), &BuiltinComponents).expect("parse")
    }

    fn statements(result: &ParsingResult) -> &[Spanned<Stmt>] {
        result.root.as_ref().and_then(|r| r.statements()).expect("statements")
    }

    /// Parse a lone expression and return it; the parse must be issue-free.
    fn expr(text: &str) -> Spanned<Expr> {
        let result = parse_expression(text, &config(Dialect::Script, ProgramKind::Expression), &BuiltinComponents)
            .expect("parse");
        assert!(result.issues.is_empty(), "{text}: {:?}", result.issues);
        match result.root {
            Some(AstNode::Expression(e)) => e,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    fn declaration(text: &str) -> ParsingResult {
        parse(text, &config(Dialect::Script, ProgramKind::Declaration), &BuiltinComponents).expect("parse")
    }

    fn messages(result: &ParsingResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.message.as_str()).collect()
    }

    fn binary_op(e: &Spanned<Expr>) -> BinaryOp {
        match &e.node {
            Expr::Binary(_, op, _) => *op,
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let e = expr("1 + 2 * 3");
        match &e.node {
            Expr::Binary(left, BinaryOp::Add, right) => {
                assert!(matches!(left.node, Expr::Int(ref d) if d == "1"));
                assert_eq!(binary_op(right), BinaryOp::Mul);
                assert_eq!(right.text, "2 * 3");
            }
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn test_parentheses_keep_the_inner_node() {
        let e = expr("(1 + 2) * 3");
        match &e.node {
            Expr::Binary(left, BinaryOp::Mul, _) => {
                assert_eq!(binary_op(left), BinaryOp::Add);
                assert_eq!(left.text, "(1 + 2)");
            }
            other => panic!("expected multiplication, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_word_comparisons() {
        assert_eq!(binary_op(&expr("a less than or equal to b")), BinaryOp::LtEq);
        assert_eq!(binary_op(&expr("a greater than b")), BinaryOp::Gt);
        assert_eq!(binary_op(&expr("a does not contain b")), BinaryOp::NotContains);
        assert_eq!(binary_op(&expr("a is not b")), BinaryOp::NotEq);
        assert_eq!(binary_op(&expr("a is b")), BinaryOp::Eq);
        assert_eq!(binary_op(&expr("a lt b")), BinaryOp::Lt);
        assert_eq!(binary_op(&expr("a neq b")), BinaryOp::NotEq);
    }

    #[test]
    fn test_does_not_contain_in_both_flavors() {
        for flavor in [Flavor::Box, Flavor::Cf] {
            let config = ParserConfig::new(crate::config::SourceType::new(Dialect::Script, flavor));
            let result = parse("x = a DOES NOT CONTAIN b;", &config, &BuiltinComponents).expect("parse");
            assert!(result.issues.is_empty(), "{flavor:?}: {:?}", result.issues);
            match &statements(&result)[0].node {
                Stmt::Expr(e) => match &e.node {
                    Expr::Assign { value, .. } => assert_eq!(binary_op(value), BinaryOp::NotContains),
                    other => panic!("expected assignment, got {other:?}"),
                },
                other => panic!("expected expression statement, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_not_takes_a_whole_comparison() {
        let e = expr("not a eq b");
        match &e.node {
            Expr::Unary(UnaryOp::Not, operand) => assert_eq!(binary_op(operand), BinaryOp::Eq),
            other => panic!("expected not, got {other:?}"),
        }
        // `and` is looser than `not`.
        assert_eq!(binary_op(&expr("not a and b")), BinaryOp::And);
    }

    #[test]
    fn test_ternary_and_elvis() {
        let e = expr("a ? b : c ?: d");
        match &e.node {
            Expr::Ternary { cond, otherwise, .. } => {
                assert!(matches!(cond.node, Expr::Ident(ref n) if n == "a"));
                assert!(matches!(otherwise.node, Expr::Elvis(..)));
            }
            other => panic!("expected ternary, got {other:?}"),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let e = expr("a = b &= \"x\"");
        match &e.node {
            Expr::Assign {
                op: AssignOp::Assign,
                value,
                ..
            } => assert!(matches!(value.node, Expr::Assign { op: AssignOp::Concat, .. })),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_string_interpolation_and_escapes() {
        let e = expr("\"Hello #name#!\"");
        match &e.node {
            Expr::Str(s) => {
                assert_eq!(s.quote, Some('"'));
                assert_eq!(s.parts.len(), 3);
                assert!(matches!(&s.parts[0], StringPart::Text(t) if t == "Hello "));
                assert!(matches!(&s.parts[1], StringPart::Hole(h) if matches!(h.node, Expr::Ident(ref n) if n == "name")));
                assert!(matches!(&s.parts[2], StringPart::Text(t) if t == "!"));
            }
            other => panic!("expected string, got {other:?}"),
        }
        assert_eq!(expr("'it''s ##1'").node.as_plain_str(), Some("it's #1"));
    }

    #[test]
    fn test_member_access_calls_and_indexing() {
        let e = expr("user?.address.lines[1].trim()");
        match &e.node {
            Expr::Call { callee, args } => {
                assert!(args.is_empty());
                assert!(matches!(callee.node, Expr::Dot { ref name, safe: false, .. } if name == "trim"));
            }
            other => panic!("expected call, got {other:?}"),
        }
        let e = expr("fn(1, name = 2, other: 3)");
        match &e.node {
            Expr::Call { args, .. } => {
                let names: Vec<Option<&str>> = args.iter().map(|a| a.name.as_deref()).collect();
                assert_eq!(names, vec![None, Some("name"), Some("other")]);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_literals() {
        assert!(matches!(expr("[1, 2, 3]").node, Expr::Array(ref items) if items.len() == 3));
        assert!(matches!(
            expr("{ a: 1, \"b\" = 2 }").node,
            Expr::Struct { ordered: false, ref entries } if entries.len() == 2
        ));
        assert!(matches!(expr("[:]").node, Expr::Struct { ordered: true, ref entries } if entries.is_empty()));
        assert!(matches!(expr("[a: 1]").node, Expr::Struct { ordered: true, .. }));
        assert!(matches!(expr("null").node, Expr::Null));
        assert!(matches!(expr("3.5").node, Expr::Float(ref d) if d == "3.5"));
    }

    #[test]
    fn test_lambdas_and_closures() {
        match expr("(a, b) => a + b").node {
            Expr::Lambda { params, body, arrow } => {
                assert_eq!(params.len(), 2);
                assert_eq!(arrow, Arrow::Fat);
                assert!(matches!(body, LambdaBody::Expr(_)));
            }
            other => panic!("expected lambda, got {other:?}"),
        }
        match expr("x -> { return x; }").node {
            Expr::Lambda { params, body, arrow } => {
                assert_eq!(params[0].node.name, "x");
                assert_eq!(arrow, Arrow::Thin);
                assert!(matches!(body, LambdaBody::Block(ref b) if b.len() == 1));
            }
            other => panic!("expected lambda, got {other:?}"),
        }
        match expr("function(required string a, b = 2) { return a; }").node {
            Expr::Closure(f) => {
                assert!(f.args[0].node.required);
                assert_eq!(f.args[0].node.ty.as_deref(), Some("string"));
                assert!(f.args[1].node.default.is_some());
            }
            other => panic!("expected closure, got {other:?}"),
        }
    }

    #[test]
    fn test_new_expression() {
        match expr("new java:java.util.ArrayList(10)").node {
            Expr::New { class, args } => {
                assert!(matches!(class.node, Expr::Ident(ref n) if n == "java:java.util.ArrayList"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected new, got {other:?}"),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn test_newline_terminates_statements() {
        let result = script("a = 1\nb = 2\nc = a + b;");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(statements(&result).len(), 3);
    }

    #[test]
    fn test_typed_declaration_is_not_a_tag() {
        let result = script("Query results = 1;\nquery name=\"q\" { x = 1; }");
        let stmts = statements(&result);
        match &stmts[0].node {
            Stmt::Var(decl) => {
                assert_eq!(decl.declared_type.as_deref(), Some("Query"));
                assert!(matches!(decl.target.node, Expr::Ident(ref n) if n == "results"));
                assert!(decl.value.is_some());
            }
            other => panic!("expected typed declaration, got {other:?}"),
        }
        assert!(matches!(&stmts[1].node, Stmt::Component(c) if c.name == "query"));
        assert!(!messages(&result).iter().any(|m| m.contains("requires a body")), "{:?}", result.issues);
    }

    #[test]
    fn test_var_declarations() {
        let result = script("var total = 0;\nfinal limit = 10;\nvar pending;");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        match &stmts[0].node {
            Stmt::Var(decl) => {
                assert_eq!(decl.modifiers, vec![Modifier::Var]);
                assert!(matches!(decl.target.node, Expr::Ident(ref n) if n == "total"));
                assert!(decl.value.is_some());
            }
            other => panic!("expected var, got {other:?}"),
        }
        assert!(matches!(&stmts[1].node, Stmt::Var(d) if d.modifiers == vec![Modifier::Final]));
        assert!(matches!(&stmts[2].node, Stmt::Var(d) if d.value.is_none()));
    }

    #[test]
    fn test_control_flow() {
        let result = script(
            "for (var i = 1; i <= 10; i++) { total += i; }\n\
             for (key in data) {}\n\
             if (total gt 50) { show(\"big\"); } else if (total gt 10) { x = 1; } else { x = 2; }\n\
             do { n--; } while (n > 0);",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        match &stmts[0].node {
            Stmt::For(f) => {
                assert!(f.init.is_some() && f.cond.is_some() && f.step.is_some());
                assert!(matches!(f.step.as_ref().map(|s| &s.node), Some(Expr::Postfix(_, PostfixOp::Inc))));
            }
            other => panic!("expected for, got {other:?}"),
        }
        assert!(matches!(&stmts[1].node, Stmt::ForIn(f) if !f.declared));
        match &stmts[2].node {
            Stmt::If(stmt) => {
                let otherwise = stmt.otherwise.as_ref().expect("else");
                assert!(matches!(&otherwise[0].node, Stmt::If(inner) if inner.otherwise.is_some()));
            }
            other => panic!("expected if, got {other:?}"),
        }
        assert!(matches!(&stmts[3].node, Stmt::DoWhile(_)));
    }

    #[test]
    fn test_labelled_loops() {
        let result = script("outer: while (true) { break outer; }");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::While(w) => {
                assert_eq!(w.label.as_deref(), Some("outer"));
                assert!(matches!(&w.body[0].node, Stmt::Break(Some(l)) if l == "outer"));
            }
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn test_switch_and_try() {
        let result = script(
            "switch (x) { case 1: a = 1; break; case \"b\": default: a = 2; }\n\
             try { risky(); } catch (MyError | other.Error e) { } catch (e) { } finally { done(); }",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        match &stmts[0].node {
            Stmt::Switch(s) => {
                assert_eq!(s.cases.len(), 3);
                assert_eq!(s.cases[0].node.body.len(), 2);
                assert!(s.cases[1].node.body.is_empty());
                assert!(s.cases[2].node.value.is_none());
            }
            other => panic!("expected switch, got {other:?}"),
        }
        match &stmts[1].node {
            Stmt::Try(t) => {
                let types: Vec<Option<&str>> = t.catches[0].node.types.iter().map(|t| t.node.as_plain_str()).collect();
                assert_eq!(types, vec![Some("MyError"), Some("other.Error")]);
                assert_eq!(t.catches[0].node.var, "e");
                assert_eq!(t.catches[1].node.types[0].node.as_plain_str(), Some("any"));
                assert!(t.finally.is_some());
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn test_imports_params_and_includes() {
        let result = script(
            "import java.util.Map as JMap;\n\
             param string name = \"x\";\n\
             include \"header.cfm\";\n\
             include template=\"footer.cfm\";",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        assert!(matches!(&stmts[0].node, Stmt::Import(i) if i.name == "java.util.Map" && i.alias.as_deref() == Some("JMap")));
        assert!(matches!(&stmts[1].node, Stmt::Param(p) if p.ty.as_deref() == Some("string") && p.default.is_some()));
        assert!(matches!(&stmts[2].node, Stmt::Include(_)));
        // The component form is lowered to the same statement.
        assert!(matches!(&stmts[3].node, Stmt::Include(e) if e.node.as_plain_str() == Some("footer.cfm")));
    }

    #[test]
    fn test_component_invocations() {
        let result = script("lock name=\"cache\" timeout=5 { a = 1; }\nhttp url=\"x\" method=\"get\";");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let stmts = statements(&result);
        match &stmts[0].node {
            Stmt::Component(c) => {
                assert_eq!(c.name, "lock");
                assert_eq!(c.attributes.len(), 2);
                assert_eq!(c.body.as_ref().map(Vec::len), Some(1));
                assert!(matches!(c.attribute("timeout").map(|v| &v.node), Some(Expr::Int(_))));
            }
            other => panic!("expected component, got {other:?}"),
        }
        assert!(matches!(&stmts[1].node, Stmt::Component(c) if c.body.is_none()));
    }

    #[test]
    fn test_component_body_rules() {
        assert_eq!(
            messages(&script("savecontent variable=\"out\";")),
            vec!["Component [savecontent] requires a body."]
        );
        assert_eq!(
            messages(&script("dump label=\"x\" { a = 1; }")),
            vec!["The [dump] component does not allow a body"]
        );
    }

    #[test]
    fn test_prefixed_call_component_in_cf() {
        let config = ParserConfig::new(crate::config::SourceType::new(Dialect::Script, Flavor::Cf));
        let result = parse("cfhttp(url=\"x\", method=\"get\") { a = 1; }", &config, &BuiltinComponents).expect("parse");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Component(c) => {
                assert_eq!(c.name, "http");
                assert_eq!(c.attributes.len(), 2);
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn test_function_declarations() {
        let result = script(
            "@route \"/users\"\n\
             public static string function find(required numeric id, string name = \"\") cached=true { return id; }",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Function(f) => {
                assert_eq!(f.name, "find");
                assert_eq!(f.access, Some(Access::Public));
                assert_eq!(f.modifiers, vec![Modifier::Static]);
                assert_eq!(f.return_type.as_deref(), Some("string"));
                assert_eq!(f.args.len(), 2);
                let names: Vec<&str> = f.annotations.iter().map(|a| a.node.name.as_str()).collect();
                assert_eq!(names, vec!["route", "cached"]);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_argument_annotations_are_routed() {
        let result = script("@id.min 1\n@other 2\nfunction f(id) {}");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &statements(&result)[0].node {
            Stmt::Function(f) => {
                assert_eq!(f.annotations.len(), 1);
                assert_eq!(f.annotations[0].node.name, "other");
                assert_eq!(f.args[0].node.annotations[0].node.name, "min");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    #[test]
    fn test_class_declaration() {
        let result = declaration(
            "import models.User;\n\
             component extends=\"Base\" accessors=true {\n\
                 property name=\"title\" type=\"string\";\n\
                 property string label;\n\
                 function init() { return 1; }\n\
             }",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &result.root {
            Some(AstNode::Class(class)) => {
                assert_eq!(class.node.imports.len(), 1);
                let names: Vec<&str> = class.node.annotations.iter().map(|a| a.node.name.as_str()).collect();
                assert_eq!(names, vec!["extends", "accessors"]);
                assert_eq!(class.node.properties.len(), 2);
                let label: Vec<(&str, Option<&str>)> = class.node.properties[1]
                    .node
                    .annotations
                    .iter()
                    .map(|a| (a.node.name.as_str(), a.node.value.as_ref().and_then(|v| v.node.as_plain_str())))
                    .collect();
                assert_eq!(label, vec![("name", Some("label")), ("type", Some("string"))]);
                assert!(matches!(&class.node.body[0].node, Stmt::Function(f) if f.name == "init"));
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_interface_declaration() {
        let result = declaration("interface displayname=\"Runner\" { function run(); }");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &result.root {
            Some(AstNode::Interface(i)) => {
                assert!(matches!(&i.node.body[0].node, Stmt::Function(f) if f.body.is_none()));
            }
            other => panic!("expected interface, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_requires_a_class_keyword() {
        let result = declaration("x = 1;");
        assert!(result.root.is_none());
        assert!(!result.issues.is_empty());
        assert_eq!(result.issues[0].kind, IssueKind::Syntax);
        assert!(result.issues[0].message.contains("[x]"), "{}", result.issues[0].message);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[test]
    fn test_select_statement() {
        let config = ParserConfig::new(crate::config::SourceType::new(Dialect::Query, Flavor::Cf));
        let result = parse(
            "SELECT DISTINCT a, b AS bee FROM users u WHERE a = ? AND b NOT IN (1, 2) ORDER BY a DESC, b",
            &config,
            &BuiltinComponents,
        )
        .expect("parse");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        match &result.root {
            Some(AstNode::Query(select)) => {
                let s = &select.node;
                assert!(s.distinct);
                assert_eq!(s.items.len(), 2);
                assert_eq!(s.items[1].node.alias.as_deref(), Some("bee"));
                assert_eq!(s.from[0].node.name, "users");
                assert_eq!(s.from[0].node.alias.as_deref(), Some("u"));
                match s.filter.as_ref().map(|f| &f.node) {
                    Some(Expr::Binary(left, BinaryOp::And, right)) => {
                        assert!(matches!(left.node, Expr::Binary(_, BinaryOp::Eq, _)));
                        assert!(matches!(right.node, Expr::InList { negated: true, ref items, .. } if items.len() == 2));
                    }
                    other => panic!("expected conjunction, got {other:?}"),
                }
                let order: Vec<bool> = s.order_by.iter().map(|o| o.node.descending).collect();
                assert_eq!(order, vec![true, false]);
            }
            other => panic!("expected query, got {other:?}"),
        }
    }

    // ========================================================================
    // Comments and documentation
    // ========================================================================

    #[test]
    fn test_comments_attach_to_the_following_statement() {
        let result = script("// lead\nx = 1;\ny = 2; // trailing");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.comments.len(), 2);
        let stmts = statements(&result);
        assert_eq!(stmts[0].comments.len(), 1);
        assert_eq!(stmts[0].comments[0].text, "lead");
        assert_eq!(stmts[1].comments[0].text, "trailing");
    }

    #[test]
    fn test_comment_association_can_be_disabled() {
        let config = config(Dialect::Script, ProgramKind::Document).with_comment_association(false);
        let result = parse("// lead\nx = 1;", &config, &BuiltinComponents).expect("parse");
        assert_eq!(result.comments.len(), 1);
        assert!(statements(&result)[0].comments.is_empty());
    }

    #[test]
    fn test_doc_comment_documents_function_and_arguments() {
        let result = script(
            "/**\n * Greets someone.\n * @name Pass the name\n * @returns A greeting\n */\nfunction greet(name) { return name; }",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.comments[0].kind, CommentKind::Doc);
        match &statements(&result)[0].node {
            Stmt::Function(f) => {
                let arg_doc = &f.args[0].node.documentation;
                assert_eq!(arg_doc.len(), 1);
                assert_eq!(arg_doc[0].node.name, "hint");
                assert_eq!(
                    arg_doc[0].node.value.as_ref().and_then(|v| v.node.as_plain_str()),
                    Some("Pass the name")
                );
                let names: Vec<&str> = f.documentation.iter().map(|d| d.node.name.as_str()).collect();
                assert_eq!(names, vec!["returns", "hint"]);
                // Documentation entries other than the hint become annotations.
                assert!(f.annotations.iter().any(|a| a.node.name == "returns"));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_doc_dialect() {
        let config = config(Dialect::Doc, ProgramKind::Document);
        let result = parse(
            "/**\n * First line\n * second line\n * @author Ann\n *   and Bo\n * @\n */",
            &config,
            &BuiltinComponents,
        )
        .expect("parse");
        assert_eq!(messages(&result), vec!["Expected an annotation name after [@]"]);
        match &result.root {
            Some(AstNode::Doc(doc)) => {
                let entries: Vec<(&str, Option<&str>)> = doc
                    .node
                    .annotations
                    .iter()
                    .map(|a| (a.node.name.as_str(), a.node.value.as_ref().and_then(|v| v.node.as_plain_str())))
                    .collect();
                assert_eq!(
                    entries,
                    vec![("author", Some("Ann\nand Bo")), ("hint", Some("First line\nsecond line"))]
                );
            }
            other => panic!("expected doc, got {other:?}"),
        }
    }

    // ========================================================================
    // Issues
    // ========================================================================

    #[test]
    fn test_semantic_checks_keep_the_tree() {
        let result = script("x = true.foo;\ny = false[0];\n1 = 2;");
        assert_eq!(
            messages(&result),
            vec![
                "Invalid dot access: [true] cannot be accessed with a dot",
                "Invalid index access: [false] cannot be indexed",
                "Invalid assignment target [1]",
            ]
        );
        assert!(result.issues.iter().all(|i| i.kind == IssueKind::Semantic));
        assert_eq!(statements(&result).len(), 3);
    }

    #[test]
    fn test_grammar_errors_recover_at_the_next_statement() {
        let result = script("x = ;\ny = 2;");
        assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
        assert_eq!(result.issues[0].kind, IssueKind::Syntax);
        assert_eq!(result.issues[0].position.start.line, 1);
        assert!(result.issues[0].message.contains("[;]"), "{}", result.issues[0].message);
        assert_eq!(statements(&result).len(), 1);
    }

    #[test]
    fn test_unclosed_brace_replaces_grammar_errors() {
        let result = script("if (x) {\n  a = 1;\n");
        assert_eq!(messages(&result), vec!["Unclosed curly brace [{] on line 1"]);
    }

    #[test]
    fn test_extra_chars_after_an_expression() {
        let result =
            parse_expression("a + b c", &config(Dialect::Script, ProgramKind::Expression), &BuiltinComponents)
                .expect("parse");
        assert_eq!(messages(&result), vec!["Extra char(s) [c] at the end of parsing."]);
        assert!(result.root.is_some());
    }

    #[test]
    fn test_nesting_limit_stops_the_parse() {
        let config = config(Dialect::Script, ProgramKind::Expression).with_max_depth(8);
        let result = parse_expression("((((((((((1))))))))))", &config, &BuiltinComponents).expect("parse");
        assert_eq!(messages(&result), vec!["Maximum nesting depth of 8 exceeded"]);
        assert_eq!(result.issues[0].kind, IssueKind::Semantic);

        // The default limit is far above ordinary code.
        expr("((((((((((1))))))))))");
    }

    #[test]
    fn test_nesting_limit_applies_to_statements() {
        let config = config(Dialect::Script, ProgramKind::Document).with_max_depth(6);
        let text = "if (a) { if (b) { if (c) { if (d) { x = 1; } } } }\ny = 2;";
        let result = parse(text, &config, &BuiltinComponents).expect("parse");
        assert_eq!(messages(&result), vec!["Maximum nesting depth of 6 exceeded"]);
    }

    #[test]
    fn test_default_nesting_limit_fits_a_small_thread_stack() {
        // Worker threads default to 2 MiB; the guard must trip before the stack runs out.
        let texts = [
            format!("x = {}1{};", "(".repeat(200), ")".repeat(200)),
            format!("{}x = 1;{}", "if (a) { ".repeat(200), " }".repeat(200)),
            format!("x = {}1{};", "{ a: ".repeat(200), " }".repeat(200)),
        ];
        for text in texts {
            let result = std::thread::Builder::new()
                .stack_size(2 * 1024 * 1024)
                .spawn(move || script(&text))
                .expect("spawn")
                .join()
                .expect("parse thread");
            let limit = format!("Maximum nesting depth of {} exceeded", crate::config::DEFAULT_MAX_DEPTH);
            assert!(messages(&result).contains(&limit.as_str()), "{:?}", result.issues);
        }
    }

    // ========================================================================
    // Entry points and positions
    // ========================================================================

    #[test]
    fn test_parse_statement_entry() {
        let result = parse_statement(
            "if (a) b = 1;",
            &config(Dialect::Script, ProgramKind::Statement),
            &BuiltinComponents,
        )
        .expect("parse");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert!(matches!(&result.root, Some(AstNode::Statement(s)) if matches!(s.node, Stmt::If(_))));
    }

    #[test]
    fn test_positions_are_one_based_lines_and_zero_based_columns() {
        let result = script("a = 1;\n  b = 2;");
        let stmts = statements(&result);
        assert_eq!(stmts[1].pos.start, Point::new(2, 2));
        assert_eq!(stmts[1].pos.end, Point::new(2, 8));
        assert_eq!(stmts[1].text, "b = 2;");
    }

    #[test]
    fn test_fragment_positions_are_shifted() {
        let config = config(Dialect::Script, ProgramKind::Expression);
        let result = crate::parser::parse_fragment(
            "a +\n b",
            Offset::new(3, 10),
            EntryPoint::Expression,
            &config,
            &BuiltinComponents,
        )
        .expect("parse");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let root = result.root.expect("root");
        // Columns shift on the first line only.
        assert_eq!(root.pos().start, Point::new(3, 10));
        assert_eq!(root.pos().end, Point::new(4, 2));
    }

    #[test]
    fn test_fragment_issues_are_in_document_coordinates() {
        let config = config(Dialect::Script, ProgramKind::Document);
        let result = crate::parser::parse_fragment(
            "x = true.foo;",
            Offset::new(5, 4),
            EntryPoint::Statements,
            &config,
            &BuiltinComponents,
        )
        .expect("parse");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].position.start, Point::new(5, 8));
    }

    #[test]
    fn test_script_island_positions_are_in_document_coordinates() {
        let config = ParserConfig::new(crate::config::SourceType::new(Dialect::Template, Flavor::Cf));
        let result = parse("<p>\n<cfscript>x = 1;</cfscript>", &config, &BuiltinComponents).expect("parse");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let island = statements(&result)
            .iter()
            .find_map(|s| match &s.node {
                Stmt::ScriptIsland(stmts) => Some(stmts),
                _ => None,
            })
            .expect("script island");
        assert_eq!(island[0].pos.start, Point::new(2, 10));
    }

    #[test]
    fn test_configured_offset_applies_to_whole_parse() {
        let config = config(Dialect::Script, ProgramKind::Document).with_offset(Offset::new(10, 0));
        let result = parse("a = 1;", &config, &BuiltinComponents).expect("parse");
        assert_eq!(statements(&result)[0].pos.start, Point::new(10, 0));
    }
}
