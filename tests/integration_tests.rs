//! Integration tests for the tagscript front end
//!
//! These go through the public `tagscript` API the way an embedding tool would: files on disk, detection, mixed
//! dialects in one document, and the command-line binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::thread;

use tagscript::ast::{AstNode, Stmt};
use tagscript::{BuiltinComponents, Dialect, Flavor, IssueKind, ParserConfig, ProgramKind, SourceType, parser};

/// Write `text` to a fresh file named `name` in a per-test scratch directory.
fn fixture(test: &str, name: &str, text: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tagscript-it-{}-{}", test, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn parse(text: &str, dialect: Dialect, flavor: Flavor) -> tagscript::ParsingResult {
    let config = ParserConfig::new(SourceType::new(dialect, flavor));
    parser::parse(text, &config, &BuiltinComponents).unwrap()
}

#[test]
fn test_parse_file_detects_template_documents() {
    let path = fixture("cfm", "page.cfm", "<cfset total = 1>\n<cfif total gt 0>\n  positive\n</cfif>\n");
    let result = parser::parse_file(&path, &ParserConfig::default(), &BuiltinComponents).unwrap();
    assert!(result.is_correct(), "{:?}", result.issues);
    let root = result.root.unwrap();
    let stmts = root.statements().unwrap();
    assert!(stmts.iter().any(|s| matches!(s.node, Stmt::If(_))));
}

#[test]
fn test_parse_file_sniffs_component_files() {
    let script = fixture("cfc", "Script.cfc", "// header\ncomponent {\n  function hi() { return 1; }\n}\n");
    let result = parser::parse_file(&script, &ParserConfig::default(), &BuiltinComponents).unwrap();
    assert!(result.is_correct(), "{:?}", result.issues);
    assert!(matches!(result.root, Some(AstNode::Class(_))));

    let template = fixture(
        "cfc",
        "Tag.cfc",
        "<cfcomponent>\n<cffunction name=\"hi\"><cfreturn 1></cffunction>\n</cfcomponent>\n",
    );
    let result = parser::parse_file(&template, &ParserConfig::default(), &BuiltinComponents).unwrap();
    assert!(result.is_correct(), "{:?}", result.issues);
    assert!(matches!(result.root, Some(AstNode::Class(_))));
}

#[test]
fn test_issue_positions_name_the_file() {
    let path = fixture("named", "broken.bxs", "a = 1;\nb = ;\n");
    let result = parser::parse_file(&path, &ParserConfig::default(), &BuiltinComponents).unwrap();
    assert_eq!(result.issues.len(), 1);
    let issue = &result.issues[0];
    assert_eq!(issue.kind, IssueKind::Syntax);
    assert_eq!(issue.position.start.line, 2);
    assert_eq!(issue.position.source.path(), Some(path.as_path()));
}

#[test]
fn test_missing_file_is_an_error() {
    let path = std::env::temp_dir().join("tagscript-it-missing").join("nope.cfm");
    let err = parser::parse_file(&path, &ParserConfig::default(), &BuiltinComponents).unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}

#[test]
fn test_script_island_inside_template() {
    let text = "<p>hi</p>\n<cfscript>\n  x = 1;\n  y = x + 1;\n</cfscript>\n";
    let result = parse(text, Dialect::Template, Flavor::Cf);
    assert!(result.is_correct(), "{:?}", result.issues);
    let root = result.root.unwrap();
    let island = root
        .statements()
        .unwrap()
        .iter()
        .find_map(|s| match &s.node {
            Stmt::ScriptIsland(body) => Some(body),
            _ => None,
        })
        .expect("script island");
    assert_eq!(island.len(), 2);
    assert_eq!(island[1].pos.start.line, 4);
}

#[test]
fn test_unclosed_regions_are_lexical_issues() {
    let result = parse("x = 1;\n/* open", Dialect::Script, Flavor::Box);
    assert_eq!(result.issues[0].kind, IssueKind::Lexical);
    assert_eq!(result.issues[0].message, "Unclosed comment on line 2");

    let result = parse("<!--- note", Dialect::Template, Flavor::Cf);
    assert_eq!(result.issues[0].message, "Unclosed tag comment on line 1");
}

#[test]
fn test_query_dialect() {
    let config = ParserConfig::new(SourceType::new(Dialect::Query, Flavor::Box));
    let result = parser::parse("SELECT a, b FROM t WHERE a = 1", &config, &BuiltinComponents).unwrap();
    assert!(result.is_correct(), "{:?}", result.issues);
    assert!(matches!(result.root, Some(AstNode::Query(_))));
}

#[test]
fn test_expression_kind_from_config() {
    let config = ParserConfig::new(SourceType::new(Dialect::Script, Flavor::Box)).with_kind(ProgramKind::Expression);
    let result = parser::parse("a ? b : c", &config, &BuiltinComponents).unwrap();
    assert!(result.is_correct(), "{:?}", result.issues);
    assert!(matches!(result.root, Some(AstNode::Expression(_))));
}

#[test]
fn test_parses_are_independent_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let text = format!("<cfset v{i} = {i}><cfoutput>#v{i}#</cfoutput>");
                let result = parse(&text, Dialect::Template, Flavor::Cf);
                (result.is_correct(), result.root.and_then(|r| r.statements().map(<[_]>::len)))
            })
        })
        .collect();
    for handle in handles {
        let (correct, count) = handle.join().unwrap();
        assert!(correct);
        assert_eq!(count, Some(2));
    }
}

#[test]
fn test_cli_inline_code_exit_status() {
    let bin = env!("CARGO_BIN_EXE_tagscript");
    let ok = Command::new(bin).args(["-c", "x = 1;"]).output().unwrap();
    assert!(ok.status.success());

    let bad = Command::new(bin).args(["-c", "x = ;"]).output().unwrap();
    assert_eq!(bad.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("[;]"));
}

#[test]
fn test_cli_detect_prints_source_type() {
    let path = fixture("detect", "App.bx", "class {}");
    let out = Command::new(env!("CARGO_BIN_EXE_tagscript"))
        .arg("detect")
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("box script (declaration)"), "{stdout}");
}
