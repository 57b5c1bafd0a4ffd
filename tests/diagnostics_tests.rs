//! Issue reporting tests
//!
//! Issue lists are snapshotted inline as `kind: message` lines; miette rendering is checked for the pieces a user
//! relies on (message, source name, the offending line).
//!
//! Review changes: `cargo insta review`

use miette::{GraphicalReportHandler, GraphicalTheme};
use tagscript::{BuiltinComponents, Dialect, Flavor, IssueReport, ParserConfig, SourceType, parser, reports};

fn issue_lines(text: &str, dialect: Dialect, flavor: Flavor) -> String {
    let config = ParserConfig::new(SourceType::new(dialect, flavor));
    let result = parser::parse(text, &config, &BuiltinComponents).unwrap();
    result
        .issues
        .iter()
        .map(|i| format!("{}: {}", i.kind, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(report: &IssueReport) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .with_width(200)
        .render_report(&mut out, report)
        .unwrap();
    out
}

#[test]
fn test_template_structure_issues() {
    let cases = [
        "text</cfwidget>",
        "<cfsavecontent variable=\"x\">",
        "<cfdump var=\"#x#\">body</cfdump>",
        "<cfelse>",
    ];
    let rendered = cases
        .iter()
        .map(|text| issue_lines(text, Dialect::Template, Flavor::Cf))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    error: Found end component [widget] without matching start component
    error: Component [savecontent] requires a body.
    error: The [dump] component does not allow a body
    error: The [else] component must be inside an [if] component
    ");
}

#[test]
fn test_script_issue_kinds() {
    let rendered = [
        issue_lines("x = true.foo;", Dialect::Script, Flavor::Box),
        issue_lines("x = 1;\n/* open", Dialect::Script, Flavor::Box),
        issue_lines("if (a) {\n  b = 1;\n", Dialect::Script, Flavor::Box),
    ]
    .join("\n");
    insta::assert_snapshot!(rendered, @r"
    error: Invalid dot access: [true] cannot be accessed with a dot
    lexical error: Unclosed comment on line 2
    syntax error: Unclosed curly brace [{] on line 1
    ");
}

#[test]
fn test_report_shows_message_and_source_line() {
    let result = parser::parse("a = 1;\nx = true.foo;", &ParserConfig::default(), &BuiltinComponents).unwrap();
    let all = reports(&result.issues);
    assert_eq!(all.len(), 1);

    let text = render(&all[0]);
    assert!(text.contains("Invalid dot access: [true] cannot be accessed with a dot"), "{text}");
    assert!(text.contains("<code>"), "{text}");
    assert!(text.contains("x = true.foo;"), "{text}");
}

#[test]
fn test_lexical_reports_carry_help() {
    let result = parser::parse("x = 1;\n/* open", &ParserConfig::default(), &BuiltinComponents).unwrap();
    let text = render(&IssueReport::new(&result.issues[0]));
    assert!(text.contains("Unclosed comment on line 2"), "{text}");
    assert!(text.contains("never closed"), "{text}");
}
