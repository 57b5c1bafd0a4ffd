//! Property-based tests for the tagscript front end
//!
//! These use proptest to check invariants over generated inputs: parsing is total and deterministic for every
//! dialect and flavor, and generated well-formed expressions always parse cleanly.

use proptest::prelude::*;
use tagscript::ast::{AstNode, BinaryOp, Expr};
use tagscript::{BuiltinComponents, Dialect, Flavor, ParserConfig, ProgramKind, SourceType, parser};

const DIALECTS: [Dialect; 4] = [Dialect::Script, Dialect::Template, Dialect::Query, Dialect::Doc];
const FLAVORS: [Flavor; 2] = [Flavor::Box, Flavor::Cf];

/// Text built from the characters that open and close lexical regions.
fn region_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("<cf".to_string()),
            Just("</cf".to_string()),
            Just("<!---".to_string()),
            Just("--->".to_string()),
            Just("/*".to_string()),
            Just("*/".to_string()),
            Just("```".to_string()),
            Just("#".to_string()),
            Just("\"".to_string()),
            Just("'".to_string()),
            Just("{".to_string()),
            Just("}".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just(">".to_string()),
            Just(";".to_string()),
            Just("\n".to_string()),
            "[a-z ]{1,6}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn identifier() -> impl Strategy<Value = String> {
    "v_[a-z0-9]{0,6}"
}

fn parse_expr(text: &str) -> tagscript::ParsingResult {
    let config = ParserConfig::new(SourceType::new(Dialect::Script, Flavor::Box)).with_kind(ProgramKind::Expression);
    parser::parse(text, &config, &BuiltinComponents).unwrap()
}

// =============================================================================
// Totality and determinism
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: any input parses the same way twice, in every dialect and flavor
    #[test]
    fn parse_is_deterministic(text in region_soup()) {
        for dialect in DIALECTS {
            for flavor in FLAVORS {
                let config = ParserConfig::new(SourceType::new(dialect, flavor));
                let first = parser::parse(&text, &config, &BuiltinComponents).ok();
                let second = parser::parse(&text, &config, &BuiltinComponents).ok();
                prop_assert_eq!(first, second);
            }
        }
    }

    /// Property: issues always point inside the text
    #[test]
    fn issue_lines_are_in_range(text in region_soup()) {
        let lines = text.split('\n').count() as u32;
        let config = ParserConfig::new(SourceType::new(Dialect::Template, Flavor::Cf));
        if let Ok(result) = parser::parse(&text, &config, &BuiltinComponents) {
            for issue in &result.issues {
                prop_assert!(issue.position.start.line >= 1);
                prop_assert!(issue.position.start.line <= lines, "{} in {:?}", issue, text);
            }
        }
    }
}

// =============================================================================
// Generated expressions
// =============================================================================

proptest! {
    /// Property: a chain of `+` over identifiers is one left-leaning binary tree
    #[test]
    fn sums_parse_cleanly(names in prop::collection::vec(identifier(), 1..8)) {
        let result = parse_expr(&names.join(" + "));
        prop_assert!(result.is_correct(), "{:?}", result.issues);
        let Some(AstNode::Expression(root)) = result.root else {
            return Err(TestCaseError::fail("expected an expression root"));
        };
        let mut depth = 0;
        let mut node = &root.node;
        while let Expr::Binary(left, BinaryOp::Add, _) = node {
            depth += 1;
            node = &left.node;
        }
        prop_assert_eq!(depth, names.len() - 1);
        prop_assert!(matches!(node, Expr::Ident(_)));
    }

    /// Property: comparison words are operators in any letter case
    #[test]
    fn comparison_words_are_operators(
        left in identifier(),
        right in identifier(),
        (word, op) in prop_oneof![
            Just(("eq", BinaryOp::Eq)),
            Just(("neq", BinaryOp::NotEq)),
            Just(("gt", BinaryOp::Gt)),
            Just(("lt", BinaryOp::Lt)),
            Just(("gte", BinaryOp::GtEq)),
            Just(("lte", BinaryOp::LtEq)),
            Just(("contains", BinaryOp::Contains)),
        ],
        upper in any::<bool>(),
    ) {
        let word = if upper { word.to_ascii_uppercase() } else { word.to_string() };
        let result = parse_expr(&format!("{left} {word} {right}"));
        prop_assert!(result.is_correct(), "{:?}", result.issues);
        let Some(AstNode::Expression(root)) = result.root else {
            return Err(TestCaseError::fail("expected an expression root"));
        };
        prop_assert!(matches!(root.node, Expr::Binary(_, found, _) if found == op));
    }
}
