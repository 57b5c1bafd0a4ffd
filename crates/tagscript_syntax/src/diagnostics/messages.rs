//! Issue constructors.
//!
//! All user-facing message text lives here so wording stays consistent between the lexer checks, the parsers and the
//! normalizer.

use super::Issue;
use crate::lexer::Mode;
use crate::source::Position;

// ============================================================================
// Lexical non-termination
// ============================================================================

pub fn unclosed_output_tag(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed output tag on line {line}"), pos)
}

pub fn unclosed_tag(name: &str, line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed tag [{name}] starting on line {line}"), pos)
}

pub fn unclosed_tag_expression(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed expression inside an opening tag on line {line}"), pos)
}

pub fn unclosed_tag_comment(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed tag comment on line {line}"), pos)
}

pub fn unclosed_comment(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed comment on line {line}"), pos)
}

pub fn unterminated_hash(pos: Position) -> Issue {
    Issue::lexical("Unterminated hash expression inside of string literal.", pos)
}

pub fn unterminated_quote(pos: Position) -> Issue {
    Issue::lexical("Unterminated quote expression.", pos)
}

pub fn unterminated_single_quote(pos: Position) -> Issue {
    Issue::lexical("Unterminated single quote expression.", pos)
}

pub fn unclosed_script_island(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed script island on line {line}"), pos)
}

pub fn unclosed_template_island(line: u32, pos: Position) -> Issue {
    Issue::lexical(format!("Unclosed template island on line {line}"), pos)
}

pub fn unpopped_modes(modes: &[Mode], pos: Position) -> Issue {
    let names: Vec<&str> = modes.iter().map(|m| m.name()).collect();
    Issue::lexical(format!("Invalid Syntax. (Unpopped modes) [{}]", names.join(", ")), pos)
}

// ============================================================================
// Trailing input and unclosed brackets
// ============================================================================

pub fn extra_chars(text: &str, pos: Position) -> Issue {
    Issue::syntax(format!("Extra char(s) [{text}] at the end of parsing."), pos)
}

pub fn unclosed_brace(line: u32, pos: Position) -> Issue {
    Issue::syntax(format!("Unclosed curly brace [{{] on line {line}"), pos)
}

pub fn unclosed_paren(line: u32, pos: Position) -> Issue {
    Issue::syntax(format!("Unclosed parenthesis [(] on line {line}"), pos)
}

pub fn max_depth(limit: usize, pos: Position) -> Issue {
    Issue::semantic(format!("Maximum nesting depth of {limit} exceeded"), pos)
}

// ============================================================================
// Semantic checks during parse
// ============================================================================

pub fn unexpected_expression_end(pos: Position) -> Issue {
    Issue::semantic("Unexpected end of expression", pos)
}

pub fn invalid_dot_access(text: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Invalid dot access: [{text}] cannot be accessed with a dot"), pos)
}

pub fn invalid_index_access(text: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Invalid index access: [{text}] cannot be indexed"), pos)
}

pub fn invalid_assignment_target(text: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Invalid assignment target [{text}]"), pos)
}

pub fn invalid_doc_annotation(pos: Position) -> Issue {
    Issue::syntax("Expected an annotation name after [@]", pos)
}

// ============================================================================
// Component bodies and attributes
// ============================================================================

pub fn requires_body(name: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Component [{name}] requires a body."), pos)
}

pub fn end_without_start(name: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Found end component [{name}] without matching start component"), pos)
}

pub fn body_not_allowed(name: &str, pos: Position) -> Issue {
    Issue::semantic(format!("The [{name}] component does not allow a body"), pos)
}

pub fn marker_outside(name: &str, parent: &str, pos: Position) -> Issue {
    Issue::semantic(format!("The [{name}] component must be inside an [{parent}] component"), pos)
}

pub fn missing_attribute(attribute: &str, component: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Missing {attribute} attribute on {component} component"), pos)
}

pub fn empty_attribute(name: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Attribute [{name}] cannot be empty"), pos)
}

pub fn attribute_not_string(name: &str, pos: Position) -> Issue {
    Issue::semantic(format!("Attribute [{name}] attribute must be a string literal"), pos)
}

pub fn switch_body_only_cases(pos: Position) -> Issue {
    Issue::semantic("Switch body can only contain case statements", pos)
}

pub fn island_not_class(pos: Position) -> Issue {
    Issue::semantic("Expected a class or interface in script island", pos)
}
