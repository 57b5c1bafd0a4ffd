//! Comment text cleaning and comment-to-statement association.
//!
//! Comments never reach the grammar; the parser pulls them from a rescan of the token stream once the tree is
//! built. This module owns the two steps around that:
//!
//! - turning raw comment text into its content (delimiters and `*` gutters removed), and
//! - attaching each comment to the statement it describes, after the outermost parse.
//!
//! ## Notes
//! - A comment attaches to the first statement that starts after it in the innermost statement list containing
//!   it. With no following statement it goes to the last one; with an empty list it goes to the root.
//! - A doc comment attached to a function, property or class also fills that declaration's `documentation`.
//!   Entries named after a parameter (`@name`, `@name.key`) go to the parameter instead.

use crate::ast::*;
use crate::source::Span;

// ============================================================================
// Text
// ============================================================================

/// Byte ranges of the content of each line of a block, doc or tag comment.
///
/// The opener (`/*`, `/**`, `<!---`) and closer (`*/`, `--->`) are dropped and every line is trimmed. Lines other
/// than the first and last also lose one leading `*`, unless they start with `**`.
pub(crate) fn content_lines(raw: &str) -> Vec<Span> {
    let lead = raw.len() - raw.trim_start().len();
    let body = raw.trim();
    let closer = if body.ends_with("--->") {
        4
    } else if body.ends_with("*/") {
        2
    } else {
        0
    };
    let opener = if body.starts_with("<!---") {
        5
    } else if body.starts_with("/**") {
        3
    } else if body.starts_with("/*") {
        2
    } else {
        0
    };
    let opener = opener.min(body.len() - closer);
    let inner_start = lead + opener;
    let inner_end = lead + body.len() - closer;

    let inner = &raw[inner_start..inner_end];
    let count = inner.split('\n').count();
    let mut lines = Vec::with_capacity(count);
    let mut offset = inner_start;
    for (i, line) in inner.split('\n').enumerate() {
        let next = offset + line.len() + 1;
        let mut start = offset + (line.len() - line.trim_start().len());
        let end = offset + line.trim_end().len();
        let trimmed = &raw[start..end.max(start)];
        if i != 0 && i != count - 1 && trimmed.starts_with('*') && !trimmed.starts_with("**") {
            start += 1;
            start += raw[start..end].len() - raw[start..end].trim_start().len();
        }
        lines.push(Span::new(start, end.max(start)));
        offset = next;
    }
    lines
}

/// Content of a block, doc or tag comment, lines joined with `\n`.
pub fn clean_text(raw: &str) -> String {
    content_lines(raw)
        .iter()
        .map(|span| &raw[span.start..span.end])
        .collect::<Vec<_>>()
        .join("\n")
}

/// Content of a `// ...` or `-- ...` comment.
pub fn line_text(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix("//")
        .or_else(|| raw.strip_prefix("--"))
        .unwrap_or(raw)
        .trim()
        .to_string()
}

// ============================================================================
// Association
// ============================================================================

/// Attach every comment to the statement (or declaration) it belongs to.
pub fn associate(root: &mut AstNode, comments: &[Comment]) {
    for comment in comments {
        match root {
            AstNode::Script(script) => {
                if !attach(&mut script.node.statements, comment) {
                    script.comments.push(comment.clone());
                }
            }
            AstNode::Class(class) => attach_to_class(class, comment),
            AstNode::Interface(interface) => {
                let before = comment.pos.precedes(&interface.pos);
                if before || !attach(&mut interface.node.body, comment) {
                    if let Some(doc) = &comment.documentation {
                        interface.node.documentation.extend(doc.annotations.iter().cloned());
                    }
                    interface.comments.push(comment.clone());
                }
            }
            AstNode::Statement(stmt) => {
                if !attach(std::slice::from_mut(stmt), comment) {
                    stmt.comments.push(comment.clone());
                }
            }
            AstNode::Expression(expr) => expr.comments.push(comment.clone()),
            AstNode::Query(select) => select.comments.push(comment.clone()),
            AstNode::Doc(doc) => doc.comments.push(comment.clone()),
        }
    }
}

fn attach_to_class(class: &mut Spanned<ClassDecl>, comment: &Comment) {
    if comment.pos.precedes(&class.pos) {
        if let Some(doc) = &comment.documentation {
            class.node.documentation.extend(doc.annotations.iter().cloned());
        }
        class.comments.push(comment.clone());
        return;
    }
    let inside = class.node.body.iter().any(|s| s.pos.contains(&comment.pos));
    let next_statement = class.node.body.iter().find(|s| comment.pos.precedes(&s.pos)).map(|s| s.pos.start);
    let next_property = class.node.properties.iter_mut().find(|p| comment.pos.precedes(&p.pos));
    if let Some(property) = next_property {
        if !inside && next_statement.is_none_or(|start| property.pos.start < start) {
            if let Some(doc) = &comment.documentation {
                property.node.documentation.extend(doc.annotations.iter().cloned());
            }
            property.comments.push(comment.clone());
            return;
        }
    }
    if !attach(&mut class.node.body, comment) {
        class.comments.push(comment.clone());
    }
}

/// Attach `comment` inside `list`; `false` when the list is empty.
fn attach(list: &mut [Spanned<Stmt>], comment: &Comment) -> bool {
    if let Some(index) = list.iter().position(|s| s.pos.contains(&comment.pos)) {
        let stmt = &mut list[index];
        // The first owned list that still has a statement ending after the comment, else the last non-empty one.
        let choice = {
            let bodies = stmt.node.bodies_mut();
            bodies
                .iter()
                .position(|body| body.iter().any(|s| !s.pos.precedes(&comment.pos)))
                .or_else(|| bodies.iter().rposition(|body| !body.is_empty()))
        };
        if let Some(choice) = choice {
            let mut bodies = stmt.node.bodies_mut();
            return attach(bodies[choice].as_mut_slice(), comment);
        }
        attach_to(stmt, comment);
        return true;
    }
    let target = match list.iter().position(|s| comment.pos.precedes(&s.pos)) {
        Some(index) => index,
        None if list.is_empty() => return false,
        None => list.len() - 1,
    };
    attach_to(&mut list[target], comment);
    true
}

fn attach_to(stmt: &mut Spanned<Stmt>, comment: &Comment) {
    if let (Stmt::Function(function), Some(doc)) = (&mut stmt.node, &comment.documentation) {
        document_function(function, doc);
    }
    stmt.comments.push(comment.clone());
}

/// Split doc entries between the function and its parameters.
fn document_function(function: &mut FunctionDecl, doc: &Documentation) {
    for entry in &doc.annotations {
        let (arg_name, key) = match entry.node.name.split_once('.') {
            Some((arg, key)) => (arg, key),
            None => (entry.node.name.as_str(), "hint"),
        };
        let arg = function
            .args
            .iter_mut()
            .find(|a| a.node.name.eq_ignore_ascii_case(arg_name));
        match arg {
            Some(arg) => {
                let mut entry = entry.clone();
                entry.node.name = key.to_string();
                arg.node.documentation.push(entry);
            }
            None => function.documentation.push(entry.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_comment_gutters_are_stripped() {
        let raw = "/*\n * first\n * second\n */";
        assert_eq!(clean_text(raw), "\nfirst\nsecond\n");
    }

    #[test]
    fn double_star_lines_keep_their_stars() {
        let raw = "/**\n ** bold\n * plain\n */";
        assert_eq!(clean_text(raw), "\n** bold\nplain\n");
    }

    #[test]
    fn single_line_comments() {
        assert_eq!(clean_text("/* hello */"), "hello");
        assert_eq!(clean_text("/** doc */"), "doc");
        assert_eq!(clean_text("<!--- tag --->"), "tag");
        assert_eq!(clean_text("/**/"), "");
        assert_eq!(line_text("// note  "), "note");
        assert_eq!(line_text("-- query note"), "query note");
    }

    #[test]
    fn content_lines_are_byte_ranges_of_the_input() {
        let raw = "/**\n * Adds.\n * @x the x\n */";
        let lines: Vec<&str> = content_lines(raw).iter().map(|s| &raw[s.start..s.end]).collect();
        assert_eq!(lines, vec!["", "Adds.", "@x the x", ""]);
    }
}
