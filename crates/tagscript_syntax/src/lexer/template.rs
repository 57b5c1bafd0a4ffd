//! Template-mode scanning: markup text, tag heads, `output` bodies, islands and tag comments.

use super::{Lexer, Mode, TokenKind, is_ident_continue, is_ident_start};
use tagscript_core::Flavor;
use tagscript_core::lang::operators::OperatorId;

/// Tags whose head is a raw script expression rather than an attribute list.
const EXPRESSION_TAGS: &[&str] = &["set", "if", "elseif", "return"];

impl<'a> Lexer<'a> {
    /// Length of the flavor prefix if a tag name starts `at` bytes from the current position.
    ///
    /// `<cfif` matches for `Cf` (prefix `cf` followed by a letter), `<bx:if` for `Box`.
    pub(super) fn tag_start_len(&self, at: usize) -> Option<usize> {
        let rest = self.rest().get(at..)?;
        let prefix = self.flavor.tag_prefix();
        let head = rest.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        rest[prefix.len()..]
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|_| prefix.len())
    }

    pub(super) fn scan_template(&mut self) {
        let start = self.pos;
        let top = self.modes.top();

        if self.starts_with("<!---") {
            self.scan_tag_comment();
        } else if self.starts_with("</") && self.tag_start_len(2).is_some() {
            self.advance_bytes(2);
            self.add_token(TokenKind::ComponentSlashOpen, start);
            self.scan_tag_name(true);
        } else if self.starts_with("<") && self.tag_start_len(1).is_some() {
            self.advance();
            self.add_token(TokenKind::ComponentOpen, start);
            self.scan_tag_name(false);
        } else if top == Mode::Output && self.starts_with("#") && !self.starts_with("##") {
            self.advance();
            self.add_token(TokenKind::Hash, start);
            self.modes.push(Mode::Hash);
        } else if top == Mode::TemplateIsland && self.starts_with("```") {
            self.advance_bytes(3);
            self.add_token(TokenKind::TemplateIslandEnd, start);
            self.modes.pop();
        } else {
            self.scan_content_text(start);
        }
    }

    /// Consume text up to the next position where any template construct could start.
    fn scan_content_text(&mut self, start: usize) {
        let top = self.modes.top();
        while let Some(c) = self.peek() {
            if self.pos > start && self.at_template_boundary(c, top) {
                break;
            }
            if top == Mode::Output && self.starts_with("##") {
                self.advance_bytes(2);
                continue;
            }
            self.advance();
        }
        let text = self.source[start..self.pos].to_string();
        self.add_token(TokenKind::ContentText(text), start);
    }

    fn at_template_boundary(&self, c: char, top: Mode) -> bool {
        match c {
            '<' => {
                self.starts_with("<!---")
                    || self.tag_start_len(1).is_some()
                    || (self.starts_with("</") && self.tag_start_len(2).is_some())
            }
            '#' => top == Mode::Output && !self.starts_with("##"),
            '`' => top == Mode::TemplateIsland && self.starts_with("```"),
            _ => false,
        }
    }

    /// Scan `prefix name` after `<` or `</` and enter the matching head mode.
    pub(super) fn scan_tag_name(&mut self, closing: bool) {
        let prefix_start = self.pos;
        let prefix_len = self.tag_start_len(0).unwrap_or(0);
        self.advance_bytes(prefix_len);
        let prefix = self.source[prefix_start..self.pos].to_string();
        self.add_token(TokenKind::Prefix(prefix), prefix_start);

        let name_start = self.pos;
        self.eat_while(is_ident_continue);
        let name = self.source[name_start..self.pos].to_string();
        let lower = name.to_ascii_lowercase();
        self.add_token(TokenKind::ComponentName(name), name_start);

        if closing && lower == "output" && self.modes.top() == Mode::Output {
            self.modes.pop();
        }
        if !closing && EXPRESSION_TAGS.contains(&lower.as_str()) {
            self.modes.push(Mode::TagExpression);
        } else {
            self.modes.push(Mode::TagHead);
        }
        self.after_equals = false;
        self.open_tag = Some((lower, closing));
    }

    pub(super) fn scan_tag_head(&mut self) {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return;
        };
        match c {
            c if c.is_whitespace() => self.scan_whitespace(start),
            '>' => {
                self.advance();
                self.add_token(TokenKind::ComponentClose, start);
                self.modes.pop();
                self.after_tag_close();
            }
            '/' if self.peek_at(1) == Some('>') => {
                self.advance_bytes(2);
                self.add_token(TokenKind::ComponentSlashClose, start);
                self.modes.pop();
                self.open_tag = None;
            }
            '=' => {
                self.advance();
                self.add_op(OperatorId::Assign, start);
                self.after_equals = true;
            }
            '"' | '\'' => {
                self.advance();
                self.add_token(TokenKind::OpenQuote(c), start);
                self.modes.push(if c == '"' { Mode::DoubleQuote } else { Mode::SingleQuote });
                self.after_equals = false;
            }
            '#' => {
                self.advance();
                self.add_token(TokenKind::Hash, start);
                self.modes.push(Mode::Hash);
                self.after_equals = false;
            }
            _ if self.after_equals => {
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' || self.starts_with("/>") {
                        break;
                    }
                    self.advance();
                }
                let value = self.source[start..self.pos].to_string();
                self.add_token(TokenKind::UnquotedValue(value), start);
                self.after_equals = false;
            }
            c if is_ident_start(c) => {
                self.eat_while(|c| is_ident_continue(c) || matches!(c, '-' | ':' | '.'));
                let name = self.source[start..self.pos].to_string();
                self.add_token(TokenKind::AttrName(name), start);
            }
            _ => self.bump_unknown(),
        }
    }

    /// Enter the body mode an opening tag requires (`output`, `script`).
    fn after_tag_close(&mut self) {
        match self.open_tag.take() {
            Some((name, false)) if name == "output" => self.modes.push(Mode::Output),
            Some((name, false)) if name == "script" => self.modes.push(Mode::ScriptIsland),
            _ => {}
        }
    }

    /// Consume the raw body of a script island up to (not including) its closing tag.
    pub(super) fn scan_script_island(&mut self) {
        let start = self.pos;
        let closer = match self.flavor {
            Flavor::Box => "</bx:script",
            Flavor::Cf => "</cfscript",
        };
        let lower = self.rest().to_ascii_lowercase();
        match lower.find(closer) {
            Some(end) => {
                self.advance_bytes(end);
                if self.pos > start {
                    let text = self.source[start..self.pos].to_string();
                    self.add_token(TokenKind::IslandText(text), start);
                }
                self.modes.pop();
            }
            None => {
                self.pos = self.source.len();
                let text = self.source[start..].to_string();
                self.add_token(TokenKind::IslandText(text), start);
            }
        }
    }

    /// Scan a nestable `<!--- ... --->` comment.
    fn scan_tag_comment(&mut self) {
        let start = self.pos;
        self.modes.push(Mode::TagComment);
        self.advance_bytes(5);
        let mut depth = 1usize;
        while !self.is_at_end() {
            if self.starts_with("<!---") {
                depth += 1;
                self.advance_bytes(5);
            } else if self.starts_with("--->") {
                depth -= 1;
                self.advance_bytes(4);
                if depth == 0 {
                    self.modes.pop();
                    break;
                }
            } else {
                self.advance();
            }
        }
        self.add_token(TokenKind::TagComment, start);
    }
}
