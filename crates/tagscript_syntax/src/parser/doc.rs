/// Documentation comments and comment extraction.
///
/// The doc dialect has no tokens: `doc_document` works line by line on the cleaned comment content (see
/// [`comments::content_lines`]). Free text before the first `@name` line is the description; each `@name value`
/// line starts an entry and following lines continue it.
impl<'a> Parser<'a> {
    fn doc_document(&mut self) -> AstNode {
        let mut description: Vec<Span> = Vec::new();
        let mut entries: Vec<DocEntry> = Vec::new();
        let text = self.text;
        for line in comments::content_lines(text) {
            let content = &text[line.start..line.end];
            if let Some(rest) = content.strip_prefix('@') {
                let name_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
                if name_len == 0 {
                    let issue = messages::invalid_doc_annotation(self.locate(Span::new(line.start, line.start + 1)));
                    self.report(issue);
                    continue;
                }
                let after_name = line.start + 1 + name_len;
                let value = &text[after_name..line.end];
                let value_start = after_name + (value.len() - value.trim_start().len());
                entries.push(DocEntry {
                    name: rest[..name_len].to_string(),
                    start: line.start,
                    value: vec![Span::new(value_start, line.end)],
                });
            } else if let Some(entry) = entries.last_mut() {
                if !content.is_empty() {
                    entry.value.push(line);
                }
            } else if !content.is_empty() {
                description.push(line);
            }
        }

        let mut annotations: Vec<Spanned<Annotation>> = entries.into_iter().map(|entry| self.doc_entry(entry)).collect();
        if let (Some(first), Some(last)) = (description.first(), description.last()) {
            let span = Span::new(first.start, last.end);
            let text = self.joined_lines(&description);
            let value = self.node_at(Expr::Str(StringLit::plain(None, text)), span);
            annotations.push(self.node_at(
                Annotation {
                    name: "hint".to_string(),
                    value: Some(value),
                },
                span,
            ));
        }
        let span = self.whole_span();
        AstNode::Doc(self.node_at(Documentation { annotations }, span))
    }

    fn doc_entry(&self, entry: DocEntry) -> Spanned<Annotation> {
        let first = entry.value.first().copied().unwrap_or(Span::new(entry.start, entry.start));
        let last = entry.value.last().copied().unwrap_or(first);
        let value_span = Span::new(first.start, last.end.max(first.start));
        let value = self.node_at(Expr::Str(StringLit::plain(None, self.joined_lines(&entry.value))), value_span);
        self.node_at(
            Annotation {
                name: entry.name,
                value: Some(value),
            },
            Span::new(entry.start, value_span.end),
        )
    }

    fn joined_lines(&self, lines: &[Span]) -> String {
        lines
            .iter()
            .map(|span| &self.text[span.start..span.end])
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========================================================================
    // Comment extraction
    // ========================================================================

    /// Collect every comment of the text from a rescan. Doc comments are parsed through a fragment parser.
    fn collect_comments(&mut self) {
        if self.entry == EntryPoint::Doc {
            return;
        }
        for token in self.lexer.rescan() {
            let kind = match token.kind {
                TokenKind::LineComment => CommentKind::Line,
                TokenKind::BlockComment | TokenKind::TagComment => CommentKind::Block,
                TokenKind::DocComment => CommentKind::Doc,
                _ => continue,
            };
            let raw = self.token_text(&token);
            let text = match kind {
                CommentKind::Line => comments::line_text(raw),
                _ => comments::clean_text(raw),
            };
            let pos = self.locate(token.span);
            let documentation = match kind {
                CommentKind::Doc => match self.parse_fragment(raw, pos.start, EntryPoint::Doc) {
                    Some(AstNode::Doc(doc)) => Some(doc.node),
                    _ => None,
                },
                _ => None,
            };
            self.comments.push(Comment {
                kind,
                text,
                pos,
                documentation,
            });
        }
    }
}

/// An `@name` entry and the byte ranges of its value lines.
struct DocEntry {
    name: String,
    start: usize,
    value: Vec<Span>,
}
