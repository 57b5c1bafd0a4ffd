/// End-of-parse validation.
///
/// Runs once the entry rule returns, in this order:
/// 1. An unterminated lexical region replaces every syntax issue with a single issue naming the region.
/// 2. Tokens left over become an `Extra char(s)` issue.
/// 3. An unmatched opening bracket replaces generic grammar errors (see [`validate::unclosed_fallback`]).
impl<'a> Parser<'a> {
    fn validate(&mut self) {
        if self.entry == EntryPoint::Doc {
            return;
        }
        let unterminated = {
            let locate = |span: Span| self.locate(span);
            validate::unterminated_construct(&self.lexer, &locate)
        };
        if let Some(issue) = unterminated {
            self.issues.retain(|i| i.kind != IssueKind::Syntax);
            self.issues.insert(0, issue);
            return;
        }

        if !self.aborted && !self.is_at_end() {
            let issue = {
                let locate = |span: Span| self.locate(span);
                validate::extra_chars(&self.lexer, self.current_start(), &locate)
            };
            self.issues.push(issue);
        }

        if !self.aborted {
            let mut issues = std::mem::take(&mut self.issues);
            {
                let locate = |span: Span| self.locate(span);
                validate::unclosed_fallback(&self.lexer, &mut issues, self.entry.fallback_open(), &locate);
            }
            self.issues = issues;
        }
    }
}
