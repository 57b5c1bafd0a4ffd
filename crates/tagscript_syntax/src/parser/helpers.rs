/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation, recording every alternative that was tried
/// - Building grammar errors from the expected set and the rule stack (`unexpected`)
/// - Positions (`locate`, `spanned`) and error recovery (`synchronize`)
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Return the token `n` positions ahead without consuming anything.
    fn peek_at(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Return the token after the current token without consuming it.
    fn peek_next(&self) -> &Token {
        self.peek_at(1)
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
            self.expected.clear();
        }
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Return `true` if the current token “matches” `kind`.
    ///
    /// ## Notes
    /// - For ID-carrying tokens (keywords/operators/punctuation), the IDs must match.
    /// - For data-bearing tokens, only the variant is compared.
    fn check(&self, kind: &TokenKind) -> bool {
        match (kind, &self.peek().kind) {
            (TokenKind::Keyword(k1), TokenKind::Keyword(k2)) => k1 == k2,
            (TokenKind::Operator(o1), TokenKind::Operator(o2)) => o1 == o2,
            (TokenKind::Punctuation(p1), TokenKind::Punctuation(p2)) => p1 == p2,
            _ => std::mem::discriminant(kind) == std::mem::discriminant(&self.peek().kind),
        }
    }

    /// Return `true` if the current token is the given keyword.
    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    /// Return `true` if the current token is the given punctuation.
    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    /// Return `true` if the current token is the given operator.
    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    /// Return `true` if the current token is an identifier (or identifier-compatible keyword) spelled `word`.
    fn check_word(&self, word: &str) -> bool {
        self.peek().kind.identifier_like().is_some() && self.token_text(self.peek()).eq_ignore_ascii_case(word)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            self.expected.push(Expected::Keyword(id));
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            self.expected.push(Expected::Punct(id));
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            self.expected.push(Expected::Operator(id));
            false
        }
    }

    fn expect_keyword(&mut self, id: KeywordId) -> PResult<()> {
        if self.match_keyword(id) {
            Ok(())
        } else {
            Err(self.unexpected(&[]))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId) -> PResult<()> {
        if self.match_punct(id) {
            Ok(())
        } else {
            Err(self.unexpected(&[]))
        }
    }

    fn expect_op(&mut self, id: OperatorId) -> PResult<()> {
        if self.match_op(id) {
            Ok(())
        } else {
            Err(self.unexpected(&[]))
        }
    }

    /// Consume a token of the same variant as `kind` (payload ignored).
    fn expect_kind(&mut self, kind: &TokenKind, label: Expected) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(&[label]))
        }
    }

    /// Consume an identifier or identifier-compatible keyword and return its spelling as written.
    fn identifier(&mut self) -> PResult<Ident> {
        if self.peek().kind.identifier_like().is_some() {
            let name = self.token_text(self.peek()).to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected(&[Expected::Identifier]))
        }
    }

    /// Consume any word after `.`/`::`: identifiers and every keyword.
    fn member_name(&mut self) -> PResult<Ident> {
        match &self.peek().kind {
            TokenKind::Ident(_) | TokenKind::Keyword(_) | TokenKind::Operator(_)
                if self.token_text(self.peek()).chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') =>
            {
                let name = self.token_text(self.peek()).to_string();
                self.advance();
                Ok(name)
            }
            TokenKind::Int(digits) => {
                let name = digits.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(&[Expected::Identifier])),
        }
    }

    /// `a.b.c` as one string; `:` joins a prefix (`java:a.b`).
    fn dotted_name(&mut self) -> PResult<String> {
        let mut name = self.identifier()?;
        loop {
            if self.check_punct(PunctuationId::Dot) && self.peek_next().kind.identifier_like().is_some() {
                self.advance();
                name.push('.');
                name.push_str(&self.identifier()?);
            } else if self.check_punct(PunctuationId::Dot) && self.peek_next().kind.is_operator(OperatorId::Star) {
                self.advance();
                self.advance();
                name.push_str(".*");
                break;
            } else if self.check_punct(PunctuationId::Colon) && self.peek_next().kind.identifier_like().is_some() {
                self.advance();
                name.push(':');
                name.push_str(&self.identifier()?);
            } else {
                break;
            }
        }
        Ok(name)
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Grammar error at the current token; `also` joins the alternatives already recorded.
    fn unexpected(&mut self, also: &[Expected]) -> Issue {
        self.expected.extend_from_slice(also);
        let found = self.found_text();
        let message = expected::grammar_error(&self.rules, &self.expected, &found);
        Issue::syntax(message, self.locate(self.peek().span))
    }

    fn found_text(&self) -> String {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            "<EOF>".to_string()
        } else {
            self.token_text(token).to_string()
        }
    }

    /// Record an issue unless the parse was abandoned.
    fn report(&mut self, issue: Issue) {
        if !self.aborted {
            self.issues.push(issue);
        }
    }

    /// Run `f` with `name` pushed on the rule stack.
    fn rule<T>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.rules.push(name);
        let out = f(self);
        self.rules.pop();
        out
    }

    /// Run `f` one nesting level deeper, failing once `max_depth` is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.config.max_depth {
            return Err(self.depth_exceeded());
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn depth_exceeded(&mut self) -> Issue {
        let issue = messages::max_depth(self.config.max_depth, self.locate(self.peek().span));
        if !self.aborted {
            tracing::debug!(limit = self.config.max_depth, "nesting limit reached");
            self.issues.push(issue.clone());
            self.aborted = true;
        }
        issue
    }

    /// Skip ahead to a plausible statement boundary after a failed statement that started at token `start`.
    fn synchronize(&mut self, start: usize) {
        if self.pos == start && !self.is_at_end() && !self.check_punct(PunctuationId::RBrace) {
            self.advance();
        }
        while !self.is_at_end() {
            if self.match_punct(PunctuationId::Semicolon) {
                return;
            }
            if self.check_punct(PunctuationId::RBrace) || self.check(&TokenKind::TemplateIslandEnd) {
                return;
            }
            if let TokenKind::Keyword(id) = self.peek().kind {
                if matches!(
                    id,
                    KeywordId::If
                        | KeywordId::While
                        | KeywordId::Do
                        | KeywordId::For
                        | KeywordId::Switch
                        | KeywordId::Try
                        | KeywordId::Return
                        | KeywordId::Function
                ) {
                    return;
                }
            }
            self.advance();
        }
    }

    // ========================================================================
    // Positions
    // ========================================================================

    fn current_start(&self) -> usize {
        self.peek().span.start
    }

    /// End of the last consumed token, never before `start`.
    fn prev_end(&self, start: usize) -> usize {
        if self.pos == 0 {
            return start;
        }
        self.tokens[self.pos - 1].span.end.max(start)
    }

    /// Document position of a byte span of this parser's text.
    fn locate(&self, span: Span) -> Position {
        let start = self.offset.apply(self.line_index.point(self.text, span.start));
        let end = self.offset.apply(self.line_index.point(self.text, span.end));
        Position::new(start, end, self.source.clone())
    }

    fn slice(&self, span: Span) -> String {
        self.text.get(span.start..span.end).unwrap_or("").to_string()
    }

    fn token_text(&self, token: &Token) -> &'a str {
        token.text(self.text)
    }

    /// Wrap `node` with the location running from byte `start` to the last consumed token.
    fn spanned<T>(&self, node: T, start: usize) -> Spanned<T> {
        let span = Span::new(start, self.prev_end(start));
        self.node_at(node, span)
    }

    fn node_at<T>(&self, node: T, span: Span) -> Spanned<T> {
        Spanned::new(node, self.locate(span), self.slice(span), span)
    }

    /// Whether a line break separates the previous token from the current one.
    fn on_new_line(&self) -> bool {
        if self.pos == 0 {
            return false;
        }
        let from = self.tokens[self.pos - 1].span.end;
        let to = self.current_start();
        self.text.get(from..to).is_some_and(|gap| gap.contains('\n'))
    }
}
