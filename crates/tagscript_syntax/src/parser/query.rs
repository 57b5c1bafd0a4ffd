/// Query dialect parsing.
///
/// A single `SELECT` statement. Every query word arrives as an identifier token and is matched
/// case-insensitively here; the expression grammar is the usual SQL ladder (`OR`, `AND`, `NOT`, predicates,
/// additive, multiplicative, unary) built from the canonical [`Expr`] vocabulary.
impl<'a> Parser<'a> {
    fn query_document(&mut self) -> Option<AstNode> {
        match self.rule("select statement", |p| p.select()) {
            Ok(select) => {
                while self.match_punct(PunctuationId::Semicolon) {}
                Some(AstNode::Query(select))
            }
            Err(issue) => {
                self.report(issue);
                None
            }
        }
    }

    // ========================================================================
    // Words
    // ========================================================================

    fn match_word(&mut self, word: &'static str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            self.expected.push(Expected::Word(word));
            false
        }
    }

    fn expect_word(&mut self, word: &'static str) -> PResult<()> {
        if self.match_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(&[]))
        }
    }

    /// Whether the current token is a bare word that can name or alias something.
    fn at_query_name(&self) -> bool {
        match &self.peek().kind {
            TokenKind::QuotedIdent(_) => true,
            TokenKind::Ident(_) => !is_reserved_query_word(self.token_text(self.peek())),
            _ => false,
        }
    }

    fn query_name(&mut self) -> PResult<Ident> {
        match self.peek().kind.clone() {
            TokenKind::QuotedIdent(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Ident(_) => {
                let name = self.token_text(self.peek()).to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(&[Expected::Identifier])),
        }
    }

    /// `AS alias` or a bare alias.
    fn query_alias(&mut self) -> PResult<Option<Ident>> {
        if self.match_word("AS") {
            return self.query_name().map(Some);
        }
        if self.at_query_name() {
            return self.query_name().map(Some);
        }
        Ok(None)
    }

    // ========================================================================
    // Clauses
    // ========================================================================

    fn select(&mut self) -> PResult<Spanned<Select>> {
        let start = self.current_start();
        self.expect_word("SELECT")?;
        let distinct = self.match_word("DISTINCT");

        let mut items = Vec::new();
        loop {
            items.push(self.select_item()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        self.expect_word("FROM")?;
        let mut from = Vec::new();
        loop {
            from.push(self.table_ref()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        let filter = if self.match_word("WHERE") {
            Some(self.query_expression()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.match_word("GROUP") {
            self.expect_word("BY")?;
            loop {
                group_by.push(self.query_expression()?);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
        }

        let having = if self.match_word("HAVING") {
            Some(self.query_expression()?)
        } else {
            None
        };

        let mut order_by = Vec::new();
        if self.match_word("ORDER") {
            self.expect_word("BY")?;
            loop {
                let at = self.current_start();
                let expr = self.query_expression()?;
                let descending = if self.match_word("DESC") {
                    true
                } else {
                    self.match_word("ASC");
                    false
                };
                order_by.push(self.spanned(OrderBy { expr, descending }, at));
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
        }

        let limit = if self.match_word("LIMIT") {
            Some(self.query_primary()?)
        } else {
            None
        };

        Ok(self.spanned(
            Select {
                distinct,
                items,
                from,
                filter,
                group_by,
                having,
                order_by,
                limit,
            },
            start,
        ))
    }

    /// `*`, `t.*` or `expr [[AS] alias]`
    fn select_item(&mut self) -> PResult<Spanned<SelectItem>> {
        let start = self.current_start();
        if self.check_op(OperatorId::Star) {
            self.advance();
            let expr = self.spanned(Expr::Star, start);
            return Ok(self.spanned(SelectItem { expr, alias: None }, start));
        }
        let expr = self.query_expression()?;
        let alias = self.query_alias()?;
        Ok(self.spanned(SelectItem { expr, alias }, start))
    }

    /// `name[.name] [[AS] alias]`
    fn table_ref(&mut self) -> PResult<Spanned<TableRef>> {
        let start = self.current_start();
        let mut name = self.query_name()?;
        while self.match_punct(PunctuationId::Dot) {
            name.push('.');
            name.push_str(&self.query_name()?);
        }
        let alias = self.query_alias()?;
        Ok(self.spanned(TableRef { name, alias }, start))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn query_expression(&mut self) -> PResult<Spanned<Expr>> {
        self.nested(|p| p.query_or())
    }

    fn query_or(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut left = self.query_and()?;
        while self.match_word("OR") {
            let right = self.query_and()?;
            left = self.spanned(Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right)), start);
        }
        Ok(left)
    }

    fn query_and(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut left = self.query_not()?;
        while self.match_word("AND") {
            let right = self.query_not()?;
            left = self.spanned(Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right)), start);
        }
        Ok(left)
    }

    fn query_not(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        if self.match_word("NOT") {
            let operand = self.nested(|p| p.query_not())?;
            return Ok(self.spanned(Expr::Unary(UnaryOp::Not, Box::new(operand)), start));
        }
        self.query_predicate()
    }

    /// Comparisons, `[NOT] LIKE`, `[NOT] IN (...)`, `[NOT] BETWEEN a AND b` and `IS [NOT] NULL`.
    fn query_predicate(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let left = self.query_additive()?;

        let comparison = match self.peek().kind.operator_id() {
            Some(OperatorId::Assign) => Some(BinaryOp::Eq),
            Some(OperatorId::NotEq) => Some(BinaryOp::NotEq),
            Some(OperatorId::Lt) => Some(BinaryOp::Lt),
            Some(OperatorId::LtEq) => Some(BinaryOp::LtEq),
            Some(OperatorId::Gt) => Some(BinaryOp::Gt),
            Some(OperatorId::GtEq) => Some(BinaryOp::GtEq),
            _ => None,
        };
        if let Some(op) = comparison {
            self.advance();
            let right = self.query_additive()?;
            return Ok(self.spanned(Expr::Binary(Box::new(left), op, Box::new(right)), start));
        }

        if self.match_word("IS") {
            let negated = self.match_word("NOT");
            self.expect_word("NULL")?;
            let node = Expr::IsNull {
                expr: Box::new(left),
                negated,
            };
            return Ok(self.spanned(node, start));
        }

        let negated = self.check_word("NOT")
            && ["LIKE", "IN", "BETWEEN"]
                .iter()
                .any(|w| self.peek_next().text(self.text).eq_ignore_ascii_case(w));
        if negated {
            self.advance();
        }
        if self.match_word("LIKE") {
            let right = self.query_additive()?;
            let op = if negated { BinaryOp::NotLike } else { BinaryOp::Like };
            return Ok(self.spanned(Expr::Binary(Box::new(left), op, Box::new(right)), start));
        }
        if self.match_word("IN") {
            self.expect_punct(PunctuationId::LParen)?;
            let mut items = Vec::new();
            if !self.check_punct(PunctuationId::RParen) {
                loop {
                    items.push(self.query_expression()?);
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
            }
            self.expect_punct(PunctuationId::RParen)?;
            let node = Expr::InList {
                expr: Box::new(left),
                items,
                negated,
            };
            return Ok(self.spanned(node, start));
        }
        if self.match_word("BETWEEN") {
            let low = self.query_additive()?;
            self.expect_word("AND")?;
            let high = self.query_additive()?;
            let node = Expr::Between {
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            };
            return Ok(self.spanned(node, start));
        }
        if negated {
            return Err(self.unexpected(&[Expected::Word("LIKE"), Expected::Word("IN"), Expected::Word("BETWEEN")]));
        }
        Ok(left)
    }

    fn query_additive(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut left = self.query_multiplicative()?;
        loop {
            let op = match self.peek().kind.operator_id() {
                Some(OperatorId::Plus) => BinaryOp::Add,
                Some(OperatorId::Minus) => BinaryOp::Sub,
                Some(OperatorId::PipePipe) => BinaryOp::Concat,
                _ => break,
            };
            self.advance();
            let right = self.query_multiplicative()?;
            left = self.spanned(Expr::Binary(Box::new(left), op, Box::new(right)), start);
        }
        Ok(left)
    }

    fn query_multiplicative(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut left = self.query_unary()?;
        loop {
            let op = match self.peek().kind.operator_id() {
                Some(OperatorId::Star) => BinaryOp::Mul,
                Some(OperatorId::Slash) => BinaryOp::Div,
                Some(OperatorId::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.query_unary()?;
            left = self.spanned(Expr::Binary(Box::new(left), op, Box::new(right)), start);
        }
        Ok(left)
    }

    fn query_unary(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let op = match self.peek().kind.operator_id() {
            Some(OperatorId::Minus) => UnaryOp::Neg,
            Some(OperatorId::Plus) => UnaryOp::Plus,
            _ => return self.query_primary(),
        };
        self.advance();
        let operand = self.nested(|p| p.query_unary())?;
        Ok(self.spanned(Expr::Unary(op, Box::new(operand)), start))
    }

    fn query_primary(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let node = match self.peek().kind.clone() {
            TokenKind::Int(digits) => {
                self.advance();
                Expr::Int(digits)
            }
            TokenKind::Float(digits) => {
                self.advance();
                Expr::Float(digits)
            }
            TokenKind::QueryString(raw) => {
                self.advance();
                Expr::Str(StringLit::plain(Some('\''), raw.replace("''", "'")))
            }
            TokenKind::Placeholder(name) => {
                self.advance();
                Expr::Placeholder(if name == "?" { None } else { Some(name) })
            }
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.query_expression()?;
                self.expect_punct(PunctuationId::RParen)?;
                inner.node
            }
            TokenKind::QuotedIdent(name) => {
                self.advance();
                Expr::Ident(name)
            }
            TokenKind::Ident(_) => {
                let word = self.token_text(self.peek()).to_string();
                self.advance();
                match word.to_ascii_lowercase().as_str() {
                    "null" => Expr::Null,
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    _ if self.check_punct(PunctuationId::LParen) => {
                        let callee = self.spanned(Expr::Ident(word), start);
                        let args = self.query_arguments()?;
                        Expr::Call {
                            callee: Box::new(callee),
                            args,
                        }
                    }
                    _ => return self.query_column(Expr::Ident(word), start),
                }
            }
            _ => return Err(self.unexpected(&[Expected::Expression])),
        };
        Ok(self.spanned(node, start))
    }

    /// `t.col`, `t.*` and deeper qualification.
    fn query_column(&mut self, first: Expr, start: usize) -> PResult<Spanned<Expr>> {
        let mut expr = self.spanned(first, start);
        while self.match_punct(PunctuationId::Dot) {
            let name = if self.check_op(OperatorId::Star) {
                self.advance();
                "*".to_string()
            } else {
                self.query_name()?
            };
            expr = self.spanned(
                Expr::Dot {
                    object: Box::new(expr),
                    name,
                    safe: false,
                },
                start,
            );
        }
        Ok(expr)
    }

    /// `(args)`; `count(*)` and `count(DISTINCT x)` are accepted.
    fn query_arguments(&mut self) -> PResult<Vec<Argument>> {
        self.rule("function call", |p| {
            p.expect_punct(PunctuationId::LParen)?;
            let mut args = Vec::new();
            p.match_word("DISTINCT");
            if !p.check_punct(PunctuationId::RParen) {
                loop {
                    let value = if p.check_op(OperatorId::Star) {
                        let at = p.current_start();
                        p.advance();
                        p.spanned(Expr::Star, at)
                    } else {
                        p.query_expression()?
                    };
                    args.push(Argument { name: None, value });
                    if !p.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
            }
            p.expect_punct(PunctuationId::RParen)?;
            Ok(args)
        })
    }
}

/// Words that end a select item or table reference instead of aliasing it.
const RESERVED_QUERY_WORDS: &[&str] = &[
    "from", "where", "group", "having", "order", "limit", "as", "and", "or", "not", "on", "union", "asc", "desc",
    "by", "like", "in", "is", "between", "null", "join", "inner", "left", "right", "outer",
];

fn is_reserved_query_word(word: &str) -> bool {
    RESERVED_QUERY_WORDS.iter().any(|w| w.eq_ignore_ascii_case(word))
}
