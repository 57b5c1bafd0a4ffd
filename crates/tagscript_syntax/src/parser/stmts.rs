/// Statement parsing methods.
///
/// This chunk parses the script statement forms (`if`, loops, `switch`, `try`, declarations with modifiers,
/// component invocations, template islands) and the `{ ... }` blocks they own.
///
/// ## Notes
/// - A statement ends at `;`, before `}` or end of input, or at a line break.
/// - Component invocations and the component forms of `include`, `param` and `throw` are told apart from
///   expressions by the predicates in `crate::predicates`.
impl<'a> Parser<'a> {
    // ========================================================================
    // Statement lists and blocks
    // ========================================================================

    /// Statements up to end of input, `}` or the end of a template island.
    ///
    /// Grammar failures are reported here and parsing resumes at the next statement boundary.
    fn statement_list(&mut self) -> Vec<Spanned<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            while self.check_punct(PunctuationId::Semicolon) {
                self.advance();
            }
            if self.aborted
                || self.is_at_end()
                || self.check_punct(PunctuationId::RBrace)
                || self.check(&TokenKind::TemplateIslandEnd)
            {
                break;
            }
            let start = self.pos;
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(issue) => {
                    self.report(issue);
                    if self.aborted {
                        break;
                    }
                    self.synchronize(start);
                }
            }
        }
        stmts
    }

    /// `{ statements }`
    fn block(&mut self) -> PResult<Vec<Spanned<Stmt>>> {
        self.expect_punct(PunctuationId::LBrace)?;
        let stmts = self.statement_list();
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(stmts)
    }

    /// A block, or a single statement standing in for one.
    fn body(&mut self) -> PResult<Vec<Spanned<Stmt>>> {
        if self.check_punct(PunctuationId::LBrace) {
            self.block()
        } else {
            Ok(vec![self.statement()?])
        }
    }

    /// Consume a statement terminator.
    fn end_statement(&mut self) -> PResult<()> {
        if self.match_punct(PunctuationId::Semicolon) {
            return Ok(());
        }
        if self.is_at_end()
            || self.check_punct(PunctuationId::RBrace)
            || self.check(&TokenKind::TemplateIslandEnd)
            || self.on_new_line()
        {
            return Ok(());
        }
        Err(self.unexpected(&[Expected::Punct(PunctuationId::RBrace)]))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> PResult<Spanned<Stmt>> {
        self.nested(|p| {
            let start = p.current_start();
            let stmt = p.statement_kind()?;
            Ok(p.spanned(stmt, start))
        })
    }

    fn statement_kind(&mut self) -> PResult<Stmt> {
        let pos = self.pos;

        if self.check_punct(PunctuationId::LBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.check(&TokenKind::TemplateIslandStart) {
            return self.template_island();
        }
        if self.check(&TokenKind::ComponentPrefix) {
            self.advance();
            return self.component_statement();
        }
        if self.check_punct(PunctuationId::At) {
            let annotations = self.pre_annotations()?;
            return Ok(Stmt::Function(self.function_declaration(annotations)?));
        }
        if predicates::is_function_declaration(&self.tokens, pos) {
            return Ok(Stmt::Function(self.function_declaration(Vec::new())?));
        }
        if predicates::is_keyword_used_as_value(&self.tokens, pos) {
            return self.expression_statement();
        }
        if predicates::is_declaration_modifier(&self.tokens, pos) {
            return self.var_statement();
        }

        if let TokenKind::Keyword(id) = self.peek().kind {
            match id {
                KeywordId::If => return self.rule("if statement", |p| p.if_statement()),
                KeywordId::While => return self.rule("while loop", |p| p.while_statement(None)),
                KeywordId::Do => return self.rule("do loop", |p| p.do_statement(None)),
                KeywordId::For => return self.rule("for loop", |p| p.for_statement(None)),
                KeywordId::Switch => return self.rule("switch statement", |p| p.switch_statement()),
                KeywordId::Try => return self.rule("try statement", |p| p.try_statement()),
                KeywordId::Return => return self.return_statement(),
                KeywordId::Break | KeywordId::Continue => return self.jump_statement(id),
                KeywordId::Throw if predicates::is_throw_component(&self.tokens, pos) => {
                    return self.component_statement();
                }
                KeywordId::Throw if predicates::is_throw_statement(&self.tokens, pos) => {
                    return self.throw_statement();
                }
                KeywordId::Rethrow if !self.peek_next().kind.is_punctuation(PunctuationId::LParen) => {
                    self.advance();
                    self.end_statement()?;
                    return Ok(Stmt::Rethrow);
                }
                KeywordId::Include if self.is_component_form() => return self.component_statement(),
                KeywordId::Include => return self.include_statement(),
                KeywordId::Import => return self.import_statement(),
                KeywordId::Param if self.is_component_form() && self.peek_word_at(1, "name") => {
                    return self.component_statement();
                }
                KeywordId::Param => return self.rule("param", |p| p.param_statement()),
                _ => {}
            }
        }

        if predicates::is_labelled_loop(&self.tokens, pos) {
            let label = self.identifier()?;
            self.expect_punct(PunctuationId::Colon)?;
            let label = Some(label);
            return match self.peek().kind.keyword_id() {
                Some(KeywordId::While) => self.rule("while loop", |p| p.while_statement(label)),
                Some(KeywordId::Do) => self.rule("do loop", |p| p.do_statement(label)),
                _ => self.rule("for loop", |p| p.for_statement(label)),
            };
        }
        if predicates::is_typed_declaration(&self.tokens, pos, self.text) {
            return self.typed_declaration();
        }
        if predicates::is_tag_invocation(&self.tokens, pos, self.text, self.registry) {
            return self.component_statement();
        }
        if predicates::is_prefixed_call_component(&self.tokens, pos, self.flavor, self.registry) {
            return self.prefixed_call_component();
        }
        self.expression_statement()
    }

    /// `keyword name=...`: the component form of `include`, `param` and `throw`.
    fn is_component_form(&self) -> bool {
        self.peek_next().kind.identifier_like().is_some() && self.peek_at(2).kind.is_operator(OperatorId::Assign)
    }

    fn peek_word_at(&self, n: usize, word: &str) -> bool {
        let token = self.peek_at(n);
        token.kind.identifier_like().is_some() && self.token_text(token).eq_ignore_ascii_case(word)
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        self.end_statement()?;
        Ok(Stmt::Expr(expr))
    }

    /// `var x = 1`, `final static y = 2`
    fn var_statement(&mut self) -> PResult<Stmt> {
        let modifiers = self.declaration_modifiers();
        let expr = self.expression()?;
        self.end_statement()?;
        Ok(Stmt::Var(split_declaration(modifiers, expr)))
    }

    /// `Query results = queryExecute(sql);`
    fn typed_declaration(&mut self) -> PResult<Stmt> {
        let declared_type = self.identifier()?;
        let expr = self.expression()?;
        self.end_statement()?;
        let mut decl = split_declaration(Vec::new(), expr);
        decl.declared_type = Some(declared_type);
        Ok(Stmt::Var(decl))
    }

    /// Leading `var`, `final` and `static` words.
    fn declaration_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek().kind.keyword_id() {
                Some(KeywordId::Var) => Modifier::Var,
                Some(KeywordId::Final) => Modifier::Final,
                Some(KeywordId::Static) => Modifier::Static,
                _ => break,
            };
            modifiers.push(modifier);
            self.advance();
        }
        modifiers
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::If)?;
        self.expect_punct(PunctuationId::LParen)?;
        let cond = self.expression()?;
        self.expect_punct(PunctuationId::RParen)?;
        let then = self.body()?;
        let otherwise = if self.match_keyword(KeywordId::Else) {
            if self.check_keyword(KeywordId::If) {
                let start = self.current_start();
                let nested = self.nested(|p| p.if_statement())?;
                Some(vec![self.spanned(nested, start)])
            } else {
                Some(self.body()?)
            }
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { cond, then, otherwise }))
    }

    fn while_statement(&mut self, label: Option<Ident>) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::While)?;
        self.expect_punct(PunctuationId::LParen)?;
        let cond = self.expression()?;
        self.expect_punct(PunctuationId::RParen)?;
        let body = self.body()?;
        Ok(Stmt::While(WhileStmt { label, cond, body }))
    }

    fn do_statement(&mut self, label: Option<Ident>) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Do)?;
        let body = self.body()?;
        self.expect_keyword(KeywordId::While)?;
        self.expect_punct(PunctuationId::LParen)?;
        let cond = self.expression()?;
        self.expect_punct(PunctuationId::RParen)?;
        self.end_statement()?;
        Ok(Stmt::DoWhile(WhileStmt { label, cond, body }))
    }

    /// `for (init; cond; step)`, `for (x in coll)` or `for (var x in coll)`.
    fn for_statement(&mut self, label: Option<Ident>) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::For)?;
        self.expect_punct(PunctuationId::LParen)?;

        let declared = self.check_keyword(KeywordId::Var) && self.peek_next().kind.identifier_like().is_some();
        if declared {
            self.advance();
        }
        let init = if self.check_punct(PunctuationId::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        if self.check_keyword(KeywordId::In) {
            if let Some(var) = init {
                self.advance();
                let collection = self.expression()?;
                self.expect_punct(PunctuationId::RParen)?;
                let body = self.body()?;
                return Ok(Stmt::ForIn(ForInStmt {
                    label,
                    declared,
                    var,
                    collection,
                    body,
                }));
            }
        }

        self.expect_punct(PunctuationId::Semicolon)?;
        let cond = if self.check_punct(PunctuationId::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(PunctuationId::Semicolon)?;
        let step = if self.check_punct(PunctuationId::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(PunctuationId::RParen)?;
        let body = self.body()?;
        Ok(Stmt::For(ForStmt {
            label,
            init,
            cond,
            step,
            body,
        }))
    }

    fn switch_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Switch)?;
        self.expect_punct(PunctuationId::LParen)?;
        let subject = self.expression()?;
        self.expect_punct(PunctuationId::RParen)?;
        self.expect_punct(PunctuationId::LBrace)?;

        let mut cases = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let start = self.current_start();
            let value = if self.match_keyword(KeywordId::Case) {
                Some(self.expression()?)
            } else if self.match_keyword(KeywordId::Default) {
                None
            } else {
                return Err(self.unexpected(&[Expected::Punct(PunctuationId::RBrace)]));
            };
            self.expect_punct(PunctuationId::Colon)?;
            let body = self.case_body();
            cases.push(self.spanned(
                SwitchCase {
                    value,
                    delimiter: None,
                    body,
                },
                start,
            ));
        }
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(Stmt::Switch(SwitchStmt { subject, cases }))
    }

    /// Statements of one `case` arm, up to the next `case`, `default` or the closing `}`.
    fn case_body(&mut self) -> Vec<Spanned<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            while self.check_punct(PunctuationId::Semicolon) {
                self.advance();
            }
            let at_label = (self.check_keyword(KeywordId::Case) || self.check_keyword(KeywordId::Default))
                && !predicates::is_keyword_used_as_value(&self.tokens, self.pos);
            if self.aborted || self.is_at_end() || self.check_punct(PunctuationId::RBrace) || at_label {
                break;
            }
            let start = self.pos;
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(issue) => {
                    self.report(issue);
                    if self.aborted {
                        break;
                    }
                    self.synchronize(start);
                }
            }
        }
        stmts
    }

    fn try_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Try)?;
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.check_keyword(KeywordId::Catch) {
            let start = self.current_start();
            let clause = self.rule("catch clause", |p| p.catch_clause())?;
            catches.push(self.spanned(clause, start));
        }
        let finally = if self.match_keyword(KeywordId::Finally) {
            Some(self.block()?)
        } else {
            None
        };
        Ok(Stmt::Try(TryStmt { body, catches, finally }))
    }

    /// `catch (Type1 | Type2 e) { ... }`; a lone name is the variable and the type is `any`.
    fn catch_clause(&mut self) -> PResult<CatchClause> {
        self.expect_keyword(KeywordId::Catch)?;
        self.expect_punct(PunctuationId::LParen)?;
        let mut types = Vec::new();
        loop {
            let start = self.current_start();
            let ty = if matches!(self.peek().kind, TokenKind::OpenQuote(_)) {
                self.string_literal()?
            } else {
                let name = self.dotted_name()?;
                self.spanned(Expr::Str(StringLit::plain(None, name)), start)
            };
            types.push(ty);
            if !self.match_punct(PunctuationId::Pipe) {
                break;
            }
        }

        let var = if self.check_punct(PunctuationId::RParen) && types.len() == 1 {
            let only = types.remove(0);
            let start = only.span.start;
            types.push(self.spanned(Expr::Str(StringLit::plain(None, "any")), start));
            match only.node.as_plain_str() {
                Some(name) => name.to_string(),
                None => return Err(self.unexpected(&[Expected::Identifier])),
            }
        } else {
            self.identifier()?
        };
        self.expect_punct(PunctuationId::RParen)?;
        let body = self.block()?;
        Ok(CatchClause { types, var, body })
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Return)?;
        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.expression()?)
        };
        self.end_statement()?;
        Ok(Stmt::Return(value))
    }

    fn jump_statement(&mut self, id: KeywordId) -> PResult<Stmt> {
        self.advance();
        let label = if !self.at_statement_end() && matches!(self.peek().kind, TokenKind::Ident(_)) {
            Some(self.identifier()?)
        } else {
            None
        };
        self.end_statement()?;
        Ok(match id {
            KeywordId::Break => Stmt::Break(label),
            _ => Stmt::Continue(label),
        })
    }

    /// Whether nothing but a terminator follows on this line.
    fn at_statement_end(&self) -> bool {
        self.check_punct(PunctuationId::Semicolon)
            || self.check_punct(PunctuationId::RBrace)
            || self.check(&TokenKind::TemplateIslandEnd)
            || self.is_at_end()
            || self.on_new_line()
    }

    fn throw_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Throw)?;
        let object = if self.at_statement_end() {
            None
        } else {
            Some(self.expression()?)
        };
        self.end_statement()?;
        Ok(Stmt::Throw(ThrowStmt {
            object,
            ..ThrowStmt::default()
        }))
    }

    fn include_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Include)?;
        let path = self.expression()?;
        self.end_statement()?;
        Ok(Stmt::Include(path))
    }

    /// `import a.b.C [as D];`
    fn import_statement(&mut self) -> PResult<Stmt> {
        self.rule("import", |p| {
            p.expect_keyword(KeywordId::Import)?;
            let name = if matches!(p.peek().kind, TokenKind::OpenQuote(_)) {
                let literal = p.string_literal()?;
                literal.node.as_plain_str().unwrap_or_default().to_string()
            } else {
                p.dotted_name()?
            };
            let alias = if p.match_keyword(KeywordId::As) {
                Some(p.identifier()?)
            } else {
                None
            };
            p.end_statement()?;
            Ok(Stmt::Import(ImportStmt { name, alias }))
        })
    }

    /// `param [type] name [= default];`
    fn param_statement(&mut self) -> PResult<Stmt> {
        self.expect_keyword(KeywordId::Param)?;
        let typed = self.peek().kind.identifier_like().is_some()
            && (self.peek_next().kind.identifier_like().is_some()
                || matches!(self.peek_next().kind, TokenKind::OpenQuote(_)));
        let ty = if typed { Some(self.identifier()?) } else { None };
        let name = self.postfix()?;
        let default = if self.match_op(OperatorId::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        self.end_statement()?;
        Ok(Stmt::Param(ParamStmt { ty, name, default }))
    }

    // ========================================================================
    // Components and islands
    // ========================================================================

    /// `name attr=value ... ;` or `name attr=value ... { body }`.
    fn component_statement(&mut self) -> PResult<Stmt> {
        self.rule("component", |p| {
            let start = p.current_start();
            let name = p.member_name()?;
            let mut attributes = Vec::new();
            while p.is_attribute_start() {
                attributes.push(p.component_attribute()?);
            }
            p.component_body(name, attributes, start)
        })
    }

    /// Cf script `cfhttp(url="x", method="get") { ... }`.
    fn prefixed_call_component(&mut self) -> PResult<Stmt> {
        self.rule("component", |p| {
            let start = p.current_start();
            let written = p.identifier()?;
            let name = written.get(p.flavor.tag_prefix().len()..).unwrap_or_default().to_string();
            p.expect_punct(PunctuationId::LParen)?;
            let mut attributes = Vec::new();
            if !p.check_punct(PunctuationId::RParen) {
                loop {
                    attributes.push(p.component_attribute()?);
                    if !p.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
            }
            p.expect_punct(PunctuationId::RParen)?;
            p.component_body(name, attributes, start)
        })
    }

    /// Whether the current token starts another attribute of a script component.
    ///
    /// A word on a new line only continues the attribute list when `=` follows it.
    fn is_attribute_start(&self) -> bool {
        let word = match &self.peek().kind {
            TokenKind::Ident(_) | TokenKind::Keyword(_) => true,
            TokenKind::Operator(id) => operators::is_word(*id),
            _ => false,
        };
        word && (!self.on_new_line() || self.peek_next().kind.is_operator(OperatorId::Assign))
    }

    /// `name=value` or a bare `name` (empty string value).
    fn component_attribute(&mut self) -> PResult<Spanned<Annotation>> {
        let start = self.current_start();
        let name = self.member_name()?;
        let value = if self.match_op(OperatorId::Assign) {
            self.ternary()?
        } else {
            self.spanned(Expr::Str(StringLit::plain(None, "")), self.prev_end(start))
        };
        Ok(self.spanned(
            Annotation {
                name,
                value: Some(value),
            },
            start,
        ))
    }

    /// Optional `{ body }`, checked against the registry's body rules.
    fn component_body(&mut self, name: Ident, attributes: Vec<Spanned<Annotation>>, start: usize) -> PResult<Stmt> {
        let head = self.locate(Span::new(start, self.prev_end(start)));
        let body = if self.check_punct(PunctuationId::LBrace) {
            Some(self.block()?)
        } else {
            self.end_statement()?;
            None
        };
        match &body {
            None if self.registry.requires_body(&name) => self.report(messages::requires_body(&name, head)),
            Some(stmts) if !stmts.is_empty() && !self.registry.allows_body(&name) => {
                self.report(messages::body_not_allowed(&name, head))
            }
            _ => {}
        }
        Ok(Stmt::Component(ComponentStmt { name, attributes, body }))
    }

    /// Template markup between triple backticks.
    fn template_island(&mut self) -> PResult<Stmt> {
        self.rule("box template", |p| {
            p.expect_kind(&TokenKind::TemplateIslandStart, Expected::Statement)?;
            let items = p.template_items(true);
            p.expect_kind(&TokenKind::TemplateIslandEnd, Expected::Word("```"))?;
            let stmts = template::normalize(items, p);
            Ok(Stmt::TemplateIsland(stmts))
        })
    }
}

/// `var x = 1` parses as one assignment; split it into target and value.
fn split_declaration(modifiers: Vec<Modifier>, expr: Spanned<Expr>) -> VarDecl {
    match expr.node {
        Expr::Assign {
            target,
            op: AssignOp::Assign,
            value,
        } => VarDecl {
            modifiers,
            declared_type: None,
            target: *target,
            value: Some(*value),
        },
        node => VarDecl {
            modifiers,
            declared_type: None,
            target: Spanned {
                node,
                pos: expr.pos,
                text: expr.text,
                comments: expr.comments,
                span: expr.span,
            },
            value: None,
        },
    }
}
