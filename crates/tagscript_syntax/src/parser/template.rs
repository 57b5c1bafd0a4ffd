/// Template dialect parsing.
///
/// The template parser builds a flat [`TemplateItem`] list and hands it to [`template::normalize`], which pairs
/// closing tags with their openers. Script islands (`<cfscript>` bodies) are parsed through a fragment parser so
/// their positions land in document coordinates.
///
/// ## Notes
/// - Text is kept verbatim outside `output` bodies. Inside one, `#expr#` holes are parsed and `##` is unescaped.
/// - A failing tag is reported and skipped up to its closing `>`; the items around it are kept.
impl<'a> Parser<'a> {
    // ========================================================================
    // Documents
    // ========================================================================

    fn template_document(&mut self) -> AstNode {
        let items = self.template_items(false);
        let statements = template::normalize(items, self);
        let span = self.whole_span();
        AstNode::Script(self.node_at(Script { statements }, span))
    }

    /// A template holding one class: either a `script` island whose body is a class, or a `component`/`interface`
    /// tag.
    fn template_declaration_document(&mut self) -> Option<AstNode> {
        self.skip_blank_text();
        if self.at_tag_open("script") {
            let root = self.script_declaration();
            self.skip_blank_text();
            return root;
        }

        let items = self.template_items(false);
        let mut statements = template::normalize(items, self);
        let found = statements.iter().position(|s| match &s.node {
            Stmt::Component(c) => c.name.eq_ignore_ascii_case("component") || c.name.eq_ignore_ascii_case("interface"),
            _ => false,
        });
        let Some(index) = found else {
            let first = statements.iter().find(|s| !is_blank_output(s));
            let (text, pos) = match first {
                Some(stmt) => (stmt.text.clone(), stmt.pos.clone()),
                None => ("<EOF>".to_string(), self.locate(self.peek().span)),
            };
            let message = expected::grammar_error(&self.rules, &[Expected::ComponentName], &text);
            self.report(Issue::syntax(message, pos));
            return None;
        };

        let imports: Vec<Spanned<Stmt>> = statements
            .drain(..index)
            .filter(|s| matches!(s.node, Stmt::Import(_)))
            .collect();
        let component = statements.swap_remove(0);
        Some(class_from_component(component, imports))
    }

    /// `<cfscript> component { ... } </cfscript>`: the island body parsed as a declaration.
    fn script_declaration(&mut self) -> Option<AstNode> {
        let start = self.current_start();
        if let Err(issue) = self.rule("component", |p| p.tag_head().map(|_| ())) {
            self.report(issue);
            return None;
        }
        let before = self.issues.len();
        let root = match self.peek().kind {
            TokenKind::IslandText(_) => {
                let token = self.advance().clone();
                let text = self.token_text(&token);
                let begin = self.locate(token.span).start;
                self.parse_fragment(text, begin, EntryPoint::Declaration)
            }
            _ => None,
        };
        if self.check(&TokenKind::ComponentSlashOpen) {
            if let Err(issue) = self.close_tag() {
                self.report(issue);
            }
        }
        match root {
            Some(node @ (AstNode::Class(_) | AstNode::Interface(_))) => Some(node),
            Some(other) => {
                self.report(messages::island_not_class(other.pos().clone()));
                None
            }
            None => {
                if self.issues.len() == before {
                    let pos = self.locate(Span::new(start, self.prev_end(start)));
                    self.report(messages::island_not_class(pos));
                }
                None
            }
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Items up to end of input, or up to the closing backticks of a template island.
    fn template_items(&mut self, island: bool) -> Vec<TemplateItem> {
        let mut items = Vec::new();
        let mut output_depth = 0usize;
        loop {
            if self.aborted || self.is_at_end() {
                break;
            }
            if island && self.check(&TokenKind::TemplateIslandEnd) {
                break;
            }
            let start = self.pos;
            match self.template_item(&mut output_depth) {
                Ok(item) => items.push(item),
                Err(issue) => {
                    self.report(issue);
                    if self.aborted {
                        break;
                    }
                    self.skip_tag(start);
                }
            }
        }
        items
    }

    fn template_item(&mut self, output_depth: &mut usize) -> PResult<TemplateItem> {
        match self.peek().kind {
            TokenKind::ContentText(_) | TokenKind::Hash => self.text_run(*output_depth > 0),
            TokenKind::ComponentOpen => {
                let item = self.rule("component", |p| p.open_tag())?;
                if let TemplateItem::Open(head) = &item {
                    if head.node.key() == "output" && !head.node.self_closing {
                        *output_depth += 1;
                    }
                }
                Ok(item)
            }
            TokenKind::ComponentSlashOpen => {
                let name = self.close_tag()?;
                if name.node.eq_ignore_ascii_case("output") {
                    *output_depth = output_depth.saturating_sub(1);
                }
                Ok(TemplateItem::Close(name))
            }
            _ => Err(self.unexpected(&[Expected::ComponentName])),
        }
    }

    /// Consecutive text and `#expr#` holes.
    fn text_run(&mut self, in_output: bool) -> PResult<TemplateItem> {
        let start = self.current_start();
        let mut parts = Vec::new();
        let mut holes = false;
        loop {
            match self.peek().kind.clone() {
                TokenKind::ContentText(raw) => {
                    self.advance();
                    let text = if in_output { unescape(&raw, None) } else { raw };
                    push_text(&mut parts, text);
                }
                TokenKind::Hash => {
                    let hole = self.hash_expression()?;
                    parts.push(StringPart::Hole(hole));
                    holes = true;
                }
                _ => break,
            }
        }
        if in_output || holes {
            return Ok(TemplateItem::Interpolated(self.spanned(StringLit { quote: None, parts }, start)));
        }
        let text: String = parts
            .into_iter()
            .filter_map(|part| match part {
                StringPart::Text(text) => Some(text),
                StringPart::Hole(_) => None,
            })
            .collect();
        Ok(TemplateItem::Text(self.spanned(text, start)))
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// `<prefix name ...>`; expression tags and `script` are dispatched from here.
    fn open_tag(&mut self) -> PResult<TemplateItem> {
        let start = self.current_start();
        let name = self.peek_at(2).text(self.text).to_string();
        match name.to_ascii_lowercase().as_str() {
            "set" | "if" | "elseif" | "return" => self.expression_tag(start),
            "script" => self.script_island(start),
            _ => {
                let head = self.tag_head()?;
                Ok(TemplateItem::Open(self.spanned(head, start)))
            }
        }
    }

    /// Tag name and attributes up to and including `>` or `/>`.
    fn tag_head(&mut self) -> PResult<TagHead> {
        let name = self.tag_name(&TokenKind::ComponentOpen)?;
        let mut attributes = Vec::new();
        while matches!(self.peek().kind, TokenKind::AttrName(_)) {
            attributes.push(self.tag_attribute()?);
        }
        let self_closing = self.tag_close()?;
        Ok(TagHead {
            name,
            attributes,
            self_closing,
        })
    }

    /// `opener prefix name`; returns the name as written.
    fn tag_name(&mut self, opener: &TokenKind) -> PResult<Ident> {
        self.expect_kind(opener, Expected::ComponentName)?;
        self.expect_kind(&TokenKind::Prefix(String::new()), Expected::ComponentName)?;
        let token = self.expect_kind(&TokenKind::ComponentName(String::new()), Expected::ComponentName)?;
        Ok(self.token_text(&token).to_string())
    }

    /// Consume `>` or `/>`; `true` for `/>`.
    fn tag_close(&mut self) -> PResult<bool> {
        match self.peek().kind {
            TokenKind::ComponentClose => {
                self.advance();
                Ok(false)
            }
            TokenKind::ComponentSlashClose => {
                self.advance();
                Ok(true)
            }
            _ => Err(self.unexpected(&[Expected::Identifier, Expected::TagClose])),
        }
    }

    /// `name`, `name="..."`, `name='...'`, `name=value` or `name=#expr#`.
    fn tag_attribute(&mut self) -> PResult<Spanned<Annotation>> {
        let start = self.current_start();
        let name = self.token_text(self.peek()).to_string();
        self.advance();
        let value = if self.match_op(OperatorId::Assign) {
            match self.peek().kind.clone() {
                TokenKind::OpenQuote(_) => self.string_literal()?,
                TokenKind::Hash => self.hash_expression()?,
                TokenKind::UnquotedValue(value) => {
                    let at = self.current_start();
                    self.advance();
                    self.spanned(Expr::Str(StringLit::plain(None, value)), at)
                }
                _ => return Err(self.unexpected(&[Expected::String])),
            }
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

    /// `</prefix name>`
    fn close_tag(&mut self) -> PResult<Spanned<Ident>> {
        let start = self.current_start();
        let name = self.tag_name(&TokenKind::ComponentSlashOpen)?;
        if !self.check(&TokenKind::ComponentClose) {
            return Err(self.unexpected(&[Expected::TagClose]));
        }
        self.advance();
        Ok(self.spanned(name, start))
    }

    /// `set`, `if`, `elseif` and `return`, whose heads are script expressions.
    fn expression_tag(&mut self, start: usize) -> PResult<TemplateItem> {
        let name = self.tag_name(&TokenKind::ComponentOpen)?;
        let tag = match name.to_ascii_lowercase().as_str() {
            "set" => {
                let at = self.current_start();
                let modifiers = self.declaration_modifiers();
                let expr = self.expression()?;
                let stmt = if modifiers.is_empty() {
                    Stmt::Expr(expr)
                } else {
                    Stmt::Var(split_declaration(modifiers, expr))
                };
                ExpressionTag::Set(self.spanned(stmt, at))
            }
            "if" => ExpressionTag::If(self.expression()?),
            "elseif" => ExpressionTag::ElseIf(self.expression()?),
            _ => {
                let value = if self.at_expression_tag_end() {
                    None
                } else {
                    Some(self.expression()?)
                };
                ExpressionTag::Return(value)
            }
        };
        // After an unexpected end the next tag has already started; it was reported when the tokens were read.
        if !self.check(&TokenKind::ComponentOpen) {
            self.tag_close()?;
        }
        Ok(TemplateItem::Expression(self.spanned(tag, start)))
    }

    fn at_expression_tag_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::ComponentClose | TokenKind::ComponentSlashClose | TokenKind::ComponentOpen | TokenKind::Eof
        )
    }

    /// `<cfscript> statements </cfscript>`: the body is parsed by a fragment parser.
    fn script_island(&mut self, start: usize) -> PResult<TemplateItem> {
        let head = self.tag_head()?;
        let mut statements = Vec::new();
        if !head.self_closing {
            if let TokenKind::IslandText(_) = self.peek().kind {
                let token = self.advance().clone();
                let text = self.token_text(&token);
                let begin = self.locate(token.span).start;
                if let Some(AstNode::Script(script)) = self.parse_fragment(text, begin, EntryPoint::Statements) {
                    statements = script.node.statements;
                }
            }
            if self.check(&TokenKind::ComponentSlashOpen) {
                self.close_tag()?;
            }
        }
        Ok(TemplateItem::ScriptIsland(self.spanned(statements, start)))
    }

    // ========================================================================
    // Recovery and lookahead
    // ========================================================================

    /// Skip the rest of a failed tag, up to and including its `>`.
    fn skip_tag(&mut self, start: usize) {
        if self.pos == start && !self.is_at_end() {
            self.advance();
        }
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::ComponentClose | TokenKind::ComponentSlashClose => {
                    self.advance();
                    return;
                }
                TokenKind::ComponentOpen
                | TokenKind::ComponentSlashOpen
                | TokenKind::ContentText(_)
                | TokenKind::TemplateIslandEnd => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn skip_blank_text(&mut self) {
        while let TokenKind::ContentText(text) = &self.peek().kind {
            if !text.trim().is_empty() {
                break;
            }
            self.advance();
        }
    }

    /// Whether the current token opens a tag called `name`.
    fn at_tag_open(&self, name: &str) -> bool {
        self.check(&TokenKind::ComponentOpen)
            && matches!(self.peek_at(2).kind, TokenKind::ComponentName(_))
            && self.peek_at(2).text(self.text).eq_ignore_ascii_case(name)
    }
}

impl NormalizeHost for Parser<'_> {
    fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn registry(&self) -> &dyn TagRegistry {
        self.registry
    }

    fn report(&mut self, issue: Issue) {
        Parser::report(self, issue);
    }

    fn locate(&self, span: Span) -> Position {
        Parser::locate(self, span)
    }

    fn slice(&self, span: Span) -> String {
        Parser::slice(self, span)
    }

    fn expression_fragment(&mut self, text: &str, start: Point) -> Spanned<Expr> {
        match self.parse_fragment(text, start, EntryPoint::Expression) {
            Some(AstNode::Expression(expr)) => expr,
            _ => {
                let pos = Position::at(start, self.source.clone());
                Spanned::new(Expr::Null, pos, text, Span::new(0, 0))
            }
        }
    }

    fn internal(&mut self, message: String) {
        tracing::debug!(%message, "normalizer inconsistency");
        self.internal.get_or_insert(message);
    }
}

fn is_blank_output(stmt: &Spanned<Stmt>) -> bool {
    match &stmt.node {
        Stmt::BufferOutput(value) => value.node.as_plain_str().is_some_and(|t| t.trim().is_empty()),
        _ => false,
    }
}

/// Turn a top-level `component`/`interface` tag into a class root.
fn class_from_component(component: Spanned<Stmt>, imports: Vec<Spanned<Stmt>>) -> AstNode {
    let at = component.with_node(());
    let Stmt::Component(ComponentStmt { name, attributes, body }) = component.node else {
        return AstNode::Statement(component);
    };
    let mut properties = Vec::new();
    let mut statements = Vec::new();
    for stmt in body.unwrap_or_default() {
        match stmt.node {
            Stmt::Component(c) if c.name.eq_ignore_ascii_case("property") => {
                let decl = PropertyDecl {
                    annotations: c.attributes,
                    documentation: Vec::new(),
                };
                properties.push(Spanned {
                    node: decl,
                    pos: stmt.pos,
                    text: stmt.text,
                    comments: stmt.comments,
                    span: stmt.span,
                });
            }
            node => {
                let stmt = Spanned { node, ..stmt };
                if !is_blank_output(&stmt) {
                    statements.push(stmt);
                }
            }
        }
    }
    if name.eq_ignore_ascii_case("interface") {
        return AstNode::Interface(at.with_node(InterfaceDecl {
            imports,
            annotations: attributes,
            documentation: Vec::new(),
            body: statements,
        }));
    }
    AstNode::Class(at.with_node(ClassDecl {
        imports,
        annotations: attributes,
        documentation: Vec::new(),
        modifiers: Vec::new(),
        properties,
        body: statements,
    }))
}
