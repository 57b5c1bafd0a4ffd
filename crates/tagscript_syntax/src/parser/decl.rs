/// Declaration parsing methods.
///
/// This chunk parses classes, interfaces, properties, function declarations and their parameters, plus the
/// annotation forms that decorate them (`@name value` before, `name=value` after).
impl<'a> Parser<'a> {
    // ========================================================================
    // Class and interface documents
    // ========================================================================

    fn declaration_document(&mut self) -> Option<AstNode> {
        match self.class_or_interface() {
            Ok(node) => Some(node),
            Err(issue) => {
                self.report(issue);
                None
            }
        }
    }

    /// `[imports] [@annotations] [abstract|final] class|component|interface [attrs] { ... }`
    fn class_or_interface(&mut self) -> PResult<AstNode> {
        let start = self.current_start();
        let mut imports = Vec::new();
        loop {
            while self.check_punct(PunctuationId::Semicolon) {
                self.advance();
            }
            if !self.check_keyword(KeywordId::Import) {
                break;
            }
            imports.push(self.statement()?);
        }

        let mut annotations = self.pre_annotations()?;
        let mut modifiers = Vec::new();
        loop {
            if self.match_keyword(KeywordId::Abstract) {
                modifiers.push(Modifier::Abstract);
            } else if self.match_keyword(KeywordId::Final) {
                modifiers.push(Modifier::Final);
            } else {
                break;
            }
        }

        if self.check_keyword(KeywordId::Interface) || self.check_word("interface") {
            return self.rule("interface definition", |p| {
                p.advance();
                annotations.extend(p.header_attributes()?);
                let body = p.class_body(None)?;
                let decl = InterfaceDecl {
                    imports,
                    annotations,
                    documentation: Vec::new(),
                    body,
                };
                Ok(AstNode::Interface(p.spanned(decl, start)))
            });
        }

        if self.check_keyword(KeywordId::Class)
            || self.check_keyword(KeywordId::Component)
            || self.check_word("component")
            || self.check_word("class")
        {
            self.advance();
        } else {
            return Err(self.unexpected(&[
                Expected::Keyword(KeywordId::Class),
                Expected::Keyword(KeywordId::Component),
                Expected::Keyword(KeywordId::Interface),
            ]));
        }
        annotations.extend(self.header_attributes()?);
        let mut properties = Vec::new();
        let body = self.class_body(Some(&mut properties))?;
        let decl = ClassDecl {
            imports,
            annotations,
            documentation: Vec::new(),
            modifiers,
            properties,
            body,
        };
        Ok(AstNode::Class(self.spanned(decl, start)))
    }

    /// `name=value` and bare words between the class keyword and `{`.
    fn header_attributes(&mut self) -> PResult<Vec<Spanned<Annotation>>> {
        let mut attributes = Vec::new();
        while !self.check_punct(PunctuationId::LBrace) && !self.is_at_end() {
            attributes.push(self.component_attribute()?);
        }
        Ok(attributes)
    }

    /// `{ properties and statements }`; interfaces pass no property list.
    fn class_body(&mut self, mut properties: Option<&mut Vec<Spanned<PropertyDecl>>>) -> PResult<Vec<Spanned<Stmt>>> {
        self.expect_punct(PunctuationId::LBrace)?;
        let mut body = Vec::new();
        loop {
            while self.check_punct(PunctuationId::Semicolon) {
                self.advance();
            }
            if self.aborted || self.is_at_end() || self.check_punct(PunctuationId::RBrace) {
                break;
            }
            let start = self.pos;
            let result = match properties.as_deref_mut() {
                Some(list) if self.is_property_start() => self.property().map(|p| list.push(p)),
                _ => self.statement().map(|s| body.push(s)),
            };
            if let Err(issue) = result {
                self.report(issue);
                if self.aborted {
                    break;
                }
                self.synchronize(start);
            }
        }
        self.expect_punct(PunctuationId::RBrace)?;
        Ok(body)
    }

    fn is_property_start(&self) -> bool {
        (self.check_keyword(KeywordId::Property) || self.check_word("property"))
            && self.peek_next().kind.identifier_like().is_some()
            && !self.peek_at(2).kind.is_punctuation(PunctuationId::Dot)
    }

    /// `property [type] name [attr=value ...];`, every part stored as an annotation.
    fn property(&mut self) -> PResult<Spanned<PropertyDecl>> {
        self.rule("property", |p| {
            let start = p.current_start();
            p.advance();
            let mut bare = Vec::new();
            let mut attributes = Vec::new();
            while p.is_attribute_start() {
                if p.peek_next().kind.is_operator(OperatorId::Assign) {
                    attributes.push(p.component_attribute()?);
                } else {
                    let at = p.current_start();
                    let word = p.member_name()?;
                    let value = p.spanned(Expr::Str(StringLit::plain(None, word)), at);
                    bare.push(value);
                }
            }
            p.end_statement()?;

            let mut annotations = Vec::new();
            let named = |name: &str, value: Spanned<Expr>| {
                let at = value.with_node(());
                at.with_node(Annotation {
                    name: name.to_string(),
                    value: Some(value),
                })
            };
            let mut bare = bare.into_iter();
            match (bare.next(), bare.next()) {
                (Some(ty), Some(name)) => {
                    annotations.push(named("name", name));
                    annotations.push(named("type", ty));
                }
                (Some(name), None) => annotations.push(named("name", name)),
                _ => {}
            }
            for extra in bare {
                let word = extra.node.as_plain_str().unwrap_or_default().to_string();
                annotations.push(named(&word, extra.with_node(Expr::Str(StringLit::plain(None, "")))));
            }
            annotations.extend(attributes);
            Ok(p.spanned(
                PropertyDecl {
                    annotations,
                    documentation: Vec::new(),
                },
                start,
            ))
        })
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// `@name [value ...]` lines before a declaration. Values must sit on the annotation's line; several values
    /// become an array.
    fn pre_annotations(&mut self) -> PResult<Vec<Spanned<Annotation>>> {
        let mut annotations = Vec::new();
        while self.check_punct(PunctuationId::At) {
            let start = self.current_start();
            self.advance();
            let mut name = self.member_name()?;
            while self.check_punct(PunctuationId::Dot) && !self.on_new_line() {
                self.advance();
                name.push('.');
                name.push_str(&self.member_name()?);
            }
            let values_start = self.current_start();
            let mut values = Vec::new();
            while self.at_annotation_value() {
                values.push(self.postfix()?);
                if self.check_punct(PunctuationId::Comma) && !self.on_new_line() {
                    self.advance();
                }
            }
            let value = match values.len() {
                0 => None,
                1 => values.pop(),
                _ => Some(self.spanned(Expr::Array(values), values_start)),
            };
            annotations.push(self.spanned(Annotation { name, value }, start));
        }
        Ok(annotations)
    }

    fn at_annotation_value(&self) -> bool {
        !self.on_new_line()
            && matches!(
                self.peek().kind,
                TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::OpenQuote(_)
                    | TokenKind::Keyword(KeywordId::True | KeywordId::False | KeywordId::Null)
                    | TokenKind::Punctuation(PunctuationId::LBracket | PunctuationId::LBrace | PunctuationId::LParen)
            )
    }

    /// `name=value` or bare `name` after a function head or a parameter.
    fn post_annotations(&mut self) -> PResult<Vec<Spanned<Annotation>>> {
        let mut annotations = Vec::new();
        while self.is_attribute_start() && !self.check_keyword(KeywordId::Function) {
            let start = self.current_start();
            let name = self.member_name()?;
            let value = if self.match_op(OperatorId::Assign) {
                Some(self.ternary()?)
            } else {
                None
            };
            annotations.push(self.spanned(Annotation { name, value }, start));
        }
        Ok(annotations)
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// `[access] [static|final|abstract] [returnType] function name(params) [annotations] { body }`
    ///
    /// Without a body (`;` instead of `{`) the function is abstract or an interface member.
    fn function_declaration(&mut self, mut annotations: Vec<Spanned<Annotation>>) -> PResult<FunctionDecl> {
        self.rule("function", |p| {
            let mut access = None;
            let mut modifiers = Vec::new();
            loop {
                match p.peek().kind.keyword_id() {
                    Some(KeywordId::Public) => access = Some(Access::Public),
                    Some(KeywordId::Private) => access = Some(Access::Private),
                    Some(KeywordId::Package) => access = Some(Access::Package),
                    Some(KeywordId::Remote) => access = Some(Access::Remote),
                    Some(KeywordId::Static) => modifiers.push(Modifier::Static),
                    Some(KeywordId::Final) => modifiers.push(Modifier::Final),
                    Some(KeywordId::Abstract) => modifiers.push(Modifier::Abstract),
                    _ => break,
                }
                p.advance();
            }
            let return_type = if p.check_keyword(KeywordId::Function) {
                None
            } else {
                Some(p.type_name()?)
            };
            p.expect_keyword(KeywordId::Function)?;
            let name = p.member_name()?;
            let mut args = p.parameters()?;
            annotations.extend(p.post_annotations()?);
            let annotations = route_argument_annotations(annotations, &mut args);
            let body = if p.check_punct(PunctuationId::LBrace) {
                Some(p.block()?)
            } else {
                p.end_statement()?;
                None
            };
            Ok(FunctionDecl {
                access,
                modifiers,
                return_type,
                name,
                args,
                annotations,
                documentation: Vec::new(),
                body,
            })
        })
    }

    /// `function (params) [annotations] { body }` in expression position.
    fn closure(&mut self) -> PResult<Expr> {
        self.rule("closure", |p| {
            p.expect_keyword(KeywordId::Function)?;
            let args = p.parameters()?;
            let annotations = p.post_annotations()?;
            let body = p.block()?;
            Ok(Expr::Closure(Box::new(FunctionDecl {
                access: None,
                modifiers: Vec::new(),
                return_type: None,
                name: String::new(),
                args,
                annotations,
                documentation: Vec::new(),
                body: Some(body),
            })))
        })
    }

    /// A dotted type name, optionally followed by `[]`.
    fn type_name(&mut self) -> PResult<Ident> {
        let mut name = self.dotted_name()?;
        if self.check_punct(PunctuationId::LBracket) && self.peek_next().kind.is_punctuation(PunctuationId::RBracket) {
            self.advance();
            self.advance();
            name.push_str("[]");
        }
        Ok(name)
    }

    /// `( [param {, param}] )`
    fn parameters(&mut self) -> PResult<Vec<Spanned<ArgumentDecl>>> {
        self.rule("parameter list", |p| {
            p.expect_punct(PunctuationId::LParen)?;
            let mut args = Vec::new();
            if !p.check_punct(PunctuationId::RParen) {
                loop {
                    args.push(p.parameter()?);
                    if !p.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
            }
            p.expect_punct(PunctuationId::RParen)?;
            Ok(args)
        })
    }

    /// `[required] [type] name [= default] [annotations]`
    fn parameter(&mut self) -> PResult<Spanned<ArgumentDecl>> {
        let start = self.current_start();
        let required = self.check_keyword(KeywordId::Required) && self.peek_next().kind.identifier_like().is_some();
        if required {
            self.advance();
        }
        let first = self.type_name()?;
        let (ty, name) = if self.peek().kind.identifier_like().is_some() {
            (Some(first), self.identifier()?)
        } else {
            (None, first)
        };
        let default = if self.match_op(OperatorId::Assign) {
            Some(self.ternary()?)
        } else {
            None
        };
        let annotations = self.post_annotations()?;
        Ok(self.spanned(
            ArgumentDecl {
                required,
                ty,
                name,
                default,
                annotations,
                documentation: Vec::new(),
            },
            start,
        ))
    }
}

/// `@arg.key value` on a function belongs to argument `arg` as `key`.
fn route_argument_annotations(
    annotations: Vec<Spanned<Annotation>>,
    args: &mut [Spanned<ArgumentDecl>],
) -> Vec<Spanned<Annotation>> {
    let mut kept = Vec::with_capacity(annotations.len());
    for mut annotation in annotations {
        let target = annotation.node.name.split_once('.').and_then(|(arg, key)| {
            let index = args.iter().position(|a| a.node.name.eq_ignore_ascii_case(arg))?;
            Some((index, key.to_string()))
        });
        match target {
            Some((index, key)) => {
                annotation.node.name = key;
                args[index].node.annotations.push(annotation);
            }
            None => kept.push(annotation),
        }
    }
    kept
}
