/// Expression parsing methods.
///
/// This chunk implements expression parsing using **precedence climbing** over the operator registry's
/// precedences.
///
/// ## Notes
/// - Assignment is an expression and binds loosest; ternary and elvis come next.
/// - Comparison words can span several tokens (`less than or equal to`, `does not contain`, `is not`).
/// - `not` takes a comparison as its operand; `!` binds like any other prefix operator.
/// - Literal-receiver checks (`1.foo`, `true[0]`) and invalid assignment targets are reported in place; the
///   expression is still built.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> PResult<Spanned<Expr>> {
        self.nested(|p| p.assignment())
    }

    fn assignment(&mut self) -> PResult<Spanned<Expr>> {
        if predicates::is_lambda_start(&self.tokens, self.pos) {
            return self.lambda();
        }
        let start = self.current_start();
        let target = self.ternary()?;
        let op = match self.peek().kind.operator_id() {
            Some(OperatorId::Assign) => AssignOp::Assign,
            Some(OperatorId::PlusEq) => AssignOp::Add,
            Some(OperatorId::MinusEq) => AssignOp::Sub,
            Some(OperatorId::StarEq) => AssignOp::Mul,
            Some(OperatorId::SlashEq) => AssignOp::Div,
            Some(OperatorId::PercentEq) => AssignOp::Mod,
            Some(OperatorId::AmpEq) => AssignOp::Concat,
            _ => return Ok(target),
        };
        self.advance();
        if !is_assignable(&target.node) {
            self.report(messages::invalid_assignment_target(&target.text, target.pos.clone()));
        }
        let value = self.nested(|p| p.assignment())?;
        Ok(self.spanned(
            Expr::Assign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
            start,
        ))
    }

    /// `cond ? then : otherwise`
    fn ternary(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let cond = self.binary(0)?;
        if !self.match_punct(PunctuationId::Question) {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect_punct(PunctuationId::Colon)?;
        let otherwise = self.nested(|p| p.ternary())?;
        Ok(self.spanned(
            Expr::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            start,
        ))
    }

    /// Precedence climbing over every infix operator binding at least as tight as `min_prec`.
    fn binary(&mut self, min_prec: u8) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut left = self.unary()?;
        while let Some(infix) = self.infix_operator() {
            if infix.precedence < min_prec {
                break;
            }
            for _ in 0..infix.width {
                self.advance();
            }
            let next = if infix.right_assoc {
                infix.precedence
            } else {
                infix.precedence + 1
            };
            let right = self.nested(|p| p.binary(next))?;
            let node = match infix.op {
                Some(op) => Expr::Binary(Box::new(left), op, Box::new(right)),
                None => Expr::Elvis(Box::new(left), Box::new(right)),
            };
            left = self.spanned(node, start);
        }
        Ok(left)
    }

    /// The infix operator at the current token, if any. `op` is `None` for elvis.
    fn infix_operator(&self) -> Option<Infix> {
        let id = self.peek().kind.operator_id()?;
        let at = |n: usize, id: OperatorId| self.peek_at(n).kind.is_operator(id);
        let simple = |op: BinaryOp| Some(Infix::new(Some(op), id, 1));
        match id {
            OperatorId::Plus => simple(BinaryOp::Add),
            OperatorId::Minus => simple(BinaryOp::Sub),
            OperatorId::Star => simple(BinaryOp::Mul),
            OperatorId::Slash => simple(BinaryOp::Div),
            OperatorId::Backslash => simple(BinaryOp::IntDiv),
            OperatorId::Percent | OperatorId::Mod => simple(BinaryOp::Mod),
            OperatorId::Caret => simple(BinaryOp::Pow),
            OperatorId::Amp => simple(BinaryOp::Concat),
            OperatorId::EqEq => simple(BinaryOp::Eq),
            OperatorId::EqEqEq => simple(BinaryOp::StrictEq),
            OperatorId::NotEq | OperatorId::NotEqual => simple(BinaryOp::NotEq),
            OperatorId::NotEqEq => simple(BinaryOp::StrictNotEq),
            OperatorId::Lt | OperatorId::LessThan => simple(BinaryOp::Lt),
            OperatorId::LtEq | OperatorId::LessThanOrEqual => simple(BinaryOp::LtEq),
            OperatorId::Gt | OperatorId::GreaterThan => simple(BinaryOp::Gt),
            OperatorId::GtEq | OperatorId::GreaterThanOrEqual => simple(BinaryOp::GtEq),
            OperatorId::AmpAmp | OperatorId::And => simple(BinaryOp::And),
            OperatorId::PipePipe | OperatorId::Or => simple(BinaryOp::Or),
            OperatorId::Xor => simple(BinaryOp::Xor),
            OperatorId::Eqv => simple(BinaryOp::Eqv),
            OperatorId::Imp => simple(BinaryOp::Imp),
            OperatorId::Contains => simple(BinaryOp::Contains),
            OperatorId::Elvis => Some(Infix::new(None, id, 1)),
            OperatorId::Equal => {
                let is = self.token_text(self.peek()).eq_ignore_ascii_case("is");
                if is && at(1, OperatorId::Not) {
                    Some(Infix::new(Some(BinaryOp::NotEq), id, 2))
                } else {
                    simple(BinaryOp::Eq)
                }
            }
            OperatorId::Does if at(1, OperatorId::Not) && self.peek_word_at(2, "contain") => {
                Some(Infix::new(Some(BinaryOp::NotContains), id, 3))
            }
            OperatorId::Less | OperatorId::Greater if at(1, OperatorId::Than) => {
                let or_equal = at(2, OperatorId::Or) && at(3, OperatorId::Equal) && self.peek_word_at(4, "to");
                let op = match (id, or_equal) {
                    (OperatorId::Less, false) => BinaryOp::Lt,
                    (OperatorId::Less, true) => BinaryOp::LtEq,
                    (_, false) => BinaryOp::Gt,
                    (_, true) => BinaryOp::GtEq,
                };
                Some(Infix::new(Some(op), id, if or_equal { 5 } else { 2 }))
            }
            _ => None,
        }
    }

    fn unary(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let op = match self.peek().kind.operator_id() {
            Some(OperatorId::Minus) => UnaryOp::Neg,
            Some(OperatorId::Plus) => UnaryOp::Plus,
            Some(OperatorId::Bang) => UnaryOp::Not,
            Some(OperatorId::PlusPlus) => UnaryOp::PreInc,
            Some(OperatorId::MinusMinus) => UnaryOp::PreDec,
            Some(OperatorId::Not) => {
                self.advance();
                let operand = self.nested(|p| p.binary(NOT_OPERAND_PRECEDENCE))?;
                return Ok(self.spanned(Expr::Unary(UnaryOp::Not, Box::new(operand)), start));
            }
            _ => return self.postfix(),
        };
        self.advance();
        let operand = self.nested(|p| p.unary())?;
        Ok(self.spanned(Expr::Unary(op, Box::new(operand)), start))
    }

    /// Member access, indexing, calls, static access and postfix increments.
    fn postfix(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let mut expr = self.primary()?;
        loop {
            if self.check_punct(PunctuationId::Dot) || self.check_punct(PunctuationId::SafeDot) {
                let safe = self.check_punct(PunctuationId::SafeDot);
                self.advance();
                if expr.node.is_scalar_literal() {
                    self.report(messages::invalid_dot_access(&expr.text, expr.pos.clone()));
                }
                let name = self.member_name()?;
                expr = self.spanned(
                    Expr::Dot {
                        object: Box::new(expr),
                        name,
                        safe,
                    },
                    start,
                );
            } else if self.check_punct(PunctuationId::LBracket) {
                self.advance();
                if expr.node.is_scalar_literal() {
                    self.report(messages::invalid_index_access(&expr.text, expr.pos.clone()));
                }
                let index = self.expression()?;
                self.expect_punct(PunctuationId::RBracket)?;
                expr = self.spanned(
                    Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                    start,
                );
            } else if self.check_punct(PunctuationId::LParen) {
                let args = self.arguments()?;
                expr = self.spanned(
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    start,
                );
            } else if self.check_punct(PunctuationId::ColonColon) {
                self.advance();
                let name = self.member_name()?;
                expr = self.spanned(
                    Expr::StaticAccess {
                        object: Box::new(expr),
                        name,
                    },
                    start,
                );
            } else if (self.check_op(OperatorId::PlusPlus) || self.check_op(OperatorId::MinusMinus)) && !self.on_new_line()
            {
                let op = if self.check_op(OperatorId::PlusPlus) {
                    PostfixOp::Inc
                } else {
                    PostfixOp::Dec
                };
                self.advance();
                expr = self.spanned(Expr::Postfix(Box::new(expr), op), start);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// `( [name=]value, ... )`; names may also be written `name: value`.
    fn arguments(&mut self) -> PResult<Vec<Argument>> {
        self.rule("argument list", |p| {
            p.expect_punct(PunctuationId::LParen)?;
            let mut args = Vec::new();
            if !p.check_punct(PunctuationId::RParen) {
                loop {
                    let named = (p.peek().kind.identifier_like().is_some() || p.peek().kind.is_word_operator())
                        && (p.peek_next().kind.is_operator(OperatorId::Assign)
                            || p.peek_next().kind.is_punctuation(PunctuationId::Colon));
                    let name = if named {
                        let name = p.token_text(p.peek()).to_string();
                        p.advance();
                        p.advance();
                        Some(name)
                    } else {
                        None
                    };
                    let value = p.expression()?;
                    args.push(Argument { name, value });
                    if !p.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
            }
            p.expect_punct(PunctuationId::RParen)?;
            Ok(args)
        })
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    fn primary(&mut self) -> PResult<Spanned<Expr>> {
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
            TokenKind::OpenQuote(_) => return self.string_literal(),
            TokenKind::Hash => return self.hash_expression(),
            TokenKind::Keyword(KeywordId::True) => {
                self.advance();
                Expr::Bool(true)
            }
            TokenKind::Keyword(KeywordId::False) => {
                self.advance();
                Expr::Bool(false)
            }
            TokenKind::Keyword(KeywordId::Null) => {
                self.advance();
                Expr::Null
            }
            TokenKind::Keyword(KeywordId::Function) if self.peek_next().kind.is_punctuation(PunctuationId::LParen) => {
                self.closure()?
            }
            TokenKind::Keyword(KeywordId::New) => self.new_expression()?,
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.expression()?;
                self.expect_punct(PunctuationId::RParen)?;
                // Parentheses keep the inner node but widen its location.
                inner.node
            }
            TokenKind::Punctuation(PunctuationId::LBracket) => self.rule("array literal", |p| p.array_or_ordered_struct())?,
            TokenKind::Punctuation(PunctuationId::LBrace) => self.rule("struct literal", |p| p.struct_literal())?,
            kind if kind.identifier_like().is_some() => {
                let name = self.token_text(self.peek()).to_string();
                self.advance();
                match scopes::from_str(&name) {
                    Some(scope) => Expr::Scope(scope),
                    None => Expr::Ident(name),
                }
            }
            _ => return Err(self.unexpected(&[Expected::Expression])),
        };
        Ok(self.spanned(node, start))
    }

    /// A quoted string with `#expr#` holes. Doubled quotes and `##` are unescaped.
    fn string_literal(&mut self) -> PResult<Spanned<Expr>> {
        let start = self.current_start();
        let TokenKind::OpenQuote(quote) = self.peek().kind else {
            return Err(self.unexpected(&[Expected::String]));
        };
        self.advance();
        let mut parts = Vec::new();
        loop {
            match self.peek().kind.clone() {
                TokenKind::StringText(raw) => {
                    self.advance();
                    push_text(&mut parts, unescape(&raw, Some(quote)));
                }
                TokenKind::Hash => {
                    let hole = self.hash_expression()?;
                    parts.push(StringPart::Hole(hole));
                }
                TokenKind::CloseQuote(_) => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected(&[Expected::String])),
            }
        }
        Ok(self.spanned(Expr::Str(StringLit { quote: Some(quote), parts }), start))
    }

    /// `#expr#`: the inner expression, located at the inner text.
    fn hash_expression(&mut self) -> PResult<Spanned<Expr>> {
        self.expect_kind(&TokenKind::Hash, Expected::Expression)?;
        let inner = self.expression()?;
        self.expect_kind(&TokenKind::Hash, Expected::Word("#"))?;
        Ok(inner)
    }

    /// `new Name(args)`, `new java:a.b.C(args)` or `new "a.b.C"(args)`.
    fn new_expression(&mut self) -> PResult<Expr> {
        self.expect_keyword(KeywordId::New)?;
        let start = self.current_start();
        let class = if matches!(self.peek().kind, TokenKind::OpenQuote(_)) {
            self.string_literal()?
        } else {
            let name = self.dotted_name()?;
            self.spanned(Expr::Ident(name), start)
        };
        let args = if self.check_punct(PunctuationId::LParen) {
            self.arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New {
            class: Box::new(class),
            args,
        })
    }

    /// `[a, b]`, or `[k: v, ...]` / `[:]` for an ordered struct.
    fn array_or_ordered_struct(&mut self) -> PResult<Expr> {
        self.expect_punct(PunctuationId::LBracket)?;
        if self.check_punct(PunctuationId::Colon) && self.peek_next().kind.is_punctuation(PunctuationId::RBracket) {
            self.advance();
            self.advance();
            return Ok(Expr::Struct {
                ordered: true,
                entries: Vec::new(),
            });
        }
        if self.at_struct_key() {
            let entries = self.struct_entries(PunctuationId::RBracket)?;
            return Ok(Expr::Struct { ordered: true, entries });
        }
        let mut items = Vec::new();
        while !self.check_punct(PunctuationId::RBracket) {
            items.push(self.expression()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RBracket)?;
        Ok(Expr::Array(items))
    }

    /// `{ k: v, k = v }`
    fn struct_literal(&mut self) -> PResult<Expr> {
        self.expect_punct(PunctuationId::LBrace)?;
        let entries = self.struct_entries(PunctuationId::RBrace)?;
        Ok(Expr::Struct { ordered: false, entries })
    }

    /// Whether the current token is a key followed by `:` or `=`.
    fn at_struct_key(&self) -> bool {
        let key = match &self.peek().kind {
            TokenKind::Int(_) => true,
            TokenKind::OpenQuote(_) => {
                // A plain string key: open quote, optional text, close quote.
                let close = if matches!(self.peek_next().kind, TokenKind::StringText(_)) { 2 } else { 1 };
                if !matches!(self.peek_at(close).kind, TokenKind::CloseQuote(_)) {
                    return false;
                }
                let after = &self.peek_at(close + 1).kind;
                return after.is_punctuation(PunctuationId::Colon) || after.is_operator(OperatorId::Assign);
            }
            kind => kind.identifier_like().is_some() || kind.is_word_operator(),
        };
        let next = &self.peek_next().kind;
        key && (next.is_punctuation(PunctuationId::Colon) || next.is_operator(OperatorId::Assign))
    }

    /// Entries up to and including `close`.
    fn struct_entries(&mut self, close: PunctuationId) -> PResult<Vec<StructEntry>> {
        let mut entries = Vec::new();
        while !self.check_punct(close) {
            let start = self.current_start();
            let key = match self.peek().kind.clone() {
                TokenKind::OpenQuote(_) | TokenKind::Int(_) => self.primary()?,
                _ => {
                    let name = self.member_name()?;
                    self.spanned(Expr::Ident(name), start)
                }
            };
            if !self.match_punct(PunctuationId::Colon) {
                self.expect_op(OperatorId::Assign)?;
            }
            let value = self.expression()?;
            entries.push(StructEntry { key, value });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(entries)
    }

    /// `(params) => body`, `(params) -> body` or `x => body`.
    fn lambda(&mut self) -> PResult<Spanned<Expr>> {
        self.rule("lambda", |p| {
            let start = p.current_start();
            let params = if p.check_punct(PunctuationId::LParen) {
                p.parameters()?
            } else {
                let at = p.current_start();
                let name = p.identifier()?;
                vec![p.spanned(
                    ArgumentDecl {
                        required: false,
                        ty: None,
                        name,
                        default: None,
                        annotations: Vec::new(),
                        documentation: Vec::new(),
                    },
                    at,
                )]
            };
            let arrow = if p.match_punct(PunctuationId::FatArrow) {
                Arrow::Fat
            } else {
                p.expect_punct(PunctuationId::Arrow)?;
                Arrow::Thin
            };
            let body = if p.check_punct(PunctuationId::LBrace) {
                LambdaBody::Block(p.block()?)
            } else {
                LambdaBody::Expr(Box::new(p.expression()?))
            };
            Ok(p.spanned(Expr::Lambda { params, body, arrow }, start))
        })
    }
}

/// `not` applies to a whole comparison: its operand binds tighter than `and` but looser than `eq`.
const NOT_OPERAND_PRECEDENCE: u8 = 36;

/// An infix operator found at the current token.
struct Infix {
    op: Option<BinaryOp>,
    precedence: u8,
    right_assoc: bool,
    /// Tokens the operator spans.
    width: usize,
}

impl Infix {
    fn new(op: Option<BinaryOp>, id: OperatorId, width: usize) -> Self {
        let info = operators::info_for(id);
        Self {
            op,
            precedence: info.precedence,
            right_assoc: info.associativity == operators::Associativity::Right,
            width,
        }
    }
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::Scope(_) | Expr::Dot { .. } | Expr::Index { .. } | Expr::StaticAccess { .. }
    ) || matches!(expr, Expr::Str(s) if s.parts.len() == 1 && matches!(s.parts[0], StringPart::Hole(_)))
}

/// Undo doubled quotes and `##` in raw string text.
fn unescape(raw: &str, quote: Option<char>) -> String {
    let mut out = raw.replace("##", "#");
    if let Some(q) = quote {
        let doubled: String = [q, q].iter().collect();
        out = out.replace(&doubled, &q.to_string());
    }
    out
}

/// Append text, merging with a preceding text part.
fn push_text(parts: &mut Vec<StringPart>, text: String) {
    if let Some(StringPart::Text(last)) = parts.last_mut() {
        last.push_str(&text);
    } else {
        parts.push(StringPart::Text(text));
    }
}
