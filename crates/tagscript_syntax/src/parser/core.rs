/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type, the [`EntryPoint`]s it can start from and the [`ParsingResult`] it
/// returns. It also contains a few small internal helper types shared across the other parser chunks.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.
/// - Grammar failures travel as `Err(Issue)` up to the nearest statement list, which reports the issue and
///   synchronizes. Everything else is reported in place and parsing continues.

/// Result of an internal parsing function: the error is the issue to report.
type PResult<T> = Result<T, Issue>;

/// Where parsing starts, and which grammar the text is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Script statements up to end of input.
    Statements,
    /// A script class or interface.
    Declaration,
    Expression,
    Statement,
    /// A template document.
    Template,
    /// A template whose top level is a `component` or `interface` tag.
    TemplateDeclaration,
    Query,
    /// A `/** ... */` comment.
    Doc,
}

impl EntryPoint {
    /// The entry point a configuration asks for.
    pub fn for_config(dialect: Dialect, kind: ProgramKind) -> Self {
        match (dialect, kind) {
            (Dialect::Query, _) => EntryPoint::Query,
            (Dialect::Doc, _) => EntryPoint::Doc,
            (_, ProgramKind::Expression) => EntryPoint::Expression,
            (_, ProgramKind::Statement) => EntryPoint::Statement,
            (Dialect::Template, ProgramKind::Declaration) => EntryPoint::TemplateDeclaration,
            (Dialect::Template, ProgramKind::Document) => EntryPoint::Template,
            (Dialect::Script, ProgramKind::Declaration) => EntryPoint::Declaration,
            (Dialect::Script, ProgramKind::Document) => EntryPoint::Statements,
        }
    }

    /// Lexer mode the text rests in.
    fn resting_mode(self) -> Mode {
        match self {
            EntryPoint::Template | EntryPoint::TemplateDeclaration => Mode::Template,
            EntryPoint::Query => Mode::Query,
            _ => Mode::Script,
        }
    }

    /// Outermost rule name used in grammar-error context.
    fn root_rule(self) -> &'static str {
        match self {
            EntryPoint::Declaration => "box class",
            EntryPoint::Template | EntryPoint::TemplateDeclaration => "box template",
            EntryPoint::Query => "query",
            _ => "box script",
        }
    }

    /// Bracket blamed when only generic grammar errors were found.
    fn fallback_open(self) -> PunctuationId {
        match self {
            EntryPoint::Expression => PunctuationId::LParen,
            _ => PunctuationId::LBrace,
        }
    }
}

/// Outcome of a parse.
///
/// `root` is present whenever the entry rule produced anything, even when issues were found; issue-free results
/// are the ones callers should trust.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingResult {
    pub root: Option<AstNode>,
    pub issues: Vec<Issue>,
    /// Every comment in the text, in source order.
    pub comments: Vec<Comment>,
}

impl ParsingResult {
    /// `true` when no issue was reported.
    pub fn is_correct(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Parser state.
///
/// ## Notes
/// - The token vector holds default-channel, reclassified tokens and always ends with `Eof`.
/// - Token spans are byte ranges of `text`; positions are produced by [`Parser::locate`], which applies `offset`.
pub struct Parser<'a> {
    text: &'a str,
    source: SourceRef,
    entry: EntryPoint,
    lexer: Lexer<'a>,
    tokens: Vec<Token>,
    pos: usize,
    line_index: LineIndex,
    offset: Offset,
    flavor: Flavor,
    registry: &'a dyn TagRegistry,
    config: &'a ParserConfig,
    issues: Vec<Issue>,
    comments: Vec<Comment>,
    /// Active grammar rules, outermost first.
    rules: Vec<&'static str>,
    /// Alternatives tried at the current token.
    expected: Vec<Expected>,
    unexpected_ends: Vec<Span>,
    depth: usize,
    is_sub_parser: bool,
    /// Set once the nesting limit was hit; no further issues are collected.
    aborted: bool,
    internal: Option<String>,
}

impl<'a> Parser<'a> {
    /// Create a parser for a whole text.
    ///
    /// ## Parameters
    /// - `text`: The text to parse, usually `source.text()`.
    /// - `source`: Where the text came from; stamped on every position.
    /// - `registry`: Tag/component names the script dialect may invoke as statements.
    pub fn new(
        text: &'a str,
        entry: EntryPoint,
        source: SourceRef,
        registry: &'a dyn TagRegistry,
        config: &'a ParserConfig,
    ) -> Self {
        Self::with_context(text, entry, source, registry, config, config.offset, 0, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn with_context(
        text: &'a str,
        entry: EntryPoint,
        source: SourceRef,
        registry: &'a dyn TagRegistry,
        config: &'a ParserConfig,
        offset: Offset,
        depth: usize,
        is_sub_parser: bool,
    ) -> Self {
        let flavor = config.flavor();
        let mut lexer = Lexer::new(text, entry.resting_mode(), flavor);
        let (tokens, unexpected_ends) = if entry == EntryPoint::Doc {
            let end = text.len();
            (vec![Token::new(TokenKind::Eof, Span::new(end, end))], Vec::new())
        } else {
            let raw = lexer.tokenize().to_vec();
            let reclassified = crate::reclassify::reclassify(raw, text, flavor);
            let tokens: Vec<Token> = reclassified.tokens.into_iter().filter(|t| !t.is_hidden()).collect();
            (tokens, reclassified.unexpected_ends)
        };
        Self {
            text,
            source,
            entry,
            lexer,
            tokens,
            pos: 0,
            line_index: LineIndex::new(text),
            offset,
            flavor,
            registry,
            config,
            issues: Vec::new(),
            comments: Vec::new(),
            rules: Vec::new(),
            expected: Vec::new(),
            unexpected_ends,
            depth,
            is_sub_parser,
            aborted: false,
            internal: None,
        }
    }

    /// Parse the text from this parser's entry point.
    ///
    /// ## Errors
    /// Returns [`ParseError::Internal`] only for an internal inconsistency that no reported issue explains.
    /// Malformed input never produces an `Err`.
    pub fn parse(mut self) -> Result<ParsingResult, ParseError> {
        let mut root = self.run();
        if !self.is_sub_parser {
            if let Some(node) = root.as_mut() {
                if self.config.associate_comments {
                    comments::associate(node, &self.comments);
                }
                transpile::transpile(node, self.flavor, &self.config.transpile, &mut self.issues);
            }
        }
        if let Some(message) = self.internal.take() {
            if self.issues.is_empty() {
                return Err(ParseError::internal(message));
            }
        }
        self.comments.sort_by(|a, b| a.pos.start.cmp(&b.pos.start));
        Ok(ParsingResult {
            root,
            issues: self.issues,
            comments: self.comments,
        })
    }

    /// Run the entry rule, then the end-of-parse checks and comment extraction.
    fn run(&mut self) -> Option<AstNode> {
        for span in std::mem::take(&mut self.unexpected_ends) {
            let issue = messages::unexpected_expression_end(self.locate(span));
            self.report(issue);
        }
        self.rules.push(self.entry.root_rule());
        let root = match self.entry {
            EntryPoint::Statements => Some(self.script_document()),
            EntryPoint::Declaration => self.declaration_document(),
            EntryPoint::Expression => self.expression_document(),
            EntryPoint::Statement => self.statement_document(),
            EntryPoint::Template => Some(self.template_document()),
            EntryPoint::TemplateDeclaration => self.template_declaration_document(),
            EntryPoint::Query => self.query_document(),
            EntryPoint::Doc => Some(self.doc_document()),
        };
        self.rules.pop();
        self.validate();
        self.collect_comments();
        tracing::debug!(
            entry = ?self.entry,
            issues = self.issues.len(),
            comments = self.comments.len(),
            sub_parser = self.is_sub_parser,
            "parsed"
        );
        root
    }

    // ========================================================================
    // Document roots
    // ========================================================================

    fn whole_span(&self) -> Span {
        Span::new(0, self.text.len())
    }

    fn script_document(&mut self) -> AstNode {
        let statements = self.statement_list();
        let span = self.whole_span();
        AstNode::Script(self.node_at(Script { statements }, span))
    }

    fn expression_document(&mut self) -> Option<AstNode> {
        match self.expression() {
            Ok(expr) => Some(AstNode::Expression(expr)),
            Err(issue) => {
                self.report(issue);
                None
            }
        }
    }

    fn statement_document(&mut self) -> Option<AstNode> {
        while self.match_punct(PunctuationId::Semicolon) {}
        match self.statement() {
            Ok(stmt) => Some(AstNode::Statement(stmt)),
            Err(issue) => {
                self.report(issue);
                None
            }
        }
    }
}
