// ============================================================================
// Public entry points
// ============================================================================

/// Parse `text` as the dialect and program kind named by `config`.
///
/// This is the main public entrypoint for parsing in-memory code.
///
/// ## Parameters
/// - `text`: The code to parse.
/// - `config`: Dialect, flavor, program kind, starting offset and limits.
/// - `registry`: Tag/component names the script dialect may invoke as statements.
///
/// ## Errors
/// Returns [`ParseError::Internal`] only for an inconsistency no reported issue explains. Syntax problems are
/// reported in [`ParsingResult::issues`].
#[tracing::instrument(skip_all, fields(len = text.len(), source_type = %config.source_type))]
pub fn parse(text: &str, config: &ParserConfig, registry: &dyn TagRegistry) -> Result<ParsingResult, ParseError> {
    let entry = EntryPoint::for_config(config.source_type.dialect, config.program_kind);
    Parser::new(text, entry, Source::code(text), registry, config).parse()
}

/// Parse an already loaded [`Source`]; positions carry `source`.
#[tracing::instrument(skip_all, fields(source = %source.name(), source_type = %config.source_type))]
pub fn parse_source(
    source: &SourceRef,
    config: &ParserConfig,
    registry: &dyn TagRegistry,
) -> Result<ParsingResult, ParseError> {
    let entry = EntryPoint::for_config(config.source_type.dialect, config.program_kind);
    Parser::new(source.text(), entry, source.clone(), registry, config).parse()
}

/// Read and parse a file, detecting its dialect, flavor and program kind from the path (and content).
///
/// `base` supplies every other setting (offset, limits, transpile options).
///
/// ## Errors
/// Returns [`ParseError::Io`] when the file cannot be read.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn parse_file(path: &Path, base: &ParserConfig, registry: &dyn TagRegistry) -> Result<ParsingResult, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
    let detection = detect::detect(path, &text);
    tracing::debug!(source_type = %detection.source_type, kind = detection.program_kind.name(), "detected");
    let mut config = base.clone();
    config.source_type = detection.source_type;
    config.program_kind = detection.program_kind;
    let source = Source::file(path, text);
    parse_source(&source, &config, registry)
}

/// Parse `text` as a single expression (script grammar), whatever `config.program_kind` says.
#[tracing::instrument(skip_all, fields(len = text.len()))]
pub fn parse_expression(
    text: &str,
    config: &ParserConfig,
    registry: &dyn TagRegistry,
) -> Result<ParsingResult, ParseError> {
    Parser::new(text, EntryPoint::Expression, Source::code(text), registry, config).parse()
}

/// Parse `text` as a single statement (script grammar), whatever `config.program_kind` says.
#[tracing::instrument(skip_all, fields(len = text.len()))]
pub fn parse_statement(
    text: &str,
    config: &ParserConfig,
    registry: &dyn TagRegistry,
) -> Result<ParsingResult, ParseError> {
    Parser::new(text, EntryPoint::Statement, Source::code(text), registry, config).parse()
}

/// Parse a fragment of a larger document.
///
/// The fragment behaves like one created during a parse: positions are shifted by `offset` (columns only on the
/// fragment's first line), and neither the whole-tree rewrite nor comment association runs.
#[tracing::instrument(skip_all, fields(len = text.len(), entry = ?entry, line = offset.line, column = offset.column))]
pub fn parse_fragment(
    text: &str,
    offset: Offset,
    entry: EntryPoint,
    config: &ParserConfig,
    registry: &dyn TagRegistry,
) -> Result<ParsingResult, ParseError> {
    Parser::with_context(text, entry, Source::code(text), registry, config, offset, 0, true).parse()
}
