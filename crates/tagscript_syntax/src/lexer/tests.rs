use super::*;
use tagscript_core::lang::keywords::KeywordId;

fn kinds(source: &str, resting: Mode, flavor: Flavor) -> Vec<TokenKind> {
    lex(source, resting, flavor)
        .tokens
        .into_iter()
        .filter(|t| !t.is_hidden() && t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn script(source: &str) -> Vec<TokenKind> {
    kinds(source, Mode::Script, Flavor::Box)
}

fn cf_template(source: &str) -> Vec<TokenKind> {
    kinds(source, Mode::Template, Flavor::Cf)
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.to_string())
}

#[test]
fn test_script_assignment_with_word_operator() {
    assert_eq!(
        script("x = a AND b;"),
        vec![
            ident("x"),
            TokenKind::Operator(OperatorId::Assign),
            ident("a"),
            TokenKind::Operator(OperatorId::And),
            ident("b"),
            TokenKind::Punctuation(PunctuationId::Semicolon),
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(script("IF")[0], TokenKind::Keyword(KeywordId::If));
    assert_eq!(script("Function")[0], TokenKind::Keyword(KeywordId::Function));
    assert_eq!(script("myVar")[0], ident("myVar"));
}

#[test]
fn test_elseif_is_a_keyword_only_in_cf_script() {
    assert_eq!(script("elseif"), vec![ident("elseif")]);
    assert_eq!(
        kinds("elseif", Mode::Script, Flavor::Cf),
        vec![TokenKind::Keyword(KeywordId::ElseIf)]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        script("1 2.5 1e3 1e-2"),
        vec![
            TokenKind::Int("1".into()),
            TokenKind::Float("2.5".into()),
            TokenKind::Float("1e3".into()),
            TokenKind::Float("1e-2".into()),
        ]
    );
    assert_eq!(script("x = .5")[2], TokenKind::Float(".5".into()));
    // Member access after a value is not a number.
    assert_eq!(
        script("a.5"),
        vec![ident("a"), TokenKind::Punctuation(PunctuationId::Dot), TokenKind::Int("5".into())]
    );
}

#[test]
fn test_maximal_munch_symbols() {
    assert_eq!(
        script("a === b ?: c?.d <> e"),
        vec![
            ident("a"),
            TokenKind::Operator(OperatorId::EqEqEq),
            ident("b"),
            TokenKind::Operator(OperatorId::Elvis),
            ident("c"),
            TokenKind::Punctuation(PunctuationId::SafeDot),
            ident("d"),
            TokenKind::Operator(OperatorId::NotEq),
            ident("e"),
        ]
    );
}

#[test]
fn test_string_with_interpolation_hole() {
    let outcome = lex(r#""a#b#c""#, Mode::Script, Flavor::Box);
    assert!(!outcome.modes.is_unpopped());
    let kinds: Vec<_> = outcome.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::OpenQuote('"'),
            TokenKind::StringText("a".into()),
            TokenKind::Hash,
            ident("b"),
            TokenKind::Hash,
            TokenKind::StringText("c".into()),
            TokenKind::CloseQuote('"'),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_doubled_quotes_and_hashes_stay_in_text() {
    assert_eq!(
        script("'it''s ##1'"),
        vec![
            TokenKind::OpenQuote('\''),
            TokenKind::StringText("it''s ##1".into()),
            TokenKind::CloseQuote('\''),
        ]
    );
}

#[test]
fn test_unterminated_string_leaves_mode_pushed() {
    let outcome = lex("x = \"abc", Mode::Script, Flavor::Box);
    assert_eq!(outcome.modes.unpopped(), vec![Mode::DoubleQuote, Mode::Script]);

    let outcome = lex("x = \"a#b", Mode::Script, Flavor::Box);
    assert_eq!(outcome.modes.unpopped(), vec![Mode::Hash, Mode::DoubleQuote, Mode::Script]);
}

#[test]
fn test_comments_are_hidden() {
    let outcome = lex("// line\n/** doc */ /* block */ x", Mode::Script, Flavor::Box);
    let hidden: Vec<_> = outcome
        .tokens
        .iter()
        .filter(|t| t.kind.is_comment())
        .map(|t| t.kind.clone())
        .collect();
    assert_eq!(
        hidden,
        vec![TokenKind::LineComment, TokenKind::DocComment, TokenKind::BlockComment]
    );
    assert!(outcome.tokens.iter().filter(|t| t.kind.is_comment()).all(|t| t.is_hidden()));
}

#[test]
fn test_unterminated_block_comment() {
    let outcome = lex("x /* never closed", Mode::Script, Flavor::Box);
    assert_eq!(outcome.modes.top(), Mode::BlockComment);
}

#[test]
fn test_box_component_prefix() {
    assert_eq!(
        script("bx:http url=\"x\";")[..2],
        [TokenKind::ComponentPrefix, ident("http")]
    );
    // Cf flavor has no script prefix.
    assert_eq!(kinds("bx:http", Mode::Script, Flavor::Cf)[0], ident("bx"));
}

#[test]
fn test_template_island_in_script() {
    let outcome = lex("x = 1; ```<bx:output>hi</bx:output>``` y = 2;", Mode::Script, Flavor::Box);
    assert!(!outcome.modes.is_unpopped());
    let kinds: Vec<_> = outcome.tokens.iter().map(|t| t.kind.clone()).collect();
    assert!(kinds.contains(&TokenKind::TemplateIslandStart));
    assert!(kinds.contains(&TokenKind::TemplateIslandEnd));
    assert!(kinds.contains(&TokenKind::ComponentName("output".into())));
}

#[test]
fn test_template_tag_with_expression() {
    assert_eq!(
        cf_template("<cfif x GT 1>yes</cfif>"),
        vec![
            TokenKind::ComponentOpen,
            TokenKind::Prefix("cf".into()),
            TokenKind::ComponentName("if".into()),
            ident("x"),
            TokenKind::Operator(OperatorId::GreaterThan),
            TokenKind::Int("1".into()),
            TokenKind::ComponentClose,
            TokenKind::ContentText("yes".into()),
            TokenKind::ComponentSlashOpen,
            TokenKind::Prefix("cf".into()),
            TokenKind::ComponentName("if".into()),
            TokenKind::ComponentClose,
        ]
    );
}

#[test]
fn test_tag_head_attributes() {
    assert_eq!(
        cf_template("<cfloop index=i from=\"1\" to=#n#/>"),
        vec![
            TokenKind::ComponentOpen,
            TokenKind::Prefix("cf".into()),
            TokenKind::ComponentName("loop".into()),
            TokenKind::AttrName("index".into()),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::UnquotedValue("i".into()),
            TokenKind::AttrName("from".into()),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::OpenQuote('"'),
            TokenKind::StringText("1".into()),
            TokenKind::CloseQuote('"'),
            TokenKind::AttrName("to".into()),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::Hash,
            ident("n"),
            TokenKind::Hash,
            TokenKind::ComponentSlashClose,
        ]
    );
}

#[test]
fn test_output_body_interpolates_and_keeps_escaped_hash() {
    let outcome = lex("<cfoutput>#x# ## y</cfoutput>#z#", Mode::Template, Flavor::Cf);
    assert!(!outcome.modes.is_unpopped());
    let kinds: Vec<_> = outcome
        .tokens
        .into_iter()
        .filter(|t| !t.is_hidden())
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds[3], TokenKind::ComponentClose);
    assert_eq!(kinds[4], TokenKind::Hash);
    assert_eq!(kinds[5], ident("x"));
    assert_eq!(kinds[6], TokenKind::Hash);
    assert_eq!(kinds[7], TokenKind::ContentText(" ## y".into()));
    // Outside `output`, `#` is plain text.
    assert!(kinds.contains(&TokenKind::ContentText("#z#".into())));
}

#[test]
fn test_script_island_body_is_raw_text() {
    let kinds = cf_template("<cfscript>if (a < b) { x = 1; }</cfscript>");
    assert_eq!(kinds[4], TokenKind::IslandText("if (a < b) { x = 1; }".into()));
    assert_eq!(kinds[5], TokenKind::ComponentSlashOpen);
}

#[test]
fn test_unclosed_script_island() {
    let outcome = lex("<cfscript>x = 1;", Mode::Template, Flavor::Cf);
    assert_eq!(outcome.modes.top(), Mode::ScriptIsland);
}

#[test]
fn test_component_close_equal_is_raw() {
    let kinds = cf_template("<cfif x>=");
    assert!(kinds.contains(&TokenKind::ComponentCloseEqual));
}

#[test]
fn test_unexpected_expression_end() {
    let outcome = lex("<cfset x = <cfoutput>", Mode::Template, Flavor::Cf);
    let kinds: Vec<_> = outcome.tokens.iter().map(|t| t.kind.clone()).collect();
    assert!(kinds.contains(&TokenKind::UnexpectedExpressionEnd));
    assert!(kinds.contains(&TokenKind::ComponentName("output".into())));
    assert!(!outcome.modes.contains(Mode::TagExpression));
}

#[test]
fn test_nested_tag_comments() {
    let outcome = lex("<!--- a <!--- b ---> c --->text", Mode::Template, Flavor::Cf);
    assert!(!outcome.modes.is_unpopped());
    let kinds: Vec<_> = outcome.tokens.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(kinds, vec![TokenKind::TagComment, TokenKind::ContentText("text".into()), TokenKind::Eof]);

    let outcome = lex("<!--- a <!--- b --->", Mode::Template, Flavor::Cf);
    assert_eq!(outcome.modes.top(), Mode::TagComment);
}

#[test]
fn test_box_template_prefix() {
    let kinds = kinds("<bx:set x = 1>", Mode::Template, Flavor::Box);
    assert_eq!(kinds[1], TokenKind::Prefix("bx:".into()));
    assert_eq!(kinds[2], TokenKind::ComponentName("set".into()));
    // `<cfset>` is plain text in the Box flavor.
    let kinds = self::kinds("<cfset x = 1>", Mode::Template, Flavor::Box);
    assert_eq!(kinds, vec![TokenKind::ContentText("<cfset x = 1>".into())]);
}

#[test]
fn test_query_tokens() {
    assert_eq!(
        kinds("SELECT [name] FROM t WHERE a = ? AND b = :id AND c = 'it''s'", Mode::Query, Flavor::Box),
        vec![
            ident("SELECT"),
            TokenKind::QuotedIdent("name".into()),
            ident("FROM"),
            ident("t"),
            ident("WHERE"),
            ident("a"),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::Placeholder("?".into()),
            ident("AND"),
            ident("b"),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::Placeholder("id".into()),
            ident("AND"),
            ident("c"),
            TokenKind::Operator(OperatorId::Assign),
            TokenKind::QueryString("it''s".into()),
        ]
    );
}

#[test]
fn test_find_unclosed_token_returns_innermost() {
    let mut lexer = Lexer::new("{ a { b } { c", Mode::Script, Flavor::Box);
    lexer.tokenize();
    let token = lexer
        .find_unclosed_token(PunctuationId::LBrace, PunctuationId::RBrace)
        .expect("unclosed brace");
    assert_eq!(token.span.start, 10);
}

#[test]
fn test_find_previous_token_and_siblings() {
    let mut lexer = Lexer::new("<cfhttp url=\"x\"><cfset y = 1>", Mode::Template, Flavor::Cf);
    lexer.tokenize();
    let found = lexer.find_previous_token_and_siblings(|k| *k == TokenKind::ComponentOpen, 2);
    let texts: Vec<_> = found.iter().map(|t| t.text(lexer.source())).collect();
    assert_eq!(texts, vec!["<", "cf", "set"]);
}

#[test]
fn test_rescan_is_deterministic() {
    let mut lexer = Lexer::new("<cfoutput>#a#</cfoutput>", Mode::Template, Flavor::Cf);
    let first = lexer.tokenize().to_vec();
    assert_eq!(lexer.rescan(), first);
}

#[test]
fn test_tag_with_expression_token_dump() {
    let source = "<cfif x GT 1>yes</cfif>";
    let dump: Vec<String> = lex(source, Mode::Template, Flavor::Cf)
        .tokens
        .iter()
        .filter(|t| !t.is_hidden() && t.kind != TokenKind::Eof)
        .map(|t| format!("{:?} {:?}", t.kind, t.text(source)))
        .collect();
    insta::assert_snapshot!(dump.join("\n"), @r#"
    ComponentOpen "<"
    Prefix("cf") "cf"
    ComponentName("if") "if"
    Ident("x") "x"
    Operator(GreaterThan) "GT"
    Int("1") "1"
    ComponentClose ">"
    ContentText("yes") "yes"
    ComponentSlashOpen "</"
    Prefix("cf") "cf"
    ComponentName("if") "if"
    ComponentClose ">"
    "#);
}
