//! CLI command implementations
//!
//! Every command returns `CliResult<ExitCode>`; the caller owns process exit.

use std::fs;
use std::path::{Path, PathBuf};

use tagscript_core::Flavor;
use tagscript_core::lang::components::BuiltinComponents;
use tagscript_syntax::config::{Dialect, ParserConfig, ProgramKind, SourceType};
use tagscript_syntax::detect;
use tagscript_syntax::diagnostics::Issue;
use tagscript_syntax::diagnostics::report::IssueReport;
use tagscript_syntax::lexer::{self, Mode};
use tagscript_syntax::parser::{self, ParsingResult};
use tagscript_syntax::reclassify;
use tagscript_syntax::source::{Source, SourceRef};

use super::{CliError, CliResult, ExitCode, ParseOptions};

/// Maximum source file size (100 MB)
///
/// Larger files are rejected before reading.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

/// Parser configuration for `path`: detection first, then the command-line overrides.
pub fn config_for(path: &Path, text: &str, options: &ParseOptions) -> ParserConfig {
    let detection = detect::detect(path, text);
    apply_options(
        ParserConfig::new(detection.source_type).with_kind(detection.program_kind),
        options,
    )
}

/// Inline code is a Box script document unless overridden.
fn config_for_code(options: &ParseOptions) -> ParserConfig {
    apply_options(ParserConfig::new(SourceType::new(Dialect::Script, Flavor::Box)), options)
}

fn apply_options(mut config: ParserConfig, options: &ParseOptions) -> ParserConfig {
    if let Some(dialect) = options.dialect {
        config.source_type.dialect = dialect.into();
    }
    if let Some(flavor) = options.flavor {
        config.source_type.flavor = flavor.into();
    }
    if let Some(kind) = options.kind {
        config.program_kind = kind.into();
    }
    if let Some(max_depth) = options.max_depth {
        config.max_depth = max_depth;
    }
    config
}

fn parse_with(source: &SourceRef, config: &ParserConfig) -> CliResult<ParsingResult> {
    parser::parse_source(source, config, &BuiltinComponents).map_err(|e| CliError::failure(e.to_string()))
}

/// Print every issue with its source context.
fn render_issues(issues: &[Issue]) {
    for issue in issues {
        let report = miette::Report::new(IssueReport::new(issue));
        eprintln!("{report:?}");
    }
}

/// Parse files (walking directories) and report every issue.
#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub fn check_paths(paths: &[PathBuf], options: &ParseOptions) -> CliResult<ExitCode> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(CliError::failure(format!("Path not found: {}", path.display())));
        }
        files.extend(collect_source_files(path));
    }

    if files.is_empty() {
        println!("No source files found");
        return Ok(ExitCode::SUCCESS);
    }

    let mut issue_count = 0;
    let mut failed_files = 0;
    for file in &files {
        let text = read_source(file)?;
        let config = config_for(file, &text, options);
        tracing::debug!(file = %file.display(), source_type = %config.source_type, kind = config.program_kind.name(), "checking");
        let result = parse_with(&Source::file(file, text), &config)?;
        if !result.is_correct() {
            failed_files += 1;
            issue_count += result.issues.len();
            render_issues(&result.issues);
        }
    }

    if issue_count > 0 {
        eprintln!(
            "\n{} issue(s) in {} of {} file(s)",
            issue_count,
            failed_files,
            files.len()
        );
        return Err(CliError::new("", ExitCode::FAILURE));
    }

    println!("✓ {} file(s) checked, no issues", files.len());
    Ok(ExitCode::SUCCESS)
}

/// Check inline code given with `-c`.
pub fn check_code(code: &str, options: &ParseOptions) -> CliResult<ExitCode> {
    let config = config_for_code(options);
    let result = parse_with(&Source::code(code), &config)?;
    if result.is_correct() {
        println!("✓ No issues");
        return Ok(ExitCode::SUCCESS);
    }
    render_issues(&result.issues);
    Err(CliError::new("", ExitCode::FAILURE))
}

/// Parse and display AST.
///
/// `kind` (from `--expression` / `--statement`) wins over `--kind` and detection.
pub fn parse_file(path: &Path, options: &ParseOptions, kind: Option<ProgramKind>) -> CliResult<ExitCode> {
    let text = read_source(path)?;
    let mut config = config_for(path, &text, options);
    if let Some(kind) = kind {
        config.program_kind = kind;
    }
    let result = parse_with(&Source::file(path, text), &config)?;

    match &result.root {
        Some(root) => println!("{:#?}", root),
        None => println!("<no tree>"),
    }
    if result.is_correct() {
        return Ok(ExitCode::SUCCESS);
    }
    render_issues(&result.issues);
    Err(CliError::new("", ExitCode::FAILURE))
}

/// Lex and display raw tokens, reclassified tokens and the final mode stack.
pub fn lex_file(path: &Path, options: &ParseOptions) -> CliResult<ExitCode> {
    let text = read_source(path)?;
    let config = config_for(path, &text, options);
    let flavor = config.flavor();
    let resting = match config.source_type.dialect {
        Dialect::Template => Mode::Template,
        Dialect::Query => Mode::Query,
        Dialect::Script | Dialect::Doc => Mode::Script,
    };

    let outcome = lexer::lex(&text, resting, flavor);
    println!("== raw tokens ({}) ==", config.source_type);
    for tok in &outcome.tokens {
        println!("{:?} {:?}", tok, tok.text(&text));
    }

    let reclassified = reclassify::reclassify(outcome.tokens.clone(), &text, flavor);
    println!("== reclassified ==");
    for tok in reclassified.tokens.iter().filter(|t| !t.is_hidden()) {
        println!("{:?} {:?}", tok.kind, tok.text(&text));
    }
    for span in &reclassified.unexpected_ends {
        println!("unexpected tag start at byte {}", span.start);
    }

    let modes: Vec<&str> = outcome.modes.unpopped().into_iter().map(Mode::name).collect();
    println!("== modes (innermost first) ==");
    println!("{}", modes.join(" > "));
    Ok(ExitCode::SUCCESS)
}

/// Print what detection decides for a file.
pub fn detect_file(path: &Path) -> CliResult<ExitCode> {
    let text = read_source(path)?;
    let detection = detect::detect(path, &text);
    println!(
        "{}: {} ({})",
        path.display(),
        detection.source_type,
        detection.program_kind.name()
    );
    Ok(ExitCode::SUCCESS)
}

/// Files under `path` with an extension detection knows; a file argument is taken as is.
fn collect_source_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            let mut entries: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
            entries.sort();
            for entry_path in entries {
                if entry_path.is_dir() {
                    let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    if !name.starts_with('.') && name != "target" && name != "node_modules" {
                        files.extend(collect_source_files(&entry_path));
                    }
                } else if detect::is_known(&entry_path) {
                    files.push(entry_path);
                }
            }
        }
    }

    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{DialectArg, FlavorArg, KindArg};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tagscript-cli-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn config_uses_detection_then_overrides() {
        let path = Path::new("page.cfm");
        let config = config_for(path, "", &ParseOptions::default());
        assert_eq!(config.source_type, SourceType::new(Dialect::Template, Flavor::Cf));
        assert_eq!(config.program_kind, ProgramKind::Document);

        let options = ParseOptions {
            dialect: Some(DialectArg::Script),
            flavor: Some(FlavorArg::Box),
            kind: Some(KindArg::Expression),
            max_depth: Some(12),
        };
        let config = config_for(path, "", &options);
        assert_eq!(config.source_type, SourceType::new(Dialect::Script, Flavor::Box));
        assert_eq!(config.program_kind, ProgramKind::Expression);
        assert_eq!(config.max_depth, 12);
    }

    #[test]
    fn inline_code_defaults_to_box_script() {
        let config = config_for_code(&ParseOptions::default());
        assert_eq!(config.source_type, SourceType::new(Dialect::Script, Flavor::Box));
        assert_eq!(config.program_kind, ProgramKind::Document);
    }

    #[test]
    fn directory_walk_keeps_known_extensions() {
        let dir = scratch_dir("walk");
        fs::write(dir.join("a.cfm"), "<cfset x = 1>").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub").join("b.bxs"), "y = 2;").unwrap();
        fs::create_dir_all(dir.join(".hidden")).unwrap();
        fs::write(dir.join(".hidden").join("c.cfm"), "").unwrap();

        let files = collect_source_files(&dir);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.cfm", "b.bxs"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn check_reports_failure_on_issues() {
        let dir = scratch_dir("check");
        let good = dir.join("good.bxs");
        let bad = dir.join("bad.bxs");
        fs::write(&good, "x = 1;").unwrap();
        fs::write(&bad, "x = ;").unwrap();

        assert_eq!(check_paths(&[good], &ParseOptions::default()).unwrap(), ExitCode::SUCCESS);
        let err = check_paths(&[bad], &ParseOptions::default()).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = check_paths(&[PathBuf::from("/definitely/not/here.cfm")], &ParseOptions::default()).unwrap_err();
        assert!(err.message.contains("Path not found"));
    }

    #[test]
    fn inline_check() {
        assert_eq!(check_code("a = b + 1;", &ParseOptions::default()).unwrap(), ExitCode::SUCCESS);
        assert!(check_code("a = (b + 1;", &ParseOptions::default()).is_err());
    }
}
