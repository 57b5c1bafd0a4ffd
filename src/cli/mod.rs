//! CLI module for tagscript
//!
//! This module provides the command-line interface over the syntax front end.
//!
//! ## Commands
//!
//! - `check <path>...` - Parse files (directories are walked) and report every issue
//! - `parse <file>` - Parse and print the canonical AST
//! - `lex <file>` - Print raw and reclassified tokens and the final mode stack
//! - `detect <file>` - Print the detected dialect, flavor and program kind
//!
//! `tagscript <file>` checks a single file, and `tagscript -c <code>` checks inline code.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tagscript_core::Flavor;
use tagscript_syntax::config::{Dialect, ProgramKind};
use thiserror::Error;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Parse and check tag-based templates, scripts and queries
#[derive(Parser, Debug)]
#[command(name = "tagscript")]
#[command(version = VERSION)]
#[command(about = "Parse and check tag-based templates, scripts and queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File to check (default action when no subcommand given)
    #[arg(value_name = "FILE", conflicts_with = "code")]
    pub file: Option<PathBuf>,

    /// Check inline source code
    #[arg(short = 'c', long = "command", value_name = "CODE")]
    pub code: Option<String>,

    #[command(flatten)]
    pub options: ParseOptions,
}

/// Overrides for what detection (or the inline-code default) decides.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Dialect to parse with
    #[arg(long, value_enum, global = true)]
    pub dialect: Option<DialectArg>,

    /// Language flavor
    #[arg(long, value_enum, global = true)]
    pub flavor: Option<FlavorArg>,

    /// Expected program shape
    #[arg(long, value_enum, global = true)]
    pub kind: Option<KindArg>,

    /// Nesting limit for statements, expressions and sub-parses
    #[arg(long, value_name = "N", global = true)]
    pub max_depth: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Script,
    Template,
    Query,
    Doc,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Script => Dialect::Script,
            DialectArg::Template => Dialect::Template,
            DialectArg::Query => Dialect::Query,
            DialectArg::Doc => Dialect::Doc,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorArg {
    Box,
    Cf,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Box => Flavor::Box,
            FlavorArg::Cf => Flavor::Cf,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Document,
    Declaration,
    Expression,
    Statement,
}

impl From<KindArg> for ProgramKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Document => ProgramKind::Document,
            KindArg::Declaration => ProgramKind::Declaration,
            KindArg::Expression => ProgramKind::Expression,
            KindArg::Statement => ProgramKind::Statement,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse files and report every issue
    Check {
        /// Files or directories to check
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Parse a file and print its AST
    Parse {
        /// Source file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Parse the whole file as one expression
        #[arg(long, conflicts_with = "statement")]
        expression: bool,
        /// Parse the whole file as one statement
        #[arg(long)]
        statement: bool,
    },

    /// Print raw and reclassified tokens (debug)
    Lex {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the detected source type of a file
    Detect {
        /// File to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let options = cli.options;
    match cli.command {
        Some(Command::Check { paths }) => commands::check_paths(&paths, &options),
        Some(Command::Parse {
            file,
            expression,
            statement,
        }) => {
            let kind = if expression {
                Some(ProgramKind::Expression)
            } else if statement {
                Some(ProgramKind::Statement)
            } else {
                None
            };
            commands::parse_file(&file, &options, kind)
        }
        Some(Command::Lex { file }) => commands::lex_file(&file, &options),
        Some(Command::Detect { file }) => commands::detect_file(&file),
        None => {
            if let Some(code) = cli.code {
                if code.is_empty() {
                    return Err(CliError::failure("Error: -c/--command requires source code string"));
                }
                commands::check_code(&code, &options)
            } else if let Some(file) = cli.file {
                commands::check_paths(&[file], &options)
            } else {
                // No command and no file - show help
                Err(CliError::new("", ExitCode::FAILURE))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["tagscript", "check", "a.cfm", "src/"]).unwrap();
        if let Some(Command::Check { paths }) = cli.command {
            assert_eq!(paths, vec![PathBuf::from("a.cfm"), PathBuf::from("src/")]);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_check_requires_a_path() {
        assert!(Cli::try_parse_from(["tagscript", "check"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_entry_flags() {
        let cli = Cli::try_parse_from(["tagscript", "parse", "x.bxs", "--expression"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Parse { expression: true, statement: false, .. })));

        assert!(Cli::try_parse_from(["tagscript", "parse", "x.bxs", "--expression", "--statement"]).is_err());
    }

    #[test]
    fn test_cli_inline_code() {
        let cli = Cli::try_parse_from(["tagscript", "-c", "x = 1;"]).unwrap();
        assert_eq!(cli.code.as_deref(), Some("x = 1;"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "tagscript",
            "lex",
            "x.cfm",
            "--dialect",
            "query",
            "--flavor",
            "cf",
            "--kind",
            "statement",
            "--max-depth",
            "32",
        ])
        .unwrap();
        assert_eq!(cli.options.dialect, Some(DialectArg::Query));
        assert_eq!(cli.options.flavor, Some(FlavorArg::Cf));
        assert_eq!(cli.options.kind, Some(KindArg::Statement));
        assert_eq!(cli.options.max_depth, Some(32));
        assert_eq!(Dialect::from(DialectArg::Query), Dialect::Query);
    }

    #[test]
    fn test_cli_default_file() {
        let cli = Cli::try_parse_from(["tagscript", "index.cfm"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("index.cfm")));
        assert!(Cli::try_parse_from(["tagscript", "index.cfm", "-c", "x"]).is_err());
    }
}
