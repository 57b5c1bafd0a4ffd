//! Failures of the parse API itself.
//!
//! Malformed input is never an error here: it comes back as issues inside a
//! [`ParsingResult`](crate::parser::ParsingResult). `ParseError` covers reading the input and internal
//! inconsistencies that were not explained by an issue already reported.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal parser error: {message}")]
    Internal { message: String },
}

impl ParseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ParseError::Internal {
            message: message.into(),
        }
    }
}
