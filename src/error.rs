/// Error types for the translation pipeline.
use crate::lexer::Position;
use std::fmt;

/// Main error type for the translator.
#[derive(Debug)]
pub enum MarkdownError {
    /// Parsing errors (AST construction phase).
    Parse { position: Position, expected: String },

    /// I/O related errors from the character source or sink.
    Io { source: std::io::Error },
}

impl MarkdownError {
    pub(crate) fn parse(position: Position, expected: impl Into<String>) -> Self {
        MarkdownError::Parse {
            position,
            expected: expected.into(),
        }
    }
}

impl fmt::Display for MarkdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkdownError::Parse { position, expected } => {
                write!(
                    f,
                    "Parse error at line {}, column {}: expected {}",
                    position.line, position.column, expected
                )
            }
            MarkdownError::Io { source } => {
                write!(f, "IO error: {}", source)
            }
        }
    }
}

impl std::error::Error for MarkdownError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarkdownError::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MarkdownError {
    fn from(error: std::io::Error) -> Self {
        MarkdownError::Io { source: error }
    }
}

/// Convenience type alias for Results in the translator.
pub type Result<T> = std::result::Result<T, MarkdownError>;
