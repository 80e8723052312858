//! Shared error types for the application

use thiserror::Error;

/// Location and description of the first construct the Python grammar
/// could not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// 1-indexed line
    pub line: usize,
    /// 1-indexed column, counted in characters
    pub column: usize,
    pub message: String,
}

/// Main error type for pyqual operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source text is not valid Python
    #[error("Syntax error at {0}")]
    Syntax(#[from] SyntaxError),

    /// Config file could not be parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Grammar could not be loaded into the parser
    #[error("Parser initialization failed: {0}")]
    Parser(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err: Error = SyntaxError {
            line: 3,
            column: 22,
            message: "missing ':'".to_string(),
        }
        .into();
        assert!(err.is_syntax());
        assert_eq!(err.to_string(), "Syntax error at line 3, column 22: missing ':'");
    }
}
