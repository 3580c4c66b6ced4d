//! Error types for the Turtle-family grammar

/// Error type for Turtle, TriG, and N3 parsing operations
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Scanner error (malformed token)
    #[error("lexical error at {line}:{column}: {message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },

    /// Parser error (unexpected token or invalid structure)
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Prefixed name whose prefix was never declared
    #[error("undefined prefix '{0}:'")]
    UndefinedPrefix(String),

    /// Relative IRI reference that cannot be resolved
    #[error("cannot resolve IRI reference '{0}': no base IRI in scope")]
    UnresolvedIri(String),

    /// Escape sequence that does not denote a character
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
}

/// Result type for Turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;

impl TurtleError {
    /// Create a scanner error
    pub fn lex(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parser error
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Line and column the error points at, when it carries one.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Lex { line, column, .. } | Self::Syntax { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}
