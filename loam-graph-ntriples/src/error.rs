//! Error type for N-Triples parsing

/// A rejected line in an N-Triples document.
///
/// N-Triples is line-delimited, so every failure points at one line and the
/// column where parsing stopped.
#[derive(Debug, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct NTriplesError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Result type for N-Triples operations
pub type Result<T> = std::result::Result<T, NTriplesError>;
