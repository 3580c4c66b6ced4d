//! Error type for JSON-LD processing

use serde_json::Value as JsonValue;

/// Error type for JSON-LD context resolution, expansion, and event emission
#[derive(Debug, thiserror::Error)]
pub enum JsonLdError {
    /// Document is not well-formed JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed `@context` value
    #[error("invalid context: {message}")]
    InvalidContext { message: String },

    /// Term definition that resolves through itself
    #[error("cyclic term definition for '{term}'")]
    CyclicTermDefinition { term: String },

    /// Keyword whose meaning this processor does not implement
    #[error("unsupported JSON-LD keyword '{keyword}'")]
    UnsupportedKeyword { keyword: String },

    /// `@language` and `@type` on the same value
    #[error("@language cannot be combined with @type")]
    LanguageWithType,

    /// Array directly inside an array
    #[error("nested arrays are not allowed at {idx:?}")]
    NestedSequence { idx: Vec<JsonValue> },

    /// Structurally invalid node or value object
    #[error("invalid node object: {message}")]
    InvalidNode { message: String },
}

/// Result type for JSON-LD operations
pub type Result<T> = std::result::Result<T, JsonLdError>;

impl JsonLdError {
    /// Create a context error
    pub fn context(message: impl Into<String>) -> Self {
        Self::InvalidContext {
            message: message.into(),
        }
    }

    /// Create a node-structure error
    pub fn node(message: impl Into<String>) -> Self {
        Self::InvalidNode {
            message: message.into(),
        }
    }

    /// Create an unsupported-keyword error
    pub fn unsupported(keyword: impl Into<String>) -> Self {
        Self::UnsupportedKeyword {
            keyword: keyword.into(),
        }
    }
}
