//! Error type for RDF/XML parsing

/// Error type for RDF/XML parsing operations
#[derive(Debug, thiserror::Error)]
pub enum RdfXmlError {
    /// Malformed XML beneath the RDF layer
    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// Well-formed XML outside the supported RDF/XML subset
    #[error("RDF/XML error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// Property element whose namespace prefix was never declared
    #[error("undeclared namespace prefix '{0}'")]
    UndeclaredPrefix(String),
}

/// Result type for RDF/XML operations
pub type Result<T> = std::result::Result<T, RdfXmlError>;

impl RdfXmlError {
    /// Create a subset-violation error at a byte offset
    pub fn syntax(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Byte offset the error points at, when it carries one.
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::Xml { position, .. } | Self::Syntax { position, .. } => Some(*position),
            Self::UndeclaredPrefix(_) => None,
        }
    }
}
