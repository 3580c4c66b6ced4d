//! Error types for the source loading pipeline.
//!
//! Each failure mode gets its own variant; nothing is collapsed into a
//! catch-all, so callers can branch on exactly what went wrong.

use thiserror::Error;

use crate::registry::FormatId;

/// Result type alias using [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;

/// Pipeline error type.
#[derive(Error, Debug)]
pub enum SourceError {
    /// More or fewer than one source variant was supplied.
    #[error("ambiguous source: {0}")]
    AmbiguousSource(String),

    /// No explicit hint, response media type, or default named a known format.
    #[error("unresolved format: {0}")]
    UnresolvedFormat(String),

    /// A media type was registered under two different format ids.
    #[error(
        "media type '{media_type}' is already registered to format \
         '{claimed_by}' (requested by '{requested_by}')"
    )]
    DuplicateMediaType {
        media_type: String,
        claimed_by: FormatId,
        requested_by: FormatId,
    },

    /// Connect, read or decode failure while talking to a server.
    #[error("transport failure fetching {uri}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    /// Terminal non-success HTTP status.
    #[error("request to {uri} failed with status {status}")]
    Status { status: u16, uri: String },

    /// The redirect chain would exceed the request bound.
    #[error("redirect chain from {uri} exceeded {limit} requests")]
    TooManyRedirects { limit: u32, uri: String },

    /// Deserializer failure, with the format that was dispatched.
    #[error("parse failure in format '{format}'{}: {message}", fmt_location(.location))]
    Parse {
        format: FormatId,
        message: String,
        location: Option<String>,
    },

    /// Local stream read failure.
    #[error("i/o error reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn fmt_location(location: &Option<String>) -> String {
    match location {
        Some(location) => format!(" at {location}"),
        None => String::new(),
    }
}

impl SourceError {
    /// Create an ambiguous-source error.
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        SourceError::AmbiguousSource(msg.into())
    }

    /// Create an unresolved-format error.
    pub fn unresolved_format(msg: impl Into<String>) -> Self {
        SourceError::UnresolvedFormat(msg.into())
    }

    /// Create a duplicate-media-type error.
    pub fn duplicate_media_type(
        media_type: impl Into<String>,
        claimed_by: FormatId,
        requested_by: FormatId,
    ) -> Self {
        SourceError::DuplicateMediaType {
            media_type: media_type.into(),
            claimed_by,
            requested_by,
        }
    }

    /// Create a transport error preserving the underlying cause.
    pub fn transport(uri: impl Into<String>, source: reqwest::Error) -> Self {
        SourceError::Transport {
            uri: uri.into(),
            source,
        }
    }

    /// Create a status error.
    pub fn status(status: u16, uri: impl Into<String>) -> Self {
        SourceError::Status {
            status,
            uri: uri.into(),
        }
    }

    /// Create a too-many-redirects error.
    pub fn too_many_redirects(limit: u32, uri: impl Into<String>) -> Self {
        SourceError::TooManyRedirects {
            limit,
            uri: uri.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(
        format: FormatId,
        message: impl Into<String>,
        location: Option<String>,
    ) -> Self {
        SourceError::Parse {
            format,
            message: message.into(),
            location,
        }
    }

    /// Create an I/O error preserving the underlying cause.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    /// The HTTP status code, for [`SourceError::Status`] only.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
