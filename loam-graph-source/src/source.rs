//! Source classification: caller input to an explicit source variant.
//!
//! A [`SourceSpec`] carries whatever the caller supplied: literal bytes, a
//! local path, a network location, or one undifferentiated `source` string to
//! be sniffed. [`resolve`] turns it into exactly one [`SourceRef`] variant up
//! front, so the rest of the pipeline never inspects the caller's argument
//! again. Classification performs no network I/O; an ambiguous spec fails
//! before any request is made.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SourceError};

// ---------------------------------------------------------------------------
// SourceSpec
// ---------------------------------------------------------------------------

/// Caller-supplied description of where graph data comes from.
///
/// Exactly one of the four source channels must be set; the constructors set
/// one each, and the fields are public for callers who assemble specs from
/// their own option bags. `format` is an optional explicit format hint;
/// `public_id` overrides the derived document identifier (which doubles as
/// the base IRI for relative references).
#[derive(Debug, Clone, Default)]
pub struct SourceSpec {
    pub data: Option<Vec<u8>>,
    pub path: Option<PathBuf>,
    pub location: Option<String>,
    pub source: Option<String>,
    pub format: Option<String>,
    pub public_id: Option<String>,
}

impl SourceSpec {
    /// Literal content, bytes or text.
    pub fn data(data: impl Into<Vec<u8>>) -> Self {
        SourceSpec {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// A local file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        SourceSpec {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// A network location to fetch.
    pub fn location(uri: impl Into<String>) -> Self {
        SourceSpec {
            location: Some(uri.into()),
            ..Default::default()
        }
    }

    /// An undifferentiated source string, classified by sniffing: recognized
    /// URI schemes first, then an existing local path, else literal content.
    pub fn sniff(source: impl Into<String>) -> Self {
        SourceSpec {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    /// Set the explicit format hint (a format id such as `"turtle"`, or a
    /// media type such as `"application/ld+json"`).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the public identifier, overriding the derived one.
    pub fn public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub(crate) fn format_hint(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

// ---------------------------------------------------------------------------
// SourceRef
// ---------------------------------------------------------------------------

/// Classified source, constructed once at the pipeline boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Literal content; `public_id` is empty unless the caller set one.
    RawBytes { bytes: Vec<u8>, public_id: String },
    /// A local file to read; `public_id` defaults to its `file://` IRI.
    LocalStream { path: PathBuf, public_id: String },
    /// A network location to fetch; `public_id` defaults to the request URI.
    NetworkLocation { uri: String, public_id: String },
}

impl SourceRef {
    pub fn public_id(&self) -> &str {
        match self {
            SourceRef::RawBytes { public_id, .. }
            | SourceRef::LocalStream { public_id, .. }
            | SourceRef::NetworkLocation { public_id, .. } => public_id,
        }
    }
}

/// Classify a [`SourceSpec`] into exactly one [`SourceRef`] variant.
///
/// Fails with [`SourceError::AmbiguousSource`] when zero or more than one of
/// the four source channels is supplied.
pub fn resolve(spec: SourceSpec) -> Result<SourceRef> {
    let mut supplied = Vec::new();
    if spec.data.is_some() {
        supplied.push("data");
    }
    if spec.path.is_some() {
        supplied.push("path");
    }
    if spec.location.is_some() {
        supplied.push("location");
    }
    if spec.source.is_some() {
        supplied.push("source");
    }
    match supplied.len() {
        0 => {
            return Err(SourceError::ambiguous(
                "no source was supplied; provide exactly one of data, path, location, or source",
            ))
        }
        1 => {}
        _ => {
            return Err(SourceError::ambiguous(format!(
                "multiple sources were supplied ({}); provide exactly one",
                supplied.join(", ")
            )))
        }
    }

    let public_id = spec.public_id;
    let resolved = if let Some(bytes) = spec.data {
        SourceRef::RawBytes {
            bytes,
            public_id: public_id.unwrap_or_default(),
        }
    } else if let Some(path) = spec.path {
        local_stream(path, public_id)
    } else if let Some(uri) = spec.location {
        network_location(uri, public_id)
    } else if let Some(source) = spec.source {
        sniff_source(source, public_id)
    } else {
        // supplied.len() == 1 guarantees one of the branches above matched.
        return Err(SourceError::ambiguous("no source was supplied"));
    };

    debug!(public_id = %resolved.public_id(), kind = kind(&resolved), "source resolved");
    Ok(resolved)
}

fn kind(source: &SourceRef) -> &'static str {
    match source {
        SourceRef::RawBytes { .. } => "raw-bytes",
        SourceRef::LocalStream { .. } => "local-stream",
        SourceRef::NetworkLocation { .. } => "network-location",
    }
}

/// Sniffing order: recognized URI scheme, then existing local path, then
/// literal content.
fn sniff_source(source: String, public_id: Option<String>) -> SourceRef {
    if source.starts_with("http://") || source.starts_with("https://") {
        return network_location(source, public_id);
    }
    if let Some(rest) = source.strip_prefix("file://") {
        return local_stream(PathBuf::from(rest), public_id);
    }
    if let Some(rest) = source.strip_prefix("file:") {
        return local_stream(PathBuf::from(rest), public_id);
    }
    if Path::new(&source).exists() {
        return local_stream(PathBuf::from(source), public_id);
    }
    SourceRef::RawBytes {
        bytes: source.into_bytes(),
        public_id: public_id.unwrap_or_default(),
    }
}

fn network_location(uri: String, public_id: Option<String>) -> SourceRef {
    let public_id = public_id.unwrap_or_else(|| uri.clone());
    SourceRef::NetworkLocation { uri, public_id }
}

fn local_stream(path: PathBuf, public_id: Option<String>) -> SourceRef {
    let public_id = public_id.unwrap_or_else(|| file_iri(&path));
    SourceRef::LocalStream { path, public_id }
}

/// `file://` IRI for a path, canonicalized when the path exists.
fn file_iri(path: &Path) -> String {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", canonical.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_data_resolves_to_raw_bytes() {
        let source = resolve(SourceSpec::data("<a> <b> <c> .")).unwrap();
        match source {
            SourceRef::RawBytes { bytes, public_id } => {
                assert_eq!(bytes, b"<a> <b> <c> .");
                assert_eq!(public_id, "");
            }
            other => panic!("expected RawBytes, got {other:?}"),
        }
    }

    #[test]
    fn test_location_resolves_to_network() {
        let source = resolve(SourceSpec::location("http://example.org/data.ttl")).unwrap();
        match source {
            SourceRef::NetworkLocation { uri, public_id } => {
                assert_eq!(uri, "http://example.org/data.ttl");
                assert_eq!(public_id, "http://example.org/data.ttl");
            }
            other => panic!("expected NetworkLocation, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_public_id_wins() {
        let spec = SourceSpec::location("http://example.org/data.ttl")
            .public_id("http://example.org/canonical");
        let source = resolve(spec).unwrap();
        assert_eq!(source.public_id(), "http://example.org/canonical");
    }

    #[test]
    fn test_path_derives_file_iri() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = resolve(SourceSpec::path(file.path())).unwrap();
        match source {
            SourceRef::LocalStream { public_id, .. } => {
                assert!(public_id.starts_with("file:///"), "got {public_id}");
            }
            other => panic!("expected LocalStream, got {other:?}"),
        }
    }

    #[test]
    fn test_no_source_is_ambiguous() {
        let err = resolve(SourceSpec::default()).unwrap_err();
        assert!(matches!(err, SourceError::AmbiguousSource(_)));
        assert!(err.to_string().contains("no source"));
    }

    #[test]
    fn test_two_sources_are_ambiguous() {
        let spec = SourceSpec {
            data: Some(b"x".to_vec()),
            location: Some("http://example.org/".to_string()),
            ..Default::default()
        };
        let err = resolve(spec).unwrap_err();
        assert!(matches!(err, SourceError::AmbiguousSource(_)));
        assert!(err.to_string().contains("data"));
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_sniff_http_uri() {
        let source = resolve(SourceSpec::sniff("https://example.org/data.ttl")).unwrap();
        assert!(matches!(source, SourceRef::NetworkLocation { .. }));
    }

    #[test]
    fn test_sniff_file_uri_extracts_path() {
        let source = resolve(SourceSpec::sniff("file:///tmp/data.ttl")).unwrap();
        match source {
            SourceRef::LocalStream { path, .. } => {
                assert_eq!(path, PathBuf::from("/tmp/data.ttl"));
            }
            other => panic!("expected LocalStream, got {other:?}"),
        }
    }

    #[test]
    fn test_sniff_existing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<a> <b> <c> .").unwrap();
        let text = file.path().to_str().unwrap().to_string();
        let source = resolve(SourceSpec::sniff(text)).unwrap();
        assert!(matches!(source, SourceRef::LocalStream { .. }));
    }

    #[test]
    fn test_sniff_literal_content_falls_through() {
        let source =
            resolve(SourceSpec::sniff("<ex:a> <ex:b> <ex:c> .")).unwrap();
        match source {
            SourceRef::RawBytes { bytes, public_id } => {
                assert_eq!(bytes, b"<ex:a> <ex:b> <ex:c> .");
                assert_eq!(public_id, "");
            }
            other => panic!("expected RawBytes, got {other:?}"),
        }
    }

    #[test]
    fn test_format_hint_rides_along() {
        let spec = SourceSpec::data("{}").format("json-ld");
        assert_eq!(spec.format_hint(), Some("json-ld"));
    }
}
