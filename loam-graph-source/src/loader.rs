//! Deserializer dispatch and the loader façade.
//!
//! [`SourceLoader`] runs the whole pipeline for one operation, strictly in
//! order: resolve the source, build the `Accept` header, fetch when the
//! source is a network location, resolve the format, read the bytes,
//! dispatch the deserializer, and deliver the statements to the sink in a
//! single [`StatementSink::accept`] call. A failed parse delivers nothing.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use loam_graph_ir::Graph;

use crate::config::LoaderConfig;
use crate::error::{Result, SourceError};
use crate::fetch::HttpFetcher;
use crate::registry::{FormatId, FormatRegistry};
use crate::negotiate;
use crate::source::{self, SourceRef, SourceSpec};

// ---------------------------------------------------------------------------
// Deserializer trait
// ---------------------------------------------------------------------------

/// Grammar-specific deserializer, registered per format.
///
/// Implementations parse a complete byte buffer; `base` is the document's
/// base IRI for resolving relative references, when one is known.
pub trait Deserializer: Send + Sync {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError>;
}

/// Failure reported by a deserializer; `location` is grammar-specific
/// (`line:column`, byte offset) when the format can name one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct DeserializeError {
    pub message: String,
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// StatementSink
// ---------------------------------------------------------------------------

/// Receiver for a completed statement sequence.
///
/// A successful load calls `accept` exactly once with the complete graph;
/// a failed load never calls it.
pub trait StatementSink {
    fn accept(&mut self, statements: Graph);
}

impl StatementSink for Graph {
    fn accept(&mut self, statements: Graph) {
        self.extend(statements);
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What one load operation did.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Format that was dispatched.
    pub format: FormatId,
    /// Base IRI the deserializer was given, when one applied.
    pub base: Option<String>,
    /// Network details; `None` for raw bytes and local streams.
    pub fetch: Option<FetchReport>,
}

/// Network half of a [`LoadReport`].
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub final_uri: String,
    pub status: u16,
    pub hops: usize,
}

// ---------------------------------------------------------------------------
// SourceLoader
// ---------------------------------------------------------------------------

/// Pipeline façade: registry + fetcher + optional default format.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    registry: Arc<FormatRegistry>,
    fetcher: HttpFetcher,
    default_format: Option<FormatId>,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader {
    /// Loader over the default registry (§ [`FormatRegistry::with_defaults`]).
    pub fn new() -> Self {
        Self::with_registry(Arc::new(FormatRegistry::with_defaults()))
    }

    /// Loader over a caller-built registry.
    pub fn with_registry(registry: Arc<FormatRegistry>) -> Self {
        SourceLoader {
            registry,
            fetcher: HttpFetcher::new(),
            default_format: None,
        }
    }

    /// Build from embedded host configuration.
    pub fn from_config(config: &LoaderConfig) -> Self {
        SourceLoader {
            registry: Arc::new(FormatRegistry::with_defaults()),
            fetcher: HttpFetcher::with_user_agent(config.user_agent.as_deref()),
            default_format: config.default_format.as_deref().map(FormatId::new),
        }
    }

    /// Set the fallback format used when neither hint nor response media
    /// type resolves.
    pub fn with_default_format(mut self, format: impl AsRef<str>) -> Self {
        self.default_format = Some(FormatId::new(format));
        self
    }

    /// The registry this loader dispatches against.
    pub fn registry(&self) -> &Arc<FormatRegistry> {
        &self.registry
    }

    /// Load a source and return the parsed graph.
    pub async fn load(&self, spec: SourceSpec) -> Result<Graph> {
        let (graph, _report) = self.run(spec).await?;
        Ok(graph)
    }

    /// Load a source into `sink`; on success the sink's `accept` is called
    /// exactly once with the complete statement sequence.
    pub async fn load_into(
        &self,
        spec: SourceSpec,
        sink: &mut impl StatementSink,
    ) -> Result<LoadReport> {
        let (graph, report) = self.run(spec).await?;
        sink.accept(graph);
        Ok(report)
    }

    async fn run(&self, spec: SourceSpec) -> Result<(Graph, LoadReport)> {
        let explicit = spec.format_hint().map(str::to_string);
        let source = source::resolve(spec)?;
        let accept = negotiate::build_accept_header(&self.registry, explicit.as_deref());

        let (bytes, public_id, response_media_type, fetch) = match source {
            SourceRef::RawBytes { bytes, public_id } => {
                (PendingBytes::Ready(bytes), public_id, None, None)
            }
            SourceRef::LocalStream { path, public_id } => {
                (PendingBytes::File(path), public_id, None, None)
            }
            SourceRef::NetworkLocation { uri, public_id } => {
                let fetched = self.fetcher.fetch(&uri, &accept).await?;
                let report = FetchReport {
                    final_uri: fetched.final_uri.clone(),
                    status: fetched.status,
                    hops: fetched.hops.len(),
                };
                (
                    PendingBytes::Ready(fetched.body),
                    public_id,
                    fetched.media_type,
                    Some(report),
                )
            }
        };

        let format = negotiate::resolve_format(
            &self.registry,
            explicit.as_deref(),
            response_media_type.as_deref(),
            self.default_format.as_ref(),
        )?;

        let bytes = match bytes {
            PendingBytes::Ready(bytes) => bytes,
            PendingBytes::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| SourceError::io(path.display().to_string(), source))?,
        };

        let entry = match self.registry.lookup_format(&format) {
            Some(entry) => entry,
            None => {
                return Err(SourceError::unresolved_format(format!(
                    "format '{format}' has no registered deserializer"
                )))
            }
        };

        let base = if public_id.is_empty() {
            None
        } else {
            Some(public_id)
        };
        debug!(format = %format, bytes = bytes.len(), "dispatching deserializer");
        let graph = entry
            .deserializer
            .parse(&bytes, base.as_deref())
            .map_err(|err| SourceError::parse(format.clone(), err.message, err.location))?;
        debug!(format = %format, statements = graph.len(), "parse complete");

        Ok((graph, LoadReport { format, base, fetch }))
    }
}

/// Bytes we already hold, or a file still to be read. Reading happens after
/// format resolution so an unresolvable format fails first.
enum PendingBytes {
    Ready(Vec<u8>),
    File(PathBuf),
}
