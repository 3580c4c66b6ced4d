//! Source resolution and content-negotiated deserialization for graph data.
//!
//! Given a source reference (literal bytes, a local path, a network location,
//! or one undifferentiated string to sniff) and an optional format hint, the
//! pipeline fetches the bytes, negotiates a media type, dispatches the right
//! deserializer from a pluggable [`FormatRegistry`], and delivers the parsed
//! statements in one piece:
//!
//! 1. [`source`] classifies the caller's spec into a [`SourceRef`] variant.
//! 2. [`negotiate`] builds the `Accept` header and resolves the format from
//!    hint, response media type, or configured default.
//! 3. [`fetch`] walks redirects through an explicit state machine with a hard
//!    bound of [`REQUEST_LIMIT`] requests.
//! 4. [`loader`] dispatches the [`Deserializer`] and feeds the statements to
//!    a [`StatementSink`] in a single `accept` call.
//!
//! Failures keep their identity end to end: ambiguity, unresolved formats,
//! transport errors, terminal statuses, redirect exhaustion, parse failures
//! and I/O each have their own [`SourceError`] variant.
//!
//! # Example
//!
//! ```
//! use loam_graph_source::{SourceLoader, SourceSpec};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let loader = SourceLoader::new();
//! let graph = loader
//!     .load(SourceSpec::data("<http://ex/a> <http://ex/b> <http://ex/c> .").format("turtle"))
//!     .await
//!     .unwrap();
//! assert_eq!(graph.len(), 1);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod loader;
pub mod negotiate;
pub mod registry;
pub mod source;

pub use config::LoaderConfig;
pub use error::{Result, SourceError};
pub use fetch::{FetchResult, FetchState, HttpFetcher, REQUEST_LIMIT};
pub use loader::{
    DeserializeError, Deserializer, FetchReport, LoadReport, SourceLoader, StatementSink,
};
pub use negotiate::{build_accept_header, resolve_format};
pub use registry::{FormatId, FormatRegistry, RegistryEntry};
pub use source::{SourceRef, SourceSpec};
