//! JSON-LD deserializer for inline-context documents
//!
//! Parses the self-contained JSON-LD subset: `@context` values embedded in
//! the document (string vocabularies, term definition objects with
//! `@id`/`@type`/`@container`, compact IRIs, `@vocab`, `@base`,
//! `@language`), node objects with `@id`/`@type`/`@graph`/nesting/arrays,
//! value objects (`@value`/`@type`/`@language`), and `@list` collections.
//! Remote context fetching is out of scope, as is `@reverse` — documents
//! using it are rejected rather than silently misread.
//!
//! Documents are expanded first ([`expand`]), then walked into [`GraphSink`]
//! events ([`to_graph_events`]); `@graph` contents land in the default
//! graph, and `@list` values become `rdf:first`/`rdf:rest`/`rdf:nil`
//! chains.
//!
//! # Example
//!
//! ```
//! use loam_graph_ir::GraphCollectorSink;
//!
//! let doc = r#"{
//!     "@context": {"ex": "http://example.org/"},
//!     "@id": "ex:alice",
//!     "ex:name": "Alice"
//! }"#;
//!
//! let mut sink = GraphCollectorSink::new();
//! loam_graph_json_ld::parse(doc, &mut sink).unwrap();
//!
//! let graph = sink.finish();
//! assert_eq!(graph.len(), 1);
//! ```

pub mod adapter;
pub mod context;
pub mod error;
pub mod expand;
mod iri;

pub use adapter::to_graph_events;
pub use context::{Container, ContextEntry, ParsedContext, TypeValue};
pub use error::{JsonLdError, Result};

use loam_graph_ir::GraphSink;
use serde_json::Value as JsonValue;

/// Parse a `@context` value (string, object, array, or null).
pub fn parse_context(context: &JsonValue) -> Result<ParsedContext> {
    ParsedContext::parse(None, context)
}

/// Expand a parsed document with an empty starting context.
pub fn expand(doc: &JsonValue) -> Result<JsonValue> {
    expand::node(doc, &ParsedContext::new())
}

/// Expand a parsed document against an active context.
pub fn expand_with_context(doc: &JsonValue, context: &ParsedContext) -> Result<JsonValue> {
    expand::node(doc, context)
}

/// Expand a term or compact IRI against a context, completing bare names
/// with `@vocab`.
pub fn expand_iri(compact: &str, context: &ParsedContext) -> String {
    expand::iri(compact, context, true)
}

/// Parse a JSON-LD document into [`GraphSink`] events.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    parse_with_base(input, None, sink)
}

/// Parse a JSON-LD document, resolving `@id` references against `base`
/// unless the document's context declares its own.
pub fn parse_with_base<S: GraphSink>(input: &str, base: Option<&str>, sink: &mut S) -> Result<()> {
    let doc: JsonValue = serde_json::from_str(input)?;
    parse_value(&doc, base, sink)
}

/// Parse an already-deserialized JSON value into [`GraphSink`] events.
///
/// Base and prefix events reflect the document's top-level context: a
/// declared `@base` is announced through [`GraphSink::on_base`], and term
/// definitions that name a namespace (an IRI ending in `/` or `#`) are
/// announced through [`GraphSink::on_prefix`].
pub fn parse_value<S: GraphSink>(
    doc: &JsonValue,
    base: Option<&str>,
    sink: &mut S,
) -> Result<()> {
    let ambient = match base {
        Some(base) => ParsedContext::with_base(base),
        None => ParsedContext::new(),
    };

    let context = match doc.as_object().and_then(|map| map.get("@context")) {
        Some(declared) => {
            let context = ParsedContext::parse(Some(&ambient), declared)?;
            if context.base.is_some() && context.base != ambient.base {
                if let Some(base) = &context.base {
                    sink.on_base(base);
                }
            }
            let mut namespaces: Vec<(&String, &str)> = context
                .terms
                .iter()
                .filter(|(term, entry)| is_namespace_term(term, entry))
                .filter_map(|(term, entry)| entry.id.as_deref().map(|id| (term, id)))
                .collect();
            namespaces.sort_unstable();
            for (term, ns) in namespaces {
                sink.on_prefix(term, ns);
            }
            context
        }
        None => ambient,
    };

    let expanded = expand::node(doc, &context)?;
    adapter::to_graph_events(&expanded, sink)
}

/// A term definition that works as a prefix: a plain name bound to a
/// namespace IRI, with no value typing attached.
fn is_namespace_term(term: &str, entry: &ContextEntry) -> bool {
    if term.contains(':') || term.starts_with('@') {
        return false;
    }
    if entry.type_.is_some() || entry.container.is_some() {
        return false;
    }
    entry
        .id
        .as_deref()
        .is_some_and(|id| id.ends_with('/') || id.ends_with('#'))
}
