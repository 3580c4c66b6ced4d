//! Content negotiation: Accept-header construction and format resolution.
//!
//! Both functions are pure over the registry; all I/O stays in
//! [`crate::fetch`] and [`crate::loader`].

use tracing::debug;

use crate::error::{Result, SourceError};
use crate::registry::{FormatId, FormatRegistry, RegistryEntry};

/// Build the `Accept` header for a network fetch.
///
/// With an explicit hint naming a known format, the header is exactly that
/// format's canonical media type, bare (HTTP reads a bare type as q=1), so
/// the server is asked to honor exactly one type. Otherwise every registered
/// media type is listed in registration order with strictly descending
/// quality `q_i = (n - i) / n`, rendered with at most two decimals and
/// clamped to a minimum of 0.01; the leading q=1 entry is rendered bare.
pub fn build_accept_header(registry: &FormatRegistry, explicit_format: Option<&str>) -> String {
    if let Some(hint) = explicit_format {
        if let Some(entry) = lookup_hint(registry, hint) {
            if let Some(canonical) = entry.media_types.first() {
                debug!(hint = %hint, accept = %canonical, "accept header pinned by hint");
                return canonical.clone();
            }
        }
    }

    let media_types: Vec<&str> = registry.media_types().collect();
    let n = media_types.len();
    let mut parts = Vec::with_capacity(n);
    for (i, media_type) in media_types.into_iter().enumerate() {
        if i == 0 {
            parts.push(media_type.to_string());
        } else {
            let q = ((n - i) as f64 / n as f64).max(0.01);
            parts.push(format!("{media_type};q={}", render_q(q)));
        }
    }
    let header = parts.join(", ");
    debug!(accept = %header, "accept header built from registry order");
    header
}

/// Render a quality value with at most two decimals, no trailing zeros.
fn render_q(q: f64) -> String {
    let rendered = format!("{q:.2}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Decide which format to dispatch.
///
/// Precedence: a known explicit hint (format id, or a media-type-shaped hint
/// containing `/`) wins over everything; then a response media type present
/// in the registry; then the configured default, provided it is registered.
/// Otherwise [`SourceError::UnresolvedFormat`] names what was tried.
pub fn resolve_format(
    registry: &FormatRegistry,
    explicit: Option<&str>,
    response_media_type: Option<&str>,
    default: Option<&FormatId>,
) -> Result<FormatId> {
    if let Some(hint) = explicit {
        if let Some(entry) = lookup_hint(registry, hint) {
            debug!(format = %entry.format, "format resolved from explicit hint");
            return Ok(entry.format.clone());
        }
    }
    if let Some(media_type) = response_media_type {
        if let Some(entry) = registry.lookup_media_type(media_type) {
            debug!(format = %entry.format, media_type = %media_type, "format resolved from response media type");
            return Ok(entry.format.clone());
        }
    }
    if let Some(format) = default {
        if registry.lookup_format(format).is_some() {
            debug!(format = %format, "format resolved from configured default");
            return Ok(format.clone());
        }
    }

    let mut tried = Vec::new();
    if let Some(hint) = explicit {
        tried.push(format!("explicit hint '{hint}'"));
    }
    if let Some(media_type) = response_media_type {
        tried.push(format!("response media type '{media_type}'"));
    }
    if let Some(format) = default {
        tried.push(format!("default '{format}'"));
    }
    let message = if tried.is_empty() {
        "no format hint, response media type, or default was available".to_string()
    } else {
        format!("no registered format matched {}", tried.join(", "))
    };
    Err(SourceError::unresolved_format(message))
}

/// Resolve a caller hint to an entry: format id first, then, when the hint
/// looks like a media type, the media-type table.
fn lookup_hint<'r>(registry: &'r FormatRegistry, hint: &str) -> Option<&'r RegistryEntry> {
    if let Some(entry) = registry.lookup_format(&FormatId::new(hint)) {
        return Some(entry);
    }
    if hint.contains('/') {
        return registry.lookup_media_type(hint);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DeserializeError, Deserializer};
    use loam_graph_ir::Graph;
    use std::sync::Arc;

    struct NullDeserializer;

    impl Deserializer for NullDeserializer {
        fn parse(
            &self,
            _bytes: &[u8],
            _base: Option<&str>,
        ) -> std::result::Result<Graph, DeserializeError> {
            Ok(Graph::new())
        }
    }

    fn registry() -> FormatRegistry {
        let mut registry = FormatRegistry::new();
        registry
            .register(
                FormatId::new("turtle"),
                &["text/turtle", "application/x-turtle"],
                Arc::new(NullDeserializer),
            )
            .unwrap();
        registry
            .register(
                FormatId::new("nt"),
                &["application/n-triples", "text/plain"],
                Arc::new(NullDeserializer),
            )
            .unwrap();
        registry
            .register(
                FormatId::new("json-ld"),
                &["application/ld+json"],
                Arc::new(NullDeserializer),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_accept_header_with_hint_is_canonical_only() {
        let registry = registry();
        assert_eq!(
            build_accept_header(&registry, Some("turtle")),
            "text/turtle"
        );
        assert_eq!(
            build_accept_header(&registry, Some("nt")),
            "application/n-triples"
        );
    }

    #[test]
    fn test_accept_header_hint_may_be_media_type() {
        let registry = registry();
        assert_eq!(
            build_accept_header(&registry, Some("application/x-turtle")),
            "text/turtle"
        );
    }

    #[test]
    fn test_accept_header_unknown_hint_falls_back_to_full_list() {
        let registry = registry();
        let header = build_accept_header(&registry, Some("mystery"));
        assert!(header.starts_with("text/turtle, "));
        assert!(header.contains("application/ld+json"));
    }

    #[test]
    fn test_accept_header_without_hint_descends() {
        let registry = registry();
        let header = build_accept_header(&registry, None);
        let parts: Vec<&str> = header.split(", ").collect();
        assert_eq!(parts[0], "text/turtle");

        let mut previous = 1.0f64;
        for part in &parts[1..] {
            let (_, q) = part.split_once(";q=").expect("q parameter");
            // At most two decimals.
            let decimals = q.split('.').nth(1).map_or(0, str::len);
            assert!(decimals <= 2, "too many decimals in {q}");
            let q: f64 = q.parse().unwrap();
            assert!(q > 0.0, "quality must stay above zero");
            assert!(q < previous, "qualities must strictly descend");
            previous = q;
        }
    }

    #[test]
    fn test_render_q_trims_trailing_zeros() {
        assert_eq!(render_q(0.5), "0.5");
        assert_eq!(render_q(0.75), "0.75");
        assert_eq!(render_q(0.01), "0.01");
    }

    #[test]
    fn test_resolve_prefers_explicit_hint() {
        let registry = registry();
        let format = resolve_format(&registry, Some("turtle"), Some("application/n-triples"), None)
            .unwrap();
        assert_eq!(format, FormatId::new("turtle"));
    }

    #[test]
    fn test_resolve_unknown_hint_falls_to_media_type() {
        let registry = registry();
        let format =
            resolve_format(&registry, Some("mystery"), Some("application/n-triples"), None)
                .unwrap();
        assert_eq!(format, FormatId::new("nt"));
    }

    #[test]
    fn test_resolve_media_type_with_parameters() {
        let registry = registry();
        let format =
            resolve_format(&registry, None, Some("text/turtle; charset=UTF-8"), None).unwrap();
        assert_eq!(format, FormatId::new("turtle"));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let registry = registry();
        let default = FormatId::new("json-ld");
        let format = resolve_format(&registry, None, Some("text/html"), Some(&default)).unwrap();
        assert_eq!(format, FormatId::new("json-ld"));
    }

    #[test]
    fn test_resolve_unregistered_default_fails() {
        let registry = registry();
        let default = FormatId::new("mystery");
        let err = resolve_format(&registry, None, None, Some(&default)).unwrap_err();
        assert!(matches!(err, SourceError::UnresolvedFormat(_)));
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_resolve_failure_names_what_was_tried() {
        let registry = registry();
        let err = resolve_format(&registry, Some("mystery"), Some("text/html"), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mystery"));
        assert!(message.contains("text/html"));

        let err = resolve_format(&registry, None, None, None).unwrap_err();
        assert!(err.to_string().contains("no format hint"));
    }
}
