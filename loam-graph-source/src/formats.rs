//! Adapters binding each format crate to the [`Deserializer`] trait.
//!
//! The format crates emit `GraphSink` events and know nothing about the
//! pipeline; everything pipeline-shaped (UTF-8 decoding, error mapping,
//! the default registry) lives here.

use std::sync::Arc;

use loam_graph_ir::{Graph, GraphCollectorSink};

use crate::loader::{DeserializeError, Deserializer};
use crate::registry::{FormatId, FormatRegistry};

// ---------------------------------------------------------------------------
// Default registry
// ---------------------------------------------------------------------------

impl FormatRegistry {
    /// Registry with the six shipped formats, in Accept-preference order.
    pub fn with_defaults() -> Self {
        let mut registry = FormatRegistry::new();
        let turtle = Arc::new(TurtleDeserializer);
        let registrations: [(&str, &[&str], Arc<dyn Deserializer>); 6] = [
            (
                "turtle",
                &["text/turtle", "application/x-turtle"],
                turtle.clone(),
            ),
            (
                "nt",
                &["application/n-triples", "text/plain"],
                Arc::new(NTriplesDeserializer),
            ),
            ("n3", &["text/n3"], turtle),
            ("trig", &["application/trig"], Arc::new(TriGDeserializer)),
            (
                "json-ld",
                &["application/ld+json"],
                Arc::new(JsonLdDeserializer),
            ),
            ("xml", &["application/rdf+xml"], Arc::new(RdfXmlDeserializer)),
        ];
        for (format, media_types, deserializer) in registrations {
            registry
                .register(FormatId::new(format), media_types, deserializer)
                .expect("default media-type table is disjoint");
        }
        registry
    }
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Turtle; also handles the Turtle-compatible N3 subset.
pub struct TurtleDeserializer;

impl Deserializer for TurtleDeserializer {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError> {
        let text = text(bytes)?;
        let mut sink = collector(base);
        loam_graph_turtle::parse_with_base(text, base, &mut sink).map_err(turtle_error)?;
        Ok(sink.finish())
    }
}

/// TriG: Turtle plus graph blocks, flattened into the default graph.
pub struct TriGDeserializer;

impl Deserializer for TriGDeserializer {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError> {
        let text = text(bytes)?;
        let mut sink = collector(base);
        loam_graph_turtle::parse_trig_with_base(text, base, &mut sink).map_err(turtle_error)?;
        Ok(sink.finish())
    }
}

/// Strict line-oriented N-Triples.
pub struct NTriplesDeserializer;

impl Deserializer for NTriplesDeserializer {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError> {
        let text = text(bytes)?;
        // N-Triples has no relative references; the base only labels the graph.
        let mut sink = collector(base);
        loam_graph_ntriples::parse(text, &mut sink).map_err(|err| DeserializeError {
            location: Some(format!("{}:{}", err.line, err.column)),
            message: err.message,
        })?;
        Ok(sink.finish())
    }
}

/// Scoped JSON-LD.
pub struct JsonLdDeserializer;

impl Deserializer for JsonLdDeserializer {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError> {
        let text = text(bytes)?;
        let mut sink = collector(base);
        loam_graph_json_ld::parse_with_base(text, base, &mut sink).map_err(|err| {
            let location = match &err {
                loam_graph_json_ld::JsonLdError::Json(json) => {
                    Some(format!("{}:{}", json.line(), json.column()))
                }
                _ => None,
            };
            DeserializeError {
                message: err.to_string(),
                location,
            }
        })?;
        Ok(sink.finish())
    }
}

/// Scoped RDF/XML (flat `rdf:Description` documents).
pub struct RdfXmlDeserializer;

impl Deserializer for RdfXmlDeserializer {
    fn parse(
        &self,
        bytes: &[u8],
        base: Option<&str>,
    ) -> std::result::Result<Graph, DeserializeError> {
        let text = text(bytes)?;
        let mut sink = collector(base);
        loam_graph_rdfxml::parse_with_base(text, base, &mut sink).map_err(|err| {
            DeserializeError {
                location: err.position().map(|byte| format!("byte {byte}")),
                message: err.to_string(),
            }
        })?;
        Ok(sink.finish())
    }
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn text(bytes: &[u8]) -> std::result::Result<&str, DeserializeError> {
    std::str::from_utf8(bytes).map_err(|err| DeserializeError {
        message: format!("source is not valid UTF-8: {err}"),
        location: None,
    })
}

fn collector(base: Option<&str>) -> GraphCollectorSink {
    match base {
        Some(base) => GraphCollectorSink::with_base(base),
        None => GraphCollectorSink::new(),
    }
}

fn turtle_error(err: loam_graph_turtle::TurtleError) -> DeserializeError {
    DeserializeError {
        location: err
            .location()
            .map(|(line, column)| format!("{line}:{column}")),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_vocab::xsd;

    fn parse(deserializer: &dyn Deserializer, input: &str) -> Graph {
        deserializer.parse(input.as_bytes(), None).unwrap()
    }

    #[test]
    fn test_defaults_cover_six_formats() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.len(), 6);
        let formats: Vec<&str> = registry.formats().map(FormatId::as_str).collect();
        assert_eq!(formats, ["turtle", "nt", "n3", "trig", "json-ld", "xml"]);
        assert_eq!(
            registry.media_types().next(),
            Some("text/turtle"),
            "turtle leads the Accept order"
        );
    }

    #[test]
    fn test_turtle_adapter() {
        let graph = parse(
            &TurtleDeserializer,
            "@prefix ex: <http://ex/> . ex:a ex:b ex:c .",
        );
        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.prefixes.get("ex").map(String::as_str),
            Some("http://ex/")
        );
    }

    #[test]
    fn test_trig_adapter_flattens_blocks() {
        let graph = parse(
            &TriGDeserializer,
            "@prefix ex: <http://ex/> . GRAPH ex:g { ex:a ex:b ex:c . }",
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_ntriples_adapter_location() {
        let err = NTriplesDeserializer
            .parse(b"<http://ex/a> nope", None)
            .unwrap_err();
        assert!(err.location.is_some());
    }

    #[test]
    fn test_json_ld_adapter() {
        let graph = parse(
            &JsonLdDeserializer,
            r#"{"@id": "http://ex/a", "http://ex/b": {"@id": "http://ex/c"}}"#,
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_json_ld_syntax_error_location() {
        let err = JsonLdDeserializer.parse(b"{not json", None).unwrap_err();
        assert!(err.location.is_some());
    }

    #[test]
    fn test_rdfxml_adapter() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                              xmlns:ex="http://ex/">
            <rdf:Description rdf:about="http://ex/a">
              <ex:b rdf:resource="http://ex/c"/>
            </rdf:Description>
        </rdf:RDF>"#;
        let graph = parse(&RdfXmlDeserializer, doc);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_base_is_recorded_on_graph() {
        let graph = TurtleDeserializer
            .parse(b"<a> <b> <c> .", Some("http://example.org/doc"))
            .unwrap();
        assert_eq!(graph.base.as_deref(), Some("http://example.org/doc"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = TurtleDeserializer.parse(&[0xff, 0xfe, 0x00], None).unwrap_err();
        assert!(err.message.contains("UTF-8"));
        assert!(err.location.is_none());
    }

    #[test]
    fn test_typed_literal_survives_adapter() {
        let graph = parse(
            &TurtleDeserializer,
            "@prefix ex: <http://ex/> . ex:a ex:n 42 .",
        );
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.o.datatype(), Some(xsd::INTEGER));
    }
}
