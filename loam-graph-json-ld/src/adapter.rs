//! Statement emission from expanded documents
//!
//! Walks the expanded form produced by [`crate::expand`] and emits
//! [`GraphSink`] events. `@type` becomes `rdf:type` statements, `@graph`
//! contents are flattened into the default graph, labelled blank nodes
//! (`_:label`) keep their identity across references, and `@list` values are
//! lowered into `rdf:first`/`rdf:rest`/`rdf:nil` chains.

use crate::error::{JsonLdError, Result};
use loam_graph_ir::{GraphSink, TermId};
use loam_vocab::{rdf, xsd};
use serde_json::{Map, Value as JsonValue};

/// Blank node labels arrive as `_:label`; the sink wants the bare label.
fn strip_blank_prefix(id: &str) -> &str {
    id.strip_prefix("_:").unwrap_or(id)
}

/// Emit statements for an expanded document (array of nodes or a single
/// node object).
pub fn to_graph_events<S: GraphSink>(expanded: &JsonValue, sink: &mut S) -> Result<()> {
    match expanded {
        JsonValue::Array(nodes) => {
            for node in nodes {
                process_node(node, sink, None)?;
            }
            Ok(())
        }
        JsonValue::Object(_) => {
            process_node(expanded, sink, None)?;
            Ok(())
        }
        _ => Err(JsonLdError::node(
            "expected an expanded node object or array".to_string(),
        )),
    }
}

/// Emit statements for one node and return its subject term.
///
/// `forced_subject` carries the blank node already allocated for an embedded
/// node without `@id`, so the parent edge and the node's own statements
/// share identity.
fn process_node<S: GraphSink>(
    node: &JsonValue,
    sink: &mut S,
    forced_subject: Option<TermId>,
) -> Result<TermId> {
    let obj = node
        .as_object()
        .ok_or_else(|| JsonLdError::node("expected a node object".to_string()))?;

    let subject = match forced_subject {
        Some(id) => id,
        None => match obj.get("@id") {
            Some(id) => {
                let id = id
                    .as_str()
                    .ok_or_else(|| JsonLdError::node("@id must be a string".to_string()))?;
                if id.starts_with("_:") {
                    sink.blank(Some(strip_blank_prefix(id)))
                } else {
                    sink.iri(id)
                }
            }
            None => sink.blank(None),
        },
    };

    for (key, value) in obj {
        match key.as_str() {
            "@type" => {
                let rdf_type = sink.iri(rdf::TYPE);
                let types = match value {
                    JsonValue::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for ty in types {
                    if let Some(ty) = ty.as_str() {
                        let object = sink.iri(ty);
                        sink.triple(subject, rdf_type, object);
                    }
                }
            }

            // Named graph contents collapse into the default graph; the
            // container node keeps its own statements.
            "@graph" => match value {
                JsonValue::Array(nodes) => {
                    for node in nodes {
                        process_node(node, sink, None)?;
                    }
                }
                other => {
                    process_node(other, sink, None)?;
                }
            },

            k if k.starts_with('@') => continue,

            _ => {
                let predicate = sink.iri(key);
                let values = match value {
                    JsonValue::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for value in values {
                    if let Some(object) = process_value(value, sink)? {
                        sink.triple(subject, predicate, object);
                    }
                }
            }
        }
    }

    Ok(subject)
}

/// Resolve one expanded value to a term, emitting any statements it implies.
fn process_value<S: GraphSink>(value: &JsonValue, sink: &mut S) -> Result<Option<TermId>> {
    match value {
        JsonValue::Object(obj) => {
            if let Some(id) = obj.get("@id") {
                let id = id
                    .as_str()
                    .ok_or_else(|| JsonLdError::node("@id must be a string".to_string()))?;
                let term = if id.starts_with("_:") {
                    sink.blank(Some(strip_blank_prefix(id)))
                } else {
                    sink.iri(id)
                };
                return Ok(Some(term));
            }

            if let Some(val) = obj.get("@value") {
                return process_literal(val, obj, sink);
            }

            if let Some(items) = obj.get("@list") {
                let items = items
                    .as_array()
                    .ok_or_else(|| JsonLdError::node("@list must be an array".to_string()))?;
                return process_list(items, sink).map(Some);
            }

            // Embedded node without @id: the edge and the node's statements
            // must share one blank node.
            let embedded = sink.blank(None);
            process_node(value, sink, Some(embedded))?;
            Ok(Some(embedded))
        }

        // Bare scalars only occur in hand-built expanded input; treat them
        // as plain literals.
        JsonValue::String(s) => Ok(Some(sink.literal(s, xsd::STRING, None))),
        JsonValue::Number(n) => {
            let datatype = if n.is_i64() || n.is_u64() {
                xsd::INTEGER
            } else {
                xsd::DOUBLE
            };
            Ok(Some(sink.literal(&n.to_string(), datatype, None)))
        }
        JsonValue::Bool(b) => Ok(Some(sink.literal(&b.to_string(), xsd::BOOLEAN, None))),
        JsonValue::Null => Ok(None),
        JsonValue::Array(_) => Err(JsonLdError::node(
            "unexpected array in expanded value position".to_string(),
        )),
    }
}

/// Lower a `@list` into an `rdf:first`/`rdf:rest` chain, returning the head
/// cell (or `rdf:nil` for an empty list).
fn process_list<S: GraphSink>(items: &[JsonValue], sink: &mut S) -> Result<TermId> {
    let mut members = Vec::with_capacity(items.len());
    for item in items {
        if let Some(term) = process_value(item, sink)? {
            members.push(term);
        }
    }

    let first = sink.iri(rdf::FIRST);
    let rest = sink.iri(rdf::REST);
    let mut tail = sink.iri(rdf::NIL);
    for member in members.into_iter().rev() {
        let cell = sink.blank(None);
        sink.triple(cell, first, member);
        sink.triple(cell, rest, tail);
        tail = cell;
    }
    Ok(tail)
}

/// Emit a literal term from a `{"@value": ...}` object.
fn process_literal<S: GraphSink>(
    val: &JsonValue,
    obj: &Map<String, JsonValue>,
    sink: &mut S,
) -> Result<Option<TermId>> {
    let datatype = obj.get("@type").and_then(JsonValue::as_str);
    let language = obj.get("@language").and_then(JsonValue::as_str);

    match val {
        JsonValue::String(s) => {
            if let Some(lang) = language {
                Ok(Some(sink.literal(s, rdf::LANG_STRING, Some(lang))))
            } else {
                Ok(Some(sink.literal(s, datatype.unwrap_or(xsd::STRING), None)))
            }
        }
        JsonValue::Number(n) => {
            let datatype = datatype.unwrap_or(if n.is_i64() || n.is_u64() {
                xsd::INTEGER
            } else {
                xsd::DOUBLE
            });
            Ok(Some(sink.literal(&n.to_string(), datatype, None)))
        }
        JsonValue::Bool(b) => Ok(Some(sink.literal(
            &b.to_string(),
            datatype.unwrap_or(xsd::BOOLEAN),
            None,
        ))),
        JsonValue::Null => Ok(None),
        _ => Err(JsonLdError::node("@value must be a scalar".to_string())),
    }
}
