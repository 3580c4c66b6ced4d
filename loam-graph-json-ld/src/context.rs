//! JSON-LD `@context` resolution
//!
//! A context maps short term names to IRIs. This module parses the inline
//! `@context` forms this crate supports — string contexts (a bare vocabulary
//! IRI), context objects, and arrays of either — into a [`ParsedContext`]
//! that expansion queries. Term definitions may be plain strings, compact
//! IRIs resolved through sibling terms, or maps carrying `@id`, `@type`, and
//! `@container` (`@list`/`@set`).
//!
//! `@reverse` in a term definition is rejected: silently dropping it would
//! invert the direction of every statement the term produces. Keywords with
//! no statement-level meaning here (`@version`, `@protected`) are ignored.

use crate::error::{JsonLdError, Result};
use crate::iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Container declared on a term definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// `@container: @list` — array values form an ordered collection.
    List,
    /// `@container: @set` — array values are an unordered multi-value.
    Set,
}

/// `@type` of a term definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeValue {
    /// `@type: @id` — string values of this term are IRI references.
    Id,
    /// A datatype IRI applied to values of this term.
    Iri(String),
}

/// One term definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextEntry {
    /// The expanded IRI the term maps to.
    pub id: Option<String>,
    /// Declared value type, if any.
    pub type_: Option<TypeValue>,
    /// Declared container, if any.
    pub container: Option<Container>,
}

/// A fully resolved context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContext {
    /// Default vocabulary (`@vocab`), normalized to end with `/` or `#`.
    pub vocab: Option<String>,
    /// Base IRI (`@base`) for resolving `@id` references.
    pub base: Option<String>,
    /// Default language (`@language`) applied to plain string values.
    pub language: Option<String>,
    /// Term definitions by term name.
    pub terms: HashMap<String, ContextEntry>,
}

impl ParsedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with only a base IRI set, the starting point when a caller
    /// supplies an ambient base for the document.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Look up a term definition.
    pub fn get(&self, term: &str) -> Option<&ContextEntry> {
        self.terms.get(term)
    }

    /// Whether the context defines a term.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Parse a `@context` value on top of an optional active context.
    ///
    /// `null` resets to an empty context, a string sets `@vocab`, an object
    /// defines terms, and an array applies its entries in order.
    pub fn parse(active: Option<&ParsedContext>, context: &JsonValue) -> Result<ParsedContext> {
        let mut merged = active.cloned().unwrap_or_default();

        match context {
            JsonValue::Null => Ok(ParsedContext::default()),

            JsonValue::String(vocab) => {
                merged.vocab = Some(iri::with_ns_separator(vocab));
                Ok(merged)
            }

            JsonValue::Object(map) => {
                // Tolerate a wrapper object carrying "@context".
                if let Some(inner) = map.get("@context") {
                    return Self::parse(Some(&merged), inner);
                }
                parse_context_map(&merged, map)
            }

            JsonValue::Array(entries) => {
                for entry in entries {
                    merged = Self::parse(Some(&merged), entry)?;
                }
                Ok(merged)
            }

            other => Err(JsonLdError::context(format!(
                "expected string, object, array, or null, got {}",
                json_kind(other)
            ))),
        }
    }
}

/// Short JSON type name used in error messages.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn parse_context_map(active: &ParsedContext, map: &Map<String, JsonValue>) -> Result<ParsedContext> {
    let mut result = active.clone();

    // Keyword pass first so @vocab/@base are in scope for term resolution.
    for (key, value) in map {
        let Some(keyword) = key.strip_prefix('@') else {
            continue;
        };
        match keyword {
            "vocab" => result.vocab = parse_vocab(active, map, value)?,
            "base" => match value {
                JsonValue::String(base) => result.base = Some(base.clone()),
                JsonValue::Null => result.base = None,
                other => {
                    return Err(JsonLdError::context(format!(
                        "@base must be a string or null, got {}",
                        json_kind(other)
                    )))
                }
            },
            "language" => result.language = value.as_str().map(str::to_string),
            "reverse" => return Err(JsonLdError::unsupported("@reverse")),
            // @version, @protected, and the rest have no effect on the
            // statements this processor emits.
            _ => {}
        }
    }

    let vocab = result.vocab.clone();

    for (key, value) in map {
        if key.starts_with('@') {
            continue;
        }
        let entry = parse_term_definition(key, value, map, active, vocab.as_deref())?;
        result.terms.insert(key.clone(), entry);
    }

    Ok(result)
}

/// `@vocab` with an empty or relative value completes against `@base`.
fn parse_vocab(
    active: &ParsedContext,
    map: &Map<String, JsonValue>,
    value: &JsonValue,
) -> Result<Option<String>> {
    match value {
        JsonValue::String(s) => {
            let base = map
                .get("@base")
                .and_then(JsonValue::as_str)
                .or(active.base.as_deref());
            if s.is_empty() {
                Ok(base.map(iri::with_ns_separator))
            } else if !iri::is_absolute(s) {
                match base {
                    Some(base) => Ok(Some(iri::resolve(base, s))),
                    None => Ok(Some(iri::with_ns_separator(s))),
                }
            } else {
                Ok(Some(iri::with_ns_separator(s)))
            }
        }
        JsonValue::Null => Ok(None),
        other => Err(JsonLdError::context(format!(
            "@vocab must be a string or null, got {}",
            json_kind(other)
        ))),
    }
}

/// Follow string term definitions through the sibling terms they name,
/// erroring on cycles. `{"Address": "dtAddress", "dtAddress": "clri:dtAddress"}`
/// resolves `Address` through `dtAddress`.
fn chase_term<'a>(
    term: &'a str,
    map: &'a Map<String, JsonValue>,
    visited: &mut Vec<&'a str>,
) -> Result<&'a str> {
    if visited.contains(&term) {
        return Err(JsonLdError::CyclicTermDefinition {
            term: term.to_string(),
        });
    }
    match map.get(term) {
        Some(JsonValue::String(next)) => {
            if next.as_str() == term {
                return Err(JsonLdError::CyclicTermDefinition {
                    term: term.to_string(),
                });
            }
            if !next.contains(':') && !next.starts_with('@') {
                visited.push(term);
                return chase_term(next, map, visited);
            }
            Ok(next)
        }
        Some(JsonValue::Object(def)) => match def.get("@id") {
            Some(JsonValue::String(id)) => Ok(id),
            _ => Ok(term),
        },
        _ => Ok(term),
    }
}

/// Resolve a possibly-compact IRI against sibling terms, the active context,
/// and the default vocabulary.
fn resolve_in_context(
    value: &str,
    map: &Map<String, JsonValue>,
    active: &ParsedContext,
    vocab: Option<&str>,
) -> String {
    if let Some((prefix, suffix)) = iri::split_compact(value) {
        if let Some(ns) = map.get(prefix) {
            if let Some(ns) = ns.as_str() {
                return format!("{}{}", ns, suffix);
            }
            if let Some(JsonValue::String(ns)) = ns.as_object().and_then(|m| m.get("@id")) {
                return format!("{}{}", ns, suffix);
            }
        }
        if let Some(ns) = active.get(prefix).and_then(|e| e.id.as_deref()) {
            return format!("{}{}", ns, suffix);
        }
    }

    if !value.starts_with('@') && !iri::looks_like_iri(value) {
        if let Some(vocab) = vocab {
            return format!("{}{}", vocab, value);
        }
    }

    value.to_string()
}

fn parse_type_value(
    value: &JsonValue,
    map: &Map<String, JsonValue>,
    active: &ParsedContext,
    vocab: Option<&str>,
) -> Result<Option<TypeValue>> {
    match value {
        JsonValue::String(s) => {
            let resolved = resolve_in_context(s, map, active, vocab);
            match resolved.as_str() {
                "@id" => Ok(Some(TypeValue::Id)),
                kw if kw.starts_with('@') => Err(JsonLdError::unsupported(kw)),
                _ => Ok(Some(TypeValue::Iri(resolved))),
            }
        }
        JsonValue::Null => Ok(None),
        other => Err(JsonLdError::context(format!(
            "@type in a term definition must be a string, got {}",
            json_kind(other)
        ))),
    }
}

fn parse_container(value: &JsonValue) -> Result<Container> {
    match value.as_str() {
        Some("@list") => Ok(Container::List),
        Some("@set") => Ok(Container::Set),
        Some(other) => Err(JsonLdError::unsupported(other)),
        None => Err(JsonLdError::context(format!(
            "@container must be a string, got {}",
            json_kind(value)
        ))),
    }
}

fn parse_term_definition(
    key: &str,
    value: &JsonValue,
    map: &Map<String, JsonValue>,
    active: &ParsedContext,
    vocab: Option<&str>,
) -> Result<ContextEntry> {
    match value {
        JsonValue::String(s) => {
            let mut visited = Vec::new();
            let chased = chase_term(s, map, &mut visited)?;
            let id = resolve_in_context(chased, map, active, vocab);
            Ok(ContextEntry {
                id: Some(id),
                ..Default::default()
            })
        }

        JsonValue::Object(def) => {
            let mut entry = ContextEntry::default();
            for (k, v) in def {
                match k.as_str() {
                    "@id" => {
                        if let JsonValue::String(s) = v {
                            entry.id = Some(resolve_in_context(s, map, active, vocab));
                        }
                    }
                    "@type" => entry.type_ = parse_type_value(v, map, active, vocab)?,
                    "@container" => entry.container = Some(parse_container(v)?),
                    "@reverse" => return Err(JsonLdError::unsupported("@reverse")),
                    // Unknown keys inside a term definition are harmless.
                    _ => {}
                }
            }
            // A definition like {"ex:prop": {"@type": "xsd:date"}} takes its
            // IRI from the key itself.
            if entry.id.is_none() {
                entry.id = Some(resolve_in_context(key, map, active, vocab));
            }
            Ok(entry)
        }

        other => Err(JsonLdError::context(format!(
            "invalid definition for term '{}': {}",
            key,
            json_kind(other)
        ))),
    }
}
