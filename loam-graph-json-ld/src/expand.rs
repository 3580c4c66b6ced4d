//! Document expansion
//!
//! Rewrites a JSON-LD document into its expanded form: every term and
//! compact IRI replaced by a full IRI, every property value normalized to an
//! array of `@value` / `@id` / `@list` objects. The expanded form is what
//! [`crate::adapter`] walks to emit statements.

use crate::context::{Container, ContextEntry, ParsedContext, TypeValue};
use crate::error::{JsonLdError, Result};
use crate::iri as iri_util;
use serde_json::{json, Map, Value as JsonValue};

/// Exact term match against the context.
fn match_exact(compact: &str, context: &ParsedContext) -> Option<(String, ContextEntry)> {
    context.get(compact).map(|entry| {
        let iri = entry.id.clone().unwrap_or_else(|| compact.to_string());
        (iri, entry.clone())
    })
}

/// `prefix:suffix` match against a namespace term.
fn match_prefix(compact: &str, context: &ParsedContext) -> Option<(String, ContextEntry)> {
    iri_util::split_compact(compact).and_then(|(prefix, suffix)| {
        context.get(prefix).and_then(|entry| {
            entry.id.as_ref().map(|ns| {
                let full = format!("{}{}", ns, suffix);
                (full, entry.clone())
            })
        })
    })
}

/// Complete a bare name against `@vocab` (property position) or `@base`
/// (`@id` position).
fn match_default(
    compact: &str,
    context: &ParsedContext,
    vocab: bool,
) -> Option<(String, ContextEntry)> {
    if iri_util::looks_like_iri(compact) || compact.starts_with('@') {
        return None;
    }
    if vocab {
        let ns = context.vocab.as_ref()?;
        let full = format!("{}{}", ns, compact);
        let entry = ContextEntry {
            id: Some(full.clone()),
            ..Default::default()
        };
        Some((full, entry))
    } else {
        let base = context.base.as_ref()?;
        let full = iri_util::resolve(base, compact);
        let entry = ContextEntry {
            id: Some(full.clone()),
            ..Default::default()
        };
        Some((full, entry))
    }
}

/// Expand a term or compact IRI, returning the IRI together with the context
/// entry that matched.
///
/// `vocab` selects the completion namespace for bare names: `@vocab` when
/// expanding properties and types, `@base` when expanding `@id` references.
pub fn details(compact: &str, context: &ParsedContext, vocab: bool) -> (String, Option<ContextEntry>) {
    if let Some((iri, entry)) = match_exact(compact, context) {
        return (iri, Some(entry));
    }
    if let Some((iri, entry)) = match_prefix(compact, context) {
        return (iri, Some(entry));
    }
    if let Some((iri, entry)) = match_default(compact, context, vocab) {
        return (iri, Some(entry));
    }
    (compact.to_string(), None)
}

/// Expand a term or compact IRI to a full IRI.
pub fn iri(compact: &str, context: &ParsedContext, vocab: bool) -> String {
    details(compact, context, vocab).0
}

/// `{"@list": [...]}`, optionally alongside `@index`.
fn is_list_object(map: &Map<String, JsonValue>) -> bool {
    map.contains_key("@list") && (map.len() == 1 || (map.len() == 2 && map.contains_key("@index")))
}

/// `{"@set": [...]}`, optionally alongside `@index`.
fn is_set_object(map: &Map<String, JsonValue>) -> bool {
    map.contains_key("@set") && (map.len() == 1 || (map.len() == 2 && map.contains_key("@index")))
}

/// Expand one property value into zero or more expanded objects.
fn expand_value(
    value: &JsonValue,
    entry: Option<&ContextEntry>,
    context: &ParsedContext,
    idx: &[JsonValue],
) -> Result<Vec<JsonValue>> {
    let type_val = entry.and_then(|e| e.type_.as_ref());

    match value {
        JsonValue::Null => Ok(vec![]),

        JsonValue::Bool(_) | JsonValue::Number(_) => {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), value.clone());
            if let Some(TypeValue::Iri(t)) = type_val {
                obj.insert("@type".to_string(), json!(t));
            }
            Ok(vec![JsonValue::Object(obj)])
        }

        JsonValue::String(s) => {
            if type_val == Some(&TypeValue::Id) {
                let mut obj = Map::new();
                obj.insert("@id".to_string(), json!(iri(s, context, false)));
                return Ok(vec![JsonValue::Object(obj)]);
            }

            let mut obj = Map::new();
            obj.insert("@value".to_string(), json!(s));
            if let Some(TypeValue::Iri(t)) = type_val {
                obj.insert("@type".to_string(), json!(t));
            } else if let Some(lang) = &context.language {
                // Default language applies only to untyped strings.
                obj.insert("@language".to_string(), json!(lang));
            }
            Ok(vec![JsonValue::Object(obj)])
        }

        JsonValue::Array(items) => {
            let mut results = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let mut item_idx = idx.to_vec();
                item_idx.push(json!(i));

                if item.is_array() {
                    return Err(JsonLdError::NestedSequence { idx: item_idx });
                }

                let expanded = match item.as_object() {
                    Some(map)
                        if map.contains_key("@value")
                            || is_list_object(map)
                            || is_set_object(map) =>
                    {
                        expand_value(item, entry, context, &item_idx)?
                    }
                    Some(_) => vec![expand_node(item, context, &item_idx)?],
                    None => expand_value(item, entry, context, &item_idx)?,
                };
                results.extend(expanded);
            }

            if entry.and_then(|e| e.container) == Some(Container::List) {
                let mut obj = Map::new();
                obj.insert("@list".to_string(), JsonValue::Array(results));
                return Ok(vec![JsonValue::Object(obj)]);
            }
            Ok(results)
        }

        JsonValue::Object(map) => {
            if is_list_object(map) {
                let inner = &map["@list"];
                let mut list_idx = idx.to_vec();
                list_idx.push(json!("@list"));
                let expanded = expand_value(inner, entry, context, &list_idx)?;
                let mut obj = Map::new();
                obj.insert("@list".to_string(), JsonValue::Array(expanded));
                return Ok(vec![JsonValue::Object(obj)]);
            }

            if is_set_object(map) {
                let inner = &map["@set"];
                let mut set_idx = idx.to_vec();
                set_idx.push(json!("@set"));
                // Sets flatten into plain multi-values.
                return expand_value(inner, entry, context, &set_idx);
            }

            if map.contains_key("@value") {
                return expand_value_object(map, entry, context);
            }

            Ok(vec![expand_node(value, context, idx)?])
        }
    }
}

/// Expand a `{"@value": ...}` object.
fn expand_value_object(
    map: &Map<String, JsonValue>,
    entry: Option<&ContextEntry>,
    context: &ParsedContext,
) -> Result<Vec<JsonValue>> {
    let val = &map["@value"];

    let explicit_type = match map.get("@type") {
        Some(JsonValue::String(t)) if t == "@json" => {
            return Err(JsonLdError::unsupported("@json"))
        }
        Some(JsonValue::String(t)) => Some(iri(t, context, true)),
        Some(other) => {
            return Err(JsonLdError::node(format!(
                "@type in a value object must be a string, got {}",
                crate::context::json_kind(other)
            )))
        }
        None => None,
    };

    let explicit_lang = match map.get("@language") {
        Some(JsonValue::String(l)) => Some(l.clone()),
        Some(JsonValue::Null) | None => None,
        Some(other) => {
            return Err(JsonLdError::node(format!(
                "@language must be a string, got {}",
                crate::context::json_kind(other)
            )))
        }
    };

    if explicit_type.is_some() && explicit_lang.is_some() {
        return Err(JsonLdError::LanguageWithType);
    }

    let type_iri = explicit_type.or_else(|| match entry.and_then(|e| e.type_.as_ref()) {
        Some(TypeValue::Iri(t)) => Some(t.clone()),
        Some(TypeValue::Id) => Some("@id".to_string()),
        None => None,
    });

    if type_iri.as_deref() == Some("@id") {
        let target = val.as_str().ok_or_else(|| {
            JsonLdError::node("a value typed @id must be a string".to_string())
        })?;
        let mut obj = Map::new();
        obj.insert("@id".to_string(), json!(iri(target, context, false)));
        return Ok(vec![JsonValue::Object(obj)]);
    }

    match val {
        JsonValue::Null => Ok(vec![]),
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), val.clone());
            if let Some(t) = type_iri {
                obj.insert("@type".to_string(), json!(t));
            } else if let Some(lang) = explicit_lang.or_else(|| context.language.clone()) {
                if val.is_string() {
                    obj.insert("@language".to_string(), json!(lang));
                }
            }
            Ok(vec![JsonValue::Object(obj)])
        }
        _ => Err(JsonLdError::node("@value must be a scalar".to_string())),
    }
}

/// Expand the `@type` key of a node into full IRIs.
fn expand_types(map: &Map<String, JsonValue>, context: &ParsedContext) -> Vec<String> {
    match map.get("@type") {
        Some(JsonValue::String(s)) => vec![iri(s, context, true)],
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(|s| iri(s, context, true))
            .collect(),
        _ => vec![],
    }
}

/// Expand one node object (or an array of them).
fn expand_node(node: &JsonValue, context: &ParsedContext, idx: &[JsonValue]) -> Result<JsonValue> {
    match node {
        JsonValue::Array(items) => {
            let expanded: Result<Vec<JsonValue>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let mut item_idx = idx.to_vec();
                    item_idx.push(json!(i));
                    expand_node(item, context, &item_idx)
                })
                .collect();
            Ok(JsonValue::Array(expanded?))
        }

        JsonValue::Object(map) => {
            if map.contains_key("@value") {
                return Err(JsonLdError::node(
                    "a value object cannot stand as a node".to_string(),
                ));
            }

            let merged = match map.get("@context") {
                Some(local) => ParsedContext::parse(Some(context), local)?,
                None => context.clone(),
            };

            let mut result = Map::new();

            let types = expand_types(map, &merged);
            if !types.is_empty() {
                result.insert("@type".to_string(), json!(types));
            }

            for (key, value) in map {
                let mut key_idx = idx.to_vec();
                key_idx.push(json!(key));

                match key.as_str() {
                    "@context" | "@type" => continue,
                    "@id" => {
                        let id = value.as_str().ok_or_else(|| {
                            JsonLdError::node("@id must be a string".to_string())
                        })?;
                        result.insert("@id".to_string(), json!(iri(id, &merged, false)));
                    }
                    "@graph" => {
                        let expanded = expand_node(value, &merged, &key_idx)?;
                        result.insert("@graph".to_string(), expanded);
                    }
                    "@reverse" => return Err(JsonLdError::unsupported("@reverse")),
                    k if k.starts_with('@') => continue,
                    _ => {
                        let (expanded_key, entry) = details(key, &merged, true);
                        let values = expand_value(value, entry.as_ref(), &merged, &key_idx)?;
                        if values.is_empty() {
                            continue;
                        }
                        match result.get_mut(&expanded_key) {
                            Some(JsonValue::Array(existing)) => existing.extend(values),
                            _ => {
                                result.insert(expanded_key, JsonValue::Array(values));
                            }
                        }
                    }
                }
            }

            Ok(JsonValue::Object(result))
        }

        other => Ok(other.clone()),
    }
}

/// Document whose only content is `@graph` (plus a context): the graph
/// contents stand in for the document itself.
fn is_default_graph(map: &Map<String, JsonValue>) -> bool {
    map.contains_key("@graph")
        && map
            .keys()
            .filter(|k| *k != "@context" && *k != "@graph")
            .count()
            == 0
}

/// Expand a whole document against an active context.
pub fn node(doc: &JsonValue, context: &ParsedContext) -> Result<JsonValue> {
    match doc {
        JsonValue::Object(map) if is_default_graph(map) => {
            let merged = match map.get("@context") {
                Some(local) => ParsedContext::parse(Some(context), local)?,
                None => context.clone(),
            };
            expand_node(&map["@graph"], &merged, &[json!("@graph")])
        }
        _ => expand_node(doc, context, &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_iri_exact_match() {
        let ctx = ParsedContext::parse(
            None,
            &json!({
                "schema": "http://schema.org/",
                "Person": "http://schema.org/Person"
            }),
        )
        .unwrap();

        assert_eq!(iri("schema:name", &ctx, true), "http://schema.org/name");
        assert_eq!(iri("Person", &ctx, true), "http://schema.org/Person");
    }

    #[test]
    fn test_expand_iri_vocab() {
        let ctx = ParsedContext::parse(None, &json!("https://schema.org")).unwrap();

        assert_eq!(iri("name", &ctx, true), "https://schema.org/name");
        // Full IRIs pass through untouched.
        assert_eq!(
            iri("http://example.org/ns#Book", &ctx, true),
            "http://example.org/ns#Book"
        );
    }

    #[test]
    fn test_expand_iri_no_match() {
        let ctx = ParsedContext::parse(None, &json!({"schema": "http://schema.org/"})).unwrap();
        assert_eq!(iri("not:matching", &ctx, true), "not:matching");
    }

    #[test]
    fn test_expand_node_basic() {
        let doc = json!({
            "@context": {
                "ical": "http://www.w3.org/2002/12/cal/ical#",
                "xsd": "http://www.w3.org/2001/XMLSchema#",
                "ical:dtstart": {"@type": "xsd:dateTime"}
            },
            "ical:summary": "Concert",
            "ical:dtstart": "2011-04-09T20:00:00Z"
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        assert!(obj.contains_key("http://www.w3.org/2002/12/cal/ical#summary"));
        let dtstart = &obj["http://www.w3.org/2002/12/cal/ical#dtstart"][0];
        assert_eq!(dtstart["@value"], "2011-04-09T20:00:00Z");
        assert_eq!(dtstart["@type"], "http://www.w3.org/2001/XMLSchema#dateTime");
    }

    #[test]
    fn test_expand_node_with_id_and_type() {
        let doc = json!({
            "@context": "http://schema.org",
            "@id": "http://example.org/movies/1",
            "@type": "Movie",
            "name": "The Hitchhiker's Guide to the Galaxy"
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        assert_eq!(obj["@id"], "http://example.org/movies/1");
        assert_eq!(obj["@type"], json!(["http://schema.org/Movie"]));
        assert!(obj.contains_key("http://schema.org/name"));
    }

    #[test]
    fn test_expand_list_container() {
        let doc = json!({
            "@context": {
                "nick": {"@id": "http://xmlns.com/foaf/0.1/nick", "@container": "@list"}
            },
            "@id": "http://example.org/people#joebob",
            "nick": ["joe", "bob", "jaybee"]
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        let nicks = &obj["http://xmlns.com/foaf/0.1/nick"][0];
        let list = nicks["@list"].as_array().unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_expand_set_flattens() {
        let doc = json!({
            "@context": {"foaf": "http://xmlns.com/foaf/0.1/"},
            "@id": "http://example.org/people#joebob",
            "foaf:nick": {"@set": ["joe", "bob", "jaybee"]}
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        let nicks = obj["http://xmlns.com/foaf/0.1/nick"].as_array().unwrap();
        assert_eq!(nicks.len(), 3);
        assert!(nicks[0].get("@value").is_some());
    }

    #[test]
    fn test_expand_base_and_vocab() {
        let doc = json!({
            "@context": {
                "@base": "https://base.example/dir/doc",
                "@vocab": "https://vocab.example/ns/",
                "link": {"@type": "@id"}
            },
            "@id": "#joebob",
            "@type": "Person",
            "name": "Joe Bob",
            "link": "#other"
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();

        assert_eq!(obj["@id"], "https://base.example/dir/doc#joebob");
        assert_eq!(obj["@type"], json!(["https://vocab.example/ns/Person"]));
        let link = &obj["https://vocab.example/ns/link"][0];
        assert_eq!(link["@id"], "https://base.example/dir/doc#other");
    }

    #[test]
    fn test_false_value_survives() {
        let doc = json!({
            "@id": "http://example.org/x",
            "http://example.org/flag": {"@value": false}
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj["http://example.org/flag"][0]["@value"], false);
    }

    #[test]
    fn test_null_values_dropped() {
        let doc = json!({
            "@id": "http://example.org/x",
            "http://example.org/gone": null
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();
        assert!(!obj.contains_key("http://example.org/gone"));
    }

    #[test]
    fn test_nested_arrays_rejected() {
        let doc = json!({
            "@id": "http://example.org/x",
            "http://example.org/p": [["nested"]]
        });

        assert!(matches!(
            node(&doc, &ParsedContext::new()),
            Err(JsonLdError::NestedSequence { .. })
        ));
    }

    #[test]
    fn test_language_with_type_rejected() {
        let doc = json!({
            "@id": "http://example.org/x",
            "http://example.org/p": {
                "@value": "x",
                "@type": "http://www.w3.org/2001/XMLSchema#string",
                "@language": "en"
            }
        });

        assert!(matches!(
            node(&doc, &ParsedContext::new()),
            Err(JsonLdError::LanguageWithType)
        ));
    }

    #[test]
    fn test_reverse_node_key_rejected() {
        let doc = json!({
            "@id": "http://example.org/x",
            "@reverse": {"http://example.org/p": {"@id": "http://example.org/y"}}
        });

        assert!(matches!(
            node(&doc, &ParsedContext::new()),
            Err(JsonLdError::UnsupportedKeyword { .. })
        ));
    }

    #[test]
    fn test_default_language_applies_to_plain_strings() {
        let doc = json!({
            "@context": {"@language": "en", "ex": "http://example.org/"},
            "@id": "http://example.org/x",
            "ex:label": "hello",
            "ex:count": 4
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj["http://example.org/label"][0]["@language"], "en");
        assert!(obj["http://example.org/count"][0].get("@language").is_none());
    }

    #[test]
    fn test_default_graph_flattened() {
        let doc = json!({
            "@context": {"ex": "http://example.org/"},
            "@graph": [
                {"@id": "ex:a", "ex:p": "one"},
                {"@id": "ex:b", "ex:p": "two"}
            ]
        });

        let result = node(&doc, &ParsedContext::new()).unwrap();
        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["@id"], "http://example.org/a");
    }

    #[test]
    fn test_ambient_base_resolves_ids() {
        let ctx = ParsedContext::with_base("http://example.org/data");
        let doc = json!({"@id": "#frag", "http://example.org/p": "v"});

        let result = node(&doc, &ctx).unwrap();
        assert_eq!(
            result.as_object().unwrap()["@id"],
            "http://example.org/data#frag"
        );
    }
}
