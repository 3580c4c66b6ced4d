//! Event-driven parser for flat `rdf:Description` documents.
//!
//! The reader walks the XML event stream and keeps at most one open subject
//! and one open property element at a time. Anything deeper (nested node
//! elements, `rdf:parseType`, reification attributes) is rejected rather
//! than silently misread.

use std::collections::HashMap;

use loam_graph_ir::{GraphSink, TermId};
use loam_vocab::{rdf, xsd};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{RdfXmlError, Result};

/// Parse an RDF/XML document into [`GraphSink`] events.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    parse_with_base(input, None, sink)
}

/// Parse with an ambient base IRI for `rdf:about` / `rdf:resource` references.
///
/// Relative references join naively onto the base; an empty reference and a
/// bare fragment both resolve against the base itself.
pub fn parse_with_base<S: GraphSink>(
    input: &str,
    base: Option<&str>,
    sink: &mut S,
) -> Result<()> {
    Parser::new(input, base, sink).run()
}

// =============================================================================
// Parser State
// =============================================================================

/// An open property element waiting for its text content or end tag.
struct PendingProperty {
    predicate: TermId,
    /// Object taken from `rdf:resource` / `rdf:nodeID`; wins over text.
    object: Option<TermId>,
    datatype: Option<String>,
    language: Option<String>,
    text: String,
}

struct Parser<'a, S> {
    reader: Reader<&'a [u8]>,
    sink: &'a mut S,
    base: Option<String>,
    /// In-scope namespace bindings; the default namespace lives under `""`.
    namespaces: HashMap<String, String>,
    subject: Option<TermId>,
    /// `xml:lang` from the enclosing `rdf:Description`, if any.
    subject_language: Option<String>,
    /// `xml:lang` from the document root.
    document_language: Option<String>,
    property: Option<PendingProperty>,
}

impl<'a, S: GraphSink> Parser<'a, S> {
    fn new(input: &'a str, base: Option<&str>, sink: &'a mut S) -> Self {
        Parser {
            reader: Reader::from_str(input),
            sink,
            base: base.map(str::to_string),
            namespaces: HashMap::new(),
            subject: None,
            subject_language: None,
            document_language: None,
            property: None,
        }
    }

    fn run(mut self) -> Result<()> {
        loop {
            let position = self.reader.buffer_position() as u64;
            match self.reader.read_event() {
                Ok(Event::Start(e)) => self.handle_start(&e, position)?,
                Ok(Event::Empty(e)) => self.handle_empty(&e, position)?,
                Ok(Event::Text(e)) => {
                    if let Some(property) = &mut self.property {
                        match e.unescape() {
                            Ok(text) => property.text.push_str(&text),
                            Err(source) => {
                                return Err(RdfXmlError::Xml {
                                    position,
                                    source: source.into(),
                                })
                            }
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(property) = &mut self.property {
                        property.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::End(e)) => self.handle_end(&e),
                Ok(Event::Eof) => return Ok(()),
                // Declarations, comments and processing instructions carry no RDF.
                Ok(_) => {}
                Err(source) => {
                    let position = self.reader.error_position() as u64;
                    return Err(RdfXmlError::Xml { position, source });
                }
            }
        }
    }

    // =========================================================================
    // Element Handling
    // =========================================================================

    fn handle_start(&mut self, e: &BytesStart, position: u64) -> Result<()> {
        self.collect_namespaces(e);
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (prefix, local) = split_qname(&name);

        if self.property.is_some() {
            return Err(RdfXmlError::syntax(
                position,
                format!("unexpected element '{name}' inside a property element"),
            ));
        }

        if self.is_rdf_name(prefix, local, "RDF") {
            if let Some(lang) = extract_language(e) {
                self.document_language = Some(lang);
            }
            return Ok(());
        }

        if self.is_rdf_name(prefix, local, "Description") {
            if self.subject.is_some() {
                return Err(RdfXmlError::syntax(
                    position,
                    "nested rdf:Description is not supported",
                ));
            }
            self.reject_unsupported(e, position)?;
            self.subject = Some(self.description_subject(e, position)?);
            self.subject_language = extract_language(e);
            return Ok(());
        }

        if self.subject.is_none() {
            return Err(RdfXmlError::syntax(
                position,
                format!("unexpected element '{name}' outside rdf:Description"),
            ));
        }
        self.reject_unsupported(e, position)?;
        let predicate_iri = self.resolve_qname(prefix, local, position)?;
        let predicate = self.sink.iri(&predicate_iri);
        let object = self.property_object(e, position)?;
        let datatype = self.rdf_attr(e, "datatype");
        let language = extract_language(e);
        self.property = Some(PendingProperty {
            predicate,
            object,
            datatype,
            language,
            text: String::new(),
        });
        Ok(())
    }

    fn handle_empty(&mut self, e: &BytesStart, position: u64) -> Result<()> {
        self.collect_namespaces(e);
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (prefix, local) = split_qname(&name);

        if self.property.is_some() {
            return Err(RdfXmlError::syntax(
                position,
                format!("unexpected element '{name}' inside a property element"),
            ));
        }

        if self.is_rdf_name(prefix, local, "RDF") {
            return Ok(());
        }

        if self.is_rdf_name(prefix, local, "Description") {
            if self.subject.is_some() {
                return Err(RdfXmlError::syntax(
                    position,
                    "nested rdf:Description is not supported",
                ));
            }
            self.reject_unsupported(e, position)?;
            // A subject with no property elements contributes no statements,
            // but its attributes must still be coherent.
            let _ = self.description_subject(e, position)?;
            return Ok(());
        }

        let Some(subject) = self.subject else {
            return Err(RdfXmlError::syntax(
                position,
                format!("unexpected element '{name}' outside rdf:Description"),
            ));
        };
        self.reject_unsupported(e, position)?;
        let predicate_iri = self.resolve_qname(prefix, local, position)?;
        // A self-closing property without a resource names nothing.
        if let Some(object) = self.property_object(e, position)? {
            let predicate = self.sink.iri(&predicate_iri);
            self.sink.triple(subject, predicate, object);
        }
        Ok(())
    }

    fn handle_end(&mut self, e: &BytesEnd) {
        if let Some(property) = self.property.take() {
            if let Some(subject) = self.subject {
                if let Some(object) = property.object {
                    self.sink.triple(subject, property.predicate, object);
                } else {
                    let text = property.text.trim();
                    if !text.is_empty() {
                        let language = property
                            .language
                            .or_else(|| self.subject_language.clone())
                            .or_else(|| self.document_language.clone());
                        let object =
                            self.emit_literal(text, property.datatype.as_deref(), language);
                        self.sink.triple(subject, property.predicate, object);
                    }
                }
            }
            return;
        }

        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (prefix, local) = split_qname(&name);
        if self.is_rdf_name(prefix, local, "Description") {
            self.subject = None;
            self.subject_language = None;
        }
    }

    // =========================================================================
    // Attribute Handling
    // =========================================================================

    /// Subject term for an `rdf:Description` element.
    fn description_subject(&mut self, e: &BytesStart, position: u64) -> Result<TermId> {
        let about = self.rdf_attr(e, "about");
        let node_id = self.rdf_attr(e, "nodeID");
        match (about, node_id) {
            (Some(_), Some(_)) => Err(RdfXmlError::syntax(
                position,
                "rdf:about and rdf:nodeID are mutually exclusive",
            )),
            (Some(about), None) => {
                let iri = self.resolve(&about);
                Ok(self.sink.iri(&iri))
            }
            (None, Some(label)) => Ok(self.sink.blank(Some(&label))),
            (None, None) => Ok(self.sink.blank(None)),
        }
    }

    /// Object named by `rdf:resource` / `rdf:nodeID` on a property element.
    fn property_object(&mut self, e: &BytesStart, position: u64) -> Result<Option<TermId>> {
        let resource = self.rdf_attr(e, "resource");
        let node_id = self.rdf_attr(e, "nodeID");
        match (resource, node_id) {
            (Some(_), Some(_)) => Err(RdfXmlError::syntax(
                position,
                "rdf:resource and rdf:nodeID are mutually exclusive",
            )),
            (Some(resource), None) => {
                let iri = self.resolve(&resource);
                Ok(Some(self.sink.iri(&iri)))
            }
            (None, Some(label)) => Ok(Some(self.sink.blank(Some(&label)))),
            (None, None) => Ok(None),
        }
    }

    /// Attributes that change statement structure are rejected, not ignored.
    fn reject_unsupported(&self, e: &BytesStart, position: u64) -> Result<()> {
        for name in ["ID", "parseType"] {
            if self.rdf_attr(e, name).is_some() {
                return Err(RdfXmlError::syntax(
                    position,
                    format!("rdf:{name} is not supported"),
                ));
            }
        }
        Ok(())
    }

    /// Look up an attribute in the RDF namespace. Unprefixed attributes such
    /// as bare `about=` are accepted as RDF attributes too.
    fn rdf_attr(&self, e: &BytesStart, local: &str) -> Option<String> {
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.0).into_owned();
            let (attr_prefix, attr_local) = split_qname(&key);
            if attr_local != local || key == "xmlns" {
                continue;
            }
            let in_rdf_ns = attr_prefix.is_empty()
                || self
                    .namespaces
                    .get(attr_prefix)
                    .is_some_and(|ns| ns == rdf::NS);
            if in_rdf_ns {
                return Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }
        None
    }

    // =========================================================================
    // Names and References
    // =========================================================================

    /// Record `xmlns` declarations and report them to the sink. Bindings are
    /// document-scoped here; flat documents do not need shadowing.
    fn collect_namespaces(&mut self, e: &BytesStart) {
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.0);
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.sink.on_prefix(prefix, &value);
                self.namespaces.insert(prefix.to_string(), value);
            } else if key == "xmlns" {
                self.sink.on_prefix("", &value);
                self.namespaces.insert(String::new(), value);
            }
        }
    }

    fn is_rdf_name(&self, prefix: &str, local: &str, expected: &str) -> bool {
        local == expected
            && self
                .namespaces
                .get(prefix)
                .is_some_and(|ns| ns == rdf::NS)
    }

    fn resolve_qname(&self, prefix: &str, local: &str, position: u64) -> Result<String> {
        match self.namespaces.get(prefix) {
            Some(ns) => Ok(format!("{ns}{local}")),
            None if prefix.is_empty() => Err(RdfXmlError::syntax(
                position,
                format!("element '{local}' has no namespace"),
            )),
            None => Err(RdfXmlError::UndeclaredPrefix(prefix.to_string())),
        }
    }

    fn resolve(&self, reference: &str) -> String {
        let Some(base) = &self.base else {
            return reference.to_string();
        };
        if reference.is_empty() {
            base.clone()
        } else if reference.starts_with('#') {
            format!("{}{}", base.trim_end_matches('/'), reference)
        } else if has_scheme(reference) {
            reference.to_string()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), reference)
        }
    }

    fn emit_literal(
        &mut self,
        text: &str,
        datatype: Option<&str>,
        language: Option<String>,
    ) -> TermId {
        match datatype {
            Some(datatype) => self.sink.literal(text, datatype, None),
            None => match language {
                Some(language) => self.sink.literal(text, rdf::LANG_STRING, Some(&language)),
                None => self.sink.literal(text, xsd::STRING, None),
            },
        }
    }
}

fn split_qname(name: &str) -> (&str, &str) {
    match name.find(':') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}

fn extract_language(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if String::from_utf8_lossy(attr.key.0) == "xml:lang" {
            Some(String::from_utf8_lossy(&attr.value).into_owned())
        } else {
            None
        }
    })
}

fn has_scheme(reference: &str) -> bool {
    match reference.find(':') {
        Some(pos) if pos > 0 => {
            let scheme = &reference[..pos];
            scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use loam_graph_ir::{Graph, GraphCollectorSink, Term};

    const RDF_XMLNS: &str = r#"xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#""#;

    fn parse_to_graph(input: &str) -> Result<Graph> {
        let mut sink = GraphCollectorSink::new();
        parse(input, &mut sink)?;
        Ok(sink.finish())
    }

    fn single_triple(graph: &Graph) -> (&Term, &Term, &Term) {
        assert_eq!(graph.len(), 1, "expected one triple in {graph:?}");
        let t = graph.iter().next().unwrap();
        (&t.s, &t.p, &t.o)
    }

    #[test]
    fn test_resource_object() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b rdf:resource="http://example.org/c"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (s, p, o) = single_triple(&graph);
        assert_eq!(s.as_iri(), Some("http://example.org/a"));
        assert_eq!(p.as_iri(), Some("http://example.org/b"));
        assert_eq!(o.as_iri(), Some("http://example.org/c"));
    }

    #[test]
    fn test_default_namespace_property() {
        // Property elements may live in the default namespace.
        let doc = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
               <rdf:RDF xmlns="http://example.org/" {RDF_XMLNS}>
                 <rdf:Description rdf:about="http://example.org/a">
                   <b rdf:resource="http://example.org/c"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, p, _) = single_triple(&graph);
        assert_eq!(p.as_iri(), Some("http://example.org/b"));
    }

    #[test]
    fn test_plain_literal_is_string() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:name>Alice</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.lexical(), Some("Alice"));
        assert_eq!(o.datatype(), Some(xsd::STRING));
    }

    #[test]
    fn test_typed_literal() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:age rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">42</ex:age>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.lexical(), Some("42"));
        assert_eq!(o.datatype(), Some(xsd::INTEGER));
    }

    #[test]
    fn test_language_on_property() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:name xml:lang="en">Alice</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.language(), Some("en"));
        assert_eq!(o.datatype(), Some(rdf::LANG_STRING));
    }

    #[test]
    fn test_language_inherited_from_description() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a" xml:lang="fr">
                   <ex:name>Alice</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.language(), Some("fr"));
    }

    #[test]
    fn test_language_inherited_from_root() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/" xml:lang="de">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:name>Alice</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.language(), Some("de"));
    }

    #[test]
    fn test_datatype_wins_over_language() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a" xml:lang="en">
                   <ex:age rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">3</ex:age>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.datatype(), Some(xsd::INTEGER));
        assert_eq!(o.language(), None);
    }

    #[test]
    fn test_node_id_links_subject_and_object() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:knows rdf:nodeID="n1"/>
                 </rdf:Description>
                 <rdf:Description rdf:nodeID="n1">
                   <ex:name>Bob</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        assert_eq!(graph.len(), 2);
        let mut triples = graph.iter();
        let first = triples.next().unwrap();
        let second = triples.next().unwrap();
        assert_eq!(first.o.as_blank(), second.s.as_blank());
        assert_eq!(first.o.as_blank(), Some("n1"));
    }

    #[test]
    fn test_anonymous_description_gets_fresh_blank() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description>
                   <ex:name>Alice</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (s, _, _) = single_triple(&graph);
        assert!(s.is_blank());
    }

    #[test]
    fn test_relative_about_resolves_against_base() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="a">
                   <ex:b rdf:resource=""/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let mut sink = GraphCollectorSink::new();
        parse_with_base(&doc, Some("http://base.example/doc"), &mut sink).unwrap();
        let graph = sink.finish();
        let (s, _, o) = single_triple(&graph);
        assert_eq!(s.as_iri(), Some("http://base.example/doc/a"));
        assert_eq!(o.as_iri(), Some("http://base.example/doc"));
    }

    #[test]
    fn test_fragment_resolves_against_base() {
        let doc = format!(
            r##"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="#it">
                   <ex:b rdf:resource="http://example.org/c"/>
                 </rdf:Description>
               </rdf:RDF>"##
        );
        let mut sink = GraphCollectorSink::new();
        parse_with_base(&doc, Some("http://base.example/doc"), &mut sink).unwrap();
        let graph = sink.finish();
        let (s, _, _) = single_triple(&graph);
        assert_eq!(s.as_iri(), Some("http://base.example/doc#it"));
    }

    #[test]
    fn test_multiple_subjects_and_properties() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:p rdf:resource="http://example.org/x"/>
                   <ex:q>one</ex:q>
                 </rdf:Description>
                 <rdf:Description rdf:about="http://example.org/b">
                   <ex:p rdf:resource="http://example.org/y"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_prefixes_reported() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b rdf:resource="http://example.org/c"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        assert_eq!(
            graph.prefixes.get("ex").map(String::as_str),
            Some("http://example.org/")
        );
        assert_eq!(
            graph.prefixes.get("rdf").map(String::as_str),
            Some(rdf::NS)
        );
    }

    #[test]
    fn test_empty_description_is_fine() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS}>
                 <rdf:Description rdf:about="http://example.org/a"/>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_property_without_content_is_dropped() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b></ex:b>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_text_is_trimmed() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:name>
                     Alice
                   </ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.lexical(), Some("Alice"));
    }

    #[test]
    fn test_nested_description_rejected() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS}>
                 <rdf:Description rdf:about="http://example.org/a">
                   <rdf:Description rdf:about="http://example.org/b"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(err.to_string().contains("nested rdf:Description"));
        assert!(matches!(err, RdfXmlError::Syntax { .. }));
    }

    #[test]
    fn test_nested_node_element_rejected() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:knows><rdf:Description rdf:nodeID="n"/></ex:knows>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(err.to_string().contains("inside a property element"));
    }

    #[test]
    fn test_typed_node_element_rejected() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <ex:Person rdf:about="http://example.org/a"/>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(err.to_string().contains("outside rdf:Description"));
    }

    #[test]
    fn test_parse_type_rejected() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b rdf:parseType="Resource"></ex:b>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(err.to_string().contains("rdf:parseType"));
    }

    #[test]
    fn test_resource_and_node_id_conflict() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b rdf:resource="http://example.org/c" rdf:nodeID="n"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_undeclared_prefix_rejected() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS}>
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:b rdf:resource="http://example.org/c"/>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(matches!(err, RdfXmlError::UndeclaredPrefix(ref p) if p == "ex"));
    }

    #[test]
    fn test_malformed_xml_reports_position() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS}>
                 <rdf:Description rdf:about="http://example.org/a"></wrong>
               </rdf:RDF>"#
        );
        let err = parse_to_graph(&doc).unwrap_err();
        assert!(matches!(err, RdfXmlError::Xml { .. }));
        assert!(err.position().is_some());
    }

    #[test]
    fn test_escaped_text_unescaped() {
        let doc = format!(
            r#"<rdf:RDF {RDF_XMLNS} xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/a">
                   <ex:name>a &amp; b</ex:name>
                 </rdf:Description>
               </rdf:RDF>"#
        );
        let graph = parse_to_graph(&doc).unwrap();
        let (_, _, o) = single_triple(&graph);
        assert_eq!(o.lexical(), Some("a & b"));
    }
}
