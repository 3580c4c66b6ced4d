//! Event interface between deserializers and graph construction
//!
//! Deserializers do not build a [`Graph`] directly; they emit term and
//! statement events through [`GraphSink`]. That keeps grammar code free of
//! any knowledge of the statement store, and lets a host swap in its own
//! sink (streaming writer, ingest adapter) without touching the parsers.
//!
//! Terms are interned per sink session: `iri`/`blank`/`literal` return a
//! [`TermId`] handle, and `triple` emits a statement from three handles.
//!
//! # Example
//!
//! ```
//! use loam_graph_ir::{GraphCollectorSink, GraphSink};
//!
//! let mut sink = GraphCollectorSink::new();
//! let s = sink.iri("http://example.org/alice");
//! let p = sink.iri("http://xmlns.com/foaf/0.1/name");
//! let o = sink.literal("Alice", "http://www.w3.org/2001/XMLSchema#string", None);
//! sink.triple(s, p, o);
//!
//! let graph = sink.finish();
//! assert_eq!(graph.len(), 1);
//! ```

use crate::graph::Graph;
use crate::term::{Term, Triple};
use std::collections::HashMap;

/// Opaque term handle, valid only within the sink session that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermId(u32);

impl TermId {
    /// Construct from a raw index. For `GraphSink` implementations outside
    /// this crate.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw index value.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Receives term and statement events from a deserializer.
pub trait GraphSink {
    /// A base IRI was declared (`@base`, `"@base"` in a context, ...).
    fn on_base(&mut self, base: &str);

    /// A prefix was declared (`@prefix ex: <...>`, context term, ...).
    fn on_prefix(&mut self, prefix: &str, namespace: &str);

    /// Intern a fully expanded IRI.
    fn iri(&mut self, iri: &str) -> TermId;

    /// Intern a blank node. `Some(label)` keeps identity stable across
    /// references to the same label; `None` allocates a fresh node.
    fn blank(&mut self, label: Option<&str>) -> TermId;

    /// Intern a literal from its lexical form, datatype IRI, and optional
    /// language tag.
    fn literal(&mut self, lexical: &str, datatype: &str, language: Option<&str>) -> TermId;

    /// Emit one statement from previously interned terms.
    fn triple(&mut self, s: TermId, p: TermId, o: TermId);
}

/// The standard sink: collects events into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphCollectorSink {
    graph: Graph,
    terms: Vec<Term>,
    // Keeps `_:label` identity stable across the session.
    blank_labels: HashMap<String, TermId>,
    fresh_blanks: u32,
}

impl GraphCollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector whose graph starts with a base IRI already set.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            graph: Graph::with_base(base),
            ..Self::default()
        }
    }

    /// Consume the sink and return the collected graph.
    pub fn finish(self) -> Graph {
        self.graph
    }

    /// The graph collected so far.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn intern(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }

    fn term(&self, id: TermId) -> &Term {
        &self.terms[id.0 as usize]
    }
}

impl GraphSink for GraphCollectorSink {
    fn on_base(&mut self, base: &str) {
        self.graph.set_base(base);
    }

    fn on_prefix(&mut self, prefix: &str, namespace: &str) {
        self.graph.add_prefix(prefix, namespace);
    }

    fn iri(&mut self, iri: &str) -> TermId {
        self.intern(Term::iri(iri))
    }

    fn blank(&mut self, label: Option<&str>) -> TermId {
        match label {
            Some(l) => {
                if let Some(&id) = self.blank_labels.get(l) {
                    return id;
                }
                let id = self.intern(Term::blank(l));
                self.blank_labels.insert(l.to_string(), id);
                id
            }
            None => {
                // Leading dot is invalid in Turtle/N-Triples blank labels,
                // so generated nodes cannot collide with source labels.
                self.fresh_blanks += 1;
                let label = format!(".g{}", self.fresh_blanks);
                self.intern(Term::blank(label))
            }
        }
    }

    fn literal(&mut self, lexical: &str, datatype: &str, language: Option<&str>) -> TermId {
        let term = match language {
            Some(lang) => Term::lang_string(lexical, lang),
            None => Term::typed(lexical, datatype),
        };
        self.intern(term)
    }

    fn triple(&mut self, s: TermId, p: TermId, o: TermId) {
        let triple = Triple::new(
            self.term(s).clone(),
            self.term(p).clone(),
            self.term(o).clone(),
        );
        self.graph.add(triple);
    }
}
