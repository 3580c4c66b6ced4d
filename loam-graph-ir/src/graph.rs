//! In-memory statement collection
//!
//! [`Graph`] is an ordered collection of [`Triple`]s plus the source-level
//! context a parse produced: the base IRI in effect and the declared
//! prefixes. Statement order is insertion order until [`Graph::sort`] is
//! called.

use crate::term::{Term, Triple};
use std::collections::BTreeMap;

/// An ordered collection of statements with their source context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
    /// Base IRI in effect when the source was parsed, if any.
    pub base: Option<String>,
    /// Prefix declarations collected from the source, prefix → namespace IRI.
    pub prefixes: BTreeMap<String, String>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with a base IRI already set.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Set (or replace) the base IRI.
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Record a prefix declaration. Re-declaring a prefix replaces it.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Append a statement.
    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Append a statement from its three terms.
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) {
        self.triples.push(Triple::new(s, p, o));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// Whether the graph contains the given statement.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Sort statements into their structural order.
    pub fn sort(&mut self) {
        self.triples.sort();
    }

    /// Remove adjacent duplicate statements. Sort first for a full dedupe.
    pub fn dedupe(&mut self) {
        self.triples.dedup();
    }

    /// Consume the graph, yielding its statements.
    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_add_and_iterate() {
        let mut graph = Graph::new();
        graph.add_triple(ex("a"), ex("b"), ex("c"));
        graph.add_triple(ex("a"), ex("b"), Term::string("x"));

        assert_eq!(graph.len(), 2);
        let subjects: Vec<_> = graph.iter().map(|t| t.s.clone()).collect();
        assert_eq!(subjects, vec![ex("a"), ex("a")]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut graph = Graph::new();
        graph.add_triple(ex("z"), ex("p"), ex("1"));
        graph.add_triple(ex("a"), ex("p"), ex("2"));

        let first = graph.iter().next().unwrap();
        assert_eq!(first.s, ex("z"));
    }

    #[test]
    fn test_sort_and_dedupe() {
        let mut graph = Graph::new();
        graph.add_triple(ex("b"), ex("p"), ex("o"));
        graph.add_triple(ex("a"), ex("p"), ex("o"));
        graph.add_triple(ex("b"), ex("p"), ex("o"));

        graph.sort();
        graph.dedupe();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.iter().next().unwrap().s, ex("a"));
    }

    #[test]
    fn test_base_and_prefixes() {
        let mut graph = Graph::with_base("http://example.org/");
        graph.add_prefix("ex", "http://example.org/ns#");

        assert_eq!(graph.base.as_deref(), Some("http://example.org/"));
        assert_eq!(
            graph.prefixes.get("ex").map(String::as_str),
            Some("http://example.org/ns#")
        );
    }

    #[test]
    fn test_extend_merges_statements() {
        let mut target = Graph::new();
        target.add_triple(ex("a"), ex("p"), ex("1"));

        let mut other = Graph::new();
        other.add_triple(ex("b"), ex("p"), ex("2"));

        target.extend(other);
        assert_eq!(target.len(), 2);
    }
}
