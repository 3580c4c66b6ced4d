//! In-memory RDF statement model and parser event interface
//!
//! This crate is the boundary between the format deserializers and whatever
//! consumes their output:
//!
//! - [`Term`] / [`Triple`] / [`Graph`] — the statement model
//! - [`GraphSink`] — the event interface deserializers emit into
//! - [`GraphCollectorSink`] — the standard sink, materializing events into
//!   a [`Graph`]
//!
//! # Example
//!
//! ```
//! use loam_graph_ir::{Graph, Term, Triple};
//!
//! let mut graph = Graph::new();
//! graph.add_triple(
//!     Term::iri("http://example.org/a"),
//!     Term::iri("http://example.org/b"),
//!     Term::iri("http://example.org/c"),
//! );
//! assert_eq!(graph.len(), 1);
//! ```

mod graph;
mod sink;
mod term;

pub use graph::Graph;
pub use sink::{GraphCollectorSink, GraphSink, TermId};
pub use term::{Term, Triple};
