//! N-Triples parser emitting [`loam_graph_ir::GraphSink`] events.
//!
//! Strict line-based grammar: one triple per line, absolute IRIs only,
//! double-quoted literals. Anything Turtle adds on top (prefixes, relative
//! references, collections) is rejected here.
//!
//! # Example
//!
//! ```
//! use loam_graph_ntriples::parse;
//! use loam_graph_ir::GraphCollectorSink;
//!
//! let nt = r#"<http://ex/a> <http://ex/b> "c" ."#;
//! let mut sink = GraphCollectorSink::new();
//! parse(nt, &mut sink).unwrap();
//! assert_eq!(sink.finish().len(), 1);
//! ```

pub mod error;
pub mod parser;

pub use error::{NTriplesError, Result};
pub use parser::parse;
