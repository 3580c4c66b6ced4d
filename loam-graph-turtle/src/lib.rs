//! Turtle-family parser emitting [`loam_graph_ir::GraphSink`] events.
//!
//! Covers Turtle, TriG, and the Turtle-compatible subset of N3. TriG graph
//! blocks are flattened: every triple lands in the single output graph and
//! graph labels are discarded after validation.
//!
//! # Example
//!
//! ```
//! use loam_graph_turtle::parse;
//! use loam_graph_ir::GraphCollectorSink;
//!
//! let turtle = r#"
//!     @prefix ex: <http://example.org/> .
//!     ex:alice ex:name "Alice" ;
//!              ex:age 30 .
//! "#;
//!
//! let mut sink = GraphCollectorSink::new();
//! parse(turtle, &mut sink).unwrap();
//! let graph = sink.finish();
//! assert_eq!(graph.len(), 2);
//! ```

pub mod error;
pub mod lex;
pub mod parser;

pub use error::{Result, TurtleError};
pub use lex::{tokenize, Token, TokenKind};
pub use parser::{parse, parse_trig, parse_trig_with_base, parse_with_base};
