//! RDF/XML parser emitting [`loam_graph_ir::GraphSink`] events.
//!
//! Covers the flat `rdf:Description` shape: an `rdf:RDF` root holding
//! description elements whose children are property elements with either an
//! `rdf:resource` / `rdf:nodeID` object or literal text content. Literals
//! honor `rdf:datatype` and `xml:lang` (inherited from the description or the
//! document root). Constructs that would change statement structure if
//! ignored, such as nested node elements, typed node elements, `rdf:ID` and
//! `rdf:parseType`, are rejected with a position-carrying error instead.
//!
//! # Example
//!
//! ```
//! use loam_graph_ir::GraphCollectorSink;
//! use loam_graph_rdfxml::parse;
//!
//! let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                       xmlns:ex="http://example.org/">
//!   <rdf:Description rdf:about="http://example.org/a">
//!     <ex:b rdf:resource="http://example.org/c"/>
//!   </rdf:Description>
//! </rdf:RDF>"#;
//!
//! let mut sink = GraphCollectorSink::new();
//! parse(doc, &mut sink).unwrap();
//! assert_eq!(sink.finish().len(), 1);
//! ```

pub mod error;
pub mod parser;

pub use error::{RdfXmlError, Result};
pub use parser::{parse, parse_with_base};
