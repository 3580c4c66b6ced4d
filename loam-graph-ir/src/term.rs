//! RDF term model
//!
//! A [`Term`] is one node of a statement: an IRI, a blank node, or a literal.
//! Literals are kept in lexical form together with their datatype IRI and
//! optional language tag — this crate transports statements, it does not
//! interpret their values.
//!
//! Interned strings use `Arc<str>` so cloning terms while assembling triples
//! stays cheap.
//!
//! # Example
//!
//! ```
//! use loam_graph_ir::Term;
//!
//! let subject = Term::iri("http://example.org/alice");
//! let name = Term::string("Alice");
//! let age = Term::typed("42", "http://www.w3.org/2001/XMLSchema#integer");
//! let greeting = Term::lang_string("hola", "es");
//!
//! assert!(subject.is_iri());
//! assert_eq!(name.lexical(), Some("Alice"));
//! assert_eq!(greeting.language(), Some("es"));
//! ```

use loam_vocab::{rdf, xsd};
use std::fmt;
use std::sync::Arc;

/// One node of an RDF statement.
///
/// All variants order and hash structurally, so `Term` can key maps and
/// sets and `Graph::sort` is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// An IRI reference, fully expanded (never a prefixed name).
    Iri(Arc<str>),
    /// A blank node, identified by its label without the `_:` prefix.
    Blank(Arc<str>),
    /// A literal in lexical form.
    Literal {
        /// The lexical form exactly as written in the source.
        lexical: Arc<str>,
        /// Datatype IRI; `xsd:string` for plain literals,
        /// `rdf:langString` when a language tag is present.
        datatype: Arc<str>,
        /// Language tag, lowercase, only for `rdf:langString` literals.
        language: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term.
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term from a label (without the `_:` prefix).
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(Arc::from(label.as_ref()))
    }

    /// Create a plain string literal (`xsd:string`).
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(value.as_ref()),
            datatype: Arc::from(xsd::STRING),
            language: None,
        }
    }

    /// Create a typed literal from its lexical form and datatype IRI.
    pub fn typed(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(value.as_ref()),
            datatype: Arc::from(datatype.as_ref()),
            language: None,
        }
    }

    /// Create a language-tagged string (`rdf:langString`).
    ///
    /// The tag is lowercased, matching how language tags compare.
    pub fn lang_string(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(value.as_ref()),
            datatype: Arc::from(rdf::LANG_STRING),
            language: Some(Arc::from(language.as_ref().to_ascii_lowercase().as_str())),
        }
    }

    /// The IRI if this term is one.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The blank node label if this term is one.
    pub fn as_blank(&self) -> Option<&str> {
        match self {
            Term::Blank(label) => Some(label),
            _ => None,
        }
    }

    /// The lexical form if this term is a literal.
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        }
    }

    /// The datatype IRI if this term is a literal.
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Term::Literal { datatype, .. } => Some(datatype),
            _ => None,
        }
    }

    /// The language tag if this term is a language-tagged literal.
    pub fn language(&self) -> Option<&str> {
        match self {
            Term::Literal { language, .. } => language.as_deref(),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }
}

impl fmt::Display for Term {
    /// N-Triples-style rendering, used in logs and test diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", lexical.escape_debug())?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if datatype.as_ref() != xsd::STRING {
                    write!(f, "^^<{}>", datatype)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// One subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub s: Term,
    pub p: Term,
    pub o: Term,
}

impl Triple {
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}
