//! Recursive-descent parser over the token stream.
//!
//! Emits [`GraphSink`] events as statements complete. Collections are
//! expanded into `rdf:first`/`rdf:rest` chains here, so sinks never see
//! list structure. In TriG mode, graph blocks are accepted and flattened:
//! their triples land in the single output graph and labels are discarded.

use std::collections::HashMap;

use loam_graph_ir::{GraphSink, TermId};
use loam_vocab::{rdf, xsd};

use crate::error::{Result, TurtleError};
use crate::lex::{self, Token, TokenKind};

/// Which grammar of the family the parser accepts.
///
/// `Turtle` also covers the N3 documents this crate handles, since the
/// accepted N3 subset is Turtle-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Turtle,
    TriG,
}

pub(crate) struct Parser<'a, S> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    sink: &'a mut S,
    dialect: Dialect,
    prefixes: HashMap<String, String>,
    base: Option<String>,
}

impl<'a, S: GraphSink> Parser<'a, S> {
    /// Tokenize `source` and set up a parser. An ambient `base` (usually the
    /// document location) seeds IRI resolution without producing a base event.
    pub(crate) fn new(
        source: &'a str,
        sink: &'a mut S,
        dialect: Dialect,
        base: Option<&str>,
    ) -> Result<Self> {
        let tokens = lex::tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
            sink,
            dialect,
            prefixes: HashMap::new(),
            base: base.map(str::to_string),
        })
    }

    pub(crate) fn run(mut self) -> Result<()> {
        while !matches!(self.current().kind, TokenKind::Eof) {
            self.parse_statement()?;
        }
        Ok(())
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        // the stream ends with Eof, which stays current forever
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current().kind) == std::mem::discriminant(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> TurtleError {
        let token = self.current();
        let (line, column) = lex::line_col(self.source, token.offset);
        TurtleError::syntax(
            line,
            column,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Result<()> {
        match self.current().kind {
            TokenKind::PrefixDecl => self.parse_prefix_declaration(true),
            TokenKind::SparqlPrefix => self.parse_prefix_declaration(false),
            TokenKind::BaseDecl => self.parse_base_declaration(true),
            TokenKind::SparqlBase => self.parse_base_declaration(false),
            TokenKind::Graph if self.dialect == Dialect::TriG => {
                self.advance();
                self.parse_graph_label()?;
                self.parse_graph_block()
            }
            TokenKind::OpenBrace if self.dialect == Dialect::TriG => self.parse_graph_block(),
            _ => {
                if self.parse_triples_or_labelled_block()? {
                    // a graph block closes itself, no trailing terminator
                    Ok(())
                } else {
                    self.expect(&TokenKind::Dot)
                }
            }
        }
    }

    fn parse_prefix_declaration(&mut self, with_dot: bool) -> Result<()> {
        self.advance();
        let prefix = match self.current().kind.clone() {
            TokenKind::Pname { prefix, local } if local.is_empty() => {
                self.advance();
                prefix
            }
            _ => return Err(self.unexpected("prefix name ending in ':'")),
        };
        let namespace = match self.current().kind.clone() {
            TokenKind::IriRef(iri) => {
                let resolved = self.resolve(&iri)?;
                self.advance();
                resolved
            }
            _ => return Err(self.unexpected("namespace IRI")),
        };
        if with_dot {
            self.expect(&TokenKind::Dot)?;
        }
        self.sink.on_prefix(&prefix, &namespace);
        self.prefixes.insert(prefix, namespace);
        Ok(())
    }

    fn parse_base_declaration(&mut self, with_dot: bool) -> Result<()> {
        self.advance();
        let base = match self.current().kind.clone() {
            TokenKind::IriRef(iri) => {
                // a new base may itself be relative to the previous one
                let resolved = self.resolve(&iri)?;
                self.advance();
                resolved
            }
            _ => return Err(self.unexpected("base IRI")),
        };
        if with_dot {
            self.expect(&TokenKind::Dot)?;
        }
        self.sink.on_base(&base);
        self.base = Some(base);
        Ok(())
    }

    /// Parse one triples group, or a labelled graph block in TriG mode.
    ///
    /// Returns `true` when a graph block was consumed, meaning the caller
    /// must not expect a `.` terminator.
    fn parse_triples_or_labelled_block(&mut self) -> Result<bool> {
        if matches!(self.current().kind, TokenKind::OpenBracket) {
            let subject = self.parse_bnode_property_list()?;
            // `[] { .. }`: an anonymous node may label a graph block
            if self.dialect == Dialect::TriG
                && matches!(self.current().kind, TokenKind::OpenBrace)
            {
                self.parse_graph_block()?;
                return Ok(true);
            }
            // a bare property list may stand alone as a statement
            if !matches!(self.current().kind, TokenKind::Dot) {
                self.parse_predicate_object_list(subject)?;
            }
            return Ok(false);
        }

        let subject = self.parse_subject()?;
        if self.dialect == Dialect::TriG && matches!(self.current().kind, TokenKind::OpenBrace) {
            self.parse_graph_block()?;
            return Ok(true);
        }
        self.parse_predicate_object_list(subject)?;
        Ok(false)
    }

    // =========================================================================
    // TriG graph blocks
    // =========================================================================

    /// Graph label after the `GRAPH` keyword. The label is parsed for
    /// validity and then discarded.
    fn parse_graph_label(&mut self) -> Result<()> {
        match self.current().kind.clone() {
            TokenKind::IriRef(iri) => {
                self.resolve(&iri)?;
                self.advance();
                Ok(())
            }
            TokenKind::Pname { prefix, local } => {
                self.expand_pname(&prefix, &local)?;
                self.advance();
                Ok(())
            }
            TokenKind::BlankLabel(_) => {
                self.advance();
                Ok(())
            }
            TokenKind::OpenBracket => {
                self.advance();
                self.expect(&TokenKind::CloseBracket)
            }
            _ => Err(self.unexpected("graph label")),
        }
    }

    /// `{ triples* }` with the final `.` before `}` optional. Triples are
    /// emitted into the default graph.
    fn parse_graph_block(&mut self) -> Result<()> {
        self.expect(&TokenKind::OpenBrace)?;
        loop {
            if matches!(self.current().kind, TokenKind::CloseBrace) {
                self.advance();
                return Ok(());
            }

            if matches!(self.current().kind, TokenKind::OpenBracket) {
                let subject = self.parse_bnode_property_list()?;
                if !matches!(
                    self.current().kind,
                    TokenKind::Dot | TokenKind::CloseBrace
                ) {
                    self.parse_predicate_object_list(subject)?;
                }
            } else {
                let subject = self.parse_subject()?;
                self.parse_predicate_object_list(subject)?;
            }

            if matches!(self.current().kind, TokenKind::Dot) {
                self.advance();
            } else if !matches!(self.current().kind, TokenKind::CloseBrace) {
                return Err(self.unexpected("'.' or '}'"));
            }
        }
    }

    // =========================================================================
    // Triples
    // =========================================================================

    fn parse_subject(&mut self) -> Result<TermId> {
        match self.current().kind.clone() {
            TokenKind::IriRef(iri) => {
                let resolved = self.resolve(&iri)?;
                self.advance();
                Ok(self.sink.iri(&resolved))
            }
            TokenKind::Pname { prefix, local } => {
                let iri = self.expand_pname(&prefix, &local)?;
                self.advance();
                Ok(self.sink.iri(&iri))
            }
            TokenKind::BlankLabel(label) => {
                self.advance();
                Ok(self.sink.blank(Some(&label)))
            }
            TokenKind::OpenParen => self.parse_collection(),
            _ => Err(self.unexpected("subject")),
        }
    }

    fn parse_verb(&mut self) -> Result<TermId> {
        match self.current().kind.clone() {
            TokenKind::A => {
                self.advance();
                Ok(self.sink.iri(rdf::TYPE))
            }
            TokenKind::IriRef(iri) => {
                let resolved = self.resolve(&iri)?;
                self.advance();
                Ok(self.sink.iri(&resolved))
            }
            TokenKind::Pname { prefix, local } => {
                let iri = self.expand_pname(&prefix, &local)?;
                self.advance();
                Ok(self.sink.iri(&iri))
            }
            _ => Err(self.unexpected("predicate")),
        }
    }

    fn parse_predicate_object_list(&mut self, subject: TermId) -> Result<()> {
        loop {
            let predicate = self.parse_verb()?;
            self.parse_object_list(subject, predicate)?;

            if !matches!(self.current().kind, TokenKind::Semicolon) {
                return Ok(());
            }
            while matches!(self.current().kind, TokenKind::Semicolon) {
                self.advance();
            }
            // a run of semicolons may trail with no verb after it
            if matches!(
                self.current().kind,
                TokenKind::Dot | TokenKind::CloseBracket | TokenKind::CloseBrace | TokenKind::Eof
            ) {
                return Ok(());
            }
        }
    }

    fn parse_object_list(&mut self, subject: TermId, predicate: TermId) -> Result<()> {
        loop {
            let object = self.parse_object()?;
            self.sink.triple(subject, predicate, object);
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    fn parse_object(&mut self) -> Result<TermId> {
        if matches!(self.current().kind, TokenKind::OpenBracket) {
            return self.parse_bnode_property_list();
        }
        if matches!(
            self.current().kind,
            TokenKind::IriRef(_)
                | TokenKind::Pname { .. }
                | TokenKind::BlankLabel(_)
                | TokenKind::OpenParen
        ) {
            return self.parse_subject();
        }
        self.parse_literal()
    }

    /// `[ predicate object ; ... ]`, producing a fresh blank node.
    fn parse_bnode_property_list(&mut self) -> Result<TermId> {
        self.expect(&TokenKind::OpenBracket)?;
        let node = self.sink.blank(None);
        if !matches!(self.current().kind, TokenKind::CloseBracket) {
            self.parse_predicate_object_list(node)?;
        }
        self.expect(&TokenKind::CloseBracket)?;
        Ok(node)
    }

    /// `( item1 item2 ... )` expanded to an rdf:first/rdf:rest chain.
    fn parse_collection(&mut self) -> Result<TermId> {
        self.expect(&TokenKind::OpenParen)?;
        if matches!(self.current().kind, TokenKind::CloseParen) {
            self.advance();
            return Ok(self.sink.iri(rdf::NIL));
        }

        let first = self.sink.iri(rdf::FIRST);
        let rest = self.sink.iri(rdf::REST);
        let nil = self.sink.iri(rdf::NIL);

        let head = self.sink.blank(None);
        let mut node = head;
        loop {
            let item = self.parse_object()?;
            self.sink.triple(node, first, item);
            if matches!(self.current().kind, TokenKind::CloseParen) {
                self.sink.triple(node, rest, nil);
                self.advance();
                return Ok(head);
            }
            let next = self.sink.blank(None);
            self.sink.triple(node, rest, next);
            node = next;
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn parse_literal(&mut self) -> Result<TermId> {
        match self.current().kind.clone() {
            TokenKind::StringLit(lexical) => {
                self.advance();
                match self.current().kind.clone() {
                    TokenKind::LangTag(tag) => {
                        self.advance();
                        Ok(self.sink.literal(&lexical, rdf::LANG_STRING, Some(&tag)))
                    }
                    TokenKind::Caret2 => {
                        self.advance();
                        let datatype = self.parse_datatype_iri()?;
                        Ok(self.sink.literal(&lexical, &datatype, None))
                    }
                    _ => Ok(self.sink.literal(&lexical, xsd::STRING, None)),
                }
            }
            TokenKind::Integer(lexical) => {
                self.advance();
                Ok(self.sink.literal(&lexical, xsd::INTEGER, None))
            }
            TokenKind::Decimal(lexical) => {
                self.advance();
                Ok(self.sink.literal(&lexical, xsd::DECIMAL, None))
            }
            TokenKind::Double(lexical) => {
                self.advance();
                Ok(self.sink.literal(&lexical, xsd::DOUBLE, None))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.sink.literal("true", xsd::BOOLEAN, None))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.sink.literal("false", xsd::BOOLEAN, None))
            }
            _ => Err(self.unexpected("object")),
        }
    }

    fn parse_datatype_iri(&mut self) -> Result<String> {
        match self.current().kind.clone() {
            TokenKind::IriRef(iri) => {
                let resolved = self.resolve(&iri)?;
                self.advance();
                Ok(resolved)
            }
            TokenKind::Pname { prefix, local } => {
                let iri = self.expand_pname(&prefix, &local)?;
                self.advance();
                Ok(iri)
            }
            _ => Err(self.unexpected("datatype IRI")),
        }
    }

    // =========================================================================
    // IRI expansion
    // =========================================================================

    fn expand_pname(&self, prefix: &str, local: &str) -> Result<String> {
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(format!("{namespace}{local}")),
            None => Err(TurtleError::UndefinedPrefix(prefix.to_string())),
        }
    }

    fn resolve(&self, reference: &str) -> Result<String> {
        if is_absolute_iri(reference) {
            return Ok(reference.to_string());
        }
        match &self.base {
            Some(base) => Ok(resolve_reference(base, reference)),
            None => Err(TurtleError::UnresolvedIri(reference.to_string())),
        }
    }
}

// =============================================================================
// RFC 3986 reference resolution
// =============================================================================

fn is_absolute_iri(reference: &str) -> bool {
    match reference.find(':') {
        Some(pos) => {
            let head = &reference[..pos];
            !head.contains(['/', '?', '#']) && is_scheme(head)
        }
        None => false,
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Transform-references algorithm from RFC 3986 section 5.2.2, fragments
/// included.
fn resolve_reference(base: &str, reference: &str) -> String {
    let (r_scheme, r_auth, r_path, r_query, r_frag) = split_iri(reference);
    let (b_scheme, b_auth, b_path, b_query, _) = split_iri(base);

    let (scheme, authority, path, query) = if r_scheme.is_some() {
        (r_scheme, r_auth, remove_dot_segments(r_path), r_query)
    } else if r_auth.is_some() {
        (b_scheme, r_auth, remove_dot_segments(r_path), r_query)
    } else if r_path.is_empty() {
        let query = if r_query.is_some() { r_query } else { b_query };
        (b_scheme, b_auth, b_path.to_string(), query)
    } else if r_path.starts_with('/') {
        (b_scheme, b_auth, remove_dot_segments(r_path), r_query)
    } else {
        let merged = merge_paths(b_auth, b_path, r_path);
        (b_scheme, b_auth, remove_dot_segments(&merged), r_query)
    };

    let mut out = String::new();
    if let Some(s) = scheme {
        out.push_str(s);
        out.push(':');
    }
    if let Some(a) = authority {
        out.push_str("//");
        out.push_str(a);
    }
    out.push_str(&path);
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    if let Some(f) = r_frag {
        out.push('#');
        out.push_str(f);
    }
    out
}

/// Split into (scheme, authority, path, query, fragment).
fn split_iri(iri: &str) -> (Option<&str>, Option<&str>, &str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match iri.find('#') {
        Some(pos) => (&iri[..pos], Some(&iri[pos + 1..])),
        None => (iri, None),
    };
    let (rest, query) = match rest.find('?') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let (scheme, rest) = match rest.find(':') {
        Some(pos) if is_scheme(&rest[..pos]) => (Some(&rest[..pos]), &rest[pos + 1..]),
        _ => (None, rest),
    };
    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find('/').unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };
    (scheme, authority, path, query, fragment)
}

/// Merge algorithm from RFC 3986 section 5.3.
fn merge_paths(base_authority: Option<&str>, base_path: &str, ref_path: &str) -> String {
    if base_authority.is_some() && base_path.is_empty() {
        return format!("/{ref_path}");
    }
    match base_path.rfind('/') {
        Some(pos) => format!("{}{}", &base_path[..=pos], ref_path),
        None => ref_path.to_string(),
    }
}

/// Remove-dot-segments algorithm from RFC 3986 section 5.2.4.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::new();
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            truncate_last_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            truncate_last_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = match input[start..].find('/') {
                Some(pos) => start + pos,
                None => input.len(),
            };
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }
    output
}

fn truncate_last_segment(output: &mut String) {
    match output.rfind('/') {
        Some(pos) => output.truncate(pos),
        None => output.clear(),
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse a Turtle document into [`GraphSink`] events.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    parse_with_base(input, None, sink)
}

/// Parse a Turtle document, resolving relative IRIs against `base` until the
/// document declares its own.
pub fn parse_with_base<S: GraphSink>(input: &str, base: Option<&str>, sink: &mut S) -> Result<()> {
    Parser::new(input, sink, Dialect::Turtle, base)?.run()
}

/// Parse a TriG document. Graph blocks are flattened into the default graph.
pub fn parse_trig<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    parse_trig_with_base(input, None, sink)
}

/// Parse a TriG document with an ambient base IRI.
pub fn parse_trig_with_base<S: GraphSink>(
    input: &str,
    base: Option<&str>,
    sink: &mut S,
) -> Result<()> {
    Parser::new(input, sink, Dialect::TriG, base)?.run()
}
