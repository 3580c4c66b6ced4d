//! Line-oriented N-Triples parser.
//!
//! Each non-blank, non-comment line must hold exactly one triple. IRIs must
//! be absolute; there are no prefixes and no relative references to resolve.

use loam_graph_ir::{GraphSink, TermId};
use loam_vocab::{rdf, xsd};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::AsChar;
use winnow::token::{any, take_while};
use winnow::{ModalResult, Parser};

use crate::error::{NTriplesError, Result};

/// Parse an N-Triples document into [`GraphSink`] events.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        parse_line(line, idx + 1, sink)?;
    }
    Ok(())
}

fn parse_line<S: GraphSink>(line: &str, line_no: usize, sink: &mut S) -> Result<()> {
    let mut input = line;

    skip_ws(&mut input);
    let subject =
        parse_node(&mut input).map_err(|_| fail(line_no, line, input, "subject"))?;
    skip_ws(&mut input);
    let predicate =
        parse_iri(&mut input).map_err(|_| fail(line_no, line, input, "predicate IRI"))?;
    skip_ws(&mut input);
    let object =
        parse_term(&mut input).map_err(|_| fail(line_no, line, input, "object"))?;
    skip_ws(&mut input);
    let _ = '.'
        .parse_next(&mut input)
        .map_err(|_: ErrMode<ContextError>| fail(line_no, line, input, "'.' terminator"))?;
    skip_ws(&mut input);
    if !input.is_empty() && !input.starts_with('#') {
        return Err(fail(line_no, line, input, "end of line"));
    }

    let s = subject.to_id(sink);
    let p = sink.iri(&predicate);
    let o = object.to_id(sink);
    sink.triple(s, p, o);
    Ok(())
}

fn fail(line_no: usize, full: &str, rest: &str, expected: &str) -> NTriplesError {
    NTriplesError {
        line: line_no,
        column: full.len() - rest.len() + 1,
        message: format!("expected {expected}"),
    }
}

// =============================================================================
// Terms
// =============================================================================

enum NtTerm {
    Iri(String),
    Blank(String),
    Literal {
        lexical: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl NtTerm {
    fn to_id<S: GraphSink>(&self, sink: &mut S) -> TermId {
        match self {
            NtTerm::Iri(iri) => sink.iri(iri),
            NtTerm::Blank(label) => sink.blank(Some(label)),
            NtTerm::Literal {
                lexical,
                datatype,
                language,
            } => match (datatype, language) {
                (_, Some(tag)) => sink.literal(lexical, rdf::LANG_STRING, Some(tag)),
                (Some(dt), None) => sink.literal(lexical, dt, None),
                (None, None) => sink.literal(lexical, xsd::STRING, None),
            },
        }
    }
}

/// Subject position: IRI or blank node.
fn parse_node(input: &mut &str) -> ModalResult<NtTerm> {
    if input.starts_with('<') {
        return parse_iri(input).map(NtTerm::Iri);
    }
    parse_blank(input)
}

/// Object position: IRI, blank node, or literal.
fn parse_term(input: &mut &str) -> ModalResult<NtTerm> {
    if input.starts_with('<') {
        return parse_iri(input).map(NtTerm::Iri);
    }
    if input.starts_with('_') {
        return parse_blank(input);
    }
    parse_literal(input)
}

fn parse_iri(input: &mut &str) -> ModalResult<String> {
    '<'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        out.push_str(chunk);
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            out.push(unicode_escape(input)?);
        } else {
            break;
        }
    }
    '>'.parse_next(input)?;
    if !is_absolute(&out) {
        return Err(backtrack());
    }
    Ok(out)
}

fn parse_blank(input: &mut &str) -> ModalResult<NtTerm> {
    "_:".parse_next(input)?;
    let first: char = any
        .verify(|c: &char| is_pn_chars_u(*c) || c.is_ascii_digit())
        .parse_next(input)?;
    let mut label = String::new();
    label.push(first);
    loop {
        let chunk: &str = take_while(0.., is_pn_chars).parse_next(input)?;
        label.push_str(chunk);
        // interior dots only; `_:b.` is a label then the line terminator
        if input.starts_with('.') && input[1..].chars().next().is_some_and(is_pn_chars) {
            '.'.parse_next(input)?;
            label.push('.');
        } else {
            return Ok(NtTerm::Blank(label));
        }
    }
}

fn parse_literal(input: &mut &str) -> ModalResult<NtTerm> {
    '"'.parse_next(input)?;
    let mut lexical = String::new();
    loop {
        let chunk: &str =
            take_while(0.., |c: char| c != '"' && c != '\\' && c != '\n' && c != '\r')
                .parse_next(input)?;
        lexical.push_str(chunk);
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            lexical.push(string_escape(input)?);
        } else {
            break;
        }
    }
    '"'.parse_next(input)?;

    if input.starts_with('@') {
        '@'.parse_next(input)?;
        let tag: &str = (
            take_while(1.., |c: char| c.is_ascii_alphabetic()),
            take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
        )
            .take()
            .parse_next(input)?;
        return Ok(NtTerm::Literal {
            lexical,
            datatype: None,
            language: Some(tag.to_string()),
        });
    }

    if input.starts_with("^^") {
        "^^".parse_next(input)?;
        let datatype = parse_iri(input)?;
        return Ok(NtTerm::Literal {
            lexical,
            datatype: Some(datatype),
            language: None,
        });
    }

    Ok(NtTerm::Literal {
        lexical,
        datatype: None,
        language: None,
    })
}

// =============================================================================
// Escapes and character classes
// =============================================================================

fn string_escape(input: &mut &str) -> ModalResult<char> {
    let c: char = any.parse_next(input)?;
    match c {
        't' => Ok('\t'),
        'b' => Ok('\u{0008}'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'f' => Ok('\u{000C}'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        '\\' => Ok('\\'),
        'u' | 'U' => {
            let width = if c == 'u' { 4 } else { 8 };
            hex_char(input, width)
        }
        _ => Err(backtrack()),
    }
}

fn unicode_escape(input: &mut &str) -> ModalResult<char> {
    match any.parse_next(input)? {
        'u' => hex_char(input, 4),
        'U' => hex_char(input, 8),
        _ => Err(backtrack()),
    }
}

fn hex_char(input: &mut &str, width: usize) -> ModalResult<char> {
    let hex: &str = take_while(width..=width, AsChar::is_hex_digit).parse_next(input)?;
    let code = u32::from_str_radix(hex, 16).map_err(|_| backtrack())?;
    char::from_u32(code).ok_or_else(|| backtrack())
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn skip_ws(input: &mut &str) {
    let _: ModalResult<&str> = take_while(0.., [' ', '\t']).parse_next(input);
}

fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(pos) => {
            let head = &iri[..pos];
            let mut chars = head.chars();
            !head.contains(['/', '?', '#'])
                && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn is_iri_char(c: char) -> bool {
    !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') && c > '\u{20}'
}

fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_pn_chars_u(c: char) -> bool {
    c == '_' || is_pn_chars_base(c)
}

fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || matches!(c,
            '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_graph_ir::{Graph, GraphCollectorSink, Term};

    fn parse_to_graph(input: &str) -> Result<Graph> {
        let mut sink = GraphCollectorSink::new();
        parse(input, &mut sink)?;
        Ok(sink.finish())
    }

    #[test]
    fn test_simple_triple() {
        let graph =
            parse_to_graph("<http://ex/s> <http://ex/p> <http://ex/o> .").unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_dense_spacing() {
        let graph = parse_to_graph("<http://ex/s><http://ex/p><http://ex/o>.").unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_literal_flavors() {
        let input = r#"<http://ex/s> <http://ex/plain> "hello" .
<http://ex/s> <http://ex/lang> "bonjour"@fr .
<http://ex/s> <http://ex/typed> "42"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;
        let graph = parse_to_graph(input).unwrap();

        assert_eq!(graph.len(), 3);
        let objects: Vec<&Term> = graph.iter().map(|t| &t.o).collect();
        assert!(objects.contains(&&Term::string("hello")));
        assert!(objects.contains(&&Term::lang_string("bonjour", "fr")));
        assert!(objects.contains(&&Term::typed("42", xsd::INTEGER)));
    }

    #[test]
    fn test_escapes_decoded() {
        let input = r#"<http://ex/s> <http://ex/p> "tab\there é" ."#;
        let graph = parse_to_graph(input).unwrap();

        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.o.lexical(), Some("tab\there \u{00E9}"));
    }

    #[test]
    fn test_blank_nodes_shared_across_lines() {
        let input = "_:a <http://ex/p> _:b .\n_:b <http://ex/p> _:a .\n";
        let graph = parse_to_graph(input).unwrap();

        let triples: Vec<_> = graph.iter().collect();
        assert_eq!(triples[0].s, triples[1].o);
        assert_eq!(triples[0].o, triples[1].s);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input = "# header\n\n<http://ex/s> <http://ex/p> <http://ex/o> . # trailing\n";
        let graph = parse_to_graph(input).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse_to_graph("<http://ex/s> <http://ex/p> <http://ex/o>").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("'.'"));
    }

    #[test]
    fn test_error_points_at_offending_line() {
        let input = "<http://ex/a> <http://ex/b> <http://ex/c> .\nnot a triple\n";
        let err = parse_to_graph(input).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_relative_iri_rejected() {
        let err = parse_to_graph("<s> <http://ex/p> <http://ex/o> .").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("subject"));
    }

    #[test]
    fn test_turtle_syntax_rejected() {
        // prefixes belong to Turtle, not N-Triples
        let err = parse_to_graph("@prefix ex: <http://ex/> .").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err =
            parse_to_graph("<http://ex/s> <http://ex/p> <http://ex/o> . <http://ex/x>")
                .unwrap_err();
        assert!(err.message.contains("end of line"));
    }

    #[test]
    fn test_empty_document() {
        let graph = parse_to_graph("").unwrap();
        assert!(graph.is_empty());
    }
}
