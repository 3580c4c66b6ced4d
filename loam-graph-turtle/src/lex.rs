//! Scanner for the Turtle family of grammars.
//!
//! Produces a flat token stream with byte offsets, failing fast on the first
//! malformed token. TriG braces and the `GRAPH` keyword are tokenized
//! unconditionally; the parser decides whether they are legal for the grammar
//! it was asked to read.

use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, peek};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location, Stream};
use winnow::token::{any, one_of, take_till, take_while};
use winnow::{LocatingSlice, ModalResult, Parser};

use crate::error::{Result, TurtleError};

type Input<'a> = LocatingSlice<&'a str>;

/// A scanned token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Token kinds for Turtle, TriG, and the N3 subset shared with Turtle.
///
/// Numeric literals keep their lexical form; the parser pairs them with the
/// matching XSD datatype without reinterpreting the digits.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `<...>` with `\u`/`\U` escapes decoded
    IriRef(String),
    /// `prefix:local`; either part may be empty
    Pname { prefix: String, local: String },
    /// `_:label`
    BlankLabel(String),
    /// Quoted string with escapes decoded
    StringLit(String),
    /// `@tag` language tag
    LangTag(String),
    Integer(String),
    Decimal(String),
    Double(String),
    /// `@prefix`
    PrefixDecl,
    /// `@base`
    BaseDecl,
    /// SPARQL-style `PREFIX`
    SparqlPrefix,
    /// SPARQL-style `BASE`
    SparqlBase,
    /// TriG `GRAPH`
    Graph,
    /// The predicate keyword `a`
    A,
    True,
    False,
    Dot,
    Semicolon,
    Comma,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// `^^`
    Caret2,
    Eof,
}

impl TokenKind {
    /// Short human name used in parser error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            TokenKind::IriRef(_) => "IRI reference",
            TokenKind::Pname { .. } => "prefixed name",
            TokenKind::BlankLabel(_) => "blank node label",
            TokenKind::StringLit(_) => "string literal",
            TokenKind::LangTag(_) => "language tag",
            TokenKind::Integer(_) | TokenKind::Decimal(_) | TokenKind::Double(_) => {
                "numeric literal"
            }
            TokenKind::PrefixDecl => "@prefix",
            TokenKind::BaseDecl => "@base",
            TokenKind::SparqlPrefix => "PREFIX",
            TokenKind::SparqlBase => "BASE",
            TokenKind::Graph => "GRAPH",
            TokenKind::A => "keyword 'a'",
            TokenKind::True | TokenKind::False => "boolean literal",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::Caret2 => "'^^'",
            TokenKind::Eof => "end of input",
        }
    }
}

/// Tokenize a document. The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    loop {
        skip_trivia(&mut input);
        let offset = input.current_token_start();

        if input.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                offset,
            });
            return Ok(tokens);
        }

        match scan_token(&mut input) {
            Ok(kind) => tokens.push(Token { kind, offset }),
            Err(_) => return Err(scan_error(source, offset, &input)),
        }
    }
}

/// Byte offset to 1-indexed (line, column).
pub(crate) fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

fn scan_error(source: &str, offset: usize, input: &Input<'_>) -> TurtleError {
    let bad = input.as_ref().chars().next().unwrap_or('\u{FFFD}');
    let (line, column) = line_col(source, offset);
    let message = match bad {
        '"' | '\'' => "unterminated string literal".to_string(),
        '<' => "malformed IRI reference".to_string(),
        c => format!("unexpected character '{}'", c.escape_default()),
    };
    TurtleError::lex(line, column, message)
}

fn skip_trivia(input: &mut Input<'_>) {
    loop {
        let _: ModalResult<&str> = take_while(0.., is_ws).parse_next(input);
        if input.starts_with('#') {
            let _: ModalResult<&str> =
                take_till(0.., |c| c == '\n' || c == '\r').parse_next(input);
        } else {
            return;
        }
    }
}

fn scan_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        // `^^` before single-char punctuation
        scan_caret2,
        scan_iri_ref,
        // `_:` before bare words
        scan_blank_label,
        // `@prefix`, `@base`, `@lang`
        scan_at_word,
        // `:local` and bare `:`
        scan_default_pname,
        // `p:local` plus a, true, false, PREFIX, BASE, GRAPH
        scan_word,
        scan_string,
        scan_number,
        scan_punctuation,
    ))
    .parse_next(input)
}

// =============================================================================
// IRI references
// =============================================================================

fn scan_iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '<'.parse_next(input)?;
    let body = iri_body(input)?;
    '>'.parse_next(input)?;
    Ok(TokenKind::IriRef(body))
}

fn iri_body(input: &mut Input<'_>) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        out.push_str(chunk);
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            out.push(unicode_escape(input)?);
        } else {
            // empty bodies are fine: `<>` is a relative reference to the base
            return Ok(out);
        }
    }
}

/// `uXXXX` or `UXXXXXXXX`, the leading backslash already consumed.
fn unicode_escape(input: &mut Input<'_>) -> ModalResult<char> {
    let width = match any.parse_next(input)? {
        'u' => 4,
        'U' => 8,
        _ => return Err(ErrMode::Backtrack(ContextError::new())),
    };
    let hex: &str = take_while(width..=width, AsChar::is_hex_digit).parse_next(input)?;
    let code =
        u32::from_str_radix(hex, 16).map_err(|_| ErrMode::Backtrack(ContextError::new()))?;
    char::from_u32(code).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

// =============================================================================
// Names and keywords
// =============================================================================

fn scan_blank_label(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "_:".parse_next(input)?;
    let first: char = any
        .verify(|c: &char| is_pn_chars_u(*c) || c.is_ascii_digit())
        .parse_next(input)?;
    let mut out = String::new();
    out.push(first);
    loop {
        let chunk: &str = take_while(0.., is_pn_chars).parse_next(input)?;
        out.push_str(chunk);
        // a dot stays in the label only when more label characters follow,
        // so `_:b.` scans as the label `b` and a statement terminator
        if input.starts_with('.') && next_after_dot(input).is_some_and(is_pn_chars) {
            '.'.parse_next(input)?;
            out.push('.');
        } else {
            return Ok(TokenKind::BlankLabel(out));
        }
    }
}

fn scan_at_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '@'.parse_next(input)?;
    let tag: &str = (
        take_while(1.., |c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
    )
        .take()
        .parse_next(input)?;
    match tag.to_ascii_lowercase().as_str() {
        "prefix" => Ok(TokenKind::PrefixDecl),
        "base" => Ok(TokenKind::BaseDecl),
        _ => Ok(TokenKind::LangTag(tag.to_string())),
    }
}

fn scan_default_pname(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    ':'.parse_next(input)?;
    let local = opt(pn_local).parse_next(input)?;
    Ok(TokenKind::Pname {
        prefix: String::new(),
        local: local.unwrap_or_default(),
    })
}

/// A bare word is either the prefix half of a prefixed name or one of the
/// grammar keywords; anything else is rejected.
fn scan_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let start = input.checkpoint();

    let first: char = any.parse_next(input)?;
    if !is_pn_chars_base(first) {
        input.reset(&start);
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    let mut word = String::new();
    word.push(first);
    loop {
        let chunk: &str = take_while(0.., is_pn_chars).parse_next(input)?;
        word.push_str(chunk);
        if input.starts_with('.') && next_after_dot(input).is_some_and(is_pn_chars) {
            '.'.parse_next(input)?;
            word.push('.');
        } else {
            break;
        }
    }

    if opt(':').parse_next(input)?.is_some() {
        let local = opt(pn_local).parse_next(input)?;
        return Ok(TokenKind::Pname {
            prefix: word,
            local: local.unwrap_or_default(),
        });
    }

    match word.as_str() {
        "a" => Ok(TokenKind::A),
        "true" => Ok(TokenKind::True),
        "false" => Ok(TokenKind::False),
        w if w.eq_ignore_ascii_case("PREFIX") => Ok(TokenKind::SparqlPrefix),
        w if w.eq_ignore_ascii_case("BASE") => Ok(TokenKind::SparqlBase),
        w if w.eq_ignore_ascii_case("GRAPH") => Ok(TokenKind::Graph),
        _ => {
            input.reset(&start);
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    }
}

/// Local part of a prefixed name, after the colon.
fn pn_local(input: &mut Input<'_>) -> ModalResult<String> {
    let first = input
        .chars()
        .next()
        .ok_or_else(|| ErrMode::Backtrack(ContextError::new()))?;
    if !(is_pn_chars_u(first)
        || first == ':'
        || first.is_ascii_digit()
        || first == '%'
        || first == '\\')
    {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    let mut out = String::new();
    loop {
        let chunk: &str =
            take_while(0.., |c: char| is_pn_chars(c) || c == ':').parse_next(input)?;
        out.push_str(chunk);

        if input.starts_with('%') {
            // percent-encoded byte, kept verbatim
            '%'.parse_next(input)?;
            let hex: &str = take_while(2..=2, AsChar::is_hex_digit).parse_next(input)?;
            out.push('%');
            out.push_str(hex);
        } else if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            let c: char = any.parse_next(input)?;
            if !"_~.-!$&'()*+,;=/?#@%".contains(c) {
                return Err(ErrMode::Backtrack(ContextError::new()));
            }
            out.push(c);
        } else if input.starts_with('.')
            && next_after_dot(input).is_some_and(|c| {
                is_pn_chars(c) || c == ':' || c == '%' || c == '\\'
            })
        {
            '.'.parse_next(input)?;
            out.push('.');
        } else {
            break;
        }
    }

    if out.is_empty() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(out)
}

fn next_after_dot(input: &Input<'_>) -> Option<char> {
    input.as_ref()[1..].chars().next()
}

// =============================================================================
// String literals
// =============================================================================

fn scan_string(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    // long forms first: `"""` must not scan as empty-short plus stray quote
    alt((
        long_string_double,
        long_string_single,
        short_string_double,
        short_string_single,
    ))
    .map(TokenKind::StringLit)
    .parse_next(input)
}

fn short_string_double(input: &mut Input<'_>) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let body = short_body(input, '"')?;
    '"'.parse_next(input)?;
    Ok(body)
}

fn short_string_single(input: &mut Input<'_>) -> ModalResult<String> {
    '\''.parse_next(input)?;
    let body = short_body(input, '\'')?;
    '\''.parse_next(input)?;
    Ok(body)
}

fn long_string_double(input: &mut Input<'_>) -> ModalResult<String> {
    "\"\"\"".parse_next(input)?;
    let body = long_body(input, '"')?;
    "\"\"\"".parse_next(input)?;
    Ok(body)
}

fn long_string_single(input: &mut Input<'_>) -> ModalResult<String> {
    "'''".parse_next(input)?;
    let body = long_body(input, '\'')?;
    "'''".parse_next(input)?;
    Ok(body)
}

fn short_body(input: &mut Input<'_>, quote: char) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str =
            take_while(0.., |c: char| c != quote && c != '\\' && c != '\n' && c != '\r')
                .parse_next(input)?;
        out.push_str(chunk);
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            out.push(string_escape(input)?);
        } else {
            // closing quote, or an unterminated literal the caller rejects
            return Ok(out);
        }
    }
}

fn long_body(input: &mut Input<'_>, quote: char) -> ModalResult<String> {
    let delim = if quote == '"' { "\"\"\"" } else { "'''" };
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| c != quote && c != '\\').parse_next(input)?;
        out.push_str(chunk);
        if input.is_empty() || input.starts_with(delim) {
            return Ok(out);
        }
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            out.push(string_escape(input)?);
        } else {
            // lone quote inside a long string
            let c: char = any.parse_next(input)?;
            out.push(c);
        }
    }
}

/// One string escape, the leading backslash already consumed.
fn string_escape(input: &mut Input<'_>) -> ModalResult<char> {
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
            let hex: &str = take_while(width..=width, AsChar::is_hex_digit).parse_next(input)?;
            let code = u32::from_str_radix(hex, 16)
                .map_err(|_| ErrMode::Backtrack(ContextError::new()))?;
            char::from_u32(code).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
        }
        _ => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

// =============================================================================
// Numeric literals
// =============================================================================

fn scan_number(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((double_lexical, decimal_lexical, integer_lexical)).parse_next(input)
}

fn double_lexical(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    (
        opt(one_of(['+', '-'])),
        alt(((digit1, '.', opt(digit1)).take(), ('.', digit1).take(), digit1)),
        one_of(['e', 'E']),
        opt(one_of(['+', '-'])),
        digit1,
    )
        .take()
        .map(|s: &str| TokenKind::Double(s.to_string()))
        .parse_next(input)
}

fn decimal_lexical(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let lexical: &str = (
        opt(one_of(['+', '-'])),
        alt(((digit1, '.', digit1).take(), ('.', digit1).take())),
    )
        .take()
        .parse_next(input)?;
    if peek(opt(one_of(['e', 'E']))).parse_next(input)?.is_some() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(TokenKind::Decimal(lexical.to_string()))
}

fn integer_lexical(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let lexical: &str = (opt(one_of(['+', '-'])), digit1).take().parse_next(input)?;
    if peek(opt(one_of(['e', 'E']))).parse_next(input)?.is_some() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    // `1.5` belongs to the decimal branch; `1.` is an integer then a terminator
    if input.starts_with('.') && next_after_dot(input).is_some_and(|c| c.is_ascii_digit()) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(TokenKind::Integer(lexical.to_string()))
}

// =============================================================================
// Punctuation
// =============================================================================

fn scan_caret2(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "^^".map(|_| TokenKind::Caret2).parse_next(input)
}

fn scan_punctuation(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    any.verify_map(|c| match c {
        '.' => Some(TokenKind::Dot),
        ';' => Some(TokenKind::Semicolon),
        ',' => Some(TokenKind::Comma),
        '[' => Some(TokenKind::OpenBracket),
        ']' => Some(TokenKind::CloseBracket),
        '(' => Some(TokenKind::OpenParen),
        ')' => Some(TokenKind::CloseParen),
        '{' => Some(TokenKind::OpenBrace),
        '}' => Some(TokenKind::CloseBrace),
        _ => None,
    })
    .parse_next(input)
}

// =============================================================================
// Character classes (Turtle production names)
// =============================================================================

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
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

fn is_iri_char(c: char) -> bool {
    !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') && c > '\u{20}'
}
