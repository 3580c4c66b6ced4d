//! Compact-IRI and base-IRI helpers shared by context parsing and expansion.

/// Split a compact IRI like `schema:name` into `(prefix, suffix)`.
///
/// Returns `None` for values that cannot be compact IRIs: no colon, a
/// prefix containing `/`, or a suffix starting with `//` (which marks an
/// absolute IRI such as `http://...`).
pub fn split_compact(s: &str) -> Option<(&str, &str)> {
    let colon = s.find(':')?;
    let (prefix, suffix) = (&s[..colon], &s[colon + 1..]);
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// Whether the value contains a colon, i.e. already looks like an IRI or a
/// compact IRI and must not be completed against `@vocab`/`@base`.
pub fn looks_like_iri(s: &str) -> bool {
    s.contains(':')
}

/// Whether the IRI carries an RFC 3986 scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`).
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon) => {
            let scheme = &iri[..colon];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Ensure a namespace IRI ends with `/` or `#` so term names concatenate
/// cleanly onto it.
pub fn with_ns_separator(iri: &str) -> String {
    if iri.ends_with('/') || iri.ends_with('#') {
        iri.to_string()
    } else {
        format!("{}/", iri)
    }
}

/// Complete a relative reference against a base IRI.
///
/// Fragments append to the base, absolute references pass through, and
/// anything else concatenates onto the base with a `/` separator.
pub fn resolve(base: &str, reference: &str) -> String {
    if reference.starts_with('#') {
        format!("{}{}", base.trim_end_matches('/'), reference)
    } else if is_absolute(reference) {
        reference.to_string()
    } else {
        format!("{}{}", with_ns_separator(base), reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_compact() {
        assert_eq!(split_compact("schema:name"), Some(("schema", "name")));
        assert_eq!(split_compact("ex:Person"), Some(("ex", "Person")));
        assert_eq!(split_compact("http://example.org/"), None);
        assert_eq!(split_compact("noColon"), None);
        assert_eq!(split_compact(":bare"), None);
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("http://example.org"));
        assert!(is_absolute("urn:isbn:0451450523"));
        assert!(is_absolute("file:///path/to/file"));
        // Compact IRIs carry scheme-shaped prefixes; split_compact is what
        // tells them apart.
        assert!(is_absolute("schema:name"));
        assert!(!is_absolute("localName"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve("http://example.org/", "name"),
            "http://example.org/name"
        );
        assert_eq!(
            resolve("http://example.org", "name"),
            "http://example.org/name"
        );
        assert_eq!(
            resolve("http://example.org/", "#frag"),
            "http://example.org#frag"
        );
        assert_eq!(
            resolve("http://example.org/", "https://other.net/x"),
            "https://other.net/x"
        );
    }
}
