//! Shared utility helpers.

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// True for the two InfluxQL quote characters.
#[inline]
pub fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// True when the first byte of `s` is a quote character.
#[inline]
pub fn is_quoted(s: &str) -> bool {
    s.as_bytes().first().copied().is_some_and(is_quote)
}

/// Remove the first and last character of a quoted name component.
///
/// Inputs that are not wrapped in quote characters come back unchanged.
pub fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && is_quote(bytes[0]) && is_quote(bytes[bytes.len() - 1]) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Trim surrounding whitespace, then any trailing run of `;` and spaces.
pub fn trim_query(q: &str) -> &str {
    q.trim().trim_end_matches([';', ' '])
}
