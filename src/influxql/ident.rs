//! Database, retention policy and measurement extraction.
//!
//! Every extractor searches the token sequence for an anchor keyword (`from`,
//! `on`, `database`, `measurement`) and derives the identifier from the tokens
//! that follow it. Names may be written as `db.rp.measurement`,
//! `rp.measurement`, `db..measurement` or a bare `measurement`, and any segment
//! may be quoted. Quoted segments are split into separate tokens by the scanner
//! (`"db"."rp"."cpu"` scans as five tokens) while bare ones stay together.
//!
//! An empty result means "not given in the statement, use the default". A
//! parenthesized `SELECT` in place of a name is a subquery and extraction is
//! re-run on its inner text.

use tracing::debug;

use super::scanner::scan_tokens;
use crate::error::InfluxQlError;
use crate::util::{is_quote, is_quoted, starts_with_ci, strip_quotes};

const DATABASE_KEYWORDS: &[&str] = &["on", "database", "from"];
const RETENTION_POLICY_KEYWORDS: &[&str] = &["from"];
const MEASUREMENT_KEYWORDS: &[&str] = &["from", "measurement"];

/// Tokenize `query` and extract its database.
pub fn database_from_query(query: &str) -> Result<String, InfluxQlError> {
    database_from_tokens(&scan_tokens(query, 0))
}

/// Tokenize `query` and extract its retention policy.
pub fn retention_policy_from_query(query: &str) -> Result<String, InfluxQlError> {
    retention_policy_from_tokens(&scan_tokens(query, 0))
}

/// Tokenize `query` and extract its measurement.
pub fn measurement_from_query(query: &str) -> Result<String, InfluxQlError> {
    measurement_from_tokens(&scan_tokens(query, 0))
}

/// Extract the database named after `on`, `database` or `from`.
pub fn database_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<String, InfluxQlError> {
    let m = identifier_from_tokens(tokens, DATABASE_KEYWORDS, database_after)?;
    match subquery(&m) {
        Some(inner) => database_from_query(inner),
        None => Ok(m),
    }
}

/// Extract the retention policy named after `from`.
pub fn retention_policy_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<String, InfluxQlError> {
    let m = identifier_from_tokens(tokens, RETENTION_POLICY_KEYWORDS, retention_policy_after)?;
    match subquery(&m) {
        Some(inner) => retention_policy_from_query(inner),
        None => Ok(m),
    }
}

/// Extract the measurement named after `from` or `measurement`.
///
/// A regex measurement (`/cpu.*/`) is returned as written.
pub fn measurement_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<String, InfluxQlError> {
    let m = identifier_from_tokens(tokens, MEASUREMENT_KEYWORDS, measurement_after)?;
    match subquery(&m) {
        Some(inner) => measurement_from_query(inner),
        None => Ok(m),
    }
}

/// Find the first anchor keyword that has at least one token after it and
/// derive an identifier from the tokens following it.
pub fn identifier_from_tokens<S, F>(
    tokens: &[S],
    keywords: &[&str],
    derive: F,
) -> Result<String, InfluxQlError>
where
    S: AsRef<str>,
    F: Fn(&[&str], &str) -> String,
{
    for (i, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        let Some(keyword) = keywords.iter().find(|kw| token.eq_ignore_ascii_case(kw)) else {
            continue;
        };
        if i + 1 < tokens.len() {
            let rest: Vec<&str> = tokens[i + 1..].iter().map(|t| t.as_ref()).collect();
            let m = derive(&rest, keyword);
            debug!(keyword, identifier = %m, "identifier extracted");
            return Ok(m);
        }
    }
    Err(InfluxQlError::IllegalQuery)
}

/// Inner statement text when `m` is a parenthesized `SELECT`.
fn subquery(m: &str) -> Option<&str> {
    let inner = m.strip_prefix('(')?;
    if !starts_with_ci(inner.trim_start_matches(['(', ' ']), "select") {
        return None;
    }
    Some(inner.strip_suffix(')').unwrap_or(inner))
}

fn database_after(tokens: &[&str], keyword: &str) -> String {
    let m = tokens[0];
    if m.starts_with('(') {
        return m.to_string();
    }

    if is_quoted(m) {
        // `FROM "cpu"` names a measurement, not a database
        if keyword == "from" && (tokens.len() < 3 || !matches!(tokens[1], "." | "..")) {
            return String::new();
        }
        return strip_quotes(m).to_string();
    }

    match m.find('.') {
        None if keyword == "from" => String::new(),
        None => m.to_string(),
        Some(index) if index == m.len() - 1 => String::new(),
        Some(index) => m[..index].to_string(),
    }
}

fn retention_policy_after(tokens: &[&str], _keyword: &str) -> String {
    if tokens.len() >= 3 && tokens[1] == ".." {
        return String::new();
    }

    let joined;
    let m = if tokens.len() >= 5 && tokens[1] == "." && tokens[3] == "." {
        return strip_quotes(tokens[2]).to_string();
    } else if tokens.len() >= 3 && tokens[1] == "." {
        // a quoted segment containing a dot was split off by the scanner
        joined = tokens[..3].concat();
        joined.as_str()
    } else {
        tokens[0]
    };

    if m.starts_with('(') {
        return m.to_string();
    }
    if m.starts_with('/') {
        return String::new();
    }

    let Some(index) = m.find('.') else {
        return String::new();
    };
    if index == m.len() - 1 {
        return String::new();
    }
    let Some(boundary) = last_ident_boundary(m) else {
        return String::new();
    };

    let rp = if index == boundary {
        &m[..index]
    } else if index + 1 < boundary {
        &m[index + 1..boundary]
    } else {
        return String::new();
    };
    strip_quotes(rp).to_string()
}

fn measurement_after(tokens: &[&str], _keyword: &str) -> String {
    let m = if tokens.len() >= 3 && matches!(tokens[1], "." | "..") {
        if tokens.len() >= 5 && tokens[3] == "." {
            tokens[4]
        } else {
            tokens[2]
        }
    } else {
        tokens[0]
    };

    if m.starts_with('(') || m.starts_with('/') {
        return m.to_string();
    }
    if is_quoted(m) {
        return unescape_quotes(strip_quotes(m));
    }

    let Some(boundary) = last_ident_boundary(m) else {
        return m.to_string();
    };
    let tail = after_boundary(m, boundary);
    if is_quoted(tail) {
        unescape_quotes(strip_quotes(tail))
    } else {
        tail.to_string()
    }
}

/// Text following the separator character that starts at `boundary`.
fn after_boundary(m: &str, boundary: usize) -> &str {
    let sep_len = m[boundary..].chars().next().map_or(0, char::len_utf8);
    &m[boundary + sep_len..]
}

fn unescape_quotes(s: &str) -> String {
    s.replace("\\\"", "\"")
}

/// Index separating the trailing name component of a dotted identifier from
/// its qualifying prefix.
///
/// For a quote-terminated identifier this is the start of the character just
/// before the opening quote of the final segment; a quote preceded by a
/// backslash does not open the segment. Otherwise it is the index of the last
/// `.`. The result is always a char boundary of `m`.
pub fn last_ident_boundary(m: &str) -> Option<usize> {
    let bytes = m.as_bytes();
    let last = *bytes.last()?;
    if !is_quote(last) {
        return m.rfind('.');
    }

    let mut i = bytes.len() - 1;
    let mut escaped = false;
    while i > 0 {
        i -= 1;
        if escaped {
            escaped = false;
            continue;
        }
        if is_quote(bytes[i]) {
            if i > 0 && bytes[i - 1] == b'\\' {
                escaped = true;
            } else {
                return m[..i].char_indices().next_back().map(|(j, _)| j);
            }
        }
    }
    None
}
