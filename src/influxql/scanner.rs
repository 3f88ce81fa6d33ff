//! Space-delimited InfluxQL tokenizer
//!
//! Splits a statement into the coarse units the router cares about: quoted
//! literals, parenthesized groups, `[...]` and `{...}` literals, runs of dots
//! and bare runs of non-space characters. This is deliberately much looser than
//! a real InfluxQL lexer; operators and punctuation inside a bare run are not
//! split out.

use tracing::warn;

use crate::error::InfluxQlError;
use crate::util::{is_quote, trim_query};

/// Scan a quoted literal that opens at `data[start]`.
///
/// Returns the offset one past the closing quote together with the unescaped
/// literal, quotes included. `\"`, `\'` and `\\` collapse to the escaped
/// character; any other escape is rejected.
pub fn find_end_with_quote(data: &str, start: usize) -> Result<(usize, String), InfluxQlError> {
    let bytes = data.as_bytes();
    let Some(&quote) = bytes.get(start) else {
        return Err(InfluxQlError::UnmatchedQuote);
    };
    let mut unquoted = Vec::with_capacity(bytes.len() - start);
    unquoted.push(quote);

    let mut end = start + 1;
    while end < bytes.len() {
        match bytes[end] {
            b if b == quote => {
                unquoted.push(b);
                return Ok((end + 1, String::from_utf8_lossy(&unquoted).into_owned()));
            }
            b'\\' => match bytes.get(end + 1) {
                None => return Err(InfluxQlError::UnmatchedQuote),
                Some(&next) if next == quote || next == b'\\' => {
                    end += 1;
                    unquoted.push(next);
                }
                Some(_) => return Err(InfluxQlError::WrongBackslash),
            },
            b => unquoted.push(b),
        }
        end += 1;
    }

    Err(InfluxQlError::UnmatchedQuote)
}

/// Scan the next token from `data`.
///
/// `data` is the complete remainder of the statement. Returns `Ok(None)` once
/// only spaces remain, otherwise the number of bytes consumed (leading spaces
/// included) and the token.
pub fn scan_token(data: &str) -> Result<Option<(usize, String)>, InfluxQlError> {
    let bytes = data.as_bytes();
    let start = match bytes.iter().position(|&b| b != b' ') {
        Some(start) => start,
        None => return Ok(None),
    };

    let advance = match bytes[start] {
        b if is_quote(b) => return find_end_with_quote(data, start).map(Some),
        b'(' => {
            let mut depth = 0usize;
            let mut end = None;
            for (i, &b) in bytes.iter().enumerate().skip(start) {
                match b {
                    b'(' => depth += 1,
                    b')' => depth -= 1,
                    _ => {}
                }
                if depth == 0 {
                    end = Some(i + 1);
                    break;
                }
            }
            end.ok_or(InfluxQlError::UnclosedParenthesis)?
        }
        open @ (b'[' | b'{') => {
            let close = if open == b'[' { b']' } else { b'}' };
            let offset = bytes[start..]
                .iter()
                .position(|&b| b == close)
                .ok_or(InfluxQlError::UnclosedParenthesis)?;
            start + offset + 1
        }
        b'.' => {
            let run = bytes[start..].iter().take_while(|&&b| b == b'.').count();
            start + run
        }
        _ => bytes[start..]
            .iter()
            .position(|&b| b == b' ')
            .map_or(bytes.len(), |offset| start + offset),
    };

    Ok(Some((advance, data[start..advance].to_string())))
}

/// Iterator over the tokens of a statement.
///
/// Yields `Err` at most once; iteration ends after the first error.
pub struct Scanner<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `query` after trimming surrounding whitespace and
    /// trailing semicolons.
    pub fn new(query: &'a str) -> Self {
        Self {
            rest: trim_query(query),
            done: false,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<String, InfluxQlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match scan_token(self.rest) {
            Ok(Some((advance, token))) => {
                self.rest = &self.rest[advance..];
                Some(Ok(token))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenize `query`, stopping after `limit` tokens when `limit > 0`.
///
/// A scan error is logged and ends tokenization; the tokens gathered so far are
/// returned. Callers must not route on a truncated sequence.
pub fn scan_tokens(query: &str, limit: usize) -> Vec<String> {
    let mut tokens = Vec::new();
    for item in Scanner::new(query) {
        match item {
            Ok(token) => tokens.push(token),
            Err(err) => {
                warn!(error = %err, query, "scan token error");
                break;
            }
        }
        if limit > 0 && tokens.len() == limit {
            break;
        }
    }
    tokens
}

/// Tokenize all of `query`, failing on the first scan error.
pub fn try_scan_tokens(query: &str) -> Result<Vec<String>, InfluxQlError> {
    Scanner::new(query).collect()
}
