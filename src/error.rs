//! Error types for influxql-route

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while tokenizing or inspecting an InfluxQL statement
#[derive(Error, Debug)]
pub enum InfluxQlError {
    /// A backslash inside a quoted literal escapes something other than the
    /// closing quote or another backslash.
    #[error("wrong backslash")]
    WrongBackslash,

    #[error("unmatched quote")]
    UnmatchedQuote,

    /// A `(`, `[` or `{` group never closes.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// No anchor keyword was found for the requested identifier.
    #[error("illegal InfluxQL")]
    IllegalQuery,

    #[error("Failed to read query file: {path}")]
    QueryFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PartialEq for InfluxQlError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::QueryFileRead { path: a, .. }, Self::QueryFileRead { path: b, .. }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}
