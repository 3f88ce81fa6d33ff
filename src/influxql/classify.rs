//! Statement classification for routing decisions.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::scanner::Scanner;

/// Statement heads the proxy knows how to route.
static SUPPORT_COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "show measurements",
        "show field keys",
        "show tag keys",
        "show tag values",
        "show databases",
        "delete from",
        "drop measurement",
    ]
    .into_iter()
    .collect()
});

/// Result of classifying a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tokens: Vec<String>,
    /// The proxy recognizes and can route this statement.
    pub supported: bool,
    /// The router must extract database/measurement to pick a backend.
    pub needs_target: bool,
}

/// True if `phrase` (lowercase, single-spaced) is a routable statement head.
pub fn is_support_command(phrase: &str) -> bool {
    SUPPORT_COMMANDS.contains(phrase)
}

/// Lowercase the first `n` tokens joined by single spaces.
///
/// `n == 0` or `n > tokens.len()` joins every token.
pub fn head_statement<S: AsRef<str>>(tokens: &[S], n: usize) -> String {
    let n = if n == 0 || n > tokens.len() { tokens.len() } else { n };
    tokens[..n]
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tokenize and classify `query`.
///
/// A statement that fails to tokenize is never routable; the tokens scanned
/// before the error are still returned.
pub fn classify(query: &str) -> Classification {
    let mut tokens = Vec::new();
    for item in Scanner::new(query) {
        match item {
            Ok(token) => tokens.push(token),
            Err(err) => {
                warn!(error = %err, query, "scan token error");
                return Classification {
                    tokens,
                    supported: false,
                    needs_target: false,
                };
            }
        }
    }

    let (supported, needs_target) = classify_tokens(&tokens);
    debug!(query, supported, needs_target, "statement classified");
    Classification {
        tokens,
        supported,
        needs_target,
    }
}

/// Classify an already tokenized statement, returning `(supported, needs_target)`.
pub fn classify_tokens<S: AsRef<str>>(tokens: &[S]) -> (bool, bool) {
    let Some(first) = tokens.first() else {
        return (false, false);
    };
    let first = first.as_ref();

    if first.eq_ignore_ascii_case("select") {
        for token in tokens.iter().skip(2) {
            let token = token.as_ref();
            if token.eq_ignore_ascii_case("into") {
                return (false, false);
            }
            if token.eq_ignore_ascii_case("from") {
                return (true, true);
            }
        }
        return (false, false);
    }

    if first.eq_ignore_ascii_case("show") {
        if let Some(i) = tokens
            .iter()
            .enumerate()
            .skip(2)
            .find_map(|(i, t)| t.as_ref().eq_ignore_ascii_case("from").then_some(i))
        {
            // allow one qualifier word between the head and FROM
            let supported = is_support_command(&head_statement(tokens, i))
                || is_support_command(&head_statement(tokens, i - 2));
            return (supported, true);
        }
    }

    let stmt2 = head_statement(tokens, 2);
    if is_support_command(&stmt2) {
        return (true, stmt2 == "delete from" || stmt2 == "drop measurement");
    }
    if is_support_command(&head_statement(tokens, 3)) {
        return (true, false);
    }
    (false, false)
}

/// True for exactly `SHOW DATABASES`.
pub fn is_show_databases<S: AsRef<str>>(tokens: &[S]) -> bool {
    head_statement(tokens, 2) == "show databases"
}

/// True when the statement starts with `SELECT` or `SHOW`.
pub fn is_select_or_show<S: AsRef<str>>(tokens: &[S]) -> bool {
    tokens.first().is_some_and(|t| {
        let t = t.as_ref();
        t.eq_ignore_ascii_case("select") || t.eq_ignore_ascii_case("show")
    })
}

/// True for `DELETE FROM ...` and `DROP MEASUREMENT ...` with an argument.
pub fn is_delete_or_drop_measurement<S: AsRef<str>>(tokens: &[S]) -> bool {
    if tokens.len() < 3 {
        return false;
    }
    let stmt = head_statement(tokens, 2);
    stmt == "delete from" || stmt == "drop measurement"
}
