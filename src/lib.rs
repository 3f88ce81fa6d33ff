//! influxql-route: InfluxQL statement introspection for sharding proxies
//!
//! This library tokenizes InfluxQL statements, decides whether a proxy can
//! route them, and extracts the database, retention policy and measurement
//! that select the backend.

pub mod error;
pub mod influxql;
pub mod util;

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use rayon::prelude::*;
use tracing::debug;

pub use error::InfluxQlError;

/// Defaults applied when a statement does not name its target explicitly
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Database used when the statement does not qualify its measurement
    pub default_database: String,
    /// Retention policy used when none is given (or `db..measurement` is used)
    pub default_retention_policy: String,
}

/// Backend lookup key extracted from a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub database: String,
    pub retention_policy: String,
    pub measurement: String,
}

/// Routing decision for one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub tokens: Vec<String>,
    pub supported: bool,
    pub needs_target: bool,
    /// Present only when `needs_target` is set
    pub target: Option<Target>,
}

/// Classify a statement and, when it needs one, extract its routing target
pub fn route_query(query: &str, options: &RouteOptions) -> Result<Route> {
    let influxql::Classification {
        tokens,
        supported,
        needs_target,
    } = influxql::classify(query);

    let target = if needs_target {
        let measurement = influxql::measurement_from_tokens(&tokens)?;
        let database = named_or_default(
            influxql::database_from_tokens(&tokens),
            &options.default_database,
        )?;
        let retention_policy = named_or_default(
            influxql::retention_policy_from_tokens(&tokens),
            &options.default_retention_policy,
        )?;
        Some(Target {
            database,
            retention_policy,
            measurement,
        })
    } else {
        None
    };

    debug!(query, ?target, "statement routed");

    Ok(Route {
        tokens,
        supported,
        needs_target,
        target,
    })
}

/// An empty name or a missing anchor (`DROP MEASUREMENT cpu` names no
/// database) both resolve to the default.
fn named_or_default(
    extracted: Result<String, InfluxQlError>,
    default: &str,
) -> Result<String, InfluxQlError> {
    match extracted {
        Ok(name) if !name.is_empty() => Ok(name),
        Ok(_) | Err(InfluxQlError::IllegalQuery) => Ok(default.to_string()),
        Err(err) => Err(err),
    }
}

/// Route a batch of statements in parallel, preserving input order
pub fn route_queries(queries: &[String], options: &RouteOptions) -> Vec<Result<Route>> {
    queries
        .par_iter()
        .map(|q| route_query(q, options))
        .collect()
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Load statements from a query file: one per line, blank lines and lines
/// starting with `--` or `#` skipped
pub fn read_queries(path: &Path) -> Result<Vec<String>> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|source| InfluxQlError::QueryFileRead {
            path: PathBuf::from(path),
            source,
        })?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--") && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Route every statement in a query file
pub fn route_file(path: &Path, options: &RouteOptions) -> Result<Vec<(String, Result<Route>)>> {
    let queries = read_queries(path)?;
    debug!(path = %path.display(), count = queries.len(), "routing query file");
    let routes = route_queries(&queries, options);
    Ok(queries.into_iter().zip(routes).collect())
}
