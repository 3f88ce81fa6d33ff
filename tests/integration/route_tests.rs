//! End-to-end routing through the library facade

use std::fs;

use influxql_route::{route_file, route_queries, route_query, RouteOptions, Target};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn options() -> RouteOptions {
    RouteOptions {
        default_database: "telegraf".to_string(),
        default_retention_policy: "autogen".to_string(),
    }
}

fn target(db: &str, rp: &str, m: &str) -> Option<Target> {
    Some(Target {
        database: db.to_string(),
        retention_policy: rp.to_string(),
        measurement: m.to_string(),
    })
}

#[test]
fn test_route_fully_qualified() {
    let route = route_query(r#"SELECT * FROM "mydb"."rp1"."cpu""#, &options()).unwrap();
    assert!(route.supported);
    assert!(route.needs_target);
    assert_eq!(route.target, target("mydb", "rp1", "cpu"));
}

#[test]
fn test_route_applies_defaults() {
    let route = route_query("SELECT * FROM cpu", &options()).unwrap();
    assert_eq!(route.target, target("telegraf", "autogen", "cpu"));

    let route = route_query("SELECT * FROM mydb..cpu", &options()).unwrap();
    assert_eq!(route.target, target("mydb", "autogen", "cpu"));
}

#[test]
fn test_route_multibyte_before_quoted_tail() {
    let route = route_query("DELETE FROM db.rp€\"cpu\"", &options()).unwrap();
    assert_eq!(route.target, target("db", "rp", "cpu"));

    let route = route_query("SELECT * FROM db.é\"cpu\"", &options()).unwrap();
    assert_eq!(route.target, target("db", "autogen", "cpu"));
}

#[test]
fn test_route_without_target() {
    let route = route_query("SHOW DATABASES", &options()).unwrap();
    assert!(route.supported);
    assert!(!route.needs_target);
    assert_eq!(route.target, None);
    assert_eq!(route.tokens, vec!["SHOW", "DATABASES"]);
}

#[test]
fn test_route_extraction_failure_is_error() {
    let result = route_query("SELECT * FROM", &options());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("illegal InfluxQL"));
}

#[test]
fn test_route_scan_error_is_not_routable() {
    let route = route_query("SELECT * FROM \"cpu", &options()).unwrap();
    assert!(!route.supported);
    assert!(!route.needs_target);
    assert_eq!(route.target, None);
}

#[test]
fn test_route_queries_preserves_order() {
    let queries: Vec<String> = (0..64).map(|i| format!("SELECT * FROM db.rp.m{}", i)).collect();
    let routes = route_queries(&queries, &options());
    assert_eq!(routes.len(), 64);
    for (i, route) in routes.into_iter().enumerate() {
        let route = route.unwrap();
        assert_eq!(route.target, target("db", "rp", &format!("m{}", i)));
    }
}

#[test]
fn test_route_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queries.txt");
    fs::write(
        &path,
        "\u{FEFF}-- dashboard queries\nSELECT * FROM cpu;\n\n# admin\nSHOW DATABASES\nDROP MEASUREMENT \"mem\"\n",
    )
    .unwrap();

    let results = route_file(&path, &options()).unwrap();
    let queries: Vec<&str> = results.iter().map(|(q, _)| q.as_str()).collect();
    assert_eq!(
        queries,
        vec!["SELECT * FROM cpu;", "SHOW DATABASES", "DROP MEASUREMENT \"mem\""]
    );

    let routes: Vec<_> = results.into_iter().map(|(_, r)| r.unwrap()).collect();
    assert_eq!(routes[0].target, target("telegraf", "autogen", "cpu"));
    assert_eq!(routes[1].target, None);
    assert_eq!(routes[2].target, target("telegraf", "autogen", "mem"));
}

#[test]
fn test_route_file_windows_1252() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.txt");
    // 0xB0 is the degree sign in Windows-1252 and invalid on its own in UTF-8
    fs::write(&path, b"SELECT * FROM \"temp\xB0\"\n").unwrap();

    let results = route_file(&path, &options()).unwrap();
    let route = results[0].1.as_ref().unwrap();
    assert_eq!(route.target, target("telegraf", "autogen", "temp\u{B0}"));
}

#[test]
fn test_route_file_missing() {
    let dir = TempDir::new().unwrap();
    let err = route_file(&dir.path().join("nope.txt"), &options()).unwrap_err();
    assert!(err.to_string().contains("Failed to read query file"));
}
