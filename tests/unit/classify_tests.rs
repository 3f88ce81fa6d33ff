//! Statement classification tests

use influxql_route::influxql::{
    classify, is_delete_or_drop_measurement, is_select_or_show, is_show_databases,
    is_support_command, scan_tokens,
};

fn flags(q: &str) -> (bool, bool) {
    let c = classify(q);
    (c.supported, c.needs_target)
}

#[test]
fn test_show_databases() {
    assert_eq!(flags("SHOW DATABASES"), (true, false));
}

#[test]
fn test_delete_from() {
    assert_eq!(flags("DELETE FROM cpu"), (true, true));
    assert_eq!(flags("delete from cpu where time < now()"), (true, true));
}

#[test]
fn test_drop_measurement() {
    assert_eq!(flags("DROP MEASUREMENT cpu"), (true, true));
}

#[test]
fn test_select_into_is_unsupported() {
    assert_eq!(flags("SELECT * INTO other FROM cpu"), (false, false));
}

#[test]
fn test_select_from() {
    assert_eq!(flags("SELECT mean(value) FROM cpu GROUP BY time(5m)"), (true, true));
}

#[test]
fn test_select_from_then_into_is_supported() {
    // the first of INTO/FROM decides
    assert_eq!(flags("SELECT * FROM cpu INTO x"), (true, true));
}

#[test]
fn test_show_without_from_uses_head_phrase() {
    assert_eq!(flags("SHOW MEASUREMENTS"), (true, false));
    assert_eq!(flags("SHOW TAG KEYS"), (true, false));
    assert_eq!(flags("SHOW FIELD KEYS ON mydb"), (true, false));
}

#[test]
fn test_show_with_from_needs_target() {
    assert_eq!(flags("SHOW TAG KEYS FROM cpu"), (true, true));
    assert_eq!(flags("SHOW MEASUREMENTS ON db FROM cpu"), (true, true));
}

#[test]
fn test_show_unknown_kind() {
    assert_eq!(flags("SHOW RETENTION POLICIES"), (false, false));
    assert_eq!(flags("SHOW SERIES FROM cpu"), (false, true));
}

#[test]
fn test_unsupported_statements() {
    assert_eq!(flags("CREATE DATABASE foo"), (false, false));
    assert_eq!(flags("DROP SERIES FROM cpu"), (false, false));
}

#[test]
fn test_empty_and_blank() {
    for q in ["", "   ", ";"] {
        let c = classify(q);
        assert!(c.tokens.is_empty());
        assert!(!c.supported);
        assert!(!c.needs_target);
    }
}

#[test]
fn test_support_set_membership() {
    assert!(is_support_command("show tag values"));
    assert!(!is_support_command("SHOW TAG VALUES"));
    assert!(!is_support_command("show series"));
}

#[test]
fn test_narrow_classifiers() {
    assert!(is_show_databases(&scan_tokens("show databases", 0)));
    assert!(is_select_or_show(&scan_tokens("Show measurements", 0)));
    assert!(is_delete_or_drop_measurement(&scan_tokens("DROP MEASUREMENT cpu", 0)));
    assert!(!is_delete_or_drop_measurement(&scan_tokens("DROP MEASUREMENT", 0)));
}
