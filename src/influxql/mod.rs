//! InfluxQL tokenizing and statement introspection

mod classify;
mod ident;
mod scanner;

pub use classify::{
    classify, classify_tokens, head_statement, is_delete_or_drop_measurement, is_select_or_show,
    is_show_databases, is_support_command, Classification,
};
pub use ident::{
    database_from_query, database_from_tokens, identifier_from_tokens, last_ident_boundary,
    measurement_from_query, measurement_from_tokens, retention_policy_from_query,
    retention_policy_from_tokens,
};
pub use scanner::{find_end_with_quote, scan_token, scan_tokens, try_scan_tokens, Scanner};
