//! Identifier quoting and validation.

use std::sync::OnceLock;

use regex::Regex;

/// Pattern accepted for table and column names at declaration time.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$.]*$";

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant.
    RE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).unwrap())
}

/// Quote an identifier with double quotes (SQLite, PostgreSQL).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote an identifier with backticks (MySQL).
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Whether `name` is usable as a table or column name.
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}
