//! MySQL identifier quoting and raw SQL expressions.
//!
//! A name is left as-is when it is qualified (`t.column`), already
//! backtick-quoted, or purely numeric (so `SELECT 1` stays legal); anything
//! else is wrapped in backticks. [`Expr`] carries pre-rendered SQL fragments
//! through the condition/field mini-language without re-escaping.

use serde_json::Value;
use std::fmt;

/// Quote a field or table name for MySQL.
///
/// Qualified names, backtick-prefixed names and numeric literals pass
/// through untouched; everything else is backtick-wrapped.
pub fn quote_key(name: &str) -> String {
    if name.contains('.')
        || name.starts_with('`')
        || (!name.is_empty() && name.chars().all(|c| c.is_ascii_digit()))
    {
        name.to_string()
    } else {
        format!("`{name}`")
    }
}

/// Prepare a key for rendering.
///
/// Raw-expression markers are stripped to literal text (for keys like
/// `UNIX_TIMESTAMP(\`date\`)`); ordinary names go through [`quote_key`].
pub fn prepare_key(name: &str) -> String {
    match Expr::unwrap_str(name) {
        Some(raw) => raw.to_string(),
        None => quote_key(name),
    }
}

/// A pre-rendered SQL fragment.
///
/// Raw expressions bypass escaping and quoting entirely. This is an
/// intentional trust boundary: whoever constructs an `Expr` is responsible
/// for its safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(String);

impl Expr {
    /// Marker prefix identifying a raw expression when it travels through
    /// the JSON mini-language as a string.
    pub const KEY: &'static str = "\u{1}~";

    /// Create a raw expression from literal SQL text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The literal SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render this expression into a marker-carrying JSON string, suitable
    /// for embedding in condition trees and field specifications.
    pub fn to_value(&self) -> Value {
        Value::String(format!("{}{}", Self::KEY, self.0))
    }

    /// Strip the raw-expression marker from a string, if present.
    pub fn unwrap_str(s: &str) -> Option<&str> {
        s.strip_prefix(Self::KEY)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_backticked() {
        assert_eq!(quote_key("users"), "`users`");
    }

    #[test]
    fn qualified_name_passes_through() {
        assert_eq!(quote_key("u.id"), "u.id");
    }

    #[test]
    fn prequoted_name_passes_through() {
        assert_eq!(quote_key("`weird name`"), "`weird name`");
    }

    #[test]
    fn numeric_name_passes_through() {
        // select 1
        assert_eq!(quote_key("1"), "1");
        assert_eq!(quote_key("42"), "42");
    }

    #[test]
    fn empty_name_is_backticked() {
        assert_eq!(quote_key(""), "``");
    }

    #[test]
    fn prepare_key_strips_expr_marker() {
        let e = Expr::new("UNIX_TIMESTAMP(`date`)");
        let Value::String(s) = e.to_value() else {
            panic!("expected string value");
        };
        assert_eq!(prepare_key(&s), "UNIX_TIMESTAMP(`date`)");
    }

    #[test]
    fn prepare_key_quotes_plain_names() {
        assert_eq!(prepare_key("name"), "`name`");
        assert_eq!(prepare_key("t.name"), "t.name");
    }

    #[test]
    fn expr_roundtrip() {
        let e = Expr::new("NOW()");
        assert_eq!(e.as_str(), "NOW()");
        assert_eq!(e.to_string(), "NOW()");
        let Value::String(s) = e.to_value() else {
            panic!("expected string value");
        };
        assert_eq!(Expr::unwrap_str(&s), Some("NOW()"));
        assert_eq!(Expr::unwrap_str("NOW()"), None);
    }
}
