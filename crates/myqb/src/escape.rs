//! Scalar-to-SQL-literal escaping.
//!
//! [`escape_value`] is the boundary where injection risk is controlled:
//! numbers pass through verbatim, strings go through an injected [`Escaper`],
//! composite values are rejected outright, and raw [`Expr`](crate::Expr)
//! fragments bypass escaping by explicit caller choice.

use crate::error::{QueryError, QueryResult};
use crate::ident::Expr;
use serde_json::Value;

/// String-escaping capability.
///
/// Implementations wrap whatever the live connection offers (e.g. a
/// driver-provided `real_escape_string`); [`BackslashEscaper`] is the
/// connection-free fallback.
pub trait Escaper {
    /// Escape raw text for inclusion inside a single-quoted SQL literal.
    /// Returns the inner text only; callers add the surrounding quotes.
    fn escape_str(&self, raw: &str) -> String;
}

/// Generic backslash escaping, used when no connection is available.
///
/// Escapes the `mysqli_real_escape_string` character set: NUL, `\n`, `\r`,
/// backslash, single quote, double quote and Ctrl-Z.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackslashEscaper;

impl Escaper for BackslashEscaper {
    fn escape_str(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\u{1a}' => out.push_str("\\Z"),
                _ => out.push(ch),
            }
        }
        out
    }
}

/// Turn a scalar value into SQL-safe literal text.
///
/// Numbers and booleans render verbatim (no quoting). Strings are escaped
/// through `escaper` unless they carry the raw-expression marker, in which
/// case the literal text is returned untouched. Arrays and mappings fail
/// with [`QueryError::InvalidValueType`].
pub fn escape_value(value: &Value, escaper: &dyn Escaper) -> QueryResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => match Expr::unwrap_str(s) {
            Some(raw) => Ok(raw.to_string()),
            None => Ok(escaper.escape_str(s)),
        },
        Value::Array(_) | Value::Object(_) => Err(QueryError::invalid_value(
            "expected string or number value",
        )),
    }
}
