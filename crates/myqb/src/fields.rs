//! Field-list, VALUES-tuple and SET-clause rendering.

use crate::error::{QueryError, QueryResult};
use crate::escape::{Escaper, escape_value};
use crate::ident::{Expr, prepare_key, quote_key};
use serde_json::Value;

/// Render a field specification for a SELECT/INSERT column list.
///
/// An empty (or absent) list renders `1`, a scalar is treated as a
/// one-element list, raw expressions render literally, names are quoted.
/// Elements are joined with commas.
pub fn field_list(spec: &Value) -> QueryResult<String> {
    let items: Vec<&Value> = match spec {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        scalar => vec![scalar],
    };
    if items.is_empty() {
        return Ok("1".to_string());
    }
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(field_text(item)?);
    }
    Ok(parts.join(","))
}

fn field_text(v: &Value) -> QueryResult<String> {
    match v {
        Value::String(s) => Ok(prepare_key(s)),
        // positional/literal selects such as SELECT 1
        Value::Number(n) => Ok(quote_key(&n.to_string())),
        _ => Err(QueryError::invalid_value(
            "field names must be strings, numbers or raw expressions",
        )),
    }
}

/// Render an insert value specification as a parenthesized tuple.
///
/// Nested lists become nested tuples (multi-row inserts); nulls render
/// `NULL`, integers pass bare, raw expressions render literally, everything
/// else is quoted and escaped.
pub fn insert_values(spec: &Value, escaper: &dyn Escaper) -> QueryResult<String> {
    let items: Vec<&Value> = match spec {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => {
            return Err(QueryError::invalid_value(
                "insert values must be a list or mapping",
            ));
        }
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(match item {
            Value::Array(_) | Value::Object(_) => insert_values(item, escaper)?,
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            Value::String(s) if Expr::unwrap_str(s).is_some() => {
                escape_value(item, escaper)?
            }
            other => format!("'{}'", escape_value(other, escaper)?),
        });
    }
    Ok(format!("({})", parts.join(",")))
}

/// Render a set-map into `key=value` clauses for UPDATE and
/// ON DUPLICATE KEY UPDATE.
///
/// Nulls render `key=NULL`, numerics and raw expressions stay unquoted,
/// everything else is quoted and escaped.
pub fn set_clauses(spec: &Value, escaper: &dyn Escaper) -> QueryResult<Vec<String>> {
    let Value::Object(map) = spec else {
        return Ok(Vec::new());
    };
    let mut clauses = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = quote_key(k);
        clauses.push(match v {
            Value::Null => format!("{key}=NULL"),
            Value::Bool(b) => format!("{key}={}", if *b { 1 } else { 0 }),
            Value::Number(n) => format!("{key}={n}"),
            Value::String(s) if Expr::unwrap_str(s).is_some() => {
                format!("{key}={}", escape_value(v, escaper)?)
            }
            other => format!("{key}='{}'", escape_value(other, escaper)?),
        });
    }
    Ok(clauses)
}

/// Synthesize the `COUNT(<expr>)` field list of a count statement.
pub fn count_fields(param: &Value) -> QueryResult<Value> {
    let inner = match param {
        Value::String(s) => prepare_key(s),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(QueryError::invalid_value(
                "count expression must be a string or number",
            ));
        }
    };
    Ok(Value::Array(vec![
        Expr::new(format!("COUNT({inner})")).to_value(),
    ]))
}
