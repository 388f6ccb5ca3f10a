//! Input-shape detection: nested mapping → typed condition tree.
//!
//! All the ambiguity of the mini-language lives here. Rendering never has
//! to sniff value types again.

use super::{BinOp, CondNode, Joiner, Operand};
use crate::error::{QueryError, QueryResult};
use crate::ident::{Expr, prepare_key};
use serde_json::Value;

/// Maximum nesting depth accepted from untrusted condition trees.
pub const MAX_DEPTH: usize = 32;

impl Operand {
    pub(crate) fn from_value(v: &Value) -> QueryResult<Self> {
        match v {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Int(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => Ok(Self::Num(n.to_string())),
            },
            Value::String(s) => match Expr::unwrap_str(s) {
                Some(raw) => Ok(Self::Raw(raw.to_string())),
                None => Ok(Self::Text(s.clone())),
            },
            Value::Array(_) | Value::Object(_) => {
                Err(QueryError::invalid_value("expected a scalar operand"))
            }
        }
    }
}

/// Parse a condition tree into a typed [`CondNode`].
///
/// Empty mappings and falsy scalars parse to [`CondNode::True`]; non-empty
/// strings pass through as pre-rendered condition text.
pub fn parse(tree: &Value) -> QueryResult<CondNode> {
    parse_node(tree, Joiner::And, "", 0)
}

fn is_numeric_key(k: &str) -> bool {
    !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit())
}

fn parse_node(v: &Value, joiner: Joiner, current_key: &str, depth: usize) -> QueryResult<CondNode> {
    if depth > MAX_DEPTH {
        return Err(QueryError::DepthExceeded { limit: MAX_DEPTH });
    }
    match v {
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(CondNode::True),
        Value::String(s) => {
            if s.is_empty() {
                return Ok(CondNode::True);
            }
            Ok(match Expr::unwrap_str(s) {
                Some(raw) => CondNode::Raw(raw.to_string()),
                None => CondNode::Raw(s.clone()),
            })
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(CondNode::True);
            }
            let mut terms = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                terms.push(parse_entry(EntryKey::Index(i), item, current_key, depth)?);
            }
            Ok(CondNode::Group { joiner, terms })
        }
        Value::Object(map) => {
            if map.is_empty() {
                return Ok(CondNode::True);
            }
            let mut terms = Vec::with_capacity(map.len());
            for (k, val) in map {
                terms.push(parse_entry(EntryKey::Name(k), val, current_key, depth)?);
            }
            Ok(CondNode::Group { joiner, terms })
        }
    }
}

enum EntryKey<'a> {
    /// Positional entry of an AND-joined condition list
    Index(usize),
    Name(&'a str),
}

/// Dispatch a single mapping entry. First match wins; the order mirrors the
/// operator precedence of the mini-language.
fn parse_entry(
    key: EntryKey<'_>,
    v: &Value,
    current_key: &str,
    depth: usize,
) -> QueryResult<CondNode> {
    if let EntryKey::Name(k) = key {
        let kop = k.to_ascii_lowercase();
        if kop == "or" || kop == "$or" {
            return parse_node(v, Joiner::Or, "", depth + 1);
        }
        if kop == "not" || kop == "$not" {
            return Ok(CondNode::Not(Box::new(parse_node(
                v,
                Joiner::Or,
                "",
                depth + 1,
            )?)));
        }
        if !is_numeric_key(k) {
            if let Some(op) = BinOp::from_token(&kop) {
                return parse_binop(op, v, current_key);
            }
        }
        if k == "!=" || k == "<>" {
            return parse_not_equal(v);
        }
        if kop == "$in" || kop == "$nin" || kop == "$notin" {
            return parse_in(kop != "$in", v, current_key);
        }
    }

    // Nested sub-condition: positional and numeric-named entries always
    // recurse; other named entries only when the value is a single-entry
    // mapping (a non-empty list means a multi-operator conjunction instead).
    let nested = match (&key, v) {
        (EntryKey::Index(_), Value::Array(a)) => !a.is_empty(),
        (EntryKey::Index(_), Value::Object(m)) => !m.is_empty(),
        (EntryKey::Name(k), Value::Array(a)) => is_numeric_key(k) && !a.is_empty(),
        (EntryKey::Name(k), Value::Object(m)) => {
            if is_numeric_key(k) {
                !m.is_empty()
            } else {
                m.len() == 1
            }
        }
        _ => false,
    };
    let field = match key {
        EntryKey::Index(i) => prepare_key(&i.to_string()),
        EntryKey::Name(k) => prepare_key(k),
    };
    if nested {
        return parse_node(v, Joiner::And, &field, depth + 1);
    }

    match v {
        Value::Array(items) => {
            // Multi-operator conjunction against one field, e.g. a range:
            // {"a": [{">": 1}, {"<": 10}]}. Always AND-joined, whatever the
            // surrounding joiner.
            let mut terms = Vec::with_capacity(items.len());
            for item in items {
                let Value::Object(m) = item else {
                    return Err(QueryError::invalid_value(
                        "multi-operator condition entries must be operator mappings",
                    ));
                };
                for (kk, vv) in m {
                    let Some(op) = BinOp::from_token(&kk.to_ascii_lowercase()) else {
                        return Err(QueryError::invalid_value(format!(
                            "unknown operator '{kk}' in multi-operator condition"
                        )));
                    };
                    terms.push(parse_binop(op, vv, &field)?);
                }
            }
            Ok(CondNode::Group {
                joiner: Joiner::And,
                terms,
            })
        }
        Value::Null => Ok(CondNode::Equal {
            field,
            operand: Operand::Null,
        }),
        other => Ok(CondNode::Equal {
            field,
            operand: Operand::from_value(other)?,
        }),
    }
}

/// Both operand shapes of a binary operator:
/// normal order `{field: {op: value}}` arrives with `current_key` set,
/// reversed order `{op: {field: value}}` carries the field inside.
fn parse_binop(op: BinOp, v: &Value, current_key: &str) -> QueryResult<CondNode> {
    match v {
        Value::Object(m) => {
            let Some((kk, vv)) = m.iter().next() else {
                return Err(QueryError::invalid_value(
                    "empty operand mapping for binary operator",
                ));
            };
            Ok(CondNode::Binary {
                field: prepare_key(kk),
                op,
                operand: Operand::from_value(vv)?,
                reversed: true,
            })
        }
        Value::Array(_) => Err(QueryError::invalid_value(
            "binary operator operand cannot be a list",
        )),
        scalar if !is_numeric_key(current_key) => Ok(CondNode::Binary {
            field: current_key.to_string(),
            op,
            operand: Operand::from_value(scalar)?,
            reversed: false,
        }),
        _ => Err(QueryError::invalid_value(
            "binary operator requires a field context",
        )),
    }
}

fn parse_not_equal(v: &Value) -> QueryResult<CondNode> {
    let Value::Object(m) = v else {
        return Err(QueryError::invalid_value(
            "not-equal operand must be a single-entry mapping",
        ));
    };
    let Some((kk, vv)) = m.iter().next() else {
        return Err(QueryError::invalid_value(
            "empty operand mapping for not-equal",
        ));
    };
    Ok(CondNode::NotEqual {
        field: prepare_key(kk),
        operand: Operand::from_value(vv)?,
    })
}

fn parse_in(negated: bool, v: &Value, current_key: &str) -> QueryResult<CondNode> {
    let (field, raw_values) = match v {
        // {"$in": {field: [values...]}}
        Value::Object(m) => {
            let Some((kk, vv)) = m.iter().next() else {
                return Err(QueryError::invalid_value("empty operand mapping for IN"));
            };
            let vals = match vv {
                Value::Array(items) => items.iter().collect(),
                other => scalar_in_values(other),
            };
            (prepare_key(kk), vals)
        }
        // bare list interpreted against the current key
        Value::Array(items) => (current_key.to_string(), items.iter().collect()),
        other => (current_key.to_string(), scalar_in_values(other)),
    };
    let mut values = Vec::with_capacity(raw_values.len());
    for item in raw_values {
        let op = Operand::from_value(item)?;
        if matches!(op, Operand::Raw(_)) {
            return Err(QueryError::invalid_value(
                "raw expressions are not allowed in IN lists",
            ));
        }
        values.push(op);
    }
    Ok(CondNode::InSet {
        field,
        values,
        negated,
    })
}

/// A scalar IN operand is promoted to a one-element set; null and the empty
/// string mean an empty set (a guaranteed-false predicate).
fn scalar_in_values(v: &Value) -> Vec<&Value> {
    match v {
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        other => vec![other],
    }
}
