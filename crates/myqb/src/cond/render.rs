//! Pure rendering of a typed condition tree to SQL text.

use super::{CondNode, Joiner, Operand};
use crate::error::{QueryError, QueryResult};
use crate::escape::Escaper;

/// Render a condition tree to SQL boolean-expression text.
///
/// `no_escape` disables quoting/escaping of text operands, for join
/// predicates whose "values" are column references. Integer operands and
/// raw expressions render bare in either mode.
pub fn render(node: &CondNode, escaper: &dyn Escaper, no_escape: bool) -> QueryResult<String> {
    match node {
        CondNode::True => Ok("1".to_string()),
        CondNode::Raw(text) => Ok(text.clone()),
        CondNode::Group { joiner, terms } => {
            let mut parts = Vec::with_capacity(terms.len());
            for term in terms {
                parts.push(render(term, escaper, no_escape)?);
            }
            let sep = match joiner {
                Joiner::And => " AND ",
                Joiner::Or => " OR ",
            };
            let joined = parts.join(sep);
            Ok(if parts.len() > 1 {
                format!("({joined})")
            } else {
                joined
            })
        }
        CondNode::Not(sub) => Ok(format!("(NOT {})", render(sub, escaper, no_escape)?)),
        CondNode::Binary {
            field, op, operand, ..
        } => {
            let value = match operand {
                Operand::Raw(r) => r.clone(),
                Operand::Int(i) => i.to_string(),
                Operand::Num(n) if no_escape => n.clone(),
                Operand::Num(n) => format!("'{n}'"),
                Operand::Text(s) if no_escape => s.clone(),
                Operand::Text(s) => format!("'{}'", escaper.escape_str(s)),
                Operand::Null if no_escape => String::new(),
                Operand::Null => "''".to_string(),
            };
            Ok(format!("({}{}{})", field, op.sql(), value))
        }
        CondNode::NotEqual { field, operand } => match operand {
            Operand::Null => Ok(format!("{field} IS NOT NULL")),
            Operand::Raw(r) => Ok(format!("{field}<>{r}")),
            // integers keep their quotes here even though equality renders
            // them bare; the asymmetry is part of the language
            Operand::Int(i) => Ok(format!("{field}<>'{i}'")),
            Operand::Num(n) if no_escape => Ok(format!("{field}<>{n}")),
            Operand::Num(n) => Ok(format!("{field}<>'{n}'")),
            Operand::Text(s) if no_escape => Ok(format!("{field}<>{s}")),
            Operand::Text(s) => Ok(format!("{field}<>'{}'", escaper.escape_str(s))),
        },
        CondNode::InSet {
            field,
            values,
            negated,
        } => {
            if values.is_empty() {
                // never emit the invalid `IN ()`
                return Ok("false".to_string());
            }
            let mut parts = Vec::with_capacity(values.len());
            for value in values {
                parts.push(match value {
                    Operand::Int(i) => i.to_string(),
                    Operand::Num(n) => format!("'{n}'"),
                    Operand::Text(s) => format!("'{}'", escaper.escape_str(s)),
                    Operand::Null => "''".to_string(),
                    Operand::Raw(_) => {
                        return Err(QueryError::invalid_value(
                            "raw expressions are not allowed in IN lists",
                        ));
                    }
                });
            }
            let not = if *negated { "NOT " } else { "" };
            Ok(format!("{} {}IN ({})", field, not, parts.join(",")))
        }
        CondNode::Equal { field, operand } => match operand {
            Operand::Null => Ok(format!("{field} IS NULL")),
            Operand::Raw(r) => Ok(format!("{field}={r}")),
            Operand::Int(i) => Ok(format!("{field}={i}")),
            Operand::Num(n) if no_escape => Ok(format!("{field}={n}")),
            Operand::Num(n) => Ok(format!("{field}='{n}'")),
            Operand::Text(s) if no_escape => Ok(format!("{field}={s}")),
            Operand::Text(s) => Ok(format!("{field}='{}'", escaper.escape_str(s))),
        },
    }
}
