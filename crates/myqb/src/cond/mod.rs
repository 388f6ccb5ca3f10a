//! Condition-expression compiler.
//!
//! Translates the nested-mapping condition mini-language into SQL boolean
//! expression text, in two phases:
//!
//! 1. [`parse`] turns the ambiguous, type-sniffed `serde_json::Value` input
//!    into a typed [`CondNode`] tree, resolving all input-shape detection
//!    (dual-order binary operators, `$in` shapes, nested sub-conditions).
//! 2. [`render`] is a pure match over the tree producing the final text.
//!
//! The mini-language, briefly: `{"a": "b"}` means `` `a`='b' ``, connectors
//! default to AND, `{"$or": {...}}` switches to OR, other comparisons use
//! `{"a": {">": 5}}` or the reversed `{">": {"a": 5}}`.
//!
//! ```
//! use serde_json::json;
//! let sql = myqb::compile(&json!({"$or": {"a": 1, "b": 2}})).unwrap();
//! assert_eq!(sql, "(`a`=1 OR `b`=2)");
//! ```

mod parse;
mod render;

#[cfg(test)]
mod tests;

pub use parse::{MAX_DEPTH, parse};
pub use render::render;

use crate::error::QueryResult;
use crate::escape::{BackslashEscaper, Escaper};
use serde_json::Value;

/// Binary comparison operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Lt,
    Gt,
    Lte,
    Gte,
    Ne,
    Like,
    NotLike,
}

impl BinOp {
    /// Recognize an operator token (case-insensitive, pre-lowercased).
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" | "$lt" => Some(Self::Lt),
            ">" | "$gt" => Some(Self::Gt),
            "<=" | "$lte" => Some(Self::Lte),
            ">=" | "$gte" => Some(Self::Gte),
            "$ne" => Some(Self::Ne),
            "$like" => Some(Self::Like),
            "$notlike" => Some(Self::NotLike),
            _ => None,
        }
    }

    /// The SQL spelling, including surrounding spaces for word operators.
    pub fn sql(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Ne => "<>",
            Self::Like => " LIKE ",
            Self::NotLike => " NOT LIKE ",
        }
    }
}

/// How sibling terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

/// A comparison operand, typed at parse time so rendering stays a pure match.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// JSON null
    Null,
    /// Integer, rendered bare
    Int(i64),
    /// Non-integer numeric, rendered verbatim but quoted in value position
    Num(String),
    /// Text, escaped and quoted unless escaping is disabled
    Text(String),
    /// Raw expression, rendered literally
    Raw(String),
}

/// Typed condition tree.
///
/// Fields in [`CondNode::Binary`] and friends hold prepared key text
/// (already quoted or marker-stripped).
#[derive(Debug, Clone, PartialEq)]
pub enum CondNode {
    /// Always-true condition, renders `1`
    True,
    /// Pre-rendered condition text, passed through untouched
    Raw(String),
    /// Sibling terms combined with a joiner; parenthesized when more than one
    Group { joiner: Joiner, terms: Vec<CondNode> },
    /// Negated sub-condition, renders `(NOT <sub>)`
    Not(Box<CondNode>),
    /// Binary comparison. `reversed` records which input shape produced it:
    /// `{field: {op: value}}` (false) or `{op: {field: value}}` (true);
    /// both render identically.
    Binary {
        field: String,
        op: BinOp,
        operand: Operand,
        reversed: bool,
    },
    /// `!=`/`<>` term; a null operand renders `IS NOT NULL`
    NotEqual { field: String, operand: Operand },
    /// IN-set term; an empty value set renders the literal `false`
    InSet {
        field: String,
        values: Vec<Operand>,
        negated: bool,
    },
    /// Plain equality; a null operand renders `IS NULL`
    Equal { field: String, operand: Operand },
}

/// Compile a condition tree to SQL boolean-expression text.
///
/// Uses the generic backslash escaper; see [`compile_with`] to supply a
/// connection-aware one.
pub fn compile(tree: &Value) -> QueryResult<String> {
    compile_with(tree, &BackslashEscaper)
}

/// Compile a condition tree using the given escaper.
pub fn compile_with(tree: &Value, escaper: &dyn Escaper) -> QueryResult<String> {
    render(&parse(tree)?, escaper, false)
}

/// Compile a condition tree without escaping values.
///
/// Join predicates compare columns rather than literals, so their operands
/// must not be quoted or escaped.
pub fn compile_no_escape(tree: &Value) -> QueryResult<String> {
    render(&parse(tree)?, &BackslashEscaper, true)
}
