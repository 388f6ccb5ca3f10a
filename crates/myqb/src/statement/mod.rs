//! Fluent statement builder.
//!
//! A [`Statement`] holds the configuration of exactly one SQL statement
//! (kind, table, condition, joins, ordering, limits, set-clauses) and
//! serializes it to text on demand. Execution is delegated to a
//! caller-supplied [`QueryPort`]; the first successful execution is memoized
//! for the lifetime of the builder instance.
//!
//! ```
//! use serde_json::json;
//!
//! let mut stmt = myqb::select(json!(null), json!({"id": 5}));
//! stmt.from("users").order_by("name", true).limit_skip(10, 2);
//! assert_eq!(
//!     stmt.to_sql().unwrap(),
//!     "SELECT 1 FROM users  WHERE `id`=5 ORDER BY name DESC LIMIT 2, 10"
//! );
//! ```


use crate::cond;
use crate::error::{QueryError, QueryResult};
use crate::escape::{BackslashEscaper, Escaper};
use crate::fields;
use crate::port::{ExecResult, QueryPort, RowIter, TableRef};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The fixed set of statement kinds. Immutable once a builder is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
    Update,
    Delete,
    Insert,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Count => "count",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Insert => "insert",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "count" => Ok(Self::Count),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "insert" => Ok(Self::Insert),
            other => Err(QueryError::UnsupportedKind(other.to_string())),
        }
    }
}

/// One join descriptor: table, ON condition tree, optional prefix (`LEFT`).
#[derive(Debug, Clone)]
struct Join {
    table: String,
    on: Value,
    prefix: String,
}

/// Stateful fluent builder for a single SQL statement.
///
/// Not safe for concurrent mutation; intended for single-owner,
/// single-statement-lifecycle use.
pub struct Statement {
    kind: StatementKind,
    from: Option<String>,
    table_ref: Option<Box<dyn TableRef>>,
    fields: Value,
    set: Value,
    set_dup: Value,
    condition: Value,
    joins: Vec<Join>,
    group_by: Option<String>,
    having: Value,
    order_by: Option<String>,
    order_desc: bool,
    limit: Option<u64>,
    skip: Option<u64>,
    ignore: bool,
    suffix: Option<String>,
    /// One-shot predicate gate consumed by the next join call
    guard: bool,
    escaper: Box<dyn Escaper>,
    result: Option<ExecResult>,
}

/// Create a SELECT statement builder.
///
/// An absent/empty field list serializes as `SELECT 1`.
pub fn select(fields: Value, condition: Value) -> Statement {
    let mut stmt = Statement::new(StatementKind::Select);
    stmt.fields = fields;
    stmt.condition = condition;
    stmt
}

/// Create a COUNT statement builder over the given field or expression.
pub fn count(expr: &Value) -> QueryResult<Statement> {
    let mut stmt = Statement::new(StatementKind::Count);
    stmt.fields = fields::count_fields(expr)?;
    Ok(stmt)
}

/// Create an UPDATE statement builder.
pub fn update(set: Value, condition: Value) -> Statement {
    let mut stmt = Statement::new(StatementKind::Update);
    stmt.set = set;
    stmt.condition = condition;
    stmt
}

/// Create a DELETE statement builder.
pub fn delete(condition: Value) -> Statement {
    let mut stmt = Statement::new(StatementKind::Delete);
    stmt.condition = condition;
    stmt
}

/// Create an INSERT statement builder from a column-to-value mapping.
pub fn insert(fields: Value, ignore: bool) -> Statement {
    let mut stmt = Statement::new(StatementKind::Insert);
    stmt.fields = fields;
    stmt.ignore = ignore;
    stmt
}

impl Statement {
    /// Create a blank builder of the given kind.
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            from: None,
            table_ref: None,
            fields: Value::Null,
            set: Value::Null,
            set_dup: Value::Null,
            condition: Value::Null,
            joins: Vec::new(),
            group_by: None,
            having: Value::Null,
            order_by: None,
            order_desc: false,
            limit: None,
            skip: None,
            ignore: false,
            suffix: None,
            guard: true,
            escaper: Box::new(BackslashEscaper),
            result: None,
        }
    }

    /// This builder's kind.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Replace the value escaper (e.g. with a connection-aware one).
    pub fn set_escaper(&mut self, escaper: impl Escaper + 'static) -> &mut Self {
        self.escaper = Box::new(escaper);
        self
    }

    /// Set the source table.
    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.from = Some(table.into());
        self
    }

    /// Alias of [`from`](Self::from), reading naturally on selects.
    pub fn in_(&mut self, table: impl Into<String>) -> &mut Self {
        self.from(table)
    }

    /// Alias of [`from`](Self::from), reading naturally on inserts.
    pub fn into(&mut self, table: impl Into<String>) -> &mut Self {
        self.from(table)
    }

    /// Bind the builder to a data-access object: the table name comes from
    /// the reference and later `where_` calls get their condition keys
    /// prefixed through it.
    pub fn from_ref(&mut self, table: impl TableRef + 'static) -> &mut Self {
        self.from = Some(table.name().to_string());
        self.table_ref = Some(Box::new(table));
        self
    }

    /// Attach (or overwrite) the condition tree.
    pub fn where_(&mut self, condition: Value) -> &mut Self {
        let condition = match &self.table_ref {
            Some(r) => r.prefix_condition(condition),
            None => condition,
        };
        self.condition = condition;
        self
    }

    /// Restrict the field list. Only valid for `select` builders.
    pub fn select_fields(&mut self, fields: Value) -> QueryResult<&mut Self> {
        if self.kind != StatementKind::Select {
            return Err(QueryError::invalid_method(
                "select_fields",
                self.kind.as_str(),
            ));
        }
        self.fields = fields;
        Ok(self)
    }

    /// Replace the SET mapping of an update.
    pub fn set(&mut self, set: Value) -> &mut Self {
        self.set = set;
        self
    }

    /// Set ordering column and direction.
    pub fn order_by(&mut self, what: impl Into<String>, desc: bool) -> &mut Self {
        self.order_by = Some(what.into());
        self.order_desc = desc;
        self
    }

    /// Set the GROUP BY column.
    pub fn group_by(&mut self, group_by: impl Into<String>) -> &mut Self {
        self.group_by = Some(group_by.into());
        self
    }

    /// Set the HAVING condition tree (rendered only together with GROUP BY).
    pub fn having(&mut self, having: Value) -> &mut Self {
        self.having = having;
        self
    }

    /// Set the row limit.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Set the row limit with a leading skip (`LIMIT skip, limit`).
    pub fn limit_skip(&mut self, limit: u64, skip: u64) -> &mut Self {
        self.limit = Some(limit);
        self.skip = Some(skip);
        self
    }

    /// Arm the one-shot join gate: when `predicate` is false, the next
    /// `join`/`left_join` call is skipped and the gate resets to true.
    ///
    /// Prefer [`join_if`](Self::join_if) for new code; this form exists for
    /// chains that decide the predicate before naming the join.
    pub fn on(&mut self, predicate: bool) -> &mut Self {
        self.guard = predicate;
        self
    }

    /// Add an inner join. The ON condition may be a nested condition tree;
    /// it is compiled without value escaping since join predicates reference
    /// columns, not literals.
    pub fn join(&mut self, table: impl Into<String>, on: Value) -> &mut Self {
        self.join_prefixed("", table, on)
    }

    /// Add a LEFT join.
    pub fn left_join(&mut self, table: impl Into<String>, on: Value) -> &mut Self {
        self.join_prefixed("LEFT", table, on)
    }

    /// Add a join with an explicit prefix (`LEFT`, `RIGHT`, ...).
    pub fn join_prefixed(
        &mut self,
        prefix: &str,
        table: impl Into<String>,
        on: Value,
    ) -> &mut Self {
        if !self.guard {
            self.guard = true;
            return self;
        }
        self.push_join(prefix, table, on);
        self
    }

    /// Add an inner join only when `guard` is true. Explicit counterpart of
    /// the [`on`](Self::on) gate; does not touch the gate.
    pub fn join_if(&mut self, guard: bool, table: impl Into<String>, on: Value) -> &mut Self {
        if guard {
            self.push_join("", table, on);
        }
        self
    }

    /// Add a LEFT join only when `guard` is true.
    pub fn left_join_if(&mut self, guard: bool, table: impl Into<String>, on: Value) -> &mut Self {
        if guard {
            self.push_join("LEFT", table, on);
        }
        self
    }

    fn push_join(&mut self, prefix: &str, table: impl Into<String>, on: Value) {
        self.joins.push(Join {
            table: table.into(),
            on,
            prefix: prefix.to_string(),
        });
    }

    /// Mark an insert as `INSERT IGNORE`.
    pub fn ignore(&mut self, ignore: bool) -> &mut Self {
        self.ignore = ignore;
        self
    }

    /// Set literal suffix text appended to an insert.
    pub fn suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Store the set-map for an insert's ON DUPLICATE KEY UPDATE clause.
    pub fn on_duplicate_key_update(&mut self, set: Value) -> &mut Self {
        self.set_dup = set;
        self
    }

    /// Serialize to SQL text. Pure over the current state; calling it twice
    /// on an unmodified builder yields identical text.
    pub fn to_sql(&self) -> QueryResult<String> {
        let esc = &*self.escaper;
        let cond = cond::compile_with(&self.condition, esc)?;
        let from = self.from.as_deref().unwrap_or("");

        let sql = match self.kind {
            StatementKind::Select => {
                let mut join_sql = String::new();
                for join in &self.joins {
                    let on = cond::compile_no_escape(&join.on)?;
                    join_sql.push_str(&format!(
                        " {} JOIN {} ON {}",
                        join.prefix, join.table, on
                    ));
                }
                let mut q = format!(
                    "SELECT {} FROM {} {} WHERE {}",
                    fields::field_list(&self.fields)?,
                    from,
                    join_sql,
                    cond
                );
                if let Some(group) = &self.group_by {
                    q.push_str(&format!(" GROUP BY {group}"));
                    if !is_falsy(&self.having) {
                        q.push_str(&format!(
                            " HAVING {}",
                            cond::compile_with(&self.having, esc)?
                        ));
                    }
                }
                if let Some(order) = &self.order_by {
                    q.push_str(&format!(" ORDER BY {order}"));
                    if self.order_desc {
                        q.push_str(" DESC");
                    }
                }
                if let Some(limit) = self.limit.filter(|l| *l > 0) {
                    match self.skip.filter(|s| *s > 0) {
                        Some(skip) => q.push_str(&format!(" LIMIT {skip}, {limit}")),
                        None => q.push_str(&format!(" LIMIT {limit}")),
                    }
                }
                q
            }
            StatementKind::Count => {
                format!(
                    "SELECT {} FROM {} WHERE {}",
                    fields::field_list(&self.fields)?,
                    from,
                    cond
                )
            }
            StatementKind::Insert => {
                let Value::Object(map) = &self.fields else {
                    return Err(QueryError::invalid_value(
                        "insert fields must be a mapping of column to value",
                    ));
                };
                let cols: Vec<Value> = map.keys().map(|k| Value::String(k.clone())).collect();
                let vals: Vec<Value> = map.values().cloned().collect();
                let fields_s = format!("({})", fields::field_list(&Value::Array(cols))?);
                let ins = fields::insert_values(&Value::Array(vals), esc)?;
                let ign = if self.ignore { " IGNORE" } else { "" };
                let suffix = match self.set_dup.as_object() {
                    Some(dup) if !dup.is_empty() => {
                        let set = fields::set_clauses(&self.set_dup, esc)?.join(",");
                        format!("ON DUPLICATE KEY UPDATE {set}")
                    }
                    _ => self.suffix.clone().unwrap_or_default(),
                };
                format!("INSERT{ign} INTO {from} {fields_s} VALUES {ins} {suffix}")
            }
            StatementKind::Update => {
                let set = fields::set_clauses(&self.set, esc)?.join(",");
                format!("UPDATE {from} SET {set} WHERE {cond};")
            }
            StatementKind::Delete => {
                format!("DELETE FROM {from} WHERE {cond}")
            }
        };

        tracing::debug!(kind = %self.kind, sql = %sql, "statement serialized");
        Ok(sql)
    }

    /// Execute through the port, memoizing the outcome.
    ///
    /// The first call performs the query; every later call on the same
    /// instance returns the cached result without touching the port. Select
    /// statements wrap the result in a row iterator, all other kinds reduce
    /// to a success signal.
    pub fn execute(&mut self, port: &dyn QueryPort) -> QueryResult<&mut ExecResult> {
        if self.result.is_none() {
            let sql = self.to_sql()?;
            tracing::debug!(kind = %self.kind, sql = %sql, "executing statement");
            let handle = port.perform(&sql)?;
            let outcome = match self.kind {
                StatementKind::Select => ExecResult::Rows(RowIter::new(handle)),
                _ => ExecResult::Done(true),
            };
            self.result = Some(outcome);
        }
        match self.result.as_mut() {
            Some(result) => Ok(result),
            None => Err(QueryError::execution("statement result unavailable")),
        }
    }

    /// Execute and return the row count (read kinds) or affected-row count
    /// (write kinds). Always performs the query; never memoized and never
    /// consults the memoized result.
    pub fn execute_count(&self, port: &dyn QueryPort) -> QueryResult<u64> {
        let sql = self.to_sql()?;
        tracing::debug!(kind = %self.kind, sql = %sql, "executing statement for count");
        let handle = port.perform(&sql)?;
        Ok(match self.kind {
            StatementKind::Select | StatementKind::Count => handle.row_count(),
            StatementKind::Update | StatementKind::Delete | StatementKind::Insert => {
                handle.affected_rows()
            }
        })
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("kind", &self.kind)
            .field("from", &self.from)
            .field("fields", &self.fields)
            .field("set", &self.set)
            .field("condition", &self.condition)
            .field("joins", &self.joins)
            .finish_non_exhaustive()
    }
}

/// Mini-language falsiness: absent, false, zero, empty text or an empty
/// container all mean "not set".
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
    }
}
