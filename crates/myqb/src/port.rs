//! External collaborator ports.
//!
//! The statement builder produces SQL text and hands it to a caller-supplied
//! [`QueryPort`]; it never talks to a database driver directly. Port
//! failures are opaque to this crate: they are forwarded outward, never
//! interpreted or retried.

use crate::error::QueryResult;
use serde_json::Value;
use std::fmt;

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Handle over the outcome of one executed statement.
pub trait ResultSet {
    /// Number of rows in a read result.
    fn row_count(&self) -> u64;
    /// Number of rows touched by a write.
    fn affected_rows(&self) -> u64;
    /// Pull the next row; forward-only, not restartable.
    fn next_row(&mut self) -> Option<Row>;
}

/// Query-execution port: runs SQL text against whatever backs it.
pub trait QueryPort {
    fn perform(&self, sql: &str) -> QueryResult<Box<dyn ResultSet>>;
}

/// Reference to a data-access object a builder can be bound to.
///
/// Supplies the table name for `from` and a condition-key-prefixing
/// transform applied by `where_` (so `{"id": 5}` can become
/// `{"users.id": 5}` for a bound builder).
pub trait TableRef {
    /// Table name used as the statement's source table.
    fn name(&self) -> &str;
    /// Rewrite a condition tree into this table's namespace.
    fn prefix_condition(&self, cond: Value) -> Value;
}

/// Forward-only, single-pass row iterator over a [`ResultSet`].
pub struct RowIter {
    inner: Box<dyn ResultSet>,
}

impl RowIter {
    pub fn new(inner: Box<dyn ResultSet>) -> Self {
        Self { inner }
    }

    /// Row count reported by the underlying result.
    pub fn row_count(&self) -> u64 {
        self.inner.row_count()
    }
}

impl Iterator for RowIter {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_row()
    }
}

impl fmt::Debug for RowIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowIter")
            .field("row_count", &self.inner.row_count())
            .finish_non_exhaustive()
    }
}

/// Memoized outcome of executing a statement.
#[derive(Debug)]
pub enum ExecResult {
    /// Read statements wrap the port's handle in a row iterator.
    Rows(RowIter),
    /// Write statements reduce to a success signal.
    Done(bool),
}

impl ExecResult {
    /// The row iterator, for read results.
    pub fn rows(&mut self) -> Option<&mut RowIter> {
        match self {
            Self::Rows(iter) => Some(iter),
            Self::Done(_) => None,
        }
    }

    /// Whether the statement succeeded.
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Rows(_) => true,
            Self::Done(ok) => *ok,
        }
    }
}
