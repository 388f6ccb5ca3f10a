//! # myqb
//!
//! A MySQL statement generator for Rust.
//!
//! ## Features
//!
//! - **Condition mini-language**: nested `serde_json` mappings compile to
//!   SQL boolean expressions (`{"a": "b"}` → `` `a`='b' ``)
//! - **Two-phase compiler**: input-shape detection produces a typed tree,
//!   rendering is a pure match over it
//! - **Statement builders**: fluent select/count/insert/update/delete with
//!   joins, grouping, ordering and limits
//! - **Injected escaping**: value escaping goes through an [`Escaper`]
//!   trait, no global connection state
//! - **Port-based execution**: builders hand SQL text to a caller-supplied
//!   [`QueryPort`] and memoize the first result
//!
//! ## Quick start
//!
//! ```
//! use serde_json::json;
//!
//! let mut stmt = myqb::select(json!(["id", "name"]), json!({"status": "on"}));
//! stmt.from("users").order_by("id", true).limit(10);
//! assert_eq!(
//!     stmt.to_sql().unwrap(),
//!     "SELECT `id`,`name` FROM users  WHERE `status`='on' ORDER BY id DESC LIMIT 10"
//! );
//! ```

pub mod cond;
pub mod error;
pub mod escape;
pub mod fields;
pub mod ident;
pub mod port;
pub mod statement;

pub use cond::{
    BinOp, CondNode, Joiner, MAX_DEPTH, Operand, compile, compile_no_escape, compile_with, parse,
    render,
};
pub use error::{QueryError, QueryResult};
pub use escape::{BackslashEscaper, Escaper, escape_value};
pub use fields::{count_fields, field_list, insert_values, set_clauses};
pub use ident::{Expr, prepare_key, quote_key};
pub use port::{ExecResult, QueryPort, ResultSet, Row, RowIter, TableRef};
pub use statement::{Statement, StatementKind, count, delete, insert, select, update};
