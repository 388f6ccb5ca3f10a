//! Error types for myqb

use thiserror::Error;

/// Result type alias for myqb operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// A list/mapping/opaque value reached the escaper where a scalar was required
    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    /// Condition tree nested deeper than the parser allows
    #[error("Condition tree exceeds maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Statement kind outside the supported set
    #[error("Unsupported statement kind: {0}")]
    UnsupportedKind(String),

    /// A configuration method was called on a builder of the wrong kind
    #[error("Method '{method}' is not valid for {kind} statements")]
    InvalidMethodForKind { method: String, kind: String },

    /// Add-or-modify invoked against an existing identity.
    ///
    /// Never raised by the compiler or the builder themselves; data-access
    /// layers construct it to steer callers onto the update path.
    #[error("Duplicate write rejected: {0}")]
    DuplicateWrite(String),

    /// Opaque failure forwarded from the query-execution port
    #[error("Execution error: {0}")]
    Execution(String),
}

impl QueryError {
    /// Create an invalid-value-type error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValueType(message.into())
    }

    /// Create an invalid-method-for-kind error
    pub fn invalid_method(method: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::InvalidMethodForKind {
            method: method.into(),
            kind: kind.into(),
        }
    }

    /// Create a duplicate-write error
    pub fn duplicate_write(message: impl Into<String>) -> Self {
        Self::DuplicateWrite(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is an invalid-value-type error
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValueType(_))
    }

    /// Check if this is a depth-exceeded error
    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self, Self::DepthExceeded { .. })
    }

    /// Check if this is a duplicate-write error
    pub fn is_duplicate_write(&self) -> bool {
        matches!(self, Self::DuplicateWrite(_))
    }
}
