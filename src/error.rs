//! Error types for InfluxQL statement building.

use thiserror::Error;

/// The main error type for building and rendering statements.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A function was given the wrong number of arguments.
    #[error("Function {function} takes {expected} argument(s), got {got}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    /// A function argument has the wrong type.
    #[error("Argument {position} to {function} must be {expected}")]
    ArgumentType {
        function: &'static str,
        position: usize,
        expected: &'static str,
    },

    /// A numeric function argument is outside its allowed range.
    #[error("Argument to {function} must be between 0 and 100 (exclusive), got {value}")]
    ArgumentRange { function: &'static str, value: String },

    /// Ordering direction is neither `asc` nor `desc`.
    #[error("Invalid order direction: '{0}'. Expected: asc or desc")]
    InvalidOrder(String),

    /// `select` was called without expressions.
    #[error("Select takes at least one expression")]
    EmptySelect,

    /// `date_range` was called without a start or an end.
    #[error("date_range requires either a start or an end")]
    MissingBound,

    /// `date_range` boundaries are the wrong way round.
    #[error("date_range boundaries should have start <= end, got {start} > {end}")]
    InvertedRange { start: String, end: String },

    /// `date_range` boundaries cannot be compared with each other.
    #[error("date_range boundaries are not comparable: {start} and {end}")]
    IncomparableBounds { start: String, end: String },

    /// A dynamically typed value has no literal form in the dialect.
    #[error("Unsupported literal: {0}")]
    UnsupportedLiteral(String),

    /// Strict rendering was requested on a query with no source.
    #[error("Query has no source measurement; call from() first")]
    MissingSource,

    /// Failed to parse builder input text.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Statement execution failed in the client.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong argument count, type or range, or a bad ordering direction.
    Validation,
    /// Missing or inverted time range bounds.
    Range,
    /// A value that cannot be written as a literal, or a missing source.
    Format,
    Parse,
    Execution,
    Config,
}

impl QueryError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an argument count error.
    pub fn count(function: &'static str, expected: usize, got: usize) -> Self {
        Self::ArgumentCount {
            function,
            expected,
            got,
        }
    }

    /// Which part of the error taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArgumentCount { .. }
            | Self::ArgumentType { .. }
            | Self::ArgumentRange { .. }
            | Self::InvalidOrder(_)
            | Self::EmptySelect => ErrorKind::Validation,
            Self::MissingBound | Self::InvertedRange { .. } | Self::IncomparableBounds { .. } => {
                ErrorKind::Range
            }
            Self::UnsupportedLiteral(_) | Self::MissingSource => ErrorKind::Format,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Execution(_) => ErrorKind::Execution,
            Self::Config(_) | Self::Io(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for statement building.
pub type QueryResult<T> = Result<T, QueryError>;
