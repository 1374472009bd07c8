//! # influxql: a chainable InfluxQL statement builder
//!
//! Build `SELECT`, `DELETE` and `CREATE CONTINUOUS QUERY` statements from
//! typed values instead of string concatenation.
//!
//! ## Quick Example
//!
//! ```
//! use influxql::prelude::*;
//!
//! let q = Query::select([mean("value")])
//!     .from("deliciousness")
//!     .filter("host", "server01");
//!
//! assert_eq!(
//!     q.to_influxql().unwrap(),
//!     "SELECT MEAN(value) FROM deliciousness WHERE host = 'server01';"
//! );
//! ```
//!
//! ## Features
//!
//! The library reads no files or environment variables. The default `cli`
//! feature adds the `influxql` binary and its `config` loader; build with
//! `default-features = false` to leave both out.
//!
//! ## Filter keys
//!
//! | Key           | Renders as      |
//! |---------------|-----------------|
//! | `host`        | `host = ...`    |
//! | `host__ne`    | `host != ...`   |
//! | `value__gt`   | `value > ...`   |
//! | `value__gte`  | `value >= ...`  |
//! | `value__lt`   | `value < ...`   |
//! | `value__lte`  | `value <= ...`  |

#[cfg(feature = "cli")]
pub mod config;
pub mod continuous;
pub mod duration;
pub mod engine;
pub mod error;
pub mod functions;
pub mod parser;
pub mod predicate;
pub mod query;
pub mod transpiler;
pub mod value;

pub mod prelude {
    pub use crate::continuous::ContinuousQuery;
    pub use crate::duration::format_duration;
    pub use crate::engine::{Client, Engine, Point, ResultSet};
    pub use crate::error::*;
    pub use crate::functions::{
        count, derivative, distinct, first, last, max, mean, median, min, percentile, stddev,
        sum, Arg, Expr, Expression, Function, FunctionKind,
    };
    pub use crate::parser::{parse_expr, parse_filter, parse_interval, parse_literal};
    pub use crate::query::{Order, Query, SortOrder, TimeBucket};
    pub use crate::transpiler::ToInfluxQl;
    pub use crate::value::Literal;
}

/// Render any statement to InfluxQL text.
///
/// # Example
///
/// ```
/// use influxql::prelude::*;
///
/// let q = Query::select(["*"]).from("cpu").delete();
/// assert_eq!(influxql::render(&q).unwrap(), "DELETE FROM cpu;");
/// ```
pub fn render(statement: &impl transpiler::ToInfluxQl) -> error::QueryResult<String> {
    statement.to_influxql()
}
