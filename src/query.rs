//! The chainable query builder.
//!
//! ```
//! use std::time::Duration;
//! use influxql::prelude::*;
//!
//! let q = Query::select([count("a")])
//!     .from("x")
//!     .filter("g__lt", 4)
//!     .group_by(["a", "b"])
//!     .group_by_time(Duration::from_secs(3600))
//!     .fill()
//!     .limit(100)
//!     .order("time", "asc")
//!     .unwrap();
//!
//! assert_eq!(
//!     q.to_influxql().unwrap(),
//!     "SELECT COUNT(a) FROM x WHERE g < 4 GROUP BY time(1h), a, b fill(0) LIMIT 100 ORDER BY time ASC;"
//! );
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::duration::format_duration;
use crate::error::{QueryError, QueryResult};
use crate::functions::Expr;
use crate::predicate::{Comparator, filter_key};
use crate::value::Literal;

/// Field name the dialect reserves for point timestamps.
pub const TIME_FIELD: &str = "time";

/// Width of a `GROUP BY time(...)` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeBucket {
    /// Rendered with the most compact unit.
    Duration(Duration),
    /// An interval literal such as `1h`, written verbatim.
    Literal(String),
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBucket::Duration(d) => write!(f, "{}", format_duration(*d)),
            TimeBucket::Literal(s) => write!(f, "{}", s),
        }
    }
}

impl From<Duration> for TimeBucket {
    fn from(d: Duration) -> Self {
        TimeBucket::Duration(d)
    }
}

impl From<&str> for TimeBucket {
    fn from(s: &str) -> Self {
        TimeBucket::Literal(s.to_string())
    }
}

impl From<String> for TimeBucket {
    fn from(s: String) -> Self {
        TimeBucket::Literal(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError::InvalidOrder(s.to_string())),
        }
    }
}

/// The single `ORDER BY` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    pub direction: SortOrder,
}

/// Accumulated state of a SELECT or DELETE statement.
///
/// Every setter consumes and returns the builder, so calls chain. Cloning
/// copies every owned collection, so a clone can be used as a template
/// without the copies affecting each other.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    fields: Vec<Expr>,
    measurement: Option<String>,
    is_delete: bool,
    /// Filter keys (`field__comparator`) to values, kept sorted by key.
    filters: BTreeMap<String, Literal>,
    start_time: Option<Literal>,
    end_time: Option<Literal>,
    group_by: Vec<String>,
    group_by_time: Option<TimeBucket>,
    fill: bool,
    into_series: Option<String>,
    order: Option<Order>,
    limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a SELECT with the given expressions.
    pub fn select<I>(expressions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Self {
            fields: expressions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append one select expression.
    pub fn column(mut self, expression: impl Into<Expr>) -> Self {
        self.fields.push(expression.into());
        self
    }

    /// Append one or more select expressions.
    pub fn columns<I>(mut self, expressions: I) -> QueryResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        let before = self.fields.len();
        self.fields.extend(expressions.into_iter().map(Into::into));
        if self.fields.len() == before {
            return Err(QueryError::EmptySelect);
        }
        Ok(self)
    }

    /// Set the source measurement (or `/regex/`).
    pub fn from(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }

    /// Turn the statement into a DELETE. Select expressions are ignored.
    pub fn delete(mut self) -> Self {
        self.is_delete = true;
        self
    }

    /// Turn a DELETE back into a SELECT.
    pub fn undelete(mut self) -> Self {
        self.is_delete = false;
        self
    }

    /// Add a filter. `key` is a field path with `__` separators and an
    /// optional comparator suffix: `host`, `cpu__gt`, `tags__region__ne`.
    /// A repeated key replaces the earlier value.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Add several filters at once.
    pub fn filters<I, K, V>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Literal>,
    {
        self.filters
            .extend(clauses.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add filters from a JSON object of key/value pairs.
    pub fn filter_json(mut self, clauses: serde_json::Value) -> QueryResult<Self> {
        let serde_json::Value::Object(map) = clauses else {
            return Err(QueryError::UnsupportedLiteral(format!(
                "expected an object of filters, got {}",
                clauses
            )));
        };
        for (key, value) in map {
            self.filters.insert(key, Literal::try_from(value)?);
        }
        Ok(self)
    }

    /// Restrict `time` to lie after `start` and/or before `end`.
    pub fn date_range(mut self, start: Option<Literal>, end: Option<Literal>) -> QueryResult<Self> {
        if start.is_none() && end.is_none() {
            return Err(QueryError::MissingBound);
        }
        if let (Some(s), Some(e)) = (&start, &end) {
            match s.compare(e) {
                Some(Ordering::Greater) => {
                    return Err(QueryError::InvertedRange {
                        start: s.to_string(),
                        end: e.to_string(),
                    });
                }
                None => {
                    return Err(QueryError::IncomparableBounds {
                        start: s.to_string(),
                        end: e.to_string(),
                    });
                }
                _ => {}
            }
        }

        if let Some(s) = start {
            trace!(start = %s, "setting range start");
            self.filters.insert(filter_key(TIME_FIELD, Comparator::Gt), s.clone());
            self.start_time = Some(s);
        }
        if let Some(e) = end {
            trace!(end = %e, "setting range end");
            self.filters.insert(filter_key(TIME_FIELD, Comparator::Lt), e.clone());
            self.end_time = Some(e);
        }
        Ok(self)
    }

    /// Append grouping columns, keeping insertion order.
    pub fn group_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the time bucket, replacing any previous one.
    pub fn group_by_time(mut self, bucket: impl Into<TimeBucket>) -> Self {
        self.group_by_time = Some(bucket.into());
        self
    }

    /// Fill empty buckets with zero.
    pub fn fill(mut self) -> Self {
        self.fill = true;
        self
    }

    /// Write the results into another series.
    pub fn into_series(mut self, series: impl Into<String>) -> Self {
        self.into_series = Some(series.into());
        self
    }

    /// Cap the number of returned rows. A limit of zero is not rendered.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Order by `field`; `direction` is `asc` or `desc` in any case.
    pub fn order(self, field: impl Into<String>, direction: &str) -> QueryResult<Self> {
        let direction = direction.parse::<SortOrder>()?;
        Ok(self.order_by(field, direction))
    }

    /// Order by `field`, replacing any previous ordering.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortOrder) -> Self {
        let field = field.into();
        trace!(field = %field, direction = %direction, "setting order");
        self.order = Some(Order { field, direction });
        self
    }

    pub fn fields(&self) -> &[Expr] {
        &self.fields
    }

    pub fn measurement(&self) -> Option<&str> {
        self.measurement.as_deref()
    }

    pub fn is_delete(&self) -> bool {
        self.is_delete
    }

    pub fn filter_map(&self) -> &BTreeMap<String, Literal> {
        &self.filters
    }

    /// The range start set by [`Query::date_range`].
    pub fn start_time(&self) -> Option<&Literal> {
        self.start_time.as_ref()
    }

    /// The range end set by [`Query::date_range`].
    pub fn end_time(&self) -> Option<&Literal> {
        self.end_time.as_ref()
    }

    pub fn group_columns(&self) -> &[String] {
        &self.group_by
    }

    pub fn time_bucket(&self) -> Option<&TimeBucket> {
        self.group_by_time.as_ref()
    }

    pub fn fills(&self) -> bool {
        self.fill
    }

    pub fn target_series(&self) -> Option<&str> {
        self.into_series.as_deref()
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }
}
