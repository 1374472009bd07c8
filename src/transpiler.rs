//! InfluxQL transpiler for the query builder.
//!
//! Converts builder state into statement text. Clauses are rendered
//! independently, joined with single spaces and terminated with `;`.

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::predicate::encode_predicates;
use crate::query::Query;
use crate::value::is_regex;

/// Trait for converting builder state to InfluxQL.
pub trait ToInfluxQl {
    /// Convert this node to an InfluxQL statement.
    fn to_influxql(&self) -> QueryResult<String>;
}

impl ToInfluxQl for Query {
    fn to_influxql(&self) -> QueryResult<String> {
        let measurement = self
            .measurement()
            .filter(|m| !m.trim().is_empty())
            .ok_or(QueryError::MissingSource)?;
        if let Some(bad) = self.filter_map().values().find(|v| !v.is_finite()) {
            return Err(QueryError::UnsupportedLiteral(bad.to_string()));
        }
        let statement = self.render(Some(measurement));
        debug!(statement = %statement, "rendered query");
        Ok(statement)
    }
}

/// Renders whatever state is present; a missing source drops the FROM
/// clause. Use [`ToInfluxQl::to_influxql`] to require one.
impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(self.measurement()))
    }
}

impl Query {
    fn render(&self, measurement: Option<&str>) -> String {
        if self.is_delete() {
            self.to_delete_influxql(measurement)
        } else {
            self.to_select_influxql(measurement)
        }
    }

    /// Generate a DELETE statement.
    fn to_delete_influxql(&self, measurement: Option<&str>) -> String {
        let clauses = [
            "DELETE".to_string(),
            from_clause(measurement),
            self.where_clause(),
        ];
        finish_statement(&clauses)
    }

    /// Generate a SELECT statement.
    fn to_select_influxql(&self, measurement: Option<&str>) -> String {
        let clauses = [
            self.select_clause(),
            from_clause(measurement),
            self.where_clause(),
            self.group_by_clause(),
            self.limit_clause(),
            self.into_clause(),
            self.order_clause(),
        ];
        finish_statement(&clauses)
    }

    pub(crate) fn select_clause(&self) -> String {
        let fields: Vec<String> = self.fields().iter().map(|e| e.to_string()).collect();
        format!("SELECT {}", fields.join(", "))
    }

    pub(crate) fn where_clause(&self) -> String {
        if self.filter_map().is_empty() {
            return String::new();
        }
        format!("WHERE {}", encode_predicates(self.filter_map()))
    }

    pub(crate) fn group_by_clause(&self) -> String {
        if self.group_columns().is_empty() && self.time_bucket().is_none() {
            return String::new();
        }

        let mut groups: Vec<String> = Vec::with_capacity(self.group_columns().len() + 1);
        if let Some(bucket) = self.time_bucket() {
            groups.push(format!("time({})", bucket));
        }
        groups.extend(self.group_columns().iter().cloned());

        let mut clause = format!("GROUP BY {}", groups.join(", "));
        if self.fills() {
            clause.push_str(" fill(0)");
        }
        clause
    }

    pub(crate) fn limit_clause(&self) -> String {
        match self.row_limit() {
            Some(n) if n > 0 => format!("LIMIT {}", n),
            _ => String::new(),
        }
    }

    pub(crate) fn into_clause(&self) -> String {
        match self.target_series() {
            Some(series) => format!("INTO {}", series),
            None => String::new(),
        }
    }

    pub(crate) fn order_clause(&self) -> String {
        match self.ordering() {
            Some(order) => format!("ORDER BY {} {}", order.field, order.direction),
            None => String::new(),
        }
    }
}

pub(crate) fn from_clause(measurement: Option<&str>) -> String {
    match measurement {
        Some(m) => format!("FROM {}", format_measurement(m)),
        None => String::new(),
    }
}

/// Double-quote a measurement name containing spaces or hyphens, unless it
/// is a `/regex/`.
pub fn format_measurement(measurement: &str) -> String {
    let enquote = !is_regex(measurement) && (measurement.contains(' ') || measurement.contains('-'));
    if enquote {
        format!("\"{}\"", measurement)
    } else {
        measurement.to_string()
    }
}

/// Join clauses, collapse runs of spaces and terminate with `;`.
pub(crate) fn finish_statement(clauses: &[String]) -> String {
    let joined = clauses.join(" ");
    let collapsed: Vec<&str> = joined.split(' ').filter(|s| !s.is_empty()).collect();
    format!("{};", collapsed.join(" "))
}
