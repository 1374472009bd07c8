//! Continuous query registration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryResult;
use crate::query::Query;
use crate::transpiler::ToInfluxQl;

/// A named query the server re-runs on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousQuery {
    name: String,
    database: String,
    query: Query,
}

impl ContinuousQuery {
    pub fn new(name: impl Into<String>, database: impl Into<String>, query: Query) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            query,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// Renders with whatever the inner query holds, like `Display` for [`Query`].
impl std::fmt::Display for ContinuousQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Every `;` goes, not only the terminator.
        write!(
            f,
            "CREATE CONTINUOUS QUERY \"{}\" ON {} BEGIN {} END",
            self.name,
            self.database,
            self.query.to_string().replace(';', "")
        )
    }
}

impl ToInfluxQl for ContinuousQuery {
    fn to_influxql(&self) -> QueryResult<String> {
        // Only checks the inner query; the text is the same as Display.
        self.query.to_influxql()?;
        let statement = self.to_string();
        debug!(statement = %statement, "rendered continuous query");
        Ok(statement)
    }
}
