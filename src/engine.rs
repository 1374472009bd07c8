//! Execution pass-through for rendered statements.
//!
//! The engine never talks to a database itself: it renders a statement and
//! hands the text to a [`Client`], which owns the transport.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryResult;
use crate::functions::Expr;
use crate::query::Query;
use crate::transpiler::ToInfluxQl;

/// A single point: field name to value.
pub type Point = HashMap<String, serde_json::Value>;

/// Points returned by a client. The engine does not interpret them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    points: Vec<Point>,
}

impl ResultSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Iterate the returned points lazily.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A database client that can run statement text.
pub trait Client {
    /// Run `statement` and collect its points.
    fn query(&self, statement: &str) -> impl Future<Output = QueryResult<ResultSet>> + Send;
}

/// Renders statements and forwards them to a [`Client`].
#[derive(Debug, Clone)]
pub struct Engine<C> {
    client: C,
}

impl<C: Client> Engine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Start a new query seeded with select expressions.
    pub fn query<I>(&self, expressions: I) -> Query
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Query::select(expressions)
    }

    /// Render `statement` and run it on the client.
    pub async fn execute(&self, statement: &impl ToInfluxQl) -> QueryResult<ResultSet> {
        let text = statement.to_influxql()?;
        debug!(statement = %text, "executing statement");
        self.client.query(&text).await
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
