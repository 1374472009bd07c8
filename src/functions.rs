//! Select expressions and InfluxQL aggregate functions.
//!
//! Functions nest freely and render recursively:
//!
//! ```
//! use influxql::functions::{count, distinct, percentile};
//!
//! assert_eq!(count(distinct("col")).to_string(), "COUNT(DISTINCT(col))");
//! assert_eq!(percentile("d", 99).unwrap().alias("p99").to_string(), "PERCENTILE(d, 99) AS p99");
//! ```
//!
//! See <https://docs.influxdata.com/influxdb/v1/query_language/functions/>.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::value::format_float;

/// Aggregate and selector functions known to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Count,
    Min,
    Max,
    Mean,
    Median,
    Distinct,
    Derivative,
    Sum,
    Stddev,
    First,
    Last,
    Percentile,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 12] = [
        FunctionKind::Count,
        FunctionKind::Min,
        FunctionKind::Max,
        FunctionKind::Mean,
        FunctionKind::Median,
        FunctionKind::Distinct,
        FunctionKind::Derivative,
        FunctionKind::Sum,
        FunctionKind::Stddev,
        FunctionKind::First,
        FunctionKind::Last,
        FunctionKind::Percentile,
    ];

    /// The dialect keyword.
    pub fn identifier(&self) -> &'static str {
        match self {
            FunctionKind::Count => "COUNT",
            FunctionKind::Min => "MIN",
            FunctionKind::Max => "MAX",
            FunctionKind::Mean => "MEAN",
            FunctionKind::Median => "MEDIAN",
            FunctionKind::Distinct => "DISTINCT",
            FunctionKind::Derivative => "DERIVATIVE",
            FunctionKind::Sum => "SUM",
            FunctionKind::Stddev => "STDDEV",
            FunctionKind::First => "FIRST",
            FunctionKind::Last => "LAST",
            FunctionKind::Percentile => "PERCENTILE",
        }
    }

    /// Exact number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            FunctionKind::Percentile => 2,
            _ => 1,
        }
    }

    /// Look a function up by keyword, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.identifier().eq_ignore_ascii_case(name))
    }

    fn validate(&self, args: &[Arg]) -> QueryResult<()> {
        if args.len() != self.arity() {
            return Err(QueryError::count(self.identifier(), self.arity(), args.len()));
        }

        if let FunctionKind::Percentile = self {
            let n = match &args[1] {
                Arg::Int(n) => *n as f64,
                Arg::Float(n) => *n,
                _ => {
                    return Err(QueryError::ArgumentType {
                        function: self.identifier(),
                        position: 2,
                        expected: "an int or float",
                    });
                }
            };
            if !(n > 0.0 && n < 100.0) {
                return Err(QueryError::ArgumentRange {
                    function: self.identifier(),
                    value: args[1].to_string(),
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for FunctionKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| QueryError::parse(0, format!("Unknown function: '{}'", s)))
    }
}

/// A function argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    /// A field name or raw text, written verbatim.
    Field(String),
    Int(i64),
    Float(f64),
    /// A nested function call.
    Function(Box<Function>),
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Field(s) => write!(f, "{}", s),
            Arg::Int(n) => write!(f, "{}", n),
            Arg::Float(n) => write!(f, "{}", format_float(*n)),
            Arg::Function(func) => write!(f, "{}", func),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Field(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Field(s)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(n as i64)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Float(n)
    }
}

impl From<Function> for Arg {
    fn from(func: Function) -> Self {
        Arg::Function(Box::new(func))
    }
}

/// A function call, e.g. `SUM(COUNT(a)) AS total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    kind: FunctionKind,
    args: Vec<Arg>,
    alias: Option<String>,
}

impl Function {
    /// Build a function call, checking the argument count and types.
    pub fn new(kind: FunctionKind, args: Vec<Arg>) -> QueryResult<Self> {
        kind.validate(&args)?;
        Ok(Self {
            kind,
            args,
            alias: None,
        })
    }

    /// Add alias (AS name)
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn unary(kind: FunctionKind, arg: Arg) -> Self {
        Self {
            kind,
            args: vec![arg],
            alias: None,
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.kind, args.join(", "))?;
        write_alias(f, self.alias.as_deref())
    }
}

/// A wrapped value with an optional alias, e.g. `value AS v`.
///
/// A wrapped expression is written as-is without parentheses, so
/// `Expression::new(Expression::new("a").alias("b")).alias("c")` renders
/// as `a AS b AS c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    value: Box<Expr>,
    alias: Option<String>,
}

impl Expression {
    pub fn new(value: impl Into<Expr>) -> Self {
        Self {
            value: Box::new(value.into()),
            alias: None,
        }
    }

    /// Add alias (AS name)
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    pub fn value(&self) -> &Expr {
        &self.value
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)?;
        write_alias(f, self.alias.as_deref())
    }
}

fn write_alias(f: &mut std::fmt::Formatter<'_>, alias: Option<&str>) -> std::fmt::Result {
    match alias {
        Some(a) => write!(f, " AS {}", a),
        None => Ok(()),
    }
}

/// An entry in a SELECT list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column name or raw text (`*`, `value`, `1 + 1`), written verbatim.
    Raw(String),
    Expression(Expression),
    Function(Function),
}

impl Expr {
    /// Attach an alias, wrapping raw text in an [`Expression`] if needed.
    pub fn alias(self, name: impl Into<String>) -> Expr {
        match self {
            Expr::Raw(s) => Expr::Expression(Expression::new(Expr::Raw(s)).alias(name)),
            Expr::Expression(e) => Expr::Expression(e.alias(name)),
            Expr::Function(func) => Expr::Function(func.alias(name)),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Raw(s) => write!(f, "{}", s),
            Expr::Expression(e) => write!(f, "{}", e),
            Expr::Function(func) => write!(f, "{}", func),
        }
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Raw(s.to_string())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Raw(s)
    }
}

impl From<Expression> for Expr {
    fn from(e: Expression) -> Self {
        Expr::Expression(e)
    }
}

impl From<Function> for Expr {
    fn from(func: Function) -> Self {
        Expr::Function(func)
    }
}

/// COUNT(arg)
pub fn count(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Count, arg.into())
}

/// MIN(arg)
pub fn min(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Min, arg.into())
}

/// MAX(arg)
pub fn max(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Max, arg.into())
}

/// MEAN(arg)
pub fn mean(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Mean, arg.into())
}

/// MEDIAN(arg)
pub fn median(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Median, arg.into())
}

/// DISTINCT(arg)
pub fn distinct(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Distinct, arg.into())
}

/// DERIVATIVE(arg)
pub fn derivative(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Derivative, arg.into())
}

/// SUM(arg)
pub fn sum(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Sum, arg.into())
}

/// STDDEV(arg)
pub fn stddev(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Stddev, arg.into())
}

/// FIRST(arg)
pub fn first(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::First, arg.into())
}

/// LAST(arg)
pub fn last(arg: impl Into<Arg>) -> Function {
    Function::unary(FunctionKind::Last, arg.into())
}

/// PERCENTILE(arg, n), with `n` strictly between 0 and 100.
pub fn percentile(arg: impl Into<Arg>, n: impl Into<Arg>) -> QueryResult<Function> {
    Function::new(FunctionKind::Percentile, vec![arg.into(), n.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_expression() {
        assert_eq!(Expression::new("hi").to_string(), "hi");
        assert_eq!(Expression::new("hi").alias("x").to_string(), "hi AS x");
        assert_eq!(Expression::new(count("a")).alias("n").to_string(), "COUNT(a) AS n");
    }

    #[test]
    fn test_nested_expression_is_not_parenthesized() {
        let inner = Expression::new("a").alias("b");
        assert_eq!(Expression::new(inner).alias("c").to_string(), "a AS b AS c");
    }

    #[test]
    fn test_format_args() {
        let f = Function::new(FunctionKind::Count, vec![Arg::Int(1)]).unwrap();
        assert_eq!(f.to_string(), "COUNT(1)");
        assert_eq!(count("hi").to_string(), "COUNT(hi)");
        assert_eq!(count(count("hi")).to_string(), "COUNT(COUNT(hi))");
        assert_eq!(count(count("hi")).alias("x").to_string(), "COUNT(COUNT(hi)) AS x");
    }

    #[test]
    fn test_single_argument_functions() {
        let cases = [
            (count("col"), "COUNT(col)"),
            (sum("col"), "SUM(col)"),
            (min("col"), "MIN(col)"),
            (max("col"), "MAX(col)"),
            (mean("col"), "MEAN(col)"),
            (median("col"), "MEDIAN(col)"),
            (derivative("col"), "DERIVATIVE(col)"),
            (distinct("col"), "DISTINCT(col)"),
            (stddev("col"), "STDDEV(col)"),
            (first("col"), "FIRST(col)"),
            (last("col"), "LAST(col)"),
        ];
        for (func, expected) in cases {
            assert_eq!(func.to_string(), expected);
        }
    }

    #[test]
    fn test_single_argument_arity() {
        let err = Function::new(FunctionKind::Sum, vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(err, QueryError::ArgumentCount { expected: 1, got: 2, .. }));
        assert!(Function::new(FunctionKind::Mean, vec![]).is_err());
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile("col", 99).unwrap().to_string(), "PERCENTILE(col, 99)");
        assert_eq!(percentile("col", 99.0).unwrap().to_string(), "PERCENTILE(col, 99.0)");
    }

    #[test]
    fn test_percentile_fails_missing_args() {
        let err = Function::new(FunctionKind::Percentile, vec!["col".into()]).unwrap_err();
        assert!(matches!(err, QueryError::ArgumentCount { .. }));
    }

    #[test]
    fn test_percentile_fails_invalid_args() {
        let err = percentile("col", "s").unwrap_err();
        assert!(matches!(err, QueryError::ArgumentType { position: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_percentile_fails_extra_args() {
        let args = vec!["col".into(), "s".into(), 1.into()];
        let err = Function::new(FunctionKind::Percentile, args).unwrap_err();
        assert!(matches!(err, QueryError::ArgumentCount { expected: 2, got: 3, .. }));
    }

    #[test]
    fn test_percentile_fails_out_of_range() {
        assert!(matches!(percentile("col", 0), Err(QueryError::ArgumentRange { .. })));
        assert!(matches!(percentile("col", 100), Err(QueryError::ArgumentRange { .. })));
        assert!(matches!(percentile("col", 100.0), Err(QueryError::ArgumentRange { .. })));
        assert!(matches!(percentile("col", f64::NAN), Err(QueryError::ArgumentRange { .. })));
        assert!(percentile("col", 0.5).is_ok());
    }

    #[test]
    fn test_composed_functions_format() {
        let composed = sum(count(min(max(mean(median(derivative(distinct(stddev(first(
            last(percentile("a", 99).unwrap()),
        ))))))))));
        assert_eq!(
            composed.to_string(),
            "SUM(COUNT(MIN(MAX(MEAN(MEDIAN(DERIVATIVE(DISTINCT(STDDEV(FIRST(LAST(PERCENTILE(a, 99))))))))))))"
        );
    }

    #[test]
    fn test_function_registry() {
        assert_eq!(FunctionKind::from_name("count"), Some(FunctionKind::Count));
        assert_eq!(FunctionKind::from_name("PERCENTILE"), Some(FunctionKind::Percentile));
        assert_eq!(FunctionKind::from_name("avg"), None);
        assert!("nope".parse::<FunctionKind>().is_err());
        assert_eq!(FunctionKind::Percentile.arity(), 2);
        assert_eq!(FunctionKind::Last.arity(), 1);
    }

    #[test]
    fn test_expr_alias() {
        assert_eq!(Expr::from("value").alias("v").to_string(), "value AS v");
        assert_eq!(Expr::from(max("value")).alias("m").to_string(), "MAX(value) AS m");
    }
}
