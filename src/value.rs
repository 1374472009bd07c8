//! Literal values and their InfluxQL rendering.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// A literal on the right-hand side of a WHERE comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Text, single-quoted on output. Text wrapped in `/.../` is emitted bare.
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A point in time, normalized to UTC on construction.
    Timestamp(DateTime<Utc>),
    /// A regular expression, emitted bare between slashes.
    Regex(String),
}

impl Literal {
    /// A regex literal from its pattern, without the surrounding slashes.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Literal::Regex(pattern.into())
    }

    /// Order two literals of the same kind; ints and floats compare with each
    /// other. Mixed kinds and NaN have no ordering.
    pub fn compare(&self, other: &Literal) -> Option<Ordering> {
        match (self, other) {
            (Literal::Int(a), Literal::Int(b)) => Some(a.cmp(b)),
            (Literal::Float(a), Literal::Float(b)) => a.partial_cmp(b),
            (Literal::Int(a), Literal::Float(b)) => (*a as f64).partial_cmp(b),
            (Literal::Float(a), Literal::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Literal::Timestamp(a), Literal::Timestamp(b)) => Some(a.cmp(b)),
            (Literal::Text(a), Literal::Text(b)) => Some(a.cmp(b)),
            (Literal::Bool(a), Literal::Bool(b)) => Some(a.cmp(b)),
            (Literal::Regex(a), Literal::Regex(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// False for NaN and infinite floats, which have no InfluxQL spelling.
    pub fn is_finite(&self) -> bool {
        match self {
            Literal::Float(n) => n.is_finite(),
            _ => true,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Text(s) if is_regex(s) => write!(f, "{}", s),
            Literal::Text(s) => write!(f, "'{}'", s),
            Literal::Bool(b) => write!(f, "{}", format_boolean(*b)),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", format_float(*n)),
            Literal::Timestamp(ts) => write!(f, "'{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f")),
            Literal::Regex(pattern) => write!(f, "/{}/", pattern),
        }
    }
}

/// Positional float notation, keeping a trailing `.0` on whole values.
pub(crate) fn format_float(n: f64) -> String {
    let text = n.to_string();
    if n.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Whether `text` is written as a regex literal (`/.../`).
pub fn is_regex(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('/') && text.ends_with('/')
}

pub fn format_boolean(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Render a single literal in InfluxQL syntax.
pub fn format_value(value: &Literal) -> String {
    value.to_string()
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Int(n as i64)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<u32> for Literal {
    fn from(n: u32) -> Self {
        Literal::Int(n as i64)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Float(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Literal {
    fn from(ts: DateTime<Tz>) -> Self {
        Literal::Timestamp(ts.with_timezone(&Utc))
    }
}

/// Naive timestamps carry no offset and are taken as UTC.
impl From<NaiveDateTime> for Literal {
    fn from(ts: NaiveDateTime) -> Self {
        Literal::Timestamp(ts.and_utc())
    }
}

impl TryFrom<serde_json::Value> for Literal {
    type Error = QueryError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(Literal::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Literal::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Literal::Float(f))
                } else {
                    Err(QueryError::UnsupportedLiteral(n.to_string()))
                }
            }
            Value::String(s) => Ok(Literal::Text(s)),
            other @ (Value::Null | Value::Array(_) | Value::Object(_)) => {
                Err(QueryError::UnsupportedLiteral(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn naive(ms_micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 2, 10)
            .unwrap()
            .and_hms_micro_opt(18, 4, 53, ms_micros)
            .unwrap()
    }

    #[test]
    fn test_format_text() {
        assert_eq!(format_value(&"hello".into()), "'hello'");
        assert_eq!(format_value(&"/stats.*/".into()), "/stats.*/");
        assert_eq!(format_value(&Literal::regex("stats.*")), "/stats.*/");
        // A lone slash is not a regex.
        assert_eq!(format_value(&"/".into()), "'/'");
    }

    #[test]
    fn test_format_numbers_and_booleans() {
        assert_eq!(format_value(&1.into()), "1");
        assert_eq!(format_value(&1.0.into()), "1.0");
        assert_eq!(format_value(&7.5.into()), "7.5");
        assert_eq!(format_value(&(-3i64).into()), "-3");
        assert_eq!(format_value(&true.into()), "true");
        assert_eq!(format_value(&false.into()), "false");
    }

    #[test]
    fn test_format_timestamp_truncates_to_millis() {
        assert_eq!(
            format_value(&naive(834825).into()),
            "'2014-02-10 18:04:53.834'"
        );
    }

    #[test]
    fn test_format_timestamp_converts_to_utc() {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let ts = eastern.from_local_datetime(&naive(834825)).unwrap();
        assert_eq!(format_value(&ts.into()), "'2014-02-10 23:04:53.834'");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Literal::try_from(serde_json::json!(4)).unwrap(), Literal::Int(4));
        assert_eq!(
            Literal::try_from(serde_json::json!(4.5)).unwrap(),
            Literal::Float(4.5)
        );
        assert_eq!(
            Literal::try_from(serde_json::json!("a")).unwrap(),
            Literal::Text("a".into())
        );
        let err = Literal::try_from(serde_json::json!(null)).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedLiteral(_)));
        assert!(Literal::try_from(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_compare() {
        assert_eq!(Literal::Int(20).compare(&Literal::Int(40)), Some(Ordering::Less));
        assert_eq!(
            Literal::Float(2.5).compare(&Literal::Int(2)),
            Some(Ordering::Greater)
        );
        assert_eq!(Literal::Int(1).compare(&Literal::Text("a".into())), None);
    }

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(Literal::Bool(true).compare(&Literal::Bool(true)), Some(Ordering::Equal));
        assert_eq!(Literal::Bool(false).compare(&Literal::Bool(true)), Some(Ordering::Less));
        assert_eq!(
            Literal::regex("a.*").compare(&Literal::regex("a.*")),
            Some(Ordering::Equal)
        );
        assert_eq!(Literal::regex("a").compare(&Literal::Text("a".into())), None);
    }

    #[test]
    fn test_format_float_positional() {
        assert_eq!(format_value(&1e21.into()), "1000000000000000000000.0");
        assert_eq!(format_value(&1e-7.into()), "0.0000001");
        assert!(!Literal::Float(f64::NAN).is_finite());
        assert!(!Literal::Float(f64::INFINITY).is_finite());
        assert!(Literal::Float(2.5).is_finite());
        assert!(Literal::Int(3).is_finite());
    }
}
