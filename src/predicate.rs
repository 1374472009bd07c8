//! WHERE clause encoding from `field__comparator` keys.
//!
//! | Key            | Clause        |
//! |----------------|---------------|
//! | `a`            | `a = v`       |
//! | `a__gt`        | `a > v`       |
//! | `a__b__lt`     | `a.b < v`     |
//! | `a__b`         | `a.b = v`     |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Literal;

/// Separator between path segments and the comparator in a filter key.
pub const SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparator {
    /// Map a key suffix (`gt`, `lte`, ...) to a comparator.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "eq" => Some(Comparator::Eq),
            "ne" => Some(Comparator::Ne),
            "gt" => Some(Comparator::Gt),
            "gte" => Some(Comparator::Gte),
            "lt" => Some(Comparator::Lt),
            "lte" => Some(Comparator::Lte),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Gt => "gt",
            Comparator::Gte => "gte",
            Comparator::Lt => "lt",
            Comparator::Lte => "lte",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
        }
    }
}

/// Build the filter key for `field` compared with `comparator`.
pub fn filter_key(field: &str, comparator: Comparator) -> String {
    format!("{}{}{}", field, SEPARATOR, comparator.suffix())
}

/// A single comparison, borrowed from a filter map entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'a> {
    pub path: Vec<&'a str>,
    pub comparator: Comparator,
    pub value: &'a Literal,
}

impl<'a> Predicate<'a> {
    /// Split a filter key into its field path and comparator. A trailing
    /// segment that is not a comparator stays part of the path.
    pub fn parse(key: &'a str, value: &'a Literal) -> Self {
        let mut path: Vec<&str> = key.split(SEPARATOR).collect();
        let comparator = match path.last().and_then(|s| Comparator::from_suffix(s)) {
            Some(c) if path.len() > 1 => {
                path.pop();
                c
            }
            _ => Comparator::Eq,
        };
        Self {
            path,
            comparator,
            value,
        }
    }
}

impl std::fmt::Display for Predicate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.path.join("."),
            self.comparator.symbol(),
            self.value
        )
    }
}

/// Encode every filter as a comparison, in sorted key order, joined by `AND`.
pub fn encode_predicates(filters: &BTreeMap<String, Literal>) -> String {
    filters
        .iter()
        .map(|(key, value)| Predicate::parse(key, value).to_string())
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(pairs: &[(&str, Literal)]) -> String {
        let filters: BTreeMap<String, Literal> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        encode_predicates(&filters)
    }

    #[test]
    fn test_comparators() {
        assert_eq!(encode(&[("col", "hi".into())]), "col = 'hi'");
        assert_eq!(encode(&[("col__eq", 1.into())]), "col = 1");
        assert_eq!(encode(&[("col__ne", false.into())]), "col != false");
        assert_eq!(encode(&[("col__ne", true.into())]), "col != true");
        assert_eq!(encode(&[("col__lt", 1.0.into())]), "col < 1.0");
        assert_eq!(encode(&[("col__lt", 50.into())]), "col < 50");
        assert_eq!(encode(&[("col__gt", 1.0.into())]), "col > 1.0");
        assert_eq!(encode(&[("col__gte", 2.into())]), "col >= 2");
        assert_eq!(encode(&[("col__lte", 2.into())]), "col <= 2");
    }

    #[test]
    fn test_dotted_paths() {
        assert_eq!(encode(&[("foo", 4.into())]), "foo = 4");
        assert_eq!(encode(&[("foo__bar", 4.into())]), "foo.bar = 4");
        assert_eq!(encode(&[("foo__bar__lt", 4.into())]), "foo.bar < 4");
        assert_eq!(encode(&[("foo__bar__baz__lt", 4.into())]), "foo.bar.baz < 4");
    }

    #[test]
    fn test_bare_comparator_name_is_a_field() {
        assert_eq!(encode(&[("gt", 4.into())]), "gt = 4");
    }

    #[test]
    fn test_sorted_key_order() {
        let encoded = encode(&[
            ("col4__gt", 7.0.into()),
            ("col2__ne", "b".into()),
            ("col1", "a".into()),
            ("col3__lt", 5.into()),
        ]);
        assert_eq!(encoded, "col1 = 'a' AND col2 != 'b' AND col3 < 5 AND col4 > 7.0");
    }

    #[test]
    fn test_filter_key() {
        assert_eq!(filter_key("time", Comparator::Gt), "time__gt");
        let value = Literal::Int(1);
        let p = Predicate::parse("time__gt", &value);
        assert_eq!(p.path, vec!["time"]);
        assert_eq!(p.comparator, Comparator::Gt);
    }
}
