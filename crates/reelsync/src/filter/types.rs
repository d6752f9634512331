use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single value from a flat query.
///
/// Mirrors the loosely typed values a query string or JSON body carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl QueryValue {
    /// Truthiness as the range pass sees it.
    ///
    /// `Null`, `false`, `0`, `0.0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// The text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An insertion-ordered flat query: `key -> value`.
///
/// Keys that were never inserted are "undefined". Re-inserting a key replaces
/// its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatQuery {
    entries: Vec<(String, QueryValue)>,
}

impl FlatQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when `value` is `Some`.
    pub fn insert_opt<V: Into<QueryValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for FlatQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

/// Field roles for one query type.
///
/// These are configuration supplied by the caller per query, not data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Fields matched by equality.
    pub exact_fields: BTreeSet<String>,
    /// Fields never turned into conditions.
    pub exclude_fields: BTreeSet<String>,
    /// Fields matched by case-insensitive substring.
    pub non_exact_fields: BTreeSet<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exact<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exact_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn non_exact<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_exact_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }
}

/// One classified condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// `field = value`.
    Eq { field: String, value: QueryValue },
    /// Case-insensitive substring match.
    Contains { field: String, text: String },
    /// Inclusive range; at least one bound is present.
    Range {
        field: String,
        gte: Option<QueryValue>,
        lte: Option<QueryValue>,
    },
}

impl FilterCondition {
    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::Contains { field, .. } | Self::Range { field, .. } => {
                field
            }
        }
    }
}

/// Conditions combined with logical AND. Empty means "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<FilterCondition>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness_matches_loose_query_semantics() {
        assert!(!QueryValue::Null.is_truthy());
        assert!(!QueryValue::Bool(false).is_truthy());
        assert!(!QueryValue::Int(0).is_truthy());
        assert!(!QueryValue::Float(0.0).is_truthy());
        assert!(!QueryValue::Float(f64::NAN).is_truthy());
        assert!(!QueryValue::from("").is_truthy());

        assert!(QueryValue::Int(-1).is_truthy());
        assert!(QueryValue::Float(0.5).is_truthy());
        assert!(QueryValue::from("0").is_truthy());
        assert!(QueryValue::Bool(true).is_truthy());
    }

    #[test]
    fn test_flat_query_insert_replaces_in_place() {
        let mut query = FlatQuery::new().with("a", 1).with("b", 2);
        query.insert("a", "changed");

        let keys: Vec<&str> = query.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(query.get("a"), Some(&QueryValue::from("changed")));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_flat_query_insert_opt_skips_none() {
        let mut query = FlatQuery::new();
        query.insert_opt::<i64>("page", None);
        query.insert_opt("limit", Some(5i64));
        assert!(query.get("page").is_none());
        assert_eq!(query.get("limit"), Some(&QueryValue::Int(5)));
    }

    #[test]
    fn test_query_value_deserializes_untagged() {
        let values: Vec<QueryValue> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).expect("valid json");
        assert_eq!(
            values,
            vec![
                QueryValue::Null,
                QueryValue::Bool(true),
                QueryValue::Int(3),
                QueryValue::Float(2.5),
                QueryValue::from("x"),
            ]
        );
    }

    #[test]
    fn test_query_options_builders_accumulate() {
        let options = QueryOptions::new()
            .exact(["id"])
            .non_exact(["name", "overview"])
            .exclude(["secret"]);
        assert!(options.exact_fields.contains("id"));
        assert_eq!(options.non_exact_fields.len(), 2);
        assert!(options.exclude_fields.contains("secret"));
    }
}
