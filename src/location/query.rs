//! Query and parameter values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A query or path parameter value: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

/// Query mapping. Key order is irrelevant for equality and stringification.
pub type Query = BTreeMap<String, QueryValue>;

/// Path parameters extracted by the matcher or supplied by a named target.
pub type Params = BTreeMap<String, QueryValue>;

impl QueryValue {
    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::One(value) => Some(value),
            QueryValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// Iterate over every value in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            QueryValue::One(value) => std::slice::from_ref(value),
            QueryValue::Many(values) => values,
        };
        slice.iter().map(String::as_str)
    }

    /// Append a value, turning a single value into a list.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            QueryValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }

    /// Collapse one-element lists; returns `None` for empty lists.
    pub fn normalized(&self) -> Option<QueryValue> {
        match self {
            QueryValue::One(_) => Some(self.clone()),
            QueryValue::Many(values) => match values.as_slice() {
                [] => None,
                [single] => Some(QueryValue::One(single.clone())),
                _ => Some(self.clone()),
            },
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::One(value) => f.write_str(value),
            QueryValue::Many(values) => f.write_str(&values.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::Many(values.into_iter().map(str::to_string).collect())
    }
}
