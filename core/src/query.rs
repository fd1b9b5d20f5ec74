//! Query parameters merged into every request URL.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Query mapping from key to one or more values.
///
/// Keys iterate in sorted order so encoded query strings are stable across
/// runs. A key with several values encodes as repeated `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Query {
    params: BTreeMap<String, Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Query::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to a single value, replacing whatever was there.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.insert(key.into(), vec![value.to_string()]);
    }

    /// Add another value under `key`, keeping existing ones.
    pub fn append(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.entry(key.into()).or_default().push(value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.params.remove(key)
    }

    /// Merge `other` into this query; keys present in both take `other`'s values.
    pub fn extend(&mut self, other: &Query) {
        for (key, values) in &other.params {
            self.params.insert(key.clone(), values.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `application/x-www-form-urlencoded` rendering, without a leading `?`.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.params {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

impl From<BTreeMap<String, Value>> for Query {
    fn from(map: BTreeMap<String, Value>) -> Self {
        let params = map
            .into_iter()
            .map(|(key, value)| {
                let values = match value {
                    Value::Array(items) => items.into_iter().map(scalar_text).collect(),
                    other => vec![scalar_text(other)],
                };
                (key, values)
            })
            .collect();
        Self { params }
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_key_order() {
        let query = Query::new().with("zeta", 1).with("alpha", "two");
        assert_eq!(query.encode(), "alpha=two&zeta=1");
    }

    #[test]
    fn multi_values_repeat_the_key() {
        let mut query = Query::new();
        query.append("id", 1);
        query.append("id", 2);
        assert_eq!(query.encode(), "id=1&id=2");
    }

    #[test]
    fn escapes_reserved_characters() {
        let query = Query::new().with("q", "a b&c=d");
        assert_eq!(query.encode(), "q=a+b%26c%3Dd");
    }

    #[test]
    fn extend_replaces_per_key() {
        let mut base = Query::new().with("a", 1).with("b", 1);
        base.extend(&Query::new().with("b", 2).with("c", 3));
        assert_eq!(base.encode(), "a=1&b=2&c=3");
    }

    #[test]
    fn deserializes_scalars_and_lists() {
        let query: Query = serde_json::from_str(r#"{"n":5,"flag":true,"tags":["x","y"],"s":"str"}"#).unwrap();
        assert_eq!(query.get("n"), Some(&["5".to_string()][..]));
        assert_eq!(query.get("flag"), Some(&["true".to_string()][..]));
        assert_eq!(query.encode(), "flag=true&n=5&s=str&tags=x&tags=y");
    }
}
