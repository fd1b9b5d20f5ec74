//! Case-insensitive header mapping shared by requests and responses.

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::ClientError;

/// Header mapping with case-insensitive names where the last write wins.
///
/// Thin wrapper over `http::HeaderMap` exposing string-keyed access, which is
/// all a test suite asserting on headers needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, later pairs overriding earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.insert(name.as_ref(), value.as_ref())?;
        }
        Ok(headers)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = header_name(name).ok()?;
        self.inner.get(&name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = header_name(name)?;
        let value =
            HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(format!("{name}: {value}")))?;
        self.inner.insert(name, value);
        Ok(())
    }

    /// Remove `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = header_name(name).ok()?;
        self.inner
            .remove(&name)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Shallow merge: every header in `other` overrides the one here.
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in &other.inner {
            self.inner.insert(name.clone(), value.clone());
        }
    }

    /// Iterate `(name, value)` pairs; names are lowercase. Values that are not
    /// visible ASCII are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.inner.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// True when the content-type mentions json anywhere (`application/json`,
    /// `application/vnd.api+json`, ...).
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.inner
    }
}

impl From<HeaderMap> for Headers {
    fn from(inner: HeaderMap) -> Self {
        Self { inner }
    }
}

fn header_name(name: &str) -> Result<HeaderName, ClientError> {
    HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
        .map_err(|_| ClientError::InvalidHeader(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json").unwrap();
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn last_write_wins() {
        let mut headers = Headers::new();
        headers.insert("x-thing", "one").unwrap();
        headers.insert("X-Thing", "two").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-thing"), Some("two"));
    }

    #[test]
    fn remove_missing_is_none() {
        let mut headers = Headers::new();
        assert_eq!(headers.remove("authorization"), None);
        headers.insert("authorization", "Bearer t").unwrap();
        assert_eq!(headers.remove("Authorization").as_deref(), Some("Bearer t"));
        assert!(!headers.contains("authorization"));
    }

    #[test]
    fn extend_overrides_shared_names_only() {
        let mut base = Headers::from_pairs([("a", "1"), ("b", "2")]).unwrap();
        let over = Headers::from_pairs([("B", "20"), ("c", "30")]).unwrap();
        base.extend(&over);
        assert_eq!(base.get("a"), Some("1"));
        assert_eq!(base.get("b"), Some("20"));
        assert_eq!(base.get("c"), Some("30"));
    }

    #[test]
    fn json_detection() {
        let plain = Headers::from_pairs([("content-type", "text/html")]).unwrap();
        let json = Headers::from_pairs([("content-type", "Application/JSON; charset=utf-8")]).unwrap();
        let vendor = Headers::from_pairs([("content-type", "application/vnd.api+json")]).unwrap();
        assert!(!plain.is_json());
        assert!(json.is_json());
        assert!(vendor.is_json());
        assert!(!Headers::new().is_json());
    }

    #[test]
    fn invalid_header_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.insert("bad name", "x").unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader(_)));
        let err = headers.insert("ok", "line\nbreak").unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader(_)));
    }
}
