//! Request targets and the host they are resolved against.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::ClientError;
use crate::query::Query;

static HAS_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+://\S").expect("static pattern"));

/// What a request is aimed at: a path (optionally with an inline query
/// string), a full URL, or a list of path segments joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uri {
    Raw(String),
    Segments(Vec<String>),
}

impl Uri {
    /// The target as a single string. Segments are joined with `/` after
    /// trimming their own slashes, and empty segments are skipped.
    pub fn as_path(&self) -> Cow<'_, str> {
        match self {
            Uri::Raw(raw) => Cow::Borrowed(raw.as_str()),
            Uri::Segments(segments) => {
                let joined = segments
                    .iter()
                    .map(|s| s.trim_matches('/'))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("/");
                Cow::Owned(joined)
            }
        }
    }
}

impl From<&str> for Uri {
    fn from(raw: &str) -> Self {
        Uri::Raw(raw.to_string())
    }
}

impl From<String> for Uri {
    fn from(raw: String) -> Self {
        Uri::Raw(raw)
    }
}

impl From<&String> for Uri {
    fn from(raw: &String) -> Self {
        Uri::Raw(raw.clone())
    }
}

impl From<Vec<String>> for Uri {
    fn from(segments: Vec<String>) -> Self {
        Uri::Segments(segments)
    }
}

impl From<Vec<&str>> for Uri {
    fn from(segments: Vec<&str>) -> Self {
        Uri::Segments(segments.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Uri {
    fn from(segments: [&str; N]) -> Self {
        Uri::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

/// The base every relative request is joined onto.
///
/// Only the origin (`scheme://host[:port]`) of the configured host is kept; a
/// host without a scheme is taken to be `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    root: String,
}

impl Host {
    pub fn parse(host: &str) -> Result<Self, ClientError> {
        let host = host.trim();
        let candidate = if has_scheme(host) {
            Cow::Borrowed(host)
        } else {
            Cow::Owned(format!("http://{host}"))
        };
        let url = Url::parse(&candidate).map_err(|_| ClientError::InvalidHost(host.to_string()))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(ClientError::InvalidHost(host.to_string()));
        }
        Ok(Self {
            root: origin.ascii_serialization(),
        })
    }

    /// `scheme://host[:port]` with no trailing slash.
    pub fn root(&self) -> &str {
        &self.root
    }
}

/// True when `uri` already carries a scheme (`something://x`).
pub fn has_scheme(uri: &str) -> bool {
    HAS_SCHEME.is_match(uri)
}

/// Resolve `uri` against `root`, appending `query` to any inline query string.
///
/// A `uri` that already has a scheme is returned untouched.
pub fn fetch_url(root: &str, uri: &Uri, query: &Query) -> String {
    let target = uri.as_path();
    if has_scheme(&target) {
        return target.into_owned();
    }

    let base = root.trim_end_matches('/');
    let (path, mut query_str) = match target.split_once('?') {
        Some((path, inline)) => (path, inline.to_string()),
        None => (&*target, String::new()),
    };
    let path = path.trim_start_matches('/');

    if !query.is_empty() {
        if !query_str.is_empty() {
            query_str.push('&');
        }
        query_str.push_str(&query.encode());
    }

    if query_str.is_empty() {
        format!("{base}/{path}")
    } else {
        format!("{base}/{path}?{query_str}")
    }
}
