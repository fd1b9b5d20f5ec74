//! The test client every verb funnels through.
//!
//! # Design
//! `Client` is a configuration holder: base host, default headers, default
//! query and timeout, plus the last response it produced. Each verb builds an
//! `HttpRequest` from that configuration and the call's own arguments, hands
//! it to the `Transport`, and adapts the answer into a `Response`. Nothing is
//! retried and nothing is swallowed; an error from any step is returned as-is.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::ClientError;
use crate::headers::Headers;
use crate::http::{form_fields, HttpMethod, HttpRequest, RequestBody};
use crate::query::Query;
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};
use crate::upload::{self, FilePart, Multipart, Upload};
use crate::uri::{self, Host, Uri};

/// Value sent in `user-agent` unless overridden.
pub const USER_AGENT: &str = "Endpoints client";

/// Applied to every request that does not set its own timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JSON_CONTENT_TYPE: &str = "application/json";

/// Construction options for [`Client`].
///
/// Deserializable so a suite can keep its client setup in a fixture file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Default the content-type to `application/json`.
    pub json: bool,
    /// Merged over the built-in default headers.
    pub headers: BTreeMap<String, String>,
    /// Merged into every request's query string.
    pub query: Query,
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            json: false,
            headers: BTreeMap::new(),
            query: Query::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ClientOptions {
    pub fn json() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }
}

/// Per-call options: extra headers, extra query, a timeout override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Headers,
    pub query: Query,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        self.headers.insert(name, value)?;
        Ok(self)
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A generic test client that makes requests against one host.
#[derive(Debug)]
pub struct Client {
    host: Host,
    headers: Headers,
    query: Query,
    timeout: Duration,
    transport: Box<dyn Transport>,
    response: Option<Response>,
}

impl Client {
    /// Client for `host` using the default `ureq` transport.
    pub fn new(host: &str, options: ClientOptions) -> Result<Self, ClientError> {
        Self::with_transport(host, options, UreqTransport)
    }

    pub fn with_transport<T>(host: &str, options: ClientOptions, transport: T) -> Result<Self, ClientError>
    where
        T: Transport + 'static,
    {
        let mut headers = Headers::from_pairs([("x-forwarded-for", "127.0.0.1"), ("user-agent", USER_AGENT)])?;
        if options.json {
            headers.insert("content-type", JSON_CONTENT_TYPE)?;
        }
        for (name, value) in &options.headers {
            headers.insert(name, value)?;
        }

        Ok(Self {
            host: Host::parse(host)?,
            headers,
            query: options.query,
            timeout: Duration::from_secs(options.timeout_secs),
            transport: Box::new(transport),
            response: None,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Default headers sent with every request.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Default query merged into every relative request.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// The response of the most recent successful call.
    pub fn last_response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn get(
        &mut self,
        uri: impl Into<Uri>,
        query: Option<Query>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.fetch(HttpMethod::Get, uri, query, None, options)
    }

    pub fn delete(
        &mut self,
        uri: impl Into<Uri>,
        query: Option<Query>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.fetch(HttpMethod::Delete, uri, query, None, options)
    }

    /// POST `body`. The query string comes from `options.query`.
    pub fn post(
        &mut self,
        uri: impl Into<Uri>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.with_body(HttpMethod::Post, uri, body, options)
    }

    pub fn put(
        &mut self,
        uri: impl Into<Uri>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.with_body(HttpMethod::Put, uri, body, options)
    }

    pub fn patch(
        &mut self,
        uri: impl Into<Uri>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.with_body(HttpMethod::Patch, uri, body, options)
    }

    /// POST `body` and `files` as `multipart/form-data`.
    ///
    /// Paths are opened up front; if one cannot be opened the call fails with
    /// `FileAccess` and nothing is sent. The default content-type is left out
    /// of this request so the multipart boundary can be declared, and is back
    /// in place when the call returns, whatever the outcome.
    pub fn post_file<I, K>(
        &mut self,
        uri: impl Into<Uri>,
        body: Option<Value>,
        files: I,
        options: RequestOptions,
    ) -> Result<Response, ClientError>
    where
        I: IntoIterator<Item = (K, Upload)>,
        K: Into<String>,
    {
        let parts = upload::open_all(files)?;
        debug!(files = parts.len(), "opened uploads");

        let saved = self.headers.remove("content-type");
        let result = self.dispatch(HttpMethod::Post, uri.into(), None, body, parts, options);
        if let Some(content_type) = saved {
            self.headers.insert("content-type", &content_type)?;
        }
        result
    }

    /// The shared path every verb goes through.
    pub fn fetch(
        &mut self,
        method: HttpMethod,
        uri: impl Into<Uri>,
        query: Option<Query>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.dispatch(method, uri.into(), query, body, Vec::new(), options)
    }

    /// Resolve `uri` the way a request would: against the host root, with the
    /// default query and `query` appended. Absolute URIs come back unchanged.
    pub fn fetch_url(&self, uri: &Uri, query: Option<&Query>) -> String {
        let mut merged = self.query.clone();
        if let Some(query) = query {
            merged.extend(query);
        }
        uri::fetch_url(self.host.root(), uri, &merged)
    }

    /// Default headers with `headers` merged over them.
    pub fn fetch_headers(&self, headers: &Headers) -> Headers {
        let mut all = self.headers.clone();
        all.extend(headers);
        all
    }

    /// Send `authorization: Basic ...` for `username:password`.
    pub fn basic_auth(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let credentials = STANDARD.encode(format!("{username}:{password}"));
        self.headers.insert("authorization", &format!("Basic {credentials}"))
    }

    /// Send `authorization: Bearer <token>`.
    pub fn token_auth(&mut self, token: &str) -> Result<(), ClientError> {
        self.headers.insert("authorization", &format!("Bearer {token}"))
    }

    pub fn remove_auth(&mut self) {
        self.headers.remove("authorization");
    }

    /// Set `accept` to `<content-type>;version=<version>`, using whatever
    /// content-type is configured right now (empty if there is none).
    pub fn set_version(&mut self, version: &str) -> Result<(), ClientError> {
        let content_type = self.headers.content_type().unwrap_or_default();
        let accept = format!("{content_type};version={version}");
        self.headers.insert("accept", &accept)
    }

    fn with_body(
        &mut self,
        method: HttpMethod,
        uri: impl Into<Uri>,
        body: Option<Value>,
        mut options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let query = std::mem::take(&mut options.query);
        self.dispatch(method, uri.into(), Some(query), body, Vec::new(), options)
    }

    fn dispatch(
        &mut self,
        method: HttpMethod,
        uri: Uri,
        query: Option<Query>,
        body: Option<Value>,
        files: Vec<FilePart>,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let RequestOptions {
            headers,
            query: mut call_query,
            timeout,
        } = options;
        if let Some(query) = query {
            call_query.extend(&query);
        }

        let url = self.fetch_url(&uri, Some(&call_query));
        let headers = self.fetch_headers(&headers);
        trace!(%url, headers = headers.len(), "assembled request");
        let body = fetch_body(&headers, body, files)?;

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: timeout.unwrap_or(self.timeout),
        };
        debug!(%method, url = %request.url, "sending request");

        let raw = self.transport.send(request).inspect_err(|err| {
            warn!(%method, error = %err, "request failed");
        })?;
        let response = Response::from_raw(raw)?;
        debug!(%method, code = response.code, "received response");

        self.response = Some(response.clone());
        Ok(response)
    }
}

/// Pick the body encoding: multipart when files are attached, JSON when the
/// final content-type says so, form data otherwise. Null and empty bodies
/// count as no body.
fn fetch_body(
    headers: &Headers,
    body: Option<Value>,
    files: Vec<FilePart>,
) -> Result<Option<RequestBody>, ClientError> {
    let body = body.filter(|value| !is_blank(value));
    if !files.is_empty() {
        let fields = match &body {
            Some(value) => form_fields(value)?,
            None => Vec::new(),
        };
        return Ok(Some(RequestBody::Multipart(Multipart { fields, files })));
    }
    Ok(body.map(|value| {
        if headers.is_json() {
            RequestBody::Json(value)
        } else {
            RequestBody::Form(value)
        }
    }))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
