//! Blocking HTTP test client for exercising endpoints from a test suite.
//!
//! # Overview
//! A `Client` is pointed at one host and remembers default headers, a
//! default query and a timeout. Each call resolves the target URL, merges
//! headers, picks a body encoding (JSON, form or multipart) and hands the
//! assembled `HttpRequest` to a `Transport`. The raw answer is adapted into a
//! `Response` with the status code, headers, a parsed JSON or raw body, and a
//! decoded text view.
//!
//! # Design
//! - The client never touches the network itself. `UreqTransport` is the
//!   default transport; anything implementing `Transport` can replace it.
//! - Requests are plain data until the transport encodes them, so tests can
//!   assert on what would be sent without a server.
//! - Upload handles are owned values and are released on every exit path.

pub mod client;
pub mod error;
pub mod headers;
pub mod http;
pub mod query;
pub mod response;
pub mod transport;
pub mod upload;
pub mod uri;

pub use client::{Client, ClientOptions, RequestOptions, DEFAULT_TIMEOUT, USER_AGENT};
pub use error::ClientError;
pub use headers::Headers;
pub use crate::http::{EncodedBody, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use query::Query;
pub use response::{Body, Response};
pub use transport::{Transport, UreqTransport};
pub use upload::{FilePart, Multipart, Upload};
pub use uri::{Host, Uri};
