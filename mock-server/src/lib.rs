//! Echo server the client's integration tests run against.
//!
//! Every request to `/echo` (or anything under it) is answered with a JSON
//! description of what arrived, so a test can check the exact method, path,
//! query, headers and body the client sent. The other routes produce the
//! response shapes the client has to adapt: plain text in two charsets, a
//! broken JSON body, an empty reply, a body larger than 10 MiB and
//! arbitrary status codes.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

/// Body sent as `text/plain; charset=utf-8` by `/text`.
pub const TEXT_BODY: &str = "héllo wörld";

/// `café` in ISO-8859-1, sent by `/latin1`.
pub const LATIN1_BODY: &[u8] = b"caf\xe9";

/// Length of the `application/octet-stream` body sent by `/big`, past
/// ureq's default 10 MiB read limit.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

/// What `/echo` saw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/text", get(text))
        .route("/latin1", get(latin1))
        .route("/broken-json", get(broken_json))
        .route("/empty", any(empty))
        .route("/big", get(big))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    debug!(%method, %uri, bytes = body.len(), "echo");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], TEXT_BODY)
}

async fn latin1() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=iso-8859-1")], LATIN1_BODY)
}

async fn broken_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{\"ok\": tru")
}

async fn big() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], vec![b'x'; BIG_BODY_LEN])
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "code": code }))))
}
