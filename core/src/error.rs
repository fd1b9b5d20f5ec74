//! Error types for the endpoints test client.
//!
//! # Design
//! Transport failures are carried through untouched so a test sees exactly
//! what the HTTP library reported. `Parse` is reserved for responses that
//! declare a JSON content-type but fail to decode. Everything a caller can
//! get wrong before the request leaves (bad host, bad header, unencodable
//! body, missing upload file) has its own variant.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not complete the exchange (connect, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response declared a JSON content-type but the body is not JSON.
    #[error("response body is not valid json: {0}")]
    Parse(#[source] serde_json::Error),

    /// A file supplied for upload could not be opened.
    #[error("cannot open upload {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured host is not a usable base URL.
    #[error("invalid host {0:?}")]
    InvalidHost(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    /// The request body could not be encoded for the wire.
    #[error("cannot encode request body: {0}")]
    Encode(String),
}

impl ClientError {
    /// Wrap any transport-level failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ClientError::Transport(err.into())
    }
}
