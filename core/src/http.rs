//! HTTP exchange types handed to and returned from a `Transport`.
//!
//! # Design
//! The client assembles an `HttpRequest` as plain data: method, fully
//! resolved URL, merged headers, body and timeout. A `Transport` performs
//! the round-trip and answers with an `HttpResponse` carrying the raw status,
//! headers and bytes. Bodies stay as values (JSON tree, form fields, files)
//! until the transport encodes or streams them, so a recording
//! transport in a test can assert on what was asked for rather than on
//! wire bytes.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;
use crate::headers::Headers;
use crate::upload::Multipart;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body before it is encoded for the wire.
#[derive(Debug)]
pub enum RequestBody {
    /// Serialized with `serde_json`.
    Json(Value),
    /// Form-encoded when the value is an object; a string is sent as-is.
    Form(Value),
    /// `multipart/form-data` with plain fields and file parts.
    Multipart(Multipart),
}

/// Bytes ready to send, plus the content-type the encoding implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RequestBody {
    /// Turn a JSON or form body into bytes. Multipart bodies are never
    /// buffered; the transport streams them and this rejects them.
    pub fn encode(self) -> Result<EncodedBody, ClientError> {
        match self {
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| ClientError::Encode(e.to_string()))?;
                Ok(EncodedBody {
                    content_type: None,
                    bytes,
                })
            }
            RequestBody::Form(Value::String(raw)) => Ok(EncodedBody {
                content_type: None,
                bytes: raw.into_bytes(),
            }),
            RequestBody::Form(value) => {
                let fields = form_fields(&value)?;
                let encoded =
                    serde_urlencoded::to_string(&fields).map_err(|e| ClientError::Encode(e.to_string()))?;
                Ok(EncodedBody {
                    content_type: Some(FORM_CONTENT_TYPE.to_string()),
                    bytes: encoded.into_bytes(),
                })
            }
            RequestBody::Multipart(_) => Err(ClientError::Encode(
                "multipart bodies are streamed by the transport".to_string(),
            )),
        }
    }
}

/// Flatten a JSON object into `(name, value)` pairs; arrays repeat the name.
/// Nested objects cannot be expressed as form fields and are rejected.
pub fn form_fields(value: &Value) -> Result<Vec<(String, String)>, ClientError> {
    let Value::Object(map) = value else {
        return Err(ClientError::Encode(format!("form body must be an object, got {value}")));
    };
    let mut fields = Vec::with_capacity(map.len());
    for (name, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    fields.push((name.clone(), field_text(name, item)?));
                }
            }
            other => fields.push((name.clone(), field_text(name, other)?)),
        }
    }
    Ok(fields)
}

fn field_text(name: &str, value: &Value) -> Result<String, ClientError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => Err(ClientError::Encode(format!("field {name:?} is nested"))),
    }
}

/// A fully assembled request, handed to a `Transport`.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

/// What a `Transport` got back, before any interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_body_serializes() {
        let encoded = RequestBody::Json(json!({"name": "x", "n": 1})).encode().unwrap();
        assert_eq!(encoded.content_type, None);
        let back: Value = serde_json::from_slice(&encoded.bytes).unwrap();
        assert_eq!(back, json!({"name": "x", "n": 1}));
    }

    #[test]
    fn form_body_urlencodes() {
        let encoded = RequestBody::Form(json!({"a": "b c", "n": 2, "tags": ["x", "y"]}))
            .encode()
            .unwrap();
        assert_eq!(encoded.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
        assert_eq!(String::from_utf8(encoded.bytes).unwrap(), "a=b+c&n=2&tags=x&tags=y");
    }

    #[test]
    fn raw_string_form_body_passes_through() {
        let encoded = RequestBody::Form(json!("already=encoded")).encode().unwrap();
        assert_eq!(encoded.content_type, None);
        assert_eq!(encoded.bytes, b"already=encoded");
    }

    #[test]
    fn nested_form_body_is_rejected() {
        let err = RequestBody::Form(json!({"a": {"b": 1}})).encode().unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
    }

    #[test]
    fn multipart_is_not_buffered() {
        let err = RequestBody::Multipart(Multipart::default()).encode().unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }
}
