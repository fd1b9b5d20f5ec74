//! The response shape tests assert against.

use serde_json::Value;

use crate::error::ClientError;
use crate::headers::Headers;
use crate::http::HttpResponse;

/// Response payload after adaptation.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The server sent no bytes.
    Empty,
    /// Declared JSON and parsed.
    Json(Value),
    /// Anything else, kept byte for byte.
    Raw(Vec<u8>),
}

/// A transport response normalized for assertions: status code, headers,
/// parsed-or-raw body and a decoded text view of the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub code: u16,
    pub headers: Headers,
    pub body: Body,
    pub text: String,
}

impl Response {
    /// Adapt a raw transport response. A body under a JSON content-type must
    /// parse or this fails with `ClientError::Parse`.
    pub fn from_raw(raw: HttpResponse) -> Result<Self, ClientError> {
        let HttpResponse { status, headers, body } = raw;
        if body.is_empty() {
            return Ok(Self {
                code: status,
                headers,
                body: Body::Empty,
                text: String::new(),
            });
        }

        let text = decode_text(&body, headers.content_type());
        let body = if headers.is_json() {
            Body::Json(serde_json::from_slice(&body).map_err(ClientError::Parse)?)
        } else {
            Body::Raw(body)
        };
        Ok(Self {
            code: status,
            headers,
            body,
            text,
        })
    }

    /// The parsed body, if the response was JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The raw bytes, if the response was not JSON.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Raw(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// The `charset` parameter of a content-type, lowercased and unquoted.
pub fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

/// Decode with the declared charset. Latin-1 style charsets map bytes to the
/// matching code points; everything else, including no charset, is decoded
/// as UTF-8 with replacement characters for invalid sequences.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    match content_type.and_then(charset).as_deref() {
        Some("iso-8859-1" | "latin-1" | "latin1" | "l1" | "us-ascii" | "ascii") => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(content_type: Option<&str>, body: &[u8]) -> HttpResponse {
        let mut headers = Headers::new();
        if let Some(ct) = content_type {
            headers.insert("content-type", ct).unwrap();
        }
        HttpResponse {
            status: 200,
            headers,
            body: body.to_vec(),
        }
    }

    #[test]
    fn json_body_is_parsed() {
        let response = Response::from_raw(raw(Some("application/json"), br#"{"ok":true}"#)).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.json(), Some(&json!({"ok": true})));
        assert_eq!(response.json().unwrap()["ok"], true);
        assert_eq!(response.text, r#"{"ok":true}"#);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Response::from_raw(raw(Some("application/json"), b"{nope")).unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[test]
    fn non_json_keeps_bytes_and_text() {
        let response = Response::from_raw(raw(Some("text/plain"), b"hello")).unwrap();
        assert_eq!(response.bytes(), Some(&b"hello"[..]));
        assert_eq!(response.text, "hello");
        assert!(response.json().is_none());
    }

    #[test]
    fn empty_body_is_empty_even_when_json() {
        let response = Response::from_raw(raw(Some("application/json"), b"")).unwrap();
        assert_eq!(response.body, Body::Empty);
        assert_eq!(response.text, "");
    }

    #[test]
    fn latin1_charset_decodes_high_bytes() {
        let response = Response::from_raw(raw(Some("text/plain; charset=ISO-8859-1"), b"caf\xe9")).unwrap();
        assert_eq!(response.text, "café");
        assert_eq!(response.bytes(), Some(&b"caf\xe9"[..]));
    }

    #[test]
    fn undeclared_charset_is_utf8() {
        let response = Response::from_raw(raw(None, "naïve".as_bytes())).unwrap();
        assert_eq!(response.text, "naïve");
    }

    #[test]
    fn charset_parameter_parsing() {
        assert_eq!(charset("text/html; charset=\"UTF-8\"").as_deref(), Some("utf-8"));
        assert_eq!(charset("text/html").as_deref(), None);
        assert_eq!(charset("text/html; q=1; Charset=latin1").as_deref(), Some("latin1"));
    }
}
