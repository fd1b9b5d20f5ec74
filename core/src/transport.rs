//! The seam between the client and the network.
//!
//! `Client` never opens a socket. It hands an `HttpRequest` to a `Transport`
//! and adapts whatever comes back. `UreqTransport` is the default; tests swap
//! in recording or failing transports.

use std::fmt;

use http::header::CONTENT_TYPE;
use tracing::trace;
use ureq::unversioned::multipart::{Form, Part};

use crate::error::ClientError;
use crate::headers::Headers;
use crate::http::{HttpRequest, HttpResponse, RequestBody};
use crate::upload::Multipart;

/// Performs one HTTP round-trip.
///
/// Implementations must report 4xx/5xx responses as `Ok` data; only failures
/// to complete the exchange are errors.
pub trait Transport: fmt::Debug {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Blocking transport backed by `ureq`.
///
/// Builds an agent per request so the request's own timeout applies, with
/// status-code errors disabled so every response comes back as data.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let mut builder = ureq::http::Request::builder().method(method.as_str()).uri(url.as_str());
        for (name, value) in headers.as_header_map() {
            builder = builder.header(name.clone(), value.clone());
        }

        let result = match body {
            None => {
                let req = builder.body(()).map_err(ClientError::transport)?;
                agent.run(req)
            }
            Some(RequestBody::Multipart(Multipart { fields, files })) => {
                let mut names = Vec::with_capacity(files.len());
                let mut parts = Vec::with_capacity(files.len());
                for file in files {
                    let (field, file_name, reader) = file.into_parts();
                    parts.push(Part::owned_reader(reader).file_name(&file_name));
                    names.push(field);
                }
                let mut form = Form::new();
                for (name, value) in &fields {
                    form = form.text(name, value);
                }
                for (name, part) in names.iter().zip(parts) {
                    form = form.part(name, part);
                }
                // `run` does not take the content-type from the body
                if !headers.contains(CONTENT_TYPE.as_str()) {
                    builder = builder.header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", form.boundary()));
                }
                trace!(fields = fields.len(), files = names.len(), "streaming multipart body");
                let req = builder.body(form).map_err(ClientError::transport)?;
                agent.run(req)
            }
            Some(body) => {
                let encoded = body.encode()?;
                if let Some(content_type) = encoded.content_type {
                    if !headers.contains(CONTENT_TYPE.as_str()) {
                        builder = builder.header(CONTENT_TYPE, content_type);
                    }
                }
                trace!(bytes = encoded.bytes.len(), "encoded request body");
                let req = builder.body(encoded.bytes).map_err(ClientError::transport)?;
                agent.run(req)
            }
        };
        let mut response = result.map_err(ClientError::transport)?;

        let status = response.status().as_u16();
        let headers = Headers::from(response.headers().clone());
        // ureq caps bodies at 10 MiB by default; test payloads may be larger
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(ClientError::transport)?;

        Ok(HttpResponse { status, headers, body })
    }
}
