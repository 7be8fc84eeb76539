//! Response assembly and error reporting.
//!
//! Every handler resolves to a [`RouteReply`]; the assembler turns it into
//! the final wire response by negotiating a codec, applying sparse-field
//! filtering, encoding, and writing the status plus headers. The error
//! reporter is the single place translating an [`EngineError`] into an
//! error document; it negotiates its codec independently and logs before
//! writing.

use bytes::Bytes;
use http::{header, HeaderName, HeaderValue, Response, StatusCode};
use serde_json::Value;
use vellum_core::{EngineError, EngineResult, Request};

use crate::fields::{filter_sparse_fields, parse_query_fields};
use crate::negotiate::{select_marshaler, MarshalerMap};

/// The outcome of one dispatched route before wire encoding.
#[derive(Debug)]
pub(crate) struct RouteReply {
    pub status: StatusCode,
    pub document: Option<Value>,
    pub location: Option<String>,
    pub allow: Option<&'static str>,
}

impl RouteReply {
    /// A reply carrying a document.
    pub(crate) fn document(status: StatusCode, document: Value) -> Self {
        Self {
            status,
            document: Some(document),
            location: None,
            allow: None,
        }
    }

    /// A bodyless reply.
    pub(crate) fn empty(status: StatusCode) -> Self {
        Self {
            status,
            document: None,
            location: None,
            allow: None,
        }
    }

    /// A capability-advertisement reply for OPTIONS.
    pub(crate) fn options(allow: &'static str) -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            document: None,
            location: None,
            allow: Some(allow),
        }
    }

    /// Attaches a `Location` header value.
    pub(crate) fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("invalid"))
}

fn build(
    status: StatusCode,
    content_type: &str,
    extra: &[(HeaderName, String)],
    body: Bytes,
) -> Response<Bytes> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, header_value(content_type));
    for (name, value) in extra {
        builder = builder.header(name, header_value(value));
    }
    builder
        .body(body)
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}

/// Assembles the wire response for a successful route reply.
///
/// Negotiation happens even for bodyless replies so the `Content-Type`
/// header is always set to the negotiated value. Sparse-field filtering
/// may itself short-circuit into an error, which the dispatcher routes to
/// the error reporter.
pub(crate) fn assemble(
    reply: RouteReply,
    req: &Request,
    marshalers: &MarshalerMap,
) -> EngineResult<Response<Bytes>> {
    let (marshaler, content_type) = select_marshaler(req.headers(), marshalers);

    let mut extra: Vec<(HeaderName, String)> = Vec::new();
    if let Some(location) = &reply.location {
        extra.push((header::LOCATION, location.clone()));
    }
    if let Some(allow) = reply.allow {
        extra.push((header::ALLOW, allow.to_string()));
    }

    let body = match reply.document {
        Some(mut document) => {
            let fields = parse_query_fields(req);
            filter_sparse_fields(&mut document, &fields)?;
            marshaler.marshal(&document)?
        }
        None => Bytes::new(),
    };

    Ok(build(reply.status, &content_type, &extra, body))
}

/// Converts any failure into a JSON:API error document response.
///
/// Always logs the error before writing, and negotiates its codec
/// independently of the failed operation.
pub(crate) fn report_error(
    err: &EngineError,
    req: &Request,
    marshalers: &MarshalerMap,
) -> Response<Bytes> {
    let (marshaler, content_type) = select_marshaler(req.headers(), marshalers);
    let status = err.status_code();
    tracing::error!(error = %err, status = status.as_u16(), path = req.path(), "request failed");
    let body = marshaler.marshal_error(&err.entries());
    build(status, &content_type, &[], body)
}
