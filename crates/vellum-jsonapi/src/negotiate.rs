//! Content marshalers and negotiation.
//!
//! The engine does not own a wire format. It carries a registered map of
//! `{content type → marshaler}` and negotiates exactly one marshaler per
//! request/response pair: an `Accept` header is negotiated against the
//! registered types with the default as fallback, a bare `Content-Type`
//! header is used as a direct map key, and everything else falls back to
//! the built-in JSON:API codec.

use bytes::Bytes;
use http::{header, HeaderMap};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use vellum_core::{ApiError, EngineError, EngineResult};

/// The default JSON:API content type.
pub const JSONAPI_CONTENT_TYPE: &str = "application/vnd.api+json; charset=utf-8";

/// Encodes and decodes documents for one content type.
pub trait Marshaler: Send + Sync {
    /// Encodes a document into its wire form.
    fn marshal(&self, document: &Value) -> EngineResult<Bytes>;

    /// Decodes a wire body into a document value.
    fn unmarshal(&self, data: &[u8]) -> EngineResult<Value>;

    /// Encodes JSON:API error entries into an error document.
    fn marshal_error(&self, errors: &[ApiError]) -> Bytes;
}

/// The registered marshaler map, keyed by content type.
pub type MarshalerMap = HashMap<String, Arc<dyn Marshaler>>;

/// The built-in JSON marshaler for `application/vnd.api+json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaler;

impl Marshaler for JsonMarshaler {
    fn marshal(&self, document: &Value) -> EngineResult<Bytes> {
        serde_json::to_vec(document)
            .map(Bytes::from)
            .map_err(|e| EngineError::codec(e.to_string()))
    }

    fn unmarshal(&self, data: &[u8]) -> EngineResult<Value> {
        serde_json::from_slice(data).map_err(|e| EngineError::bad_request(e.to_string()))
    }

    fn marshal_error(&self, errors: &[ApiError]) -> Bytes {
        let document = json!({ "errors": errors });
        serde_json::to_vec(&document)
            .map(Bytes::from)
            .unwrap_or_else(|_| Bytes::from_static(b"{\"errors\":[]}"))
    }
}

/// Returns the default marshaler map: the built-in JSON codec under the
/// JSON:API content type.
#[must_use]
pub fn default_marshalers() -> MarshalerMap {
    let mut map: MarshalerMap = HashMap::new();
    map.insert(JSONAPI_CONTENT_TYPE.to_string(), Arc::new(JsonMarshaler));
    map
}

/// Selects the marshaler and response content type for a request.
#[must_use]
pub fn select_marshaler(
    headers: &HeaderMap,
    marshalers: &MarshalerMap,
) -> (Arc<dyn Marshaler>, String) {
    let mut selected: Option<String> = None;

    if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        let offered: Vec<&str> = marshalers.keys().map(String::as_str).collect();
        selected = Some(negotiate(accept, &offered, JSONAPI_CONTENT_TYPE));
    } else if let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        selected = Some(content_type.to_string());
    }

    if let Some(content_type) = selected {
        if let Some(marshaler) = marshalers.get(&content_type) {
            return (Arc::clone(marshaler), content_type);
        }
    }
    (Arc::new(JsonMarshaler), JSONAPI_CONTENT_TYPE.to_string())
}

fn essence(content_type: &str) -> Option<mime::Mime> {
    content_type.parse::<mime::Mime>().ok()
}

/// Negotiates the best offered content type for an `Accept` header.
///
/// Standard q-value negotiation: every `Accept` range is scored against
/// every offered type (exact essence match, `type/*`, `*/*`); the offered
/// type with the highest q wins, and a best q of zero falls back to the
/// default.
fn negotiate(accept: &str, offered: &[&str], fallback: &str) -> String {
    let ranges: Vec<(mime::Mime, f32)> = accept
        .split(',')
        .filter_map(|part| {
            let m = part.trim().parse::<mime::Mime>().ok()?;
            let q = m
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((m, q))
        })
        .collect();

    let mut best: Option<(&str, f32, u8)> = None;
    for offer in offered {
        let Some(offer_mime) = essence(offer) else {
            continue;
        };
        for (range, q) in &ranges {
            // Specificity: exact 2, type/* 1, */* 0.
            let specificity = if range.type_() == offer_mime.type_()
                && range.subtype() == offer_mime.subtype()
            {
                2
            } else if range.type_() == offer_mime.type_() && range.subtype() == "*" {
                1
            } else if range.type_() == "*" && range.subtype() == "*" {
                0
            } else {
                continue;
            };
            let better = match best {
                None => *q > 0.0,
                Some((_, best_q, best_spec)) => {
                    *q > best_q || (*q == best_q && specificity > best_spec)
                }
            };
            if better {
                best = Some((offer, *q, specificity));
            }
        }
    }

    best.map_or_else(|| fallback.to_string(), |(offer, _, _)| offer.to_string())
}
