//! The backend response contract.

use http::StatusCode;
use serde_json::Value;

/// Auxiliary key-value metadata attached to a response document.
pub type Meta = serde_json::Map<String, Value>;

/// The sole channel backends use to communicate an outcome.
///
/// Every backend capability resolves to a `Response` exposing three facets:
/// the payload ([`result`]), auxiliary metadata ([`metadata`]), and a wire
/// status ([`status_code`]) that the dispatcher validates against the
/// allow-list of the invoked operation.
///
/// [`result`]: Response::result
/// [`metadata`]: Response::metadata
/// [`status_code`]: Response::status_code
#[derive(Debug, Clone)]
pub struct Response<P> {
    payload: Option<P>,
    meta: Meta,
    status: StatusCode,
}

impl<P> Response<P> {
    /// Creates an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            payload: None,
            meta: Meta::new(),
            status,
        }
    }

    /// Creates a `200 OK` response carrying a payload.
    #[must_use]
    pub fn ok(payload: P) -> Self {
        Self::new(StatusCode::OK).with_payload(payload)
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Replaces the metadata map.
    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Inserts a single metadata entry.
    #[must_use]
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Returns the payload, or `None` for empty responses.
    #[must_use]
    pub const fn result(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Consumes the response and returns the payload.
    #[must_use]
    pub fn into_result(self) -> Option<P> {
        self.payload
    }

    /// Returns the metadata map, possibly empty.
    #[must_use]
    pub const fn metadata(&self) -> &Meta {
        &self.meta
    }

    /// Returns the status code the backend reported.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_response() {
        let resp = Response::ok("payload");
        assert_eq!(resp.status_code(), StatusCode::OK);
        assert_eq!(resp.result(), Some(&"payload"));
        assert!(resp.metadata().is_empty());
    }

    #[test]
    fn test_empty_response() {
        let resp: Response<String> = Response::new(StatusCode::NO_CONTENT);
        assert!(resp.result().is_none());
        assert_eq!(resp.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_meta_entries() {
        let resp: Response<()> = Response::new(StatusCode::OK)
            .with_meta_entry("count", json!(12))
            .with_meta_entry("cursor", json!("abc"));
        assert_eq!(resp.metadata().get("count"), Some(&json!(12)));
        assert_eq!(resp.metadata().len(), 2);
    }
}
