//! Error types for the Vellum engine.
//!
//! This module provides two layers of errors:
//!
//! - [`EngineError`] is the standard error type used throughout the engine.
//!   Every handler returns a single `EngineError` up to the dispatcher
//!   boundary, which hands it to the error reporter.
//! - [`HttpError`] is a directly marshalable JSON:API error document: a
//!   status, a title, and zero or more [`ApiError`] entries. It is both a
//!   normal error value and the wire shape the reporter writes.
//!
//! The mapping from error kind to HTTP status is centralized in
//! [`EngineError::status_code`]; no other place translates errors to wire
//! statuses.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;

/// A single JSON:API error object.
///
/// All members are optional per the JSON:API specification; absent members
/// are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// A unique identifier for this particular occurrence of the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The HTTP status code applicable to this problem, as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// An application-specific error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// A short, human-readable summary of the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A reference to the source of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

impl ApiError {
    /// Creates an error entry with a status and title.
    #[must_use]
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            status: Some(status.as_u16().to_string()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the offending query parameter as the error source.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.source = Some(ErrorSource {
            pointer: None,
            parameter: Some(parameter.into()),
        });
        self
    }
}

/// A reference to the source of a JSON:API error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    /// A JSON pointer to the offending document member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// The name of the offending query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// An aggregate of JSON:API error objects with a wire status.
///
/// `HttpError` is returned by handlers (and may be returned by backends)
/// whenever the full error-document shape must be controlled, e.g. the
/// sparse-fieldset filter aggregating every invalid field into one 400
/// response.
#[derive(Debug, Error)]
#[error("{title}")]
pub struct HttpError {
    status: StatusCode,
    title: String,
    /// The individual error entries of the document.
    pub errors: Vec<ApiError>,
}

impl HttpError {
    /// Creates an error with a status and title and no entries.
    #[must_use]
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            errors: Vec::new(),
        }
    }

    /// Creates an error with explicit entries.
    #[must_use]
    pub fn with_errors(status: StatusCode, title: impl Into<String>, errors: Vec<ApiError>) -> Self {
        Self {
            status,
            title: title.into(),
            errors,
        }
    }

    /// Returns the wire status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the error entries, synthesizing a single entry from the
    /// status and title when none were supplied.
    #[must_use]
    pub fn entries(&self) -> Vec<ApiError> {
        if self.errors.is_empty() {
            vec![ApiError::new(self.status, self.title.clone())]
        } else {
            self.errors.clone()
        }
    }
}

/// Standard error type for the Vellum engine.
///
/// The variants follow the engine's error taxonomy: missing optional
/// capabilities, request validation, not-found conditions, backend contract
/// violations, codec failures, and internal faults. [`status_code`] maps
/// each variant to its wire status.
///
/// [`status_code`]: EngineError::status_code
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backend lacks an optional capability a request needed.
    #[error("Resource does not implement the {capability} interface")]
    CapabilityMissing {
        /// The resource whose backend was probed.
        resource: String,
        /// The missing capability name.
        capability: &'static str,
    },

    /// A route target or relation could not be resolved.
    #[error("{0}")]
    NotFound(String),

    /// The request payload is structurally unacceptable for the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The request payload or parameters are malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A backend returned an undocumented status code for a mutating
    /// operation. Never coerced; always fatal.
    #[error("invalid status code {status} from resource {resource} for method {operation}")]
    InvalidStatusCode {
        /// The status the backend returned.
        status: u16,
        /// The offending resource.
        resource: String,
        /// The mutating operation name.
        operation: &'static str,
    },

    /// A marshaled document was missing an expected structural member.
    #[error("{0}")]
    InvalidDocument(String),

    /// The document codec collaborator failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// A fully-shaped error document supplied by a handler or backend.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Internal fault.
    #[error("{message}")]
    Internal {
        /// Human-readable message.
        message: String,
        /// The underlying error, not exposed to clients.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl EngineError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a forbidden (payload validation) error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a missing-capability error for a resource.
    #[must_use]
    pub fn capability_missing(resource: impl Into<String>, capability: &'static str) -> Self {
        Self::CapabilityMissing {
            resource: resource.into(),
            capability,
        }
    }

    /// Creates a codec error.
    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CapabilityMissing { .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Http(e) => e.status(),
            Self::InvalidStatusCode { .. }
            | Self::InvalidDocument(_)
            | Self::Codec(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the JSON:API error entries for this error.
    #[must_use]
    pub fn entries(&self) -> Vec<ApiError> {
        match self {
            Self::Http(e) => e.entries(),
            other => vec![ApiError::new(other.status_code(), other.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_missing_maps_to_404() {
        let err = EngineError::capability_missing("posts", "PaginatedFindAll");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("PaginatedFindAll"));
    }

    #[test]
    fn test_validation_statuses() {
        assert_eq!(
            EngineError::forbidden("missing mandatory data key.").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            EngineError::bad_request("no id field found inside data object").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_status_code_is_internal() {
        let err = EngineError::InvalidStatusCode {
            status: 418,
            resource: "posts".to_string(),
            operation: "Create",
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "invalid status code 418 from resource posts for method Create"
        );
    }

    #[test]
    fn test_http_error_passthrough() {
        let http = HttpError::with_errors(
            StatusCode::BAD_REQUEST,
            "Some requested fields were invalid",
            vec![ApiError::new(StatusCode::BAD_REQUEST, "bad field")],
        );
        let err = EngineError::from(http);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.entries().len(), 1);
    }

    #[test]
    fn test_http_error_synthesizes_entry() {
        let http = HttpError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        let entries = http.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status.as_deref(), Some("405"));
        assert_eq!(entries[0].title.as_deref(), Some("Method Not Allowed"));
    }

    #[test]
    fn test_api_error_serialization_omits_absent_members() {
        let entry = ApiError::new(StatusCode::BAD_REQUEST, "Bad Request")
            .with_code("INVALID_FIELD_QUERY_PARAM")
            .with_parameter("fields[posts]");
        let json = serde_json::to_string(&entry).expect("serialization should work");
        assert!(json.contains("\"parameter\":\"fields[posts]\""));
        assert!(!json.contains("pointer"));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn test_internal_error_with_source() {
        let parse = "x".parse::<u64>().unwrap_err();
        let err = EngineError::internal_with_source("invalid page parameter", parse);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "invalid page parameter");
    }
}
