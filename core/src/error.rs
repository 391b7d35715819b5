//! Error types for the portal API client.
//!
//! # Design
//! Every failure surfaces as a distinct `ApiError` variant: a missing
//! required parameter (raised before any I/O), a transport failure, a
//! non-2xx response, or a body that does not decode. Non-2xx responses keep
//! the raw `HttpResponse` so callers can branch on the status and read the
//! backend's `detail` payload themselves.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

/// Top-level error type for every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter was absent. No request was sent.
    #[error("required parameter \"{parameter}\" was missing when calling {operation}()")]
    MissingParameter {
        operation: &'static str,
        parameter: String,
    },

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The response body was declared JSON but could not be parsed.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status if the server answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response(err) => Some(err.status()),
            _ => None,
        }
    }

    /// Returns the response error when this is a non-2xx response.
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            ApiError::Response(err) => Some(err),
            _ => None,
        }
    }
}

/// Network or protocol failure below the HTTP status layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    /// Failure reported by a custom transport.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors, raised while building a `Configuration`. They are
/// returned by the builder and never reach a call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {url}")]
    CannotBeABase { url: String },

    #[error("invalid default header {name}")]
    InvalidHeader { name: String },
}

/// A non-2xx response, carried with the operation that produced it.
#[derive(Debug, Error)]
#[error("{operation} returned HTTP {}", .response.status)]
pub struct ResponseError {
    operation: &'static str,
    response: HttpResponse,
}

impl ResponseError {
    pub fn new(operation: &'static str, response: HttpResponse) -> Self {
        Self {
            operation,
            response,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// The raw response, unmodified.
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn is_unauthorized(&self) -> bool {
        self.response.status == 401
    }

    pub fn is_not_found(&self) -> bool {
        self.response.status == 404
    }

    /// Parses the backend's `detail` field, if the body carries one.
    pub fn detail(&self) -> Option<ErrorDetail> {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: ErrorDetail,
        }

        serde_json::from_str::<ErrorBody>(&self.response.body)
            .ok()
            .map(|body| body.detail)
    }

    /// Field-level validation errors from a `detail` array. Empty when the
    /// body carries none.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        match self.detail() {
            Some(ErrorDetail::Validation(errors)) => errors,
            _ => Vec::new(),
        }
    }
}

/// The `detail` payload of an error response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationError>),
}

/// One field-level validation failure, as reported on 422 responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationError {
    #[serde(alias = "location")]
    pub loc: Vec<LocationItem>,
    #[serde(alias = "message")]
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One segment of a validation error location: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocationItem {
    Key(String),
    Index(u64),
}

impl std::fmt::Display for LocationItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationItem::Key(key) => f.write_str(key),
            LocationItem::Index(index) => write!(f, "{index}"),
        }
    }
}
