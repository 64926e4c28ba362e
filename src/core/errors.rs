use std::fmt;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const ERROR_KIND_HEADER: &str = "x-relay-error-kind";

/// External services the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Rag,
    Inference,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Rag => f.write_str("RAG"),
            Upstream::Inference => f.write_str("inference"),
        }
    }
}

/// Closed set of failure causes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    UpstreamUnavailable,
    UpstreamError,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::UpstreamUnavailable => "upstream-unavailable",
            ErrorKind::UpstreamError => "upstream-error",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{service} service unreachable: {source}")]
    UpstreamUnavailable {
        service: Upstream,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} service error! status: {status}")]
    UpstreamStatus {
        service: Upstream,
        status: StatusCode,
    },
    #[error("{service} service returned an unusable payload: {detail}")]
    UpstreamPayload { service: Upstream, detail: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Classifies a transport-level `reqwest` failure for `service`.
    ///
    /// Connection, timeout and request-building failures mean the service
    /// could not be reached; anything else (body decoding) is an unusable
    /// response.
    pub fn from_transport(service: Upstream, err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::UpstreamPayload {
                service,
                detail: err.to_string(),
            }
        } else {
            ApiError::UpstreamUnavailable {
                service,
                source: err,
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::BadRequest,
            ApiError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            ApiError::UpstreamStatus { .. } | ApiError::UpstreamPayload { .. } => {
                ErrorKind::UpstreamError
            }
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Logs the error and renders it as `{ "error": message }`.
    ///
    /// The body only ever carries the route's public `message`; the kind
    /// travels in the `x-relay-error-kind` header.
    pub fn respond(self, status: StatusCode, message: &str) -> Response {
        let kind = self.kind();
        if status.is_server_error() {
            tracing::error!(kind = kind.as_str(), "{}", self);
        } else {
            tracing::warn!(kind = kind.as_str(), "{}", self);
        }

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        response.headers_mut().insert(
            HeaderName::from_static(ERROR_KIND_HEADER),
            HeaderValue::from_static(kind.as_str()),
        );
        response
    }
}
