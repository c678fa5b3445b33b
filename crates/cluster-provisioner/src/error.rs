// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for cluster-provisioner.
//!
//! Every failure belongs to exactly one [`ErrorKind`]. Upstream vendor codes
//! are translated into these kinds once, in [`crate::upstream::errors`]; code
//! above that boundary propagates the kind unchanged up to the HTTP layer.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Classification of a failure, independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input.
    BadRequest,
    /// Resource is absent, or belongs to another tenant.
    NotFound,
    /// Resource already exists.
    Conflict,
    /// An upstream quota was hit.
    LimitExceeded,
    /// Credentials could not be obtained or were refused.
    Forbidden,
    /// Upstream is temporarily unavailable.
    ServiceUnavailable,
    /// Anything unexpected.
    Internal,
}

impl ErrorKind {
    /// Stable identifier used in error response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::LimitExceeded => "LimitExceeded",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::Internal => "InternalError",
        }
    }

    /// HTTP status code this kind renders as.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::LimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provisioner errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Request validation failed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource was not found (or is owned by another tenant).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream quota exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Role assumption or upstream authorization failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Upstream outage.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Unexpected upstream state or invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Task store operation failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type using the provisioner Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::BadRequest => Error::BadRequest(message),
            ErrorKind::NotFound => Error::NotFound(message),
            ErrorKind::Conflict => Error::Conflict(message),
            ErrorKind::LimitExceeded => Error::LimitExceeded(message),
            ErrorKind::Forbidden => Error::Forbidden(message),
            ErrorKind::ServiceUnavailable => Error::ServiceUnavailable(message),
            ErrorKind::Internal => Error::Internal(message),
        }
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::LimitExceeded(_) => ErrorKind::LimitExceeded,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Error::Internal(_) | Error::Config(_) | Error::Json(_) | Error::Redis(_) | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Error::BadRequest(m)
            | Error::NotFound(m)
            | Error::Conflict(m)
            | Error::LimitExceeded(m)
            | Error::Forbidden(m)
            | Error::ServiceUnavailable(m)
            | Error::Internal(m) => m.clone(),
            other => other.to_string(),
        }
    }

    /// Prepend context to the message, keeping the kind.
    pub fn with_context(self, context: impl fmt::Display) -> Self {
        let kind = self.kind();
        Error::new(kind, format!("{}: {}", context, self.message()))
    }
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            error!(error = %self, "Request failed with internal error");
        }
        let body = ErrorBody {
            code: kind.as_str(),
            message: self.message(),
        };
        (kind.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip_through_new() {
        for kind in [
            ErrorKind::BadRequest,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::LimitExceeded,
            ErrorKind::Forbidden,
            ErrorKind::ServiceUnavailable,
            ErrorKind::Internal,
        ] {
            assert_eq!(Error::new(kind, "x").kind(), kind);
        }
    }

    #[test]
    fn test_with_context_keeps_kind() {
        let err = Error::LimitExceeded("InstanceQuotaExceeded".to_string())
            .with_context("cluster c was created but instance c-2 failed");

        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(
            err.message(),
            "cluster c was created but instance c-2 failed: InstanceQuotaExceeded"
        );
    }

    #[test]
    fn test_wrapped_errors_are_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.kind().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::LimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ErrorKind::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
