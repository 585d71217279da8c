//! Response helpers and gateway failures.
//!
//! # Responsibilities
//! - Map upstream failures to appropriate HTTP status codes
//! - Give every gateway failure a body and a machine-readable kind header
//!
//! # Design Decisions
//! - Upstream unreachable (connect, TLS, reset) results in 502 Bad Gateway
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Failures are reported once, never retried

use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

/// Header naming the gateway failure kind on error responses.
pub const X_DEVPROXY_ERROR: HeaderName = HeaderName::from_static("x-devproxy-error");

/// A forwarded request that could not be completed.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("upstream {origin} unreachable: {source}")]
    Unreachable {
        origin: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("upstream {origin} did not respond within {after:?}")]
    Timeout { origin: String, after: Duration },

    #[error("invalid upstream target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unreachable { .. } | GatewayError::InvalidTarget { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Short label used in logs, metrics and the `x-devproxy-error` header.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unreachable { .. } => "unreachable",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::InvalidTarget { .. } => "invalid_target",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = format!(
            "{}: {}",
            status.canonical_reason().unwrap_or("Gateway Error"),
            self
        );
        (status, [(X_DEVPROXY_ERROR, self.kind())], body).into_response()
    }
}

/// Plain 404 used when nothing serves a path.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_504() {
        let err = GatewayError::Timeout {
            origin: "http://localhost:9000/".into(),
            after: Duration::from_millis(250),
        };
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.headers()["x-devproxy-error"], "timeout");
    }

    #[test]
    fn test_invalid_target_maps_to_502() {
        let err = GatewayError::InvalidTarget {
            target: "http://[bad".into(),
            reason: "invalid authority".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[&X_DEVPROXY_ERROR], "invalid_target");
    }

    #[test]
    fn test_not_found() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
