//! Error responses of the dashboard API.
//!
//! Upstream failure details are logged here and replaced by a generic
//! message before they reach the client.

use crate::upstream::UpstreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// Message for an upstream 401; the UI shows it as a credential prompt.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: configure GLUETUN_API_KEY";

/// Message for every other upstream failure.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Upstream error";

/// Message for an instance slot without base URL.
pub const NOT_CONFIGURED_MESSAGE: &str = "Instance not configured";

/// Message for rate-limited API requests.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

/// `{ok: false, error}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub ok: bool,
    pub error: String,
}

/// An error response with its HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Missing or unknown instance selector (400).
    pub fn invalid_instance() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Missing or invalid instance parameter. Use ?instance=1 or ?instance=2.",
        )
    }

    /// Action other than start/stop (400).
    pub fn invalid_action() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid action. Use start or stop.")
    }

    /// Known instance without base URL (503).
    pub fn not_configured() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, NOT_CONFIGURED_MESSAGE)
    }

    /// Upstream rejected the credentials (401).
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
    }

    /// Any other upstream failure (502).
    pub fn bad_gateway() -> Self {
        Self::new(StatusCode::BAD_GATEWAY, UPSTREAM_ERROR_MESSAGE)
    }

    /// Unknown `/api/*` route (404).
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    /// Rate limit exhausted (429).
    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE)
    }

    /// Handler panicked (500).
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        tracing::error!(endpoint = err.endpoint(), error = %err, "Upstream call failed");
        if err.is_unauthorized() {
            Self::unauthorized()
        } else {
            Self::bad_gateway()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            ok: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
