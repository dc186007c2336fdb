//! Error types for control API calls.

use thiserror::Error;

/// Errors that can occur while talking to a Gluetun control API.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The control API answered with a non-2xx status.
    #[error("Gluetun returned {status} for {endpoint}{}", format_body(.body))]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// No response within the per-call timeout.
    #[error("request to {endpoint} timed out after {after_secs}s")]
    Timeout { endpoint: String, after_secs: u64 },

    /// Connection refused, DNS failure and similar transport errors.
    #[error("fetch failed for {endpoint} ({message})")]
    Network { endpoint: String, message: String },

    /// A 2xx response whose body is not JSON.
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

impl UpstreamError {
    /// HTTP status of the upstream response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Upstream path the failed call targeted.
    pub fn endpoint(&self) -> &str {
        match self {
            UpstreamError::Status { endpoint, .. }
            | UpstreamError::Timeout { endpoint, .. }
            | UpstreamError::Network { endpoint, .. }
            | UpstreamError::InvalidResponse { endpoint, .. } => endpoint,
        }
    }
}
