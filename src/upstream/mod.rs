//! Client for the Gluetun control API.
//!
//! Every call carries the instance's credentials, is bounded by the
//! configured timeout, and classifies failures into [`UpstreamError`].
//! Endpoints that were renamed between Gluetun releases are reached through
//! a [`FallbackChain`].

pub mod endpoint;
mod error;

pub use endpoint::{Candidate, Endpoint, FallbackChain};
pub use error::UpstreamError;

use crate::config::{Credentials, InstanceConfig};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest slice of an error body kept in the error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Desired tunnel state sent with `PUT /v1/vpn/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnState {
    Running,
    Stopped,
}

#[derive(Serialize)]
struct VpnStatusBody {
    status: VpnState,
}

/// HTTP client shared by all handlers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client with the given per-call timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { http, timeout })
    }

    /// Create a client around an existing HTTP client (for testing).
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one call to `endpoint` on `instance`.
    ///
    /// The instance must be configured; an instance without a URL is a
    /// caller bug and reported as a network error.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        instance: &InstanceConfig,
        method: Method,
        endpoint: Endpoint,
        body: Option<&B>,
    ) -> Result<Value, UpstreamError> {
        let path = endpoint.path();
        let base = instance.url.as_deref().ok_or_else(|| UpstreamError::Network {
            endpoint: path.to_string(),
            message: "instance has no URL".to_string(),
        })?;
        let url = format!("{}{}", base, path);

        let mut request = self.http.request(method.clone(), &url).timeout(self.timeout);
        request = match &instance.credentials {
            Credentials::ApiKey(key) => request.header("X-API-Key", key),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, password.as_ref())
            }
            Credentials::None => request,
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(instance = %instance.id, %method, endpoint = path, "Calling control API");

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: String = text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
                body: body.trim().to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.classify_error(path, e))
    }

    /// GET an endpoint without a body.
    pub async fn get(
        &self,
        instance: &InstanceConfig,
        endpoint: Endpoint,
    ) -> Result<Value, UpstreamError> {
        self.call::<()>(instance, Method::GET, endpoint, None).await
    }

    /// Walk `chain` until a candidate succeeds.
    ///
    /// A failure moves on to the next candidate only when the failing
    /// candidate's predicate accepts it; otherwise it is returned as is.
    pub async fn get_with_fallback(
        &self,
        instance: &InstanceConfig,
        chain: &FallbackChain,
    ) -> Result<Value, UpstreamError> {
        let mut candidates = chain.candidates.iter().peekable();
        loop {
            let Some(candidate) = candidates.next() else {
                // Empty chains are never declared; treat as a programming error.
                return Err(UpstreamError::Network {
                    endpoint: chain.name.to_string(),
                    message: "no endpoint candidates".to_string(),
                });
            };

            match self.get(instance, candidate.endpoint).await {
                Ok(value) => return Ok(value),
                Err(err) => match candidates.peek() {
                    Some(next) if (candidate.falls_through)(&err) => {
                        tracing::warn!(
                            instance = %instance.id,
                            endpoint = candidate.endpoint.path(),
                            status = ?err.status(),
                            fallback = next.endpoint.path(),
                            "Control API endpoint unavailable, falling back"
                        );
                    }
                    _ => return Err(err),
                },
            }
        }
    }

    /// Change the tunnel state with `PUT /v1/vpn/status`.
    pub async fn set_vpn_state(
        &self,
        instance: &InstanceConfig,
        state: VpnState,
    ) -> Result<Value, UpstreamError> {
        self.call(
            instance,
            Method::PUT,
            Endpoint::VpnStatus,
            Some(&VpnStatusBody { status: state }),
        )
        .await
    }

    /// Classify a reqwest error into an [`UpstreamError`].
    fn classify_error(&self, endpoint: &str, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout {
                endpoint: endpoint.to_string(),
                after_secs: self.timeout.as_secs(),
            }
        } else if e.is_decode() {
            UpstreamError::InvalidResponse {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        } else {
            UpstreamError::Network {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        }
    }
}
