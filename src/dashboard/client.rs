//! Client side of the dashboard API.
//!
//! [`HealthSource`] is what the poller talks to. [`DashboardClient`] is the
//! HTTP implementation used by the terminal commands; tests substitute
//! their own sources.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::api::error::NOT_CONFIGURED_MESSAGE;
use crate::api::{HealthSnapshot, InstanceSummary, VpnAction};
use crate::config::InstanceId;

/// Errors returned by a [`HealthSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Server answered with a non-2xx status or `ok: false`.
    ///
    /// `message` is the server's `error` field, or `HTTP <status>` without one.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Connection failed (DNS, refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Body was not the expected JSON.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// The server reports the instance as not configured.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ClientError::Http { message, .. } if message == NOT_CONFIGURED_MESSAGE)
    }
}

/// Source of instance lists, snapshots and actions.
#[async_trait]
pub trait HealthSource: Send + Sync + 'static {
    /// Both instance slots with names and configured flags.
    async fn instances(&self) -> Result<Vec<InstanceSummary>, ClientError>;

    /// Aggregate snapshot of one instance.
    async fn health(&self, id: InstanceId) -> Result<HealthSnapshot, ClientError>;

    /// Start or stop an instance's tunnel; returns the upstream reply.
    async fn vpn_action(&self, id: InstanceId, action: VpnAction) -> Result<Value, ClientError>;
}

/// Envelope fields shared by every API response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// HTTP client for a running `gluetun-webui serve`.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ClientError::Network(e.to_string())
        }
    }

    /// Send a request and read the `{ok, data|error}` envelope.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_error(e))?;

        let envelope: Option<Envelope> = serde_json::from_str(&text).ok();
        match envelope {
            Some(env) if status.is_success() && env.ok => {
                // Snapshots carry their fields at top level, others under `data`.
                match env.data {
                    Some(data) => Ok(data),
                    None => serde_json::from_str(&text)
                        .map_err(|e| ClientError::InvalidResponse(e.to_string())),
                }
            }
            Some(env) => Err(ClientError::Http {
                status: status.as_u16(),
                message: env
                    .error
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            }),
            None if status.is_success() => Err(ClientError::InvalidResponse(
                "response is not a JSON envelope".to_string(),
            )),
            None => Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            }),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.send(self.http.get(self.url(path))).await?;
        serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl HealthSource for DashboardClient {
    async fn instances(&self) -> Result<Vec<InstanceSummary>, ClientError> {
        self.get("/api/instances").await
    }

    async fn health(&self, id: InstanceId) -> Result<HealthSnapshot, ClientError> {
        self.get(&format!("/api/health?instance={}", id)).await
    }

    async fn vpn_action(&self, id: InstanceId, action: VpnAction) -> Result<Value, ClientError> {
        let path = format!("/api/vpn/{}?instance={}", action.as_str(), id);
        self.send(self.http.put(self.url(&path))).await
    }
}
