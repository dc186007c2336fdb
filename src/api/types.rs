//! Wire types of the dashboard API.
//!
//! Every response is an envelope with an `ok` flag: `{ok: true, data}` on
//! success and `{ok: false, error}` on failure.

use crate::config::{InstanceConfig, InstanceId};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Entry of `GET /api/instances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub name: String,
    pub configured: bool,
}

impl From<&InstanceConfig> for InstanceSummary {
    fn from(instance: &InstanceConfig) -> Self {
        Self {
            id: instance.id,
            name: instance.name.clone(),
            configured: instance.is_configured(),
        }
    }
}

/// Outcome of one upstream call inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubResult {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Payload of a successful call.
    pub fn data(&self) -> Option<&Value> {
        if self.ok {
            self.data.as_ref()
        } else {
            None
        }
    }
}

/// Aggregate of the five per-instance upstream calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub ok: bool,
    pub timestamp: DateTime<Utc>,
    /// Set only when the primary VPN status call was rejected with 401
    pub auth_error: bool,
    pub vpn_status: SubResult,
    pub public_ip: SubResult,
    pub port_forwarded: SubResult,
    pub dns_status: SubResult,
    pub vpn_settings: SubResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sub_result_wire_format() {
        let ok = serde_json::to_value(SubResult::success(json!({"status": "running"}))).unwrap();
        assert_eq!(ok, json!({"ok": true, "data": {"status": "running"}}));

        let failed = serde_json::to_value(SubResult::failure("Upstream error")).unwrap();
        assert_eq!(failed, json!({"ok": false, "error": "Upstream error"}));
    }

    #[test]
    fn test_sub_result_data_requires_ok() {
        let odd = SubResult {
            ok: false,
            data: Some(json!({"port": 1})),
            error: None,
        };
        assert!(odd.data().is_none());
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let snapshot = HealthSnapshot {
            ok: true,
            timestamp: Utc::now(),
            auth_error: false,
            vpn_status: SubResult::failure("Upstream error"),
            public_ip: SubResult::failure("Upstream error"),
            port_forwarded: SubResult::failure("Upstream error"),
            dns_status: SubResult::failure("Upstream error"),
            vpn_settings: SubResult::failure("Upstream error"),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "ok",
            "timestamp",
            "authError",
            "vpnStatus",
            "publicIp",
            "portForwarded",
            "dnsStatus",
            "vpnSettings",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_instance_summary_serialization() {
        let summary = InstanceSummary {
            id: InstanceId::One,
            name: "Gluetun 1".to_string(),
            configured: true,
        };
        assert_eq!(
            serde_json::to_value(ApiResponse::new(vec![summary])).unwrap(),
            json!({"ok": true, "data": [{"id": "1", "name": "Gluetun 1", "configured": true}]})
        );
    }
}
