//! Aggregate health snapshot endpoint.

use super::instances::ResolvedInstance;
use super::types::{HealthSnapshot, SubResult};
use super::AppState;
use crate::api::error::UPSTREAM_ERROR_MESSAGE;
use crate::config::InstanceConfig;
use crate::upstream::{endpoint, UpstreamClient, UpstreamError};
use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

/// Query all five endpoints of `instance` concurrently and fold the results.
///
/// Each call settles independently. Only a 401 from the primary status call
/// sets `auth_error`; restricted roles may legitimately deny the secondary
/// endpoints.
pub async fn collect_snapshot(
    client: &UpstreamClient,
    instance: &InstanceConfig,
) -> HealthSnapshot {
    let (vpn_status, public_ip, port_forwarded, dns_status, vpn_settings) = tokio::join!(
        client.get_with_fallback(instance, &endpoint::VPN_STATUS),
        client.get_with_fallback(instance, &endpoint::PUBLIC_IP),
        client.get_with_fallback(instance, &endpoint::PORT_FORWARD),
        client.get_with_fallback(instance, &endpoint::DNS_STATUS),
        client.get_with_fallback(instance, &endpoint::VPN_SETTINGS),
    );

    let auth_error = matches!(&vpn_status, Err(err) if err.is_unauthorized());

    HealthSnapshot {
        ok: true,
        timestamp: chrono::Utc::now(),
        auth_error,
        vpn_status: settle(instance, vpn_status),
        public_ip: settle(instance, public_ip),
        port_forwarded: settle(instance, port_forwarded),
        dns_status: settle(instance, dns_status),
        vpn_settings: settle(instance, vpn_settings),
    }
}

fn settle(instance: &InstanceConfig, result: Result<Value, UpstreamError>) -> SubResult {
    match result {
        Ok(data) => SubResult::success(data),
        Err(err) => {
            tracing::error!(
                instance = %instance.id,
                endpoint = err.endpoint(),
                error = %err,
                "Upstream call failed"
            );
            SubResult::failure(UPSTREAM_ERROR_MESSAGE)
        }
    }
}

/// GET /api/health - Aggregate snapshot for one instance.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Json<HealthSnapshot> {
    Json(collect_snapshot(&state.upstream, &instance.0).await)
}
