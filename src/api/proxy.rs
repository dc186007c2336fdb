//! Single-endpoint passthroughs to an instance's control API.

use super::error::ApiError;
use super::instances::ResolvedInstance;
use super::types::ApiResponse;
use super::AppState;
use crate::upstream::endpoint::{self, FallbackChain};
use axum::extract::State;
use serde_json::Value;
use std::sync::Arc;

async fn passthrough(
    state: &AppState,
    instance: &ResolvedInstance,
    chain: &FallbackChain,
) -> Result<ApiResponse<Value>, ApiError> {
    let data = state
        .upstream
        .get_with_fallback(&instance.0, chain)
        .await?;
    Ok(ApiResponse::new(data))
}

/// GET /api/status - VPN run status.
pub async fn status(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<ApiResponse<Value>, ApiError> {
    passthrough(&state, &instance, &endpoint::VPN_STATUS).await
}

/// GET /api/publicip - Public IP and geolocation.
pub async fn public_ip(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<ApiResponse<Value>, ApiError> {
    passthrough(&state, &instance, &endpoint::PUBLIC_IP).await
}

/// GET /api/portforwarded - Forwarded port, with the legacy path as fallback.
pub async fn port_forwarded(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<ApiResponse<Value>, ApiError> {
    passthrough(&state, &instance, &endpoint::PORT_FORWARD).await
}

/// GET /api/settings - VPN settings, with the OpenVPN path as fallback.
pub async fn settings(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<ApiResponse<Value>, ApiError> {
    passthrough(&state, &instance, &endpoint::VPN_SETTINGS).await
}

/// GET /api/dns - DNS resolver status.
pub async fn dns(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<ApiResponse<Value>, ApiError> {
    passthrough(&state, &instance, &endpoint::DNS_STATUS).await
}
