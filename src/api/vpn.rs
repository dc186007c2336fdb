//! VPN start/stop action endpoint.

use super::error::ApiError;
use super::instances::ResolvedInstance;
use super::types::ApiResponse;
use super::AppState;
use crate::upstream::VpnState;
use axum::extract::{Path, State};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

/// User-facing tunnel action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpnAction {
    Start,
    Stop,
}

impl VpnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VpnAction::Start => "start",
            VpnAction::Stop => "stop",
        }
    }

    /// Status value the control API expects for this action.
    pub fn target_state(&self) -> VpnState {
        match self {
            VpnAction::Start => VpnState::Running,
            VpnAction::Stop => VpnState::Stopped,
        }
    }
}

impl FromStr for VpnAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(VpnAction::Start),
            "stop" => Ok(VpnAction::Stop),
            _ => Err(ApiError::invalid_action()),
        }
    }
}

/// PUT /api/vpn/:action - Start or stop the tunnel.
///
/// The action is validated before the instance so that a bad action is
/// reported even when the selector is also wrong.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    instance: Result<ResolvedInstance, ApiError>,
) -> Result<ApiResponse<Value>, ApiError> {
    let action: VpnAction = action.parse()?;
    let ResolvedInstance(instance) = instance?;

    tracing::info!(instance = %instance.id, action = action.as_str(), "VPN action requested");

    let data = state
        .upstream
        .set_vpn_state(&instance, action.target_state())
        .await?;
    Ok(ApiResponse::new(data))
}
