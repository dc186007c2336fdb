//! Instance listing and the per-request instance resolver.

use super::error::ApiError;
use super::types::{ApiResponse, InstanceSummary};
use super::AppState;
use crate::config::{InstanceConfig, InstanceId};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct InstanceParams {
    instance: Option<String>,
}

/// A configured instance selected by the `?instance=` query parameter.
///
/// Rejects with 400 when the selector is missing or not one of the known
/// ids, and with 503 when the instance has no base URL.
#[derive(Debug, Clone)]
pub struct ResolvedInstance(pub InstanceConfig);

impl ResolvedInstance {
    /// Resolve a raw selector against the state's instances.
    pub fn resolve(state: &AppState, selector: Option<&str>) -> Result<Self, ApiError> {
        let id: InstanceId = selector
            .ok_or_else(ApiError::invalid_instance)?
            .parse()
            .map_err(|_| ApiError::invalid_instance())?;

        let instance = state.instance(id);
        if !instance.is_configured() {
            return Err(ApiError::not_configured());
        }
        Ok(Self(instance.clone()))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ResolvedInstance {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // A malformed query string is treated like a missing selector.
        let selector = Query::<InstanceParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.instance);
        Self::resolve(state, selector.as_deref())
    }
}

/// GET /api/instances - List both slots with their configured flag.
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResponse<Vec<InstanceSummary>> {
    ApiResponse::new(state.instances.iter().map(InstanceSummary::from).collect())
}
