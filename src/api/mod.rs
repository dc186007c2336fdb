//! # Dashboard API
//!
//! HTTP surface of the web UI: JSON proxy endpoints in front of each
//! instance's Gluetun control API, plus the embedded browser UI.
//!
//! ## Endpoints
//!
//! - `GET /api/instances` - Both instance slots and whether they are configured
//! - `GET /api/health?instance=N` - Aggregate snapshot of five upstream calls
//! - `GET /api/{status,publicip,portforwarded,settings,dns}?instance=N` - Passthroughs
//! - `PUT /api/vpn/{start,stop}?instance=N` - Change the tunnel state
//! - anything else under `/api/`, or a known path with the wrong method - 404
//! - every other GET - the UI (static asset or `index.html`)
//!
//! ## Example
//!
//! ```no_run
//! use gluetun_webui::api::{create_router, AppState};
//! use gluetun_webui::config::WebUiConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(WebUiConfig::default().with_env_overrides());
//! let state = Arc::new(AppState::new(config)?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every response carries an `ok` flag. Errors look like:
//! ```json
//! { "ok": false, "error": "Instance not configured" }
//! ```

pub mod error;
pub mod headers;
pub mod instances;
mod proxy;
pub mod rate_limit;
pub mod snapshot;
pub mod types;
pub mod vpn;

pub use error::ApiError;
pub use instances::ResolvedInstance;
pub use rate_limit::{FixedWindowLimiter, RateLimiters};
pub use snapshot::collect_snapshot;
pub use types::*;
pub use vpn::VpnAction;

use crate::config::{InstanceConfig, InstanceId, WebUiConfig};
use crate::upstream::UpstreamClient;
use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<WebUiConfig>,
    /// Both slots, resolved once at startup, in id order
    pub instances: Vec<InstanceConfig>,
    pub upstream: UpstreamClient,
    pub rate_limiters: RateLimiters,
}

impl AppState {
    /// Create application state with a client built from the configuration.
    pub fn new(config: Arc<WebUiConfig>) -> Result<Self, reqwest::Error> {
        let upstream =
            UpstreamClient::new(Duration::from_secs(config.upstream.timeout_seconds))?;
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create application state around an existing upstream client.
    pub fn with_upstream(config: Arc<WebUiConfig>, upstream: UpstreamClient) -> Self {
        Self {
            instances: config.resolve_instances(),
            rate_limiters: RateLimiters::from_config(&config.rate_limit),
            config,
            upstream,
        }
    }

    /// Resolved configuration of one slot.
    pub fn instance(&self, id: InstanceId) -> &InstanceConfig {
        match id {
            InstanceId::One => &self.instances[0],
            InstanceId::Two => &self.instances[1],
        }
    }
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    ApiError::internal().into_response()
}

/// JSON 404 for unknown `/api/*` paths and wrong methods on known ones.
async fn api_not_found() -> ApiError {
    ApiError::not_found()
}

/// Create the main router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let limiters = state.rate_limiters.clone();

    let read_routes = Router::new()
        .route("/instances", get(instances::list).fallback(api_not_found))
        .route("/health", get(snapshot::handle).fallback(api_not_found))
        .route("/status", get(proxy::status).fallback(api_not_found))
        .route("/publicip", get(proxy::public_ip).fallback(api_not_found))
        .route(
            "/portforwarded",
            get(proxy::port_forwarded).fallback(api_not_found),
        )
        .route("/settings", get(proxy::settings).fallback(api_not_found))
        .route("/dns", get(proxy::dns).fallback(api_not_found))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&limiters.read),
            rate_limit::enforce,
        ));

    let action_routes = Router::new()
        .route("/vpn/:action", put(vpn::handle).fallback(api_not_found))
        .route_layer(middleware::from_fn_with_state(
            limiters.action,
            rate_limit::enforce,
        ));

    // Unmatched paths under /api count against the read budget
    let api_fallback = Router::new()
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(
            limiters.read,
            rate_limit::enforce,
        ));

    let api_routes = Router::new()
        .merge(read_routes)
        .merge(action_routes)
        .merge(api_fallback);

    let ui_routes = Router::new()
        .fallback(crate::dashboard::handler::serve_ui)
        .layer(middleware::from_fn_with_state(
            limiters.ui,
            rate_limit::enforce,
        ));

    let router = Router::new()
        .nest("/api", api_routes)
        .with_state(Arc::clone(&state))
        .merge(ui_routes)
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(crate::logging::make_request_span))
        .layer(middleware::from_fn(crate::logging::request_id));

    headers::with_security_headers(router)
}
