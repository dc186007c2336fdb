//! Shared test utilities for gluetun-webui integration tests.
//!
//! Provides config builders, a router harness and canned Gluetun control
//! API mocks.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use gluetun_webui::api::{create_router, AppState};
use gluetun_webui::config::{InstanceId, WebUiConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Service;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Address that refuses connections.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

// =============================================================================
// Config Builders
// =============================================================================

/// Config with instance 1 pointing at `url` and instance 2 unconfigured.
pub fn config_for(url: &str) -> WebUiConfig {
    let mut config = WebUiConfig::default();
    let one = config.instances.settings_mut(InstanceId::One);
    one.name = Some("Home".to_string());
    one.url = Some(url.to_string());
    config
}

/// Config with an API key for instance 1.
pub fn config_with_key(url: &str, key: &str) -> WebUiConfig {
    let mut config = config_for(url);
    config.instances.settings_mut(InstanceId::One).api_key = Some(key.to_string());
    config
}

// =============================================================================
// Router Harness
// =============================================================================

pub fn app(config: WebUiConfig) -> Router {
    let state = Arc::new(AppState::new(Arc::new(config)).unwrap());
    create_router(state)
}

/// A response with its body parsed as JSON (`Value::Null` when it is not).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub json: Value,
}

pub async fn send(app: &mut Router, request: Request<Body>) -> TestResponse {
    let response = app.call(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).to_string();
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        text,
        json,
    }
}

pub async fn get(app: &mut Router, uri: &str) -> TestResponse {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn put(app: &mut Router, uri: &str) -> TestResponse {
    send(
        app,
        Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Serve the full router on an ephemeral port; returns its base URL.
pub async fn spawn_server(config: WebUiConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(config);
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{}", addr)
}

// =============================================================================
// Gluetun Mocks
// =============================================================================

pub async fn mount_json(
    server: &MockServer,
    http_method: &str,
    route: &str,
    status: u16,
    body: Value,
) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// A Gluetun whose every endpoint answers with plausible data.
pub async fn mount_gluetun(server: &MockServer, status: &str) {
    mount_json(server, "GET", "/v1/vpn/status", 200, json!({ "status": status })).await;
    mount_json(
        server,
        "GET",
        "/v1/publicip/ip",
        200,
        json!({
            "public_ip": "203.0.113.7",
            "country": "Netherlands",
            "region": "North Holland",
            "city": "Amsterdam",
            "organization": "Example Transit",
            "hostname": "nl-ams-042"
        }),
    )
    .await;
    mount_json(server, "GET", "/v1/portforward", 200, json!({ "port": 51413 })).await;
    mount_json(server, "GET", "/v1/dns/status", 200, json!({ "status": "running" })).await;
    mount_json(
        server,
        "GET",
        "/v1/vpn/settings",
        200,
        json!({ "type": "wireguard", "provider": { "name": "protonvpn" } }),
    )
    .await;
}
