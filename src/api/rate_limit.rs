//! Fixed-window request budgets per client IP.
//!
//! Counters live in process memory. A window opens on a client's first
//! request and resets once `window_seconds` have passed.

use super::error::ApiError;
use crate::config::WindowBudget;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tracked clients above which expired windows are swept on insert.
const SWEEP_THRESHOLD: usize = 4096;

/// Body sent with a 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitResponse {
    /// `{ok: false, error}` for API routes
    Json,
    /// Plain text for browser-facing routes
    Text(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl Decision {
    /// Set `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        let reset = self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0);
        headers.insert("ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(reset));
    }
}

/// A named fixed-window limiter.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    name: &'static str,
    budget: WindowBudget,
    response: LimitResponse,
    windows: DashMap<IpAddr, Window>,
}

impl FixedWindowLimiter {
    pub fn new(name: &'static str, budget: WindowBudget, response: LimitResponse) -> Self {
        Self {
            name,
            budget,
            response,
            windows: DashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Count one request from `client`.
    pub fn check(&self, client: IpAddr) -> Decision {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let window_len = self.budget.window();

        if self.windows.len() >= SWEEP_THRESHOLD && !self.windows.contains_key(&client) {
            self.sweep(now);
        }

        let mut entry = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        let window = entry.value_mut();
        if now.saturating_duration_since(window.started) >= window_len {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let allowed = window.count < self.budget.max_requests;
        if allowed {
            window.count += 1;
        }

        Decision {
            allowed,
            limit: self.budget.max_requests,
            remaining: self.budget.max_requests.saturating_sub(window.count),
            reset_after: window_len.saturating_sub(now.saturating_duration_since(window.started)),
        }
    }

    /// Drop windows that have already expired.
    pub fn sweep(&self, now: Instant) {
        let window_len = self.budget.window();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window_len);
    }

    /// Number of clients with an open window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn rejection(&self) -> Response {
        match self.response {
            LimitResponse::Json => ApiError::too_many_requests().into_response(),
            LimitResponse::Text(message) => (StatusCode::TOO_MANY_REQUESTS, message).into_response(),
        }
    }
}

/// The three limiters of the HTTP surface.
#[derive(Debug, Clone)]
pub struct RateLimiters {
    pub read: Arc<FixedWindowLimiter>,
    pub action: Arc<FixedWindowLimiter>,
    pub ui: Arc<FixedWindowLimiter>,
}

impl RateLimiters {
    pub fn from_config(config: &crate::config::RateLimitConfig) -> Self {
        Self {
            read: Arc::new(FixedWindowLimiter::new("read", config.read, LimitResponse::Json)),
            action: Arc::new(FixedWindowLimiter::new(
                "action",
                config.action,
                LimitResponse::Json,
            )),
            ui: Arc::new(FixedWindowLimiter::new(
                "ui",
                config.ui,
                LimitResponse::Text("Too many requests for the web UI, please try again later."),
            )),
        }
    }
}

/// Client address from the connection, or `0.0.0.0` when the router runs
/// without connect info (tests, in-process calls).
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware enforcing `limiter` on every request it wraps.
pub async fn enforce(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_ip(&req);
    let decision = limiter.check(client);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(
            limiter = limiter.name(),
            client = %client,
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        limiter.rejection()
    };

    decision.apply_headers(response.headers_mut());
    response
}
