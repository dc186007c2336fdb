//! Request ID middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation ID on requests and responses.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Generate a new request ID using UUID v4
///
/// # Examples
///
/// ```
/// use gluetun_webui::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert_eq!(request_id.len(), 36);
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Tag each request with an ID and echo it on the response.
///
/// An incoming `x-request-id` is kept when it is a usable header value.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let value = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .cloned()
        .or_else(|| HeaderValue::from_str(&generate_request_id()).ok());

    if let Some(value) = &value {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let mut response = next.run(req).await;
    if let Some(value) = value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Span for `TraceLayer`, carrying the ID set by [`request_id`].
pub fn make_request_span(req: &Request) -> Span {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    )
}
