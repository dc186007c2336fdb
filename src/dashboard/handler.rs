//! Static handler for the embedded browser UI

use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use crate::api::ApiError;

/// Embedded dashboard assets from dashboard/ directory
#[derive(RustEmbed)]
#[folder = "dashboard/"]
struct DashboardAssets;

/// The page every unmatched browser path resolves to.
pub const INDEX: &str = "index.html";

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn asset_response(path: &str) -> Option<Response> {
    let content = DashboardAssets::get(path)?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    Some(([(header::CONTENT_TYPE, mime_type.as_ref())], content.data).into_response())
}

/// Fallback for everything the API routes do not match.
///
/// Unknown `/api/*` paths get a JSON 404. Other GET and HEAD requests get
/// the named asset when it exists and the UI shell otherwise, so that
/// client-side paths survive a reload.
pub async fn serve_ui(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if is_api_path(path) {
        return ApiError::not_found().into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let asset = path.trim_start_matches('/');
    if !asset.is_empty() {
        if let Some(response) = asset_response(asset) {
            return response;
        }
    }

    match asset_response(INDEX) {
        Some(response) => response,
        None => {
            tracing::error!("Embedded index.html is missing");
            ApiError::internal().into_response()
        }
    }
}
