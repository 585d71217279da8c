//! Filesystem serving for alias rewrites and passthrough requests.
//!
//! Both go through `ServeDir`, which percent-decodes the path, refuses `..`
//! traversal outside its root and handles conditional and range requests.
//! A directory requested without a trailing slash is redirected to the
//! slash form of the path the client asked for, not the rewritten one.

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::response::not_found;
use crate::routing::Rewrite;

/// Serve an alias hit: the remainder is looked up inside the replacement directory.
pub async fn serve_rewrite(rewrite: &Rewrite<'_>, request: Request<Body>) -> Response {
    let original = request.uri().clone();
    let mut response = serve_dir(rewrite.root(), &rewrite.remainder, request).await;

    if response.status().is_redirection() && response.headers().contains_key(header::LOCATION) {
        match directory_location(&original) {
            Some(location) => {
                response.headers_mut().insert(header::LOCATION, location);
            }
            None => return not_found(),
        }
    }
    response
}

/// `Location` for a directory hit: the client's own path with a trailing slash.
fn directory_location(original: &Uri) -> Option<HeaderValue> {
    let mut location = format!("{}/", original.path());
    if let Some(query) = original.query() {
        location.push('?');
        location.push_str(query);
    }
    HeaderValue::from_str(&location).ok()
}

/// Default handler: serve the request path from `static_root`, or 404 without one.
pub async fn serve_passthrough(static_root: Option<&Path>, request: Request<Body>) -> Response {
    match static_root {
        Some(root) => {
            let path = request.uri().path().to_string();
            serve_dir(root, &path, request).await
        }
        None => not_found(),
    }
}

async fn serve_dir(root: &Path, path: &str, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let local = format!("/{}", path.trim_start_matches('/'));
    parts.uri = match Uri::try_from(local) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Rejected static path");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let result: Result<_, Infallible> = ServeDir::new(root)
        .oneshot(Request::from_parts(parts, body))
        .await;
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
