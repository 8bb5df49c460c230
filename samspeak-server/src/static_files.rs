use crate::http::ApiState;
use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode, Uri},
    response::IntoResponse,
};
use std::path::{Path, PathBuf};

pub async fn serve_static_handler(State(state): State<ApiState>, uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    // Prevent path traversal
    if path.contains("..") || path.contains("//") || path.contains('\\') {
        return plain(StatusCode::BAD_REQUEST, "Invalid path");
    }

    // Unmatched API paths are never served from the bundle
    if path.starts_with("api/") {
        return plain(StatusCode::NOT_FOUND, "Not found");
    }

    let Some(root) = state.static_dir.as_deref() else {
        return plain(StatusCode::NOT_FOUND, "Not found");
    };

    match resolve(root, path).await {
        Some(file) => match tokio::fs::read(&file).await {
            Ok(contents) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type(&file))
                .body(Body::from(contents))
                .unwrap_or_else(|_| internal_error()),
            Err(_) => plain(StatusCode::NOT_FOUND, "Not found"),
        },
        None => plain(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// The file itself, or `index.html` for client-side routes like `/editor`.
async fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    let candidate = if path.is_empty() {
        root.join("index.html")
    } else {
        root.join(path)
    };

    if tokio::fs::metadata(&candidate).await.map(|m| m.is_file()).unwrap_or(false) {
        return Some(candidate);
    }

    let looks_like_route = Path::new(path).extension().is_none();
    if looks_like_route {
        let index = root.join("index.html");
        if tokio::fs::metadata(&index).await.is_ok() {
            return Some(index);
        }
    }
    None
}

fn content_type(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(message))
        .unwrap_or_else(|_| internal_error())
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(Body::from("Internal server error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("manifest.json")), "application/json");
        assert_eq!(content_type(Path::new("favicon.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_routes_fall_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        assert_eq!(resolve(dir.path(), "").await, Some(dir.path().join("index.html")));
        assert_eq!(resolve(dir.path(), "editor").await, Some(dir.path().join("index.html")));
        assert_eq!(resolve(dir.path(), "missing.js").await, None);
    }
}
