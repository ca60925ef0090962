use anyhow::Context;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared state of the presentation server. It only ever reads the
/// snapshot file written by the capture task; authentication state stays
/// on the other side of the filesystem boundary.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub snapshot_path: PathBuf,
    /// Client-side refresh interval for the image, in milliseconds.
    pub refresh_interval_ms: u64,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/latest", get(latest))
        .with_state(state)
}

/// Viewer page. The image source is re-requested client-side with a
/// timestamp cache-buster so the browser never serves a stale frame from
/// its own cache.
async fn index(State(state): State<Arc<ServerState>>) -> Html<String> {
    Html(format!(
        r#"<html>
<head>
<title>Camera</title>
<script>
    function reloadImage() {{
        const img = document.getElementById("cameraImage");
        img.src = "/latest?" + new Date().getTime();
    }}
    setInterval(reloadImage, {refresh_ms});
</script>
</head>
<body>
<img src="/latest" id="cameraImage" alt="Camera snapshot">
</body>
</html>
"#,
        refresh_ms = state.refresh_interval_ms
    ))
}

/// Latest stored frame, or a structured not-available answer before the
/// first successful capture cycle.
async fn latest(State(state): State<Arc<ServerState>>) -> Response {
    match tokio::fs::read(&state.snapshot_path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                debug!("Snapshot not available: {}", e);
            } else {
                error!(
                    "Failed to read snapshot {}: {}",
                    state.snapshot_path.display(),
                    e
                );
            }
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "snapshot not available"})),
            )
                .into_response()
        }
    }
}

/// Binds on all interfaces and serves until the process terminates.
pub async fn serve(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Presentation server listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Presentation server terminated")?;
    Ok(())
}

#[cfg(test)]
mod tests_routes {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_router(snapshot_path: PathBuf) -> Router {
        router(Arc::new(ServerState {
            snapshot_path,
            refresh_interval_ms: 2500,
        }))
    }

    #[tokio::test]
    async fn test_index_page() {
        let dir = TempDir::new().unwrap();
        let app = create_test_router(dir.path().join("latest.jpg"));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains(r#"img.src = "/latest?""#));
        assert!(page.contains("setInterval(reloadImage, 2500)"));
    }

    #[tokio::test]
    async fn test_latest_before_first_capture() {
        let dir = TempDir::new().unwrap();
        let app = create_test_router(dir.path().join("latest.jpg"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["error"], "snapshot not available");
    }

    #[tokio::test]
    async fn test_latest_serves_stored_frame() {
        let dir = TempDir::new().unwrap();
        let snapshot_path = dir.path().join("latest.jpg");
        std::fs::write(&snapshot_path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let app = create_test_router(snapshot_path);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), [0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_latest_unreadable_path_still_answers_not_available() {
        let dir = TempDir::new().unwrap();
        // A directory at the snapshot path fails the read with something
        // other than NotFound; the browser still gets the 404 payload.
        let app = create_test_router(dir.path().to_path_buf());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["error"], "snapshot not available");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = TempDir::new().unwrap();
        let app = create_test_router(dir.path().join("latest.jpg"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
