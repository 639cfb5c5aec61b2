use super::*;
use crate::downloader::test_helpers::FakeExtractor;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;

mod files;

/// Helper to create a test MediaDownloader wrapped in Arc, plus its router
async fn test_app(extractor: FakeExtractor) -> (Arc<MediaDownloader>, Router, tempfile::TempDir) {
    let (downloader, temp_dir) =
        crate::downloader::test_helpers::create_test_downloader(extractor).await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.get_config());
    (downloader, app, temp_dir)
}

async fn send_get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_cors_enabled() {
    let (downloader, _app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (downloader, _app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (downloader, _app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_origins = vec!["http://allowed.test".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://allowed.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.test"
    );
}

#[tokio::test]
async fn test_server_starts_and_responds_to_health() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (downloader, _app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    let mut config = (*downloader.config).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let listener = TcpListener::bind(config.server.api.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let app = create_router(downloader, Arc::new(config));
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut raw))
        .await
        .unwrap()
        .unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    assert!(raw.contains("\"status\":\"ok\""), "{raw}");

    server_handle.abort();
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    let (downloader, _app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    // Occupy a port, then ask the server to bind the same one
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = (*downloader.config).clone();
    config.server.api.bind_address = taken.local_addr().unwrap();

    let result = start_api_server(downloader, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}
