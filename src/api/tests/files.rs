use super::*;

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_list_files() {
    let (downloader, app, _temp_dir) = test_app(FakeExtractor::new("t")).await;
    let out = &downloader.config.download.download_dir;
    std::fs::write(out.join("Song.mp3"), b"abc").unwrap();
    std::fs::write(out.join("Clip.mp4"), b"abcdef").unwrap();

    let response = send_get(app, "/api/downloads").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "Clip.mp4");
    assert_eq!(files[0]["size_bytes"], 6);
    assert_eq!(files[1]["filename"], "Song.mp3");
}

#[tokio::test]
async fn test_fetch_file_streams_attachment() {
    let (downloader, app, _temp_dir) = test_app(FakeExtractor::new("t")).await;
    std::fs::write(
        downloader.config.download.download_dir.join("My Song.mp3"),
        b"mp3 bytes",
    )
    .unwrap();

    let response = send_get(app, "/api/download/My%20Song.mp3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert_eq!(headers["content-length"], "9");
    let disposition = headers["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"), "{disposition}");
    assert!(disposition.contains("filename=\"My Song.mp3\""), "{disposition}");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"mp3 bytes");
}

#[tokio::test]
async fn test_fetch_missing_file_is_404() {
    let (_downloader, app, _temp_dir) = test_app(FakeExtractor::new("t")).await;

    let response = send_get(app, "/api/download/ghost.mp4").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_traversal_is_400_for_fetch_and_delete() {
    let (_downloader, app, temp_dir) = test_app(FakeExtractor::new("t")).await;
    std::fs::write(temp_dir.path().join("secret.txt"), b"s").unwrap();

    for uri_name in ["..%2Fsecret.txt", "..%2F..%2Fetc%2Fpasswd", "%2E%2E"] {
        let response = send_get(app.clone(), &format!("/api/download/{uri_name}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "fetch {uri_name}");
        assert_eq!(body_json(response).await["error"]["code"], "invalid_filename");

        let response = app
            .clone()
            .oneshot(delete_request(&format!("/api/downloads/{uri_name}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "delete {uri_name}");
    }

    assert!(temp_dir.path().join("secret.txt").exists());
}

#[tokio::test]
async fn test_delete_file() {
    let (downloader, app, _temp_dir) = test_app(FakeExtractor::new("t")).await;
    let path = downloader.config.download.download_dir.join("Clip.mp4");
    std::fs::write(&path, b"video").unwrap();

    let response = app
        .clone()
        .oneshot(delete_request("/api/downloads/Clip.mp4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "deleted");
    assert_eq!(body["filename"], "Clip.mp4");
    assert!(!path.exists());

    let response = app
        .oneshot(delete_request("/api/downloads/Clip.mp4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
