use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{TestApp, body_json};

#[tokio::test]
async fn lists_items_newest_first_with_poster_paths() -> Result<()> {
    let app = TestApp::new(None)?;
    app.item("OLD-001", Some("<movie><title>Old one</title></movie>"), 100)?;
    app.item("NEW-001", None, 300)?;
    std::fs::create_dir(app.root().join("NOPOSTER-1"))?;
    app.rebuild().await?;

    let response = app.get("/api/videos").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!([
            {"id": "NEW-001", "title": "NEW-001", "poster": "/file/NEW-001/NEW-001-poster.jpg"},
            {"id": "OLD-001", "title": "Old one", "poster": "/file/OLD-001/OLD-001-poster.jpg"},
        ])
    );
    Ok(())
}

#[tokio::test]
async fn empty_library_lists_an_empty_array() -> Result<()> {
    let app = TestApp::new(None)?;
    app.rebuild().await?;
    let response = app.get("/api/videos").await?;
    assert_eq!(body_json(response).await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn detail_without_descriptor_uses_defaults() -> Result<()> {
    let app = TestApp::new(None)?;
    app.item("ABC-001", None, 100)?;

    let response = app.get("/api/videos/ABC-001").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!({
            "id": "ABC-001",
            "title": "ABC-001",
            "releaseDate": "Unknown",
            "fanarts": [],
        })
    );
    Ok(())
}

#[tokio::test]
async fn detail_reports_ordered_fanart_and_video() -> Result<()> {
    let app = TestApp::new(None)?;
    app.item(
        "ABC-002",
        Some("<movie><title>Two</title><premiered>2023-05-06</premiered></movie>"),
        100,
    )?;
    app.file("ABC-002", "ABC-002-fanart-2.jpg", b"2")?;
    app.file("ABC-002", "ABC-002-fanart.jpg", b"x")?;
    app.file("ABC-002", "ABC-002-fanart-1.jpg", b"1")?;
    app.file("ABC-002", "ABC-002.mp4", b"video")?;

    let value = body_json(app.get("/api/videos/ABC-002").await?).await?;
    assert_eq!(value["title"], "Two");
    assert_eq!(value["releaseDate"], "2023-05-06");
    assert_eq!(
        value["fanarts"],
        json!([
            "/file/ABC-002/ABC-002-fanart-1.jpg",
            "/file/ABC-002/ABC-002-fanart-2.jpg",
            "/file/ABC-002/ABC-002-fanart.jpg",
        ])
    );
    assert_eq!(value["videoFile"], "/file/ABC-002/ABC-002.mp4");
    Ok(())
}

#[tokio::test]
async fn detail_rejects_invalid_identifier() -> Result<()> {
    let app = TestApp::new(None)?;
    let response = app.get("/api/videos/..").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await?;
    assert_eq!(value["error"]["status"], 400);
    Ok(())
}

#[tokio::test]
async fn health_reports_catalog_status() -> Result<()> {
    let app = TestApp::new(None)?;
    app.item("A-1", None, 100)?;
    app.rebuild().await?;

    let value = body_json(app.get("/api/health").await?).await?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["catalog"]["items"], 1);
    assert!(value["catalog"]["built_at"].is_string());
    assert_eq!(value["enqueue_enabled"], true);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_rejected() -> Result<()> {
    let app = TestApp::new(None)?;
    let request = axum::http::Request::delete("/api/videos").body(axum::body::Body::empty())?;
    let response = app.send(request).await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() -> Result<()> {
    let app = TestApp::new(None)?;
    let request = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/videos")
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "GET")
        .body(axum::body::Body::empty())?;
    let response = app.send(request).await?;
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    Ok(())
}
