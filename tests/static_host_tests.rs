// Integration tests for the static asset host
//
// These tests exercise the router directly with oneshot requests against a
// temporary asset tree.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use recorder_bridge::create_router;
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

const INDEX_HTML: &str = "<main>recorder</main>";
const APP_JS: &str = "console.log('recorder')";

fn asset_tree() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("index.html"), INDEX_HTML)?;
    fs::write(dir.path().join("app.js"), APP_JS)?;
    Ok(dir)
}

async fn get(router: axum::Router, uri: &str) -> Result<(StatusCode, Vec<u8>)> {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes().to_vec();
    Ok((status, body))
}

#[tokio::test]
async fn test_serves_static_asset() -> Result<()> {
    let dir = asset_tree()?;
    let router = create_router(dir.path(), "index.html");

    let (status, body) = get(router, "/app.js").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, APP_JS.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_root_serves_entry_document() -> Result<()> {
    let dir = asset_tree()?;
    let router = create_router(dir.path(), "index.html");

    let (status, body) = get(router, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX_HTML.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_unmatched_route_falls_back_to_entry_document() -> Result<()> {
    let dir = asset_tree()?;
    let router = create_router(dir.path(), "index.html");

    let (status, body) = get(router, "/recordings/42").await?;
    assert_eq!(status, StatusCode::OK, "client-side routes must not 404");
    assert_eq!(body, INDEX_HTML.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let dir = asset_tree()?;
    let router = create_router(dir.path(), "index.html");

    let (status, body) = get(router, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
    Ok(())
}
