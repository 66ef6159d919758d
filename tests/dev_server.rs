mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use novel_ssr::dev::{self, DevState, FsDevHost};
use novel_ssr::render::RenderEnv;
use tempfile::TempDir;

use common::{Offline, SHELL};

const MANIFEST: &str = r#"{
    "components/layout": ["/assets/index.js"],
    "pages/chapter": ["/assets/chapter.js", "/assets/reader.woff2"]
}"#;

fn write_fixture(dir: &Path) {
    fs::write(dir.join("index.html"), SHELL).unwrap();
    fs::write(dir.join("ssr-manifest.json"), MANIFEST).unwrap();
}

fn server_with(dir: &TempDir, env: RenderEnv) -> TestServer {
    let host = FsDevHost::new(
        dir.path().join("index.html"),
        dir.path().join("ssr-manifest.json"),
        "/@vite/client",
    );
    let app = dev::router(DevState {
        host: Arc::new(host),
        env: Arc::new(env),
    });
    TestServer::new(app).unwrap()
}

fn server(dir: &TempDir) -> TestServer {
    server_with(dir, common::env())
}

#[tokio::test]
async fn test_renders_with_live_manifest() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server(&dir);

    let res = server.get("/en/novel/silver-wolf/1").await;
    res.assert_status_ok();
    let html = res.text();

    assert!(html.contains(r#"<script type="module" src="/@vite/client"></script>"#));
    assert!(html.contains(r#"<html lang="en">"#));
    assert!(html.contains("<p>The guard at the gate did not look up.</p>"));
    assert!(html.contains(r#"<link rel="modulepreload" crossorigin href="/assets/chapter.js">"#));
    assert!(html.contains(r#"type="font/woff2""#));
}

#[tokio::test]
async fn test_client_entry_returns_shell() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server(&dir);

    let res = server
        .get("/en/novel/silver-wolf")
        .add_query_param("client_entry", "1")
        .await;
    res.assert_status_ok();
    let html = res.text();
    assert!(html.contains("<!--app-html-->"));
    assert!(html.contains("/@vite/client"));
    assert!(!html.contains("The Silver Wolf"));
}

#[tokio::test]
async fn test_post_and_unprefixed_paths_render_without_redirect() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server(&dir);

    let res = server.post("/ja/").await;
    res.assert_status_ok();
    assert!(res.text().contains(r#"<html lang="ja">"#));

    let res = server.get("/").await;
    res.assert_status_ok();
    assert!(res.text().contains(r#"<html lang="en">"#));
}

#[tokio::test]
async fn test_shell_changes_are_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server(&dir);

    server.get("/en/").await.assert_status_ok();
    fs::write(
        dir.path().join("index.html"),
        SHELL.replace("<body>", r#"<body class="edited">"#),
    )
    .unwrap();

    assert!(server.get("/en/").await.text().contains(r#"<body class="edited">"#));
}

#[tokio::test]
async fn test_cookies_reach_the_render() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server(&dir);

    let res = server
        .get("/zh/")
        .add_header(header::COOKIE, HeaderValue::from_static("theme=light"))
        .await;
    assert!(res.text().contains("theme-light"));
}

#[tokio::test]
async fn test_errors_return_full_detail() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let server = server_with(&dir, common::env_with(Offline));

    let res = server.get("/en/").await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = res.text();
    assert!(detail.starts_with("route resolution failed for /en/"));
    assert!(detail.contains("caused by: failed to load novel list"));
}

#[tokio::test]
async fn test_missing_shell_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(&dir);

    let res = server.get("/en/").await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().contains("index.html"));
}
