mod common;

use std::fs;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use novel_ssr::config::{AppConfig, ServeMode};
use novel_ssr::server::build_app;
use tempfile::TempDir;
use tower::ServiceExt;

fn fixture() -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let client = dir.path().join("client");
    fs::create_dir_all(client.join("assets")).unwrap();
    fs::write(client.join("index.html"), common::SHELL).unwrap();
    fs::write(client.join("assets/app.js"), "console.log('app')").unwrap();
    fs::write(
        client.join("ssr-manifest.json"),
        r#"{"components/layout": ["/assets/app.js"]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("catalog.json"), common::CATALOG).unwrap();

    let mut config = AppConfig::load_from_args(["novel-ssr"]).unwrap();
    config.paths.index_html = client.join("index.html");
    config.paths.manifest = client.join("ssr-manifest.json");
    config.paths.client_dir = client;
    config.paths.catalog = Some(dir.path().join("catalog.json"));
    (dir, config)
}

async fn text(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_production_serves_assets_then_renders() {
    let (_dir, mut config) = fixture();
    config.server.mode = ServeMode::Production;
    let app = build_app(&config).await.unwrap();

    let res = app.clone().oneshot(get("/assets/app.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(text(res).await, "console.log('app')");

    let res = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()[header::LOCATION], "/en/");

    let res = app.clone().oneshot(get("/en/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = text(res).await;
    assert!(html.contains("The Silver Wolf"));
    assert!(html.contains(r#"<link rel="modulepreload" crossorigin href="/assets/app.js">"#));

    let res = app.oneshot(get("/en/novel/nobody")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dev_mode_uses_dev_middleware() {
    let (_dir, mut config) = fixture();
    config.server.mode = ServeMode::Dev;
    let app = build_app(&config).await.unwrap();

    let res = app.clone().oneshot(get("/?client_entry")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let shell = text(res).await;
    assert!(shell.contains(r#"<script type="module" src="/@vite/client"></script>"#));
    assert!(shell.contains("<!--app-html-->"));

    let req = Request::builder()
        .method("POST")
        .uri("/zh/novel/tiger-ledger")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text(res).await.contains("Tiger&#39;s Ledger"));
}

#[tokio::test]
async fn test_production_requires_shell() {
    let (dir, mut config) = fixture();
    config.paths.index_html = dir.path().join("missing.html");
    assert!(build_app(&config).await.is_err());
}
