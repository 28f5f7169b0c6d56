//! End-to-end routing through `Site::handle` over an in-memory content service

use std::sync::Arc;

use folio_core::content::{ContentStore, MemoryTransport};
use folio_core::http::{RequestContext, Resp};
use folio_core::{FolioConfig, Site};
use http::{header, Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};

const FIXTURES: &str = r#"{
  "collections": {
    "global": { "kind": "singleton", "item": { "title": "My Site", "description": "Welcome" } },
    "authors": { "kind": "items", "primary_key": "id", "items": [
      { "id": 1, "name": "Ada Lovelace" },
      { "id": 2, "name": "Grace Hopper" }
    ] },
    "directus_files": { "kind": "items", "primary_key": "id", "items": [
      { "id": "f-1", "filename_disk": "abc.jpg", "description": "Punch cards" }
    ] },
    "pages": { "kind": "items", "primary_key": "slug", "items": [
      { "slug": "about", "title": "About", "content": "<p>About us</p><script>evil()</script>" }
    ] },
    "posts": { "kind": "items", "primary_key": "slug", "items": [
      { "slug": "engines", "title": "Analytical Engines", "content": "<p>Notes</p>",
        "publish_date": "2024-02-01", "author": 1, "image": "f-1" },
      { "slug": "compilers", "title": "Compilers", "content": "<p>A-0</p>",
        "publish_date": "2024-05-20", "author": 2, "image": null }
    ] }
  },
  "relations": [
    { "collection": "posts", "field": "author", "related": "authors" },
    { "collection": "posts", "field": "image", "related": "directus_files" }
  ]
}"#;

fn config() -> FolioConfig {
    let mut config = FolioConfig::default();
    config.content.url = Some("https://cms.example.com".to_string());
    config.site.name = "My Site".to_string();
    config
}

fn site_with(config: &FolioConfig) -> (Site, Arc<MemoryTransport>) {
    let store = ContentStore::from_json_str(FIXTURES).unwrap();
    let transport = Arc::new(MemoryTransport::new(store));
    let site = Site::with_transport(config, transport.clone()).unwrap();
    (site, transport)
}

fn site() -> (Site, Arc<MemoryTransport>) {
    site_with(&config())
}

async fn body(resp: Resp) -> String {
    String::from_utf8(resp.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap()
}

fn json_get(path: &str) -> RequestContext {
    RequestContext::get(path).unwrap().with_header(header::ACCEPT, "application/json")
}

#[tokio::test]
async fn home_renders_global_settings() {
    let (site, transport) = site();
    let resp = site.handle(RequestContext::get("/").unwrap()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    let html = body(resp).await;
    assert!(html.contains("<h1>My Site</h1>"));
    assert!(html.contains("Welcome"));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn home_data_bag_as_json() {
    let (site, _) = site();
    let resp = site.handle(json_get("/")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = serde_json::from_str(&body(resp).await).unwrap();
    assert_eq!(data, json!({ "global": { "title": "My Site", "description": "Welcome" } }));
}

#[tokio::test]
async fn blog_listing_newest_first() {
    let (site, _) = site();
    let data: Value = serde_json::from_str(&body(site.handle(json_get("/blog")).await).await).unwrap();

    let slugs: Vec<&str> = data["posts"].as_array().unwrap().iter().map(|p| p["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, vec!["compilers", "engines"]);
    assert_eq!(data["posts"][0]["author"]["name"], "Grace Hopper");

    let html = body(site.handle(RequestContext::get("/blog/").unwrap()).await).await;
    assert!(html.contains("Compilers"));
    assert!(html.contains("May 20, 2024"));
}

#[tokio::test]
async fn post_detail() {
    let (site, _) = site();
    let resp = site.handle(RequestContext::get("/blog/engines").unwrap()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body(resp).await;
    assert!(html.contains("Analytical Engines"));
    assert!(html.contains("abc.jpg?width=600"));
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("February 1, 2024"));
}

#[tokio::test]
async fn missing_post_renders_not_found_page() {
    let (site, transport) = site();
    let resp = site.handle(RequestContext::get("/blog/hello-world").unwrap()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let html = body(resp).await;
    assert!(html.contains("Post not found"));
    assert!(!html.contains(r#"<article class="post">"#));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn missing_post_as_json() {
    let (site, _) = site();
    let resp = site.handle(json_get("/blog/hello-world")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let data: Value = serde_json::from_str(&body(resp).await).unwrap();
    assert_eq!(data, json!({ "error": "not_found", "message": "Post not found" }));
}

#[tokio::test]
async fn page_is_sanitized() {
    let (site, _) = site();
    let resp = site.handle(RequestContext::get("/about").unwrap()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body(resp).await;
    assert!(html.contains("<p>About us</p>"));
    assert!(!html.contains("evil()"));
}

#[tokio::test]
async fn missing_page_and_unrouted_paths() {
    let (site, _) = site();

    let resp = site.handle(RequestContext::get("/nope").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body(resp).await.contains("Page not found"));

    let resp = site.handle(RequestContext::get("/a/b/c").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_slug_stays_inside_the_collection() {
    let (site, _) = site();
    let resp = site.handle(RequestContext::get("/blog/..%2Fglobal").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
    let (site, transport) = site();
    transport.set_offline(true);

    let resp = site.handle(RequestContext::get("/blog/engines").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body(resp).await;
    assert!(html.contains("Something went wrong"));
    assert!(!html.contains("unreachable"));

    let resp = site.handle(json_get("/")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let data: Value = serde_json::from_str(&body(resp).await).unwrap();
    assert_eq!(data["error"], "internal_error");
}

#[tokio::test]
async fn healthz_needs_no_content_service() {
    let (site, transport) = site();
    transport.set_offline(true);

    let resp = site.handle(RequestContext::get("/healthz").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await, r#"{"status":"ok"}"#);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn non_get_is_rejected() {
    let (site, transport) = site();
    let mut ctx = RequestContext::get("/blog").unwrap();
    ctx.method = Method::POST;

    let resp = site.handle(ctx).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body { margin: 0 }").unwrap();
    std::fs::write(dir.path().join("secret.txt"), "nope").unwrap();

    let mut config = config();
    config.site.static_dir = Some(dir.path().to_path_buf());
    let (site, _) = site_with(&config);

    let resp = site.handle(RequestContext::get("/static/css/site.css").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css");
    assert_eq!(body(resp).await, "body { margin: 0 }");

    let resp = site.handle(RequestContext::get("/static/css/..%2F..%2Fsecret.txt").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = site.handle(RequestContext::get("/static/missing.js").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_route_without_directory() {
    let (site, _) = site();
    let resp = site.handle(RequestContext::get("/static/site.css").unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn site_layout_from_config() {
    let mut config = config();
    config.site.lang = "fr".to_string();
    config.site.nav = vec![folio_core::render::NavLink::new("Accueil", "/")];
    let (site, _) = site_with(&config);

    let html = body(site.handle(RequestContext::get("/").unwrap()).await).await;
    assert!(html.contains(r#"<html lang="fr">"#));
    assert!(html.contains(">Accueil</a>"));
    assert!(!html.contains(">Blog</a>"));
}
