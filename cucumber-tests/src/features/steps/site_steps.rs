use cucumber::{given, then, when};
use folio_core::render::MarkupPolicy;
use serde_json::json;

use crate::features::world::FolioWorld;

#[given(expr = "the site is named {string}")]
async fn given_site_name(world: &mut FolioWorld, name: String) {
    world.config.site.name = name;
}

#[given("rich text is trusted")]
async fn given_trusted(world: &mut FolioWorld) {
    world.config.content.markup = MarkupPolicy::Trusted;
}

#[given(expr = "a page {string} titled {string} with content {string}")]
async fn given_page(world: &mut FolioWorld, slug: String, title: String, content: String) {
    world.transport.update(|store| {
        store.define_collection("pages", "slug");
        store.insert("pages", json!({ "slug": slug, "title": title, "content": content }));
    });
}

#[when(expr = "I request {string}")]
async fn when_request(world: &mut FolioWorld, path: String) {
    world.request(&path, false).await;
}

#[when(expr = "I request {string} as JSON")]
async fn when_request_json(world: &mut FolioWorld, path: String) {
    world.request(&path, true).await;
}

#[then(expr = "the response status is {int}")]
async fn then_status(world: &mut FolioWorld, status: u16) {
    let resp = world.last_response();
    assert_eq!(resp.status.as_u16(), status, "body: {}", resp.body);
}

#[then(expr = "the response is {word}")]
async fn then_content_type(world: &mut FolioWorld, kind: String) {
    let expected = match kind.as_str() {
        "HTML" => "text/html",
        "JSON" => "application/json",
        other => panic!("unknown response kind {}", other),
    };
    let content_type = world.last_response().content_type.clone().unwrap_or_default();
    assert!(content_type.starts_with(expected), "content type was {}", content_type);
}

#[then(expr = "the response contains {string}")]
async fn then_contains(world: &mut FolioWorld, text: String) {
    let body = &world.last_response().body;
    assert!(body.contains(&text), "{:?} not found in:\n{}", text, body);
}

#[then(expr = "the response does not contain {string}")]
async fn then_not_contains(world: &mut FolioWorld, text: String) {
    let body = &world.last_response().body;
    assert!(!body.contains(&text), "{:?} unexpectedly found in:\n{}", text, body);
}

#[then(expr = "the JSON field {string} is {string}")]
async fn then_json_field(world: &mut FolioWorld, pointer: String, expected: String) {
    let value: serde_json::Value =
        serde_json::from_str(&world.last_response().body).expect("response is JSON");
    assert_eq!(value.pointer(&pointer).and_then(|v| v.as_str()), Some(expected.as_str()));
}
