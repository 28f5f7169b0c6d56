use chrono::{Days, NaiveDate};
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use folio_core::loaders::{load_global, load_post, load_post_listing};
use folio_core::LoadError;
use serde_json::{json, Value};

use crate::features::world::FolioWorld;

// ==================== CONTENT ====================

#[given(expr = "the global settings titled {string} with description {string}")]
async fn given_global(world: &mut FolioWorld, title: String, description: String) {
    world.transport.update(|store| {
        store.set_singleton("global", json!({ "title": title, "description": description }));
    });
}

#[given(expr = "an author {int} named {string}")]
async fn given_author(world: &mut FolioWorld, id: u64, name: String) {
    world.transport.update(|store| {
        store.define_collection("authors", "id");
        store.insert("authors", json!({ "id": id, "name": name }));
        store.add_relation("posts", "author", "authors");
    });
}

#[given(expr = "a post {string} titled {string} published on {string}")]
async fn given_post(world: &mut FolioWorld, slug: String, title: String, date: String) {
    world.transport.update(|store| {
        store.define_collection("posts", "slug");
        store.insert("posts", json!({
            "slug": slug,
            "title": title,
            "content": format!("<p>{}</p>", title),
            "publish_date": date,
            "author": null,
            "image": null,
        }));
    });
}

#[given(expr = "the post {string} is written by author {int}")]
async fn given_post_author(world: &mut FolioWorld, slug: String, author: u64) {
    world.transport.update(|store| {
        let mut post = store
            .read("posts", Some(&slug), &Default::default())
            .expect("post exists");
        post["author"] = json!(author);
        store.insert("posts", post);
    });
}

#[given(expr = "{int} posts published on consecutive days")]
async fn given_many_posts(world: &mut FolioWorld, count: u64) {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    world.transport.update(|store| {
        store.define_collection("posts", "slug");
        for i in 0..count {
            let date = start.checked_add_days(Days::new(i)).expect("date in range");
            store.insert("posts", json!({
                "slug": format!("post-{:03}", i),
                "title": format!("Post {}", i),
                "publish_date": date.format("%Y-%m-%d").to_string(),
            }));
        }
    });
}

#[given("the content service is unreachable")]
async fn given_offline(world: &mut FolioWorld) {
    world.transport.set_offline(true);
}

// ==================== LOADERS ====================

#[when(expr = "I load the post {string}")]
async fn when_load_post(world: &mut FolioWorld, slug: String) {
    let outcome = load_post(&world.client(), &slug).await;
    world.post_loads.push(outcome);
}

#[when(expr = "I load the post {string} twice")]
async fn when_load_post_twice(world: &mut FolioWorld, slug: String) {
    for _ in 0..2 {
        let outcome = load_post(&world.client(), &slug).await;
        world.post_loads.push(outcome);
    }
}

#[when("I load the site settings")]
async fn when_load_global(world: &mut FolioWorld) {
    world.global = Some(load_global(&world.client()).await.expect("global settings load"));
}

#[when("I load the post listing")]
async fn when_load_listing(world: &mut FolioWorld) {
    world.listing = Some(load_post_listing(&world.client()).await.expect("listing loads"));
}

#[then(expr = "the post is found with slug {string}")]
async fn then_post_found(world: &mut FolioWorld, slug: String) {
    match world.last_post_load() {
        Ok(detail) => assert_eq!(detail.post.slug, slug),
        Err(e) => panic!("expected a post, got {}", e),
    }
}

#[then(expr = "the load reports not found with status {int} and message {string}")]
async fn then_not_found(world: &mut FolioWorld, status: u16, message: String) {
    match world.last_post_load() {
        Err(LoadError::NotFound(nf)) => {
            assert_eq!(nf.status.as_u16(), status);
            assert_eq!(nf.message, message);
        }
        other => panic!("expected not found, got {:?}", other),
    }
}

#[then("the load fails upstream")]
async fn then_upstream(world: &mut FolioWorld) {
    assert!(
        matches!(world.last_post_load(), Err(LoadError::Upstream(_))),
        "expected an upstream fault, got {:?}",
        world.last_post_load()
    );
}

#[then("both loads have the same outcome")]
async fn then_same_outcome(world: &mut FolioWorld) {
    let n = world.post_loads.len();
    assert!(n >= 2, "expected two loads");
    let first = format!("{:?}", world.post_loads[n - 2]);
    let second = format!("{:?}", world.post_loads[n - 1]);
    assert_eq!(first, second);
}

#[then(expr = "the content service received {int} request(s)")]
async fn then_request_count(world: &mut FolioWorld, count: usize) {
    assert_eq!(world.transport.request_count(), count);
}

#[then("the data bag is:")]
async fn then_data_bag(world: &mut FolioWorld, step: &Step) {
    let expected: Value =
        serde_json::from_str(step.docstring.as_deref().expect("docstring")).expect("valid JSON");
    let actual = serde_json::to_value(world.global.as_ref().expect("global loaded")).expect("serializes");
    assert_eq!(actual, expected);
}

#[then(expr = "the listing has {int} posts")]
async fn then_listing_len(world: &mut FolioWorld, count: usize) {
    assert_eq!(world.listing.as_ref().expect("listing loaded").posts.len(), count);
}

#[then(expr = "the listing starts with {string}")]
async fn then_listing_first(world: &mut FolioWorld, slug: String) {
    let listing = world.listing.as_ref().expect("listing loaded");
    assert_eq!(listing.posts.first().map(|p| p.slug.as_str()), Some(slug.as_str()));
}

#[then(expr = "the listing order is {string}")]
async fn then_listing_order(world: &mut FolioWorld, order: String) {
    let listing = world.listing.as_ref().expect("listing loaded");
    let slugs: Vec<&str> = listing.posts.iter().map(|p| p.slug.as_str()).collect();
    let expected: Vec<&str> = order.split(',').map(str::trim).collect();
    assert_eq!(slugs, expected);
}

#[then("the listing is sorted newest first")]
async fn then_listing_sorted(world: &mut FolioWorld) {
    let listing = world.listing.as_ref().expect("listing loaded");
    for pair in listing.posts.windows(2) {
        assert!(pair[0].publish_date >= pair[1].publish_date, "{} before {}", pair[0].slug, pair[1].slug);
    }
}

#[then(expr = "the post {string} in the listing is by {string}")]
async fn then_listing_author(world: &mut FolioWorld, slug: String, author: String) {
    let listing = world.listing.as_ref().expect("listing loaded");
    let post = listing.posts.iter().find(|p| p.slug == slug).expect("post listed");
    assert_eq!(post.author.as_ref().map(|a| a.name.as_str()), Some(author.as_str()));
}
