//! Route data loaders
//!
//! A loader turns route parameters into exactly one content read and
//! returns a data bag for the presentation layer. Three shapes exist:
//!
//! - singleton ([`load_global`]): no parameters, failures propagate
//! - collection ([`load_post_listing`]): projected and sorted list,
//!   failures propagate
//! - single item ([`load_post`], [`load_page`]): looked up by slug; absence
//!   becomes a [`NotFound`] signal with status 404
//!
//! Loaders hold no state between invocations and never retry.

mod global;
mod pages;
mod posts;

use std::fmt;
use std::marker::PhantomData;

use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::content::{ContentClient, ContentError, Query};

pub use global::load_global;
pub use pages::{load_page, PAGE_LOADER};
pub use posts::{load_post, load_post_listing, POST_LOADER};

/// Uniform "no such item" signal raised by single-item loaders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub status: StatusCode,
    pub message: String,
}

impl NotFound {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

/// Outcome of a failed single-item load
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The item does not exist
    #[error("{0}")]
    NotFound(NotFound),
    /// The content service could not answer
    #[error("upstream failure: {0}")]
    Upstream(#[source] ContentError),
}

impl LoadError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoadError::NotFound(nf) => nf.status,
            LoadError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Lifecycle of a single-item load, reported in debug logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Requesting,
    Found,
    NotFound,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Idle => "idle",
            LoadState::Requesting => "requesting",
            LoadState::Found => "found",
            LoadState::NotFound => "not_found",
            LoadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Loads one item of a collection by slug
pub struct ItemLoader<T> {
    collection: &'static str,
    fields: fn() -> crate::content::Fields,
    not_found_message: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ItemLoader<T> {
    pub const fn new(
        collection: &'static str,
        fields: fn() -> crate::content::Fields,
        not_found_message: &'static str,
    ) -> Self {
        Self { collection, fields, not_found_message, _item: PhantomData }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// The read this loader issues for any slug
    pub fn query(&self) -> Query {
        Query::new().fields((self.fields)())
    }

    /// Look up `slug`.
    ///
    /// Absence (including an empty slug, which issues no request) maps to
    /// [`LoadError::NotFound`]; any other failure to [`LoadError::Upstream`].
    pub async fn load(&self, client: &ContentClient, slug: &str) -> Result<T, LoadError> {
        let mut state = LoadState::Idle;
        log::trace!("{} '{}': {}", self.collection, slug, state);

        if slug.trim().is_empty() {
            log::debug!("{}: empty slug, {} -> {}", self.collection, state, LoadState::NotFound);
            return Err(LoadError::NotFound(NotFound::new(self.not_found_message)));
        }

        state = LoadState::Requesting;
        log::trace!("{} '{}': {}", self.collection, slug, state);

        let result = client.read_item::<T>(self.collection, slug, &self.query()).await;
        let (next, outcome) = match result {
            Ok(item) => (LoadState::Found, Ok(item)),
            Err(err) if err.is_not_found() => {
                (LoadState::NotFound, Err(LoadError::NotFound(NotFound::new(self.not_found_message))))
            }
            Err(err) => (LoadState::Failed, Err(LoadError::Upstream(err))),
        };

        log::debug!("{} '{}': {} -> {}", self.collection, slug, state, next);
        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::{ClientFactory, ContentStore, Fields, MemoryTransport};
    use serde_json::json;
    use std::sync::Arc;

    /// A store shaped like the content service's blog schema
    pub(crate) fn blog_store() -> ContentStore {
        let mut store = ContentStore::new();
        store.set_singleton("global", json!({ "title": "My Site", "description": "Welcome" }));

        store.define_collection("authors", "id");
        store.insert("authors", json!({ "id": 1, "name": "Ada Lovelace" }));
        store.insert("authors", json!({ "id": 2, "name": "Grace Hopper" }));

        store.define_collection("directus_files", "id");
        store.insert(
            "directus_files",
            json!({ "id": "f-1", "filename_disk": "abc.jpg", "description": "Punch cards" }),
        );

        store.define_collection("pages", "slug");
        store.insert("pages", json!({ "slug": "about", "title": "About", "content": "<p>About us</p>" }));

        store.define_collection("posts", "slug");
        store.insert("posts", json!({
            "slug": "engines", "title": "Analytical Engines", "content": "<p>Notes</p>",
            "publish_date": "2024-02-01", "author": 1, "image": "f-1"
        }));
        store.insert("posts", json!({
            "slug": "compilers", "title": "Compilers", "content": "<p>A-0</p>",
            "publish_date": "2024-05-20", "author": 2, "image": null
        }));
        store.insert("posts", json!({
            "slug": "bugs", "title": "First Bug", "content": "<p>Moth</p>",
            "publish_date": "2023-09-09", "author": 2, "image": null
        }));

        store.add_relation("posts", "author", "authors");
        store.add_relation("posts", "image", "directus_files");
        store
    }

    pub(crate) fn client_for(transport: Arc<MemoryTransport>) -> ContentClient {
        ClientFactory::parse("https://cms.example.com", transport).unwrap().create(None)
    }

    #[tokio::test]
    async fn test_empty_slug_issues_no_request() {
        let transport = Arc::new(MemoryTransport::new(blog_store()));
        let client = client_for(transport.clone());
        let loader: ItemLoader<serde_json::Value> = ItemLoader::new("posts", Fields::all, "Post not found");

        let err = loader.load(&client, "  ").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_absence() {
        let transport = Arc::new(MemoryTransport::new(blog_store()));
        transport.set_offline(true);
        let client = client_for(transport.clone());
        let loader: ItemLoader<serde_json::Value> = ItemLoader::new("posts", Fields::all, "Post not found");

        let err = loader.load(&client, "engines").await.unwrap_err();
        assert!(matches!(err, LoadError::Upstream(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_not_found_display() {
        let nf = NotFound::new("Page not found");
        assert_eq!(nf.to_string(), "Page not found (404)");
        assert_eq!(LoadError::NotFound(nf).to_string(), "Page not found (404)");
    }
}
