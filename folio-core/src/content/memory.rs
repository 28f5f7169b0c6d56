//! In-process content service
//!
//! [`MemoryTransport`] answers the same read requests the remote service
//! does, from a [`ContentStore`] held in memory. It backs the test suites
//! and the CLI's `--fixtures` mode.
//!
//! Supported read semantics:
//! - `GET .../items/{collection}` on a singleton returns the item
//! - `GET .../items/{collection}` on a list applies `sort`, then `limit`
//!   (default 100, `-1` for all), then the `fields` projection
//! - `GET .../items/{collection}/{key}` matches the primary key; a miss is
//!   answered with 403 `FORBIDDEN`, like the remote service
//! - `fields` paths are dotted; `*` selects every field at its level and a
//!   non-leaf segment on a relation field expands the related item

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::RwLock;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{TransportError, FORBIDDEN_CODE, ROUTE_NOT_FOUND_CODE};
use super::query::{Direction, Query, SortField};
use super::transport::{Transport, TransportRequest, TransportResponse};

fn default_primary_key() -> String {
    "id".to_string()
}

/// Contents of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionData {
    /// Exactly one item, no list semantics
    Singleton { item: Value },
    /// Ordered items addressed by `primary_key`
    Items {
        #[serde(default = "default_primary_key")]
        primary_key: String,
        #[serde(default)]
        items: Vec<Value>,
    },
}

/// Many-to-one link: `collection.field` holds a key of `related`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub collection: String,
    pub field: String,
    pub related: String,
}

/// Serialized form of a store, as found in fixture files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionData>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Errors loading a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read fixtures {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixtures: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failed read, rendered as an error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFault {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ReadFault {
    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: FORBIDDEN_CODE,
            message: "You don't have permission to access this.".to_string(),
        }
    }

    fn route_not_found(path: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: ROUTE_NOT_FOUND_CODE,
            message: format!("Route {} doesn't exist.", path),
        }
    }

    fn to_body(&self) -> Value {
        json!({ "errors": [{ "message": self.message, "extensions": { "code": self.code } }] })
    }
}

/// Collections and relations held in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    collections: BTreeMap<String, CollectionData>,
    relations: HashMap<(String, String), String>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self { collections: snapshot.collections, relations: HashMap::new() };
        for relation in snapshot.relations {
            store.add_relation(&relation.collection, &relation.field, &relation.related);
        }
        store
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let snapshot: StoreSnapshot = serde_json::from_str(raw)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let mut relations: Vec<Relation> = self
            .relations
            .iter()
            .map(|((collection, field), related)| Relation {
                collection: collection.clone(),
                field: field.clone(),
                related: related.clone(),
            })
            .collect();
        relations.sort_by(|a, b| (&a.collection, &a.field).cmp(&(&b.collection, &b.field)));
        StoreSnapshot { collections: self.collections.clone(), relations }
    }

    /// Set (or replace) a singleton
    pub fn set_singleton(&mut self, collection: &str, item: Value) {
        self.collections.insert(collection.to_string(), CollectionData::Singleton { item });
    }

    /// Declare a list collection. Existing items are kept.
    pub fn define_collection(&mut self, collection: &str, primary_key: &str) {
        let entry = self.collections.entry(collection.to_string()).or_insert_with(|| {
            CollectionData::Items { primary_key: primary_key.to_string(), items: Vec::new() }
        });
        if let CollectionData::Items { primary_key: pk, .. } = entry {
            *pk = primary_key.to_string();
        }
    }

    /// Insert an item, replacing any item with the same primary key.
    /// Undeclared collections are created keyed by `id`.
    pub fn insert(&mut self, collection: &str, item: Value) {
        let entry = self.collections.entry(collection.to_string()).or_insert_with(|| {
            CollectionData::Items { primary_key: default_primary_key(), items: Vec::new() }
        });
        match entry {
            CollectionData::Items { primary_key, items } => {
                let key = item.get(primary_key.as_str()).cloned();
                match key.and_then(|k| items.iter().position(|i| i.get(primary_key.as_str()) == Some(&k))) {
                    Some(pos) => items[pos] = item,
                    None => items.push(item),
                }
            }
            CollectionData::Singleton { item: existing } => *existing = item,
        }
    }

    /// Remove an item by key; returns whether something was removed
    pub fn remove(&mut self, collection: &str, key: &str) -> bool {
        match self.collections.get_mut(collection) {
            Some(CollectionData::Items { primary_key, items }) => {
                let before = items.len();
                let pk = primary_key.clone();
                items.retain(|item| !item.get(pk.as_str()).is_some_and(|v| key_matches(v, key)));
                items.len() != before
            }
            _ => false,
        }
    }

    pub fn add_relation(&mut self, collection: &str, field: &str, related: &str) {
        self.relations.insert((collection.to_string(), field.to_string()), related.to_string());
    }

    /// Number of items in a list collection (1 for a singleton)
    pub fn len(&self, collection: &str) -> usize {
        match self.collections.get(collection) {
            Some(CollectionData::Items { items, .. }) => items.len(),
            Some(CollectionData::Singleton { .. }) => 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Execute a read; `Ok` holds the value of the `data` envelope
    pub fn read(&self, collection: &str, key: Option<&str>, query: &Query) -> Result<Value, ReadFault> {
        let route = match key {
            Some(key) => format!("/items/{}/{}", collection, key),
            None => format!("/items/{}", collection),
        };
        let data = self.collections.get(collection).ok_or_else(|| ReadFault::route_not_found(&route))?;
        let tree = FieldTree::from_query(query);

        match (data, key) {
            (CollectionData::Singleton { item }, None) => Ok(self.project(collection, item, &tree)),
            (CollectionData::Singleton { .. }, Some(_)) => Err(ReadFault::route_not_found(&route)),
            (CollectionData::Items { primary_key, items }, Some(key)) => items
                .iter()
                .find(|item| item.get(primary_key.as_str()).is_some_and(|v| key_matches(v, key)))
                .map(|item| self.project(collection, item, &tree))
                .ok_or_else(ReadFault::forbidden),
            (CollectionData::Items { items, .. }, None) => {
                let mut selected: Vec<&Value> = items.iter().collect();
                sort_items(&mut selected, &query.sort);
                if let Some(limit) = query.effective_limit() {
                    selected.truncate(limit);
                }
                Ok(Value::Array(
                    selected.into_iter().map(|item| self.project(collection, item, &tree)).collect(),
                ))
            }
        }
    }

    fn project(&self, collection: &str, item: &Value, tree: &FieldTree) -> Value {
        match item {
            Value::Object(map) => Value::Object(self.project_object(Some(collection), map, tree)),
            other => other.clone(),
        }
    }

    fn project_object(&self, collection: Option<&str>, item: &Map<String, Value>, tree: &FieldTree) -> Map<String, Value> {
        let wildcard = tree.children.get("*");
        let keys: Vec<&String> = match wildcard {
            Some(_) => item.keys().collect(),
            None => tree.children.keys().filter(|k| item.contains_key(k.as_str())).collect(),
        };

        let mut out = Map::new();
        for key in keys {
            let sub = tree.children.get(key.as_str()).or(wildcard);
            let value = &item[key.as_str()];
            out.insert(key.clone(), self.project_field(collection, key, value, sub));
        }
        out
    }

    fn project_field(&self, collection: Option<&str>, field: &str, value: &Value, sub: Option<&FieldTree>) -> Value {
        let sub = match sub {
            Some(sub) if !sub.children.is_empty() => sub,
            // Leaf: relations stay as keys
            _ => return value.clone(),
        };

        let related = collection.and_then(|c| self.relations.get(&(c.to_string(), field.to_string())));
        match (related, value) {
            (Some(related), Value::Array(keys)) => Value::Array(
                keys.iter().map(|k| self.expand(related, k, sub)).collect(),
            ),
            (Some(related), key) if !key.is_object() => self.expand(related, key, sub),
            (_, Value::Object(map)) => Value::Object(self.project_object(None, map, sub)),
            (_, Value::Array(values)) => Value::Array(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Object(map) => Value::Object(self.project_object(None, map, sub)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            (_, other) => other.clone(),
        }
    }

    /// Replace a foreign key by the projected related item
    fn expand(&self, related: &str, key: &Value, sub: &FieldTree) -> Value {
        if key.is_null() {
            return Value::Null;
        }
        let Some(CollectionData::Items { primary_key, items }) = self.collections.get(related) else {
            return key.clone();
        };
        let key_str = value_as_key(key);
        items
            .iter()
            .find(|item| item.get(primary_key.as_str()).is_some_and(|v| key_matches(v, &key_str)))
            .map(|item| self.project(related, item, sub))
            .unwrap_or(Value::Null)
    }
}

/// Requested fields as a tree of path segments
#[derive(Debug, Default)]
struct FieldTree {
    children: BTreeMap<String, FieldTree>,
}

impl FieldTree {
    fn from_query(query: &Query) -> Self {
        let mut root = FieldTree::default();
        if query.fields.is_empty() {
            root.children.insert("*".to_string(), FieldTree::default());
            return root;
        }
        for path in query.fields.paths() {
            let mut node = &mut root;
            for segment in path.split('.').filter(|s| !s.is_empty()) {
                node = node.children.entry(segment.to_string()).or_default();
            }
        }
        root
    }
}

fn value_as_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn key_matches(value: &Value, key: &str) -> bool {
    match value {
        Value::String(s) => s == key,
        Value::Number(n) => n.to_string() == key,
        _ => false,
    }
}

/// Null < bool < number < string; other shapes compare equal
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn sort_items(items: &mut [&Value], sort: &[SortField]) {
    if sort.is_empty() {
        return;
    }
    items.sort_by(|a, b| {
        for key in sort {
            let left = a.get(key.field.as_str()).unwrap_or(&Value::Null);
            let right = b.get(key.field.as_str()).unwrap_or(&Value::Null);
            let ordering = match key.direction {
                Direction::Ascending => compare_values(left, right),
                Direction::Descending => compare_values(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Transport answering from a [`ContentStore`]
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: RwLock<ContentStore>,
    requests: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryTransport {
    pub fn new(store: ContentStore) -> Self {
        Self { store: RwLock::new(store), requests: AtomicUsize::new(0), offline: AtomicBool::new(false) }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(ContentStore::from_json_file(path)?))
    }

    /// Mutate the store in place
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ContentStore) -> R,
    {
        let mut store = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut store)
    }

    /// Read from the store without going through a request
    pub fn inspect<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ContentStore) -> R,
    {
        let store = self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&store)
    }

    /// When offline, every request fails as if the service were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Requests received so far, including failed ones
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn route(&self, request: &TransportRequest) -> Result<Value, ReadFault> {
        let path = request.url.path();
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(|seg| urlencoding::decode(seg).map(|d| d.into_owned()).unwrap_or_else(|_| seg.to_string())).collect())
            .unwrap_or_default();

        // The first `items` followed by one or two segments starts the route,
        // so a collection may itself be named `items`
        let start = segments
            .iter()
            .enumerate()
            .position(|(i, seg)| seg == "items" && matches!(segments.len() - i, 2 | 3));
        let (collection, key) = match start.map(|i| &segments[i + 1..]) {
            Some([collection]) => (collection.as_str(), None),
            Some([collection, key]) => (collection.as_str(), Some(key.as_str())),
            _ => return Err(ReadFault::route_not_found(path)),
        };

        if request.method != http::Method::GET {
            return Err(ReadFault::route_not_found(path));
        }

        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        let query = Query::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        self.inspect(|store| store.read(collection, key, &query))
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);

        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(TransportError::Connect(format!("{} unreachable", request.url.origin().ascii_serialization())));
        }

        Ok(match self.route(&request) {
            Ok(data) => TransportResponse::json(StatusCode::OK, &json!({ "data": data })),
            Err(fault) => TransportResponse::json(fault.status, &fault.to_body()),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::query::{Fields, Limit};

    fn blog_store() -> ContentStore {
        let mut store = ContentStore::new();
        store.set_singleton("global", json!({ "title": "My Site", "description": "Welcome" }));
        store.define_collection("authors", "id");
        store.insert("authors", json!({ "id": 1, "name": "Ada" }));
        store.define_collection("directus_files", "id");
        store.insert("directus_files", json!({ "id": "f-1", "filename_disk": "abc.jpg", "description": "A cat" }));
        store.define_collection("posts", "slug");
        store.insert("posts", json!({ "slug": "old", "title": "Old", "publish_date": "2023-01-01", "author": 1, "image": null }));
        store.insert("posts", json!({ "slug": "new", "title": "New", "publish_date": "2024-06-01", "author": 1, "image": "f-1" }));
        store.add_relation("posts", "author", "authors");
        store.add_relation("posts", "image", "directus_files");
        store
    }

    #[test]
    fn test_list_projection_and_sort() {
        let store = blog_store();
        let query = Query::new()
            .fields(Fields::new(["slug", "publish_date", "author.name"]))
            .sort(SortField::desc("publish_date"));

        let data = store.read("posts", None, &query).unwrap();
        assert_eq!(
            data,
            json!([
                { "slug": "new", "publish_date": "2024-06-01", "author": { "name": "Ada" } },
                { "slug": "old", "publish_date": "2023-01-01", "author": { "name": "Ada" } }
            ])
        );
    }

    #[test]
    fn test_wildcard_of_wildcard_expands_relations() {
        let store = blog_store();
        let data = store.read("posts", Some("new"), &Query::new().fields(Fields::all_nested())).unwrap();

        assert_eq!(data["author"], json!({ "id": 1, "name": "Ada" }));
        assert_eq!(data["image"]["filename_disk"], "abc.jpg");
        assert_eq!(data["title"], "New");
    }

    #[test]
    fn test_single_wildcard_keeps_keys() {
        let store = blog_store();
        let data = store.read("posts", Some("new"), &Query::new().fields(Fields::all())).unwrap();
        assert_eq!(data["author"], json!(1));
        assert_eq!(data["image"], json!("f-1"));
    }

    #[test]
    fn test_missing_key_is_forbidden() {
        let store = blog_store();
        let fault = store.read("posts", Some("hello-world"), &Query::new()).unwrap_err();
        assert_eq!(fault.status, StatusCode::FORBIDDEN);
        assert_eq!(fault.code, FORBIDDEN_CODE);
    }

    #[test]
    fn test_unknown_collection_is_route_not_found() {
        let store = blog_store();
        let fault = store.read("nope", None, &Query::new()).unwrap_err();
        assert_eq!(fault.status, StatusCode::NOT_FOUND);
        assert_eq!(fault.code, ROUTE_NOT_FOUND_CODE);
    }

    #[test]
    fn test_default_limit_and_unlimited() {
        let mut store = ContentStore::new();
        store.define_collection("posts", "slug");
        for i in 0..150 {
            store.insert("posts", json!({ "slug": format!("p-{}", i) }));
        }

        let capped = store.read("posts", None, &Query::new()).unwrap();
        assert_eq!(capped.as_array().unwrap().len(), 100);

        let all = store.read("posts", None, &Query::new().limit(Limit::Unlimited)).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 150);

        let few = store.read("posts", None, &Query::new().limit(Limit::Count(3))).unwrap();
        assert_eq!(few.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_insert_replaces_same_key_and_remove() {
        let mut store = blog_store();
        store.insert("posts", json!({ "slug": "old", "title": "Renamed" }));
        assert_eq!(store.len("posts"), 2);
        assert_eq!(store.read("posts", Some("old"), &Query::new()).unwrap()["title"], "Renamed");

        assert!(store.remove("posts", "old"));
        assert!(!store.remove("posts", "old"));
        assert_eq!(store.len("posts"), 1);
    }

    #[test]
    fn test_numeric_key_lookup() {
        let store = blog_store();
        let author = store.read("authors", Some("1"), &Query::new()).unwrap();
        assert_eq!(author["name"], "Ada");
    }

    #[test]
    fn test_snapshot_round_trip_keeps_relations() {
        let store = blog_store();
        let raw = serde_json::to_string(&store.snapshot()).unwrap();
        let restored = ContentStore::from_json_str(&raw).unwrap();

        let data = restored.read("posts", Some("new"), &Query::new().fields(Fields::new(["author.name"]))).unwrap();
        assert_eq!(data, json!({ "author": { "name": "Ada" } }));
    }

    #[tokio::test]
    async fn test_transport_routes_under_base_path() {
        let transport = MemoryTransport::new(blog_store());
        let url = reqwest::Url::parse("https://cms.example.com/api/items/posts/new?fields=title").unwrap();

        let response = transport.send(TransportRequest::get(url)).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body, json!({ "data": { "title": "New" } }));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_collection_named_items() {
        let mut store = ContentStore::new();
        store.define_collection("items", "slug");
        store.insert("items", json!({ "slug": "lamp", "title": "Lamp" }));
        let transport = MemoryTransport::new(store);

        let url = reqwest::Url::parse("https://cms.example.com/items/items/lamp").unwrap();
        let response = transport.send(TransportRequest::get(url)).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["data"]["title"], "Lamp");

        let url = reqwest::Url::parse("https://cms.example.com/api/items/items").unwrap();
        let response = transport.send(TransportRequest::get(url)).await.unwrap();
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["data"][0]["slug"], "lamp");
    }

    #[tokio::test]
    async fn test_offline_transport_fails() {
        let transport = MemoryTransport::new(blog_store());
        transport.set_offline(true);
        let url = reqwest::Url::parse("https://cms.example.com/items/global").unwrap();

        let err = transport.send(TransportRequest::get(url)).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
        assert_eq!(transport.request_count(), 1);
    }
}
