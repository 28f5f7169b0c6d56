//! Content client and its factory

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::{classify_status, ContentError};
use super::query::Query;
use super::transport::{Transport, TransportRequest};

/// Produces content clients bound to one base endpoint.
///
/// Build one at startup and call [`create`](Self::create) once per incoming
/// request. The factory itself holds no per-request state.
#[derive(Clone)]
pub struct ClientFactory {
    base_url: Url,
    default_transport: Arc<dyn Transport>,
}

impl ClientFactory {
    /// Create a factory for `base_url`, using `default_transport` whenever a
    /// request does not bring its own.
    pub fn new(base_url: Url, default_transport: Arc<dyn Transport>) -> Result<Self, ContentError> {
        if base_url.cannot_be_a_base() {
            return Err(ContentError::InvalidEndpoint(base_url.to_string()));
        }
        Ok(Self { base_url, default_transport })
    }

    /// Parse `base_url` and create a factory
    pub fn parse(base_url: &str, default_transport: Arc<dyn Transport>) -> Result<Self, ContentError> {
        let url = Url::parse(base_url)
            .map_err(|e| ContentError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        Self::new(url, default_transport)
    }

    /// A client using `transport` when given, else the default transport
    pub fn create(&self, transport: Option<Arc<dyn Transport>>) -> ContentClient {
        ContentClient {
            base_url: self.base_url.clone(),
            transport: transport.unwrap_or_else(|| self.default_transport.clone()),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("base_url", &self.base_url.as_str())
            .field("default_transport", &self.default_transport.name())
            .finish()
    }
}

/// Handle to the content service for one request/render cycle
#[derive(Clone)]
pub struct ContentClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

/// Success envelope: `{"data": ...}`
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

impl ContentClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Read a singleton collection
    pub async fn read_singleton<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<T, ContentError> {
        let url = self.items_url(collection, None, query)?;
        let data: Option<T> = self.get(url, None).await?;
        data.ok_or_else(|| ContentError::Decode(format!("singleton '{}' returned no data", collection)))
    }

    /// Read a list of items
    pub async fn read_items<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<T>, ContentError> {
        let url = self.items_url(collection, None, query)?;
        let data: Option<Vec<T>> = self.get(url, None).await?;
        Ok(data.unwrap_or_default())
    }

    /// Read one item by primary key
    pub async fn read_item<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        query: &Query,
    ) -> Result<T, ContentError> {
        let url = self.items_url(collection, Some(key), query)?;
        let data: Option<T> = self.get(url, Some((collection, key))).await?;
        data.ok_or_else(|| ContentError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    /// `{base}/items/{collection}[/{key}]?{query}`; segments are
    /// percent-encoded, so a slug can never escape its path segment.
    fn items_url(&self, collection: &str, key: Option<&str>, query: &Query) -> Result<Url, ContentError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ContentError::InvalidEndpoint(self.base_url.to_string()))?;
            segments.pop_if_empty().push("items").push(collection);
            if let Some(key) = key {
                segments.push(key);
            }
        }

        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        by_key: Option<(&str, &str)>,
    ) -> Result<Option<T>, ContentError> {
        log::debug!("content read via {}: {}", self.transport.name(), url);

        let response = self.transport.send(TransportRequest::get(url)).await?;

        if !response.status.is_success() {
            return Err(classify_status(response.status, &response.body, by_key));
        }

        let envelope: Envelope<T> = serde_json::from_slice(&response.body)
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("base_url", &self.base_url.as_str())
            .field("transport", &self.transport.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::error::TransportError;
    use crate::content::query::{Fields, SortField};
    use crate::content::transport::TransportResponse;
    use async_trait::async_trait;
    use http::StatusCode;
    use std::sync::Mutex;

    /// Records request URLs and replays one canned response
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
            Arc::new(Self { status, body, seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request.url.to_string());
            Ok(TransportResponse::new(self.status, self.body))
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn factory(transport: Arc<dyn Transport>) -> ClientFactory {
        ClientFactory::parse("https://cms.example.com", transport).unwrap()
    }

    #[tokio::test]
    async fn test_items_url_encoding() {
        let canned = Canned::new(StatusCode::OK, r#"{"data":[]}"#);
        let client = factory(canned.clone()).create(None);

        let query = Query::new()
            .fields(Fields::new(["slug", "author.name"]))
            .sort(SortField::desc("publish_date"));
        let _: Vec<serde_json::Value> = client.read_items("posts", &query).await.unwrap();

        let seen = canned.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            "https://cms.example.com/items/posts?fields=slug%2Cauthor.name&sort=-publish_date"
        );
    }

    #[tokio::test]
    async fn test_slug_stays_in_its_segment() {
        let canned = Canned::new(StatusCode::OK, r#"{"data":{"slug":"x"}}"#);
        let client = factory(canned.clone()).create(None);

        let _: serde_json::Value =
            client.read_item("posts", "../global", &Query::new()).await.unwrap();

        let seen = canned.seen.lock().unwrap();
        assert_eq!(seen[0], "https://cms.example.com/items/posts/..%2Fglobal");
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let canned = Canned::new(StatusCode::OK, r#"{"data":{"title":"t"}}"#);
        let factory = ClientFactory::parse("https://example.com/cms/", canned.clone()).unwrap();

        let _: serde_json::Value =
            factory.create(None).read_singleton("global", &Query::new()).await.unwrap();

        assert_eq!(canned.seen.lock().unwrap()[0], "https://example.com/cms/items/global");
    }

    #[tokio::test]
    async fn test_override_transport_wins() {
        let default = Canned::new(StatusCode::OK, r#"{"data":{"n":1}}"#);
        let scoped = Canned::new(StatusCode::OK, r#"{"data":{"n":2}}"#);
        let factory = factory(default.clone());

        let value: serde_json::Value =
            factory.create(Some(scoped.clone())).read_singleton("global", &Query::new()).await.unwrap();

        assert_eq!(value["n"], 2);
        assert!(default.seen.lock().unwrap().is_empty());
        assert_eq!(scoped.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_null_data_by_key_is_not_found() {
        let canned = Canned::new(StatusCode::OK, r#"{"data":null}"#);
        let client = factory(canned).create(None);

        let err = client.read_item::<serde_json::Value>("pages", "about", &Query::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let canned = Canned::new(StatusCode::OK, "<html>proxy error</html>");
        let client = factory(canned).create(None);

        let err = client.read_singleton::<serde_json::Value>("global", &Query::new()).await.unwrap_err();
        assert!(matches!(err, ContentError::Decode(_)));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let canned = Canned::new(StatusCode::OK, "{}");
        assert!(ClientFactory::parse("mailto:cms@example.com", canned.clone()).is_err());
        assert!(ClientFactory::parse("not a url", canned).is_err());
    }
}
