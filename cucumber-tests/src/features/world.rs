use std::sync::Arc;

use cucumber::World as CucumberWorld;
use folio_core::content::{ClientFactory, ContentClient, MemoryTransport};
use folio_core::http::RequestContext;
use folio_core::model::{GlobalData, PostDetail, PostListing};
use folio_core::{FolioConfig, LoadError, Site};
use http::{header, StatusCode};
use http_body_util::BodyExt;

/// Base URL every scenario reads against
pub const CMS_URL: &str = "https://cms.example.com";

/// Last response seen by the site steps
#[derive(Debug, Clone)]
pub struct LastResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, CucumberWorld)]
#[world(init = Self::new)]
pub struct FolioWorld {
    pub config: FolioConfig,
    /// In-process content service; seeded by `Given` steps
    pub transport: Arc<MemoryTransport>,
    pub post_loads: Vec<Result<PostDetail, LoadError>>,
    pub global: Option<GlobalData>,
    pub listing: Option<PostListing>,
    pub asset_url: Option<String>,
    pub response: Option<LastResponse>,
}

impl FolioWorld {
    pub fn new() -> Self {
        let mut config = FolioConfig::default();
        config.content.url = Some(CMS_URL.to_string());
        Self {
            config,
            transport: Arc::new(MemoryTransport::default()),
            post_loads: Vec::new(),
            global: None,
            listing: None,
            asset_url: None,
            response: None,
        }
    }

    /// A fresh client, as a request would get
    pub fn client(&self) -> ContentClient {
        ClientFactory::parse(CMS_URL, self.transport.clone())
            .expect("valid content URL")
            .create(None)
    }

    pub fn site(&self) -> Site {
        Site::with_transport(&self.config, self.transport.clone()).expect("site builds")
    }

    /// Route `path` through the site and keep the response
    pub async fn request(&mut self, path: &str, json: bool) {
        let mut ctx = RequestContext::get(path).expect("valid request path");
        if json {
            ctx = ctx.with_header(header::ACCEPT, "application/json");
        }
        let resp = self.site().handle(ctx).await;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        self.response = Some(LastResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    pub fn last_response(&self) -> &LastResponse {
        self.response.as_ref().expect("no request was made")
    }

    pub fn last_post_load(&self) -> &Result<PostDetail, LoadError> {
        self.post_loads.last().expect("no post was loaded")
    }
}
