//! Route table and per-request wiring
//!
//! | Route            | Loader                | View      |
//! |------------------|-----------------------|-----------|
//! | `/`              | `load_global`         | home      |
//! | `/blog`          | `load_post_listing`   | listing   |
//! | `/blog/:slug`    | `load_post`           | post      |
//! | `/healthz`       | none                  | JSON      |
//! | `/static/*path`  | none                  | file      |
//! | `/:slug`         | `load_page`           | page      |
//! | anything else    | none                  | 404 page  |
//!
//! Each request builds its own transport (carrying the forwarded incoming
//! headers) and its own [`ContentClient`]. Nothing request-scoped is stored
//! on the [`Site`].

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use http::{HeaderName, StatusCode};
use serde::Serialize;

use crate::config::FolioConfig;
use crate::content::{ClientFactory, ContentClient, HttpTransport, Transport};
use crate::http::{
    file_response, html_response, json_error_response, json_response, text_response, HttpServer,
    PathParams, RequestContext, Resp, Router,
};
use crate::loaders::{load_global, load_page, load_post, load_post_listing, LoadError, NotFound};
use crate::render::{RenderError, RenderOptions, Renderer};
use crate::Error;

/// Message shown on every 500 page; fault details only go to the log
const FAULT_MESSAGE: &str = "Something went wrong";

/// Where content reads go
enum TransportMode {
    /// Real HTTP; each request gets a copy carrying its forwarded headers
    Http { base: HttpTransport, forward: Vec<HeaderName> },
    /// A fixed transport shared by all requests (fixtures, tests)
    Fixed,
}

/// Immutable per-site state shared by all requests
pub struct SiteState {
    factory: ClientFactory,
    transport: TransportMode,
    renderer: Renderer,
    static_dir: Option<PathBuf>,
}

impl SiteState {
    /// A content client for this request only
    pub fn client_for(&self, ctx: &RequestContext) -> ContentClient {
        match &self.transport {
            TransportMode::Http { base, forward } => {
                let transport: Arc<dyn Transport> = Arc::new(base.forwarding(&ctx.headers, forward));
                self.factory.create(Some(transport))
            }
            TransportMode::Fixed => self.factory.create(None),
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Turn a load outcome into a response: the data bag as JSON when the
    /// client asks for it, otherwise the rendered view.
    fn respond<T, R>(&self, ctx: &RequestContext, outcome: crate::Result<T>, render: R) -> Resp
    where
        T: Serialize,
        R: FnOnce(&Renderer, &T) -> Result<String, RenderError>,
    {
        match outcome {
            Ok(data) if ctx.accepts_json() => json_response(StatusCode::OK, &data),
            Ok(data) => match render(&self.renderer, &data) {
                Ok(html) => html_response(StatusCode::OK, html),
                Err(e) => self.fault(ctx, &e.into()),
            },
            Err(Error::Load(LoadError::NotFound(not_found))) => self.not_found(ctx, &not_found),
            Err(e) => self.fault(ctx, &e),
        }
    }

    fn not_found(&self, ctx: &RequestContext, not_found: &NotFound) -> Resp {
        log::debug!("{} {}: {}", ctx.method, ctx.path, not_found);
        if ctx.accepts_json() {
            return json_error_response(not_found.status, "not_found", &not_found.message);
        }
        match self.renderer.render_not_found(not_found) {
            Ok(html) => html_response(not_found.status, html),
            Err(e) => {
                log::error!(request_id = ctx.request_id.to_string().as_str(); "not-found page failed: {}", e);
                text_response(not_found.status, &not_found.message)
            }
        }
    }

    fn fault(&self, ctx: &RequestContext, err: &Error) -> Resp {
        log::error!(
            request_id = ctx.request_id.to_string().as_str();
            "{} {} failed: {}",
            ctx.method,
            ctx.path,
            err
        );
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        if ctx.accepts_json() {
            return json_error_response(status, "internal_error", FAULT_MESSAGE);
        }
        match self.renderer.render_error(status, FAULT_MESSAGE) {
            Ok(html) => html_response(status, html),
            Err(_) => text_response(status, FAULT_MESSAGE),
        }
    }
}

/// A configured site: route table plus shared state
#[derive(Clone)]
pub struct Site {
    state: Arc<SiteState>,
    router: Arc<Router<SiteState>>,
}

impl Site {
    /// Build from validated configuration, reading over HTTP
    pub fn from_config(config: &FolioConfig) -> anyhow::Result<Self> {
        let base_url = config.content.base_url()?;
        let forward = config.content.forward_header_names()?;
        let transport = HttpTransport::new();
        let factory = ClientFactory::new(base_url, Arc::new(transport.clone()))
            .context("content.url cannot be used as a base URL")?;

        Ok(Self::build(factory, TransportMode::Http { base: transport, forward }, config))
    }

    /// Build from configuration, reading through `transport` for every request
    pub fn with_transport(config: &FolioConfig, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let base_url = config.content.base_url()?;
        let factory = ClientFactory::new(base_url, transport)
            .context("content.url cannot be used as a base URL")?;
        Ok(Self::build(factory, TransportMode::Fixed, config))
    }

    fn build(factory: ClientFactory, transport: TransportMode, config: &FolioConfig) -> Self {
        let mut options = RenderOptions::new(factory.base_url().clone());
        options.site_name = config.site.name.clone();
        options.lang = config.site.lang.clone();
        options.nav = config.site.nav.clone();
        options.image_width = config.site.image_width;
        options.markup = config.content.markup;

        let state = SiteState {
            factory,
            transport,
            renderer: Renderer::new(options),
            static_dir: config.site.static_dir.clone(),
        };
        Self { state: Arc::new(state), router: Arc::new(routes()) }
    }

    pub fn state(&self) -> &SiteState {
        &self.state
    }

    /// Route and answer one request
    pub async fn handle(&self, ctx: RequestContext) -> Resp {
        self.router.dispatch(self.state.clone(), ctx).await
    }

    /// [`Site::handle`] plus an access log line
    pub async fn handle_logged(&self, ctx: RequestContext) -> Resp {
        let start = Instant::now();
        let access = ctx.clone();
        let resp = self.handle(ctx).await;
        crate::http::log_access(&access, &resp, start);
        resp
    }
}

fn routes() -> Router<SiteState> {
    Router::new()
        .get("/", home)
        .get("/blog", blog)
        .get("/blog/:slug", post)
        .get("/healthz", healthz)
        .get("/static/*path", static_file)
        .get("/:slug", page)
        .fallback(fallback)
}

async fn home(site: Arc<SiteState>, ctx: RequestContext, _: PathParams) -> Resp {
    let client = site.client_for(&ctx);
    let outcome = load_global(&client).await.map_err(Error::from);
    site.respond(&ctx, outcome, Renderer::render_home)
}

async fn blog(site: Arc<SiteState>, ctx: RequestContext, _: PathParams) -> Resp {
    let client = site.client_for(&ctx);
    let outcome = load_post_listing(&client).await.map_err(Error::from);
    site.respond(&ctx, outcome, Renderer::render_listing)
}

async fn post(site: Arc<SiteState>, ctx: RequestContext, params: PathParams) -> Resp {
    let slug = params.get("slug").map(String::as_str).unwrap_or_default();
    let client = site.client_for(&ctx);
    let outcome = load_post(&client, slug).await.map_err(Error::from);
    site.respond(&ctx, outcome, Renderer::render_post)
}

async fn page(site: Arc<SiteState>, ctx: RequestContext, params: PathParams) -> Resp {
    let slug = params.get("slug").map(String::as_str).unwrap_or_default();
    let client = site.client_for(&ctx);
    let outcome = load_page(&client, slug).await.map_err(Error::from);
    site.respond(&ctx, outcome, Renderer::render_page)
}

async fn healthz(_: Arc<SiteState>, _: RequestContext, _: PathParams) -> Resp {
    json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
}

async fn static_file(site: Arc<SiteState>, ctx: RequestContext, params: PathParams) -> Resp {
    let missing = NotFound::new("File not found");
    let Some(root) = site.static_dir.as_deref() else {
        return site.not_found(&ctx, &missing);
    };
    let Some(path) = params.get("path").and_then(|rel| resolve_static(root, rel)) else {
        return site.not_found(&ctx, &missing);
    };

    match tokio::fs::read(&path).await {
        Ok(content) => file_response(&path, content),
        Err(e) => {
            log::debug!("static file {}: {}", path.display(), e);
            site.not_found(&ctx, &missing)
        }
    }
}

/// Join `rel` under `root`, refusing anything but plain name segments
fn resolve_static(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    if rel.components().all(|c| matches!(c, Component::Normal(_))) {
        Some(root.join(rel))
    } else {
        None
    }
}

async fn fallback(site: Arc<SiteState>, ctx: RequestContext, _: PathParams) -> Resp {
    site.not_found(&ctx, &NotFound::new("Page not found"))
}

/// Serves a [`Site`] over HTTP
pub struct SiteServer {
    site: Site,
}

impl SiteServer {
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    pub fn into_http_server(self) -> HttpServer<SiteState> {
        let Site { state, router } = self.site;
        let router = Arc::try_unwrap(router).unwrap_or_else(|_| routes());
        HttpServer::new(router, state)
    }

    /// Bind `addr` and serve until Ctrl-C
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        self.into_http_server().serve(addr).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_static_rejects_traversal() {
        let root = Path::new("/srv/static");
        assert_eq!(resolve_static(root, "css/site.css"), Some(root.join("css/site.css")));
        assert_eq!(resolve_static(root, "../secret"), None);
        assert_eq!(resolve_static(root, "css/../../secret"), None);
        assert_eq!(resolve_static(root, "/etc/passwd"), None);
        assert_eq!(resolve_static(root, "./site.css"), None);
    }

    #[test]
    fn test_route_order() {
        let router = routes();
        let patterns: Vec<&str> = router.patterns().collect();
        assert_eq!(
            patterns,
            vec!["/", "/blog", "/blog/:slug", "/healthz", "/static/*path", "/:slug"]
        );
    }
}
