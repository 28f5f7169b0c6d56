//! Path routing
//!
//! Patterns are matched segment by segment. `:name` captures one segment;
//! `*name` as the last segment captures the rest of the path. Routes are
//! tried in registration order and the first match wins.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::Method;

use super::{RequestContext, Resp};

/// Captured path parameters, percent-decoded
pub type PathParams = HashMap<String, String>;

type BoxFuture = Pin<Box<dyn Future<Output = Resp> + Send + 'static>>;

/// Async route handler: shared state, the request, and captured params
pub type RouteHandler<S> = Arc<dyn Fn(Arc<S>, RequestContext, PathParams) -> BoxFuture + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Tail(String),
}

/// A parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|part| {
                if let Some(name) = part.strip_prefix(':') {
                    Segment::Param(name.to_string())
                } else if let Some(name) = part.strip_prefix('*') {
                    Segment::Tail(name.to_string())
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();
        Self { raw: raw.to_string(), segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match `path`, returning captures on success
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Tail(name) => {
                    if i >= parts.len() {
                        return None;
                    }
                    let rest: Vec<String> = parts[i..].iter().map(|p| decode(p)).collect();
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
                Segment::Param(name) => {
                    let part = parts.get(i)?;
                    params.insert(name.clone(), decode(part));
                }
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// Non-empty segments, so `/blog/` and `/blog` route alike
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment).map(|s| s.into_owned()).unwrap_or_else(|_| segment.to_string())
}

struct Route<S> {
    method: Method,
    pattern: Pattern,
    handler: RouteHandler<S>,
}

/// Outcome of resolving a request against the table
pub enum RouteMatch<'a, S> {
    Found(&'a RouteHandler<S>, PathParams),
    /// The path exists for other methods; value is the `Allow` header
    MethodNotAllowed(String),
    NotFound,
}

/// Ordered route table over shared state `S`
pub struct Router<S> {
    routes: Vec<Route<S>>,
    fallback: Option<RouteHandler<S>>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new(), fallback: None }
    }

    pub fn route<F, Fut>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Arc<S>, RequestContext, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(pattern),
            handler: boxed(handler),
        });
        self
    }

    pub fn get<F, Fut>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Arc<S>, RequestContext, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// Handler for paths no route matches
    pub fn fallback<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Arc<S>, RequestContext, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        self.fallback = Some(boxed(handler));
        self
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch<'_, S> {
        let mut allowed: Vec<&str> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if route.method == *method {
                return RouteMatch::Found(&route.handler, params);
            }
            if !allowed.contains(&route.method.as_str()) {
                allowed.push(route.method.as_str());
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed.join(", "))
        }
    }

    pub async fn dispatch(&self, state: Arc<S>, ctx: RequestContext) -> Resp {
        match self.resolve(&ctx.method, &ctx.path) {
            RouteMatch::Found(handler, params) => handler(state, ctx, params).await,
            RouteMatch::MethodNotAllowed(allow) => super::method_not_allowed_response(&allow),
            RouteMatch::NotFound => match &self.fallback {
                Some(fallback) => fallback(state, ctx, PathParams::new()).await,
                None => super::json_error_response(
                    http::StatusCode::NOT_FOUND,
                    "not_found",
                    &format!("{} not found", ctx.path),
                ),
            },
        }
    }
}

impl<S: Send + Sync + 'static> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn boxed<S, F, Fut>(handler: F) -> RouteHandler<S>
where
    F: Fn(Arc<S>, RequestContext, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Resp> + Send + 'static,
{
    Arc::new(move |state, ctx, params| Box::pin(handler(state, ctx, params)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::text_response;
    use http::StatusCode;
    use http_body_util::BodyExt;

    #[test]
    fn test_literal_and_param() {
        let pattern = Pattern::parse("/blog/:slug");
        assert_eq!(pattern.matches("/blog/engines").unwrap()["slug"], "engines");
        assert_eq!(pattern.matches("/blog/engines/").unwrap()["slug"], "engines");
        assert!(pattern.matches("/blog").is_none());
        assert!(pattern.matches("/blog/a/b").is_none());
        assert!(pattern.matches("/news/engines").is_none());
    }

    #[test]
    fn test_params_are_decoded() {
        let pattern = Pattern::parse("/:slug");
        assert_eq!(pattern.matches("/hello%20world").unwrap()["slug"], "hello world");
        assert_eq!(pattern.matches("/..%2Fglobal").unwrap()["slug"], "../global");
    }

    #[test]
    fn test_tail_capture() {
        let pattern = Pattern::parse("/static/*path");
        assert_eq!(pattern.matches("/static/css/site.css").unwrap()["path"], "css/site.css");
        assert!(pattern.matches("/static").is_none());
        assert!(pattern.matches("/static/").is_none());
    }

    #[test]
    fn test_root() {
        let pattern = Pattern::parse("/");
        assert!(pattern.matches("/").unwrap().is_empty());
        assert!(pattern.matches("/about").is_none());
    }

    fn router() -> Router<()> {
        Router::new()
            .get("/blog", |_, _, _| async { text_response(StatusCode::OK, "listing") })
            .get("/:slug", |_, _, params: PathParams| async move {
                text_response(StatusCode::OK, &format!("page {}", params["slug"]))
            })
            .fallback(|_, _, _| async { text_response(StatusCode::NOT_FOUND, "fallback") })
    }

    async fn body(resp: Resp) -> String {
        String::from_utf8(resp.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let router = router();
        let resp = router.dispatch(Arc::new(()), RequestContext::get("/blog").unwrap()).await;
        assert_eq!(body(resp).await, "listing");

        let resp = router.dispatch(Arc::new(()), RequestContext::get("/about").unwrap()).await;
        assert_eq!(body(resp).await, "page about");
    }

    #[tokio::test]
    async fn test_fallback_and_method_not_allowed() {
        let router = router();
        let resp = router.dispatch(Arc::new(()), RequestContext::get("/a/b/c").unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(resp).await, "fallback");

        let mut post = RequestContext::get("/blog").unwrap();
        post.method = Method::POST;
        let resp = router.dispatch(Arc::new(()), post).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[http::header::ALLOW], "GET");
    }
}
