//! Request context handed to route handlers

use std::net::{IpAddr, SocketAddr};

use http::uri::InvalidUri;
use http::{header, HeaderMap, HeaderValue, Method, Uri};
use uuid::Uuid;

/// Everything a handler may look at. The body is never read: every route
/// is a GET.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Correlates access and error lines for one request
    pub request_id: Uuid,
    pub remote_addr: Option<SocketAddr>,
}

impl RequestContext {
    pub fn new(method: Method, uri: &Uri) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: HeaderMap::new(),
            request_id: Uuid::new_v4(),
            remote_addr: None,
        }
    }

    /// A GET for `path_and_query`, as issued by `folio render` and tests
    pub fn get(path_and_query: &str) -> Result<Self, InvalidUri> {
        let uri = path_and_query.parse::<Uri>()?;
        Ok(Self::new(Method::GET, &uri))
    }

    pub fn from_parts(parts: &http::request::Parts, remote_addr: Option<SocketAddr>) -> Self {
        let mut ctx = Self::new(parts.method.clone(), &parts.uri);
        ctx.headers = parts.headers.clone();
        ctx.remote_addr = remote_addr;
        ctx
    }

    pub fn with_header(mut self, name: header::HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// True when the `Accept` header prefers `application/json` over HTML.
    ///
    /// The highest `q` wins; on a tie the earlier entry wins.
    pub fn accepts_json(&self) -> bool {
        let Some(accept) = self.headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            return false;
        };

        let mut best: Option<(&str, f32)> = None;
        for entry in accept.split(',') {
            let mut parts = entry.split(';');
            let media = parts.next().unwrap_or("").trim();
            if media.is_empty() {
                continue;
            }
            let q = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            if best.map_or(true, |(_, best_q)| q > best_q) {
                best = Some((media, q));
            }
        }

        matches!(best, Some((media, q)) if q > 0.0 && media.eq_ignore_ascii_case("application/json"))
    }

    /// Client IP for logs. Proxy headers are trusted only when the socket
    /// peer is loopback or a private address.
    pub fn client_ip(&self) -> String {
        let Some(remote) = self.remote_addr else {
            return "-".to_string();
        };
        let ip = remote.ip();
        let trusted = ip.is_loopback()
            || match ip {
                IpAddr::V4(v4) => v4.is_private(),
                IpAddr::V6(_) => false,
            };

        if trusted {
            if let Some(forwarded) = self.forwarded_ip() {
                return forwarded;
            }
        }
        ip.to_string()
    }

    fn forwarded_ip(&self) -> Option<String> {
        let from_xff = self
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let from_real_ip = || {
            self.headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        from_xff.or_else(from_real_ip).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_splits_query() {
        let ctx = RequestContext::get("/blog?page=2").unwrap();
        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.path, "/blog");
        assert_eq!(ctx.query.as_deref(), Some("page=2"));
    }

    #[test]
    fn test_get_rejects_unparseable_path() {
        assert!(RequestContext::get("/blog/no such post").is_err());
        assert!(RequestContext::get("/blog/no%20such%20post").is_ok());
    }

    #[test]
    fn test_accepts_json() {
        let json = RequestContext::get("/").unwrap().with_header(header::ACCEPT, "application/json");
        assert!(json.accepts_json());

        let browser = RequestContext::get("/").unwrap()
            .with_header(header::ACCEPT, "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8");
        assert!(!browser.accepts_json());

        let weighted = RequestContext::get("/").unwrap()
            .with_header(header::ACCEPT, "text/html;q=0.5, application/json");
        assert!(weighted.accepts_json());

        assert!(!RequestContext::get("/").unwrap().accepts_json());
    }

    #[test]
    fn test_client_ip_trusts_proxy_only_from_private_peer() {
        let mut ctx = RequestContext::get("/").unwrap().with_header(
            header::HeaderName::from_static("x-forwarded-for"),
            "203.0.113.42, 10.0.0.1",
        );
        ctx.remote_addr = Some("127.0.0.1:5000".parse().unwrap());
        assert_eq!(ctx.client_ip(), "203.0.113.42");

        ctx.remote_addr = Some("82.67.19.159:5000".parse().unwrap());
        assert_eq!(ctx.client_ip(), "82.67.19.159");
    }

    #[test]
    fn test_client_ip_without_peer() {
        assert_eq!(RequestContext::get("/").unwrap().client_ip(), "-");
    }
}
