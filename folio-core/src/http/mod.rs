//! HTTP surface on hyper
//!
//! - [`request`] - per-request context (method, path, headers, request id)
//! - [`response`] - response builders and the access log
//! - [`router`] - path patterns with `:param` and `*tail` captures
//! - [`server`] - hyper http1 accept loop

pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use request::RequestContext;
pub use response::{
    file_response, html_response, json_error_response, json_response, log_access,
    method_not_allowed_response, text_response,
};
pub use router::{PathParams, RouteMatch, Router};
pub use server::HttpServer;

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{Request, Response};
use std::convert::Infallible;

/// Common HTTP type aliases
pub type RespBody = BoxBody<Bytes, Infallible>;
pub type Req = Request<hyper::body::Incoming>;
pub type Resp = Response<RespBody>;

/// Create a response body from anything convertible to `Bytes`
pub fn body_from<T: Into<Bytes>>(data: T) -> RespBody {
    Full::new(data.into()).boxed()
}

/// Result type for HTTP operations
pub type HttpResult<T> = std::result::Result<T, HttpError>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The listen address did not parse
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
