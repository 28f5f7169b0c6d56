//! Request transport abstraction
//!
//! A transport executes one request against the content service. The client
//! never talks to the network itself; it is always handed a transport, which
//! lets a render swap in one that carries the incoming request's
//! credentials, or an in-process store.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;

use super::error::TransportError;

/// One outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ACCEPT, http::HeaderValue::from_static("application/json"));
        Self { method: Method::GET, url, headers }
    }
}

/// Raw response, status plus body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }
}

/// Executes requests against the content service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response.
    ///
    /// Non-success statuses are not errors at this level; only failures to
    /// get a response at all are.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
