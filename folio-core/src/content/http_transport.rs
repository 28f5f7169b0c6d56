//! reqwest-backed transport
//!
//! Shares one connection pool across requests. Per-request state (the
//! headers forwarded from the incoming request) lives in the value returned
//! by [`HttpTransport::forwarding`], never in the shared client.

use async_trait::async_trait;
use http::{HeaderMap, HeaderName};

use super::error::TransportError;
use super::transport::{Transport, TransportRequest, TransportResponse};

/// Transport over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    forwarded: HeaderMap,
}

impl HttpTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a transport around an existing client (shares its pool)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client, forwarded: HeaderMap::new() }
    }

    /// A copy of this transport that also sends the named headers taken
    /// from `incoming`. Headers absent from `incoming` are skipped.
    pub fn forwarding(&self, incoming: &HeaderMap, names: &[HeaderName]) -> Self {
        let mut forwarded = HeaderMap::new();
        for name in names {
            for value in incoming.get_all(name) {
                forwarded.append(name.clone(), value.clone());
            }
        }
        Self { client: self.client.clone(), forwarded }
    }

    /// Headers this transport adds to every request
    pub fn forwarded_headers(&self) -> &HeaderMap {
        &self.forwarded
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in request.headers.iter().chain(self.forwarded.iter()) {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Connect(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
