//! Content API access
//!
//! - [`client`] - `ClientFactory` and the per-request `ContentClient`
//! - [`query`] - field projection, sort order and page size
//! - [`transport`] - the `Transport` seam
//! - [`http_transport`] - reqwest transport with header forwarding
//! - [`memory`] - in-process content service for tests and fixtures
//! - [`error`] - error types and status classification

pub mod client;
pub mod error;
pub mod http_transport;
pub mod memory;
pub mod query;
pub mod transport;

pub use client::{ClientFactory, ContentClient};
pub use error::{ContentError, TransportError};
pub use http_transport::HttpTransport;
pub use memory::{ContentStore, MemoryTransport, StoreError, StoreSnapshot};
pub use query::{Direction, Fields, Limit, Query, SortField, DEFAULT_LIMIT};
pub use transport::{Transport, TransportRequest, TransportResponse};
